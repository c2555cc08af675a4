use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

const FILE_STEM_FORMAT: &str = "snapshot_%Y%m%d_%H%M%S";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("no frame has been captured yet")]
    NoFrame,
    #[error("could not create snapshot directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}

/// `snapshot_YYYYMMDD_HHMMSS.png` for the given local time.
pub fn snapshot_file_name(at: NaiveDateTime) -> String {
    format!("{}.png", at.format(FILE_STEM_FORMAT))
}

/// First free snapshot path in `dir` for `at`.
///
/// A second snapshot within the same second gets `_1`, then `_2`, and so on.
pub fn next_snapshot_path(dir: &Path, at: NaiveDateTime) -> PathBuf {
    let first = dir.join(snapshot_file_name(at));
    if !first.exists() {
        return first;
    }
    let stem = at.format(FILE_STEM_FORMAT).to_string();
    (1u32..)
        .map(|n| dir.join(format!("{stem}_{n}.png")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Writes `frame` into `dir`, creating the directory when missing.
pub fn save_snapshot(
    frame: &Frame,
    dir: &Path,
    writer: &dyn ImageWriter,
    at: NaiveDateTime,
) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir).map_err(|source| SnapshotError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = next_snapshot_path(dir, at);
    writer
        .write(&path, frame)
        .map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;
    log::info!("Snapshot saved: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::PixelFormat;
    use crate::video::infrastructure::image_file_writer::ImageFileWriter;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap()
    }

    fn frame() -> Frame {
        Frame::new(vec![200u8; 4 * 3 * 3], 4, 3, PixelFormat::Rgb, 0)
    }

    struct FailingWriter;

    impl ImageWriter for FailingWriter {
        fn write(&self, _path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            Err("disk full".into())
        }
    }

    #[test]
    fn test_file_name_is_zero_padded_timestamp() {
        assert_eq!(snapshot_file_name(at()), "snapshot_20240307_090501.png");
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("snapshots");
        let path = save_snapshot(&frame(), &dir, &ImageFileWriter::new(), at()).unwrap();
        assert_eq!(path, dir.join("snapshot_20240307_090501.png"));
        assert!(path.exists());
        assert_eq!(image::open(&path).unwrap().to_rgb8().dimensions(), (4, 3));
    }

    #[test]
    fn test_same_second_gets_numbered_suffix() {
        let tmp = TempDir::new().unwrap();
        let writer = ImageFileWriter::new();
        let first = save_snapshot(&frame(), tmp.path(), &writer, at()).unwrap();
        let second = save_snapshot(&frame(), tmp.path(), &writer, at()).unwrap();
        let third = save_snapshot(&frame(), tmp.path(), &writer, at()).unwrap();
        assert_ne!(first, second);
        assert!(second.ends_with("snapshot_20240307_090501_1.png"));
        assert!(third.ends_with("snapshot_20240307_090501_2.png"));
    }

    #[test]
    fn test_directory_blocked_by_file_fails() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("snapshots");
        fs::write(&blocker, b"not a dir").unwrap();
        let err = save_snapshot(&frame(), &blocker, &ImageFileWriter::new(), at()).unwrap_err();
        assert!(matches!(err, SnapshotError::CreateDir { .. }));
    }

    #[test]
    fn test_writer_failure_reports_path() {
        let tmp = TempDir::new().unwrap();
        let err = save_snapshot(&frame(), tmp.path(), &FailingWriter, at()).unwrap_err();
        match err {
            SnapshotError::Write { path, .. } => {
                assert!(path.ends_with("snapshot_20240307_090501.png"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
