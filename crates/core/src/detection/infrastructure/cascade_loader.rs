use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::detection::domain::detector_bank::DetectorBank;
use crate::detection::domain::object_detector::ObjectDetector;
use crate::detection::infrastructure::cascade_resolver::{self, ResolveError};
use crate::detection::infrastructure::haar_cascade::{CascadeError, HaarCascade};
use crate::shared::constants::{EYE_CASCADE_NAME, FACE_CASCADE_NAME, SMILE_CASCADE_NAME};

#[derive(Error, Debug)]
pub enum BankLoadError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Cascade(#[from] CascadeError),
}

/// Locate and load the three cascades.
///
/// The face cascade is required. Eye and smile cascades that cannot be
/// found or parsed leave their slot empty and are reported with a warning.
pub fn load_detector_bank(override_dir: Option<&Path>) -> Result<DetectorBank, BankLoadError> {
    let face_path = cascade_resolver::resolve(FACE_CASCADE_NAME, override_dir)?;
    let face = HaarCascade::from_file(&face_path)?;
    log::info!("Face cascade: {}", face_path.display());

    let eye = load_optional(EYE_CASCADE_NAME, override_dir);
    let smile = load_optional(SMILE_CASCADE_NAME, override_dir);
    Ok(DetectorBank::new(Arc::new(face), eye, smile))
}

fn load_optional(name: &str, override_dir: Option<&Path>) -> Option<Arc<dyn ObjectDetector>> {
    let loaded = cascade_resolver::resolve(name, override_dir)
        .map_err(BankLoadError::from)
        .and_then(|path| HaarCascade::from_file(&path).map_err(BankLoadError::from));
    match loaded {
        Ok(cascade) => Some(Arc::new(cascade)),
        Err(e) => {
            log::warn!("Optional cascade {name} unavailable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const STUMP_CASCADE: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<cascade type_id="opencv-cascade-classifier">
  <stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>4</height>
  <width>4</width>
  <stages>
    <_>
      <stageThreshold>0.</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>0 -1 0 1.</internalNodes>
          <leafValues>-1. 1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>0 0 4 4 -1.</_>
        <_>2 0 2 4 2.</_></rects></_></features></cascade>
</opencv_storage>
"#;

    #[test]
    fn test_loads_all_three_from_override_dir() {
        let tmp = TempDir::new().unwrap();
        for name in [FACE_CASCADE_NAME, EYE_CASCADE_NAME, SMILE_CASCADE_NAME] {
            fs::write(tmp.path().join(name), STUMP_CASCADE).unwrap();
        }
        let bank = load_detector_bank(Some(tmp.path())).unwrap();
        assert!(bank.has_eye());
        assert!(bank.has_smile());
    }

    #[test]
    fn test_corrupt_face_cascade_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(FACE_CASCADE_NAME), "<opencv_storage><oops").unwrap();
        let err = load_detector_bank(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, BankLoadError::Cascade(_)));
    }

    #[test]
    fn test_corrupt_optional_cascade_leaves_slot_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(FACE_CASCADE_NAME), STUMP_CASCADE).unwrap();
        fs::write(tmp.path().join(EYE_CASCADE_NAME), "not xml at all").unwrap();
        fs::write(tmp.path().join(SMILE_CASCADE_NAME), STUMP_CASCADE).unwrap();
        let bank = load_detector_bank(Some(tmp.path())).unwrap();
        assert!(!bank.has_eye());
        assert!(bank.has_smile());
    }
}
