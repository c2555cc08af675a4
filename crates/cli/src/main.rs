use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Instant;

use clap::Parser;

use facewatch_core::detection::domain::detection_settings::{
    DetectionSettings, MIN_NEIGHBORS_RANGE, SCALE_FACTOR_RANGE,
};
use facewatch_core::detection::infrastructure::cascade_loader::load_detector_bank;
use facewatch_core::filtering::domain::filter_mode::FilterMode;
use facewatch_core::pipeline::capture_loop::{CaptureLoop, TickOutcome};
use facewatch_core::pipeline::pipeline_config::PipelineConfig;
use facewatch_core::pipeline::pipeline_logger::StatsPipelineLogger;
use facewatch_core::shared::constants::{
    DEFAULT_CAMERA_INDEX, DISPLAY_SURFACE_SIZE, FRAME_INTERVAL, SNAPSHOT_DIR,
};
use facewatch_core::video::domain::frame_source::{SourceKind, SourceSelection};
use facewatch_core::video::infrastructure::image_file_writer::ImageFileWriter;
use facewatch_core::video::infrastructure::source_opener::DefaultSourceOpener;

/// Run the face detection pipeline on a camera or video file without a window.
#[derive(Parser)]
#[command(name = "facewatch")]
struct Cli {
    /// Camera device index.
    #[arg(long, conflicts_with = "input")]
    camera: Option<u32>,

    /// Video file to read instead of a camera.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Filter: none, grayscale, sepia, blur, edge-detection.
    #[arg(long, default_value = "none")]
    filter: FilterMode,

    /// Skip face detection entirely.
    #[arg(long)]
    no_detection: bool,

    /// Detection pyramid scale factor (1.01-1.5).
    #[arg(long, default_value = "1.1")]
    scale_factor: f64,

    /// Neighbouring hits needed to keep a face (1-10).
    #[arg(long, default_value = "5")]
    min_neighbors: u32,

    /// Also look for eyes inside each face.
    #[arg(long)]
    eyes: bool,

    /// Also look for smiles inside each face.
    #[arg(long)]
    smile: bool,

    /// Number of ticks to run.
    #[arg(long, default_value = "300")]
    frames: usize,

    /// Save a snapshot every N presented frames (0 = never).
    #[arg(long, default_value = "0")]
    snapshot_every: usize,

    /// Where snapshots go.
    #[arg(long, default_value = SNAPSHOT_DIR)]
    snapshot_dir: PathBuf,

    /// Directory holding the Haar cascade XML files.
    #[arg(long)]
    cascade_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let bank = load_detector_bank(cli.cascade_dir.as_deref())?;
    if cli.eyes && !bank.has_eye() {
        log::warn!("Eye cascade unavailable, --eyes ignored");
    }
    if cli.smile && !bank.has_smile() {
        log::warn!("Smile cascade unavailable, --smile ignored");
    }

    let config = build_config(&cli, bank.has_eye(), bank.has_smile());
    let mut capture = CaptureLoop::new(
        bank,
        Box::new(DefaultSourceOpener),
        DISPLAY_SURFACE_SIZE,
        Box::new(StatsPipelineLogger::new(100)),
    );
    capture.switch_source(&selection(&cli))?;
    log::info!("{}", capture.status());

    run_ticks(&mut capture, &config, cli.frames, cli.snapshot_every, &cli.snapshot_dir);

    capture.logger().summary();
    capture.stop();
    Ok(())
}

fn run_ticks(
    capture: &mut CaptureLoop,
    config: &PipelineConfig,
    ticks: usize,
    snapshot_every: usize,
    snapshot_dir: &Path,
) {
    let writer = ImageFileWriter::new();
    let mut presented = 0usize;

    for tick in 0..ticks {
        let started = Instant::now();
        match capture.step(config) {
            TickOutcome::Presented { face_count } => {
                presented += 1;
                if let Some(n) = face_count {
                    log::debug!("Tick {tick}: {n} faces");
                }
                if snapshot_every > 0 && presented % snapshot_every == 0 {
                    match capture.snapshot(snapshot_dir, &writer) {
                        Ok(path) => log::info!("Snapshot {}", path.display()),
                        Err(e) => log::warn!("Snapshot failed: {e}"),
                    }
                }
            }
            TickOutcome::Restarted => log::info!("{}", capture.status()),
            TickOutcome::SourceFailed | TickOutcome::NoSource => {
                log::debug!("Tick {tick}: {}", capture.status())
            }
            TickOutcome::Stopped => break,
        }
        eprint!("\rTick {}/{ticks}  {}", tick + 1, capture.status());

        // Fixed rate; a slow tick is not made up for.
        if let Some(rest) = FRAME_INTERVAL.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
    eprintln!();
    log::info!("Presented {presented} of {ticks} ticks");
}

fn selection(cli: &Cli) -> SourceSelection {
    match &cli.input {
        Some(path) => SourceSelection {
            kind: SourceKind::VideoFile,
            camera_index: DEFAULT_CAMERA_INDEX,
            file: Some(path.clone()),
        },
        None => SourceSelection {
            kind: SourceKind::Camera,
            camera_index: cli.camera.unwrap_or(DEFAULT_CAMERA_INDEX),
            file: None,
        },
    }
}

fn build_config(cli: &Cli, has_eye: bool, has_smile: bool) -> PipelineConfig {
    let mut detection = DetectionSettings::default();
    detection.enabled = !cli.no_detection;
    detection.detect_eyes = cli.eyes && has_eye;
    detection.detect_smile = cli.smile && has_smile;
    detection.set_scale_factor(cli.scale_factor);
    detection.set_min_neighbors(cli.min_neighbors);
    PipelineConfig {
        filter: cli.filter,
        detection,
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(input) = &cli.input {
        if !input.is_file() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
    }
    let (lo, hi) = SCALE_FACTOR_RANGE;
    if !(lo..=hi).contains(&cli.scale_factor) {
        return Err(format!(
            "Scale factor must be between {lo} and {hi}, got {}",
            cli.scale_factor
        )
        .into());
    }
    let (lo, hi) = MIN_NEIGHBORS_RANGE;
    if !(lo..=hi).contains(&cli.min_neighbors) {
        return Err(format!(
            "Min neighbors must be between {lo} and {hi}, got {}",
            cli.min_neighbors
        )
        .into());
    }
    if cli.frames == 0 {
        return Err("--frames must be at least 1".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["facewatch"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_select_camera_zero() {
        let cli = parse(&[]);
        assert_eq!(cli.frames, 300);
        assert_eq!(cli.filter, FilterMode::None);
        assert_eq!(cli.snapshot_dir, PathBuf::from(SNAPSHOT_DIR));
        let sel = selection(&cli);
        assert_eq!(sel.kind, SourceKind::Camera);
        assert_eq!(sel.camera_index, 0);
    }

    #[test]
    fn test_input_selects_video_file() {
        let cli = parse(&["--input", "clip.mp4"]);
        let sel = selection(&cli);
        assert_eq!(sel.kind, SourceKind::VideoFile);
        assert_eq!(sel.file, Some(PathBuf::from("clip.mp4")));
    }

    #[test]
    fn test_camera_and_input_conflict() {
        assert!(Cli::try_parse_from(["facewatch", "--camera", "1", "--input", "a.mp4"]).is_err());
    }

    #[rstest]
    #[case("sepia", FilterMode::Sepia)]
    #[case("edge-detection", FilterMode::EdgeDetection)]
    #[case("grayscale", FilterMode::Grayscale)]
    fn test_filter_flag(#[case] value: &str, #[case] expected: FilterMode) {
        assert_eq!(parse(&["--filter", value]).filter, expected);
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        assert!(Cli::try_parse_from(["facewatch", "--filter", "posterize"]).is_err());
    }

    #[test]
    fn test_config_respects_missing_cascades() {
        let cli = parse(&["--eyes", "--smile", "--scale-factor", "1.3", "--min-neighbors", "7"]);
        let config = build_config(&cli, false, true);
        assert!(config.detection.enabled);
        assert!(!config.detection.detect_eyes);
        assert!(config.detection.detect_smile);
        assert_eq!(config.detection.scale_factor(), 1.3);
        assert_eq!(config.detection.min_neighbors(), 7);
    }

    #[test]
    fn test_no_detection_flag() {
        let config = build_config(&parse(&["--no-detection"]), true, true);
        assert!(!config.detection.enabled);
    }

    #[rstest]
    #[case(&["--scale-factor", "1.0"])]
    #[case(&["--scale-factor", "2.0"])]
    #[case(&["--min-neighbors", "0"])]
    #[case(&["--min-neighbors", "11"])]
    #[case(&["--frames", "0"])]
    #[case(&["--input", "/definitely/not/here.mp4"])]
    fn test_validate_rejects(#[case] args: &[&str]) {
        assert!(validate(&parse(args)).is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate(&parse(&[])).is_ok());
    }
}
