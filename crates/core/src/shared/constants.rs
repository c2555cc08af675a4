use std::time::Duration;

pub const FACE_CASCADE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const EYE_CASCADE_NAME: &str = "haarcascade_eye.xml";
pub const SMILE_CASCADE_NAME: &str = "haarcascade_smile.xml";

/// Overrides every other cascade lookup location when set.
pub const CASCADE_DIR_ENV: &str = "FACEWATCH_CASCADE_DIR";

/// Capture loop tick interval.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(15);

pub const DEFAULT_CAMERA_INDEX: u32 = 0;

pub const SNAPSHOT_DIR: &str = "snapshots";

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Fixed size of the display surface the presenter draws into.
pub const DISPLAY_SURFACE_SIZE: (u32, u32) = (960, 540);

pub const FACE_MIN_SIZE: (u32, u32) = (30, 30);

pub const SMILE_SCALE_FACTOR: f64 = 1.7;
pub const SMILE_MIN_NEIGHBORS: u32 = 20;
pub const SMILE_MIN_SIZE: (u32, u32) = (25, 25);

pub const EYE_SCALE_FACTOR: f64 = 1.1;
pub const EYE_MIN_NEIGHBORS: u32 = 3;

pub const BLUR_KERNEL_SIZE: usize = 15;

pub const CANNY_LOW_THRESHOLD: f32 = 50.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 150.0;

/// Sepia rows, applied to (blue, green, red) and producing (blue, green, red).
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.272, 0.534, 0.131],
    [0.349, 0.686, 0.168],
    [0.393, 0.769, 0.189],
];
