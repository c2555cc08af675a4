pub mod detection_settings;
pub mod detector_bank;
pub mod face_annotator;
pub mod object_detector;
