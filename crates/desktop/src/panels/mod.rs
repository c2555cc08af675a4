pub mod controls_panel;
pub mod detection_panel;
pub mod source_panel;
