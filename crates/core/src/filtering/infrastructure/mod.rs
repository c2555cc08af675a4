pub mod frame_filter;
mod gaussian;
