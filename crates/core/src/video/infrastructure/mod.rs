pub mod camera_source;
pub mod ffmpeg_file_source;
pub mod image_file_writer;
pub mod source_opener;
