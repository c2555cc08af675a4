use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::{BoxedSourceError, FrameSource, SourceError, SourceKind};

/// Decoder state for an open file; dropped as a unit on close.
struct Decoding {
    input: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
}

/// Video file source decoded via ffmpeg-next (libavformat + libavcodec).
///
/// Frames are converted to packed RGB24. At end of stream `next_frame`
/// returns `Ok(None)` until `rewind` seeks back to the start.
pub struct FfmpegFileSource {
    decoding: Option<Decoding>,
    metadata: VideoMetadata,
    frame_index: usize,
    draining: bool,
}

impl FfmpegFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Self::open_inner(path).map_err(|source| SourceError::File {
            path: path.to_path_buf(),
            source,
        })
    }

    fn open_inner(path: &Path) -> Result<Self, BoxedSourceError> {
        ffmpeg_next::init()?;

        let input = ffmpeg_next::format::input(path)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        let scaler = scaling::Context::get(
            decoder.format(),
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            scaling::Flags::BILINEAR,
        )?;

        log::info!("Opened video file {}", metadata.describe());

        Ok(Self {
            decoding: Some(Decoding {
                input,
                decoder,
                scaler,
                stream_index,
            }),
            metadata,
            frame_index: 0,
            draining: false,
        })
    }
}

impl Decoding {
    /// Pulls one decoded picture if the decoder has one ready.
    fn receive(&mut self, width: u32, height: u32) -> Result<Option<Vec<u8>>, ffmpeg_next::Error> {
        let mut decoded = Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb = Video::empty();
        self.scaler.run(&decoded, &mut rgb)?;
        Ok(Some(extract_rgb_pixels(&rgb, width, height)))
    }
}

impl FrameSource for FfmpegFileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::VideoFile
    }

    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let (width, height) = (self.metadata.width, self.metadata.height);
        let Some(decoding) = self.decoding.as_mut() else {
            return Ok(None);
        };

        loop {
            if let Some(pixels) = decoding.receive(width, height)? {
                let frame = Frame::new(pixels, width, height, PixelFormat::Rgb, self.frame_index);
                self.frame_index += 1;
                return Ok(Some(frame));
            }
            if self.draining {
                return Ok(None);
            }

            let next = decoding
                .input
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            match next {
                Some((index, packet)) => {
                    if index != decoding.stream_index {
                        continue;
                    }
                    if let Err(e) = decoding.decoder.send_packet(&packet) {
                        log::debug!("Skipping undecodable packet: {e}");
                    }
                }
                None => {
                    let _ = decoding.decoder.send_eof();
                    self.draining = true;
                }
            }
        }
    }

    fn rewind(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let decoding = self.decoding.as_mut().ok_or("video file is closed")?;
        decoding.input.seek(0, ..)?;
        decoding.decoder.flush();
        self.draining = false;
        self.frame_index = 0;
        log::debug!("Rewound {}", self.metadata.describe());
        Ok(())
    }

    fn close(&mut self) {
        if self.decoding.take().is_some() {
            log::debug!("Closed {}", self.metadata.describe());
        }
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping the row padding ffmpeg may add (stride > width * 3).
fn extract_rgb_pixels(rgb_frame: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_len = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}
