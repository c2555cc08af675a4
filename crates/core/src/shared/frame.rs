use image::GrayImage;
use ndarray::{s, ArrayView3, ArrayViewMut3};

use crate::shared::bounding_box::BoundingBox;

pub const CHANNELS: u8 = 3;

/// Fixed-point BT.601 luma weights; they sum to 1 << 14 so a gray pixel
/// maps back to itself.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Channel order of the three bytes that make up a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Bgr,
}

impl PixelFormat {
    /// Byte offsets of the red, green and blue channels within a pixel.
    pub fn rgb_offsets(self) -> (usize, usize, usize) {
        match self {
            PixelFormat::Rgb => (0, 1, 2),
            PixelFormat::Bgr => (2, 1, 0),
        }
    }
}

/// A single video frame: contiguous 8-bit, 3-channel pixels in row-major order.
///
/// The channel order travels with the frame so conversions at display
/// and codec boundaries never need to guess.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (CHANNELS as usize),
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            format,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Builds a frame with the same geometry and format but new pixel data.
    pub fn with_data(&self, data: Vec<u8>) -> Self {
        Self::new(data, self.width, self.height, self.format, self.index)
    }

    /// Pixel at `(x, y)` as `[r, g, b]`, whatever the storage order.
    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let (r, g, b) = self.format.rgb_offsets();
        let offset = ((y as usize) * (self.width as usize) + x as usize) * CHANNELS as usize;
        let px = &self.data[offset..offset + CHANNELS as usize];
        [px[r], px[g], px[b]]
    }

    /// Tightly packed RGB bytes, swapping channels when stored as BGR.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        match self.format {
            PixelFormat::Rgb => self.data.clone(),
            PixelFormat::Bgr => self
                .data
                .chunks_exact(CHANNELS as usize)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect(),
        }
    }

    /// Single-channel luminance copy of the frame.
    pub fn to_luma(&self) -> GrayImage {
        let (r, g, b) = self.format.rgb_offsets();
        let luma: Vec<u8> = self
            .data
            .chunks_exact(CHANNELS as usize)
            .map(|px| {
                let sum = px[r] as u32 * LUMA_R
                    + px[g] as u32 * LUMA_G
                    + px[b] as u32 * LUMA_B
                    + (1 << (LUMA_SHIFT - 1));
                (sum >> LUMA_SHIFT) as u8
            })
            .collect();
        GrayImage::from_raw(self.width, self.height, luma)
            .expect("luma buffer length matches frame dimensions")
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Mutable view of a sub-region that shares this frame's storage.
    ///
    /// The box is clamped to the frame first; writes through the view are
    /// visible in the frame.
    pub fn region_mut(&mut self, region: &BoundingBox) -> ArrayViewMut3<'_, u8> {
        let r = region.clamp_to(self.width, self.height);
        let (x0, y0) = (r.x as usize, r.y as usize);
        let (x1, y1) = (x0 + r.width as usize, y0 + r.height as usize);
        self.as_ndarray_mut().slice_move(s![y0..y1, x0..x1, ..])
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            CHANNELS as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, PixelFormat::Rgb, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.format(), PixelFormat::Rgb);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::new(vec![100u8; 12], 2, 2, PixelFormat::Rgb, 0);
        let mut cloned = frame.clone();
        cloned.as_ndarray_mut()[[0, 0, 0]] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, PixelFormat::Rgb, 0);
    }

    #[test]
    fn test_rgb_at_respects_bgr_order() {
        let frame = Frame::new(vec![10, 20, 30], 1, 1, PixelFormat::Bgr, 0);
        assert_eq!(frame.rgb_at(0, 0), [30, 20, 10]);
        assert_eq!(frame.to_rgb_bytes(), vec![30, 20, 10]);
    }

    #[test]
    fn test_to_luma_keeps_gray_values() {
        let frame = Frame::new(vec![77, 77, 77, 200, 200, 200], 2, 1, PixelFormat::Rgb, 0);
        let luma = frame.to_luma();
        assert_eq!(luma.get_pixel(0, 0).0, [77]);
        assert_eq!(luma.get_pixel(1, 0).0, [200]);
    }

    #[test]
    fn test_to_luma_same_for_either_order() {
        let rgb = Frame::new(vec![255, 0, 0], 1, 1, PixelFormat::Rgb, 0);
        let bgr = Frame::new(vec![0, 0, 255], 1, 1, PixelFormat::Bgr, 0);
        assert_eq!(rgb.to_luma(), bgr.to_luma());
        assert_eq!(rgb.to_luma().get_pixel(0, 0).0, [76]);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let frame = Frame::new(vec![0u8; 24], 4, 2, PixelFormat::Rgb, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_region_mut_writes_through_to_frame() {
        let mut frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, PixelFormat::Rgb, 0);
        {
            let mut view = frame.region_mut(&BoundingBox::new(2, 1, 2, 2));
            assert_eq!(view.shape(), &[2, 2, 3]);
            view[[0, 0, 1]] = 99;
        }
        // (x=2, y=1) in the parent, green channel
        assert_eq!(frame.as_ndarray()[[1, 2, 1]], 99);
    }

    #[test]
    fn test_region_mut_clamps_to_frame() {
        let mut frame = Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, PixelFormat::Rgb, 0);
        let view = frame.region_mut(&BoundingBox::new(3, 3, 10, 10));
        assert_eq!(view.shape(), &[1, 1, 3]);
    }
}
