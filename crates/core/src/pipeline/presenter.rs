use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, Rgba, RgbaImage};

use crate::shared::frame::Frame;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Where a frame lands on the display surface after aspect-preserving
/// scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fit a `frame_w` x `frame_h` frame inside the surface without distortion.
///
/// A frame wider than the surface takes the full surface width, otherwise
/// the full height. The leftover margin is split with the extra pixel on
/// the right or bottom.
pub fn fit(frame_w: u32, frame_h: u32, surface_w: u32, surface_h: u32) -> Placement {
    if frame_w == 0 || frame_h == 0 || surface_w == 0 || surface_h == 0 {
        return Placement {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }

    let (fw, fh) = (frame_w as u64, frame_h as u64);
    let (sw, sh) = (surface_w as u64, surface_h as u64);
    let (width, height) = if fw * sh > sw * fh {
        (sw, ((sw * fh + fw / 2) / fw).clamp(1, sh))
    } else {
        (((sh * fw + fh / 2) / fh).clamp(1, sw), sh)
    };

    Placement {
        x: ((sw - width) / 2) as u32,
        y: ((sh - height) / 2) as u32,
        width: width as u32,
        height: height as u32,
    }
}

/// Fixed-size RGBA buffer the shells draw from.
pub struct DisplaySurface {
    image: RgbaImage,
    placement: Option<Placement>,
}

impl DisplaySurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, BACKGROUND),
            placement: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Placement of the last presented frame.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// Clears the surface and draws `frame` letterboxed into it.
    pub fn present(&mut self, frame: &Frame) -> Placement {
        let placement = fit(frame.width(), frame.height(), self.width(), self.height());
        for px in self.image.pixels_mut() {
            *px = BACKGROUND;
        }
        self.placement = Some(placement);
        if placement.width == 0 || placement.height == 0 {
            return placement;
        }

        let Some(rgb) = RgbImage::from_raw(frame.width(), frame.height(), frame.to_rgb_bytes())
        else {
            log::warn!(
                "Frame {} has a malformed buffer, skipping display",
                frame.index()
            );
            return placement;
        };
        let scaled = if (placement.width, placement.height) == rgb.dimensions() {
            rgb
        } else {
            imageops::resize(&rgb, placement.width, placement.height, FilterType::Triangle)
        };

        for (x, y, &Rgb([r, g, b])) in scaled.enumerate_pixels() {
            self.image
                .put_pixel(placement.x + x, placement.y + y, Rgba([r, g, b, 255]));
        }
        placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::PixelFormat;
    use rstest::rstest;

    fn solid(width: u32, height: u32, rgb: [u8; 3], format: PixelFormat) -> Frame {
        let px = match format {
            PixelFormat::Rgb => rgb,
            PixelFormat::Bgr => [rgb[2], rgb[1], rgb[0]],
        };
        let data = px.repeat((width * height) as usize);
        Frame::new(data, width, height, format, 0)
    }

    #[rstest]
    #[case(1920, 1080, 960, 540)]
    #[case(1280, 720, 960, 540)]
    #[case(640, 480, 960, 540)]
    #[case(100, 100, 960, 540)]
    #[case(540, 960, 960, 540)]
    #[case(3000, 500, 960, 540)]
    #[case(7, 3, 960, 540)]
    fn test_fit_stays_inside_and_splits_margin(
        #[case] fw: u32,
        #[case] fh: u32,
        #[case] sw: u32,
        #[case] sh: u32,
    ) {
        let p = fit(fw, fh, sw, sh);
        assert!(p.width <= sw && p.height <= sh);
        assert!(p.width == sw || p.height == sh);
        let right = sw - p.width - p.x;
        let bottom = sh - p.height - p.y;
        assert!(right == p.x || right == p.x + 1);
        assert!(bottom == p.y || bottom == p.y + 1);
    }

    #[test]
    fn test_wider_frame_fills_width() {
        let p = fit(3000, 500, 960, 540);
        assert_eq!(p.width, 960);
        assert_eq!(p.height, 160);
        assert_eq!((p.x, p.y), (0, 190));
    }

    #[test]
    fn test_narrower_frame_fills_height() {
        let p = fit(100, 100, 960, 540);
        assert_eq!(
            p,
            Placement {
                x: 210,
                y: 0,
                width: 540,
                height: 540
            }
        );
    }

    #[test]
    fn test_same_ratio_fills_surface() {
        let p = fit(1920, 1080, 960, 540);
        assert_eq!((p.x, p.y, p.width, p.height), (0, 0, 960, 540));
    }

    #[test]
    fn test_odd_margin_puts_extra_pixel_right() {
        let p = fit(10, 10, 11, 10);
        assert_eq!((p.x, p.width), (0, 10));
    }

    #[test]
    fn test_degenerate_sizes_give_empty_placement() {
        assert_eq!(fit(0, 10, 960, 540).width, 0);
        assert_eq!(fit(10, 10, 0, 540).height, 0);
    }

    #[test]
    fn test_new_surface_is_opaque_black() {
        let surface = DisplaySurface::new(4, 2);
        assert_eq!(surface.pixels().len(), 4 * 2 * 4);
        assert!(surface.pixels().chunks(4).all(|p| p == [0, 0, 0, 255]));
        assert!(surface.placement().is_none());
    }

    #[rstest]
    fn test_present_letterboxes_red_frame(
        #[values(PixelFormat::Rgb, PixelFormat::Bgr)] format: PixelFormat,
    ) {
        let mut surface = DisplaySurface::new(96, 54);
        let placement = surface.present(&solid(100, 100, [255, 0, 0], format));
        assert_eq!(placement, fit(100, 100, 96, 54));
        assert_eq!(surface.placement(), Some(placement));

        let centre = surface.pixel(48, 27);
        assert!(centre[0] >= 250 && centre[1] <= 5 && centre[2] <= 5);
        assert_eq!(centre[3], 255);
        assert_eq!(surface.pixel(0, 27), [0, 0, 0, 255]);
        assert_eq!(surface.pixel(95, 27), [0, 0, 0, 255]);
    }

    #[test]
    fn test_present_clears_previous_frame() {
        let mut surface = DisplaySurface::new(20, 10);
        surface.present(&solid(20, 10, [255, 255, 255], PixelFormat::Rgb));
        assert_eq!(surface.pixel(0, 0), [255, 255, 255, 255]);

        surface.present(&solid(10, 10, [0, 255, 0], PixelFormat::Rgb));
        assert_eq!(surface.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(surface.pixel(10, 5), [0, 255, 0, 255]);
    }

    #[test]
    fn test_present_same_size_copies_exactly() {
        let mut data = vec![0u8; 4 * 2 * 3];
        data[..3].copy_from_slice(&[1, 2, 3]);
        let frame = Frame::new(data, 4, 2, PixelFormat::Rgb, 0);
        let mut surface = DisplaySurface::new(4, 2);
        surface.present(&frame);
        assert_eq!(surface.pixel(0, 0), [1, 2, 3, 255]);
        assert_eq!(surface.pixel(3, 1), [0, 0, 0, 255]);
    }
}
