use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::{Rgb888, RgbColor},
    primitives::{Primitive, PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
    text::{Baseline, Text},
    Drawable, Pixel,
};
use ndarray::ArrayViewMut3;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::PixelFormat;

/// Drawing surface over a (possibly cropped) mutable frame view.
///
/// Pixels falling outside the view are dropped, so shapes and text may
/// run past the edges.
pub struct FrameCanvas<'a> {
    view: ArrayViewMut3<'a, u8>,
    format: PixelFormat,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(view: ArrayViewMut3<'a, u8>, format: PixelFormat) -> Self {
        Self { view, format }
    }

    /// Outlines `bbox` with a stroke of `thickness` pixels drawn inside the box.
    pub fn draw_box(&mut self, bbox: &BoundingBox, color: Rgb888, thickness: u32) {
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(color)
            .stroke_width(thickness)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();
        let _ = Rectangle::new(
            Point::new(bbox.x as i32, bbox.y as i32),
            Size::new(bbox.width, bbox.height),
        )
        .into_styled(style)
        .draw(self);
    }

    /// Draws `label` with its baseline starting at `(x, y)`.
    pub fn draw_label(&mut self, label: &str, x: i32, y: i32, color: Rgb888) {
        let style = MonoTextStyle::new(&FONT_10X20, color);
        let _ = Text::with_baseline(label, Point::new(x, y), style, Baseline::Alphabetic).draw(self);
    }
}

impl OriginDimensions for FrameCanvas<'_> {
    fn size(&self) -> Size {
        let shape = self.view.shape();
        Size::new(shape[1] as u32, shape[0] as u32)
    }
}

impl DrawTarget for FrameCanvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (height, width) = (self.view.shape()[0], self.view.shape()[1]);
        let (r, g, b) = self.format.rgb_offsets();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as usize, point.y as usize);
            if x >= width || y >= height {
                continue;
            }
            self.view[[y, x, r]] = color.r();
            self.view[[y, x, g]] = color.g();
            self.view[[y, x, b]] = color.b();
        }
        Ok(())
    }
}
