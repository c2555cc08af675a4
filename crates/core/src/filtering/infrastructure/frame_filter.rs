use std::borrow::Cow;

use image::GrayImage;

use crate::filtering::domain::filter_mode::FilterMode;
use crate::filtering::infrastructure::gaussian::{gaussian_kernel_1d, separable_gaussian_blur};
use crate::shared::constants::{
    BLUR_KERNEL_SIZE, CANNY_HIGH_THRESHOLD, CANNY_LOW_THRESHOLD, SEPIA_MATRIX,
};
use crate::shared::frame::{Frame, CHANNELS};

/// Applies `mode` to `frame`, returning a new frame.
///
/// `FilterMode::None` borrows the input instead of copying it. The input
/// is never modified; output keeps dimensions, channel count and format.
pub fn apply_filter(frame: &Frame, mode: FilterMode) -> Cow<'_, Frame> {
    match mode {
        FilterMode::None => Cow::Borrowed(frame),
        FilterMode::Grayscale => Cow::Owned(grayscale(frame)),
        FilterMode::Sepia => Cow::Owned(sepia(frame)),
        FilterMode::Blur => Cow::Owned(blur(frame)),
        FilterMode::EdgeDetection => Cow::Owned(edges(frame)),
    }
}

fn grayscale(frame: &Frame) -> Frame {
    replicate_gray(frame, &frame.to_luma())
}

fn sepia(frame: &Frame) -> Frame {
    let (r, g, b) = frame.format().rgb_offsets();
    // matrix rows are in blue, green, red order
    let order = [b, g, r];
    let mut out = vec![0u8; frame.data().len()];
    for (src, dst) in frame
        .data()
        .chunks_exact(CHANNELS as usize)
        .zip(out.chunks_exact_mut(CHANNELS as usize))
    {
        let input = [src[b] as f32, src[g] as f32, src[r] as f32];
        for (row, &channel) in SEPIA_MATRIX.iter().zip(order.iter()) {
            let v = row[0] * input[0] + row[1] * input[1] + row[2] * input[2];
            dst[channel] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    frame.with_data(out)
}

fn blur(frame: &Frame) -> Frame {
    let kernel = gaussian_kernel_1d(BLUR_KERNEL_SIZE);
    let mut out = vec![0u8; frame.data().len()];
    let mut temp = Vec::new();
    separable_gaussian_blur(
        frame.data(),
        &mut out,
        frame.width() as usize,
        frame.height() as usize,
        CHANNELS as usize,
        &kernel,
        &mut temp,
    );
    frame.with_data(out)
}

fn edges(frame: &Frame) -> Frame {
    let gray = frame.to_luma();
    let edges = imageproc::edges::canny(&gray, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);
    replicate_gray(frame, &edges)
}

/// Copies a single-channel image into all three channels of a frame
/// shaped like `like`.
fn replicate_gray(like: &Frame, gray: &GrayImage) -> Frame {
    let data = gray.as_raw().iter().flat_map(|&v| [v, v, v]).collect();
    like.with_data(data)
}
