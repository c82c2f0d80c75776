use image::{DynamicImage, Rgb, RgbImage};
use image::imageops::{self, FilterType};

/// Padding colour used by Ultralytics exports
const PAD_VALUE: u8 = 114;

/// How a source image was fitted into the square model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    /// Map a point from model input space back to source pixels
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Resize keeping aspect ratio and pad to a `size` x `size` canvas, centred
pub fn letterbox(img: &DynamicImage, size: u32) -> (RgbImage, Letterbox) {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
    let scaled_w = ((width as f32 * scale).round() as u32).clamp(1, size);
    let scaled_h = ((height as f32 * scale).round() as u32).clamp(1, size);

    let resized = imageops::resize(&rgb, scaled_w, scaled_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
    let offset_x = (size - scaled_w) / 2;
    let offset_y = (size - scaled_h) / 2;
    imageops::overlay(&mut canvas, &resized, offset_x.into(), offset_y.into());

    (
        canvas,
        Letterbox {
            scale,
            pad_x: offset_x as f32,
            pad_y: offset_y as f32,
            source_width: width,
            source_height: height,
        },
    )
}

/// Flatten an RGB image into planar CHW floats in `[0, 1]`
pub fn to_chw(img: &RgbImage) -> Vec<f32> {
    let (width, height) = img.dimensions();
    let plane = (width * height) as usize;
    let mut data = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in img.enumerate_pixels() {
        let offset = (y * width + x) as usize;
        for channel in 0..3 {
            data[channel * plane + offset] = pixel[channel] as f32 / 255.0;
        }
    }
    data
}
