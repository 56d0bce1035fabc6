use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

pub const WHITE: Luma<u8> = Luma([u8::MAX]);
pub const BLACK: Luma<u8> = Luma([u8::MIN]);

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Normalizes any supported channel layout to a 3-channel color image:
/// 4-channel input drops its alpha plane, 1-channel input replicates its
/// single plane into all three channels.
pub fn normalize_channels(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}

/// Locally-normalized inverted binary threshold.
///
/// Each pixel is compared against the mean of the `window`×`window`
/// neighborhood around it (clamped at the image border): pixels at least
/// `bias` darker than their neighborhood become foreground (white), all
/// others become background (black). Uneven sheet lighting shifts the local
/// mean along with the pixels, which a single global threshold cannot
/// tolerate.
pub fn adaptive_threshold_inv(gray: &GrayImage, window: u32, bias: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let radius = window / 2;
    let integral = integral_image(gray);

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let local_mean = region_mean(&integral, width, height, x, y, radius);
            let pixel = f64::from(gray.get_pixel(x, y).0[0]);
            if pixel <= local_mean - f64::from(bias) {
                out.put_pixel(x, y, WHITE);
            } else {
                out.put_pixel(x, y, BLACK);
            }
        }
    }
    out
}

/// Summed-area table with a zero-padded border: entry `(x + 1, y + 1)` holds
/// the sum of all pixels in the rectangle from the origin to `(x, y)`
/// inclusive.
fn integral_image(gray: &GrayImage) -> Vec<u64> {
    let (width, height) = gray.dimensions();
    let stride = (width + 1) as usize;
    let mut table = vec![0u64; stride * (height + 1) as usize];

    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += u64::from(gray.get_pixel(x, y).0[0]);
            let index = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[index] = row_sum + table[above];
        }
    }
    table
}

/// Mean pixel value of the square region centered on `(cx, cy)`, clamped to
/// the image bounds.
fn region_mean(integral: &[u64], width: u32, height: u32, cx: u32, cy: u32, radius: u32) -> f64 {
    let stride = (width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = ((cx + radius + 1) as usize).min(width as usize);
    let y2 = ((cy + radius + 1) as usize).min(height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    let sum = integral[y2 * stride + x2] as f64 - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;
    sum / area
}
