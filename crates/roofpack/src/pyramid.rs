//! 2x pyramid expansion.
//!
//! The mask and the source image are both expanded once before packing so
//! that panel units measured in pixels are finer than the detection grid.
//! Expanding both the same way keeps them pixel-aligned.
//!
//! Expansion is the classic Gaussian-pyramid "up" step: insert zeros between
//! samples, then smooth with the 5-tap binomial kernel `[1, 4, 6, 4, 1] / 16`
//! scaled by 2 per axis. Done separably, each axis reduces to
//!
//! ```text
//! even output 2i   : (s[i-1] + 6 s[i] + s[i+1]) / 8
//! odd  output 2i+1 : (4 s[i] + 4 s[i+1])       / 8
//! ```
//!
//! with reflect-101 borders (`s[-1] = s[1]`, `s[n] = s[n-2]`).

use image::{ImageBuffer, Pixel};

/// Reflect-101 index into `0..n` (`-1 -> 1`, `n -> n - 2`).
#[inline]
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * (n - 1) - i;
    }
    i.clamp(0, n - 1) as usize
}

/// Expand one line of `len` samples, fetched through `read`, into `2 * len`
/// weighted sums scaled by 8.
#[inline]
fn expand_line(read: impl Fn(usize) -> u32, len: usize, out: &mut [u32]) {
    for i in 0..len {
        let prev = read(reflect101(i as isize - 1, len));
        let here = read(i);
        let next = read(reflect101(i as isize + 1, len));
        out[2 * i] = prev + 6 * here + next;
        out[2 * i + 1] = 4 * here + 4 * next;
    }
}

/// Expand an 8-bit image to twice its width and height.
///
/// Works for any `u8` pixel type (`GrayImage`, `RgbImage`, ...); channels
/// are filtered independently.
pub fn pyr_up<P>(src: &ImageBuffer<P, Vec<u8>>) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = src.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut out = ImageBuffer::<P, Vec<u8>>::new(width * 2, height * 2);
    if w == 0 || h == 0 {
        return out;
    }

    let channels = usize::from(P::CHANNEL_COUNT);
    let raw: &[u8] = src.as_raw();

    // Horizontal pass: h rows of 2w samples per channel, scaled by 8
    let mut horizontal = vec![0u32; h * 2 * w * channels];
    let mut line = vec![0u32; 2 * w];
    for y in 0..h {
        for c in 0..channels {
            expand_line(|x| u32::from(raw[(y * w + x) * channels + c]), w, &mut line);
            for (x, v) in line.iter().enumerate() {
                horizontal[(y * 2 * w + x) * channels + c] = *v;
            }
        }
    }

    // Vertical pass: 2h rows, total scale 64
    let out_w = 2 * w;
    let dst: &mut [u8] = &mut out;
    let mut column = vec![0u32; 2 * h];
    for x in 0..out_w {
        for c in 0..channels {
            expand_line(|y| horizontal[(y * out_w + x) * channels + c], h, &mut column);
            for (y, v) in column.iter().enumerate() {
                dst[(y * out_w + x) * channels + c] = ((v + 32) >> 6).min(255) as u8;
            }
        }
    }

    out
}

// ============================================================================
// TESTS
// ============================================================================
