/// Template matching implementation
///
/// Normalized cross-correlation coefficient (mean-centered, normalized by both
/// patches' deviations) between the sub image and every aligned window of the
/// main image. Window sums and squared sums come from summed-area tables; the
/// cross term is accumulated directly. Every sum is an exact integer, so the
/// only rounding is in the final division.
use super::error::{LocateError, LocateResult};
use super::types::ScoreMatrix;
use image::GrayImage;

/// Prefix sums of intensities and squared intensities, with a zero border row
/// and column so a window lookup needs no bounds special-casing.
struct SummedAreaTable {
    stride: usize,
    sums: Vec<u64>,
    squares: Vec<u64>,
}

impl SummedAreaTable {
    fn new(image: &GrayImage) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        let mut squares = vec![0u64; stride * (height + 1)];
        let raw = image.as_raw();

        for y in 0..height {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for x in 0..width {
                let v = raw[y * width + x] as u64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + (x + 1);
                sums[idx] = sums[idx - stride] + row_sum;
                squares[idx] = squares[idx - stride] + row_sq;
            }
        }

        Self {
            stride,
            sums,
            squares,
        }
    }

    /// (sum, sum of squares) of the `w`x`h` window with top-left (x, y).
    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (u64, u64) {
        let s = self.stride;
        let (a, b, c, d) = (
            y * s + x,
            y * s + x + w,
            (y + h) * s + x,
            (y + h) * s + x + w,
        );
        (
            self.sums[d] + self.sums[a] - self.sums[b] - self.sums[c],
            self.squares[d] + self.squares[a] - self.squares[b] - self.squares[c],
        )
    }
}

/// A prepared sub image, ready to be slid across any number of main images.
pub struct TemplateMatcher {
    template: GrayImage,
    pixel_count: i128,
    sum: i128,
    /// `n * sum(t^2) - sum(t)^2`, i.e. `n` times the sum of squared deviations
    scaled_variance: i128,
}

impl TemplateMatcher {
    pub fn new(template: GrayImage) -> Self {
        let pixel_count = template.width() as i128 * template.height() as i128;
        let (sum, sum_sq) = template.as_raw().iter().fold((0i128, 0i128), |(s, q), &v| {
            let v = v as i128;
            (s + v, q + v * v)
        });
        Self {
            template,
            pixel_count,
            sum,
            scaled_variance: pixel_count * sum_sq - sum * sum,
        }
    }

    pub fn template(&self) -> &GrayImage {
        &self.template
    }

    /// True when every template pixel has the same intensity.
    pub fn is_flat(&self) -> bool {
        self.scaled_variance == 0
    }

    /// Score every valid alignment of the template inside `image`.
    pub fn match_image(&self, image: &GrayImage) -> LocateResult<ScoreMatrix> {
        let (main_w, main_h) = image.dimensions();
        let (sub_w, sub_h) = self.template.dimensions();
        if sub_w > main_w || sub_h > main_h {
            return Err(LocateError::TemplateTooLarge {
                sub_width: sub_w,
                sub_height: sub_h,
                main_width: main_w,
                main_height: main_h,
            });
        }

        let out_w = main_w - sub_w + 1;
        let out_h = main_h - sub_h + 1;
        let (w, h) = (sub_w as usize, sub_h as usize);
        let main_stride = main_w as usize;
        let main_raw = image.as_raw();
        let tmpl_raw = self.template.as_raw();
        let table = SummedAreaTable::new(image);

        log::debug!(
            "🔍 Correlating {}x{} template over {}x{} image ({}x{} positions)",
            sub_w,
            sub_h,
            main_w,
            main_h,
            out_w,
            out_h
        );

        let mut scores = Vec::with_capacity(out_w as usize * out_h as usize);
        let report_interval = (out_h as usize / 10).max(1);

        for y in 0..out_h as usize {
            for x in 0..out_w as usize {
                let cross: u64 = (0..h)
                    .map(|r| {
                        let m_row = &main_raw[(y + r) * main_stride + x..][..w];
                        let t_row = &tmpl_raw[r * w..][..w];
                        m_row
                            .iter()
                            .zip(t_row)
                            .map(|(&m, &t)| m as u64 * t as u64)
                            .sum::<u64>()
                    })
                    .sum();
                let (sum, sum_sq) = table.window(x, y, w, h);
                scores.push(self.score(sum as i128, sum_sq as i128, cross as i128));
            }

            if (y + 1) % report_interval == 0 {
                log::trace!(
                    "  ⏳ Correlation scanning: {}%",
                    (y + 1) * 100 / out_h as usize
                );
            }
        }

        Ok(ScoreMatrix::new(out_w, out_h, scores))
    }

    /// Coefficient for one window given its exact integer sums.
    fn score(&self, window_sum: i128, window_sum_sq: i128, cross: i128) -> f32 {
        let n = self.pixel_count;
        let window_variance = n * window_sum_sq - window_sum * window_sum;

        if self.scaled_variance == 0 {
            // Undefined coefficient: a flat template only matches an identical flat patch.
            return if window_variance == 0 && window_sum == self.sum {
                1.0
            } else {
                0.0
            };
        }
        if window_variance == 0 {
            return 0.0;
        }

        let numerator = (n * cross - self.sum * window_sum) as f64;
        let denominator = (window_variance as f64 * self.scaled_variance as f64).sqrt();
        (numerator / denominator).clamp(-1.0, 1.0) as f32
    }
}

/// Score `sub` against every aligned window of `main`.
pub fn match_template(main: &GrayImage, sub: &GrayImage) -> LocateResult<ScoreMatrix> {
    TemplateMatcher::new(sub.clone()).match_image(main)
}
