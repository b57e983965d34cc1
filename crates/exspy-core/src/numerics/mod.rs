//! Shared numeric helpers for the spectrum kernels.

pub mod fft;

pub use fft::{fft_in_place, irfft, next_fast_len, rfft, FftComputeError};

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

/// Compensated summation; the quantification normalizations use this so the
/// per-pixel fractions keep summing to one for wildly scaled intensities.
pub fn stable_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;
    for value in values {
        kahan_add(&mut sum, &mut correction, value);
    }
    sum
}

/// Centered moving average with an odd window; the edges keep the original
/// samples where the window does not fit.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = if window % 2 == 0 { window + 1 } else { window };
    if window <= 1 || values.len() < window {
        return values.to_vec();
    }
    let half = window / 2;
    let mut smoothed = values.to_vec();
    for index in half..(values.len() - half) {
        smoothed[index] =
            values[(index - half)..=(index + half)].iter().sum::<f64>() / window as f64;
    }
    smoothed
}

/// Central finite-difference first derivative on a uniform grid, forward and
/// backward differences at the ends.
pub fn derivative(values: &[f64], step: f64) -> Vec<f64> {
    let len = values.len();
    if len < 2 {
        return vec![0.0; len];
    }
    let mut result = vec![0.0; len];
    result[0] = (values[1] - values[0]) / step;
    result[len - 1] = (values[len - 1] - values[len - 2]) / step;
    for index in 1..(len - 1) {
        result[index] = (values[index + 1] - values[index - 1]) / (2.0 * step);
    }
    result
}

/// Full linear convolution of two signals, `len = a + b - 1`.
pub fn convolve_full(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut result = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            result[i + j] += x * y;
        }
    }
    result
}
