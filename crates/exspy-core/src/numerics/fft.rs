//! FFT wrappers used by the Fourier deconvolution routines.
//!
//! Real transforms go through `realfft`; the complex transform needed by the
//! Kramers-Kronig analysis goes through `rustfft` directly. Inputs are
//! zero-padded to the requested 5-smooth size, which both speeds up the
//! planners and works around the circular-convolution wrap-around.

use num_complex::Complex64;
use realfft::RealFftPlanner;
use rustfft::FftPlanner;

pub type FftResult<T> = Result<T, FftComputeError>;

#[derive(Debug, thiserror::Error)]
pub enum FftComputeError {
    #[error("real FFT execution failed: {0}")]
    Real(#[from] realfft::FftError),
}

/// Smallest 5-smooth integer >= `target`.
pub fn next_fast_len(target: usize) -> usize {
    if target <= 1 {
        return 1;
    }
    let mut best = usize::MAX;
    let mut pow5: usize = 1;
    while pow5 < best {
        let mut pow35 = pow5;
        while pow35 < best {
            let mut candidate = pow35;
            while candidate < target {
                match candidate.checked_mul(2) {
                    Some(next) => candidate = next,
                    None => {
                        candidate = usize::MAX;
                        break;
                    }
                }
            }
            best = best.min(candidate);
            match pow35.checked_mul(3) {
                Some(next) => pow35 = next,
                None => break,
            }
        }
        match pow5.checked_mul(5) {
            Some(next) => pow5 = next,
            None => break,
        }
    }
    best
}

/// Forward real-to-complex transform of `input` zero-padded to `padded_len`.
/// Returns `padded_len / 2 + 1` bins.
pub fn rfft(input: &[f64], padded_len: usize) -> FftResult<Vec<Complex64>> {
    let mut planner = RealFftPlanner::<f64>::new();
    let transform = planner.plan_fft_forward(padded_len);
    let mut buffer = transform.make_input_vec();
    let copy_len = input.len().min(padded_len);
    buffer[..copy_len].copy_from_slice(&input[..copy_len]);
    let mut spectrum = transform.make_output_vec();
    transform.process(&mut buffer, &mut spectrum)?;
    Ok(spectrum)
}

/// Inverse complex-to-real transform, normalized by `padded_len`.
pub fn irfft(mut spectrum: Vec<Complex64>, padded_len: usize) -> FftResult<Vec<f64>> {
    let mut planner = RealFftPlanner::<f64>::new();
    let transform = planner.plan_fft_inverse(padded_len);
    // The inverse transform requires purely real DC and Nyquist bins.
    if let Some(first) = spectrum.first_mut() {
        first.im = 0.0;
    }
    if padded_len % 2 == 0 {
        if let Some(last) = spectrum.last_mut() {
            last.im = 0.0;
        }
    }
    let mut output = transform.make_output_vec();
    transform.process(&mut spectrum, &mut output)?;
    let norm = padded_len as f64;
    for value in &mut output {
        *value /= norm;
    }
    Ok(output)
}

/// In-place forward complex transform (unnormalized).
pub fn fft_in_place(buffer: &mut [Complex64]) {
    let mut planner = FftPlanner::new();
    let transform = planner.plan_fft_forward(buffer.len());
    transform.process(buffer);
}

#[cfg(test)]
mod tests {
    use super::{fft_in_place, irfft, next_fast_len, rfft};
    use num_complex::Complex64;

    #[test]
    fn next_fast_len_returns_five_smooth_sizes() {
        assert_eq!(next_fast_len(1), 1);
        assert_eq!(next_fast_len(5), 5);
        assert_eq!(next_fast_len(7), 8);
        assert_eq!(next_fast_len(11), 12);
        assert_eq!(next_fast_len(17), 18);
        assert_eq!(next_fast_len(97), 100);
        assert_eq!(next_fast_len(121), 125);
        assert_eq!(next_fast_len(1023), 1024);
    }

    #[test]
    fn real_round_trip_recovers_the_padded_signal() {
        let signal = [1.0, 2.0, 0.5, -1.0, 0.0, 3.0];
        let padded_len = next_fast_len(signal.len() + 3);
        let spectrum = rfft(&signal, padded_len).expect("forward");
        assert_eq!(spectrum.len(), padded_len / 2 + 1);
        let recovered = irfft(spectrum, padded_len).expect("inverse");
        for (index, value) in recovered.iter().enumerate() {
            let expected = signal.get(index).copied().unwrap_or(0.0);
            assert!(
                (value - expected).abs() < 1.0e-12,
                "channel {index}: {value} vs {expected}"
            );
        }
    }

    #[test]
    fn dc_bin_carries_the_signal_sum() {
        let signal = [1.0, 2.0, 3.0, 4.0];
        let spectrum = rfft(&signal, 4).expect("forward");
        assert!((spectrum[0].re - 10.0).abs() < 1.0e-12);
        assert!(spectrum[0].im.abs() < 1.0e-12);
    }

    #[test]
    fn complex_transform_of_an_impulse_is_flat() {
        let mut buffer = vec![Complex64::new(0.0, 0.0); 8];
        buffer[0] = Complex64::new(1.0, 0.0);
        fft_in_place(&mut buffer);
        for value in buffer {
            assert!((value.re - 1.0).abs() < 1.0e-12);
            assert!(value.im.abs() < 1.0e-12);
        }
    }
}
