//! Time alignment of a capture against its reference signal.

use rustfft::{FftPlanner, num_complex::Complex};

/// Estimate the lag of `recorded` relative to `reference` using FFT
/// cross-correlation. Positive lag means the capture is delayed.
pub fn estimate_lag(reference: &[f32], recorded: &[f32]) -> isize {
    let len = reference.len().min(recorded.len());
    if len == 0 {
        return 0;
    }

    // Zero-pad to avoid circular correlation artifacts.
    let fft_size = (len * 2).next_power_of_two();

    let ref_fft = fft_padded(reference, fft_size);
    let rec_fft = fft_padded(recorded, fft_size);

    // Cross-correlation in the frequency domain: conj(X) * Y.
    let mut cross: Vec<Complex<f32>> = ref_fft
        .iter()
        .zip(rec_fft.iter())
        .map(|(x, y)| x.conj() * y)
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_inverse(fft_size).process(&mut cross);

    let mut max_val = 0.0;
    let mut max_idx = 0;
    for (i, value) in cross.iter().enumerate() {
        let magnitude = value.norm();
        if magnitude > max_val {
            max_val = magnitude;
            max_idx = i;
        }
    }

    // Indices past the midpoint wrap around to negative lags.
    if max_idx <= fft_size / 2 {
        max_idx as isize
    } else {
        max_idx as isize - fft_size as isize
    }
}

/// Cut the window of `recorded` that lines up with `reference`,
/// zero-padding where the capture runs short. The result has exactly
/// `reference.len()` samples.
pub fn aligned_window(reference: &[f32], recorded: &[f32]) -> Vec<f32> {
    let lag = estimate_lag(reference, recorded);
    let mut out = vec![0.0_f32; reference.len()];
    for (i, slot) in out.iter_mut().enumerate() {
        let src = i as isize + lag;
        if src >= 0 && (src as usize) < recorded.len() {
            *slot = recorded[src as usize];
        }
    }
    out
}

fn fft_padded(signal: &[f32], fft_size: usize) -> Vec<Complex<f32>> {
    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));
    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(fft_size).process(&mut buffer);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_signals_have_zero_lag() {
        let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(estimate_lag(&signal, &signal), 0);
    }

    #[test]
    fn delayed_capture_has_positive_lag() {
        let reference = vec![1.0, 2.0, 3.0, 4.0, 5.0, 0.0, 0.0];
        let recorded = vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(estimate_lag(&reference, &recorded), 2);
    }

    #[test]
    fn leading_capture_has_negative_lag() {
        let reference = vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let recorded = vec![1.0, 2.0, 3.0, 4.0, 5.0, 0.0, 0.0];
        assert_eq!(estimate_lag(&reference, &recorded), -2);
    }

    #[test]
    fn aligned_window_compensates_the_delay() {
        let reference = vec![1.0, 2.0, 3.0, 4.0, 0.0, 0.0];
        let recorded = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 0.0];
        let aligned = aligned_window(&reference, &recorded);
        assert_eq!(aligned, vec![1.0, 2.0, 3.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn aligned_window_zero_pads_a_short_capture() {
        let reference = vec![5.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let recorded = vec![0.0, 0.0, 5.0, 1.0];
        let aligned = aligned_window(&reference, &recorded);
        assert_eq!(aligned.len(), reference.len());
        assert_eq!(&aligned[..2], &[5.0, 1.0]);
        assert_eq!(&aligned[2..], &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_inputs_are_harmless() {
        assert_eq!(estimate_lag(&[], &[1.0, 2.0]), 0);
        assert_eq!(aligned_window(&[], &[1.0, 2.0]), Vec::<f32>::new());
    }
}
