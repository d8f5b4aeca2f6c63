//! Moving-average smoothing for display curves.

use ndarray::Array1;

use crate::error::DspError;

/// Map the raw user smoothing value to a window size. The `2k + 1` form is
/// the caller contract that keeps the window odd.
#[inline]
pub fn window_for(raw: usize) -> usize {
    2 * raw + 1
}

/// Edge-replicated moving average with an odd `window`.
///
/// The input is padded on both sides by `window / 2` copies of its edge
/// values and convolved with a uniform kernel of weight `1/window`; only
/// the valid region is kept, so the output length equals the input length.
pub fn moving_average(values: &Array1<f64>, window: usize) -> Result<Array1<f64>, DspError> {
    if window % 2 == 0 {
        return Err(DspError::InvalidWindow(window));
    }
    if values.is_empty() {
        return Ok(values.clone());
    }

    let half = window / 2;
    let n = values.len();
    let mut padded = Vec::with_capacity(n + 2 * half);
    padded.extend(std::iter::repeat_n(values[0], half));
    padded.extend(values.iter().copied());
    padded.extend(std::iter::repeat_n(values[n - 1], half));

    // Sliding-window sum over the padded data.
    let mut out = Array1::zeros(n);
    let mut acc: f64 = padded[..window].iter().sum();
    out[0] = acc / window as f64;
    for i in 1..n {
        acc += padded[i + window - 1] - padded[i - 1];
        out[i] = acc / window as f64;
    }
    Ok(out)
}
