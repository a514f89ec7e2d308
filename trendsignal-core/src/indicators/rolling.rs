//! Trailing-window extremes, shared by Fisher (mid-price range) and
//! Chandelier (highest high / lowest low).

use std::collections::VecDeque;

/// Rolling max (or min) over a trailing window via a monotonic deque.
///
/// `keep(a, b)` returns true when `a` should evict `b` from the back of the
/// deque (`>=` for max, `<=` for min). A NaN inside the window yields NaN.
fn rolling_extreme(values: &[f64], period: usize, keep: impl Fn(f64, f64) -> bool) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    let mut deque: VecDeque<usize> = VecDeque::with_capacity(period);
    let mut last_nan: Option<usize> = None;

    for i in 0..n {
        let v = values[i];
        if v.is_nan() {
            last_nan = Some(i);
        } else {
            while let Some(&back) = deque.back() {
                if keep(v, values[back]) {
                    deque.pop_back();
                } else {
                    break;
                }
            }
            deque.push_back(i);
        }

        while let Some(&front) = deque.front() {
            if front + period <= i {
                deque.pop_front();
            } else {
                break;
            }
        }

        if i + 1 < period {
            continue;
        }
        let window_start = i + 1 - period;
        let nan_in_window = last_nan.is_some_and(|j| j >= window_start);
        if !nan_in_window {
            if let Some(&front) = deque.front() {
                result[i] = values[front];
            }
        }
    }

    result
}

/// Highest value over the trailing `period` bars.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, |a, b| a >= b)
}

/// Lowest value over the trailing `period` bars.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, |a, b| a <= b)
}
