//! Purpose: Two-sided Wilcoxon signed-rank test for paired samples.
//! Exports: `WilcoxonResult`, `WilcoxonMethod`, `signed_rank`.
//! Role: p-value engine behind `significance_comparison`.
//! Invariants: Zero differences are discarded before ranking; ties get average ranks.
//! Invariants: Exact null distribution only for <= 50 pairs with no ties and no zero differences.
use crate::core::error::{Error, ErrorKind};

/// Largest untied sample that uses the exact null distribution.
const EXACT_MAX_N: usize = 50;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WilcoxonMethod {
    Exact,
    Normal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WilcoxonResult {
    /// `min(W+, W-)`.
    pub statistic: f64,
    pub p_value: f64,
    /// Pairs left after dropping zero differences.
    pub n: usize,
    pub method: WilcoxonMethod,
}

pub fn signed_rank(x: &[f64], y: &[f64]) -> Result<WilcoxonResult, Error> {
    if x.len() != y.len() {
        return Err(Error::new(ErrorKind::Validation).with_message(format!(
            "paired samples must have equal length (got {} and {})",
            x.len(),
            y.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(Error::new(ErrorKind::Validation)
            .with_message("paired samples must contain only finite numbers"));
    }

    let diffs: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(a, b)| a - b)
        .filter(|d| *d != 0.0)
        .collect();
    let n = diffs.len();
    let had_zeros = n < x.len();
    if n == 0 {
        return Ok(WilcoxonResult {
            statistic: 0.0,
            p_value: 1.0,
            n,
            method: WilcoxonMethod::Normal,
        });
    }

    let (ranks, tie_sizes) = average_ranks(&diffs);
    let (mut w_plus, mut w_minus) = (0.0, 0.0);
    for (d, r) in diffs.iter().zip(&ranks) {
        if *d > 0.0 {
            w_plus += r;
        } else {
            w_minus += r;
        }
    }
    let statistic = f64::min(w_plus, w_minus);

    if n <= EXACT_MAX_N && tie_sizes.is_empty() && !had_zeros {
        let p_value = (2.0 * exact_lower_tail(n, statistic)).min(1.0);
        return Ok(WilcoxonResult {
            statistic,
            p_value,
            n,
            method: WilcoxonMethod::Exact,
        });
    }

    let nf = n as f64;
    let mean = nf * (nf + 1.0) / 4.0;
    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_term / 48.0;
    let p_value = if variance > 0.0 {
        let z = (statistic - mean) / variance.sqrt();
        (2.0 * standard_normal_cdf(z)).min(1.0)
    } else {
        1.0
    };
    Ok(WilcoxonResult {
        statistic,
        p_value,
        n,
        method: WilcoxonMethod::Normal,
    })
}

/// Ranks of `|d|` (1-based, ties averaged) plus the size of every tie group larger than one.
fn average_ranks(diffs: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..diffs.len()).collect();
    order.sort_by(|&a, &b| diffs[a].abs().total_cmp(&diffs[b].abs()));

    let mut ranks = vec![0.0; diffs.len()];
    let mut tie_sizes = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let value = diffs[order[start]].abs();
        let mut end = start + 1;
        while end < order.len() && diffs[order[end]].abs() == value {
            end += 1;
        }
        // Positions start..end share ranks start+1..=end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        if end - start > 1 {
            tie_sizes.push(end - start);
        }
        start = end;
    }
    (ranks, tie_sizes)
}

/// `P(W <= statistic)` under the null, counting subsets of `1..=n` by rank sum.
fn exact_lower_tail(n: usize, statistic: f64) -> f64 {
    let max_sum = n * (n + 1) / 2;
    let mut counts = vec![0.0f64; max_sum + 1];
    counts[0] = 1.0;
    for k in 1..=n {
        for sum in (k..=max_sum).rev() {
            counts[sum] += counts[sum - k];
        }
    }
    let upto = (statistic.floor() as usize).min(max_sum);
    let hits: f64 = counts[..=upto].iter().sum();
    hits / 2f64.powi(n as i32)
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * statrs::function::erf::erfc(-z / std::f64::consts::SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::{WilcoxonMethod, average_ranks, signed_rank};
    use crate::core::error::ErrorKind;

    #[test]
    fn ties_share_average_rank() {
        let (ranks, ties) = average_ranks(&[1.0, -1.0, 3.0, 2.0]);
        assert_eq!(ranks, vec![1.5, 1.5, 4.0, 3.0]);
        assert_eq!(ties, vec![2]);
    }

    #[test]
    fn exact_all_positive_differences() {
        let x = [2.0, 4.0, 6.0, 8.0, 10.0];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = signed_rank(&x, &y).unwrap();
        assert_eq!(result.method, WilcoxonMethod::Exact);
        assert_eq!(result.statistic, 0.0);
        assert!((result.p_value - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn exact_mixed_signs() {
        // Differences 1, -2, 3, 4, 5, -6: W- = 8.
        let x = [1.0, 0.0, 3.0, 4.0, 5.0, 0.0];
        let y = [0.0, 2.0, 0.0, 0.0, 0.0, 6.0];
        let result = signed_rank(&x, &y).unwrap();
        assert_eq!(result.statistic, 8.0);
        assert!((result.p_value - 0.6875).abs() < 1e-12);
    }

    #[test]
    fn ties_use_normal_approximation_with_correction() {
        let x = [1.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0; 5];
        let result = signed_rank(&x, &y).unwrap();
        assert_eq!(result.method, WilcoxonMethod::Normal);
        assert!((result.p_value - 0.042_168_197).abs() < 1e-6);
    }

    #[test]
    fn large_samples_use_normal_approximation() {
        let x: Vec<f64> = (1..=60).map(f64::from).collect();
        let y = vec![0.0; 60];
        let result = signed_rank(&x, &y).unwrap();
        assert_eq!(result.method, WilcoxonMethod::Normal);
        assert!((result.p_value - 1.629_555_794e-11).abs() < 1e-15);
    }

    #[test]
    fn zero_differences_force_normal_approximation() {
        // Differences 0, 1, 2, 3, 4, 5: n = 5 after dropping the zero, T = 0.
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [1.0; 6];
        let result = signed_rank(&x, &y).unwrap();
        assert_eq!(result.n, 5);
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.method, WilcoxonMethod::Normal);
        assert!((result.p_value - 0.043_114_447).abs() < 1e-6);
    }

    #[test]
    fn zero_differences_are_dropped() {
        let result = signed_rank(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(result.n, 0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn invalid_inputs_are_validation_errors() {
        let err = signed_rank(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = signed_rank(&[f64::NAN], &[1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
