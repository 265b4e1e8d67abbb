//! Statistics with a vectorized primary backend and a manual-loop fallback.
//!
//! Every statistic is exposed as a plain function applying the engine-wide
//! edge-case policy: empty input yields 0 for aggregates, sample stdev and
//! variance need at least two values, geometric/harmonic means need strictly
//! positive inputs. Underneath, the [`Descriptive`] capability trait has two
//! implementations: [`Vectorized`] (statrs, behind the `vectorized` feature)
//! and [`LoopFallback`]. The loop backend runs whenever the vectorized one is
//! compiled out or yields a non-finite result, so a missing optional
//! dependency degrades speed, never availability.
//!
//! Order statistics (median, percentile, quartile) always use the loop
//! backend: they must interpolate linearly between order statistics
//! (spreadsheet-inclusive semantics), and statrs implements a different
//! quantile estimator.

use tracing::debug;

/// Descriptive statistics over a numeric slice. `None` means the backend
/// cannot produce a usable value for this input.
pub trait Descriptive {
    fn mean(&self, xs: &[f64]) -> Option<f64>;
    fn stdev(&self, xs: &[f64]) -> Option<f64>;
    fn variance(&self, xs: &[f64]) -> Option<f64>;
    fn min(&self, xs: &[f64]) -> Option<f64>;
    fn max(&self, xs: &[f64]) -> Option<f64>;
    fn geometric_mean(&self, xs: &[f64]) -> Option<f64>;
    fn harmonic_mean(&self, xs: &[f64]) -> Option<f64>;
}

/// statrs-backed backend. Compiles to a stub when `vectorized` is off.
pub struct Vectorized;

/// Manual loops. Always available.
pub struct LoopFallback;

#[cfg(feature = "vectorized")]
impl Descriptive for Vectorized {
    fn mean(&self, xs: &[f64]) -> Option<f64> {
        use statrs::statistics::Statistics;
        finite(xs.iter().mean())
    }

    fn stdev(&self, xs: &[f64]) -> Option<f64> {
        use statrs::statistics::Statistics;
        finite(xs.iter().std_dev())
    }

    fn variance(&self, xs: &[f64]) -> Option<f64> {
        use statrs::statistics::Statistics;
        finite(xs.iter().variance())
    }

    // Fully qualified: `Iterator::min`/`max` also apply to `xs.iter()`.
    fn min(&self, xs: &[f64]) -> Option<f64> {
        use statrs::statistics::Statistics;
        finite(Statistics::min(xs.iter()))
    }

    fn max(&self, xs: &[f64]) -> Option<f64> {
        use statrs::statistics::Statistics;
        finite(Statistics::max(xs.iter()))
    }

    fn geometric_mean(&self, xs: &[f64]) -> Option<f64> {
        use statrs::statistics::Statistics;
        finite(xs.iter().geometric_mean())
    }

    fn harmonic_mean(&self, xs: &[f64]) -> Option<f64> {
        use statrs::statistics::Statistics;
        finite(xs.iter().harmonic_mean())
    }
}

#[cfg(not(feature = "vectorized"))]
impl Descriptive for Vectorized {
    fn mean(&self, _: &[f64]) -> Option<f64> {
        None
    }
    fn stdev(&self, _: &[f64]) -> Option<f64> {
        None
    }
    fn variance(&self, _: &[f64]) -> Option<f64> {
        None
    }
    fn min(&self, _: &[f64]) -> Option<f64> {
        None
    }
    fn max(&self, _: &[f64]) -> Option<f64> {
        None
    }
    fn geometric_mean(&self, _: &[f64]) -> Option<f64> {
        None
    }
    fn harmonic_mean(&self, _: &[f64]) -> Option<f64> {
        None
    }
}

impl Descriptive for LoopFallback {
    fn mean(&self, xs: &[f64]) -> Option<f64> {
        if xs.is_empty() {
            return None;
        }
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }

    fn stdev(&self, xs: &[f64]) -> Option<f64> {
        self.variance(xs).map(f64::sqrt)
    }

    fn variance(&self, xs: &[f64]) -> Option<f64> {
        if xs.len() < 2 {
            return None;
        }
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        let sum_sq: f64 = xs.iter().map(|x| (x - mean) * (x - mean)).sum();
        Some(sum_sq / (xs.len() - 1) as f64)
    }

    fn min(&self, xs: &[f64]) -> Option<f64> {
        xs.iter().copied().reduce(f64::min)
    }

    fn max(&self, xs: &[f64]) -> Option<f64> {
        xs.iter().copied().reduce(f64::max)
    }

    fn geometric_mean(&self, xs: &[f64]) -> Option<f64> {
        if xs.is_empty() {
            return None;
        }
        let log_sum: f64 = xs.iter().map(|x| x.ln()).sum();
        Some((log_sum / xs.len() as f64).exp())
    }

    fn harmonic_mean(&self, xs: &[f64]) -> Option<f64> {
        if xs.is_empty() {
            return None;
        }
        let recip_sum: f64 = xs.iter().map(|x| 1.0 / x).sum();
        Some(xs.len() as f64 / recip_sum)
    }
}

#[cfg(feature = "vectorized")]
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

fn resolve<F>(name: &'static str, xs: &[f64], op: F) -> Option<f64>
where
    F: Fn(&dyn Descriptive, &[f64]) -> Option<f64>,
{
    if let Some(v) = op(&Vectorized, xs) {
        return Some(v);
    }
    if cfg!(feature = "vectorized") && !xs.is_empty() {
        debug!(stat = name, "vectorized backend degraded to manual loop");
    }
    op(&LoopFallback, xs)
}

pub fn sum(xs: &[f64]) -> f64 {
    xs.iter().sum()
}

pub fn count(xs: &[f64]) -> f64 {
    xs.len() as f64
}

pub fn mean(xs: &[f64]) -> f64 {
    resolve("mean", xs, |b, v| b.mean(v)).unwrap_or(0.0)
}

pub fn min(xs: &[f64]) -> f64 {
    resolve("min", xs, |b, v| b.min(v)).unwrap_or(0.0)
}

pub fn max(xs: &[f64]) -> f64 {
    resolve("max", xs, |b, v| b.max(v)).unwrap_or(0.0)
}

/// Sample standard deviation; 0 for fewer than two values.
pub fn stdev_sample(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    resolve("stdev", xs, |b, v| b.stdev(v)).unwrap_or(0.0)
}

/// Sample variance; 0 for fewer than two values.
pub fn var_sample(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    resolve("variance", xs, |b, v| b.variance(v)).unwrap_or(0.0)
}

/// Geometric mean; 0 unless every input is strictly positive.
pub fn geometric_mean(xs: &[f64]) -> f64 {
    if xs.is_empty() || xs.iter().any(|x| *x <= 0.0) {
        return 0.0;
    }
    resolve("geomean", xs, |b, v| b.geometric_mean(v)).unwrap_or(0.0)
}

/// Harmonic mean; 0 unless every input is strictly positive.
pub fn harmonic_mean(xs: &[f64]) -> f64 {
    if xs.is_empty() || xs.iter().any(|x| *x <= 0.0) {
        return 0.0;
    }
    resolve("harmean", xs, |b, v| b.harmonic_mean(v)).unwrap_or(0.0)
}

/// Inclusive percentile with linear interpolation between order statistics.
/// `fraction` must already be validated to lie in 0..=1.
pub fn percentile(xs: &[f64], fraction: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = fraction * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

pub fn median(xs: &[f64]) -> f64 {
    percentile(xs, 0.5)
}

/// Quartile 0..=3 as fractions 0, 0.25, 0.5, 0.75.
pub fn quartile(xs: &[f64], index: u8) -> f64 {
    percentile(xs, f64::from(index) * 0.25)
}

/// Most frequent value; ties resolve to the smallest value, empty input to 0.
pub fn mode(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best = sorted[0];
    let mut best_count = 0usize;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_count {
            best_count = j - i;
            best = sorted[i];
        }
        i = j;
    }
    best
}

/// Sample skewness (spreadsheet SKEW); 0 for fewer than three values or zero
/// spread.
pub fn skewness(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 3 {
        return 0.0;
    }
    let s = stdev_sample(xs);
    if s == 0.0 {
        return 0.0;
    }
    let m = mean(xs);
    let cubed: f64 = xs.iter().map(|x| ((x - m) / s).powi(3)).sum();
    let n = n as f64;
    n / ((n - 1.0) * (n - 2.0)) * cubed
}

/// Sample excess kurtosis (spreadsheet KURT); 0 for fewer than four values or
/// zero spread.
pub fn kurtosis(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 4 {
        return 0.0;
    }
    let s = stdev_sample(xs);
    if s == 0.0 {
        return 0.0;
    }
    let m = mean(xs);
    let fourth: f64 = xs.iter().map(|x| ((x - m) / s).powi(4)).sum();
    let n = n as f64;
    n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0)) * fourth
        - 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(sum(&SAMPLE), 40.0);
        assert_eq!(mean(&SAMPLE), 5.0);
        assert_eq!(min(&SAMPLE), 2.0);
        assert_eq!(max(&SAMPLE), 9.0);
        assert_eq!(count(&SAMPLE), 8.0);
    }

    #[test]
    fn test_median_and_sample_spread() {
        assert_eq!(median(&SAMPLE), 4.5);
        assert!(close(var_sample(&SAMPLE), 4.571));
        assert!(close(stdev_sample(&SAMPLE), 2.138));
    }

    #[test]
    fn test_empty_input_policy() {
        assert_eq!(sum(&[]), 0.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(stdev_sample(&[]), 0.0);
        assert_eq!(var_sample(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(mode(&[]), 0.0);
    }

    #[test]
    fn test_single_value_spread_is_zero() {
        assert_eq!(stdev_sample(&[5.0]), 0.0);
        assert_eq!(var_sample(&[5.0]), 0.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&xs, 0.0), 1.0);
        assert_eq!(percentile(&xs, 1.0), 4.0);
        assert_eq!(percentile(&xs, 0.5), 2.5);
        assert!(close(percentile(&xs, 0.9), 3.7));
    }

    #[test]
    fn test_quartiles() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quartile(&xs, 0), 1.0);
        assert_eq!(quartile(&xs, 1), 2.0);
        assert_eq!(quartile(&xs, 2), 3.0);
        assert_eq!(quartile(&xs, 3), 4.0);
    }

    #[test]
    fn test_mode_prefers_smallest_on_tie() {
        assert_eq!(mode(&[3.0, 1.0, 3.0, 1.0, 2.0]), 1.0);
        assert_eq!(mode(&[2.0, 4.0, 4.0, 5.0]), 4.0);
    }

    #[test]
    fn test_positive_only_means() {
        assert!(close(geometric_mean(&[1.0, 4.0, 16.0]), 4.0));
        assert!(close(harmonic_mean(&[2.0, 2.0]), 2.0));
        assert_eq!(geometric_mean(&[1.0, -2.0]), 0.0);
        assert_eq!(harmonic_mean(&[0.0, 1.0]), 0.0);
        assert_eq!(geometric_mean(&[]), 0.0);
    }

    #[test]
    fn test_skewness_symmetry() {
        assert!(close(skewness(&[1.0, 2.0, 3.0]), 0.0));
        assert!(skewness(&[1.0, 1.0, 1.0, 10.0]) > 0.0);
        assert_eq!(skewness(&[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_kurtosis_edge_cases() {
        assert_eq!(kurtosis(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(kurtosis(&[5.0, 5.0, 5.0, 5.0]), 0.0);
        // Uniform-ish spread has negative excess kurtosis.
        assert!(kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]) < 0.0);
    }

    #[test]
    fn test_loop_backend_matches_wrappers() {
        let backend = LoopFallback;
        assert_eq!(backend.mean(&SAMPLE), Some(5.0));
        assert!(close(backend.variance(&SAMPLE).unwrap(), 4.571));
        assert_eq!(backend.mean(&[]), None);
        assert_eq!(backend.variance(&[1.0]), None);
    }
}
