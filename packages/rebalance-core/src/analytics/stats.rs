//! Descriptive statistics shared by the metrics and benchmark modules.

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample covariance (n - 1 denominator).
///
/// `None` when the slices differ in length or hold fewer than two points.
/// Exactly 0 when either slice is constant, where the mean's rounding error
/// would otherwise leave a tiny non-zero result.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    if is_constant(x) || is_constant(y) {
        return Some(0.0);
    }

    let mean_x = mean(x);
    let mean_y = mean(y);
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();

    Some(sum / (x.len() - 1) as f64)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Sample variance (n - 1 denominator), `None` below two points.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    sample_covariance(values, values)
}

/// Sample standard deviation, `None` below two points.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(|v| v.max(0.0).sqrt())
}

/// Inverse cumulative distribution function for standard normal distribution.
///
/// Uses Acklam's algorithm for high accuracy across the full range.
/// Source: https://web.archive.org/web/20151110174102/http://home.online.no/~pjacklam/notes/invnorm/
pub fn norm_ppf(p: f64) -> f64 {
    // Coefficients in rational approximations
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];

    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];

    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];

    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_sample_std() {
        // Sample variance of 2, 4, 4, 4, 5, 5, 7, 9 is 32 / 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(sample_std(&values).unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);

        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(sample_std(&[]), None);
        assert_eq!(sample_std(&[0.5, 0.5, 0.5]), Some(0.0));
    }

    #[test]
    fn test_constant_series_has_exact_zero_spread() {
        // The mean of fifty 0.01s is not exactly 0.01
        let constant = vec![0.01; 50];
        assert_eq!(sample_variance(&constant), Some(0.0));
        assert_eq!(sample_std(&constant), Some(0.0));

        let x = [0.01, 0.02, -0.03];
        assert_eq!(sample_covariance(&x, &[0.001; 3]), Some(0.0));
        assert_eq!(sample_covariance(&[0.001; 3], &x), Some(0.0));
    }

    #[test]
    fn test_sample_covariance() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        // var(x) = 5/3, cov(x, 2x) = 10/3
        assert_abs_diff_eq!(sample_covariance(&x, &y).unwrap(), 10.0 / 3.0, epsilon = 1e-12);
        assert_eq!(sample_covariance(&x, &y[..3]), None);
    }

    #[test]
    fn test_norm_ppf() {
        assert!((norm_ppf(0.5)).abs() < 0.001);
        assert!((norm_ppf(0.95) - 1.645).abs() < 0.01);
        assert!((norm_ppf(0.975) - 1.96).abs() < 0.01);
        assert!((norm_ppf(0.99) - 2.326).abs() < 0.01);
        assert!((norm_ppf(0.05) + 1.645).abs() < 0.01);
        assert!((norm_ppf(0.01) + 2.326).abs() < 0.01);
        assert_eq!(norm_ppf(0.0), f64::NEG_INFINITY);
    }
}
