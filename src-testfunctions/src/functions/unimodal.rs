//! Unimodal test functions

use ndarray::Array1;

/// Sphere function
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5, 5]
pub fn sphere(x: &Array1<f64>) -> f64 {
    x.iter().map(|&xi| xi * xi).sum()
}

/// Axis-parallel ellipsoid with condition number 1e6
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5, 5]
pub fn ellipsoid(x: &Array1<f64>) -> f64 {
    let n = x.len();
    if n == 1 {
        return x[0] * x[0];
    }
    x.iter()
        .enumerate()
        .map(|(i, &xi)| 1e6_f64.powf(i as f64 / (n - 1) as f64) * xi * xi)
        .sum()
}

/// Rosenbrock function, N-dimensional
/// Global minimum: f(x) = 0 at x = (1, 1, ..., 1)
/// Bounds: x_i in [-2.048, 2.048]
pub fn rosenbrock(x: &Array1<f64>) -> f64 {
    x.iter()
        .zip(x.iter().skip(1))
        .map(|(&a, &b)| 100.0 * (b - a * a).powi(2) + (1.0 - a).powi(2))
        .sum()
}

/// Sum of squares, weighted by index
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-10, 10]
pub fn sum_squares(x: &Array1<f64>) -> f64 {
    x.iter().enumerate().map(|(i, &xi)| (i + 1) as f64 * xi * xi).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_minima() {
        assert_eq!(sphere(&array![0.0, 0.0, 0.0]), 0.0);
        assert_eq!(ellipsoid(&array![0.0, 0.0]), 0.0);
        assert_eq!(rosenbrock(&array![1.0, 1.0, 1.0]), 0.0);
        assert_eq!(sum_squares(&array![0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_values() {
        assert_eq!(sphere(&array![1.0, 2.0]), 5.0);
        assert_eq!(sum_squares(&array![1.0, 1.0]), 3.0);
        assert_eq!(rosenbrock(&array![0.0, 0.0]), 1.0);
        assert!((ellipsoid(&array![0.0, 1.0]) - 1e6).abs() < 1e-6);
        assert_eq!(ellipsoid(&array![2.0]), 4.0);
    }
}
