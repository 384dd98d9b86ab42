//! Multimodal test functions

use ndarray::Array1;
use std::f64::consts::{E, PI};

/// Rastrigin function - highly multimodal
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5.12, 5.12]
pub fn rastrigin(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let sum: f64 = x.iter().map(|&xi| xi.powi(2) - 10.0 * (2.0 * PI * xi).cos()).sum();
    10.0 * n + sum
}

/// Ackley function - N-dimensional multimodal
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-32.768, 32.768]
pub fn ackley(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let sum_sq: f64 = x.iter().map(|&xi| xi.powi(2)).sum();
    let sum_cos: f64 = x.iter().map(|&xi| (2.0 * PI * xi).cos()).sum();
    -20.0 * (-0.2 * (sum_sq / n).sqrt()).exp() - (sum_cos / n).exp() + 20.0 + E
}

/// Griewank function
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-600, 600]
pub fn griewank(x: &Array1<f64>) -> f64 {
    let sum_squares: f64 = x.iter().map(|&xi| xi.powi(2)).sum();
    let product_cos: f64 = x
        .iter()
        .enumerate()
        .map(|(i, &xi)| (xi / ((i + 1) as f64).sqrt()).cos())
        .product();
    1.0 + sum_squares / 4000.0 - product_cos
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_minima() {
        let origin = array![0.0, 0.0, 0.0];
        assert!(rastrigin(&origin).abs() < 1e-12);
        assert!(ackley(&origin).abs() < 1e-12);
        assert!(griewank(&origin).abs() < 1e-12);
    }

    #[test]
    fn test_local_minimum_is_worse() {
        // Rastrigin has a local minimum close to every integer point
        assert!(rastrigin(&array![1.0, 0.0]) > 0.9);
        assert!(ackley(&array![1.0, 1.0]) > 3.0);
    }
}
