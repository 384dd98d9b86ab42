//! Constrained optimization test functions
//!
//! Each problem is an objective plus a constraint function returning one value
//! per inequality, with the convention `g_i(x) <= 0` when satisfied.

use ndarray::{Array1, array};

use super::unimodal::{rosenbrock, sphere};

/// Sphere restricted to the half-space `sum(x_i) >= 1`
/// Global minimum: f(x) = 1/n at x = (1/n, ..., 1/n), on the boundary
/// Bounds: x_i in [-5, 5]
pub fn sphere_halfspace_objective(x: &Array1<f64>) -> f64 {
    sphere(x)
}

pub fn sphere_halfspace_constraints(x: &Array1<f64>) -> Array1<f64> {
    array![1.0 - x.sum()]
}

/// Keane's bump function objective
/// Subject to: prod(x_i) >= 0.75 and sum(x_i) <= 7.5 n
/// Bounds: x_i in [0, 10]
pub fn keanes_bump_objective(x: &Array1<f64>) -> f64 {
    let sum_cos4: f64 = x.iter().map(|&xi| xi.cos().powi(4)).sum();
    let prod_cos2: f64 = x.iter().map(|&xi| xi.cos().powi(2)).product();
    let sum_i_xi2: f64 = x.iter().enumerate().map(|(i, &xi)| (i + 1) as f64 * xi.powi(2)).sum();
    if sum_i_xi2 == 0.0 {
        return 0.0;
    }
    -(sum_cos4 - 2.0 * prod_cos2).abs() / sum_i_xi2.sqrt()
}

pub fn keanes_bump_constraints(x: &Array1<f64>) -> Array1<f64> {
    let product: f64 = x.iter().product();
    let limit = 7.5 * x.len() as f64;
    array![0.75 - product, x.sum() - limit]
}

/// Binh-Korn problem, first objective
/// Subject to: x^2 + y^2 <= 25 and (x - 8)^2 + (y + 3)^2 >= 7.7
/// Bounds: x in [0, 5], y in [0, 3]
pub fn binh_korn_objective(x: &Array1<f64>) -> f64 {
    4.0 * x[0].powi(2) + 4.0 * x[1].powi(2)
}

pub fn binh_korn_constraints(x: &Array1<f64>) -> Array1<f64> {
    array![
        x[0].powi(2) + x[1].powi(2) - 25.0,
        7.7 - ((x[0] - 8.0).powi(2) + (x[1] + 3.0).powi(2))
    ]
}

/// Rosenbrock restricted to the disk x^2 + y^2 <= 2
/// Global minimum: f(x) = 0 at x = (1, 1), on the boundary
/// Bounds: x_i in [-1.5, 1.5]
pub fn rosenbrock_disk_objective(x: &Array1<f64>) -> f64 {
    rosenbrock(x)
}

pub fn rosenbrock_disk_constraints(x: &Array1<f64>) -> Array1<f64> {
    array![x[0].powi(2) + x[1].powi(2) - 2.0]
}

/// Mishra's Bird function objective
/// Global minimum: f(x) = -106.7645367 at x = (-3.1302468, -1.5821422)
/// Bounds: x in [-10, 0], y in [-6.5, 0]
pub fn mishras_bird_objective(x: &Array1<f64>) -> f64 {
    let (x1, x2) = (x[0], x[1]);
    x2.sin() * ((1.0 - x1.cos()).powi(2)).exp()
        + x1.cos() * ((1.0 - x2.sin()).powi(2)).exp()
        + (x1 - x2).powi(2)
}

/// Mishra's Bird constraint: (x + 5)^2 + (y + 5)^2 < 25
pub fn mishras_bird_constraints(x: &Array1<f64>) -> Array1<f64> {
    array![(x[0] + 5.0).powi(2) + (x[1] + 5.0).powi(2) - 25.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feasible(g: Array1<f64>) -> bool {
        g.iter().all(|&gi| gi <= 0.0)
    }

    #[test]
    fn test_halfspace_optimum_on_boundary() {
        let x = array![0.5, 0.5];
        assert_eq!(sphere_halfspace_objective(&x), 0.5);
        assert!(feasible(sphere_halfspace_constraints(&x)));
        assert!(!feasible(sphere_halfspace_constraints(&array![0.0, 0.0])));
    }

    #[test]
    fn test_rosenbrock_disk() {
        assert!(feasible(rosenbrock_disk_constraints(&array![1.0, 1.0])));
        assert_eq!(rosenbrock_disk_objective(&array![1.0, 1.0]), 0.0);
        assert!(!feasible(rosenbrock_disk_constraints(&array![1.5, 1.5])));
    }

    #[test]
    fn test_binh_korn() {
        assert!(feasible(binh_korn_constraints(&array![0.0, 0.0])));
        assert_eq!(binh_korn_objective(&array![0.0, 0.0]), 0.0);
        assert_eq!(binh_korn_constraints(&array![1.0, 1.0]).len(), 2);
    }

    #[test]
    fn test_keanes_bump() {
        let x = array![1.6, 0.47];
        assert!(feasible(keanes_bump_constraints(&x)));
        assert!(keanes_bump_objective(&x) < -0.3);
        assert!(!feasible(keanes_bump_constraints(&array![0.1, 0.1])));
        assert_eq!(keanes_bump_objective(&array![0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_mishras_bird_optimum() {
        let x = array![-3.1302468, -1.5821422];
        assert!((mishras_bird_objective(&x) + 106.7645367).abs() < 1e-4);
        assert!(feasible(mishras_bird_constraints(&x)));
    }
}
