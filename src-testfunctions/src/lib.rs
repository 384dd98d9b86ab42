//! Optimization test functions library
//!
//! Benchmark problems for the RayEs solver, organized by category:
//!
//! - **Unimodal**: sphere, ellipsoid, rosenbrock, sum of squares
//! - **Multimodal**: rastrigin, ackley, griewank
//! - **Constrained**: objectives paired with vector-valued inequality
//!   constraints (`g(x) <= 0` when satisfied)
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array1;
//! use rayes_testfunctions::*;
//!
//! let x = Array1::from_vec(vec![0.0, 0.0]);
//! assert_eq!(sphere(&x), 0.0);
//!
//! let problem = get_test_problem("rosenbrock_disk", 2).unwrap();
//! assert_eq!(problem.n_constraints(), 1);
//! assert_eq!(problem.optimum, Some(0.0));
//! ```

use ndarray::Array1;
use std::collections::HashMap;

pub mod functions;
pub use functions::*;

/// Objective signature shared by all test functions
pub type ObjectiveFn = fn(&Array1<f64>) -> f64;
/// Constraint signature: one value per inequality, `<= 0` when satisfied
pub type ConstraintsFn = fn(&Array1<f64>) -> Array1<f64>;

/// Metadata for a test function
#[derive(Debug, Clone)]
pub struct FunctionMetadata {
    pub name: String,
    /// Bounds for each dimension (min, max); a single pair for scalable functions
    pub bounds: Vec<(f64, f64)>,
    /// Global minimum value, when known and independent of the dimension
    pub global_minimum: Option<f64>,
    /// Number of inequality constraints
    pub n_constraints: usize,
    pub description: String,
    pub multimodal: bool,
    /// Any dimension >= 1 is accepted
    pub scalable: bool,
}

impl FunctionMetadata {
    fn new(name: &str, bounds: Vec<(f64, f64)>, global_minimum: Option<f64>, description: &str) -> Self {
        Self {
            name: name.to_string(),
            bounds,
            global_minimum,
            n_constraints: 0,
            description: description.to_string(),
            multimodal: false,
            scalable: false,
        }
    }

    fn scalable(mut self) -> Self {
        self.scalable = true;
        self
    }

    fn multimodal(mut self) -> Self {
        self.multimodal = true;
        self
    }

    fn constraints(mut self, n: usize) -> Self {
        self.n_constraints = n;
        self
    }

    /// Bounds expanded to `dim`, or `None` if the function does not accept it
    pub fn bounds_for(&self, dim: usize) -> Option<Vec<(f64, f64)>> {
        if dim == 0 {
            None
        } else if self.scalable {
            self.bounds.first().map(|&b| vec![b; dim])
        } else if self.bounds.len() == dim {
            Some(self.bounds.clone())
        } else {
            None
        }
    }
}

/// Get metadata for all available test functions
pub fn get_function_metadata() -> HashMap<String, FunctionMetadata> {
    let entries = vec![
        FunctionMetadata::new("sphere", vec![(-5.0, 5.0)], Some(0.0), "N-dimensional bowl").scalable(),
        FunctionMetadata::new("ellipsoid", vec![(-5.0, 5.0)], Some(0.0), "Ill-conditioned bowl, condition 1e6")
            .scalable(),
        FunctionMetadata::new("rosenbrock", vec![(-2.048, 2.048)], Some(0.0), "Curved valley").scalable(),
        FunctionMetadata::new("sum_squares", vec![(-10.0, 10.0)], Some(0.0), "Index-weighted bowl").scalable(),
        FunctionMetadata::new("rastrigin", vec![(-5.12, 5.12)], Some(0.0), "Highly multimodal")
            .scalable()
            .multimodal(),
        FunctionMetadata::new("ackley", vec![(-32.768, 32.768)], Some(0.0), "N-dimensional multimodal function")
            .scalable()
            .multimodal(),
        FunctionMetadata::new("griewank", vec![(-600.0, 600.0)], Some(0.0), "Multimodal with product term")
            .scalable()
            .multimodal(),
        FunctionMetadata::new(
            "sphere_halfspace",
            vec![(-5.0, 5.0)],
            None,
            "Sphere restricted to sum(x) >= 1; optimum 1/n on the boundary",
        )
        .scalable()
        .constraints(1),
        FunctionMetadata::new("keanes_bump", vec![(0.0, 10.0)], None, "Keane's bump, two constraints")
            .scalable()
            .multimodal()
            .constraints(2),
        FunctionMetadata::new("binh_korn", vec![(0.0, 5.0), (0.0, 3.0)], Some(0.0), "Binh-Korn first objective")
            .constraints(2),
        FunctionMetadata::new(
            "rosenbrock_disk",
            vec![(-1.5, 1.5), (-1.5, 1.5)],
            Some(0.0),
            "Rosenbrock on the disk x^2 + y^2 <= 2",
        )
        .constraints(1),
        FunctionMetadata::new(
            "mishras_bird",
            vec![(-10.0, 0.0), (-6.5, 0.0)],
            Some(-106.7645367),
            "Mishra's bird in a disk",
        )
        .multimodal()
        .constraints(1),
    ];
    entries.into_iter().map(|m| (m.name.clone(), m)).collect()
}

/// Helper function to get the default bounds for a specific function
/// Returns None if function is not found in metadata
pub fn get_function_bounds(function_name: &str) -> Option<Vec<(f64, f64)>> {
    get_function_metadata().get(function_name).map(|meta| meta.bounds.clone())
}

/// Bounds of `function_name` in dimension `dim`, or `dim` copies of
/// `default_bounds` when the function is unknown or does not accept `dim`
pub fn get_function_bounds_vec(function_name: &str, dim: usize, default_bounds: (f64, f64)) -> Vec<(f64, f64)> {
    get_function_metadata()
        .get(function_name)
        .and_then(|meta| meta.bounds_for(dim))
        .unwrap_or_else(|| vec![default_bounds; dim])
}

fn no_constraints(_x: &Array1<f64>) -> Array1<f64> {
    Array1::zeros(0)
}

fn lookup(name: &str) -> Option<(ObjectiveFn, ConstraintsFn)> {
    let pair: (ObjectiveFn, ConstraintsFn) = match name {
        "sphere" => (sphere, no_constraints),
        "ellipsoid" => (ellipsoid, no_constraints),
        "rosenbrock" => (rosenbrock, no_constraints),
        "sum_squares" => (sum_squares, no_constraints),
        "rastrigin" => (rastrigin, no_constraints),
        "ackley" => (ackley, no_constraints),
        "griewank" => (griewank, no_constraints),
        "sphere_halfspace" => (sphere_halfspace_objective, sphere_halfspace_constraints),
        "keanes_bump" => (keanes_bump_objective, keanes_bump_constraints),
        "binh_korn" => (binh_korn_objective, binh_korn_constraints),
        "rosenbrock_disk" => (rosenbrock_disk_objective, rosenbrock_disk_constraints),
        "mishras_bird" => (mishras_bird_objective, mishras_bird_constraints),
        _ => return None,
    };
    Some(pair)
}

/// A ready-to-solve problem: objective, constraints, box and starting point
#[derive(Debug, Clone)]
pub struct TestProblem {
    pub name: String,
    pub objective: ObjectiveFn,
    pub constraints: ConstraintsFn,
    pub bounds: Vec<(f64, f64)>,
    /// Centre of the box
    pub x0: Array1<f64>,
    /// Known optimal objective value in this dimension
    pub optimum: Option<f64>,
    n_constraints: usize,
}

impl TestProblem {
    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    pub fn n_constraints(&self) -> usize {
        self.n_constraints
    }

    pub fn is_constrained(&self) -> bool {
        self.n_constraints > 0
    }

    pub fn lower(&self) -> Array1<f64> {
        self.bounds.iter().map(|&(lo, _)| lo).collect()
    }

    pub fn upper(&self) -> Array1<f64> {
        self.bounds.iter().map(|&(_, hi)| hi).collect()
    }
}

/// Build the named problem in dimension `dim`
pub fn get_test_problem(name: &str, dim: usize) -> Option<TestProblem> {
    let meta = get_function_metadata().remove(name)?;
    let bounds = meta.bounds_for(dim)?;
    let (objective, constraints) = lookup(name)?;
    let x0 = bounds.iter().map(|&(lo, hi)| 0.5 * (lo + hi)).collect();
    let optimum = match name {
        "sphere_halfspace" => Some(1.0 / dim as f64),
        _ => meta.global_minimum,
    };
    Some(TestProblem {
        name: meta.name,
        objective,
        constraints,
        bounds,
        x0,
        optimum,
        n_constraints: meta.n_constraints,
    })
}
