use ndarray::Array1;

use crate::error::{EvalError, RayEsError};
use crate::evaluation::EvaluationBudget;
use crate::info::Info;
use crate::line_search::LineSearchAlg;
use crate::{RayEs, RayEsConfig};

/// Run RayEs on `bounds` given as `(lower, upper)` pairs.
///
/// Owns its evaluation budget of `max_evaluations` and returns the run report.
///
/// Example
/// ```rust
/// use ndarray::{Array1, array};
/// use rayes::{EvalError, LineSearchAlg, RayEsConfigBuilder, no_constraints, ray_es};
///
/// let sphere = |x: &Array1<f64>| -> Result<f64, EvalError> { Ok(x.iter().map(|v| v * v).sum()) };
/// let config = RayEsConfigBuilder::new().seed(7).build();
/// let info = ray_es(
///     &sphere,
///     &no_constraints,
///     &[(-5.0, 5.0), (-5.0, 5.0)],
///     array![3.0, -2.0],
///     LineSearchAlg::Modified,
///     500,
///     config,
/// )
/// .unwrap();
/// assert!(info.evaluations() <= 501);
/// ```
pub fn ray_es<F, G>(
	objective: &F,
	constraints: &G,
	bounds: &[(f64, f64)],
	x0: Array1<f64>,
	variant: LineSearchAlg,
	max_evaluations: usize,
	config: RayEsConfig,
) -> Result<Info, RayEsError>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	let lower = bounds.iter().map(|&(lo, _)| lo).collect::<Array1<f64>>();
	let upper = bounds.iter().map(|&(_, hi)| hi).collect::<Array1<f64>>();
	let mut budget = EvaluationBudget::new(max_evaluations);
	let mut solver =
		RayEs::new(objective, constraints, lower, upper, x0, variant, &mut budget).with_config(config);
	solver.run()
}
