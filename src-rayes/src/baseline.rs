//! Baseline searches used as comparison points for RayEs
//!
//! Both go through the same evaluation port and stop when the budget is spent.

use ndarray::Array1;
use rand::Rng;
use serde::Serialize;

use crate::bounds::Bounds;
use crate::error::EvalError;
use crate::evaluation::Evaluator;
use crate::individual::Individual;

/// Outcome of a baseline search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineReport {
	/// Best point under the feasibility-first order, if anything was evaluated
	pub best: Option<Individual>,
	pub evaluations: usize,
}

impl BaselineReport {
	fn offer(&mut self, ind: Individual) {
		match &self.best {
			Some(b) if !ind.dominates(b) => {}
			_ => self.best = Some(ind),
		}
	}
}

/// Evaluate `x` and keep it if it is the best so far.
///
/// Returns `Ok(false)` once the budget is spent.
fn step<F, G>(
	evaluator: &mut Evaluator<'_, F, G>,
	report: &mut BaselineReport,
	x: Array1<f64>,
) -> Result<bool, EvalError>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	let res = evaluator.evaluate(x);
	report.evaluations = evaluator.evaluations();
	match res {
		Ok(ind) => report.offer(ind),
		Err(EvalError::BudgetExhausted) => return Ok(false),
		// Non-finite points are counted but never reported
		Err(EvalError::NonFinite { .. }) => {}
		Err(e) => return Err(e),
	}
	Ok(true)
}

/// Uniform random points in the box until the budget is spent
pub fn random_search<F, G, R>(
	evaluator: &mut Evaluator<'_, F, G>,
	bounds: &Bounds,
	rng: &mut R,
) -> Result<BaselineReport, EvalError>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
	R: Rng + ?Sized,
{
	let mut report = BaselineReport { best: None, evaluations: 0 };
	let width = bounds.width();
	loop {
		let x: Array1<f64> = (0..bounds.dim())
			.map(|j| bounds.lower()[j] + rng.random::<f64>() * width[j])
			.collect();
		if !step(evaluator, &mut report, x)? {
			break;
		}
	}
	Ok(report)
}

/// Regular grid over the box, sized from the remaining budget.
///
/// Each axis is split into `max(1, floor(budget^(1/n)) - 1)` intervals and
/// the nodes are visited lexicographically, first axis fastest.
pub fn grid_search<F, G>(evaluator: &mut Evaluator<'_, F, G>, bounds: &Bounds) -> Result<BaselineReport, EvalError>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	let n = bounds.dim();
	let intervals = grid_intervals(evaluator.remaining(), n);
	let grid_step = bounds.width() / intervals as f64;
	let mut nodes = vec![0usize; n];
	let mut report = BaselineReport { best: None, evaluations: 0 };

	loop {
		let x: Array1<f64> = (0..n).map(|j| bounds.lower()[j] + grid_step[j] * nodes[j] as f64).collect();
		if !step(evaluator, &mut report, bounds.clip(&x))? {
			break;
		}
		if !next_node(&mut nodes, intervals) {
			break;
		}
	}
	Ok(report)
}

pub(crate) fn grid_intervals(budget: usize, n: usize) -> usize {
	let per_axis = (budget as f64).powf(1.0 / n as f64).floor();
	if per_axis >= 2.0 { (per_axis as usize).saturating_sub(1) } else { 1 }
}

/// Advance the odometer; false once every node has been visited
fn next_node(nodes: &mut [usize], max_node: usize) -> bool {
	for node in nodes.iter_mut() {
		if *node < max_node {
			*node += 1;
			return true;
		}
		*node = 0;
	}
	false
}
