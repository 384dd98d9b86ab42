use std::cmp::Ordering;

use ndarray::Array1;
use serde::Serialize;

/// An evaluated candidate solution.
///
/// Built once from the result of an evaluation and never modified: a better
/// point replaces an `Individual`, it does not update it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Individual {
	x: Array1<f64>,
	f: f64,
	g: Array1<f64>,
	feasible: bool,
	violation: f64,
	evaluation: usize,
}

impl Individual {
	/// `g[i] <= 0` means constraint `i` is satisfied; `evaluation` is the
	/// index of the evaluation that produced this point.
	pub fn new(x: Array1<f64>, f: f64, g: Array1<f64>, evaluation: usize) -> Self {
		let feasible = g.iter().all(|&gi| gi <= 0.0);
		let violation = g.iter().map(|&gi| gi.max(0.0)).sum();
		Self { x, f, g, feasible, violation, evaluation }
	}

	pub fn x(&self) -> &Array1<f64> {
		&self.x
	}

	pub fn f(&self) -> f64 {
		self.f
	}

	pub fn g(&self) -> &Array1<f64> {
		&self.g
	}

	pub fn is_feasible(&self) -> bool {
		self.feasible
	}

	/// Sum of the positive parts of the constraint values
	pub fn violation(&self) -> f64 {
		self.violation
	}

	pub fn evaluation(&self) -> usize {
		self.evaluation
	}

	/// True when the objective and every constraint value are finite
	pub fn is_finite(&self) -> bool {
		self.f.is_finite() && self.g.iter().all(|gi| gi.is_finite())
	}

	/// Feasibility-first comparison without tie breaking
	fn cmp_quality(&self, other: &Self) -> Ordering {
		match (self.feasible, other.feasible) {
			(true, false) => Ordering::Less,
			(false, true) => Ordering::Greater,
			(true, true) => self.f.total_cmp(&other.f),
			(false, false) => self.violation.total_cmp(&other.violation),
		}
	}

	/// Strictly better than `other` under the feasibility-first rule
	pub fn dominates(&self, other: &Self) -> bool {
		self.cmp_quality(other) == Ordering::Less
	}

	/// Total ranking order: feasibility-first, then evaluation order
	pub fn cmp_rank(&self, other: &Self) -> Ordering {
		self.cmp_quality(other).then(self.evaluation.cmp(&other.evaluation))
	}
}

/// Sort best first: feasible before infeasible, feasible by ascending
/// objective, infeasible by ascending violation, ties by evaluation order.
pub fn rank_feasibility_first(individuals: &mut [Individual]) {
	individuals.sort_by(|a, b| a.cmp_rank(b));
}
