use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use serde::Serialize;

use crate::individual::Individual;

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCriterion {
	BudgetExhausted,
	TargetHit,
	Stagnation,
	NumericalFailure,
}

impl TerminationCriterion {
	pub fn as_str(&self) -> &'static str {
		match self {
			TerminationCriterion::BudgetExhausted => "budget exhausted",
			TerminationCriterion::TargetHit => "target hit",
			TerminationCriterion::Stagnation => "stagnation",
			TerminationCriterion::NumericalFailure => "numerical failure",
		}
	}
}

impl fmt::Display for TerminationCriterion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TerminationCriterion {
	type Err = String;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let t = s.trim().to_lowercase().replace(['_', '-'], " ");
		match t.as_str() {
			"budget exhausted" => Ok(TerminationCriterion::BudgetExhausted),
			"target hit" => Ok(TerminationCriterion::TargetHit),
			"stagnation" => Ok(TerminationCriterion::Stagnation),
			"numerical failure" => Ok(TerminationCriterion::NumericalFailure),
			_ => Err(format!("unknown termination criterion: {}", s)),
		}
	}
}

/// Report of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
	termination: TerminationCriterion,
	best: Individual,
	evaluations: usize,
	generations: usize,
	sigma: f64,
}

impl Info {
	pub(crate) fn new(
		termination: TerminationCriterion,
		best: Individual,
		evaluations: usize,
		generations: usize,
		sigma: f64,
	) -> Self {
		Self { termination, best, evaluations, generations, sigma }
	}

	pub fn termination_criterion(&self) -> TerminationCriterion {
		self.termination
	}

	/// Best point of the run, feasible whenever a feasible point was evaluated
	pub fn best(&self) -> &Individual {
		&self.best
	}

	pub fn best_x(&self) -> &Array1<f64> {
		self.best.x()
	}

	pub fn best_f(&self) -> f64 {
		self.best.f()
	}

	/// Evaluations consumed by the run, the initial one included
	pub fn evaluations(&self) -> usize {
		self.evaluations
	}

	/// Completed generations
	pub fn generations(&self) -> usize {
		self.generations
	}

	pub fn final_sigma(&self) -> f64 {
		self.sigma
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}
}

impl fmt::Display for Info {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}: f={:.6e} violation={:.3e} evaluations={} generations={} sigma={:.3e}",
			self.termination,
			self.best.f(),
			self.best.violation(),
			self.evaluations,
			self.generations,
			self.sigma
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ndarray::array;

	#[test]
	fn test_criterion_text_round_trip() {
		for c in [
			TerminationCriterion::BudgetExhausted,
			TerminationCriterion::TargetHit,
			TerminationCriterion::Stagnation,
			TerminationCriterion::NumericalFailure,
		] {
			assert_eq!(c.to_string().parse::<TerminationCriterion>(), Ok(c));
		}
		assert_eq!("budget_exhausted".parse::<TerminationCriterion>(), Ok(TerminationCriterion::BudgetExhausted));
		assert!("timeout".parse::<TerminationCriterion>().is_err());
	}

	#[test]
	fn test_json_report() {
		let best = Individual::new(array![1.0, 2.0], 0.5, array![-1.0], 3);
		let info = Info::new(TerminationCriterion::Stagnation, best, 12, 2, 0.25);
		let json = info.to_json().unwrap();
		let value: serde_json::Value = serde_json::from_str(&json).unwrap();
		assert_eq!(value["termination"], "stagnation");
		assert_eq!(value["evaluations"], 12);
		assert_eq!(value["best"]["feasible"], true);
		assert_eq!(info.best_x(), &array![1.0, 2.0]);
	}
}
