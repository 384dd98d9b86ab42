//! Evaluation port: objective and constraint callbacks behind a budget check
//!
//! The budget is an explicit value owned by the caller and lent to the solver,
//! so that the same counter can be inspected after a run or shared by several
//! restarts.

use ndarray::Array1;
use serde::Serialize;

use crate::error::EvalError;
use crate::individual::Individual;

/// Evaluation counter with a hard maximum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationBudget {
	max_evaluations: usize,
	used: usize,
	exempt: usize,
}

impl EvaluationBudget {
	pub fn new(max_evaluations: usize) -> Self {
		Self { max_evaluations, used: 0, exempt: 0 }
	}

	pub fn unlimited() -> Self {
		Self::new(usize::MAX)
	}

	pub fn max_evaluations(&self) -> usize {
		self.max_evaluations
	}

	/// All evaluations performed so far, including budget-exempt ones
	pub fn used(&self) -> usize {
		self.used
	}

	/// Evaluations still allowed by the maximum
	pub fn remaining(&self) -> usize {
		self.max_evaluations.saturating_sub(self.used - self.exempt)
	}

	pub fn is_exhausted(&self) -> bool {
		self.remaining() == 0
	}

	fn check(&self) -> Result<(), EvalError> {
		if self.is_exhausted() { Err(EvalError::BudgetExhausted) } else { Ok(()) }
	}

	fn record(&mut self) -> usize {
		self.used += 1;
		self.used - 1
	}

	fn record_exempt(&mut self) -> usize {
		self.exempt += 1;
		self.record()
	}
}

/// Budget-aware evaluator turning positions into [`Individual`]s
pub struct Evaluator<'a, F, G>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	objective: &'a F,
	constraints: &'a G,
	budget: &'a mut EvaluationBudget,
	n_constraints: Option<usize>,
	evaluations: usize,
}

impl<'a, F, G> Evaluator<'a, F, G>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	pub fn new(objective: &'a F, constraints: &'a G, budget: &'a mut EvaluationBudget) -> Self {
		Self { objective, constraints, budget, n_constraints: None, evaluations: 0 }
	}

	/// Evaluate `x` if the budget allows it.
	///
	/// Fails with [`EvalError::BudgetExhausted`] without calling anything when
	/// the budget is spent, and with [`EvalError::NonFinite`] (after counting
	/// the evaluation) when the result contains NaN or infinity.
	pub fn evaluate(&mut self, x: Array1<f64>) -> Result<Individual, EvalError> {
		let ind = self.evaluate_as_is(x)?;
		if !ind.is_finite() {
			return Err(EvalError::NonFinite { evaluation: ind.evaluation() });
		}
		Ok(ind)
	}

	/// Like [`Evaluator::evaluate`], but a non-finite result is returned as is
	pub fn evaluate_as_is(&mut self, x: Array1<f64>) -> Result<Individual, EvalError> {
		self.budget.check()?;
		let (f, g) = self.call(&x)?;
		let index = self.budget.record();
		self.evaluations += 1;
		Ok(Individual::new(x, f, g, index))
	}

	/// Evaluate `x` without checking the budget.
	///
	/// The evaluation is counted but not charged against the maximum, and a
	/// non-finite result is returned as is so that the caller can report it.
	pub fn evaluate_unconditionally(&mut self, x: Array1<f64>) -> Result<Individual, EvalError> {
		let (f, g) = self.call(&x)?;
		let index = self.budget.record_exempt();
		self.evaluations += 1;
		Ok(Individual::new(x, f, g, index))
	}

	/// Evaluations performed through this evaluator
	pub fn evaluations(&self) -> usize {
		self.evaluations
	}

	pub fn remaining(&self) -> usize {
		self.budget.remaining()
	}

	/// Number of constraints, known once something has been evaluated
	pub fn n_constraints(&self) -> Option<usize> {
		self.n_constraints
	}

	fn call(&mut self, x: &Array1<f64>) -> Result<(f64, Array1<f64>), EvalError> {
		let g = (self.constraints)(x)?;
		match self.n_constraints {
			Some(m) if m != g.len() => {
				return Err(EvalError::Failed(format!(
					"constraint callback returned {} values, expected {}",
					g.len(),
					m
				)));
			}
			Some(_) => {}
			None => self.n_constraints = Some(g.len()),
		}
		let f = (self.objective)(x)?;
		Ok((f, g))
	}
}

/// Constraint callback for problems that only have box bounds
pub fn no_constraints(_x: &Array1<f64>) -> Result<Array1<f64>, EvalError> {
	Ok(Array1::zeros(0))
}
