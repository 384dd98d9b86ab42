//! Error types of the solver
//!
//! Two layers are kept apart:
//! - [`EvalError`] is what the evaluation port and the user callbacks return.
//!   It is ordinary control flow: budget exhaustion and numerical failure
//!   travel through the line search with `?` and are turned into a
//!   termination criterion by [`crate::RayEs::run`].
//! - [`RayEsError`] is what `run()` itself returns when no valid report can be
//!   produced (bad configuration, unexpected callback failure).

use thiserror::Error;

/// Signal raised by an evaluation, either by the port or by a callback
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
	/// No evaluation was performed because the budget is spent
	#[error("evaluation budget exhausted")]
	BudgetExhausted,
	/// The evaluation happened but produced a NaN or infinite value
	#[error("non-finite value produced by evaluation #{evaluation}")]
	NonFinite { evaluation: usize },
	/// Any other failure reported by a callback
	#[error("{0}")]
	Failed(String),
}

/// Invalid problem or solver configuration, detected before the first evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
	#[error("{what} has length {found}, expected {expected}")]
	DimensionMismatch { what: &'static str, expected: usize, found: usize },

	#[error("problem has no decision variables")]
	EmptyProblem,

	#[error("bound[{index}] has upper {upper} < lower {lower}")]
	InvertedBounds { index: usize, lower: f64, upper: f64 },

	#[error("bound[{index}] is not finite ({lower}, {upper})")]
	NonFiniteBounds { index: usize, lower: f64, upper: f64 },

	#[error("initial point component {index} is not finite ({value})")]
	NonFiniteInitialPoint { index: usize, value: f64 },

	#[error("invalid parameter `{name}`: {reason}")]
	InvalidParameter { name: &'static str, reason: String },
}

/// Failure of a whole `run()`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RayEsError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	/// The callbacks refused even the initial evaluation, so there is nothing to report
	#[error("evaluation budget exhausted before the initial point could be evaluated")]
	BudgetExhaustedAtStart,

	/// Unexpected failure surfaced by the objective or constraint callback
	#[error("evaluation failed: {0}")]
	Evaluation(String),
}

impl RayEsError {
	/// True for errors caused by the problem definition or the solver settings
	pub fn is_config(&self) -> bool {
		matches!(self, RayEsError::Config(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_config_error_is_distinct() {
		let err: RayEsError = ConfigError::EmptyProblem.into();
		assert!(err.is_config());
		assert!(!RayEsError::Evaluation("boom".into()).is_config());
		assert!(!RayEsError::BudgetExhaustedAtStart.is_config());
	}

	#[test]
	fn test_messages() {
		let err = ConfigError::InvertedBounds { index: 1, lower: 2.0, upper: -1.0 };
		assert_eq!(err.to_string(), "bound[1] has upper -1 < lower 2");
		let err = EvalError::NonFinite { evaluation: 7 };
		assert_eq!(err.to_string(), "non-finite value produced by evaluation #7");
	}
}
