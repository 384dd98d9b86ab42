//! RayEs: a constrained evolution strategy driven by ray line searches
//!
//! The solver minimizes a scalar objective subject to box bounds and
//! inequality constraints `g(x) <= 0`, under a hard evaluation budget.
//!
//! Each generation:
//! - samples `lambda` isotropic rays from the current centroid,
//! - runs a line search along every ray (sequentially, in sampling order),
//! - ranks the line search results feasibility-first,
//! - moves the centroid to the rank-weighted mean of the best `mu` results,
//! - adapts the step size with a success-rate rule.
//!
//! Budget exhaustion is not an error: it travels as [`EvalError::BudgetExhausted`]
//! through the line search and ends the run with a valid [`Info`].

#![allow(missing_docs)]
use std::fmt;

use log::{debug, info, warn};
use ndarray::Array1;

pub mod baseline;
pub mod bounds;
pub mod error;
pub mod evaluation;
pub mod individual;
pub mod info;
pub mod line_search;
pub mod ray_es;
pub mod recorder;
pub mod run_recorded;
pub mod sampler;

pub use baseline::{BaselineReport, grid_search, random_search};
pub use bounds::Bounds;
pub use error::{ConfigError, EvalError, RayEsError};
pub use evaluation::{EvaluationBudget, Evaluator, no_constraints};
pub use individual::{Individual, rank_feasibility_first};
pub use info::{Info, TerminationCriterion};
pub use line_search::{LineSearch, LineSearchAlg, LineSearchConfig};
pub use ray_es::ray_es;
pub use recorder::{GenerationRecord, GenerationRecorder, RecorderError};
pub use run_recorded::run_recorded_ray_es;
pub use sampler::{Ray, RaySampler};


/// Configuration of the RayEs solver
pub struct RayEsConfig {
	/// Rays per generation (lambda); `4 + floor(3 ln n)` when unset
	pub population_size: Option<usize>,
	/// Individuals recombined into the centroid (mu); `lambda / 2` when unset
	pub parents: Option<usize>,
	/// Initial step size; `0.3 *` mean box width when unset
	pub sigma0: Option<f64>,
	/// Floor of the step size, reaching it ends the run
	pub min_sigma: f64,
	/// Target success rate of the step-size rule
	pub target_success: f64,
	/// Damping of the step-size rule
	pub sigma_damping: f64,
	/// Generations without improvement before stopping
	pub max_stagnation: usize,
	/// Stop as soon as a feasible point reaches this objective value
	pub target: Option<f64>,
	pub seed: Option<u64>,
	pub line_search: LineSearchConfig,
	/// Charge the evaluation of the initial point against the budget
	pub charge_initial: bool,
	/// Optional per-generation callback (may stop early)
	pub callback: Option<Box<dyn FnMut(&RayEsIntermediate) -> CallbackAction>>,
}

impl Default for RayEsConfig {
	fn default() -> Self {
		Self {
			population_size: None,
			parents: None,
			sigma0: None,
			min_sigma: 1e-12,
			target_success: 0.2,
			sigma_damping: 1.0,
			max_stagnation: 30,
			target: None,
			seed: None,
			line_search: LineSearchConfig::default(),
			charge_initial: false,
			callback: None,
		}
	}
}

impl fmt::Debug for RayEsConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RayEsConfig")
			.field("population_size", &self.population_size)
			.field("parents", &self.parents)
			.field("sigma0", &self.sigma0)
			.field("min_sigma", &self.min_sigma)
			.field("target_success", &self.target_success)
			.field("sigma_damping", &self.sigma_damping)
			.field("max_stagnation", &self.max_stagnation)
			.field("target", &self.target)
			.field("seed", &self.seed)
			.field("line_search", &self.line_search)
			.field("charge_initial", &self.charge_initial)
			.field("callback", &self.callback.is_some())
			.finish()
	}
}

/// Fluent builder for `RayEsConfig`
#[derive(Default)]
pub struct RayEsConfigBuilder {
	cfg: RayEsConfig,
}

impl RayEsConfigBuilder {
	pub fn new() -> Self {
		Self { cfg: RayEsConfig::default() }
	}
	pub fn population_size(mut self, v: usize) -> Self {
		self.cfg.population_size = Some(v);
		self
	}
	pub fn parents(mut self, v: usize) -> Self {
		self.cfg.parents = Some(v);
		self
	}
	pub fn sigma0(mut self, v: f64) -> Self {
		self.cfg.sigma0 = Some(v);
		self
	}
	pub fn min_sigma(mut self, v: f64) -> Self {
		self.cfg.min_sigma = v;
		self
	}
	pub fn target_success(mut self, v: f64) -> Self {
		self.cfg.target_success = v;
		self
	}
	pub fn sigma_damping(mut self, v: f64) -> Self {
		self.cfg.sigma_damping = v;
		self
	}
	pub fn max_stagnation(mut self, v: usize) -> Self {
		self.cfg.max_stagnation = v;
		self
	}
	pub fn target(mut self, v: f64) -> Self {
		self.cfg.target = Some(v);
		self
	}
	pub fn seed(mut self, v: u64) -> Self {
		self.cfg.seed = Some(v);
		self
	}
	pub fn line_search(mut self, v: LineSearchConfig) -> Self {
		self.cfg.line_search = v;
		self
	}
	pub fn charge_initial(mut self, v: bool) -> Self {
		self.cfg.charge_initial = v;
		self
	}
	pub fn callback(mut self, cb: Box<dyn FnMut(&RayEsIntermediate) -> CallbackAction>) -> Self {
		self.cfg.callback = Some(cb);
		self
	}
	pub fn build(self) -> RayEsConfig {
		self.cfg
	}
}

/// Snapshot passed to the callback after each generation
#[derive(Debug, Clone)]
pub struct RayEsIntermediate {
	/// Best point so far
	pub x: Array1<f64>,
	pub fun: f64,
	pub violation: f64,
	pub sigma: f64,
	pub generation: usize,
	pub evaluations: usize,
}

/// Action returned by callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
	Continue,
	Stop,
}

/// Strategy parameters resolved against the problem dimension
#[derive(Debug, Clone)]
struct Params {
	lambda: usize,
	weights: Vec<f64>,
	sigma0: f64,
}

impl Params {
	fn resolve(config: &RayEsConfig, bounds: &Bounds) -> Result<Self, ConfigError> {
		let n = bounds.dim();
		let lambda = config.population_size.unwrap_or(4 + (3.0 * (n as f64).ln()).floor() as usize);
		if lambda == 0 {
			return Err(ConfigError::InvalidParameter {
				name: "population_size",
				reason: "must be at least 1".to_string(),
			});
		}
		let mu = config.parents.unwrap_or((lambda / 2).max(1));
		if mu == 0 || mu > lambda {
			return Err(ConfigError::InvalidParameter {
				name: "parents",
				reason: format!("must be in [1, {}], got {}", lambda, mu),
			});
		}

		let mean_width = bounds.width().mean().unwrap_or(0.0);
		let sigma0 = config.sigma0.unwrap_or(if mean_width > 0.0 { 0.3 * mean_width } else { 1.0 });
		if !(sigma0.is_finite() && sigma0 > 0.0) {
			return Err(ConfigError::InvalidParameter {
				name: "sigma0",
				reason: format!("must be finite and > 0, got {}", sigma0),
			});
		}
		if !(config.min_sigma.is_finite() && config.min_sigma >= 0.0 && config.min_sigma < sigma0) {
			return Err(ConfigError::InvalidParameter {
				name: "min_sigma",
				reason: format!("must be in [0, sigma0), got {}", config.min_sigma),
			});
		}
		if !(config.target_success > 0.0 && config.target_success < 1.0) {
			return Err(ConfigError::InvalidParameter {
				name: "target_success",
				reason: format!("must be in (0, 1), got {}", config.target_success),
			});
		}
		if !(config.sigma_damping.is_finite() && config.sigma_damping > 0.0) {
			return Err(ConfigError::InvalidParameter {
				name: "sigma_damping",
				reason: format!("must be finite and > 0, got {}", config.sigma_damping),
			});
		}
		if config.target.is_some_and(|t| t.is_nan()) {
			return Err(ConfigError::InvalidParameter { name: "target", reason: "is NaN".to_string() });
		}
		config.line_search.validate()?;

		Ok(Self { lambda, weights: recombination_weights(mu), sigma0 })
	}
}

/// Log-linear rank weights `ln(mu + 1/2) - ln(i)`, `i = 1..=mu`, summing to one
pub(crate) fn recombination_weights(mu: usize) -> Vec<f64> {
	let raw: Vec<f64> = (1..=mu).map(|i| (mu as f64 + 0.5).ln() - (i as f64).ln()).collect();
	let total: f64 = raw.iter().sum();
	raw.into_iter().map(|w| w / total).collect()
}

/// Mutable state of a run, updated once per generation
struct SearchState {
	centroid: Array1<f64>,
	sigma: f64,
	generation: usize,
	best: Individual,
	stagnation: usize,
}

/// RayEs optimizer
pub struct RayEs<'a, F, G>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	objective: &'a F,
	constraints: &'a G,
	lower: Array1<f64>,
	upper: Array1<f64>,
	x0: Array1<f64>,
	variant: LineSearchAlg,
	budget: &'a mut EvaluationBudget,
	config: RayEsConfig,
}

impl<'a, F, G> RayEs<'a, F, G>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	/// Create a solver; the problem is validated by [`RayEs::run`]
	pub fn new(
		objective: &'a F,
		constraints: &'a G,
		lower: Array1<f64>,
		upper: Array1<f64>,
		x0: Array1<f64>,
		variant: LineSearchAlg,
		budget: &'a mut EvaluationBudget,
	) -> Self {
		Self { objective, constraints, lower, upper, x0, variant, budget, config: RayEsConfig::default() }
	}

	/// Mutable access to configuration
	pub fn config_mut(&mut self) -> &mut RayEsConfig {
		&mut self.config
	}

	pub fn with_config(mut self, config: RayEsConfig) -> Self {
		self.config = config;
		self
	}

	/// Run until a termination criterion is met
	pub fn run(&mut self) -> Result<Info, RayEsError> {
		let bounds = Bounds::new(self.lower.clone(), self.upper.clone())?;
		let n = bounds.dim();
		if self.x0.len() != n {
			return Err(ConfigError::DimensionMismatch {
				what: "initial point",
				expected: n,
				found: self.x0.len(),
			}
			.into());
		}
		if let Some((index, &value)) = self.x0.iter().enumerate().find(|(_, v)| !v.is_finite()) {
			return Err(ConfigError::NonFiniteInitialPoint { index, value }.into());
		}
		let params = Params::resolve(&self.config, &bounds)?;

		let mut evaluator = Evaluator::new(self.objective, self.constraints, &mut *self.budget);
		let x0 = bounds.clip(&self.x0);
		let initial = if self.config.charge_initial {
			evaluator.evaluate_as_is(x0.clone())
		} else {
			evaluator.evaluate_unconditionally(x0.clone())
		};
		let start = match initial {
			Ok(ind) => ind,
			Err(EvalError::BudgetExhausted) => return Err(RayEsError::BudgetExhaustedAtStart),
			Err(e) => return Err(RayEsError::Evaluation(e.to_string())),
		};
		info!(
			"RayEs init: n={}, lambda={}, mu={}, sigma0={:.3e}, line search {}, budget {} remaining",
			n,
			params.lambda,
			params.weights.len(),
			params.sigma0,
			self.variant,
			evaluator.remaining()
		);

		let mut state = SearchState {
			centroid: x0,
			sigma: params.sigma0,
			generation: 0,
			best: start,
			stagnation: 0,
		};
		if !state.best.is_finite() {
			warn!("RayEs: initial point evaluates to a non-finite value");
			return Ok(finish(TerminationCriterion::NumericalFailure, state, evaluator.evaluations()));
		}

		let mut sampler = RaySampler::new(n, params.lambda, self.config.seed);
		let line_search = LineSearch::new(self.variant, self.config.line_search.clone(), &bounds);

		let termination = loop {
			if let Some(criterion) = check_termination(&self.config, &state, evaluator.remaining()) {
				break criterion;
			}
			let step = Self::generation(
				&mut self.config,
				&params,
				&bounds,
				&line_search,
				&mut sampler,
				&mut evaluator,
				&mut state,
			);
			match step {
				Ok(None) => {}
				Ok(Some(criterion)) => break criterion,
				Err(EvalError::BudgetExhausted) => break TerminationCriterion::BudgetExhausted,
				Err(EvalError::NonFinite { evaluation }) => {
					warn!("RayEs: evaluation #{} produced a non-finite value", evaluation);
					break TerminationCriterion::NumericalFailure;
				}
				Err(EvalError::Failed(msg)) => return Err(RayEsError::Evaluation(msg)),
			}
		};

		let report = finish(termination, state, evaluator.evaluations());
		info!("RayEs done: {}", report);
		Ok(report)
	}

	/// One `Sampling -> Evaluating -> Ranking -> Updating` cycle
	fn generation(
		config: &mut RayEsConfig,
		params: &Params,
		bounds: &Bounds,
		line_search: &LineSearch<'_>,
		sampler: &mut RaySampler,
		evaluator: &mut Evaluator<'_, F, G>,
		state: &mut SearchState,
	) -> Result<Option<TerminationCriterion>, EvalError> {
		let rays = sampler.sample(state.sigma);
		let best_before = state.best.clone();

		let mut offspring = Vec::with_capacity(rays.len());
		for ray in &rays {
			let ind =
				line_search.search(evaluator, &state.centroid, &ray.direction, ray.scale, &mut state.best)?;
			offspring.push(ind);
			if target_hit(&state.best, config.target) {
				return Ok(Some(TerminationCriterion::TargetHit));
			}
		}

		rank_feasibility_first(&mut offspring);
		let successes = offspring.iter().filter(|ind| ind.dominates(&best_before)).count();

		let mut centroid = Array1::<f64>::zeros(bounds.dim());
		for (w, ind) in params.weights.iter().zip(offspring.iter()) {
			centroid.scaled_add(*w, ind.x());
		}
		state.centroid = bounds.clip(&centroid);

		let p_s = successes as f64 / offspring.len() as f64;
		let p_t = config.target_success;
		let factor = (config.sigma_damping * (p_s - p_t) / (1.0 - p_t)).exp();
		state.sigma = (state.sigma * factor).max(config.min_sigma);

		if state.best.dominates(&best_before) {
			state.stagnation = 0;
		} else {
			state.stagnation += 1;
		}
		state.generation += 1;

		debug!(
			"gen {}: best f={:.6e} violation={:.3e} sigma={:.3e} successes={}/{} evals={}",
			state.generation,
			state.best.f(),
			state.best.violation(),
			state.sigma,
			successes,
			offspring.len(),
			evaluator.evaluations()
		);

		if let Some(cb) = config.callback.as_mut() {
			let intermediate = RayEsIntermediate {
				x: state.best.x().clone(),
				fun: state.best.f(),
				violation: state.best.violation(),
				sigma: state.sigma,
				generation: state.generation,
				evaluations: evaluator.evaluations(),
			};
			if cb(&intermediate) == CallbackAction::Stop {
				return Ok(Some(TerminationCriterion::TargetHit));
			}
		}
		Ok(None)
	}
}

/// Criteria checked at the top of every generation
fn check_termination(
	config: &RayEsConfig,
	state: &SearchState,
	remaining: usize,
) -> Option<TerminationCriterion> {
	if target_hit(&state.best, config.target) {
		return Some(TerminationCriterion::TargetHit);
	}
	if !state.sigma.is_finite() || state.sigma <= config.min_sigma {
		warn!("RayEs: step size degenerated to {:e}", state.sigma);
		return Some(TerminationCriterion::NumericalFailure);
	}
	if state.stagnation >= config.max_stagnation {
		return Some(TerminationCriterion::Stagnation);
	}
	if remaining == 0 {
		return Some(TerminationCriterion::BudgetExhausted);
	}
	None
}

fn target_hit(best: &Individual, target: Option<f64>) -> bool {
	target.is_some_and(|t| best.is_feasible() && best.f() <= t)
}

fn finish(termination: TerminationCriterion, state: SearchState, evaluations: usize) -> Info {
	Info::new(termination, state.best, evaluations, state.generation, state.sigma)
}
