//! Line search along a single ray
//!
//! Both variants share the same skeleton: a first step of length `scale`
//! (halved while it lands on an infeasible point), geometric expansion while
//! the feasibility-first order keeps improving, then refinement of the bracket
//! by probing the midpoint of its larger side, alternating with the vertex of
//! the parabola through the bracket when all three points are feasible. The
//! modified variant adds a bisection on feasibility as soon as an expansion
//! step leaves the feasible region, so that the bracket ends exactly at the
//! constraint boundary.

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use serde::Serialize;

use crate::bounds::Bounds;
use crate::error::{ConfigError, EvalError};
use crate::evaluation::Evaluator;
use crate::individual::Individual;

/// Line search variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSearchAlg {
	/// Expansion and refinement only
	Standard,
	/// Expansion, boundary bisection, then refinement
	#[default]
	Modified,
}

impl FromStr for LineSearchAlg {
	type Err = String;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"standard" | "std" => Ok(LineSearchAlg::Standard),
			"modified" | "mod" => Ok(LineSearchAlg::Modified),
			_ => Err(format!("unknown line search: {}", s)),
		}
	}
}

impl fmt::Display for LineSearchAlg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LineSearchAlg::Standard => write!(f, "standard"),
			LineSearchAlg::Modified => write!(f, "modified"),
		}
	}
}

/// Tuning of the line search
#[derive(Debug, Clone, PartialEq)]
pub struct LineSearchConfig {
	/// Growth factor of the expansion phase
	pub expansion_factor: f64,
	pub max_expansions: usize,
	/// Halvings of the first step while it is infeasible
	pub max_rejections: usize,
	pub max_refinements: usize,
	/// Refinement stops when the bracket is narrower than `tolerance * step`
	pub tolerance: f64,
	/// Boundary bisection stops when the crossing is known to `boundary_tolerance * step`
	pub boundary_tolerance: f64,
	pub max_boundary_steps: usize,
}

impl Default for LineSearchConfig {
	fn default() -> Self {
		Self {
			expansion_factor: 1.618_033_988_749_895,
			max_expansions: 16,
			max_rejections: 4,
			max_refinements: 10,
			tolerance: 1e-4,
			boundary_tolerance: 1e-5,
			max_boundary_steps: 16,
		}
	}
}

impl LineSearchConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(self.expansion_factor.is_finite() && self.expansion_factor > 0.0) {
			return Err(ConfigError::InvalidParameter {
				name: "expansion_factor",
				reason: format!("must be finite and > 0, got {}", self.expansion_factor),
			});
		}
		if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
			return Err(ConfigError::InvalidParameter {
				name: "tolerance",
				reason: format!("must be finite and > 0, got {}", self.tolerance),
			});
		}
		if !(self.boundary_tolerance.is_finite() && self.boundary_tolerance > 0.0) {
			return Err(ConfigError::InvalidParameter {
				name: "boundary_tolerance",
				reason: format!("must be finite and > 0, got {}", self.boundary_tolerance),
			});
		}
		Ok(())
	}
}

/// Evaluates points of one ray and keeps track of the best ones
struct Probe<'s, 'a, F, G>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	evaluator: &'s mut Evaluator<'a, F, G>,
	bounds: &'s Bounds,
	origin: &'s Array1<f64>,
	direction: &'s Array1<f64>,
	best: &'s mut Individual,
	ray_best: Option<(f64, Individual)>,
}

impl<F, G> Probe<'_, '_, F, G>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	fn eval(&mut self, t: f64) -> Result<Individual, EvalError> {
		let x = self.bounds.point_on_ray(self.origin, self.direction, t);
		let ind = self.evaluator.evaluate(x)?;
		if ind.dominates(self.best) {
			*self.best = ind.clone();
		}
		if self.ray_best.as_ref().is_none_or(|(_, b)| ind.dominates(b)) {
			self.ray_best = Some((t, ind.clone()));
		}
		Ok(ind)
	}

	fn finish(self) -> Result<Individual, EvalError> {
		self.ray_best
			.map(|(_, ind)| ind)
			.ok_or_else(|| EvalError::Failed("line search evaluated no point".to_string()))
	}
}

/// Bracket `[lo, hi]` around the best point `t` of one ray; the ends keep their
/// evaluation when they have one
struct Bracket {
	lo: f64,
	lo_ind: Option<Individual>,
	t: f64,
	best: Individual,
	hi: f64,
	hi_ind: Option<Individual>,
}

impl Bracket {
	/// Convert from distances along `sign * direction` to signed ray coordinates
	fn along(self, sign: f64) -> Self {
		if sign > 0.0 {
			self
		} else {
			Self {
				lo: -self.hi,
				lo_ind: self.hi_ind,
				t: -self.t,
				best: self.best,
				hi: -self.lo,
				hi_ind: self.lo_ind,
			}
		}
	}

	fn width(&self) -> f64 {
		self.hi - self.lo
	}

	fn bisection_point(&self) -> f64 {
		if self.t - self.lo > self.hi - self.t { 0.5 * (self.lo + self.t) } else { 0.5 * (self.t + self.hi) }
	}

	/// Vertex of the parabola through both ends and `t`, if all three are
	/// feasible and the vertex falls strictly inside the bracket
	fn parabolic_point(&self) -> Option<f64> {
		let lo = self.lo_ind.as_ref()?;
		let hi = self.hi_ind.as_ref()?;
		if !(lo.is_feasible() && hi.is_feasible() && self.best.is_feasible()) {
			return None;
		}
		let v = parabola_vertex((self.lo, lo.f()), (self.t, self.best.f()), (self.hi, hi.f()))?;
		(v > self.lo && v < self.hi).then_some(v)
	}

	fn update(&mut self, u: f64, ind: Individual) {
		if ind.dominates(&self.best) {
			let previous = std::mem::replace(&mut self.best, ind);
			if u < self.t {
				self.hi = self.t;
				self.hi_ind = Some(previous);
			} else {
				self.lo = self.t;
				self.lo_ind = Some(previous);
			}
			self.t = u;
		} else if u < self.t {
			self.lo = u;
			self.lo_ind = Some(ind);
		} else {
			self.hi = u;
			self.hi_ind = Some(ind);
		}
	}
}

fn parabola_vertex((a, fa): (f64, f64), (b, fb): (f64, f64), (c, fc): (f64, f64)) -> Option<f64> {
	let p = (b - a) * (fb - fc);
	let q = (b - c) * (fb - fa);
	let denom = 2.0 * (p - q);
	if denom == 0.0 {
		return None;
	}
	let v = b - ((b - a) * p - (b - c) * q) / denom;
	v.is_finite().then_some(v)
}

/// Line search bound to a box
pub struct LineSearch<'b> {
	alg: LineSearchAlg,
	config: LineSearchConfig,
	bounds: &'b Bounds,
}

impl<'b> LineSearch<'b> {
	pub fn new(alg: LineSearchAlg, config: LineSearchConfig, bounds: &'b Bounds) -> Self {
		Self { alg, config, bounds }
	}

	pub fn alg(&self) -> LineSearchAlg {
		self.alg
	}

	/// Search the ray `origin + t * direction` and return the best point found.
	///
	/// `direction` must be a unit vector and `origin` must lie in the box.
	/// Every evaluated point is also offered to `best`, which is replaced when
	/// the new point dominates it. Budget exhaustion aborts the search and is
	/// propagated as is.
	pub fn search<F, G>(
		&self,
		evaluator: &mut Evaluator<'_, F, G>,
		origin: &Array1<f64>,
		direction: &Array1<f64>,
		scale: f64,
		best: &mut Individual,
	) -> Result<Individual, EvalError>
	where
		F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
		G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
	{
		let (t_lo, t_hi) = self.bounds.ray_interval(origin, direction);
		let mut probe = Probe { evaluator, bounds: self.bounds, origin, direction, best, ray_best: None };

		let (sign, room, back_room) = if t_hi > 0.0 {
			(1.0, t_hi, -t_lo)
		} else if t_lo < 0.0 {
			(-1.0, -t_lo, 0.0)
		} else {
			// The box is flat along this ray
			probe.eval(0.0)?;
			return probe.finish();
		};

		let mut step = scale.min(room);
		let mut first = probe.eval(sign * step)?;
		let mut rejections = 0;
		while !first.is_feasible() && rejections < self.config.max_rejections {
			step *= 0.5;
			first = probe.eval(sign * step)?;
			rejections += 1;
		}
		if rejections > 0 {
			if let Some((t, ind)) = &probe.ray_best {
				step = sign * t;
				first = ind.clone();
			}
		}

		let (forward, improved) = self.expand(&mut probe, sign, step, first, room, step)?;
		let bracket = if !improved && back_room > 0.0 {
			let back = step.min(back_room);
			let candidate = probe.eval(-sign * back)?;
			if candidate.dominates(&forward.best) {
				let (backward, _) = self.expand(&mut probe, -sign, back, candidate, back_room, step)?;
				backward.along(-sign)
			} else {
				Bracket { lo: -back, lo_ind: Some(candidate), ..forward }.along(sign)
			}
		} else {
			forward.along(sign)
		};

		self.refine(&mut probe, bracket, step)?;
		probe.finish()
	}

	/// Grow the step geometrically along `sign * direction` while it improves
	fn expand<F, G>(
		&self,
		probe: &mut Probe<'_, '_, F, G>,
		sign: f64,
		start: f64,
		first: Individual,
		room: f64,
		step: f64,
	) -> Result<(Bracket, bool), EvalError>
	where
		F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
		G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
	{
		let mut near = 0.0;
		let mut near_ind = None;
		let mut best_u = start;
		let mut best = first;
		let mut far = None;
		let mut improved = false;

		for _ in 0..self.config.max_expansions {
			if best_u >= room {
				break;
			}
			let candidate = (best_u + self.config.expansion_factor * (best_u - near)).min(room);
			let ind = probe.eval(sign * candidate)?;

			if self.alg == LineSearchAlg::Modified && best.is_feasible() && !ind.is_feasible() {
				// Bisect on feasibility between the last feasible point and the crossing
				let mut feasible_u = best_u;
				let mut feasible_ind = None;
				let mut infeasible_u = candidate;
				for _ in 0..self.config.max_boundary_steps {
					if infeasible_u - feasible_u <= self.config.boundary_tolerance * step {
						break;
					}
					let mid = 0.5 * (feasible_u + infeasible_u);
					let m = probe.eval(sign * mid)?;
					if m.is_feasible() {
						if m.dominates(&best) {
							near = best_u;
							near_ind = Some(std::mem::replace(&mut best, m));
							best_u = mid;
							feasible_ind = None;
							improved = true;
						} else {
							feasible_ind = Some(m);
						}
						feasible_u = mid;
					} else {
						infeasible_u = mid;
					}
				}
				far = Some((feasible_u, feasible_ind));
				break;
			}

			if ind.dominates(&best) {
				near = best_u;
				near_ind = Some(std::mem::replace(&mut best, ind));
				best_u = candidate;
				improved = true;
			} else {
				far = Some((candidate, Some(ind)));
				break;
			}
		}

		let (hi, hi_ind) = far.unwrap_or((best_u, None));
		Ok((Bracket { lo: near, lo_ind: near_ind, t: best_u, best, hi, hi_ind }, improved))
	}

	/// Shrink the bracket around its best point. A bisection of the larger
	/// side alternates with a parabolic step whenever one is available.
	fn refine<F, G>(&self, probe: &mut Probe<'_, '_, F, G>, mut bracket: Bracket, step: f64) -> Result<(), EvalError>
	where
		F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
		G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
	{
		let min_move = self.config.tolerance * step;
		let mut parabolic = true;
		for _ in 0..self.config.max_refinements {
			if bracket.width() < min_move {
				break;
			}
			let vertex = if parabolic {
				bracket.parabolic_point().filter(|v| (v - bracket.t).abs() > min_move)
			} else {
				None
			};
			parabolic = vertex.is_none();
			let u = vertex.unwrap_or_else(|| bracket.bisection_point());
			let ind = probe.eval(u)?;
			bracket.update(u, ind);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::evaluation::{EvaluationBudget, no_constraints};
	use ndarray::array;

	fn worst() -> Individual {
		Individual::new(array![0.0], f64::INFINITY, array![f64::INFINITY], usize::MAX)
	}

	#[test]
	fn test_parse_and_display() {
		assert_eq!("standard".parse::<LineSearchAlg>(), Ok(LineSearchAlg::Standard));
		assert_eq!("Modified".parse::<LineSearchAlg>(), Ok(LineSearchAlg::Modified));
		assert!("golden".parse::<LineSearchAlg>().is_err());
		assert_eq!(LineSearchAlg::Standard.to_string(), "standard");
		assert_eq!(LineSearchAlg::default(), LineSearchAlg::Modified);
	}

	#[test]
	fn test_invalid_config() {
		let cfg = LineSearchConfig { tolerance: 0.0, ..LineSearchConfig::default() };
		assert!(matches!(cfg.validate(), Err(ConfigError::InvalidParameter { name: "tolerance", .. })));
		assert!(LineSearchConfig::default().validate().is_ok());
	}

	#[test]
	fn test_finds_interior_minimum() {
		let f = |x: &Array1<f64>| Ok((x[0] - 3.0).powi(2));
		let bounds = Bounds::from_pairs(&[(-10.0, 10.0)]).unwrap();
		let mut budget = EvaluationBudget::unlimited();
		let mut eval = Evaluator::new(&f, &no_constraints, &mut budget);
		let mut best = worst();
		let ls = LineSearch::new(LineSearchAlg::Standard, LineSearchConfig::default(), &bounds);
		let found = ls.search(&mut eval, &array![0.0], &array![1.0], 1.0, &mut best).unwrap();
		// Exact on a quadratic thanks to the parabolic step
		assert!((found.x()[0] - 3.0).abs() < 1e-6, "x = {}", found.x()[0]);
		assert_eq!(best, found);
	}

	#[test]
	fn test_parabola_vertex() {
		let v = parabola_vertex((1.0, 4.0), (2.5, 0.25), (6.0, 9.0)).unwrap();
		assert!((v - 3.0).abs() < 1e-12);
		// Collinear points have no vertex
		assert_eq!(parabola_vertex((0.0, 0.0), (1.0, -1.0), (2.0, -2.0)), None);
	}

	#[test]
	fn test_expansion_stops_at_the_wall() {
		let f = |x: &Array1<f64>| Ok(-x[0]);
		let bounds = Bounds::from_pairs(&[(0.0, 2.0)]).unwrap();
		let mut budget = EvaluationBudget::unlimited();
		let mut eval = Evaluator::new(&f, &no_constraints, &mut budget);
		let mut best = worst();
		let ls = LineSearch::new(LineSearchAlg::Standard, LineSearchConfig::default(), &bounds);
		let found = ls.search(&mut eval, &array![0.0], &array![1.0], 0.5, &mut best).unwrap();
		assert_eq!(found.x()[0], 2.0);
	}

	#[test]
	fn test_direction_flips_on_a_face() {
		let f = |x: &Array1<f64>| Ok(x[0]);
		let bounds = Bounds::from_pairs(&[(0.0, 2.0)]).unwrap();
		let mut budget = EvaluationBudget::unlimited();
		let mut eval = Evaluator::new(&f, &no_constraints, &mut budget);
		let mut best = worst();
		let ls = LineSearch::new(LineSearchAlg::Modified, LineSearchConfig::default(), &bounds);
		let found = ls.search(&mut eval, &array![2.0], &array![1.0], 0.5, &mut best).unwrap();
		assert_eq!(found.x()[0], 0.0);
	}

	#[test]
	fn test_modified_locates_the_boundary() {
		let f = |x: &Array1<f64>| Ok(-x[0]);
		let g = |x: &Array1<f64>| Ok(array![x[0] - 1.0]);
		let bounds = Bounds::from_pairs(&[(0.0, 4.0)]).unwrap();

		let run = |alg: LineSearchAlg| {
			let mut budget = EvaluationBudget::unlimited();
			let mut eval = Evaluator::new(&f, &g, &mut budget);
			let mut best = worst();
			let ls = LineSearch::new(alg, LineSearchConfig::default(), &bounds);
			ls.search(&mut eval, &array![0.0], &array![1.0], 0.5, &mut best).unwrap()
		};

		let modified = run(LineSearchAlg::Modified);
		let standard = run(LineSearchAlg::Standard);
		assert!(modified.is_feasible());
		assert!(standard.is_feasible());
		assert!(1.0 - modified.x()[0] < 1e-4, "x = {}", modified.x()[0]);
		assert!(modified.f() < standard.f());
	}

	#[test]
	fn test_infeasible_first_step_is_halved() {
		let f = |x: &Array1<f64>| Ok(x[0]);
		let g = |x: &Array1<f64>| Ok(array![x[0] - 0.3]);
		let bounds = Bounds::from_pairs(&[(0.0, 4.0)]).unwrap();
		let mut budget = EvaluationBudget::unlimited();
		let mut eval = Evaluator::new(&f, &g, &mut budget);
		let mut best = worst();
		let ls = LineSearch::new(LineSearchAlg::Standard, LineSearchConfig::default(), &bounds);
		let found = ls.search(&mut eval, &array![0.0], &array![1.0], 1.0, &mut best).unwrap();
		assert!(found.is_feasible());
		assert!(found.x()[0] <= 0.3);
	}

	#[test]
	fn test_budget_aborts_but_best_is_kept() {
		let f = |x: &Array1<f64>| Ok((x[0] - 3.0).powi(2));
		let bounds = Bounds::from_pairs(&[(-10.0, 10.0)]).unwrap();
		let mut budget = EvaluationBudget::new(2);
		let mut eval = Evaluator::new(&f, &no_constraints, &mut budget);
		let mut best = worst();
		let ls = LineSearch::new(LineSearchAlg::Modified, LineSearchConfig::default(), &bounds);
		let res = ls.search(&mut eval, &array![0.0], &array![1.0], 1.0, &mut best);
		assert_eq!(res, Err(EvalError::BudgetExhausted));
		assert_eq!(eval.evaluations(), 2);
		assert!(best.f() < 9.0);
	}

	#[test]
	fn test_points_stay_in_the_box() {
		let f = |x: &Array1<f64>| Ok(-(x[0] + x[1]));
		let bounds = Bounds::from_pairs(&[(-1.0, 1.0), (-1.0, 1.0)]).unwrap();
		let mut budget = EvaluationBudget::unlimited();
		let mut eval = Evaluator::new(&f, &no_constraints, &mut budget);
		let mut best = worst();
		let d = array![0.6, 0.8];
		let ls = LineSearch::new(LineSearchAlg::Standard, LineSearchConfig::default(), &bounds);
		let found = ls.search(&mut eval, &array![0.0, 0.0], &d, 10.0, &mut best).unwrap();
		assert!(bounds.contains(found.x()));
		assert!((found.x()[1] - 1.0).abs() < 1e-12);
	}
}
