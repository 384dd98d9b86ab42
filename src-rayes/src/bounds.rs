use ndarray::Array1;

use crate::error::ConfigError;

/// Box constraints `lower <= x <= upper`
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
	lower: Array1<f64>,
	upper: Array1<f64>,
}

impl Bounds {
	/// Validate and build the box. Every bound must be finite and ordered.
	pub fn new(lower: Array1<f64>, upper: Array1<f64>) -> Result<Self, ConfigError> {
		if lower.len() != upper.len() {
			return Err(ConfigError::DimensionMismatch {
				what: "upper bounds",
				expected: lower.len(),
				found: upper.len(),
			});
		}
		if lower.is_empty() {
			return Err(ConfigError::EmptyProblem);
		}
		for (index, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
			if !lo.is_finite() || !hi.is_finite() {
				return Err(ConfigError::NonFiniteBounds { index, lower: lo, upper: hi });
			}
			if hi < lo {
				return Err(ConfigError::InvertedBounds { index, lower: lo, upper: hi });
			}
		}
		Ok(Self { lower, upper })
	}

	/// Build from `(lower, upper)` pairs, one per dimension
	pub fn from_pairs(bounds: &[(f64, f64)]) -> Result<Self, ConfigError> {
		let lower = bounds.iter().map(|&(lo, _)| lo).collect::<Array1<f64>>();
		let upper = bounds.iter().map(|&(_, hi)| hi).collect::<Array1<f64>>();
		Self::new(lower, upper)
	}

	pub fn dim(&self) -> usize {
		self.lower.len()
	}

	pub fn lower(&self) -> &Array1<f64> {
		&self.lower
	}

	pub fn upper(&self) -> &Array1<f64> {
		&self.upper
	}

	/// Per-axis width `upper - lower`
	pub fn width(&self) -> Array1<f64> {
		&self.upper - &self.lower
	}

	/// Clamp `x` component-wise into the box
	pub fn clip(&self, x: &Array1<f64>) -> Array1<f64> {
		let mut out = x.clone();
		for i in 0..out.len() {
			out[i] = out[i].clamp(self.lower[i], self.upper[i]);
		}
		out
	}

	pub fn contains(&self, x: &Array1<f64>) -> bool {
		x.len() == self.dim()
			&& x.iter()
				.zip(self.lower.iter().zip(self.upper.iter()))
				.all(|(&xi, (&lo, &hi))| lo <= xi && xi <= hi)
	}

	/// Largest interval `[t_min, t_max]` such that `origin + t * direction`
	/// stays inside the box.
	///
	/// The origin is assumed to lie in the box, hence `t_min <= 0 <= t_max`.
	/// Axes along which the direction is zero do not restrict the interval, and
	/// neither do fixed axes (`lower == upper`): [`Bounds::point_on_ray`]
	/// keeps those at their value.
	pub fn ray_interval(&self, origin: &Array1<f64>, direction: &Array1<f64>) -> (f64, f64) {
		let mut t_min = f64::NEG_INFINITY;
		let mut t_max = f64::INFINITY;
		for i in 0..self.dim() {
			let d = direction[i];
			if d == 0.0 || self.lower[i] == self.upper[i] {
				continue;
			}
			let to_lower = (self.lower[i] - origin[i]) / d;
			let to_upper = (self.upper[i] - origin[i]) / d;
			let (lo, hi) = if d > 0.0 { (to_lower, to_upper) } else { (to_upper, to_lower) };
			t_min = t_min.max(lo);
			t_max = t_max.min(hi);
		}
		if !t_min.is_finite() {
			t_min = 0.0;
		}
		if !t_max.is_finite() {
			t_max = 0.0;
		}
		(t_min.min(0.0), t_max.max(0.0))
	}

	/// `origin + t * direction`, clipped so that rounding never leaves the box
	pub fn point_on_ray(&self, origin: &Array1<f64>, direction: &Array1<f64>, t: f64) -> Array1<f64> {
		let mut x = origin + &(direction * t);
		for i in 0..x.len() {
			x[i] = x[i].clamp(self.lower[i], self.upper[i]);
		}
		x
	}
}
