use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// A sampled probe direction with its step scale
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
	/// Unit vector
	pub direction: Array1<f64>,
	/// `sigma * ||z||` for the normal draw `z` behind `direction`
	pub scale: f64,
}

/// Seeded source of isotropic ray directions.
///
/// Every call to [`RaySampler::sample`] consumes exactly `lambda * n` normal
/// variates, whatever happens to the rays afterwards.
pub struct RaySampler {
	rng: StdRng,
	n: usize,
	lambda: usize,
}

impl RaySampler {
	pub fn new(n: usize, lambda: usize, seed: Option<u64>) -> Self {
		let rng = match seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => {
				let mut thread_rng = rand::rng();
				StdRng::from_rng(&mut thread_rng)
			}
		};
		Self { rng, n, lambda }
	}

	pub fn lambda(&self) -> usize {
		self.lambda
	}

	/// Draw one generation of rays for step size `sigma`
	pub fn sample(&mut self, sigma: f64) -> Vec<Ray> {
		let mut rays = Vec::with_capacity(self.lambda);
		for _ in 0..self.lambda {
			let z: Array1<f64> = (0..self.n).map(|_| self.rng.sample::<f64, _>(StandardNormal)).collect();
			let norm = z.dot(&z).sqrt();
			if norm > 0.0 && norm.is_finite() {
				rays.push(Ray { direction: z / norm, scale: sigma * norm });
			} else {
				// Degenerate draw: fall back to the first axis
				let mut direction = Array1::zeros(self.n);
				direction[0] = 1.0;
				rays.push(Ray { direction, scale: sigma });
			}
		}
		rays
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_batch_size_and_unit_directions() {
		let mut sampler = RaySampler::new(3, 7, Some(42));
		let rays = sampler.sample(0.5);
		assert_eq!(rays.len(), 7);
		for ray in &rays {
			assert_eq!(ray.direction.len(), 3);
			let norm = ray.direction.dot(&ray.direction).sqrt();
			assert!((norm - 1.0).abs() < 1e-12);
			assert!(ray.scale > 0.0);
		}
	}

	#[test]
	fn test_same_seed_same_batches() {
		let mut a = RaySampler::new(4, 5, Some(7));
		let mut b = RaySampler::new(4, 5, Some(7));
		for _ in 0..3 {
			assert_eq!(a.sample(1.0), b.sample(1.0));
		}
	}

	#[test]
	fn test_consumption_is_independent_of_sigma() {
		let mut a = RaySampler::new(2, 3, Some(11));
		let mut b = RaySampler::new(2, 3, Some(11));
		a.sample(1.0);
		b.sample(1e-6);
		let next_a = a.sample(2.0);
		let next_b = b.sample(2.0);
		assert_eq!(next_a, next_b);
	}

	#[test]
	fn test_scale_is_proportional_to_sigma() {
		let mut a = RaySampler::new(2, 4, Some(3));
		let mut b = RaySampler::new(2, 4, Some(3));
		let ra = a.sample(1.0);
		let rb = b.sample(0.25);
		for (x, y) in ra.iter().zip(rb.iter()) {
			assert_eq!(x.direction, y.direction);
			assert!((x.scale * 0.25 - y.scale).abs() < 1e-12);
		}
	}
}
