use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::{CallbackAction, RayEsIntermediate};

#[derive(Debug, Error)]
pub enum RecorderError {
	#[error("cannot write {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Records optimization progress via RayEs callbacks
#[derive(Debug, Clone)]
pub struct GenerationRecorder {
	/// Problem name (used for CSV filename)
	name: String,
	records: Arc<Mutex<Vec<GenerationRecord>>>,
}

/// A single generation record
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRecord {
	pub generation: usize,
	pub evaluations: usize,
	/// Best x found so far
	pub x: Vec<f64>,
	pub best_result: f64,
	pub violation: f64,
	pub sigma: f64,
	/// Whether this generation improved the best known result
	pub is_improvement: bool,
}

impl GenerationRecorder {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), records: Arc::new(Mutex::new(Vec::new())) }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Create a callback function that records one row per generation
	pub fn create_callback(&self) -> Box<dyn FnMut(&RayEsIntermediate) -> CallbackAction + Send> {
		let records = self.records.clone();
		Box::new(move |intermediate: &RayEsIntermediate| -> CallbackAction {
			let mut records = records.lock();
			let is_improvement = match records.last() {
				Some(last) => improves(intermediate, last),
				None => true,
			};
			records.push(GenerationRecord {
				generation: intermediate.generation,
				evaluations: intermediate.evaluations,
				x: intermediate.x.to_vec(),
				best_result: intermediate.fun,
				violation: intermediate.violation,
				sigma: intermediate.sigma,
				is_improvement,
			});
			CallbackAction::Continue
		})
	}

	/// Write all recorded generations to `<output_dir>/<name>.csv`
	pub fn save_to_csv(&self, output_dir: impl AsRef<Path>) -> Result<String, RecorderError> {
		let output_dir = output_dir.as_ref();
		create_dir_all(output_dir)
			.map_err(|source| RecorderError::Io { path: output_dir.to_path_buf(), source })?;

		let path = output_dir.join(format!("{}.csv", self.name));
		let io_err = |source| RecorderError::Io { path: path.clone(), source };
		let mut file = BufWriter::new(File::create(&path).map_err(io_err)?);

		let records = self.records.lock();
		let num_dimensions = records.first().map(|r| r.x.len()).unwrap_or(0);
		write!(file, "generation,evaluations,").map_err(io_err)?;
		for i in 0..num_dimensions {
			write!(file, "x{},", i).map_err(io_err)?;
		}
		writeln!(file, "best_result,violation,sigma,is_improvement").map_err(io_err)?;

		for record in records.iter() {
			write!(file, "{},{},", record.generation, record.evaluations).map_err(io_err)?;
			for &xi in &record.x {
				write!(file, "{:.16},", xi).map_err(io_err)?;
			}
			writeln!(
				file,
				"{:.16},{:.16},{:.16},{}",
				record.best_result, record.violation, record.sigma, record.is_improvement
			)
			.map_err(io_err)?;
		}
		file.flush().map_err(io_err)?;

		Ok(path.to_string_lossy().into_owned())
	}

	/// Get a copy of all recorded generations
	pub fn records(&self) -> Vec<GenerationRecord> {
		self.records.lock().clone()
	}

	pub fn num_generations(&self) -> usize {
		self.records.lock().len()
	}

	pub fn clear(&self) {
		self.records.lock().clear();
	}

	/// Best position and objective value of the last recorded generation
	pub fn best_solution(&self) -> Option<(Vec<f64>, f64)> {
		self.records.lock().last().map(|r| (r.x.clone(), r.best_result))
	}
}

/// Feasibility-first improvement over the previous row
fn improves(intermediate: &RayEsIntermediate, last: &GenerationRecord) -> bool {
	match (intermediate.violation > 0.0, last.violation > 0.0) {
		(false, true) => true,
		(true, false) => false,
		(false, false) => intermediate.fun < last.best_result,
		(true, true) => intermediate.violation < last.violation,
	}
}
