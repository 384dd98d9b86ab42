//! Recording wrapper for RayEs for testing purposes

use std::path::Path;

use ndarray::Array1;

use crate::recorder::GenerationRecorder;
use crate::{EvalError, Info, LineSearchAlg, RayEsConfig, ray_es};

/// Run RayEs with one CSV row recorded per generation.
///
/// Any callback already present in `config` is replaced by the recorder.
/// Returns the report and the path of the CSV file.
#[allow(clippy::too_many_arguments)]
pub fn run_recorded_ray_es<F, G>(
	name: &str,
	objective: &F,
	constraints: &G,
	bounds: &[(f64, f64)],
	x0: Array1<f64>,
	variant: LineSearchAlg,
	max_evaluations: usize,
	mut config: RayEsConfig,
	output_dir: impl AsRef<Path>,
) -> Result<(Info, String), Box<dyn std::error::Error>>
where
	F: Fn(&Array1<f64>) -> Result<f64, EvalError>,
	G: Fn(&Array1<f64>) -> Result<Array1<f64>, EvalError>,
{
	let recorder = GenerationRecorder::new(name);
	config.callback = Some(recorder.create_callback());

	let info = ray_es(objective, constraints, bounds, x0, variant, max_evaluations, config)?;
	let csv_path = recorder.save_to_csv(output_dir)?;
	Ok((info, csv_path))
}
