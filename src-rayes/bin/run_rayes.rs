use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use rayes::{
	Bounds, EvalError, EvaluationBudget, Evaluator, GenerationRecorder, Individual, LineSearchAlg, RayEs,
	RayEsConfigBuilder, TerminationCriterion, grid_search, random_search,
};
use rayes_testfunctions::{TestProblem, get_function_metadata, get_test_problem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum Algorithm {
	Rayes,
	Random,
	Grid,
}

/// CLI arguments for benchmark runs
#[derive(Parser, Debug)]
#[command(name = "run_rayes")]
#[command(about = "Run RayEs or a baseline search on a benchmark function")]
struct Args {
	/// Benchmark function
	#[arg(short, long, default_value = "sphere")]
	function: String,

	/// Problem dimension
	#[arg(short, long, default_value_t = 2)]
	dim: usize,

	/// The budget is `dim * budget_multiplier` evaluations
	#[arg(short, long, default_value_t = 1000)]
	budget_multiplier: usize,

	/// Seed of the first run
	#[arg(short, long, default_value_t = 1)]
	seed: u64,

	/// Line search variant (standard, modified)
	#[arg(long, default_value = "modified")]
	variant: LineSearchAlg,

	#[arg(short, long, value_enum, default_value_t = Algorithm::Rayes)]
	algo: Algorithm,

	/// Independent restarts sharing the budget; each restart pays for its start point
	#[arg(short, long, default_value_t = 0)]
	restarts: usize,

	/// Seeded runs, executed in parallel
	#[arg(long, default_value_t = 1)]
	runs: usize,

	/// Runs stop once a feasible value within `precision` of the known optimum is found
	#[arg(long, default_value_t = 1e-8)]
	precision: f64,

	/// Directory for per-generation CSV files
	#[arg(long)]
	record_dir: Option<PathBuf>,

	/// Print the run summaries as JSON
	#[arg(long)]
	json: bool,

	/// List the benchmark functions and exit
	#[arg(long)]
	list: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
	function: String,
	dim: usize,
	seed: u64,
	algorithm: Algorithm,
	best_x: Option<Vec<f64>>,
	best_f: Option<f64>,
	violation: Option<f64>,
	feasible: bool,
	evaluations: usize,
	restarts: usize,
	termination: Option<TerminationCriterion>,
	seconds_per_evaluation: f64,
}

fn keep_best(best: &mut Option<Individual>, candidate: Option<Individual>) {
	if let Some(c) = candidate {
		if best.as_ref().is_none_or(|b| c.dominates(b)) {
			*best = Some(c);
		}
	}
}

/// Uniform point in the box, used as start of every restart after the first
fn random_start(bounds: &Bounds, rng: &mut StdRng) -> Array1<f64> {
	let width = bounds.width();
	(0..bounds.dim()).map(|j| bounds.lower()[j] + rng.random::<f64>() * width[j]).collect()
}

fn run_one(args: &Args, problem: &TestProblem, seed: u64) -> Result<RunSummary, String> {
	let objective = |x: &Array1<f64>| -> Result<f64, EvalError> { Ok((problem.objective)(x)) };
	let constraints = |x: &Array1<f64>| -> Result<Array1<f64>, EvalError> { Ok((problem.constraints)(x)) };
	let bounds = Bounds::from_pairs(&problem.bounds).map_err(|e| e.to_string())?;
	let max_evaluations = problem.dim() * args.budget_multiplier;
	let mut budget = EvaluationBudget::new(max_evaluations);
	let mut rng = StdRng::seed_from_u64(seed);
	let target = problem.optimum.map(|opt| opt + args.precision);

	let started = Instant::now();
	let mut best = None;
	let mut termination = None;
	let mut restarts = 0;

	match args.algo {
		Algorithm::Rayes => {
			for restart in 0..=args.restarts {
				let target_hit = termination == Some(TerminationCriterion::TargetHit);
				if (target_hit && !problem.is_constrained()) || budget.is_exhausted() {
					break;
				}

				let x0 = if restart == 0 { problem.x0.clone() } else { random_start(&bounds, &mut rng) };
				// Only the first start is free, so the runs stay within `budget + 1`
				let mut builder = RayEsConfigBuilder::new().seed(rng.random::<u64>()).charge_initial(restart > 0);
				if let Some(t) = target {
					builder = builder.target(t);
				}
				let mut config = builder.build();
				let recorder = GenerationRecorder::new(format!("{}_{}d_seed{}_r{}", problem.name, problem.dim(), seed, restart));
				if args.record_dir.is_some() {
					config.callback = Some(recorder.create_callback());
				}

				let remaining = budget.remaining();
				let report = RayEs::new(
					&objective,
					&constraints,
					bounds.lower().clone(),
					bounds.upper().clone(),
					x0,
					args.variant,
					&mut budget,
				)
				.with_config(config)
				.run()
				.map_err(|e| e.to_string())?;
				info!("seed {} restart {}: {}", seed, restart, report);
				restarts = restart;

				if let Some(dir) = &args.record_dir {
					recorder.save_to_csv(dir).map_err(|e| e.to_string())?;
				}
				termination = Some(report.termination_criterion());
				keep_best(&mut best, Some(report.best().clone()));

				if budget.remaining() == remaining {
					warn!(
						"budget has not been exhausted ({}/{} evaluations done)",
						max_evaluations - remaining,
						max_evaluations
					);
					break;
				}
			}
		}
		Algorithm::Random => {
			let mut evaluator = Evaluator::new(&objective, &constraints, &mut budget);
			let report = random_search(&mut evaluator, &bounds, &mut rng).map_err(|e| e.to_string())?;
			keep_best(&mut best, report.best);
		}
		Algorithm::Grid => {
			let mut evaluator = Evaluator::new(&objective, &constraints, &mut budget);
			let report = grid_search(&mut evaluator, &bounds).map_err(|e| e.to_string())?;
			keep_best(&mut best, report.best);
		}
	}

	let evaluations = budget.used();
	let seconds_per_evaluation =
		if evaluations > 0 { started.elapsed().as_secs_f64() / evaluations as f64 } else { 0.0 };

	Ok(RunSummary {
		function: problem.name.clone(),
		dim: problem.dim(),
		seed,
		algorithm: args.algo,
		best_x: best.as_ref().map(|b| b.x().to_vec()),
		best_f: best.as_ref().map(|b| b.f()),
		violation: best.as_ref().map(|b| b.violation()),
		feasible: best.as_ref().is_some_and(|b| b.is_feasible()),
		evaluations,
		restarts,
		termination,
		seconds_per_evaluation,
	})
}

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::init();
	let args = Args::parse();

	if args.list {
		let mut functions: Vec<_> = get_function_metadata().into_values().collect();
		functions.sort_by(|a, b| a.name.cmp(&b.name));
		for meta in functions {
			println!("{:<18} constraints={} {}", meta.name, meta.n_constraints, meta.description);
		}
		return Ok(());
	}

	let problem = get_test_problem(&args.function, args.dim)
		.ok_or_else(|| format!("unknown function or unsupported dimension: {} (d={})", args.function, args.dim))?;
	if let Some(dir) = &args.record_dir {
		std::fs::create_dir_all(dir)?;
	}

	let started = Instant::now();
	let summaries = (0..args.runs as u64)
		.into_par_iter()
		.map(|i| run_one(&args, &problem, args.seed + i))
		.collect::<Result<Vec<_>, String>>()?;

	if args.json {
		println!("{}", serde_json::to_string_pretty(&summaries)?);
	} else {
		for s in &summaries {
			println!(
				"{} d={} seed={} {:?}: f={} feasible={} evaluations={} restarts={} ({:.2e} seconds/evaluation)",
				s.function,
				s.dim,
				s.seed,
				s.algorithm,
				s.best_f.map_or("n/a".to_string(), |f| format!("{:.6e}", f)),
				s.feasible,
				s.evaluations,
				s.restarts,
				s.seconds_per_evaluation
			);
		}
	}

	let total: usize = summaries.iter().map(|s| s.evaluations).sum();
	if total > 0 {
		println!(
			"d={} done in {:.2e} seconds/evaluation",
			args.dim,
			started.elapsed().as_secs_f64() / total as f64
		);
	}
	Ok(())
}
