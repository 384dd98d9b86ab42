use std::cell::{Cell, RefCell};

use ndarray::{Array1, array};
use rayes::{
    Bounds, EvalError, EvaluationBudget, LineSearchAlg, RayEs, RayEsConfigBuilder, TerminationCriterion,
    no_constraints, ray_es,
};
use rayes_testfunctions::{rosenbrock_disk_constraints, rosenbrock_disk_objective, sphere};

#[test]
fn test_budget_is_never_exceeded() {
    let calls = Cell::new(0usize);
    let counted = |x: &Array1<f64>| -> Result<f64, EvalError> {
        calls.set(calls.get() + 1);
        Ok(sphere(x))
    };

    for (i, &budget) in [0usize, 1, 2, 3, 5, 10, 37, 100, 250].iter().enumerate() {
        calls.set(0);
        let config = RayEsConfigBuilder::new().seed(100 + i as u64).build();
        let info = ray_es(
            &counted,
            &no_constraints,
            &[(-5.0, 5.0); 3],
            array![1.0, 2.0, -3.0],
            LineSearchAlg::Modified,
            budget,
            config,
        )
        .unwrap();

        // The initial point is evaluated on top of the budget
        assert!(info.evaluations() <= budget + 1, "budget {}: {} evaluations", budget, info.evaluations());
        assert_eq!(calls.get(), info.evaluations());
        assert_eq!(info.termination_criterion(), TerminationCriterion::BudgetExhausted);
    }
}

#[test]
fn test_constraint_calls_share_the_budget() {
    let objective_calls = Cell::new(0usize);
    let constraint_calls = Cell::new(0usize);
    let f = |x: &Array1<f64>| -> Result<f64, EvalError> {
        objective_calls.set(objective_calls.get() + 1);
        Ok(rosenbrock_disk_objective(x))
    };
    let g = |x: &Array1<f64>| -> Result<Array1<f64>, EvalError> {
        constraint_calls.set(constraint_calls.get() + 1);
        Ok(rosenbrock_disk_constraints(x))
    };
    let config = RayEsConfigBuilder::new().seed(7).build();
    let info = ray_es(&f, &g, &[(-1.5, 1.5); 2], array![0.0, 0.0], LineSearchAlg::Modified, 300, config).unwrap();

    assert_eq!(objective_calls.get(), info.evaluations());
    assert_eq!(constraint_calls.get(), info.evaluations());
    assert!(info.evaluations() <= 301);
}

#[test]
fn test_zero_budget_returns_the_start() {
    let f = |x: &Array1<f64>| -> Result<f64, EvalError> { Ok(sphere(x)) };
    let info = ray_es(
        &f,
        &no_constraints,
        &[(-1.0, 1.0); 2],
        array![0.5, -0.25],
        LineSearchAlg::Standard,
        0,
        RayEsConfigBuilder::new().build(),
    )
    .unwrap();
    assert_eq!(info.termination_criterion(), TerminationCriterion::BudgetExhausted);
    assert_eq!(info.best_x(), &array![0.5, -0.25]);
    assert_eq!(info.best_f(), 0.3125);
    assert_eq!(info.generations(), 0);
}

#[test]
fn test_initial_point_is_clipped_and_points_stay_in_the_box() {
    let seen = RefCell::new(Vec::new());
    let f = |x: &Array1<f64>| -> Result<f64, EvalError> {
        seen.borrow_mut().push(x.clone());
        Ok(sphere(x))
    };
    let bounds = Bounds::from_pairs(&[(-2.0, 2.0), (1.0, 3.0)]).unwrap();
    let mut budget = EvaluationBudget::new(400);
    let info = RayEs::new(
        &f,
        &no_constraints,
        bounds.lower().clone(),
        bounds.upper().clone(),
        array![10.0, -10.0],
        LineSearchAlg::Modified,
        &mut budget,
    )
    .with_config(RayEsConfigBuilder::new().seed(8).build())
    .run()
    .unwrap();

    let seen = seen.borrow();
    assert_eq!(seen[0], array![2.0, 1.0]);
    assert_eq!(seen.len(), info.evaluations());
    for x in seen.iter() {
        assert!(bounds.contains(x), "{} left the box", x);
    }
    // The optimum over this box is (0, 1), on a face
    assert!(info.best_f() >= 1.0);
    assert!(info.best_f() < 1.05, "f = {}", info.best_f());
    assert_eq!(budget.used(), info.evaluations());
}

#[test]
fn test_shared_budget_across_runs() {
    let f = |x: &Array1<f64>| -> Result<f64, EvalError> { Ok(sphere(x)) };
    let mut budget = EvaluationBudget::new(200);

    let first = RayEs::new(
        &f,
        &no_constraints,
        array![-5.0, -5.0],
        array![5.0, 5.0],
        array![1.0, 1.0],
        LineSearchAlg::Modified,
        &mut budget,
    )
    .with_config(RayEsConfigBuilder::new().seed(1).build())
    .run()
    .unwrap();
    assert_eq!(first.termination_criterion(), TerminationCriterion::BudgetExhausted);
    assert!(budget.is_exhausted());

    // A second run on the same spent budget only gets its starting point
    let second = RayEs::new(
        &f,
        &no_constraints,
        array![-5.0, -5.0],
        array![5.0, 5.0],
        array![2.0, 2.0],
        LineSearchAlg::Modified,
        &mut budget,
    )
    .run()
    .unwrap();
    assert_eq!(second.evaluations(), 1);
    assert_eq!(second.generations(), 0);
}
