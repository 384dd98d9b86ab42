use ndarray::{Array1, array};
use rayes::{EvalError, LineSearchAlg, RayEsConfigBuilder, TerminationCriterion, no_constraints, ray_es};
use rayes_testfunctions::{ellipsoid, get_test_problem, sphere};

fn objective(f: fn(&Array1<f64>) -> f64) -> impl Fn(&Array1<f64>) -> Result<f64, EvalError> {
    move |x| Ok(f(x))
}

#[test]
fn test_rayes_sphere_2d() {
    // Sphere in [-5, 5]^2 with 1000 evaluations
    let f = objective(sphere);
    let config = RayEsConfigBuilder::new().seed(30).build();
    let info = ray_es(
        &f,
        &no_constraints,
        &[(-5.0, 5.0), (-5.0, 5.0)],
        array![3.0, -4.0],
        LineSearchAlg::Modified,
        1000,
        config,
    )
    .unwrap();

    assert!(info.best_f() < 1e-3, "f = {}", info.best_f());
    assert!(matches!(
        info.termination_criterion(),
        TerminationCriterion::BudgetExhausted | TerminationCriterion::TargetHit
    ));
    assert!(info.evaluations() <= 1001);
}

#[test]
fn test_rayes_sphere_both_variants() {
    let f = objective(sphere);
    for variant in [LineSearchAlg::Standard, LineSearchAlg::Modified] {
        let config = RayEsConfigBuilder::new().seed(31).build();
        let info = ray_es(
            &f,
            &no_constraints,
            &[(-5.0, 5.0); 2],
            array![-4.0, 2.5],
            variant,
            1000,
            config,
        )
        .unwrap();
        assert!(info.best_f() < 1e-3, "{}: f = {}", variant, info.best_f());
    }
}

#[test]
fn test_rayes_sphere_5d() {
    let problem = get_test_problem("sphere", 5).unwrap();
    let f = objective(problem.objective);
    let config = RayEsConfigBuilder::new().seed(32).build();
    let info = ray_es(
        &f,
        &no_constraints,
        &problem.bounds,
        Array1::from_elem(5, 2.0),
        LineSearchAlg::Modified,
        5000,
        config,
    )
    .unwrap();
    assert!(info.best_f() < 1e-2, "f = {}", info.best_f());
    assert!(info.generations() > 0);
}

#[test]
fn test_rayes_ellipsoid_improves() {
    let f = objective(ellipsoid);
    let x0 = array![1.0, 1.0, 1.0];
    let start = ellipsoid(&x0);
    let config = RayEsConfigBuilder::new().seed(33).build();
    let info = ray_es(&f, &no_constraints, &[(-5.0, 5.0); 3], x0, LineSearchAlg::Standard, 2000, config).unwrap();
    assert!(info.best_f() < 1e-2 * start, "f = {}", info.best_f());
}

#[test]
fn test_rayes_target_stops_early() {
    let f = objective(sphere);
    let config = RayEsConfigBuilder::new().seed(34).target(1e-1).build();
    let info = ray_es(
        &f,
        &no_constraints,
        &[(-5.0, 5.0); 2],
        array![4.0, 4.0],
        LineSearchAlg::Modified,
        100_000,
        config,
    )
    .unwrap();
    assert_eq!(info.termination_criterion(), TerminationCriterion::TargetHit);
    assert!(info.best_f() <= 1e-1);
    assert!(info.evaluations() < 100_000);
}
