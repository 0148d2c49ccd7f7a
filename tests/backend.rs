use std::cmp::Ordering;

use function_analyzer::{Direction, Engine, LimitTarget, SymbolicBackend};

/// Behavior the analysis operations rely on from any backend.
fn check_backend<B: SymbolicBackend>(cas: &B) {
    let f = cas.parse("1/(x - 1)").unwrap();
    let g = cas.parse("x^2 - 9").unwrap();

    let roots = cas.solve(&g, None).unwrap();
    assert_eq!(roots.len(), 2);
    assert!(roots.iter().all(|r| cas.is_real(r) && cas.is_number(r)));
    assert_eq!(cas.sign(&roots[0]), Some(Ordering::Less));

    let one = cas.number(1.0);
    let d = cas.denominator(&f).unwrap();
    assert_eq!(cas.solve(&d, None).unwrap(), vec![one.clone()]);
    assert!(cas.is_number(&one));
    assert_eq!(cas.to_f64(&cas.shift(&one, 0.5)), Some(1.5));

    assert!(cas.is_real(&cas.number(2.0)));
    assert!(!cas.is_real(&cas.number(f64::INFINITY)));
    assert!(cas.is_pos_infinity(&cas.number(f64::INFINITY)));
    assert!(cas.is_neg_infinity(&cas.number(f64::NEG_INFINITY)));
}

#[test]
fn test_engine_satisfies_backend_contract() {
    check_backend(&Engine::new());
}

#[test]
fn test_engine_limits_and_derivatives() {
    let engine = Engine::new();
    let f = engine.parse("(3x + 1)/(x - 5)").unwrap();
    let x = engine.variable_for(&f).unwrap();

    let at_inf = engine.limit(&f, &x, LimitTarget::PosInfinity, Direction::Plus).unwrap();
    assert_eq!(at_inf.to_string(), "3");

    let right = engine
        .limit(&f, &x, LimitTarget::Point(engine.number(5.0)), Direction::Plus)
        .unwrap();
    let left = engine
        .limit(&f, &x, LimitTarget::Point(engine.number(5.0)), Direction::Minus)
        .unwrap();
    assert!(engine.is_pos_infinity(&right));
    assert!(engine.is_neg_infinity(&left));

    let g = engine.parse("x^3").unwrap();
    assert_eq!(engine.differentiate(&g, &x, 2).unwrap().to_string(), "6*x");
    assert_eq!(engine.substitute(&g, &x, &engine.number(2.0)).unwrap().to_string(), "8");
}

#[test]
fn test_named_variable() {
    let engine = Engine::with_variable("t");
    let f = engine.parse("t^2 - 1").unwrap();
    let t = engine.variable_for(&f).unwrap();
    assert_eq!(t.to_string(), "t");
    let roots: Vec<String> = engine
        .solve(&f, Some(&t))
        .unwrap()
        .iter()
        .map(|r| r.to_string())
        .collect();
    assert_eq!(roots, vec!["-1", "1"]);
}
