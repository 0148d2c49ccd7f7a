use function_analyzer::{
    analyze, find_horizontal_asymptotes, find_inflection_points, find_relative_extrema,
    find_vertical_asymptotes, find_x_intercepts, find_y_intercepts, Engine, ExtremumKind, ProbeOptions,
    SymbolicBackend,
};
use proptest::prelude::*;

fn setup(text: &str) -> (Engine, function_analyzer::Expr, function_analyzer::Symbol) {
    let engine = Engine::new();
    let f = engine.parse(text).unwrap();
    let x = engine.variable_for(&f).unwrap();
    (engine, f, x)
}

fn strings(v: Vec<function_analyzer::Expr>) -> Vec<String> {
    v.into_iter().map(|e| e.to_string()).collect()
}

#[test]
fn test_polynomial_intercepts() {
    let (engine, f, x) = setup("x^2 - 4");
    assert_eq!(strings(find_x_intercepts(&engine, &f).unwrap()), vec!["-2", "2"]);
    assert_eq!(find_y_intercepts(&engine, &f, &x).unwrap().to_string(), "-4");
}

#[test]
fn test_asymptotes_of_reciprocal() {
    let (engine, f, x) = setup("1/x");
    assert_eq!(strings(find_horizontal_asymptotes(&engine, &f, &x).unwrap()), vec!["0"]);
    assert_eq!(strings(find_vertical_asymptotes(&engine, &f, &x).unwrap()), vec!["0"]);
    assert!(find_y_intercepts(&engine, &f, &x).is_none());
}

#[test]
fn test_linear_has_no_horizontal_asymptote() {
    let (engine, f, x) = setup("x");
    assert!(find_horizontal_asymptotes(&engine, &f, &x).unwrap().is_empty());
}

#[test]
fn test_vertical_asymptote_and_removable_point() {
    let (engine, f, x) = setup("1/(x - 2)");
    assert_eq!(strings(find_vertical_asymptotes(&engine, &f, &x).unwrap()), vec!["2"]);

    let (engine, f, x) = setup("(x - 1)/(x - 1)");
    assert!(find_vertical_asymptotes(&engine, &f, &x).unwrap().is_empty());
}

#[test]
fn test_extrema_of_parabolas() {
    let opts = ProbeOptions::default();
    let (engine, f, x) = setup("x^2");
    let found = find_relative_extrema(&engine, &f, &x, opts).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, ExtremumKind::Min);
    assert_eq!(found[0].x.to_string(), "0");

    let (engine, f, x) = setup("-x^2");
    let found = find_relative_extrema(&engine, &f, &x, opts).unwrap();
    assert_eq!(found[0].kind, ExtremumKind::Max);
}

#[test]
fn test_inflection_points() {
    let opts = ProbeOptions::default();
    let (engine, f, x) = setup("x^3");
    let found = find_inflection_points(&engine, &f, &x, opts).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].x.to_string(), "0");

    let (engine, f, x) = setup("x^2");
    assert!(find_inflection_points(&engine, &f, &x, opts).unwrap().is_empty());
}

#[test]
fn test_zero_iterations_disable_probing() {
    let opts = ProbeOptions::new(1e-6, 0);
    let (engine, f, x) = setup("x^3 - 3x");
    assert!(find_relative_extrema(&engine, &f, &x, opts).unwrap().is_empty());
    assert!(find_inflection_points(&engine, &f, &x, opts).unwrap().is_empty());
}

#[test]
fn test_transcendental_function() {
    // f' = exp(-x) * (1 - x)
    let (engine, f, x) = setup("x*exp(-x)");
    let analysis = analyze(&engine, &f, &x, ProbeOptions::default());
    assert_eq!(strings(analysis.x_intercepts.unwrap()), vec!["0"]);
    assert_eq!(strings(analysis.horizontal_asymptotes.unwrap()), vec!["0"]);
    let extrema = analysis.extrema.unwrap();
    assert_eq!(extrema.len(), 1);
    assert_eq!(extrema[0].kind, ExtremumKind::Max);
    assert_eq!(extrema[0].x.to_string(), "1");
}

#[test]
fn test_high_power_beyond_exact_expansion() {
    let (engine, f, x) = setup("x^66");
    assert_eq!(find_y_intercepts(&engine, &f, &x).unwrap(), function_analyzer::Expr::zero());
    let found = find_relative_extrema(&engine, &f, &x, ProbeOptions::default()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, ExtremumKind::Min);
    assert_eq!(found[0].x.to_string(), "0");
}

#[test]
fn test_logistic_curve_has_two_asymptotes() {
    let (engine, f, x) = setup("exp(x)/(exp(x) + 1)");
    assert_eq!(strings(find_horizontal_asymptotes(&engine, &f, &x).unwrap()), vec!["1", "0"]);
    assert!(find_vertical_asymptotes(&engine, &f, &x).unwrap().is_empty());
}

#[test]
fn test_one_failure_does_not_hide_the_rest() {
    let (engine, f, x) = setup("x^5 - x + 1");
    let analysis = analyze(&engine, &f, &x, ProbeOptions::default());
    assert!(analysis.x_intercepts.is_err());
    assert_eq!(analysis.y_intercept.as_ref().unwrap().to_string(), "1");
    assert!(analysis.horizontal_asymptotes.as_ref().unwrap().is_empty());
    assert!(analysis.vertical_asymptotes.as_ref().unwrap().is_empty());
    assert!(analysis.has_failures());
}

proptest! {
    #[test]
    fn prop_roots_of_linear_products_are_recovered(
        roots in prop::collection::btree_set(-6i64..=6, 1..=3)
    ) {
        let text = roots
            .iter()
            .map(|a| format!("(x - ({}))", a))
            .collect::<Vec<_>>()
            .join("*");
        let (engine, f, _) = setup(&text);
        let found = strings(find_x_intercepts(&engine, &f).unwrap());
        let expected: Vec<String> = roots.iter().map(|a| a.to_string()).collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn prop_vertex_of_parabola(a in -4i64..=4, h in -5i64..=5, k in -5i64..=5) {
        prop_assume!(a != 0);
        let text = format!("({})*(x - ({}))^2 + ({})", a, h, k);
        let (engine, f, x) = setup(&text);
        let found = find_relative_extrema(&engine, &f, &x, ProbeOptions::default()).unwrap();
        prop_assert_eq!(found.len(), 1);
        let expected = if a > 0 { ExtremumKind::Min } else { ExtremumKind::Max };
        prop_assert_eq!(found[0].kind, expected);
        prop_assert_eq!(found[0].x.to_string(), h.to_string());
        prop_assert_eq!(found[0].y.to_string(), k.to_string());
    }

    #[test]
    fn prop_analysis_is_repeatable(c in -3i64..=3, d in -3i64..=3) {
        let text = format!("x^3 + ({})*x^2 + ({})*x", c, d);
        let (engine, f, x) = setup(&text);
        let opts = ProbeOptions::default();
        let first = analyze(&engine, &f, &x, opts);
        let second = analyze(&engine, &f, &x, opts);
        prop_assert_eq!(first.x_intercepts, second.x_intercepts);
        prop_assert_eq!(first.extrema, second.extrema);
        prop_assert_eq!(first.inflection_points, second.inflection_points);
    }
}
