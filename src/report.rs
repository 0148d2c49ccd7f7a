//! Full analysis of one function.
//!
//! [`analyze`] runs the six operations as parallel rayon tasks; [`Report`]
//! pairs their results with a sampled curve and renders them either as
//! colored text or as JSON.

use colored::*;
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{
    find_horizontal_asymptotes, find_inflection_points, find_relative_extrema,
    find_vertical_asymptotes, find_x_intercepts, find_y_intercepts, Extremum, ExtremumKind,
    InflectionPoint,
};
use crate::backend::SymbolicBackend;
use crate::config::ProbeOptions;
use crate::error::{CasError, IntervalError};

// =============================================================================
// CONFIGURATION
// =============================================================================
const INF_THRESHOLD: f64 = 1e12;
const ZERO_THRESHOLD: f64 = 1e-10;

// =============================================================================
// PARALLEL ANALYSIS
// =============================================================================

/// Outcome of every operation, each kept independently.
#[derive(Debug, Clone)]
pub struct Analysis<E> {
    pub x_intercepts: Result<Vec<E>, CasError>,
    pub y_intercept: Option<E>,
    pub horizontal_asymptotes: Result<Vec<E>, CasError>,
    pub vertical_asymptotes: Result<Vec<E>, CasError>,
    pub extrema: Result<Vec<Extremum<E>>, CasError>,
    pub inflection_points: Result<Vec<InflectionPoint<E>>, CasError>,
}

impl<E> Analysis<E> {
    pub fn has_failures(&self) -> bool {
        self.x_intercepts.is_err()
            || self.horizontal_asymptotes.is_err()
            || self.vertical_asymptotes.is_err()
            || self.extrema.is_err()
            || self.inflection_points.is_err()
    }
}

pub fn analyze<B: SymbolicBackend>(
    cas: &B,
    f: &B::Expr,
    x: &B::Var,
    opts: ProbeOptions,
) -> Analysis<B::Expr> {
    let ((x_intercepts, y_intercept), ((horizontal, vertical), (extrema, inflection))) =
        rayon::join(
            || rayon::join(|| find_x_intercepts(cas, f), || find_y_intercepts(cas, f, x)),
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || find_horizontal_asymptotes(cas, f, x),
                            || find_vertical_asymptotes(cas, f, x),
                        )
                    },
                    || {
                        rayon::join(
                            || find_relative_extrema(cas, f, x, opts),
                            || find_inflection_points(cas, f, x, opts),
                        )
                    },
                )
            },
        );

    Analysis {
        x_intercepts,
        y_intercept,
        horizontal_asymptotes: horizontal,
        vertical_asymptotes: vertical,
        extrema,
        inflection_points: inflection,
    }
}

// =============================================================================
// CURVE SAMPLING
// =============================================================================

/// `num` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    if num <= 1 {
        return vec![start];
    }
    let step = (end - start) / (num - 1) as f64;
    (0..num).map(|i| start + step * i as f64).collect()
}

/// Closed plotting interval with `lower < upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn new(lower: f64, upper: f64) -> Result<Self, IntervalError> {
        // also rejects NaN bounds
        if !(lower < upper) {
            return Err(IntervalError { lower, upper });
        }
        Ok(Self { lower, upper })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    /// `None` where the function is undefined or not real.
    pub y: Option<f64>,
}

pub fn sample_curve<B: SymbolicBackend>(
    cas: &B,
    f: &B::Expr,
    x: &B::Var,
    interval: Interval,
    samples: usize,
) -> Vec<CurvePoint> {
    linspace(interval.lower, interval.upper, samples)
        .par_iter()
        .map(|&at| {
            let y = cas
                .substitute(f, x, &cas.number(at))
                .ok()
                .and_then(|v| cas.to_f64(&v));
            CurvePoint { x: at, y }
        })
        .collect()
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    XIntercept,
    YIntercept,
    HorizontalAsymptote,
    VerticalAsymptote,
    RelativeMaximum,
    RelativeMinimum,
    InflectionPoint,
}

impl FeatureKind {
    /// Marker color used for each kind of feature.
    fn paint(self, text: &str) -> ColoredString {
        match self {
            FeatureKind::XIntercept | FeatureKind::YIntercept => text.red(),
            FeatureKind::HorizontalAsymptote => text.yellow(),
            FeatureKind::VerticalAsymptote | FeatureKind::InflectionPoint => text.magenta(),
            FeatureKind::RelativeMaximum => text.green(),
            FeatureKind::RelativeMinimum => text.blue(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub kind: FeatureKind,
    pub label: String,
    /// Plot coordinates; an asymptote has only one of them.
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: &'static str,
    pub features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub function: String,
    pub variable: String,
    pub interval: Interval,
    pub sections: Vec<Section>,
    pub curve: Vec<CurvePoint>,
}

fn section<T>(
    name: &'static str,
    outcome: &Result<Vec<T>, CasError>,
    to_feature: impl Fn(&T) -> Feature,
) -> Section {
    match outcome {
        Ok(items) => Section {
            name,
            features: items.iter().map(to_feature).collect(),
            error: None,
        },
        Err(e) => Section {
            name,
            features: Vec::new(),
            error: Some(e.to_string()),
        },
    }
}

impl Report {
    pub fn build<B: SymbolicBackend>(
        cas: &B,
        f: &B::Expr,
        x: &B::Var,
        analysis: &Analysis<B::Expr>,
        interval: Interval,
        curve: Vec<CurvePoint>,
    ) -> Self {
        let approx = |e: &B::Expr| cas.to_f64(e);

        let y_section = Section {
            name: "Y-intercept",
            features: analysis
                .y_intercept
                .iter()
                .map(|b| Feature {
                    kind: FeatureKind::YIntercept,
                    label: format!("Y-intercept in (0;{})", b),
                    x: Some(0.0),
                    y: approx(b),
                })
                .collect(),
            error: None,
        };

        let sections = vec![
            section("X-intercepts", &analysis.x_intercepts, |a| Feature {
                kind: FeatureKind::XIntercept,
                label: format!("X-intercept in ({};0)", a),
                x: approx(a),
                y: Some(0.0),
            }),
            y_section,
            section("Horizontal asymptotes", &analysis.horizontal_asymptotes, |c| Feature {
                kind: FeatureKind::HorizontalAsymptote,
                label: format!("Horizontal Asymptote: y = {}", c),
                x: None,
                y: approx(c),
            }),
            section("Vertical asymptotes", &analysis.vertical_asymptotes, |d| Feature {
                kind: FeatureKind::VerticalAsymptote,
                label: format!("Vertical Asymptote: x = {}", d),
                x: approx(d),
                y: None,
            }),
            section("Relative extrema", &analysis.extrema, |e| Feature {
                kind: match e.kind {
                    ExtremumKind::Max => FeatureKind::RelativeMaximum,
                    ExtremumKind::Min => FeatureKind::RelativeMinimum,
                },
                label: format!("{} in ({};{})", e.kind.label(), e.x, e.y),
                x: approx(&e.x),
                y: approx(&e.y),
            }),
            section("Inflection points", &analysis.inflection_points, |p| Feature {
                kind: FeatureKind::InflectionPoint,
                label: format!("Inflection Point in ({};{})", cas.simplify(&p.x), p.y),
                x: approx(&p.x),
                y: approx(&p.y),
            }),
        ];

        Report {
            title: format!("Graph of {}", f),
            function: f.to_string(),
            variable: x.to_string(),
            interval,
            sections,
            curve,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.sections.iter().any(|s| s.error.is_some())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Colored terminal summary.
    pub fn print_pretty(&self) {
        println!("{}", self.title.magenta().bold());
        println!(
            "{}{}   {}[{}, {}]",
            "Variable: ".cyan(),
            self.variable.cyan(),
            "Interval: ".cyan(),
            format_val(self.interval.lower),
            format_val(self.interval.upper)
        );

        for section in &self.sections {
            println!("{}", format!("--- {} ---", section.name).white().bold());
            if let Some(err) = &section.error {
                println!("  {}", err.red());
                continue;
            }
            if section.features.is_empty() {
                println!("  {}", "none".dimmed());
                continue;
            }
            for feature in &section.features {
                let coords = match (feature.x, feature.y) {
                    (Some(x), Some(y)) => format!("  (~{}, ~{})", format_val(x), format_val(y)),
                    (Some(x), None) => format!("  (x ~ {})", format_val(x)),
                    (None, Some(y)) => format!("  (y ~ {})", format_val(y)),
                    (None, None) => String::new(),
                };
                println!("  {}{}", feature.kind.paint(&feature.label), coords.dimmed());
            }
        }

        let defined = self.curve.iter().filter(|p| p.y.is_some()).count();
        println!(
            "{}{} samples, {} defined",
            "Curve: ".dimmed(),
            self.curve.len(),
            defined
        );
        println!("{}", "-".repeat(40));
    }
}

/// Compact decimal rendering for plot coordinates.
fn format_val(val: f64) -> String {
    if val == f64::INFINITY || val > INF_THRESHOLD {
        return "oo".to_string();
    }
    if val == f64::NEG_INFINITY || val < -INF_THRESHOLD {
        return "-oo".to_string();
    }
    if val.abs() < ZERO_THRESHOLD {
        return "0".to_string();
    }

    let rounded = (val * 1_000_000.0).round() / 1_000_000.0;
    let s = format!("{:.6}", rounded);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::Engine;

    fn report_for(text: &str) -> Report {
        let engine = Engine::new();
        let f = engine.parse(text).unwrap();
        let x = engine.variable_for(&f).unwrap();
        let analysis = analyze(&engine, &f, &x, ProbeOptions::default());
        let interval = Interval::new(-10.0, 10.0).unwrap();
        let curve = sample_curve(&engine, &f, &x, interval, 100);
        Report::build(&engine, &f, &x, &analysis, interval, curve)
    }

    fn labels(report: &Report, section: &str) -> Vec<String> {
        report
            .sections
            .iter()
            .find(|s| s.name == section)
            .map(|s| s.features.iter().map(|f| f.label.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
        assert_eq!(linspace(-10.0, 10.0, 100).len(), 100);
    }

    #[test]
    fn test_interval_validation() {
        assert!(Interval::new(-1.0, 1.0).is_ok());
        assert!(Interval::new(1.0, 1.0).is_err());
        assert!(Interval::new(2.0, -2.0).is_err());
        assert!(Interval::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_format_val() {
        assert_eq!(format_val(1.5), "1.5");
        assert_eq!(format_val(2.0), "2");
        assert_eq!(format_val(1e-12), "0");
        assert_eq!(format_val(f64::INFINITY), "oo");
        assert_eq!(format_val(-std::f64::consts::SQRT_2), "-1.414214");
    }

    #[test]
    fn test_labels_follow_legend_format() {
        let report = report_for("x^2 - 4");
        assert_eq!(report.title, "Graph of x^2 - 4");
        assert_eq!(
            labels(&report, "X-intercepts"),
            vec!["X-intercept in (-2;0)", "X-intercept in (2;0)"]
        );
        assert_eq!(labels(&report, "Y-intercept"), vec!["Y-intercept in (0;-4)"]);
        assert_eq!(labels(&report, "Relative extrema"), vec!["Relative Minimum in (0;-4)"]);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_asymptote_labels() {
        let report = report_for("1/(x - 2)");
        assert_eq!(labels(&report, "Horizontal asymptotes"), vec!["Horizontal Asymptote: y = 0"]);
        assert_eq!(labels(&report, "Vertical asymptotes"), vec!["Vertical Asymptote: x = 2"]);
    }

    #[test]
    fn test_one_failure_does_not_stop_the_rest() {
        // quintic: no closed-form roots, but the y-intercept and the
        // asymptote searches still complete
        let report = report_for("x^5 - x + 1");
        let x_section = report.sections.iter().find(|s| s.name == "X-intercepts").unwrap();
        assert!(x_section.error.is_some());
        assert_eq!(labels(&report, "Y-intercept"), vec!["Y-intercept in (0;1)"]);
        assert!(report.has_errors());
    }

    #[test]
    fn test_curve_has_gaps_where_undefined() {
        let report = report_for("1/x");
        assert_eq!(report.curve.len(), 100);
        assert!(report.curve.iter().all(|p| p.x != 0.0 || p.y.is_none()));
        assert!(report.curve.iter().filter(|p| p.y.is_some()).count() >= 99);
    }

    #[test]
    fn test_json_output() {
        let report = report_for("x^3");
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Graph of x^3");
        assert_eq!(value["sections"][5]["features"][0]["kind"], "inflection_point");
        assert_eq!(value["curve"].as_array().map(Vec::len), Some(100));
    }
}
