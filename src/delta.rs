use crate::chart::{Annotation, Line, Shape};
use crate::models::Projection;
use crate::series::{format_number, round_to};

const WEEKS_PER_MONTH: f64 = 4.33;
const CONNECTOR_COLOR: &str = "#555555";
const CONNECTOR_WIDTH: f64 = 1.5;

/// Gaps between the two compared categories.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaSummary {
    pub moy_gap: f64,
    pub eoy_gap: f64,
    pub moy_percent: Option<i64>,
    pub eoy_percent: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeltaAnnotations {
    pub summary: DeltaSummary,
    pub annotations: Vec<Annotation>,
    pub shapes: Vec<Shape>,
}

/// `round((high - low) / low * 100)`, or `None` when `low` is zero.
pub fn percent_growth_increase(low: f64, high: f64) -> Option<i64> {
    if low == 0.0 {
        return None;
    }
    let percent = ((high - low) / low * 100.0 + 0.5).floor();
    percent.is_finite().then_some(percent as i64)
}

/// Weeks as signed months, one decimal: `+2`, `-1`, `0`, `+2.3`.
pub fn months_from_weeks(weeks: f64) -> String {
    let months = round_to(weeks / WEEKS_PER_MONTH, 1);
    if months > 0.0 {
        format!("+{}", format_number(months))
    } else if months < 0.0 {
        format!("-{}", format_number(months.abs()))
    } else {
        "0".to_string()
    }
}

/// Compares two projected categories at MOY (observed) and EOY (projected).
pub fn annotate(a: &Projection, b: &Projection, slot_width: f64) -> DeltaAnnotations {
    let (moy_low, moy_high) = ordered(a.start.y, b.start.y);
    let (eoy_low, eoy_high) = ordered(a.end.y, b.end.y);

    let summary = DeltaSummary {
        moy_gap: moy_high - moy_low,
        eoy_gap: eoy_high - eoy_low,
        moy_percent: relative_increase(moy_low, moy_high),
        eoy_percent: relative_increase(eoy_low, eoy_high),
    };

    let offset = slot_width * 0.04;
    let moy_x = a.start.x;
    let eoy_x = a.end.x;

    let annotations = vec![
        Annotation::at(
            gap_text(summary.moy_percent, summary.moy_gap),
            moy_x + offset,
            (moy_low + moy_high) / 2.0,
        ),
        Annotation::at(
            gap_text(summary.eoy_percent, summary.eoy_gap),
            eoy_x + offset,
            (eoy_low + eoy_high) / 2.0,
        ),
    ];

    let connector = Line::dashed(CONNECTOR_COLOR, CONNECTOR_WIDTH);
    let shapes = vec![
        Shape::vertical(moy_x, moy_low, moy_high, connector.clone()),
        Shape::vertical(eoy_x, eoy_low, eoy_high, connector),
    ];

    DeltaAnnotations {
        summary,
        annotations,
        shapes,
    }
}

// Percentages are only shown over a positive baseline.
fn relative_increase(low: f64, high: f64) -> Option<i64> {
    if low > 0.0 {
        percent_growth_increase(low, high)
    } else {
        None
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn gap_text(percent: Option<i64>, gap_weeks: f64) -> String {
    let months = months_from_weeks(gap_weeks);
    match percent {
        Some(percent) => format!("+{percent}% ({months} months)"),
        None => format!("{months} months"),
    }
}
