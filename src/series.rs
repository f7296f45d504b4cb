use crate::chart::{Annotation, Line, Marker, Mode, Trace};
use crate::models::{CategoryGroup, GrowthSeries};

const MARKER_SIZE: f64 = 9.0;
const LINE_WIDTH: f64 = 4.0;

/// Observed points on fixed slots: x = 0 (BOY), slot_width (MOY), ...
pub fn build_series(group: &CategoryGroup, slot_width: f64) -> GrowthSeries {
    let x = (0..group.points.len())
        .map(|index| index as f64 * slot_width)
        .collect();
    let y = group.points.iter().map(|point| point.avg_week_growth).collect();
    GrowthSeries { x, y }
}

/// One trace per observed point so each can carry its own marker.
pub fn marker_traces(group: &CategoryGroup, series: &GrowthSeries) -> Vec<Trace> {
    series
        .x
        .iter()
        .zip(series.y.iter())
        .map(|(&x, &y)| {
            Trace::new(Mode::Markers, vec![x], vec![y])
                .named(&group.display_name)
                .with_marker(Marker::solid(&group.color, MARKER_SIZE))
                .skip_hover()
                .hide_legend()
        })
        .collect()
}

/// Line across all observed points; this is the trace shown in the legend.
pub fn line_trace(group: &CategoryGroup, series: &GrowthSeries) -> Trace {
    Trace::new(Mode::Lines, series.x.clone(), series.y.clone())
        .named(&group.display_name)
        .with_line(Line::solid(&group.color, LINE_WIDTH))
        .skip_hover()
}

pub fn point_label_annotations(series: &GrowthSeries, angle: f64) -> Vec<Annotation> {
    series
        .x
        .iter()
        .zip(series.y.iter())
        .map(|(&x, &y)| Annotation {
            textangle: Some(angle),
            xanchor: "center".to_string(),
            yanchor: "bottom".to_string(),
            ..Annotation::at(format_number(round_to(y, 1)), x, y)
        })
        .collect()
}

/// Rounds half up at `decimals` places, matching how the dashboard rounds.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Prints whole numbers without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrowthPoint;

    fn group(values: &[f64]) -> CategoryGroup {
        CategoryGroup {
            key: "High".to_string(),
            display_name: "High Usage".to_string(),
            visible: true,
            student_count: 40,
            avg_weeks_between_assessment: 17.0,
            color: "#04BF8A".to_string(),
            points: values
                .iter()
                .zip(["BOY", "MOY", "EOY"])
                .map(|(&growth, week)| GrowthPoint {
                    week: week.to_string(),
                    avg_week_growth: growth,
                })
                .collect(),
        }
    }

    #[test]
    fn places_points_on_fixed_slots() {
        let series = build_series(&group(&[0.0, 10.0]), 50.0);
        assert_eq!(series.x, vec![0.0, 50.0]);
        assert_eq!(series.y, vec![0.0, 10.0]);
    }

    #[test]
    fn index_encoded_slots() {
        let series = build_series(&group(&[1.0, 4.0]), 1.0);
        assert_eq!(series.x, vec![0.0, 1.0]);
    }

    #[test]
    fn emits_marker_per_point_and_one_line() {
        let g = group(&[0.0, 10.0]);
        let series = build_series(&g, 50.0);
        let markers = marker_traces(&g, &series);
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|t| t.mode == Mode::Markers && t.x.len() == 1));
        assert_eq!(markers[1].y, vec![10.0]);

        let line = line_trace(&g, &series);
        assert_eq!(line.mode, Mode::Lines);
        assert_eq!(line.name.as_deref(), Some("High Usage"));
        assert_eq!(line.hoverinfo.as_deref(), Some("skip"));
    }

    #[test]
    fn labels_each_point_at_an_angle() {
        let series = build_series(&group(&[0.0, 12.34]), 50.0);
        let labels = point_label_annotations(&series, -45.0);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].text, "12.3");
        assert_eq!(labels[1].textangle, Some(-45.0));
    }

    #[test]
    fn formats_numbers_like_the_dashboard() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(2.3), "2.3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(round_to(17.25, 1), 17.3);
        assert_eq!(round_to(-2.25, 1), -2.2);
    }
}
