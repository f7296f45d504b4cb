use crate::chart::{Line, Marker, Mode, Trace};
use crate::models::{CategoryGroup, GrowthSeries, Point, Projection};

const PROJECTED_LINE_WIDTH: f64 = 3.0;
const PROJECTED_MARKER_SIZE: f64 = 9.0;

/// Extends the observed segment from its last point by one more interval of
/// the same length, doubling the last observed value. A fixed heuristic, not
/// a fitted trend.
///
/// Returns `None` when fewer than two observed points exist.
pub fn project(series: &GrowthSeries, slot_width: f64) -> Option<Projection> {
    if series.len() < 2 {
        return None;
    }
    let last = series.last()?;
    Some(Projection {
        start: last,
        end: Point::new(last.x + slot_width, last.y * 2.0),
    })
}

/// Dashed projected segment plus an open marker at the projected value.
pub fn projected_traces(group: &CategoryGroup, projection: &Projection) -> Vec<Trace> {
    let line = Trace::new(
        Mode::Lines,
        vec![projection.start.x, projection.end.x],
        vec![projection.start.y, projection.end.y],
    )
    .named(&group.display_name)
    .with_line(Line::dashed(&group.color, PROJECTED_LINE_WIDTH))
    .skip_hover()
    .hide_legend();

    let marker = Trace::new(Mode::Markers, vec![projection.end.x], vec![projection.end.y])
        .named(&group.display_name)
        .with_marker(Marker {
            color: "white".to_string(),
            size: Some(PROJECTED_MARKER_SIZE),
            symbol: Some("circle-open".to_string()),
            line: Some(Line::solid(&group.color, 2.0)),
        })
        .skip_hover()
        .hide_legend();

    vec![line, marker]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(y: &[f64]) -> GrowthSeries {
        GrowthSeries {
            x: (0..y.len()).map(|i| i as f64 * 50.0).collect(),
            y: y.to_vec(),
        }
    }

    #[test]
    fn doubles_the_moy_value_at_eoy() {
        let projection = project(&series(&[0.0, 10.0]), 50.0).unwrap();
        assert_eq!(projection.start, Point::new(50.0, 10.0));
        assert_eq!(projection.end, Point::new(100.0, 20.0));
    }

    #[test]
    fn single_point_cannot_be_projected() {
        assert!(project(&series(&[7.0]), 50.0).is_none());
        assert!(project(&series(&[]), 50.0).is_none());
    }

    #[test]
    fn projected_traces_span_the_projection() {
        let group = CategoryGroup {
            key: "Low".to_string(),
            display_name: "Low Usage".to_string(),
            visible: true,
            student_count: 3,
            avg_weeks_between_assessment: 16.0,
            color: "#2176ff".to_string(),
            points: Vec::new(),
        };
        let projection = project(&series(&[0.0, 6.0]), 50.0).unwrap();
        let traces = projected_traces(&group, &projection);
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].y, vec![6.0, 12.0]);
        assert_eq!(traces[0].line.as_ref().unwrap().dash.as_deref(), Some("dash"));
        assert_eq!(traces[1].x, vec![100.0]);
    }
}
