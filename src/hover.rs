use crate::chart::{Font, HoverLabel, Marker, Mode, Trace};
use crate::models::{CategoryGroup, Point};

/// `steps + 1` evenly spaced points from `start` to `end`, both included.
pub fn interpolate(start: Point, end: Point, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            if i == steps {
                return end;
            }
            let t = i as f64 / steps as f64;
            Point::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
            )
        })
        .collect()
}

/// Invisible markers along the category's line. The visible line suppresses
/// hover, so these carry the student count tooltip.
pub fn hover_trace(group: &CategoryGroup, points: &[Point]) -> Trace {
    let mut trace = Trace::new(
        Mode::Markers,
        points.iter().map(|p| p.x).collect(),
        points.iter().map(|p| p.y).collect(),
    )
    .named(&group.display_name)
    .with_marker(Marker::transparent())
    .hide_legend();

    trace.hovertemplate = Some(format!(
        "{} students <extra></extra>",
        format_count(group.student_count)
    ));
    trace.hoverlabel = Some(HoverLabel {
        bgcolor: group.color.clone(),
        font: Font::sized(16.0),
    });
    trace
}

/// Groups digits in thousands: `12345` becomes `12,345`.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_inclusive_endpoints() {
        let points = interpolate(Point::new(0.0, 0.0), Point::new(100.0, 20.0), 100);
        assert_eq!(points.len(), 101);
        assert_eq!(points[0], Point::new(0.0, 0.0));
        assert_eq!(points[100], Point::new(100.0, 20.0));
        assert!(points
            .windows(2)
            .all(|pair| pair[1].x > pair[0].x && pair[1].y > pair[0].y));
    }

    #[test]
    fn degenerate_span_repeats_the_point() {
        let p = Point::new(50.0, 4.0);
        let points = interpolate(p, p, 100);
        assert_eq!(points.len(), 101);
        assert!(points.iter().all(|q| *q == p));
    }

    #[test]
    fn zero_students_still_get_a_tooltip() {
        let group = CategoryGroup {
            key: "Low".to_string(),
            display_name: "Low Usage".to_string(),
            visible: true,
            student_count: 0,
            avg_weeks_between_assessment: 12.0,
            color: "#2176ff".to_string(),
            points: Vec::new(),
        };
        let trace = hover_trace(&group, &[Point::new(0.0, 0.0), Point::new(50.0, 3.0)]);
        assert_eq!(
            trace.hovertemplate.as_deref(),
            Some("0 students <extra></extra>")
        );
        assert_eq!(trace.x.len(), 2);
        assert_eq!(trace.showlegend, Some(false));
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
