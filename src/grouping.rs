use std::collections::HashMap;

use tracing::warn;

use crate::config::Palette;
use crate::error::{ChartError, Result};
use crate::models::{CategoryGroup, GrowthPoint, GrowthRecord};

/// Groups rows by usage category in first-seen order. Metadata comes from the
/// first row of each category; points are sorted ascending by growth.
pub fn group_by_category(
    records: &[GrowthRecord],
    palette: &Palette,
    strict_colors: bool,
) -> Result<Vec<CategoryGroup>> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let existing = index.get(record.usage_category.as_str()).copied();
        let slot = match existing {
            Some(slot) => {
                check_metadata(&groups[slot], record);
                slot
            }
            None => {
                let color = resolve_color(palette, &record.usage_category, strict_colors)?;
                groups.push(CategoryGroup {
                    key: record.usage_category.clone(),
                    display_name: record.usage_category_display_name.clone(),
                    visible: record.is_usage_category_visible,
                    student_count: record.student_count,
                    avg_weeks_between_assessment: record.avg_weeks_between_assessment,
                    color,
                    points: Vec::new(),
                });
                index.insert(record.usage_category.as_str(), groups.len() - 1);
                groups.len() - 1
            }
        };

        groups[slot].points.push(GrowthPoint {
            week: record.week.clone(),
            avg_week_growth: record.avg_week_growth,
        });
    }

    for group in groups.iter_mut() {
        // Stable sort so equal growth values keep table order.
        group.points.sort_by(|a, b| a.avg_week_growth.total_cmp(&b.avg_week_growth));
    }

    Ok(groups)
}

/// Inverse of grouping, down to point order.
#[cfg(test)]
pub fn flatten(groups: &[CategoryGroup]) -> Vec<(String, String, f64)> {
    groups
        .iter()
        .flat_map(|group| {
            group
                .points
                .iter()
                .map(|point| (group.key.clone(), point.week.clone(), point.avg_week_growth))
        })
        .collect()
}

fn resolve_color(palette: &Palette, category: &str, strict: bool) -> Result<String> {
    match palette.color_for(category) {
        Some(color) => Ok(color.to_string()),
        None if strict => Err(ChartError::UnknownCategoryColor {
            category: category.to_string(),
        }),
        None => {
            warn!(category, "no color configured, using neutral color");
            Ok(palette.neutral().to_string())
        }
    }
}

fn check_metadata(group: &CategoryGroup, record: &GrowthRecord) {
    let consistent = group.display_name == record.usage_category_display_name
        && group.visible == record.is_usage_category_visible
        && group.student_count == record.student_count
        && group.avg_weeks_between_assessment == record.avg_weeks_between_assessment;

    if !consistent {
        warn!(
            category = %group.key,
            week = %record.week,
            "category metadata differs between rows, keeping first row"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(category: &str, week: &str, growth: f64) -> GrowthRecord {
        GrowthRecord {
            usage_category: category.to_string(),
            usage_category_display_name: format!("{category} Usage"),
            is_usage_category_visible: true,
            student_count: 250,
            avg_weeks_between_assessment: 18.0,
            week: week.to_string(),
            avg_week_growth: growth,
        }
    }

    #[test]
    fn groups_in_first_seen_order() {
        let records = vec![
            record("Low", "BOY", 0.0),
            record("High", "BOY", 0.0),
            record("Low", "MOY", 9.0),
            record("High", "MOY", 14.0),
        ];
        let groups = group_by_category(&records, &Palette::default(), true).unwrap();
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Low", "High"]);
        assert_eq!(groups[1].color, "#04BF8A");
        assert_eq!(groups[0].points.len(), 2);
    }

    #[test]
    fn sorts_points_by_growth_not_week() {
        let records = vec![record("High", "MOY", 14.0), record("High", "BOY", 0.5)];
        let groups = group_by_category(&records, &Palette::default(), true).unwrap();
        let weeks: Vec<&str> = groups[0].points.iter().map(|p| p.week.as_str()).collect();
        assert_eq!(weeks, vec!["BOY", "MOY"]);
    }

    #[test]
    fn keeps_metadata_from_first_row() {
        let mut second = record("High", "MOY", 14.0);
        second.student_count = 999;
        second.is_usage_category_visible = false;
        let records = vec![record("High", "BOY", 0.0), second];
        let groups = group_by_category(&records, &Palette::default(), true).unwrap();
        assert_eq!(groups[0].student_count, 250);
        assert!(groups[0].visible);
    }

    #[test]
    fn empty_table_yields_no_groups() {
        let groups = group_by_category(&[], &Palette::default(), true).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn unknown_category_fails_when_strict() {
        let records = vec![record("Medium", "BOY", 0.0)];
        let err = group_by_category(&records, &Palette::default(), true).unwrap_err();
        assert!(matches!(
            err,
            ChartError::UnknownCategoryColor { ref category } if category == "Medium"
        ));
    }

    #[test]
    fn unknown_category_falls_back_to_neutral() {
        let records = vec![record("Medium", "BOY", 0.0)];
        let groups = group_by_category(&records, &Palette::default(), false).unwrap();
        assert_eq!(groups[0].color, crate::config::NEUTRAL_COLOR);
    }

    fn sorted(mut triples: Vec<(String, String, f64)>) -> Vec<(String, String, f64)> {
        triples.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.total_cmp(&b.2))
        });
        triples
    }

    proptest! {
        #[test]
        fn grouping_preserves_every_observation(
            rows in prop::collection::vec(
                (
                    prop_oneof![Just("Expected"), Just("Actual"), Just("High"), Just("Low")],
                    prop_oneof![Just("BOY"), Just("MOY")],
                    -20.0f64..60.0,
                ),
                0..24,
            )
        ) {
            let records: Vec<GrowthRecord> = rows
                .iter()
                .map(|(category, week, growth)| record(category, week, *growth))
                .collect();
            let groups = group_by_category(&records, &Palette::default(), true).unwrap();

            let input: Vec<(String, String, f64)> = records
                .iter()
                .map(|r| (r.usage_category.clone(), r.week.clone(), r.avg_week_growth))
                .collect();
            prop_assert_eq!(sorted(flatten(&groups)), sorted(input));

            for group in &groups {
                prop_assert!(group
                    .points
                    .windows(2)
                    .all(|pair| pair[0].avg_week_growth <= pair[1].avg_week_growth));
            }
        }
    }
}
