use serde::{Deserialize, Deserializer, Serialize};

/// One row of the growth table: a (usage category, week) observation plus the
/// category metadata repeated on every row of that category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRecord {
    pub usage_category: String,
    pub usage_category_display_name: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_usage_category_visible: bool,
    pub student_count: u64,
    pub avg_weeks_between_assessment: f64,
    pub week: String,
    pub avg_week_growth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthPoint {
    pub week: String,
    pub avg_week_growth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub key: String,
    pub display_name: String,
    pub visible: bool,
    pub student_count: u64,
    pub avg_weeks_between_assessment: f64,
    pub color: String,
    pub points: Vec<GrowthPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Observed segment of one category in chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl GrowthSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn first(&self) -> Option<Point> {
        Some(Point::new(*self.x.first()?, *self.y.first()?))
    }

    pub fn last(&self) -> Option<Point> {
        Some(Point::new(*self.x.last()?, *self.y.last()?))
    }
}

/// MOY to EOY extension of an observed segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub start: Point,
    pub end: Point,
}

// The data API sends visibility as 0/1; CSV and hand-written fixtures use booleans.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Number(value) => Ok(value != 0.0),
        Flag::Text(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid visibility flag: {other}"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_visibility_flag() {
        let json = r#"{
            "usageCategory": "High",
            "usageCategoryDisplayName": "High Usage",
            "isUsageCategoryVisible": 1,
            "studentCount": 1200,
            "avgWeeksBetweenAssessment": 17.4,
            "week": "MOY",
            "avgWeekGrowth": 21.5
        }"#;
        let record: GrowthRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_usage_category_visible);
        assert_eq!(record.student_count, 1200);
    }

    #[test]
    fn absent_table_is_distinct_from_empty() {
        let absent: Option<Vec<GrowthRecord>> = serde_json::from_str("null").unwrap();
        let empty: Option<Vec<GrowthRecord>> = serde_json::from_str("[]").unwrap();
        assert!(absent.is_none());
        assert_eq!(empty, Some(Vec::new()));
    }

    #[test]
    fn rejects_rows_missing_required_fields() {
        let json = r#"{"usageCategory": "High", "week": "BOY"}"#;
        assert!(serde_json::from_str::<GrowthRecord>(json).is_err());
    }
}
