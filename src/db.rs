use std::convert::TryFrom;

use anyhow::Context;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::GrowthRecord;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_cohort(pool: &PgPool, name: &str) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO growth_chart.cohorts (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to upsert cohort {name}"))?
    .get("id");

    Ok(id)
}

async fn insert_record(
    pool: &PgPool,
    cohort_id: Uuid,
    record: &GrowthRecord,
    source_key: &str,
) -> anyhow::Result<bool> {
    let student_count = i64::try_from(record.student_count)
        .context("student count does not fit in a BIGINT")?;

    let result = sqlx::query(
        r#"
        INSERT INTO growth_chart.growth_records
        (id, cohort_id, usage_category, usage_category_display_name,
         is_usage_category_visible, student_count, avg_weeks_between_assessment,
         week, avg_week_growth, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(cohort_id)
    .bind(&record.usage_category)
    .bind(&record.usage_category_display_name)
    .bind(record.is_usage_category_visible)
    .bind(student_count)
    .bind(record.avg_weeks_between_assessment)
    .bind(&record.week)
    .bind(record.avg_week_growth)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let cohort_id = upsert_cohort(pool, "Lincoln Unified").await?;

    let categories = [
        ("Expected", "Expected Usage", true, 4210_u64, 17.6, 11.8),
        ("Actual", "Actual Usage", true, 3875, 17.9, 8.4),
        ("High", "High Usage", false, 1320, 18.1, 15.2),
        ("Low", "Low Usage", false, 2555, 17.4, 6.1),
    ];

    for (category, display_name, visible, students, weeks_between, moy_growth) in categories {
        for (week, growth) in [("BOY", 0.0), ("MOY", moy_growth)] {
            let record = GrowthRecord {
                usage_category: category.to_string(),
                usage_category_display_name: display_name.to_string(),
                is_usage_category_visible: visible,
                student_count: students,
                avg_weeks_between_assessment: weeks_between,
                week: week.to_string(),
                avg_week_growth: growth,
            };
            let source_key = format!("seed-{}-{}", category.to_lowercase(), week.to_lowercase());
            insert_record(pool, cohort_id, &record, &source_key).await?;
        }
    }

    Ok(())
}

/// Rows for one cohort (or all cohorts), one per usage category and week.
///
/// Returns `None` when the requested cohort does not exist: that is an absent
/// table, not an empty one.
pub async fn fetch_growth_table(
    pool: &PgPool,
    cohort: Option<&str>,
) -> anyhow::Result<Option<Vec<GrowthRecord>>> {
    let cohort_id: Option<Uuid> = match cohort {
        Some(name) => {
            let row = sqlx::query("SELECT id FROM growth_chart.cohorts WHERE name = $1")
                .bind(name)
                .fetch_optional(pool)
                .await?;
            match row {
                Some(row) => Some(row.get("id")),
                None => {
                    info!(cohort = name, "cohort not found");
                    return Ok(None);
                }
            }
        }
        None => None,
    };

    let query = growth_table_query(cohort_id.is_some());

    let mut rows = sqlx::query(&query);
    if let Some(id) = cohort_id {
        rows = rows.bind(id);
    }

    let records = rows.fetch_all(pool).await?;
    let mut table = Vec::with_capacity(records.len());

    for row in records {
        let student_count: i64 = row.get("student_count");
        table.push(GrowthRecord {
            usage_category: row.get("usage_category"),
            usage_category_display_name: row.get("usage_category_display_name"),
            is_usage_category_visible: row.get("is_usage_category_visible"),
            student_count: u64::try_from(student_count).context("negative student count")?,
            avg_weeks_between_assessment: row.get("avg_weeks_between_assessment"),
            week: row.get("week"),
            avg_week_growth: row.get("avg_week_growth"),
        });
    }

    Ok(Some(table))
}

/// Merges rows per (usage category, week). Student counts add up across
/// cohorts and the averages are weighted by each row's student count.
fn growth_table_query(filter_by_cohort: bool) -> String {
    let mut query = String::from(
        "SELECT usage_category, \
         MIN(usage_category_display_name) AS usage_category_display_name, \
         BOOL_OR(is_usage_category_visible) AS is_usage_category_visible, \
         SUM(student_count)::BIGINT AS student_count, \
         COALESCE(SUM(avg_weeks_between_assessment * student_count) \
             / NULLIF(SUM(student_count), 0)::DOUBLE PRECISION, \
             AVG(avg_weeks_between_assessment)) AS avg_weeks_between_assessment, \
         week, \
         COALESCE(SUM(avg_week_growth * student_count) \
             / NULLIF(SUM(student_count), 0)::DOUBLE PRECISION, \
             AVG(avg_week_growth)) AS avg_week_growth \
         FROM growth_chart.growth_records",
    );

    if filter_by_cohort {
        query.push_str(" WHERE cohort_id = $1");
    }
    query.push_str(" GROUP BY usage_category, week ORDER BY MIN(created_at), usage_category, week");
    query
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        cohort: String,
        usage_category: String,
        usage_category_display_name: String,
        is_usage_category_visible: bool,
        student_count: u64,
        avg_weeks_between_assessment: f64,
        week: String,
        avg_week_growth: f64,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let cohort_id = upsert_cohort(pool, &row.cohort).await?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let record = GrowthRecord {
            usage_category: row.usage_category,
            usage_category_display_name: row.usage_category_display_name,
            is_usage_category_visible: row.is_usage_category_visible,
            student_count: row.student_count,
            avg_weeks_between_assessment: row.avg_weeks_between_assessment,
            week: row.week,
            avg_week_growth: row.avg_week_growth,
        };

        if insert_record(pool, cohort_id, &record, &source_key).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}
