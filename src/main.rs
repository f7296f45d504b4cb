use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod assemble;
mod chart;
mod config;
mod db;
mod delta;
mod error;
mod grouping;
mod hover;
mod models;
mod projection;
mod render;
mod series;

use chart::ChartOutcome;
use config::{Palette, PipelineConfig};
use models::GrowthRecord;

#[derive(Parser)]
#[command(name = "growth-chart")]
#[command(about = "Weeks-of-growth chart builder for cohort usage categories", long_about = None)]
struct Cli {
    /// Log pipeline decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo cohort
    Seed,
    /// Import growth rows from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Build the growth chart for a cohort
    Chart(ChartArgs),
}

#[derive(clap::Args)]
#[command(group(
    ArgGroup::new("source")
        .args(["cohort", "input", "all"])
        .required(true)
        .multiple(false)
))]
struct ChartArgs {
    /// Cohort (district or school) name in the database
    #[arg(long)]
    cohort: Option<String>,
    /// Every cohort in the database
    #[arg(long)]
    all: bool,
    /// JSON file holding the record array, or `null` when no data exists
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long, default_value = "chart.json")]
    out: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// JSON palette: {"colors": {"High": "#04BF8A"}, "neutral": "#9e9e9e"}
    #[arg(long)]
    palette: Option<PathBuf>,
    #[arg(long, default_value = "Overall Growth")]
    title: String,
    #[arg(long, default_value_t = config::DEFAULT_SLOT_WIDTH)]
    slot_width: f64,
    #[arg(long, default_value_t = config::DEFAULT_HOVER_STEPS)]
    hover_steps: usize,
    #[arg(long = "no-deltas", action = ArgAction::SetFalse)]
    deltas: bool,
    #[arg(long)]
    point_labels: bool,
    #[arg(long, default_value_t = config::DEFAULT_POINT_LABEL_ANGLE, allow_hyphen_values = true)]
    point_label_angle: f64,
    /// Fail on categories missing from the palette instead of drawing them grey
    #[arg(long, conflicts_with = "lenient_colors")]
    strict_colors: bool,
    #[arg(long)]
    lenient_colors: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Html,
}

impl ChartArgs {
    /// Where the rows came from, for the page footer.
    fn source_label(&self) -> String {
        match (&self.cohort, &self.input) {
            (Some(cohort), _) => cohort.clone(),
            (None, Some(path)) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            (None, None) => "all cohorts".to_string(),
        }
    }

    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let palette = match &self.palette {
            Some(path) => Palette::load(path)?,
            None => Palette::default(),
        };

        let defaults = PipelineConfig::default();
        let strict_colors = if self.strict_colors {
            true
        } else if self.lenient_colors {
            false
        } else {
            defaults.strict_colors
        };

        let config = PipelineConfig {
            title: self.title.clone(),
            slot_width: self.slot_width,
            hover_steps: self.hover_steps,
            include_deltas: self.deltas,
            point_labels: self.point_labels,
            point_label_angle: self.point_label_angle,
            strict_colors,
            palette,
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let pool = connect().await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} growth rows from {}.", csv.display());
        }
        Commands::Chart(args) => {
            // Validate configuration before touching the data source.
            let config = args.pipeline_config()?;

            let table = match &args.input {
                Some(path) => read_table(path)?,
                None => {
                    let pool = connect().await?;
                    db::fetch_growth_table(&pool, args.cohort.as_deref()).await?
                }
            };

            let outcome = assemble::build_chart(table.as_deref(), &config)?;
            write_outcome(&outcome, &args)?;
        }
    }

    Ok(())
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

fn read_table(path: &Path) -> anyhow::Result<Option<Vec<GrowthRecord>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let table: Option<Vec<GrowthRecord>> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse growth rows in {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = ?table.as_ref().map(Vec::len),
        "loaded growth table"
    );
    Ok(table)
}

fn write_outcome(outcome: &ChartOutcome, args: &ChartArgs) -> anyhow::Result<()> {
    let body = match (outcome, args.format) {
        (ChartOutcome::Chart(spec), OutputFormat::Html) => {
            render::chart_html(spec, Some(args.source_label().as_str()), Utc::now())?
        }
        (ChartOutcome::Unavailable(message), OutputFormat::Html) => {
            render::unavailable_html(message)
        }
        (_, OutputFormat::Json) => render::chart_json(outcome)?,
    };

    std::fs::write(&args.out, body)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    match outcome {
        ChartOutcome::Chart(_) => println!("Chart written to {}.", args.out.display()),
        ChartOutcome::Unavailable(message) => {
            println!("{message} Message written to {}.", args.out.display())
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_args(extra: &[&str]) -> ChartArgs {
        let mut argv = vec!["growth-chart", "chart"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Chart(args) => args,
            _ => panic!("expected chart command"),
        }
    }

    #[test]
    fn footer_names_the_input_file() {
        let args = chart_args(&["--input", "demos/growth_rows.json"]);
        assert_eq!(args.source_label(), "growth_rows.json");
    }

    #[test]
    fn footer_names_the_cohort_or_all() {
        assert_eq!(
            chart_args(&["--cohort", "Lincoln Unified"]).source_label(),
            "Lincoln Unified"
        );
        assert_eq!(chart_args(&["--all"]).source_label(), "all cohorts");
    }
}
