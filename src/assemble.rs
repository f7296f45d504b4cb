use tracing::{debug, info};

use crate::chart::{
    Annotation, Axis, ChartOutcome, ChartSpec, Config, Font, Layout, Legend, Marker, Mode, Trace,
};
use crate::config::PipelineConfig;
use crate::delta;
use crate::error::Result;
use crate::grouping::group_by_category;
use crate::hover::{hover_trace, interpolate};
use crate::models::{CategoryGroup, GrowthRecord, GrowthSeries, Projection};
use crate::projection::{project, projected_traces};
use crate::series::{
    build_series, format_number, line_trace, marker_traces, point_label_annotations, round_to,
};

pub const UNAVAILABLE_MESSAGE: &str = "Growth data is not available.";
pub const NO_DATA_MESSAGE: &str = "No growth data available";
const Y_AXIS_TITLE: &str = "Weeks of Growth";
const TICK_LABELS: [&str; 3] = ["BOY", "MOY", "EOY"];

struct PlottedCategory<'a> {
    group: &'a CategoryGroup,
    series: GrowthSeries,
    projection: Option<Projection>,
}

impl PlottedCategory<'_> {
    fn final_observed(&self) -> f64 {
        self.series.y.last().copied().unwrap_or(0.0)
    }
}

/// Runs the whole pipeline for one table. Every call builds its own traces,
/// annotations and shapes.
pub fn build_chart(table: Option<&[GrowthRecord]>, config: &PipelineConfig) -> Result<ChartOutcome> {
    let Some(records) = table else {
        info!("growth table absent, emitting unavailable message");
        return Ok(ChartOutcome::Unavailable(UNAVAILABLE_MESSAGE.to_string()));
    };

    let groups = group_by_category(records, &config.palette, config.strict_colors)?;
    let visible: Vec<&CategoryGroup> = groups.iter().filter(|group| group.visible).collect();

    if visible.is_empty() {
        info!(
            rows = records.len(),
            categories = groups.len(),
            "no visible usage category, emitting no-data chart"
        );
        return Ok(ChartOutcome::Chart(no_data_chart(config)));
    }

    let slot = config.slot_width;
    let plotted: Vec<PlottedCategory> = visible
        .into_iter()
        .map(|group| {
            let series = build_series(group, slot);
            let projection = project(&series, slot);
            if projection.is_none() {
                debug!(category = %group.key, points = series.len(), "too few points to project");
            }
            PlottedCategory {
                group,
                series,
                projection,
            }
        })
        .collect();

    let mut traces = Vec::new();
    let mut annotations = Vec::new();
    let mut shapes = Vec::new();

    for category in &plotted {
        let group = category.group;
        let series = &category.series;

        traces.extend(marker_traces(group, series));
        traces.push(line_trace(group, series));
        if let Some(projection) = &category.projection {
            traces.extend(projected_traces(group, projection));
        }

        if let Some(start) = series.first() {
            let end = match &category.projection {
                Some(projection) => projection.end,
                None => series.last().unwrap_or(start),
            };
            traces.push(hover_trace(group, &interpolate(start, end, config.hover_steps)));

            annotations.push(Annotation::at(
                format!("{} weeks", format_number(round_to(end.y, 1))),
                end.x + slot * 0.04,
                end.y,
            ));
        }

        if config.point_labels {
            annotations.extend(point_label_annotations(series, config.point_label_angle));
        }
    }

    if config.include_deltas {
        if let Some((a, b)) = delta_pair(&plotted) {
            debug!(first = %a.group.key, second = %b.group.key, "annotating growth gap");
            if let (Some(pa), Some(pb)) = (&a.projection, &b.projection) {
                let delta = delta::annotate(pa, pb, slot);
                annotations.extend(delta.annotations);
                shapes.extend(delta.shapes);
            }
        }
    }

    let average = average_weeks_between_assessment(&plotted);
    let max_x = plotted
        .iter()
        .map(|category| match &category.projection {
            Some(projection) => projection.end.x,
            None => category.series.x.last().copied().unwrap_or(0.0),
        })
        .fold(2.0 * slot, f64::max);

    info!(
        categories = plotted.len(),
        traces = traces.len(),
        annotations = annotations.len(),
        "assembled growth chart"
    );

    Ok(ChartOutcome::Chart(ChartSpec {
        series: traces,
        layout: Layout {
            title: config.title.clone(),
            xaxis: Axis {
                title: Some(format!(
                    "Average of {} weeks between assessments",
                    format_number(average)
                )),
                fixedrange: true,
                range: Some([-0.1 * slot, max_x + 0.3 * slot]),
                showgrid: Some(false),
                zeroline: Some(false),
                showticklabels: None,
                tickvals: vec![0.0, slot, 2.0 * slot],
                ticktext: TICK_LABELS.iter().map(|t| t.to_string()).collect(),
            },
            yaxis: Axis {
                title: Some(Y_AXIS_TITLE.to_string()),
                fixedrange: true,
                ..Axis::default()
            },
            legend: Legend::default(),
            annotations,
            shapes,
        },
        config: Config::default(),
    }))
}

/// The two projectable categories with the highest final observed growth.
/// Both projections must start on the same slot, otherwise the connectors
/// would join values plotted at different x positions.
fn delta_pair<'p, 'g>(
    plotted: &'p [PlottedCategory<'g>],
) -> Option<(&'p PlottedCategory<'g>, &'p PlottedCategory<'g>)> {
    let mut ranked: Vec<&PlottedCategory> = plotted
        .iter()
        .filter(|category| category.projection.is_some())
        .collect();
    if ranked.len() < 2 {
        return None;
    }
    ranked.sort_by(|a, b| b.final_observed().total_cmp(&a.final_observed()));
    let (first, second) = (ranked[0], ranked[1]);
    let start_x = |category: &PlottedCategory<'g>| category.projection.map(|p| p.start.x);
    if start_x(first) != start_x(second) {
        debug!(
            first = %first.group.key,
            second = %second.group.key,
            "categories end on different slots, skipping growth gap"
        );
        return None;
    }
    Some((first, second))
}

fn average_weeks_between_assessment(plotted: &[PlottedCategory]) -> f64 {
    if plotted.is_empty() {
        return 0.0;
    }
    let sum: f64 = plotted
        .iter()
        .map(|category| category.group.avg_weeks_between_assessment)
        .sum();
    round_to(sum / plotted.len() as f64, 1)
}

/// Placeholder chart: hidden axes, one centered message, and two transparent
/// anchor points so the axes still scale.
pub fn no_data_chart(config: &PipelineConfig) -> ChartSpec {
    let hidden_axis = Axis {
        fixedrange: true,
        range: Some([0.0, 1.0]),
        showgrid: Some(false),
        zeroline: Some(false),
        showticklabels: Some(false),
        ..Axis::default()
    };

    let anchors = Trace::new(Mode::Markers, vec![0.0, 1.0], vec![0.0, 1.0])
        .with_marker(Marker::transparent())
        .skip_hover()
        .hide_legend();

    ChartSpec {
        series: vec![anchors],
        layout: Layout {
            title: config.title.clone(),
            xaxis: hidden_axis.clone(),
            yaxis: hidden_axis,
            legend: Legend::default(),
            annotations: vec![Annotation {
                font: Font::sized(16.0),
                yanchor: "middle".to_string(),
                ..Annotation::on_paper(NO_DATA_MESSAGE, 0.5, 0.5)
            }],
            shapes: Vec::new(),
        },
        config: Config::default(),
    }
}
