use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::chart::{ChartOutcome, ChartSpec};

pub fn chart_json(outcome: &ChartOutcome) -> serde_json::Result<String> {
    match outcome {
        ChartOutcome::Chart(spec) => serde_json::to_string_pretty(spec),
        ChartOutcome::Unavailable(message) => {
            serde_json::to_string_pretty(&json!({ "message": message }))
        }
    }
}

pub fn chart_html(
    spec: &ChartSpec,
    cohort: Option<&str>,
    generated_at: DateTime<Utc>,
) -> serde_json::Result<String> {
    let data = serde_json::to_string(&spec.series)?;
    let layout = serde_json::to_string(&spec.layout)?;
    let config = serde_json::to_string(&spec.config)?;

    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html>");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"utf-8\">");
    let _ = writeln!(output, "<title>{}</title>", escape_html(&spec.layout.title));
    let _ = writeln!(
        output,
        "<script src=\"https://cdn.plot.ly/plotly-2.35.2.min.js\"></script>"
    );
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<div id=\"chart-container\"></div>");
    let _ = writeln!(
        output,
        "<p class=\"chart-footer\">{} · generated {}</p>",
        escape_html(cohort.unwrap_or("all cohorts")),
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output, "<script>");
    let _ = writeln!(
        output,
        "Plotly.newPlot('chart-container', {}, {}, {});",
        script_safe(&data),
        script_safe(&layout),
        script_safe(&config)
    );
    let _ = writeln!(output, "</script>");
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");

    Ok(output)
}

/// Banner shown instead of a chart when no table was supplied.
pub fn unavailable_html(message: &str) -> String {
    format!(
        "<div class=\"chart-message\" role=\"status\">{}</div>\n",
        escape_html(message)
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// Hover templates contain `<extra></extra>`; keep `</` out of the script body.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::no_data_chart;
    use crate::config::PipelineConfig;
    use chrono::TimeZone;

    #[test]
    fn unavailable_outcome_serializes_as_message() {
        let outcome = ChartOutcome::Unavailable("Growth data is not available.".to_string());
        let text = chart_json(&outcome).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["message"], "Growth data is not available.");
    }

    #[test]
    fn chart_json_uses_plotly_top_level_keys() {
        let outcome = ChartOutcome::Chart(no_data_chart(&PipelineConfig::default()));
        let value: serde_json::Value = serde_json::from_str(&chart_json(&outcome).unwrap()).unwrap();
        assert!(value["data"].is_array());
        assert!(value["layout"]["annotations"].is_array());
        assert_eq!(value["config"]["displayModeBar"], false);
    }

    #[test]
    fn html_page_calls_plotly() {
        let spec = no_data_chart(&PipelineConfig::default());
        let at = Utc.with_ymd_and_hms(2026, 2, 3, 14, 5, 0).unwrap();
        let html = chart_html(&spec, Some("Lincoln <Elementary>"), at).unwrap();
        assert!(html.contains("Plotly.newPlot('chart-container'"));
        assert!(html.contains("Lincoln &lt;Elementary&gt;"));
        assert!(html.contains("2026-02-03 14:05 UTC"));
    }

    #[test]
    fn banner_escapes_message() {
        assert_eq!(
            unavailable_html("a < b"),
            "<div class=\"chart-message\" role=\"status\">a &lt; b</div>\n"
        );
    }

    #[test]
    fn script_body_never_closes_early() {
        assert_eq!(script_safe("\"<extra></extra>\""), "\"<extra><\\/extra>\"");
    }
}
