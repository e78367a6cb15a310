// Text renderers - pure functions of a dashboard snapshot
use crate::domain::dashboard::{ConnectionState, DashboardSnapshot};
use crate::domain::status::StatusView;
use crate::domain::telemetry::{ChartData, SeriesData, TelemetryRecord};
use std::fmt::Write;

pub const DASHBOARD_TITLE: &str = "IoT Telemetry Dashboard";
pub const NO_CHART_DATA: &str = "No data available. Waiting for messages...";
pub const NO_MESSAGES: &str = "No messages received yet.";

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", DASHBOARD_TITLE);
    let _ = writeln!(out, "{}", "=".repeat(DASHBOARD_TITLE.len()));
    out.push('\n');
    out.push_str(&render_status_card(&snapshot.status, snapshot.connection));
    out.push('\n');
    out.push_str(&render_topic_subscription(&snapshot.topic, snapshot.subscribe_error.as_deref()));
    out.push('\n');
    out.push_str(&render_chart(&snapshot.chart()));
    out.push('\n');
    out.push_str(&render_message_log(&snapshot.records));
    out
}

pub fn render_connection_indicator(connection: ConnectionState) -> String {
    let dot = if connection.is_connected() { '●' } else { '○' };
    format!("{} {}", dot, connection)
}

pub fn render_status_card(status: &StatusView, connection: ConnectionState) -> String {
    let mut out = String::from("Connection Status\n");

    if status.loading {
        out.push_str("  Loading status...\n");
        return out;
    }
    if let Some(error) = &status.error {
        let _ = writeln!(out, "  {}", error);
        return out;
    }

    let snapshot = status.snapshot.clone().unwrap_or_default();
    let _ = writeln!(
        out,
        "  API Status:    {}",
        snapshot.status.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(
        out,
        "  Current Topic: {}",
        snapshot.iot_topic.as_deref().unwrap_or("None")
    );
    if let Some(clients) = snapshot.connected_clients {
        let _ = writeln!(out, "  Clients:       {}", clients);
    }
    let _ = writeln!(out, "  WebSocket:     {}", render_connection_indicator(connection));
    out
}

pub fn render_topic_subscription(topic: &str, error: Option<&str>) -> String {
    let mut out = String::from("Topic Subscription\n");
    let _ = writeln!(out, "  Topic: {}", topic);
    if let Some(error) = error {
        let _ = writeln!(out, "  {}", error);
    }
    out
}

pub fn render_chart(chart: &ChartData) -> String {
    let mut out = String::from("Sensor Data Chart\n");
    if chart.is_empty() {
        let _ = writeln!(out, "  {}", NO_CHART_DATA);
        return out;
    }

    let width = chart.series.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for series in &chart.series {
        let values: Vec<String> = series.values().iter().map(|v| format!("{:.2}", v)).collect();
        let _ = writeln!(
            out,
            "  {:<width$}  {}  {}",
            series.name,
            sparkline(series),
            values.join(" "),
            width = width
        );
    }
    out
}

/// Newest record first, numbered by arrival position
pub fn render_message_log(records: &[TelemetryRecord]) -> String {
    let mut out = String::from("Message Log\n");
    if records.is_empty() {
        let _ = writeln!(out, "  {}", NO_MESSAGES);
        return out;
    }

    for (index, record) in records.iter().enumerate().rev() {
        let _ = writeln!(
            out,
            "  Device: {}  Message {}  ({})",
            record.device_id.as_deref().unwrap_or_default(),
            index + 1,
            record.received_at.format("%H:%M:%S")
        );
        let pretty = serde_json::to_string_pretty(&record.raw).unwrap_or_else(|_| record.raw.to_string());
        for line in pretty.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

fn sparkline(series: &SeriesData) -> String {
    let values = series.values();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if !span.is_finite() || span <= f64::EPSILON {
                return SPARK_LEVELS[0];
            }
            let level = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}
