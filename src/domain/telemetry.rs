// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Numeric sensor fields the chart knows how to plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    Temperature,
    Humidity,
    Pressure,
}

impl SensorField {
    pub const ALL: [SensorField; 3] = [
        SensorField::Temperature,
        SensorField::Humidity,
        SensorField::Pressure,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SensorField::Temperature => "temperature",
            SensorField::Humidity => "humidity",
            SensorField::Pressure => "pressure",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SensorField::Temperature => "Temperature",
            SensorField::Humidity => "Humidity",
            SensorField::Pressure => "Pressure",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SensorField::Temperature => "rgb(255, 99, 132)",
            SensorField::Humidity => "rgb(53, 162, 235)",
            SensorField::Pressure => "rgb(75, 192, 192)",
        }
    }
}

/// Known readings under a record's `data` object. Every field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorReadings {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

impl SensorReadings {
    fn from_data(data: Option<&Value>) -> Self {
        let number = |field: SensorField| {
            data.and_then(|d| d.get(field.key()))
                .and_then(Value::as_f64)
        };

        Self {
            temperature: number(SensorField::Temperature),
            humidity: number(SensorField::Humidity),
            pressure: number(SensorField::Pressure),
        }
    }

    pub fn value(&self, field: SensorField) -> Option<f64> {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::Pressure => self.pressure,
        }
    }

    /// Value used for charting: absent readings plot as zero
    pub fn chart_value(&self, field: SensorField) -> f64 {
        self.value(field).unwrap_or(0.0)
    }
}

/// One record received over the stream.
///
/// The decoded JSON is kept as-is for the message log; `device_id` and
/// `readings` are a typed, partial view over it.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub raw: Value,
    pub device_id: Option<String>,
    pub readings: SensorReadings,
    pub received_at: DateTime<Utc>,
}

impl TelemetryRecord {
    pub fn from_value(raw: Value, received_at: DateTime<Utc>) -> Self {
        let device_id = raw
            .get("device_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let readings = SensorReadings::from_data(raw.get("data"));

        Self {
            raw,
            device_id,
            readings,
            received_at,
        }
    }

    /// Decode a single stream frame
    pub fn parse_frame(frame: &str) -> Result<Self, FrameError> {
        let raw: Value = serde_json::from_str(frame)?;
        Ok(Self::from_value(raw, Utc::now()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: String, value: f64) -> Self {
        Self { label, value }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<ChartPoint>,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<String>, points: Vec<ChartPoint>) -> Self {
        Self {
            id,
            name,
            color,
            points,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn new(id: String, title: String, series: Vec<SeriesData>) -> Self {
        Self { id, title, series }
    }

    /// One series per known sensor field, one point per record in arrival order
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TelemetryRecord>,
        I::IntoIter: Clone,
    {
        let records = records.into_iter();

        let series = SensorField::ALL
            .iter()
            .map(|&field| {
                let points = records
                    .clone()
                    .enumerate()
                    .map(|(index, record)| {
                        ChartPoint::new((index + 1).to_string(), record.readings.chart_value(field))
                    })
                    .collect();

                SeriesData::new(
                    field.key().to_string(),
                    field.label().to_string(),
                    Some(field.color().to_string()),
                    points,
                )
            })
            .collect();

        Self::new("sensors".to_string(), "IoT Sensor Data".to_string(), series)
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    #[cfg(test)]
    pub fn series(&self, id: &str) -> Option<&SeriesData> {
        self.series.iter().find(|s| s.id == id)
    }
}
