//! JSON export of a finished calculation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::MetricsReport;
use crate::input::InputParameters;
use crate::steps::{CalculationStep, calculation_steps};

/// `{timestamp, inputs, metrics, calculations}`, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument<'a> {
    pub timestamp: DateTime<Utc>,
    pub inputs: &'a InputParameters,
    pub metrics: &'a MetricsReport,
    pub calculations: Vec<CalculationStep>,
}

impl<'a> ExportDocument<'a> {
    pub fn new(report: &'a MetricsReport, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            inputs: &report.inputs,
            metrics: report,
            calculations: calculation_steps(report),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Serializes `report` as a pretty-printed export document stamped with the current time.
pub fn export_json(report: &MetricsReport) -> serde_json::Result<String> {
    ExportDocument::new(report, Utc::now()).to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::estimate;
    use crate::input::RawInput;
    use chrono::TimeZone;
    use serde_json::Value;

    #[test]
    fn document_has_all_sections() {
        let raw = RawInput {
            total_users: Some(1_000_000.0),
            dau: Some(25.0),
            dau_type: "percentage".parse().ok(),
            storage_per_user: Some(2.0),
            request_count: Some(10.0),
            read_write_ratio: Some("50:50".into()),
            growth_rate: Some(3.0),
            growth_period: "monthly".parse().ok(),
            ..RawInput::default()
        };
        let report = estimate(&raw).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json = ExportDocument::new(&report, ts).to_json().unwrap();
        let doc: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(doc["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(doc["inputs"]["totalUsers"], 1_000_000);
        assert_eq!(doc["inputs"]["dauType"], "percentage");
        assert_eq!(doc["inputs"]["workload"]["mode"], "requests");
        assert_eq!(doc["inputs"]["readWriteRatio"]["read"], 50);
        assert_eq!(doc["metrics"]["storage"]["actualDau"], 250_000.0);
        assert_eq!(doc["metrics"]["growth"]["monthlyRate"], 0.03);
        assert_eq!(doc["calculations"].as_array().unwrap().len(), 6);
        assert_eq!(doc["calculations"][0]["number"], 1);
    }

    #[test]
    fn current_time_export_parses() {
        let raw = RawInput {
            total_users: Some(10.0),
            dau: Some(10.0),
            storage_per_user: Some(0.0),
            files_per_day: Some(1.0),
            avg_file_size: Some(1.0),
            read_write_ratio: Some("1:4".into()),
            growth_rate: Some(0.0),
            ..RawInput::default()
        };
        let json = export_json(&estimate(&raw).unwrap()).unwrap();
        let doc: Value = serde_json::from_str(&json).unwrap();
        assert!(doc["timestamp"].as_str().is_some());
        assert!(doc["metrics"]["bandwidth"]["total"].as_f64().unwrap() > 0.0);
    }
}
