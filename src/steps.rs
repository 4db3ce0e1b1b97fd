//! Human-readable narration of how a [`MetricsReport`] was derived.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use crate::engine::{MetricsReport, PROJECTION_MONTHS, payload_sizes};
use crate::input::Workload;
use crate::units::{KB, format_number, format_percentage, format_rate, format_size};

/// One numbered step of the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationStep {
    pub number: usize,
    pub description: String,
    pub formula: String,
    pub result: String,
}

impl Display for CalculationStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Step {}: {}", self.number, self.description)?;
        for line in self.formula.lines() {
            writeln!(f, "    {line}")?;
        }
        write!(f, "  Result: {}", self.result.replace('\n', ", "))
    }
}

struct Narrator {
    steps: Vec<CalculationStep>,
}

impl Narrator {
    fn add(&mut self, description: &str, formula: String, result: String) {
        self.steps.push(CalculationStep {
            number: self.steps.len() + 1,
            description: description.to_string(),
            formula,
            result,
        });
    }
}

/// Narrates every derivation in `report`, in the order the engine performs them.
pub fn calculation_steps(report: &MetricsReport) -> Vec<CalculationStep> {
    let inputs = &report.inputs;
    let storage = &report.storage;
    let requests = &report.requests;
    let bandwidth = &report.bandwidth;
    let growth = &report.growth;
    let dau = format_number(storage.actual_dau, 0);

    let mut n = Narrator { steps: Vec::new() };

    match inputs.uploads() {
        Some(u) => n.add(
            "Calculate daily storage generation per user",
            format!(
                "{} files/day × {} KB × 1024 = {}",
                format_number(u.files_per_day, 2),
                format_number(u.avg_file_size, 2),
                format_size(storage.daily_per_user)
            ),
            format!("Daily storage per user: {}", format_size(storage.daily_per_user)),
        ),
        None => n.add(
            "Calculate daily storage generation per user",
            "No file upload metrics supplied".to_string(),
            "Daily storage per user: 0 B".to_string(),
        ),
    }

    n.add(
        "Calculate total daily storage generation",
        format!(
            "{} active users × {} = {}",
            dau,
            format_size(storage.daily_per_user),
            format_size(storage.total_daily)
        ),
        format!("Total daily storage: {}", format_size(storage.total_daily)),
    );

    n.add(
        "Calculate total allocated storage",
        format!(
            "{} users × {} GB = {}",
            format_number(inputs.total_users() as f64, 0),
            format_number(inputs.storage_per_user(), 2),
            format_size(storage.total_allocated)
        ),
        format!("Total allocated storage: {}", format_size(storage.total_allocated)),
    );

    let volume = match inputs.workload() {
        Workload::Requests { rate, .. } => format!(
            "{} active users × {} requests / {} s",
            dau,
            format_number(rate.count, 2),
            format_number(rate.period.seconds(), 0)
        ),
        Workload::Files { uploads } => format!(
            "Writes: {} active users × {} files / 86,400 s",
            dau,
            format_number(uploads.files_per_day, 2)
        ),
    };
    n.add(
        "Calculate requests per second",
        format!("{volume}\nRead/Write Ratio: {}", inputs.read_write_ratio()),
        format!(
            "Read RPS: {}\nWrite RPS: {}",
            format_number(requests.read_rps, 2),
            format_number(requests.write_rps, 2)
        ),
    );

    let (write_kb, read_kb) = payload_sizes(inputs);
    n.add(
        "Calculate bandwidth requirements",
        format!(
            "Inbound: {} write RPS × {}\nOutbound: {} read RPS × {}",
            format_number(requests.write_rps, 2),
            format_size(write_kb * KB),
            format_number(requests.read_rps, 2),
            format_size(read_kb * KB)
        ),
        format!(
            "Inbound: {}\nOutbound: {}",
            format_rate(bandwidth.inbound),
            format_rate(bandwidth.outbound)
        ),
    );

    let horizon = growth.at(PROJECTION_MONTHS);
    n.add(
        "Calculate growth projections",
        format!(
            "Monthly growth rate: {}",
            format_percentage(growth.monthly_rate, 2)
        ),
        match horizon {
            Some(p) => format!(
                "5-year projection:\nStorage: {}\nUsers: {}\nBandwidth: {}",
                format_size(p.storage),
                format_number(p.users.round(), 0),
                format_rate(p.bandwidth)
            ),
            None => "5-year projection unavailable".to_string(),
        },
    );

    n.steps
}
