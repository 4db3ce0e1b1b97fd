#![doc = include_str!("../README.md")]

pub mod engine;
pub mod error;
pub mod export;
pub mod input;
pub mod presets;
pub mod steps;
pub mod units;

pub use engine::{
    BandwidthMetrics, GrowthPoint, GrowthProjection, MetricsReport, RequestMetrics,
    StorageMetrics, actual_dau, bandwidth, estimate, growth, monthly_rate, report, requests,
    storage,
};
pub use error::{ParseError, ValidationError};
pub use export::{ExportDocument, export_json};
pub use input::{
    DauType, GrowthPeriod, InputParameters, RawInput, ReadWriteRatio, RequestPeriod, Workload,
    validate,
};
pub use steps::{CalculationStep, calculation_steps};
