//! Named workload templates for common kinds of systems.
//!
//! Each template supplies both a request count and upload metrics, so it is
//! evaluated on the request path with uploads feeding storage. Overriding
//! `requestCount` with 0 switches it to the upload path.

use crate::input::{DauType, GrowthPeriod, RawInput, RequestPeriod};

/// A named [`RawInput`] literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub input: RawInput,
}

/// Names accepted by [`preset`], in display order.
pub const PRESET_NAMES: [&str; 5] = ["social", "video", "photo", "ecommerce", "messaging"];

#[allow(clippy::too_many_arguments)]
fn template(
    total_users: f64,
    dau: f64,
    storage_per_user: f64,
    files_per_day: f64,
    avg_file_size: f64,
    request_count: f64,
    read_write_ratio: &str,
    growth_rate: f64,
) -> RawInput {
    RawInput {
        total_users: Some(total_users),
        dau: Some(dau),
        dau_type: Some(DauType::Absolute),
        storage_per_user: Some(storage_per_user),
        files_per_day: Some(files_per_day),
        avg_file_size: Some(avg_file_size),
        request_count: Some(request_count),
        request_period: Some(RequestPeriod::Day),
        avg_request_size: None,
        read_write_ratio: Some(read_write_ratio.to_string()),
        growth_rate: Some(growth_rate),
        growth_period: Some(GrowthPeriod::Yearly),
    }
}

/// Looks up a template by (case-insensitive) name.
pub fn preset(name: &str) -> Option<Preset> {
    let name = name.trim().to_ascii_lowercase();
    let (name, description, input) = match name.as_str() {
        "social" => (
            "social",
            "Social Media Platform - High read ratio with moderate storage needs",
            template(50_000_000.0, 10_000_000.0, 5.0, 10.0, 200.0, 50.0, "80:20", 15.0),
        ),
        "video" => (
            "video",
            "Video Streaming Service - Very high storage with read-heavy traffic",
            template(10_000_000.0, 2_000_000.0, 50.0, 1.0, 300_000.0, 20.0, "100:1", 20.0),
        ),
        "photo" => (
            "photo",
            "Photo Sharing App - Balanced storage with moderate read/write ratio",
            template(20_000_000.0, 5_000_000.0, 10.0, 5.0, 2000.0, 30.0, "80:20", 25.0),
        ),
        "ecommerce" => (
            "ecommerce",
            "E-commerce Platform - Low storage with very high read ratio",
            template(5_000_000.0, 1_000_000.0, 1.0, 2.0, 500.0, 100.0, "100:1", 30.0),
        ),
        "messaging" => (
            "messaging",
            "Messaging Platform - High message volume with balanced read/write",
            template(30_000_000.0, 15_000_000.0, 2.0, 20.0, 100.0, 200.0, "50:50", 40.0),
        ),
        _ => return None,
    };

    Some(Preset {
        name,
        description,
        input,
    })
}

/// Every template, in [`PRESET_NAMES`] order.
pub fn all() -> Vec<Preset> {
    PRESET_NAMES.iter().filter_map(|name| preset(name)).collect()
}
