use std::fmt::{Display, Formatter, Result as FmtResult};
use std::iter::successors;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ValidationError;
use crate::input::{DauType, GrowthPeriod, InputParameters, RawInput, Workload, validate};
use crate::units::{
    KB, SECONDS_PER_DAY, SizeUnit, format_fill_time, format_number, format_percentage,
    format_rate, format_size, to_bytes,
};

/// Write payload assumed when no request size is supplied, in KB.
pub const DEFAULT_WRITE_SIZE_KB: f64 = 1.0;
/// Read payload assumed when no request size is supplied, in KB.
pub const DEFAULT_READ_SIZE_KB: f64 = 2.0;

/// Length of the growth projection in months (5 years).
pub const PROJECTION_MONTHS: usize = 60;
/// Days in a projection month.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Upper bound for a yearly growth rate, in percent.
pub const MAX_YEARLY_GROWTH: f64 = 1000.0;
/// Upper bound for a monthly growth rate, in percent.
pub const MAX_MONTHLY_GROWTH: f64 = 100.0;

/// Storage footprint, all values in bytes except `actual_dau`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageMetrics {
    /// Upload volume of one active user per day.
    ///
    /// Formula: `filesPerDay * avgFileSize * 1024`
    pub daily_per_user: f64,

    /// Upload volume of all active users per day.
    ///
    /// Formula: `actual_dau * daily_per_user`
    pub total_daily: f64,

    /// Storage allocated to the whole user base.
    ///
    /// Formula: `totalUsers * storagePerUser * 2^30`
    pub total_allocated: f64,

    /// Number of active users the other figures are based on.
    pub actual_dau: f64,
}

impl StorageMetrics {
    /// Upload volume over a 30-day month.
    pub fn monthly(&self) -> f64 {
        self.total_daily * DAYS_PER_MONTH
    }

    /// Upload volume over a 365-day year.
    pub fn yearly(&self) -> f64 {
        self.total_daily * 365.0
    }

    /// Days until daily uploads add up to the allocated storage.
    ///
    /// `None` when nothing is uploaded or nothing is allocated.
    pub fn days_to_fill(&self) -> Option<f64> {
        (self.total_daily > 0.0 && self.total_allocated > 0.0)
            .then(|| self.total_allocated / self.total_daily)
            .filter(|days| days.is_finite())
    }
}

/// Request throughput in requests per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetrics {
    pub total_rps: f64,
    pub read_rps: f64,
    pub write_rps: f64,
    /// Read part of the ratio, as supplied.
    pub read_ratio: u32,
    /// Write part of the ratio, as supplied.
    pub write_ratio: u32,
}

/// Network throughput in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandwidthMetrics {
    /// Formula: `write_rps * write_size`
    pub inbound: f64,
    /// Formula: `read_rps * read_size`
    pub outbound: f64,
    pub total: f64,
    /// Payload of one write, in bytes.
    pub write_size: f64,
    /// Payload of one read, in bytes.
    pub read_size: f64,
}

impl BandwidthMetrics {
    /// Bytes transferred over a full day at the current rate.
    pub fn daily_transfer(&self) -> f64 {
        self.total * SECONDS_PER_DAY
    }
}

/// One month of a [`GrowthProjection`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub month: usize,
    pub storage: f64,
    pub users: f64,
    pub bandwidth: f64,
}

/// Monthly compound growth over [`PROJECTION_MONTHS`] months.
///
/// Each series holds `PROJECTION_MONTHS + 1` points, month 0 being the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthProjection {
    /// Effective monthly growth as a fraction, e.g. `0.0117`.
    pub monthly_rate: f64,
    /// Monthly upload volume in bytes.
    pub storage: Vec<f64>,
    pub users: Vec<f64>,
    /// Total bandwidth in bytes per second.
    pub bandwidth: Vec<f64>,
}

impl GrowthProjection {
    pub fn at(&self, month: usize) -> Option<GrowthPoint> {
        Some(GrowthPoint {
            month,
            storage: *self.storage.get(month)?,
            users: *self.users.get(month)?,
            bandwidth: *self.bandwidth.get(month)?,
        })
    }

    pub fn points(&self) -> impl Iterator<Item = GrowthPoint> + '_ {
        (0..self.storage.len()).filter_map(|month| self.at(month))
    }
}

/// The complete result of one calculation.
///
/// A snapshot: it is built once from an [`InputParameters`] and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub storage: StorageMetrics,
    pub requests: RequestMetrics,
    pub bandwidth: BandwidthMetrics,
    pub growth: GrowthProjection,

    // --- Inputs echoed for reporting ---
    #[serde(skip)]
    pub inputs: InputParameters,
}

impl MetricsReport {
    /// Active users as a fraction of the whole user base.
    pub fn dau_share(&self) -> f64 {
        self.storage.actual_dau / self.inputs.total_users() as f64
    }
}

/// Number of users active on a given day.
///
/// An absolute count is capped at `totalUsers`; a percentage is rounded down.
pub fn actual_dau(inputs: &InputParameters) -> f64 {
    let total_users = inputs.total_users() as f64;
    match inputs.dau_type() {
        DauType::Absolute => inputs.dau().min(total_users),
        DauType::Percentage => (total_users * inputs.dau() / 100.0).floor(),
    }
}

/// Derives the storage footprint.
///
/// Without upload metrics the daily figures are zero; the allocation only
/// depends on the user base.
pub fn storage(inputs: &InputParameters) -> StorageMetrics {
    let actual_dau = actual_dau(inputs);

    let daily_per_user = inputs
        .uploads()
        .map(|u| u.files_per_day * to_bytes(u.avg_file_size, SizeUnit::KB))
        .unwrap_or(0.0);

    let total_daily = actual_dau * daily_per_user;

    let total_allocated =
        inputs.total_users() as f64 * to_bytes(inputs.storage_per_user(), SizeUnit::GB);

    let metrics = StorageMetrics {
        daily_per_user,
        total_daily,
        total_allocated,
        actual_dau,
    };
    debug!(?metrics, "storage derived");
    metrics
}

/// Derives request throughput from whichever signal supplies volume.
///
/// With a request count the per-user count is scaled to per-second and split
/// by `r / (r + w)`. With uploads every upload is a write and reads follow
/// the ratio: multiplied by `r / w` when `r >= w`, divided by `w / r` otherwise,
/// so `100:1` and `1:4` style ratios both keep `read / write == r / w`.
pub fn requests(inputs: &InputParameters) -> RequestMetrics {
    let ratio = inputs.read_write_ratio();
    let actual_dau = actual_dau(inputs);

    let (read_rps, write_rps) = if actual_dau <= 0.0 {
        (0.0, 0.0)
    } else {
        match inputs.workload() {
            Workload::Requests { rate, .. } => {
                let total = rate.count * actual_dau / rate.period.seconds();
                (
                    total * ratio.read_fraction(),
                    total * ratio.write_fraction(),
                )
            }
            Workload::Files { uploads } => {
                let write_rps = actual_dau * uploads.files_per_day / SECONDS_PER_DAY;
                let (read_part, write_part) = (ratio.read() as f64, ratio.write() as f64);
                let read_rps = if read_part >= write_part {
                    write_rps * (read_part / write_part)
                } else {
                    write_rps / (write_part / read_part)
                };
                (read_rps, write_rps)
            }
        }
    };

    let metrics = RequestMetrics {
        total_rps: read_rps + write_rps,
        read_rps,
        write_rps,
        read_ratio: ratio.read(),
        write_ratio: ratio.write(),
    };
    debug!(?metrics, "requests derived");
    metrics
}

/// Payload sizes `(write, read)` in KB for the active workload.
///
/// Uploads write whole files; reads default to the file size unless a request
/// size is given. A request count uses the request size both ways, falling
/// back to [`DEFAULT_WRITE_SIZE_KB`] and [`DEFAULT_READ_SIZE_KB`].
pub fn payload_sizes(inputs: &InputParameters) -> (f64, f64) {
    let request_size = inputs.avg_request_size();
    match inputs.workload() {
        Workload::Requests { .. } => (
            request_size.unwrap_or(DEFAULT_WRITE_SIZE_KB),
            request_size.unwrap_or(DEFAULT_READ_SIZE_KB),
        ),
        Workload::Files { uploads } => (
            uploads.avg_file_size,
            request_size.unwrap_or(uploads.avg_file_size),
        ),
    }
}

/// Derives bandwidth from request throughput and payload sizes.
pub fn bandwidth(inputs: &InputParameters, requests: &RequestMetrics) -> BandwidthMetrics {
    let (write_kb, read_kb) = payload_sizes(inputs);
    let write_size = write_kb * KB;
    let read_size = read_kb * KB;

    let inbound = requests.write_rps * write_size;
    let outbound = requests.read_rps * read_size;

    let metrics = BandwidthMetrics {
        inbound,
        outbound,
        total: inbound + outbound,
        write_size,
        read_size,
    };
    debug!(?metrics, "bandwidth derived");
    metrics
}

/// Effective monthly growth as a fraction.
///
/// Yearly rates are clamped to `[0, 1000]` percent and converted with
/// `(1 + rate/100)^(1/12) - 1`; monthly rates are clamped to `[0, 100]`.
///
/// ```
/// use capacity_planner::{monthly_rate, validate, RawInput};
///
/// let raw = RawInput {
///     total_users: Some(1000.0),
///     dau: Some(100.0),
///     storage_per_user: Some(1.0),
///     request_count: Some(10.0),
///     read_write_ratio: Some("80:20".into()),
///     growth_rate: Some(12.0),
///     ..RawInput::default()
/// };
/// let rate = monthly_rate(&validate(&raw).unwrap());
/// assert!(((1.0 + rate).powi(12) - 1.12).abs() < 1e-9);
/// ```
pub fn monthly_rate(inputs: &InputParameters) -> f64 {
    let rate = inputs.growth_rate();
    let clamped = clamp_growth(rate, inputs.growth_period());
    if clamped != rate {
        warn!(
            rate,
            clamped,
            period = %inputs.growth_period(),
            "growth rate out of range, clamped"
        );
    }

    as_monthly(clamped, inputs.growth_period())
}

fn clamp_growth(rate: f64, period: GrowthPeriod) -> f64 {
    let max = match period {
        GrowthPeriod::Yearly => MAX_YEARLY_GROWTH,
        GrowthPeriod::Monthly => MAX_MONTHLY_GROWTH,
    };
    rate.clamp(0.0, max)
}

fn as_monthly(percent: f64, period: GrowthPeriod) -> f64 {
    match period {
        GrowthPeriod::Yearly => (1.0 + percent / 100.0).powf(1.0 / 12.0) - 1.0,
        GrowthPeriod::Monthly => percent / 100.0,
    }
}

fn compound(seed: f64, rate: f64) -> Vec<f64> {
    successors(Some(seed), |v| Some(v * (1.0 + rate)))
        .take(PROJECTION_MONTHS + 1)
        .collect()
}

/// Whether `seed` stays finite through the last month of the projection.
///
/// Rates never go negative after clamping, so the series is non-decreasing
/// and only its last point needs checking.
pub(crate) fn projects_finite(inputs: &InputParameters, seed: f64) -> bool {
    let period = inputs.growth_period();
    let rate = as_monthly(clamp_growth(inputs.growth_rate(), period), period);
    compound(seed, rate).last().is_some_and(|v| v.is_finite())
}

/// Projects storage, users and bandwidth month by month.
///
/// Month 0 holds the baselines: monthly upload volume, `totalUsers` and total
/// bandwidth. Every following month grows the previous one by the monthly rate.
pub fn growth(
    inputs: &InputParameters,
    storage: &StorageMetrics,
    bandwidth: &BandwidthMetrics,
) -> GrowthProjection {
    let monthly_rate = monthly_rate(inputs);

    let projection = GrowthProjection {
        monthly_rate,
        storage: compound(storage.monthly(), monthly_rate),
        users: compound(inputs.total_users() as f64, monthly_rate),
        bandwidth: compound(bandwidth.total, monthly_rate),
    };
    debug!(
        monthly_rate,
        months = PROJECTION_MONTHS,
        "growth projected"
    );
    projection
}

/// Runs every sub-model in dependency order and assembles the report.
pub fn report(inputs: &InputParameters) -> MetricsReport {
    let storage = storage(inputs);
    let requests = requests(inputs);
    let bandwidth = bandwidth(inputs, &requests);
    let growth = growth(inputs, &storage, &bandwidth);

    info!(
        actual_dau = storage.actual_dau,
        total_rps = requests.total_rps,
        total_bandwidth = bandwidth.total,
        "metrics report assembled"
    );

    MetricsReport {
        storage,
        requests,
        bandwidth,
        growth,
        inputs: inputs.clone(),
    }
}

/// Validates a raw record and derives its metrics report.
///
/// # Errors
///
/// Returns the first [`ValidationError`] the record violates; see [`validate`].
///
/// # Examples
///
/// ```
/// use capacity_planner::{estimate, RawInput};
///
/// let raw = RawInput {
///     total_users: Some(50_000_000.0),
///     dau: Some(10_000_000.0),
///     storage_per_user: Some(5.0),
///     request_count: Some(50.0),
///     read_write_ratio: Some("80:20".into()),
///     growth_rate: Some(15.0),
///     ..RawInput::default()
/// };
/// let report = estimate(&raw).unwrap();
///
/// assert!((report.requests.total_rps - 5787.04).abs() < 0.01);
/// assert_eq!(report.growth.storage.len(), 61);
/// ```
pub fn estimate(raw: &RawInput) -> Result<MetricsReport, ValidationError> {
    validate(raw).map(|inputs| report(&inputs))
}

fn describe_workload(inputs: &InputParameters) -> String {
    match inputs.workload() {
        Workload::Requests { rate, .. } => format!(
            "{} requests/{} per active user",
            format_number(rate.count, 0),
            rate.period
        ),
        Workload::Files { uploads } => format!(
            "{} files/day of {} per active user",
            format_number(uploads.files_per_day, 0),
            format_size(uploads.avg_file_size * KB)
        ),
    }
}

impl Display for MetricsReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let inputs = &self.inputs;

        writeln!(f, "=== System Capacity Estimate ===")?;
        writeln!(
            f,
            "Total users: {}",
            format_number(inputs.total_users() as f64, 0)
        )?;
        writeln!(
            f,
            "Daily active users: {} ({} of total users)",
            format_number(self.storage.actual_dau, 0),
            format_percentage(self.dau_share(), 2)
        )?;
        writeln!(f, "Workload: {}", describe_workload(inputs))?;
        writeln!(f, "Read/write ratio: {}", inputs.read_write_ratio())?;
        writeln!(
            f,
            "Growth: {}% {} ({} monthly)",
            format_number(inputs.growth_rate(), 2),
            inputs.growth_period(),
            format_percentage(self.growth.monthly_rate, 2)
        )?;
        writeln!(f)?;

        writeln!(f, "Storage")?;
        writeln!(
            f,
            "  Per active user per day:  {}",
            format_size(self.storage.daily_per_user)
        )?;
        writeln!(
            f,
            "  Daily generation:         {}",
            format_size(self.storage.total_daily)
        )?;
        writeln!(
            f,
            "  Monthly generation:       {}",
            format_size(self.storage.monthly())
        )?;
        writeln!(
            f,
            "  Yearly generation:        {}",
            format_size(self.storage.yearly())
        )?;
        writeln!(
            f,
            "  Total allocated:          {}",
            format_size(self.storage.total_allocated)
        )?;
        writeln!(
            f,
            "  Time to fill allocation:  {}",
            self.storage
                .days_to_fill()
                .map_or_else(|| "N/A".to_string(), format_fill_time)
        )?;
        writeln!(f)?;

        writeln!(f, "Requests")?;
        writeln!(
            f,
            "  Total:                    {} req/s",
            format_number(self.requests.total_rps, 2)
        )?;
        writeln!(
            f,
            "  Reads:                    {} req/s",
            format_number(self.requests.read_rps, 2)
        )?;
        writeln!(
            f,
            "  Writes:                   {} req/s",
            format_number(self.requests.write_rps, 2)
        )?;
        writeln!(f)?;

        writeln!(f, "Bandwidth")?;
        writeln!(
            f,
            "  Inbound:                  {} ({} per write)",
            format_rate(self.bandwidth.inbound),
            format_size(self.bandwidth.write_size)
        )?;
        writeln!(
            f,
            "  Outbound:                 {} ({} per read)",
            format_rate(self.bandwidth.outbound),
            format_size(self.bandwidth.read_size)
        )?;
        writeln!(
            f,
            "  Total:                    {}",
            format_rate(self.bandwidth.total)
        )?;
        writeln!(
            f,
            "  Daily transfer:           {}",
            format_size(self.bandwidth.daily_transfer())
        )?;
        writeln!(f)?;

        writeln!(f, "Growth projection")?;
        for (label, month) in [("1 year: ", 12), ("5 years:", PROJECTION_MONTHS)] {
            if let Some(p) = self.growth.at(month) {
                writeln!(
                    f,
                    "  {} storage {}/month, {} users, {}",
                    label,
                    format_size(p.storage),
                    format_number(p.users.round(), 0),
                    format_rate(p.bandwidth)
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{RawInput, RequestPeriod};

    fn social_files() -> RawInput {
        RawInput {
            total_users: Some(50_000_000.0),
            dau: Some(10_000_000.0),
            storage_per_user: Some(5.0),
            files_per_day: Some(10.0),
            avg_file_size: Some(200.0),
            read_write_ratio: Some("80:20".into()),
            growth_rate: Some(15.0),
            ..RawInput::default()
        }
    }

    fn social_requests() -> RawInput {
        RawInput {
            files_per_day: None,
            avg_file_size: None,
            request_count: Some(50.0),
            request_period: Some(RequestPeriod::Day),
            ..social_files()
        }
    }

    fn params(raw: RawInput) -> InputParameters {
        validate(&raw).unwrap()
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * b.abs().max(1.0)
    }

    #[test]
    fn social_storage_numbers_match() {
        let s = storage(&params(social_files()));
        assert_eq!(s.daily_per_user, 2_048_000.0);
        assert_eq!(s.total_daily, 2.048e13);
        assert_eq!(s.total_allocated, 50_000_000.0 * 5.0 * 1_073_741_824.0);
        assert!(close(s.total_allocated, 2.684e17, 1e-3));
        assert_eq!(s.actual_dau, 10_000_000.0);
        assert_eq!(s.monthly(), 2.048e13 * 30.0);
        assert!(close(s.days_to_fill().unwrap(), 13_107.2, 1e-9));
    }

    #[test]
    fn request_mode_has_no_daily_storage() {
        let s = storage(&params(social_requests()));
        assert_eq!(s.daily_per_user, 0.0);
        assert_eq!(s.total_daily, 0.0);
        assert!(s.total_allocated > 0.0);
        assert_eq!(s.days_to_fill(), None);
    }

    #[test]
    fn request_mode_keeps_upload_storage() {
        let raw = RawInput {
            request_count: Some(50.0),
            ..social_files()
        };
        let s = storage(&params(raw));
        assert_eq!(s.daily_per_user, 2_048_000.0);
    }

    #[test]
    fn social_request_rates_match() {
        let r = requests(&params(social_requests()));
        assert!((r.total_rps - 5787.04).abs() < 0.01);
        assert!((r.read_rps - 4629.63).abs() < 0.01);
        assert!((r.write_rps - 1157.41).abs() < 0.01);
        assert_eq!((r.read_ratio, r.write_ratio), (80, 20));
    }

    #[test]
    fn request_period_scaling() {
        let per = |period| {
            let raw = RawInput {
                request_count: Some(2.0),
                request_period: Some(period),
                ..social_requests()
            };
            requests(&params(raw)).total_rps
        };
        assert!(close(per(RequestPeriod::Second), 2.0 * 10_000_000.0, 1e-12));
        assert!(close(per(RequestPeriod::Hour), 2.0 * 10_000_000.0 / 3600.0, 1e-12));
        assert!(close(per(RequestPeriod::Day), 2.0 * 10_000_000.0 / 86_400.0, 1e-12));
    }

    #[test]
    fn file_mode_writes_are_uploads() {
        let r = requests(&params(social_files()));
        assert!(close(r.write_rps, 10_000_000.0 * 10.0 / 86_400.0, 1e-12));
        assert!(close(r.read_rps, r.write_rps * 4.0, 1e-12));
    }

    #[test]
    fn ratio_proportion_holds_both_ways() {
        for ratio in ["100:1", "4:1", "1:1", "1:4", "80:20", "20:80", "3:7"] {
            let (r, w): (f64, f64) = {
                let (a, b) = ratio.split_once(':').unwrap();
                (a.parse().unwrap(), b.parse().unwrap())
            };
            for raw in [social_files(), social_requests()] {
                let raw = RawInput {
                    read_write_ratio: Some(ratio.into()),
                    ..raw
                };
                let m = requests(&params(raw));
                assert!(close(m.read_rps / m.write_rps, r / w, 1e-12), "{ratio}");
                assert!(close(m.read_rps + m.write_rps, m.total_rps, 1e-12));
            }
        }
    }

    #[test]
    fn percentage_dau_rounds_down() {
        let raw = RawInput {
            total_users: Some(999.0),
            dau: Some(33.3),
            dau_type: Some(DauType::Percentage),
            ..social_files()
        };
        assert_eq!(actual_dau(&params(raw)), 332.0);
    }

    #[test]
    fn zero_active_users_yield_zeros() {
        let raw = RawInput {
            total_users: Some(10.0),
            dau: Some(5.0),
            dau_type: Some(DauType::Percentage),
            ..social_requests()
        };
        let report = report(&params(raw));
        assert_eq!(report.storage.actual_dau, 0.0);
        assert_eq!(report.requests.total_rps, 0.0);
        assert_eq!(report.bandwidth.total, 0.0);
        assert!(report.growth.bandwidth.iter().all(|v| *v == 0.0));
        assert!(report.growth.users.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn request_mode_bandwidth_uses_defaults_or_request_size() {
        let inputs = params(social_requests());
        let r = requests(&inputs);
        let b = bandwidth(&inputs, &r);
        assert_eq!(b.write_size, 1024.0);
        assert_eq!(b.read_size, 2048.0);
        assert!(close(b.inbound, r.write_rps * 1024.0, 1e-12));
        assert!(close(b.outbound, r.read_rps * 2048.0, 1e-12));
        assert_eq!(b.total, b.inbound + b.outbound);

        let inputs = params(RawInput {
            avg_request_size: Some(4.0),
            ..social_requests()
        });
        let b = bandwidth(&inputs, &requests(&inputs));
        assert_eq!((b.write_size, b.read_size), (4096.0, 4096.0));
    }

    #[test]
    fn file_mode_bandwidth_uses_file_size() {
        let inputs = params(social_files());
        let b = bandwidth(&inputs, &requests(&inputs));
        assert_eq!(b.write_size, 200.0 * 1024.0);
        assert_eq!(b.read_size, 200.0 * 1024.0);

        let inputs = params(RawInput {
            avg_request_size: Some(50.0),
            ..social_files()
        });
        let b = bandwidth(&inputs, &requests(&inputs));
        assert_eq!(b.write_size, 200.0 * 1024.0);
        assert_eq!(b.read_size, 50.0 * 1024.0);
        assert!(close(b.daily_transfer(), b.total * 86_400.0, 1e-12));
    }

    #[test]
    fn yearly_rate_compounds_back() {
        let inputs = params(RawInput {
            growth_rate: Some(12.0),
            ..social_files()
        });
        let rate = monthly_rate(&inputs);
        assert!(((1.0 + rate).powi(12) - 1.12).abs() < 1e-9);
    }

    #[test]
    fn rates_are_clamped() {
        let rate = |growth, period| {
            monthly_rate(&params(RawInput {
                growth_rate: Some(growth),
                growth_period: Some(period),
                ..social_files()
            }))
        };
        assert_eq!(rate(-20.0, GrowthPeriod::Yearly), 0.0);
        assert_eq!(rate(-20.0, GrowthPeriod::Monthly), 0.0);
        assert_eq!(rate(250.0, GrowthPeriod::Monthly), 1.0);
        assert!(close(
            rate(5000.0, GrowthPeriod::Yearly),
            11f64.powf(1.0 / 12.0) - 1.0,
            1e-12
        ));
        assert_eq!(rate(5.0, GrowthPeriod::Monthly), 0.05);
    }

    #[test]
    fn projection_compounds_from_previous_month() {
        let inputs = params(social_files());
        let s = storage(&inputs);
        let b = bandwidth(&inputs, &requests(&inputs));
        let g = growth(&inputs, &s, &b);

        assert_eq!(g.storage.len(), PROJECTION_MONTHS + 1);
        assert_eq!(g.users.len(), PROJECTION_MONTHS + 1);
        assert_eq!(g.bandwidth.len(), PROJECTION_MONTHS + 1);

        assert_eq!(g.storage[0], s.monthly());
        assert_eq!(g.users[0], 50_000_000.0);
        assert_eq!(g.bandwidth[0], b.total);

        for i in 0..PROJECTION_MONTHS {
            assert_eq!(g.storage[i + 1], g.storage[i] * (1.0 + g.monthly_rate));
            assert_eq!(g.users[i + 1], g.users[i] * (1.0 + g.monthly_rate));
            assert_eq!(g.bandwidth[i + 1], g.bandwidth[i] * (1.0 + g.monthly_rate));
        }

        assert!(close(g.users[12], 50_000_000.0 * 1.15, 1e-9));
        assert_eq!(g, growth(&inputs, &s, &b));
    }

    #[test]
    fn projection_points() {
        let report = estimate(&social_files()).unwrap();
        let g = &report.growth;
        assert_eq!(g.points().count(), 61);
        let p = g.at(60).unwrap();
        assert_eq!(p.month, 60);
        assert_eq!(p.users, g.users[60]);
        assert!(g.at(61).is_none());
    }

    #[test]
    fn estimate_propagates_validation_errors() {
        let raw = RawInput {
            avg_file_size: None,
            ..social_files()
        };
        assert_eq!(
            estimate(&raw),
            Err(ValidationError::MissingPairedField("avgFileSize"))
        );
    }

    #[test]
    fn report_serializes_without_inputs() {
        let report = estimate(&social_files()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["storage"]["dailyPerUser"], 2_048_000.0);
        assert_eq!(json["requests"]["readRatio"], 80);
        assert_eq!(json["growth"]["users"].as_array().unwrap().len(), 61);
        assert!(json.get("inputs").is_none());
    }

    #[test]
    fn dau_share_follows_dau_type() {
        let report = estimate(&social_files()).unwrap();
        assert!(close(report.dau_share(), 0.2, 1e-12));

        let raw = RawInput {
            total_users: Some(1_000.0),
            dau: Some(12.5),
            dau_type: Some(DauType::Percentage),
            ..social_files()
        };
        let report = estimate(&raw).unwrap();
        assert!(close(report.dau_share(), 0.125, 1e-12));
        assert!(
            report
                .to_string()
                .contains("Daily active users: 125 (12.50% of total users)")
        );
    }

    #[test]
    fn display_renders_all_sections() {
        let text = estimate(&social_files()).unwrap().to_string();
        assert!(text.starts_with("=== System Capacity Estimate ==="));
        assert!(text.contains("Total users: 50,000,000"));
        assert!(text.contains("Daily active users: 10,000,000 (20.00% of total users)"));
        assert!(text.contains("Per active user per day:  1.95 MB"));
        assert!(text.contains("Writes:                   1,157.41 req/s"));
        assert!(text.contains("Read/write ratio: 80:20"));
        assert!(text.contains("5 years:"));
    }
}
