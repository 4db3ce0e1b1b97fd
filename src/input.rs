//! Workload parameters: the raw record collected from a form, file or command
//! line, and the validated [`InputParameters`] the engine runs on.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::engine::{self, projects_finite};
use crate::error::{ParseError, ValidationError};
use crate::units::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

/// How the `dau` field is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DauType {
    /// A head count, capped at `totalUsers`.
    #[default]
    Absolute,
    /// A percentage of `totalUsers`, in `[0, 100]`.
    Percentage,
}

/// The window a per-user request count refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPeriod {
    Second,
    Hour,
    #[default]
    Day,
}

impl RequestPeriod {
    /// Length of the period in seconds.
    pub fn seconds(self) -> f64 {
        match self {
            RequestPeriod::Second => 1.0,
            RequestPeriod::Hour => SECONDS_PER_HOUR,
            RequestPeriod::Day => SECONDS_PER_DAY,
        }
    }
}

/// The period a growth rate compounds over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthPeriod {
    #[default]
    Yearly,
    Monthly,
}

macro_rules! text_enum {
    ($ty:ident, $kind:literal, $( $variant:ident => $text:literal ),+ $(,)?) => {
        impl FromStr for $ty {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $( $text => Ok($ty::$variant), )+
                    _ => Err(ParseError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                        expected: concat!($( $text, " " ),+).trim_ascii_end(),
                    }),
                }
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(match self {
                    $( $ty::$variant => $text, )+
                })
            }
        }
    };
}

text_enum!(DauType, "dau type", Absolute => "absolute", Percentage => "percentage");
text_enum!(RequestPeriod, "request period", Second => "second", Hour => "hour", Day => "day");
text_enum!(GrowthPeriod, "growth period", Yearly => "yearly", Monthly => "monthly");

/// Relative frequency of reads to writes, e.g. `80:20` or `4:1`.
///
/// Both parts are positive integers, so neither can be used as a zero divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadWriteRatio {
    read: u32,
    write: u32,
}

impl ReadWriteRatio {
    /// Ratios offered when traffic is given as a request count per user.
    pub const REQUEST_PRESETS: [(ReadWriteRatio, &'static str); 4] = [
        (ReadWriteRatio { read: 100, write: 1 }, "Read Heavy"),
        (ReadWriteRatio { read: 80, write: 20 }, "Typical Social Media"),
        (ReadWriteRatio { read: 50, write: 50 }, "Balanced"),
        (ReadWriteRatio { read: 20, write: 80 }, "Write Heavy"),
    ];

    /// Ratios offered when traffic is derived from file uploads, read as
    /// "reads per write" or "writes per read".
    pub const FILE_PRESETS: [(ReadWriteRatio, &'static str); 4] = [
        (ReadWriteRatio { read: 100, write: 1 }, "Read Heavy"),
        (ReadWriteRatio { read: 4, write: 1 }, "Read Dominant"),
        (ReadWriteRatio { read: 1, write: 1 }, "Balanced"),
        (ReadWriteRatio { read: 1, write: 4 }, "Write Dominant"),
    ];

    /// Returns `None` unless both parts are positive.
    pub fn new(read: u32, write: u32) -> Option<Self> {
        (read > 0 && write > 0).then_some(Self { read, write })
    }

    pub fn read(&self) -> u32 {
        self.read
    }

    pub fn write(&self) -> u32 {
        self.write
    }

    /// Share of all operations that are reads, `r / (r + w)`.
    pub fn read_fraction(&self) -> f64 {
        self.read as f64 / (self.read as f64 + self.write as f64)
    }

    /// Share of all operations that are writes, `w / (r + w)`.
    pub fn write_fraction(&self) -> f64 {
        self.write as f64 / (self.read as f64 + self.write as f64)
    }
}

impl FromStr for ReadWriteRatio {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::Ratio(s.to_string());
        let (read, write) = s.trim().split_once(':').ok_or_else(invalid)?;
        let read = read.trim().parse::<u32>().map_err(|_| invalid())?;
        let write = write.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(read, write).ok_or_else(invalid)
    }
}

impl Display for ReadWriteRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.read, self.write)
    }
}

/// Unvalidated workload parameters as collected from the outside world.
///
/// Every field is optional so records can be layered (preset, file, flags).
/// Numeric fields accept JSON numbers or numeric strings; an empty string
/// counts as "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInput {
    #[serde(deserialize_with = "lenient_number")]
    pub total_users: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub dau: Option<f64>,
    pub dau_type: Option<DauType>,
    /// Allocated storage per user, in GB.
    #[serde(deserialize_with = "lenient_number")]
    pub storage_per_user: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub files_per_day: Option<f64>,
    /// Average uploaded file size, in KB.
    #[serde(deserialize_with = "lenient_number")]
    pub avg_file_size: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub request_count: Option<f64>,
    pub request_period: Option<RequestPeriod>,
    /// Average request/response payload, in KB.
    #[serde(deserialize_with = "lenient_number")]
    pub avg_request_size: Option<f64>,
    pub read_write_ratio: Option<String>,
    /// Growth in percent per `growth_period`.
    #[serde(deserialize_with = "lenient_number")]
    pub growth_rate: Option<f64>,
    pub growth_period: Option<GrowthPeriod>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        None => None,
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => None,
        // Unparseable text is kept as NaN so validation names the field.
        Some(NumberOrText::Text(s)) => Some(s.trim().parse().unwrap_or(f64::NAN)),
    })
}

impl RawInput {
    /// Returns `self` with every field that `other` supplies replaced by `other`'s value.
    pub fn overlay(self, other: RawInput) -> RawInput {
        RawInput {
            total_users: other.total_users.or(self.total_users),
            dau: other.dau.or(self.dau),
            dau_type: other.dau_type.or(self.dau_type),
            storage_per_user: other.storage_per_user.or(self.storage_per_user),
            files_per_day: other.files_per_day.or(self.files_per_day),
            avg_file_size: other.avg_file_size.or(self.avg_file_size),
            request_count: other.request_count.or(self.request_count),
            request_period: other.request_period.or(self.request_period),
            avg_request_size: other.avg_request_size.or(self.avg_request_size),
            read_write_ratio: other.read_write_ratio.or(self.read_write_ratio),
            growth_rate: other.growth_rate.or(self.growth_rate),
            growth_period: other.growth_period.or(self.growth_period),
        }
    }
}

/// File upload activity of an average active user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProfile {
    pub files_per_day: f64,
    /// In KB.
    pub avg_file_size: f64,
}

/// Request volume of an average active user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRate {
    pub count: f64,
    pub period: RequestPeriod,
}

/// Which signal supplies request volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Workload {
    /// Volume comes from an explicit request count. Upload metrics, when also
    /// supplied, only contribute to storage.
    Requests {
        rate: RequestRate,
        uploads: Option<UploadProfile>,
    },
    /// Volume is derived from upload events.
    Files { uploads: UploadProfile },
}

/// A validated, immutable set of workload parameters.
///
/// The only way to obtain one is [`validate`], so every value reaching the
/// engine satisfies the validator's rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParameters {
    total_users: u64,
    dau: f64,
    dau_type: DauType,
    storage_per_user: f64,
    workload: Workload,
    avg_request_size: Option<f64>,
    read_write_ratio: ReadWriteRatio,
    growth_rate: f64,
    growth_period: GrowthPeriod,
}

impl InputParameters {
    pub fn total_users(&self) -> u64 {
        self.total_users
    }

    pub fn dau(&self) -> f64 {
        self.dau
    }

    pub fn dau_type(&self) -> DauType {
        self.dau_type
    }

    /// In GB.
    pub fn storage_per_user(&self) -> f64 {
        self.storage_per_user
    }

    pub fn workload(&self) -> &Workload {
        &self.workload
    }

    /// Upload metrics, whichever path supplies request volume.
    pub fn uploads(&self) -> Option<&UploadProfile> {
        match &self.workload {
            Workload::Requests { uploads, .. } => uploads.as_ref(),
            Workload::Files { uploads } => Some(uploads),
        }
    }

    /// In KB; `None` when not supplied.
    pub fn avg_request_size(&self) -> Option<f64> {
        self.avg_request_size
    }

    pub fn read_write_ratio(&self) -> ReadWriteRatio {
        self.read_write_ratio
    }

    /// As supplied, in percent; the engine clamps it.
    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    pub fn growth_period(&self) -> GrowthPeriod {
        self.growth_period
    }
}

/// Largest user count an `f64` still represents exactly, `2^53`.
pub const MAX_TOTAL_USERS: f64 = 9_007_199_254_740_992.0;

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Resolves the file upload pair, which must be supplied together.
fn upload_profile(raw: &RawInput) -> Result<Option<UploadProfile>, ValidationError> {
    match (raw.files_per_day, raw.avg_file_size) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ValidationError::MissingPairedField("avgFileSize")),
        (None, Some(_)) => Err(ValidationError::MissingPairedField("filesPerDay")),
        (Some(_), Some(_)) => {
            let files_per_day = positive(raw.files_per_day)
                .ok_or(ValidationError::MissingOrInvalid("filesPerDay"))?;
            let avg_file_size = positive(raw.avg_file_size)
                .ok_or(ValidationError::MissingOrInvalid("avgFileSize"))?;
            Ok(Some(UploadProfile {
                files_per_day,
                avg_file_size,
            }))
        }
    }
}

/// Rejects parameters whose derived figures overflow `f64` somewhere in the
/// report, up to the last projected month.
fn check_magnitudes(params: &InputParameters) -> Result<(), ValidationError> {
    let storage = engine::storage(params);
    if !storage.total_allocated.is_finite() {
        return Err(ValidationError::MissingOrInvalid("storagePerUser"));
    }
    // yearly volume bounds the monthly storage seed
    if !projects_finite(params, storage.yearly()) {
        return Err(ValidationError::MissingOrInvalid("filesPerDay"));
    }

    let count_field = match params.workload() {
        Workload::Requests { .. } => "requestCount",
        Workload::Files { .. } => "filesPerDay",
    };
    let requests = engine::requests(params);
    if !requests.total_rps.is_finite() {
        return Err(ValidationError::MissingOrInvalid(count_field));
    }

    let bandwidth = engine::bandwidth(params, &requests);
    if !projects_finite(params, bandwidth.daily_transfer()) {
        let size_field = match (params.avg_request_size(), params.workload()) {
            (Some(_), _) => "avgRequestSize",
            (None, Workload::Files { .. }) => "avgFileSize",
            (None, Workload::Requests { .. }) => "requestCount",
        };
        return Err(ValidationError::MissingOrInvalid(size_field));
    }
    Ok(())
}

/// Checks a raw record and produces the engine's input.
///
/// Rules are evaluated in order and the first failure is returned:
///
/// 1. `totalUsers` is a positive whole number, at most [`MAX_TOTAL_USERS`].
/// 2. `dau` is a positive number.
/// 3. An absolute `dau` does not exceed `totalUsers`.
/// 4. A percentage `dau` does not exceed 100.
/// 5. A workload signal exists: a positive `requestCount`, or else both
///    `filesPerDay` and `avgFileSize`, positive.
/// 6. `storagePerUser` is a non-negative number.
/// 7. `readWriteRatio` is two positive integers, `r:w`.
/// 8. `growthRate` is a number.
/// 9. `avgRequestSize`, if supplied, is non-negative (zero means "not supplied").
/// 10. Storage, throughput and bandwidth stay finite through the whole growth
///     projection; the field driving an overflow is reported.
///
/// # Examples
///
/// ```
/// use capacity_planner::{validate, RawInput, ValidationError};
///
/// let raw = RawInput {
///     total_users: Some(100.0),
///     dau: Some(150.0),
///     ..RawInput::default()
/// };
/// assert!(matches!(validate(&raw), Err(ValidationError::LogicalConflict(_))));
/// ```
pub fn validate(raw: &RawInput) -> Result<InputParameters, ValidationError> {
    let total_users = positive(raw.total_users)
        .filter(|v| v.fract() == 0.0 && *v <= MAX_TOTAL_USERS)
        .ok_or(ValidationError::MissingOrInvalid("totalUsers"))?;
    let dau = positive(raw.dau).ok_or(ValidationError::MissingOrInvalid("dau"))?;
    let dau_type = raw.dau_type.unwrap_or_default();

    match dau_type {
        DauType::Absolute if dau > total_users => {
            return Err(ValidationError::LogicalConflict("dau exceeds totalUsers"));
        }
        DauType::Percentage if dau > 100.0 => {
            return Err(ValidationError::LogicalConflict(
                "dau percentage exceeds 100",
            ));
        }
        _ => {}
    }

    let request_rate = match raw.request_count {
        Some(count) if !count.is_finite() || count < 0.0 => {
            return Err(ValidationError::MissingOrInvalid("requestCount"));
        }
        Some(count) if count > 0.0 => Some(RequestRate {
            count,
            period: raw.request_period.unwrap_or_default(),
        }),
        _ => None,
    };

    let workload = match request_rate {
        // Incomplete upload metrics never block the request path.
        Some(rate) => Workload::Requests {
            rate,
            uploads: upload_profile(raw).ok().flatten(),
        },
        None => match upload_profile(raw)? {
            Some(uploads) => Workload::Files { uploads },
            None => return Err(ValidationError::MissingWorkloadSignal),
        },
    };

    let storage_per_user = raw
        .storage_per_user
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or(ValidationError::MissingOrInvalid("storagePerUser"))?;

    let read_write_ratio = raw
        .read_write_ratio
        .as_deref()
        .and_then(|s| s.parse::<ReadWriteRatio>().ok())
        .ok_or(ValidationError::MissingOrInvalid("readWriteRatio"))?;

    let growth_rate = raw
        .growth_rate
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::MissingOrInvalid("growthRate"))?;

    let avg_request_size = match raw.avg_request_size {
        Some(size) if !size.is_finite() || size < 0.0 => {
            return Err(ValidationError::MissingOrInvalid("avgRequestSize"));
        }
        size => positive(size),
    };

    let params = InputParameters {
        total_users: total_users as u64,
        dau,
        dau_type,
        storage_per_user,
        workload,
        avg_request_size,
        read_write_ratio,
        growth_rate,
        growth_period: raw.growth_period.unwrap_or_default(),
    };
    check_magnitudes(&params)?;
    debug!(?params, "inputs validated");
    Ok(params)
}
