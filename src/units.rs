//! Unit conversion and human-readable formatting.
//!
//! Sizes are binary (1 KB = 1024 bytes) throughout, matching how the
//! calculator's inputs are expressed. Every helper is pure.

/// Bytes in one kilobyte (binary).
pub const KB: f64 = 1024.0;
/// Bytes in one gigabyte (binary), `2^30`.
pub const GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

const SIZE_LABELS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Size units accepted by [`to_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    fn multiplier(self) -> f64 {
        match self {
            SizeUnit::B => 1.0,
            SizeUnit::KB => KB,
            SizeUnit::MB => KB * KB,
            SizeUnit::GB => GB,
            SizeUnit::TB => GB * KB,
        }
    }
}

/// Converts `value` expressed in `unit` to bytes.
pub fn to_bytes(value: f64, unit: SizeUnit) -> f64 {
    value * unit.multiplier()
}

/// Formats a byte count with the largest binary unit that keeps the value
/// at or above 1, rounded to two decimals without trailing zeros, e.g.
/// `"1.95 MB"` or `"5 GB"`.
///
/// Zero and negative values render as `"0 B"`; non-finite values keep their
/// own spelling (`"inf B"`) so an overflow never reads as an empty volume.
pub fn format_size(bytes: f64) -> String {
    if !bytes.is_finite() {
        return format!("{bytes} B");
    }
    if bytes <= 0.0 {
        return "0 B".into();
    }

    let mut size = bytes;
    let mut unit = 0;
    while size >= KB && unit < SIZE_LABELS.len() - 1 {
        size /= KB;
        unit += 1;
    }

    let fixed = format_number(size, 2);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_LABELS[unit])
}

/// Formats a byte rate, e.g. `"4.52 MB/s"`.
pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", format_size(bytes_per_sec))
}

/// Formats a number with `,` thousands separators and a fixed number of decimals.
///
/// ```
/// use capacity_planner::units::format_number;
///
/// assert_eq!(format_number(10_000_000.0, 0), "10,000,000");
/// assert_eq!(format_number(5787.037, 2), "5,787.04");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" would be noise
    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Formats a fraction as a percentage, e.g. `0.0117` → `"1.17%"`.
pub fn format_percentage(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

/// Formats a duration in seconds using the largest fitting unit up to days.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.2} seconds")
    } else if seconds < SECONDS_PER_HOUR {
        format!("{:.2} minutes", seconds / 60.0)
    } else if seconds < SECONDS_PER_DAY {
        format!("{:.2} hours", seconds / SECONDS_PER_HOUR)
    } else {
        format!("{:.2} days", seconds / SECONDS_PER_DAY)
    }
}

/// Formats a number of days until some capacity is exhausted.
///
/// Under a month is shown in days, under a year in 30-day months, beyond
/// that in years with one decimal.
pub fn format_fill_time(days: f64) -> String {
    if days < 30.0 {
        format!("{} days", days.round())
    } else if days < 365.0 {
        format!("{} months", (days / 30.0).round())
    } else {
        format!("{:.1} years", days / 365.0)
    }
}

/// Builds axis labels for a monthly series of `months + 1` points.
///
/// Month 0 is `"Now"`, whole years are `"1y"`, `"2y"`…, remaining quarters are
/// `"3m"`, `"6m"`…, everything else is left blank.
pub fn month_labels(months: usize) -> Vec<String> {
    (0..=months)
        .map(|i| match i {
            0 => "Now".to_string(),
            i if i % 12 == 0 => format!("{}y", i / 12),
            i if i % 3 == 0 => format!("{i}m"),
            _ => String::new(),
        })
        .collect()
}
