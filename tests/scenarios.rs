//! End-to-end checks of the published capacity scenarios.

use capacity_planner::presets::preset;
use capacity_planner::units::month_labels;
use capacity_planner::{
    DauType, GrowthPeriod, RawInput, RequestPeriod, ValidationError, Workload, actual_dau,
    estimate, validate,
};

fn social_uploads() -> RawInput {
    RawInput {
        total_users: Some(50_000_000.0),
        dau: Some(10_000_000.0),
        dau_type: Some(DauType::Absolute),
        storage_per_user: Some(5.0),
        files_per_day: Some(10.0),
        avg_file_size: Some(200.0),
        read_write_ratio: Some("80:20".into()),
        growth_rate: Some(15.0),
        ..RawInput::default()
    }
}

#[test]
fn social_upload_storage() {
    let report = estimate(&social_uploads()).unwrap();
    assert_eq!(report.storage.daily_per_user, 2_048_000.0);
    assert_eq!(report.storage.total_daily, 2.048e13);
    assert!((report.storage.total_allocated / 2.684e17 - 1.0).abs() < 1e-3);
}

#[test]
fn social_request_rates() {
    let raw = RawInput {
        files_per_day: None,
        avg_file_size: None,
        request_count: Some(50.0),
        request_period: Some(RequestPeriod::Day),
        ..social_uploads()
    };
    let r = estimate(&raw).unwrap().requests;
    assert!((r.total_rps - 5787.04).abs() < 0.01);
    assert!((r.read_rps - 4629.63).abs() < 0.01);
    assert!((r.write_rps - 1157.41).abs() < 0.01);
}

#[test]
fn missing_file_size_is_rejected() {
    let raw = RawInput {
        avg_file_size: None,
        ..social_uploads()
    };
    assert_eq!(
        estimate(&raw).unwrap_err(),
        ValidationError::MissingPairedField("avgFileSize")
    );
}

#[test]
fn dau_above_total_is_rejected() {
    let raw = RawInput {
        total_users: Some(100.0),
        dau: Some(150.0),
        ..social_uploads()
    };
    assert!(matches!(
        validate(&raw),
        Err(ValidationError::LogicalConflict(_))
    ));
}

#[test]
fn actual_dau_bounds() {
    for (total, dau) in [(100.0, 100.0), (100.0, 37.0), (1.0, 1.0)] {
        let inputs = validate(&RawInput {
            total_users: Some(total),
            dau: Some(dau),
            ..social_uploads()
        })
        .unwrap();
        assert!(actual_dau(&inputs) <= total);
    }

    for (total, pct) in [(1_000.0, 12.5), (7.0, 50.0), (3.0, 100.0)] {
        let inputs = validate(&RawInput {
            total_users: Some(total),
            dau: Some(pct),
            dau_type: Some(DauType::Percentage),
            ..social_uploads()
        })
        .unwrap();
        assert_eq!(actual_dau(&inputs), (total * pct / 100.0).floor());
    }
}

#[test]
fn projection_is_restartable_and_chartable() {
    let a = estimate(&social_uploads()).unwrap();
    let b = estimate(&social_uploads()).unwrap();
    assert_eq!(a, b);

    let g = &a.growth;
    assert_eq!(g.storage[0], a.storage.monthly());
    assert_eq!(g.users[0], 50_000_000.0);
    assert_eq!(g.bandwidth[0], a.bandwidth.total);
    assert_eq!(month_labels(60).len(), g.storage.len());
    assert!(g.storage.iter().chain(&g.users).chain(&g.bandwidth).all(|v| v.is_finite()));
}

#[test]
fn presets_produce_reports() {
    for name in ["social", "video", "photo", "ecommerce", "messaging"] {
        let p = preset(name).unwrap();
        let report = estimate(&p.input).unwrap();
        assert!(matches!(report.inputs.workload(), Workload::Requests { .. }));
        assert!(report.storage.total_daily > 0.0, "{name}");
        let r = &report.requests;
        assert!((r.read_rps + r.write_rps - r.total_rps).abs() < 1e-9 * r.total_rps);
    }
}

#[test]
fn overflowing_workloads_never_reach_the_report() {
    let raw = RawInput {
        files_per_day: Some(1e300),
        growth_rate: Some(100.0),
        growth_period: Some(GrowthPeriod::Monthly),
        ..social_uploads()
    };
    assert_eq!(
        estimate(&raw).unwrap_err(),
        ValidationError::MissingOrInvalid("filesPerDay")
    );

    let raw = RawInput {
        files_per_day: Some(1e285),
        growth_rate: Some(0.0),
        ..social_uploads()
    };
    let report = estimate(&raw).unwrap();
    assert!(report.growth.storage.iter().all(|v| v.is_finite()));
    assert!(!report.to_string().contains("inf"));
}
