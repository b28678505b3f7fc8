use ta_scout::indicator::ema::{ema_last, ema_series};

#[test]
fn seeded_with_first_value() {
    let out = ema_series(&[2.0, 5.0, 8.0], 3);
    // k = 0.5
    assert_eq!(out.len(), 3);
    assert!((out[0] - 2.0).abs() < f64::EPSILON);
    assert!((out[1] - 3.5).abs() < f64::EPSILON);
    assert!((out[2] - 5.75).abs() < f64::EPSILON);
}

#[test]
fn single_period_tracks_input() {
    let out = ema_series(&[42.0, 99.0, 7.0], 1);
    assert_eq!(out, vec![42.0, 99.0, 7.0]);
}

#[test]
fn constant_series_is_fixed_point() {
    let out = ema_series(&[10.0; 50], 12);
    assert!(out.iter().all(|v| (v - 10.0).abs() < 1e-12));
}

#[test]
fn empty_series() {
    assert!(ema_series(&[], 12).is_empty());
    assert_eq!(ema_last(&[], 12), None);
    assert_eq!(ema_last(&[3.0], 12), Some(3.0));
}
