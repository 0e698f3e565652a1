use super::*;

fn map(entries: &[(&str, f64)]) -> WeightMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn accepts_weights_within_tolerance() {
    let w = map(&[("a", 0.3333), ("b", 0.3333), ("c", 0.3333)]);
    check_weights("Q", &w, ["a", "b", "c"]).unwrap();
}

#[test]
fn rejects_sum_outside_tolerance() {
    let w = map(&[("a", 0.5), ("b", 0.49)]);
    let err = check_weights("Q", &w, ["a", "b"]).unwrap_err();
    assert!(err.to_string().contains("sum"), "got: {err}");
}

#[test]
fn rejects_missing_child_weight() {
    let w = map(&[("a", 1.0)]);
    let err = check_weights("Q", &w, ["a", "b"]).unwrap_err();
    assert!(err.to_string().contains("children without a weight: b"), "got: {err}");
}

#[test]
fn rejects_weight_for_unknown_child() {
    let w = map(&[("a", 0.5), ("z", 0.5)]);
    let err = check_weights("Q", &w, ["a"]).unwrap_err();
    assert!(err.to_string().contains("unknown children: z"), "got: {err}");
}

#[test]
fn rejects_negative_weight() {
    let w = map(&[("a", 1.5), ("b", -0.5)]);
    assert!(check_weights("Q", &w, ["a", "b"]).is_err());
}

#[test]
fn weighted_sum_combines_children() {
    let w = map(&[("a", 0.25), ("b", 0.75)]);
    let v = weighted_sum("Q", Some(&w), ["a", "b"], |c| {
        Ok(if c == "a" { 1.0 } else { 0.0 })
    })
    .unwrap();
    assert!((v - 0.25).abs() < 1e-12);
}

#[test]
fn weighted_sum_without_weights_is_missing_calibration() {
    let err = weighted_sum("Q", None, ["a"], |_| Ok(1.0)).unwrap_err();
    assert!(matches!(err, Error::MissingCalibration { .. }));
}
