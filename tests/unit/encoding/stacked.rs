use super::*;
use std::collections::BTreeMap;

fn group(key: &str, good: f64, fair: f64, bad: f64) -> AggregatedPoint {
    AggregatedPoint {
        key: key.into(),
        metrics: BTreeMap::from([
            (MetricName::new("good"), good),
            (MetricName::new("fair"), fair),
            (MetricName::new("bad"), bad),
        ]),
    }
}

fn health_stack() -> StackedBarEncoding {
    StackedBarEncoding::new(vec![
        StackLayer::new("good", Rgba8::rgb(0x4c, 0xaf, 0x50)),
        StackLayer::new("fair", Rgba8::rgb(0xff, 0xb7, 0x4d)),
        StackLayer::new("bad", Rgba8::rgb(0xe5, 0x73, 0x73)),
    ])
}

fn num(m: &Mark, attr: &str) -> f64 {
    m.attrs.get(attr).and_then(AttrValue::as_f64).unwrap()
}

#[test]
fn one_segment_per_group_and_layer() {
    let marks = health_stack()
        .encode(&[group("Male", 60.0, 30.0, 10.0), group("Female", 50.0, 30.0, 20.0)])
        .unwrap();
    let keys: Vec<&str> = marks.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["Male/good", "Male/fair", "Male/bad", "Female/good", "Female/fair", "Female/bad"]
    );
    assert_eq!(marks[4].datum.as_ref().unwrap().key.as_str(), "Female");
}

#[test]
fn segments_stack_from_the_baseline() {
    let marks = health_stack()
        .encode(&[group("Male", 60.0, 30.0, 10.0), group("Female", 50.0, 30.0, 20.0)])
        .unwrap();

    // y domain [0, 100] onto [430, 40]; bands of 210 at 160 and 460
    let good = &marks[0];
    assert!((num(good, "y") - 196.0).abs() < 1e-9);
    assert!((num(good, "height") - 234.0).abs() < 1e-9);
    let fair = &marks[1];
    assert!((num(fair, "y") - 79.0).abs() < 1e-9);
    assert!((num(fair, "y") + num(fair, "height") - num(good, "y")).abs() < 1e-9);
    let bad = &marks[2];
    assert!((num(bad, "y") - 40.0).abs() < 1e-9);

    assert!((num(good, "x") - 160.0).abs() < 1e-9);
    assert!((num(&marks[3], "x") - 460.0).abs() < 1e-9);
    assert!((num(good, "width") - 210.0).abs() < 1e-9);
    assert_eq!(
        fair.attrs.get("fill"),
        Some(AttrValue::Color(Rgba8::rgb(0xff, 0xb7, 0x4d)))
    );
}

#[test]
fn tallest_stack_sets_the_domain() {
    let marks = health_stack()
        .encode(&[group("Male", 10.0, 10.0, 0.0), group("Female", 20.0, 10.0, 10.0)])
        .unwrap();
    assert!((num(&marks[5], "y") - 40.0).abs() < 1e-9);
    assert!((num(&marks[2], "y") - (430.0 - 0.5 * 390.0)).abs() < 1e-9);
    assert_eq!(num(&marks[2], "height"), 0.0);
}

#[test]
fn missing_layer_is_malformed() {
    let mut p = group("Male", 1.0, 1.0, 1.0);
    p.metrics.remove(&MetricName::new("bad"));
    assert!(matches!(
        health_stack().encode(&[p]),
        Err(ChartError::MalformedInput(_))
    ));
}

#[test]
fn bad_padding_is_rejected() {
    let enc = StackedBarEncoding {
        padding: 1.0,
        ..health_stack()
    };
    assert!(matches!(enc.encode(&[]), Err(ChartError::Validation(_))));
    assert!(health_stack().encode(&[]).unwrap().is_empty());
}
