use super::*;
use crate::animation::ease::Ease;

const SCATTER: &str = r##"{
    "sources": [
        { "metric": "alcohol", "path": "alcohol.json" },
        {
            "metric": "health",
            "path": "health.json",
            "schema": { "entity": "Country", "filters": [{ "column": "MEASURE", "equals": "SP_DS" }] }
        }
    ],
    "encoding": { "kind": "scatter", "x_metric": "alcohol", "y_metric": "health", "fill": "#1f77b4" },
    "transition": { "duration_ms": 400 },
    "tooltip": { "mode": "persistent", "lines": [{ "metric": "health", "suffix": "%" }] },
    "initial": "2021"
}"##;

fn scatter() -> ChartConfig {
    ChartConfig::from_reader(SCATTER.as_bytes()).unwrap()
}

#[test]
fn parses_with_defaults() {
    let cfg = scatter();
    assert_eq!(cfg.sources.len(), 2);
    assert_eq!(cfg.sources[0].schema.period, "TIME_PERIOD");
    assert_eq!(cfg.sources[1].schema.entity, "Country");
    assert_eq!(cfg.sources[1].schema.value, "OBS_VALUE");
    assert_eq!(cfg.sources[1].schema.filters.len(), 1);
    assert_eq!(cfg.selector, SelectorKind::Period);
    assert_eq!(cfg.transition.duration_ms, 400);
    assert_eq!(cfg.transition.exit_duration_ms, 500);
    assert_eq!(cfg.transition.ease, Ease::InOutCubic);
    assert_eq!(cfg.tooltip.mode, TooltipMode::Persistent);
    assert_eq!(cfg.tooltip.lines.lines[0].decimals, 2);
    assert_eq!(cfg.initial.as_deref(), Some("2021"));
    let EncodingSpec::Scatter(s) = &cfg.encoding else {
        panic!("expected scatter");
    };
    assert_eq!(s.radius, 6.0);
    assert_eq!(s.fill.to_hex(), "#1f77b4");
    cfg.validate().unwrap();
}

#[test]
fn unknown_encoding_metric_is_rejected() {
    let mut cfg = scatter();
    if let EncodingSpec::Scatter(s) = &mut cfg.encoding {
        s.y_metric = MetricName::new("tobacco");
    }
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("tobacco"));
}

#[test]
fn duplicate_source_metric_is_rejected() {
    let mut cfg = scatter();
    cfg.sources[1].metric = MetricName::new("alcohol");
    assert!(matches!(cfg.validate(), Err(ChartError::Validation(_))));
}

#[test]
fn tooltip_metric_must_be_a_source() {
    let mut cfg = scatter();
    cfg.tooltip.lines.lines[0].metric = MetricName::new("vaping");
    assert!(matches!(cfg.validate(), Err(ChartError::Validation(_))));
}

#[test]
fn scatter_cannot_use_latest_selector() {
    let mut cfg = scatter();
    cfg.selector = SelectorKind::Latest;
    assert!(matches!(cfg.validate(), Err(ChartError::Validation(_))));
}

#[test]
fn choropleth_latest_selector() {
    let json = r#"{
        "sources": [
            { "metric": "SP_DS", "path": "health.json" },
            { "metric": "VAPING", "path": "health.json" }
        ],
        "encoding": { "kind": "choropleth", "metric": "SP_DS", "domain_max": 35, "domain_max_by": { "VAPING": 6 } },
        "selector": "latest",
        "initial": "VAPING"
    }"#;
    let cfg = ChartConfig::from_reader(json.as_bytes()).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.tooltip.mode, TooltipMode::Transient);

    let mut bad = cfg.clone();
    bad.initial = Some("ALCOHOL".to_owned());
    assert!(bad.validate().is_err());

    let mut bad = cfg;
    if let EncodingSpec::Choropleth(c) = &mut bad.encoding {
        c.domain_max_by.insert(MetricName::new("VAPING"), 0.0);
    }
    assert!(bad.validate().is_err());
}

const SERIES: &str = r##"{
    "sources": [
        { "metric": "SP_DS", "path": "trends.json" },
        { "metric": "VAPING", "path": "trends.json" }
    ],
    "encoding": {
        "kind": "series",
        "series": [
            { "metric": "SP_DS", "color": "#0000ff" },
            { "metric": "VAPING", "color": "#008000", "axis": "right", "markers": false }
        ]
    },
    "selector": "entity"
}"##;

#[test]
fn series_needs_an_entity_selector() {
    let cfg = ChartConfig::from_reader(SERIES.as_bytes()).unwrap();
    cfg.validate().unwrap();
    let EncodingSpec::Series(s) = &cfg.encoding else {
        panic!("expected series");
    };
    assert!(!s.series[1].markers);

    let mut bad = cfg.clone();
    bad.selector = SelectorKind::Period;
    let err = bad.validate().unwrap_err();
    assert!(err.to_string().contains("series"));

    let mut bad = cfg;
    if let EncodingSpec::Series(s) = &mut bad.encoding {
        s.series[1].metric = MetricName::new("ALCOHOL");
    }
    assert!(bad.validate().is_err());
}

#[test]
fn entity_selector_rejects_other_encodings() {
    let mut cfg = scatter();
    cfg.selector = SelectorKind::Entity;
    assert!(matches!(cfg.validate(), Err(ChartError::Validation(_))));
}

#[test]
fn stacked_bar_layers_must_be_distinct_sources() {
    let json = r##"{
        "sources": [
            { "metric": "good", "path": "gender_health.json" },
            { "metric": "fair", "path": "gender_health.json" }
        ],
        "encoding": {
            "kind": "stacked_bar",
            "stack": [
                { "metric": "good", "fill": "#4caf50" },
                { "metric": "fair", "fill": "#ffb74d" }
            ]
        }
    }"##;
    let cfg = ChartConfig::from_reader(json.as_bytes()).unwrap();
    cfg.validate().unwrap();
    let EncodingSpec::StackedBar(b) = &cfg.encoding else {
        panic!("expected stacked bar");
    };
    assert_eq!(b.padding, 0.3);

    let mut bad = cfg.clone();
    if let EncodingSpec::StackedBar(b) = &mut bad.encoding {
        b.stack[1].metric = MetricName::new("good");
    }
    assert!(bad.validate().unwrap_err().to_string().contains("twice"));

    let mut bad = cfg;
    bad.selector = SelectorKind::Latest;
    assert!(bad.validate().is_err());
}

#[test]
fn mean_line_width_is_checked() {
    let mut cfg = scatter();
    if let EncodingSpec::Scatter(s) = &mut cfg.encoding {
        s.mean_line = Some(crate::encoding::scatter::MeanLine {
            stroke_width: 0.0,
            ..Default::default()
        });
    }
    assert!(matches!(cfg.validate(), Err(ChartError::Validation(_))));
}

#[test]
fn bad_json_is_a_serde_error() {
    let err = ChartConfig::from_reader(r#"{ "sources": [] "#.as_bytes()).unwrap_err();
    assert!(matches!(err, ChartError::Serde(_)));
}

#[test]
fn missing_file_is_reported() {
    let err = ChartConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("not/here.json"));
}
