//! Configuration and results through `serde_json`.

#![cfg(feature = "serde")]

use regrid::*;

#[test]
fn layout_config_round_trips_through_json() {
    let text = "columns=3&rows=2&gutter=5pt&align=center&marks.size=9pt&group=rows";
    let config = settings::parse(text).config;
    let json = serde_json::to_string(&config).unwrap();
    let back: LayoutConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn missing_fields_take_defaults() {
    let layout: GridLayout = serde_json::from_str(r#"{ "columns": 4 }"#).unwrap();
    assert_eq!(layout, GridLayout { columns: 4, ..GridLayout::default() });

    let options: RegridOptions = serde_json::from_str(r#"{ "grouping": "Columns" }"#).unwrap();
    assert_eq!(options.grouping, Grouping::Columns);
    assert_eq!(options.bounds, BoundsKind::Visible);
    assert!(options.normalize_columns && options.normalize_rows);
}

#[test]
fn plan_serializes_cells() {
    let plan = GridLayout::new(2, 1)
        .compute(Bounds::new(0.0, 0.0, 10.0, -10.0), None)
        .unwrap();
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["orientation"], "Landscape");
    assert_eq!(value["cells"].as_array().unwrap().len(), 2);
    assert_eq!(value["cells"][1]["origin"]["x"], 10.0);
}

#[test]
fn report_serializes() {
    let mut doc = MemoryDocument::new();
    let ids: Vec<_> = [0.0, 45.0, 100.0]
        .iter()
        .map(|&x| doc.add_rect(Bounds::centered(Point::new(x, 0.0), Size::new(10.0, 10.0))))
        .collect();
    doc.select(&ids);
    let report = Regrid::default().run(&mut doc).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["spec"]["columns"], 3);
    assert_eq!(value["translations"][1]["dx"], 5.0);
}
