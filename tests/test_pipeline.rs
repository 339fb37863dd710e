//! End-to-end tests for the deterministic pipeline presets.

use doc_consolidate::elements::{Element, ImageElement, TableElement, TextElement};
use doc_consolidate::geometry::BoundingBox;
use doc_consolidate::node::{nodes_from_elements, Node};
use doc_consolidate::pipeline::{
    CombineBullets, CombineNodesSpatially, IngestionPipeline, PipelineConfig, PipelinePreset,
    ProcessingStep, RemoveFullPageStubs, RemoveTextInsideTables, SpatialCriteria,
};
use doc_consolidate::Error;

fn bbox(page: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> BoundingBox {
    BoundingBox::new(page, 612.0, 792.0, x0, y0, x1, y1).unwrap()
}

fn text(s: &str, bbox: BoundingBox) -> Element {
    TextElement::new(s, bbox).into()
}

fn sentence(words: usize, topic: &str) -> String {
    let mut s = (0..words).map(|i| format!("{}{}", topic, i)).collect::<Vec<_>>().join(" ");
    s.push('.');
    s
}

fn texts(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(Node::text).collect()
}

#[test]
fn test_noop_is_identity_modulo_sort() {
    let elements = vec![
        text("c", bbox(2, 72.0, 100.0, 200.0, 112.0)),
        text("a", bbox(1, 72.0, 100.0, 200.0, 112.0)),
        text("b", bbox(1, 72.0, 300.0, 200.0, 312.0)),
    ];
    let pipeline = IngestionPipeline::from_preset(PipelinePreset::NoOp, &PipelineConfig::default(), None).unwrap();
    let nodes = pipeline.run_elements(elements).unwrap();
    assert_eq!(texts(&nodes), vec!["a", "b", "c"]);
    assert!(nodes.iter().all(|n| n.elements().len() == 1));

    let again = pipeline.run(nodes.clone()).unwrap();
    assert_eq!(again, nodes);
}

#[test]
fn test_text_inside_table_removed() {
    let nodes = nodes_from_elements(vec![
        TableElement::new("| Rent | $1,200 |", bbox(1, 0.0, 0.0, 100.0, 100.0)).into(),
        text("Rent $1,200", bbox(1, 10.0, 10.0, 90.0, 30.0)),
    ])
    .unwrap();
    assert_eq!(nodes.len(), 2);
    let result = RemoveTextInsideTables::new().process(nodes).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].text(), "| Rent | $1,200 |");
}

#[test]
fn test_full_page_stub_removed() {
    // 90% of the page area, three tokens
    let nodes = nodes_from_elements(vec![text("DRAFT NOT FINAL", bbox(1, 0.0, 0.0, 612.0, 712.8))]).unwrap();
    assert_eq!(nodes[0].tokens(), 3);
    let result = RemoveFullPageStubs::new(0.35).unwrap().process(nodes).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_horizontal_gap_merge_spans_union() {
    let nodes = nodes_from_elements(vec![
        text("Total due:", bbox(1, 72.0, 400.0, 150.0, 412.0)),
        text("$3,600", bbox(1, 155.0, 400.0, 200.0, 412.0)),
    ])
    .unwrap();
    let step = CombineNodesSpatially::new(10.0, 0.0, SpatialCriteria::BothSmall).unwrap();
    let result = step.process(nodes).unwrap();
    assert_eq!(result.len(), 1);
    let b = result[0].bbox();
    assert_eq!((b.x0, b.y0, b.x1, b.y1), (72.0, 400.0, 200.0, 412.0));
    assert_eq!(result[0].text(), "Total due:\n$3,600");
}

#[test]
fn test_bullet_merged_across_page_boundary() {
    let nodes = nodes_from_elements(vec![
        text("• The tenant shall return all keys", bbox(1, 72.0, 740.0, 540.0, 752.0)),
        text("on the final day of the lease.", bbox(2, 72.0, 60.0, 540.0, 72.0)),
    ])
    .unwrap();
    let result = CombineBullets::new().process(nodes).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].page(), 1);
    assert_eq!(result[0].pages().into_iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_spatial_second_application_is_noop() {
    let elements: Vec<Element> = (0..20)
        .map(|i| {
            let col = (i % 2) as f32 * 300.0;
            let y = 100.0 + (i / 2) as f32 * 14.0;
            text(&format!("fragment {}", i), bbox(1, 50.0 + col, y, 250.0 + col, y + 12.0))
        })
        .collect();
    let nodes = nodes_from_elements(elements).unwrap();
    let step = CombineNodesSpatially::new(10.0, 4.0, SpatialCriteria::BothSmall).unwrap();
    let once = step.process(nodes).unwrap();
    let twice = step.process(once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_basic_preset_end_to_end() {
    let mut elements = Vec::new();
    for page in 1..=3 {
        elements.push(text("ACME Property Management", bbox(page, 72.0, 30.0, 300.0, 42.0)));
        elements.push(text(&format!("Page {} of 3", page), bbox(page, 280.0, 760.0, 340.0, 772.0)));
    }
    elements.push(TextElement::heading("1. Premises", bbox(1, 72.0, 100.0, 300.0, 116.0)).into());
    elements.push(text(&sentence(40, "premises"), bbox(1, 72.0, 120.0, 540.0, 200.0)));
    elements.push(text(&sentence(40, "location"), bbox(1, 72.0, 202.0, 540.0, 280.0)));
    elements.push(TableElement::new("| Month | Rent |", bbox(1, 72.0, 300.0, 540.0, 400.0)).into());
    elements.push(text("Month Rent", bbox(1, 80.0, 310.0, 300.0, 322.0)));
    elements.push(ImageElement::new(bbox(2, 72.0, 100.0, 540.0, 200.0)).into());
    elements.push(ImageElement::new(bbox(2, 72.0, 200.0, 540.0, 300.0)).into());
    elements.push(text(&sentence(80, "termination"), bbox(3, 72.0, 100.0, 540.0, 300.0)));

    let pipeline = IngestionPipeline::basic(&PipelineConfig::default()).unwrap();
    let nodes = pipeline.run_elements(elements).unwrap();

    assert!(!nodes.is_empty());
    assert!(nodes.iter().all(|n| !n.text().contains("ACME Property Management")));
    assert!(nodes.iter().all(|n| !n.text().contains("of 3")));
    assert!(nodes.iter().all(|n| n.tokens() >= 50));
    assert!(nodes
        .iter()
        .any(|n| n.text().starts_with("1. Premises\npremises0")));
    assert!(nodes.iter().any(|n| n.text().contains("termination79")));
    // sorted output
    assert!(nodes.windows(2).all(|w| w[0].cmp_position(&w[1]).is_le()));
}

#[test]
fn test_basic_preset_keeps_bullet_rejoined_across_pages() {
    let clause = (0..60).map(|i| format!("clause{}", i)).collect::<Vec<_>>().join(" ");
    let elements = vec![
        text(&format!("• {}", clause), bbox(1, 72.0, 600.0, 540.0, 690.0)),
        text("and continues here.", bbox(2, 72.0, 100.0, 540.0, 112.0)),
    ];

    let pipeline = IngestionPipeline::basic(&PipelineConfig::default()).unwrap();
    let nodes = pipeline.run_elements(elements).unwrap();

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].pages().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    assert!(nodes[0].text().ends_with("clause59\nand continues here."));
    assert_eq!(nodes[0].tokens(), 65);
}

#[test]
fn test_invalid_configuration_rejected_at_construction() {
    assert!(matches!(
        "nope".parse::<PipelinePreset>(),
        Err(Error::UnknownPreset(_))
    ));
    assert!(matches!(
        CombineNodesSpatially::new(-5.0, 0.0, SpatialCriteria::BothSmall),
        Err(Error::InvalidConfig(_))
    ));
    assert!(RemoveFullPageStubs::new(0.0).is_err());
}

#[test]
fn test_nodes_serialize_with_elements() {
    let nodes = nodes_from_elements(vec![text("hello world", bbox(1, 72.0, 100.0, 200.0, 112.0))]).unwrap();
    let json = serde_json::to_value(&nodes).unwrap();
    assert_eq!(json[0]["text"], "hello world");
    assert_eq!(json[0]["tokens"], 2);
    assert_eq!(json[0]["bbox"]["page"], 1);
    assert_eq!(json[0]["elements"][0]["variant"], "text");
}

#[test]
fn test_elements_deserialize_from_json() {
    let json = r#"[
        {"variant": "text", "text": "Clause", "is_heading": true,
         "bbox": {"page": 1, "page_width": 612, "page_height": 792, "x0": 72, "y0": 90, "x1": 200, "y1": 104}},
        {"variant": "table", "text": "<table></table>", "format": "html",
         "bbox": {"page": 1, "page_width": 612, "page_height": 792, "x0": 72, "y0": 120, "x1": 540, "y1": 300}},
        {"variant": "image",
         "bbox": {"page": 2, "page_width": 612, "page_height": 792, "x0": 72, "y0": 90, "x1": 540, "y1": 300}}
    ]"#;
    let elements: Vec<Element> = serde_json::from_str(json).unwrap();
    assert_eq!(elements.len(), 3);
    assert!(elements[0].is_heading());
    assert!(elements[1].is_table());
    assert_eq!(elements[2].page(), 2);
}
