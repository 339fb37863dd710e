//! Pipeline benchmarks
//!
//! Measures the deterministic presets on synthetic multi-page documents.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use doc_consolidate::elements::{Element, ImageElement, TableElement, TextElement};
use doc_consolidate::geometry::BoundingBox;
use doc_consolidate::node::nodes_from_elements;
use doc_consolidate::pipeline::{
    CombineNodesSpatially, IngestionPipeline, PipelineConfig, ProcessingStep, SpatialCriteria,
};

/// Lines of text in two columns, a table and a sliced image per page.
fn synthetic_document(pages: u32) -> Vec<Element> {
    let mut elements = Vec::new();
    for page in 1..=pages {
        let bbox = |x0: f32, y0: f32, x1: f32, y1: f32| BoundingBox {
            page,
            page_width: 612.0,
            page_height: 792.0,
            x0,
            y0,
            x1,
            y1,
        };
        elements.push(TextElement::new("ACME Corp", bbox(72.0, 30.0, 200.0, 42.0)).into());
        for line in 0..30 {
            let y = 100.0 + line as f32 * 14.0;
            for (col, x) in [(0, 72.0), (1, 320.0)] {
                let text = format!("page {} column {} line {} of running text", page, col, line);
                elements.push(TextElement::new(text, bbox(x, y, x + 220.0, y + 12.0)).into());
            }
        }
        elements.push(TableElement::new("| a | b |\n|---|---|", bbox(72.0, 540.0, 540.0, 640.0)).into());
        for band in 0..3 {
            let y = 650.0 + band as f32 * 30.0;
            elements.push(ImageElement::new(bbox(72.0, y, 300.0, y + 30.0)).into());
        }
        elements.push(TextElement::new(format!("{}", page), bbox(300.0, 760.0, 312.0, 772.0)).into());
    }
    elements
}

fn bench_basic_preset(c: &mut Criterion) {
    let mut group = c.benchmark_group("basic_preset");
    let pipeline = IngestionPipeline::basic(&PipelineConfig::default()).unwrap();

    for pages in [1u32, 10, 50] {
        let elements = synthetic_document(pages);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{pages}_pages")), &elements, |b, elements| {
            b.iter(|| pipeline.run_elements(black_box(elements.clone())).unwrap())
        });
    }
    group.finish();
}

fn bench_spatial_fixed_point(c: &mut Criterion) {
    let nodes = nodes_from_elements(synthetic_document(10)).unwrap();
    let step = CombineNodesSpatially::new(10.0, 4.0, SpatialCriteria::BothSmall).unwrap();
    c.bench_function("spatial_fixed_point_10_pages", |b| {
        b.iter(|| step.process(black_box(nodes.clone())).unwrap())
    });
}

criterion_group!(benches, bench_basic_preset, bench_spatial_fixed_point);
criterion_main!(benches);
