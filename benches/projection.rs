use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use druid_projector::{
    projector::VecReader, time::parse_instant, CodecRegistry, InputRow, LoadSpec,
    OutputBatchBuilder, RowProjector,
};

const ROWS: usize = 10_000;

const SPEC: &str = r#"{
    "dimensions": ["page", "language", "user", "country"],
    "metrics": [
        {"name": "count", "type": "long"},
        {"name": "added", "type": "float"},
        {"name": "uniques", "type": "hyperUnique"}
    ]
}"#;

fn rows() -> Vec<InputRow> {
    let start = parse_instant("2024-01-01T00:00:00Z").expect("timestamp");
    (0..ROWS)
        .map(|i| {
            InputRow::new(start + chrono::Duration::seconds(i as i64))
                .with_dimension("page", [format!("page-{}", i % 97)])
                .with_dimension("language", ["en", "de"])
                .with_dimension("country", [format!("c{}", i % 13)])
                .with_metric("count", i as i64)
                .with_metric("added", fastrand::f32())
                .with_complex("uniques", i as u64)
        })
        .collect()
}

fn projector() -> RowProjector {
    let mut codecs = CodecRegistry::new();
    codecs.register_fn("hyperUnique", |v: &u64| Ok(v.to_le_bytes().to_vec()));
    RowProjector::new(
        Arc::new(LoadSpec::parse(SPEC.as_bytes()).expect("spec")),
        Arc::new(codecs),
    )
}

fn projection(c: &mut Criterion) {
    let rows = rows();
    let projector = projector();

    let mut group = c.benchmark_group("projection");
    group.throughput(Throughput::Elements(ROWS as u64));
    group.bench_function("project_rows", |b| {
        b.iter(|| {
            for row in &rows {
                black_box(projector.project(row).expect("project"));
            }
        })
    });
    group.bench_function("project_into_batch", |b| {
        b.iter(|| {
            let mut reader = druid_projector::ProjectingReader::new(
                VecReader::new(rows.clone()),
                projector.clone(),
            );
            let mut builder = OutputBatchBuilder::new(&projector.schema(), ROWS);
            while let Some(record) = reader.next_record().expect("read") {
                builder.push(&record).expect("push");
            }
            black_box(builder.finish().expect("finish"))
        })
    });
    group.finish();
}

criterion_group!(benches, projection);
criterion_main!(benches);
