//! Benchmarks for include parsing and the transformation pipeline.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Map, Value, json};
use smokescreen::prelude::*;
use smokescreen::schema::IncludeMap;
use std::hint::black_box;

struct PostTransformer;

impl Transformer for PostTransformer {
    fn transform(&self, post: &Value) -> TransformResult<Map<String, Value>> {
        let mut data = Map::new();
        data.insert("id".into(), post["id"].clone());
        data.insert("title".into(), post["title"].clone());
        data.insert("body".into(), post["body"].clone());
        Ok(data)
    }

    fn includes(&self) -> IncludeDeclarations {
        IncludeDeclarations::new()
            .with("author", "relation:users|default")
            .with("comments", "collection|relation")
    }
}

struct PropsTransformer;

impl Transformer for PropsTransformer {
    fn props(&self) -> Vec<Prop> {
        vec![
            Prop::defined("id", "int"),
            Prop::new("title"),
            Prop::defined("published", "date|map:created_at"),
        ]
    }
}

fn create_posts(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": i,
                "title": format!("Post {i}"),
                "body": "Lorem ipsum dolor sit amet",
                "created_at": "2018-03-08 19:11:11",
                "author": {"id": i % 7, "name": "Ada"},
                "comments": (0..5).map(|c| json!({"id": c, "body": "Nice"})).collect::<Vec<_>>(),
            })
        })
        .collect()
}

fn bench_include_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("include_parser");

    group.bench_function("flat", |b| {
        b.iter(|| black_box(parse_includes(black_box("author,comments,tags"))))
    });
    group.bench_function("nested", |b| {
        b.iter(|| {
            black_box(parse_includes(black_box(
                "author{profile,avatar},comments{author{profile}}:limit(5):offset(10),tags",
            )))
        })
    });

    let includes = parse_includes("comments{author{profile,avatar},likes},author");
    group.bench_function("splice", |b| b.iter(|| black_box(includes.splice("comments"))));

    group.finish();
}

fn bench_include_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("include_map");

    let declarations = PostTransformer.includes().key("tags").with(
        "images",
        "method:includeImageGallery|collection|relation:media,media.thumbnails",
    );
    group.bench_function("compute", |b| {
        b.iter(|| black_box(IncludeMap::compute(black_box(&declarations))))
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for size in [10usize, 100, 1000] {
        let posts = create_posts(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("defaults", size), &posts, |b, posts| {
            let mut smokescreen = Smokescreen::new()
                .collection(Collection::new(posts.clone()).with_transformer(PostTransformer));
            smokescreen.parse_includes("");
            b.iter(|| black_box(smokescreen.to_array()))
        });

        group.bench_with_input(BenchmarkId::new("nested_includes", size), &posts, |b, posts| {
            let mut smokescreen = Smokescreen::new()
                .collection(Collection::new(posts.clone()).with_transformer(PostTransformer));
            smokescreen.parse_includes("author,comments");
            b.iter(|| black_box(smokescreen.to_array()))
        });

        group.bench_with_input(BenchmarkId::new("declarative_props", size), &posts, |b, posts| {
            let smokescreen = Smokescreen::new()
                .collection(Collection::new(posts.clone()).with_transformer(PropsTransformer));
            b.iter(|| black_box(smokescreen.to_array()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_include_parser, bench_include_map, bench_pipeline);
criterion_main!(benches);
