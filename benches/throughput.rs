use criterion::{criterion_group, criterion_main, Criterion};
use embedroute::render::{RenderOptions, Renderer};
use embedroute::router::Router;
use embedroute::server::RecordingSink;
use http::Method;
use std::collections::HashMap;
use std::hint::black_box;

fn zoo_router() -> Router<&'static str> {
    let mut router = Router::new();
    for (method, pattern, handler) in [
        (Method::GET, "/", "root_handler"),
        (Method::GET, "/zoo/animals", "get_animals"),
        (Method::POST, "/zoo/animals", "create_animal"),
        (Method::GET, "/zoo/animals/:id", "get_animal"),
        (Method::PUT, "/zoo/animals/:id", "update_animal"),
        (Method::GET, "/zoo/animals/:id/toys/:toy_id", "animal_toy"),
        (
            Method::GET,
            "/zoo/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
            "habitat_section",
        ),
        (
            Method::POST,
            "/inventory/:warehouse_id/feeds/:feed_id/items/:item_id/batches/:batch_id",
            "post_item_batch",
        ),
        (Method::GET, "/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i", "complex_many_params"),
        (Method::GET, "/zoo/*path", "zoo_fallback"),
    ] {
        router
            .register(method, pattern, handler)
            .expect("valid pattern");
    }
    router
}

fn bench_route_throughput(c: &mut Criterion) {
    let router = zoo_router();
    c.bench_function("route_match", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/123"),
            (Method::GET, "/zoo/animals/123/toys/456"),
            (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
            (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
            (Method::GET, "/zoo/tickets/2024/summer"),
        ];
        b.iter(|| {
            for (method, path) in &test_paths {
                black_box(router.route_path(method, path));
            }
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let page: String = std::iter::once("<!doctype html><html><head><title>{{title}}</title></head><body>")
        .chain(std::iter::repeat("<p>{{greeting}}, {{{name}}}! Plain text padding here.</p>").take(200))
        .chain(std::iter::once("</body></html>"))
        .collect();
    let vars: HashMap<String, String> = [
        ("title", "Bench & Co"),
        ("greeting", "Hello"),
        ("name", "<b>World</b>"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for chunk_size in [64, 512, 4096] {
        c.bench_function(&format!("render_chunk_{chunk_size}"), |b| {
            let renderer = Renderer::new(RenderOptions {
                chunk_size,
                ..RenderOptions::default()
            })
            .with_resolver(&vars)
            .with_head_injection("<script src=\"/live.js\"></script>");
            b.iter(|| {
                let mut sink = RecordingSink::new();
                let mut input = page.as_bytes();
                black_box(renderer.render(&mut input, &mut sink).expect("render"));
            })
        });
    }
}

criterion_group!(benches, bench_route_throughput, bench_render);
criterion_main!(benches);
