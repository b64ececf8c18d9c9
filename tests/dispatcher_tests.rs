mod common;

use common::{dispatch, fs_tree, get, memory_source};
use embedroute::config::ServerConfig;
use embedroute::dispatcher::{DispatchOutcome, Dispatcher};
use embedroute::render::TemplateResolver;
use embedroute::server::RecordingSink;
use embedroute::static_files::AssetSource;
use embedroute::{SendStatic, ServeError};
use http::{Method, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

fn json_body(sink: &RecordingSink) -> Value {
    serde_json::from_slice(&sink.body).unwrap()
}

#[test]
fn test_route_with_params_and_query() {
    let mut d = Dispatcher::new();
    d.on(Method::GET, "/users/:id/posts/*rest", |req, res| {
        let body = format!(
            "{}|{}|{}",
            req.get_path_param("id").unwrap_or(""),
            req.get_path_param("rest").unwrap_or(""),
            req.get_query_param("sort").unwrap_or("none"),
        );
        res.send_text(StatusCode::OK, "text/plain", &body)
    })
    .unwrap();

    let (outcome, sink) = get(&d, "/users/42/posts/a/b%20c?sort=new+first");
    assert_eq!(outcome, DispatchOutcome::Route);
    assert_eq!(sink.body_string(), "42|a/b c|new first");
}

#[test]
fn test_static_before_dynamic() {
    let mut d = Dispatcher::new();
    d.serve_static_handler("/", memory_source(&[("/about", &b"static"[..])]), Arc::new(SendStatic));
    d.on(Method::GET, "/about", |_req, res| {
        res.send_text(StatusCode::OK, "text/plain", "dynamic")
    })
    .unwrap();
    d.on(Method::GET, "/contact", |_req, res| {
        res.send_text(StatusCode::OK, "text/plain", "dynamic")
    })
    .unwrap();

    let (outcome, sink) = get(&d, "/about");
    assert_eq!(outcome, DispatchOutcome::Static);
    assert_eq!(sink.body_string(), "static");

    // Missing asset falls through to the route table
    let (outcome, sink) = get(&d, "/contact");
    assert_eq!(outcome, DispatchOutcome::Route);
    assert_eq!(sink.body_string(), "dynamic");
}

#[test]
fn test_static_only_for_get() {
    let mut d = Dispatcher::new();
    d.serve_static_handler("/", memory_source(&[("/form", &b"static"[..])]), Arc::new(SendStatic));
    d.on(Method::POST, "/form", |_req, res| {
        res.send_text(StatusCode::CREATED, "text/plain", "posted")
    })
    .unwrap();

    let (outcome, sink) = dispatch(&d, Method::POST, "/form");
    assert_eq!(outcome, DispatchOutcome::Route);
    assert_eq!(sink.status(), Some(StatusCode::CREATED));
}

#[test]
fn test_mount_prefix() {
    let mut d = Dispatcher::new();
    d.serve_static(
        "/assets",
        memory_source(&[("/app.js", &b"js"[..]), ("/index.html", &b"idx"[..])]),
        |_info, _req, res| res.send_static(),
    );

    assert_eq!(get(&d, "/assets/app.js").1.body_string(), "js");
    assert_eq!(get(&d, "/assets").1.body_string(), "idx");
    assert_eq!(get(&d, "/assets/").1.body_string(), "idx");
    assert_eq!(get(&d, "/assetsapp.js").0, DispatchOutcome::NotFound);
    assert_eq!(get(&d, "/app.js").0, DispatchOutcome::NotFound);
}

#[test]
fn test_mounts_tried_in_order() {
    let mut d = Dispatcher::new();
    d.serve_static_handler("/", memory_source(&[("/a.txt", &b"first"[..])]), Arc::new(SendStatic));
    d.serve_static_handler(
        "/",
        memory_source(&[("/a.txt", &b"second"[..]), ("/b.txt", &b"second"[..])]),
        Arc::new(SendStatic),
    );
    assert_eq!(get(&d, "/a.txt").1.body_string(), "first");
    assert_eq!(get(&d, "/b.txt").1.body_string(), "second");
}

#[test]
fn test_default_not_found() {
    let d = Dispatcher::new();
    let (outcome, sink) = get(&d, "/nothing/here?x=1");
    assert_eq!(outcome, DispatchOutcome::NotFound);
    assert_eq!(sink.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(sink.content_type(), Some("application/json"));
    let body = json_body(&sink);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/nothing/here");
}

#[test]
fn test_custom_not_found_handler() {
    let mut d = Dispatcher::new();
    d.set_not_found(|req, res| {
        res.send_text(StatusCode::NOT_FOUND, "text/html", &format!("<h1>{} is gone</h1>", req.path))
    });
    let (outcome, sink) = get(&d, "/old");
    assert_eq!(outcome, DispatchOutcome::NotFound);
    assert_eq!(sink.body_string(), "<h1>/old is gone</h1>");
}

#[test]
fn test_malformed_path_is_bad_request() {
    let mut d = Dispatcher::new();
    d.on(Method::GET, "/*any", |_req, res| {
        res.send_text(StatusCode::OK, "text/plain", "ok")
    })
    .unwrap();
    for raw in ["/a%2", "/a%zz", "/%FF"] {
        let (outcome, sink) = get(&d, raw);
        assert_eq!(outcome, DispatchOutcome::BadRequest, "{raw}");
        assert_eq!(sink.status(), Some(StatusCode::BAD_REQUEST));
    }
}

#[test]
fn test_handler_must_respond() {
    let mut d = Dispatcher::new();
    d.on(Method::GET, "/silent", |_req, _res| Ok(())).unwrap();
    let (outcome, sink) = get(&d, "/silent");
    assert_eq!(outcome, DispatchOutcome::Failed(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(sink.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[test]
fn test_handler_error_before_commit() {
    let mut d = Dispatcher::new();
    d.on(Method::GET, "/broken", |_req, res| {
        res.begin_chunked(StatusCode::OK, "text/plain")?;
        Err(ServeError::NotFound)
    })
    .unwrap();
    let (outcome, sink) = get(&d, "/broken");
    assert_eq!(outcome, DispatchOutcome::NotFound);
    assert_eq!(sink.status(), Some(StatusCode::NOT_FOUND));
    assert!(!sink.chunked);
    assert!(!sink.aborted);
}

#[test]
fn test_handler_error_after_commit_aborts() {
    let mut d = Dispatcher::new();
    d.on(Method::GET, "/partial", |_req, res| {
        res.begin_chunked(StatusCode::OK, "text/plain")?;
        res.send_chunk(b"half")?;
        Err(ServeError::Source {
            path: "/x".to_string(),
            source: io::Error::other("disk gone"),
        })
    })
    .unwrap();
    let (outcome, sink) = get(&d, "/partial");
    assert_eq!(outcome, DispatchOutcome::Aborted);
    assert_eq!(sink.status(), Some(StatusCode::OK));
    assert_eq!(sink.body_string(), "half");
    assert!(sink.aborted);
    assert!(!sink.finished);
}

#[test]
fn test_open_chunked_response_is_terminated() {
    let mut d = Dispatcher::new();
    d.on(Method::GET, "/stream", |_req, res| {
        res.begin_chunked(StatusCode::OK, "text/plain")?;
        res.send_chunk(b"a")?;
        res.send_chunk(b"b")
    })
    .unwrap();
    let (outcome, sink) = get(&d, "/stream");
    assert_eq!(outcome, DispatchOutcome::Route);
    assert_eq!(sink.body_string(), "ab");
    assert!(sink.finished);
}

#[test]
fn test_redirect() {
    let mut d = Dispatcher::new();
    d.on(Method::GET, "/old", |_req, res| res.redirect("/new")).unwrap();
    let (_, sink) = get(&d, "/old");
    assert_eq!(sink.status(), Some(StatusCode::FOUND));
    assert_eq!(sink.header("Location"), Some("/new"));
}

#[test]
fn test_gzip_asset_served_with_encoding() {
    let mut d = Dispatcher::new();
    d.serve_static_handler("/", memory_source(&[("/app.js.gz", &b"\x1f\x8bz"[..])]), Arc::new(SendStatic));
    let (outcome, sink) = get(&d, "/app.js");
    assert_eq!(outcome, DispatchOutcome::Static);
    assert_eq!(sink.content_type(), Some("application/javascript"));
    assert_eq!(sink.header("content-encoding"), Some("gzip"));
    assert_eq!(sink.body, b"\x1f\x8bz");
}

#[test]
fn test_html_rendered_through_static_handler() {
    let mut d = Dispatcher::new();
    let vars: Arc<HashMap<String, String>> =
        Arc::new(HashMap::from([("user".to_string(), "<Ann>".to_string())]));
    d.serve_static(
        "/",
        memory_source(&[
            ("/index.html", &b"<html><head></head>{{user}}</html>"[..]),
            ("/raw.txt", &b"{{user}}"[..]),
        ]),
        move |info, req, res| {
            assert_eq!(info.uri, req.uri);
            res.set_template_arc(Arc::clone(&vars) as Arc<dyn TemplateResolver>);
            res.set_head_injection("<script></script>");
            res.send_static()
        },
    );

    let (_, sink) = get(&d, "/");
    assert_eq!(
        sink.body_string(),
        "<html><head><script></script></head>&lt;Ann&gt;</html>"
    );
    assert!(sink.chunked && sink.finished);

    // Only HTML goes through the render engine
    let (_, sink) = get(&d, "/raw.txt");
    assert_eq!(sink.body_string(), "{{user}}");
}

#[test]
fn test_filesystem_mount_streams_in_chunks() {
    let dir = fs_tree(&[("big.txt", &[b'x'; 1000][..])]);
    let config = ServerConfig {
        render_chunk_size: 256,
        ..ServerConfig::default()
    };
    let mut d = Dispatcher::with_config(config);
    d.serve_static_handler("/files", AssetSource::filesystem(dir.path()), Arc::new(SendStatic));

    let (outcome, sink) = get(&d, "/files/big.txt");
    assert_eq!(outcome, DispatchOutcome::Static);
    assert_eq!(sink.body.len(), 1000);
    assert!(sink.chunks.iter().all(|&c| c <= 256));
    assert!(sink.finished);

    let (outcome, _) = get(&d, "/files/../Cargo.toml");
    assert_eq!(outcome, DispatchOutcome::NotFound);
}

#[test]
fn test_transport_failure_mid_render_aborts() {
    let page = format!("<html><head></head>{}</html>", "y".repeat(4000));
    let body: &'static [u8] = Box::leak(page.into_bytes().into_boxed_slice());
    let config = ServerConfig {
        render_chunk_size: 64,
        ..ServerConfig::default()
    };
    let mut d = Dispatcher::with_config(config);
    d.serve_static("/", memory_source(&[("/index.html", body)]), |_info, _req, res| {
        res.set_head_injection("<!--x-->");
        res.send_static()
    });

    let mut sink = RecordingSink::failing_after(2);
    let outcome = d.dispatch(&Method::GET, "/", &mut sink);
    assert_eq!(outcome, DispatchOutcome::Aborted);
    assert!(sink.aborted);
    assert_eq!(sink.status(), Some(StatusCode::OK));
    assert_eq!(sink.body.len(), 128);
}

#[test]
fn test_shared_across_threads() {
    let mut d = Dispatcher::new();
    d.on(Method::GET, "/n/:n", |req, res| {
        res.send_text(StatusCode::OK, "text/plain", req.get_path_param("n").unwrap_or(""))
    })
    .unwrap();
    let d = Arc::new(d);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let d = Arc::clone(&d);
            std::thread::spawn(move || {
                let (_, sink) = get(&d, &format!("/n/{i}"));
                sink.body_string()
            })
        })
        .collect();
    let bodies: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(bodies, vec!["0", "1", "2", "3"]);
}

#[test]
fn test_source_error_before_commit_is_500() {
    let dir = fs_tree(&[("gone.txt", &b"soon"[..])]);
    let root = dir.path().to_path_buf();
    let mut d = Dispatcher::new();
    d.serve_static("/", AssetSource::filesystem(&root), move |_info, _req, res| {
        // Resolved, then removed before it is opened
        std::fs::remove_file(root.join("gone.txt")).map_err(|source| ServeError::Source {
            path: "/gone.txt".to_string(),
            source,
        })?;
        res.send_static()
    });
    let (outcome, sink) = get(&d, "/gone.txt");
    assert_eq!(outcome, DispatchOutcome::Failed(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(sink.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}
