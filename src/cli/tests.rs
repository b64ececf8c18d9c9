//! Unit tests for CLI commands

use crate::cli::{run_command, Cli, Commands};
use clap::Parser;
use serde_json::Value;
use std::fs;

fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
    let mut out = Vec::new();
    run_command(&cli, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_render_command_parses_vars() {
    let cli = Cli::try_parse_from([
        "embedroute",
        "render",
        "page.html",
        "--var",
        "title=A=B",
        "--var",
        "name=Ann",
        "--chunk-size",
        "16",
    ])
    .unwrap();

    match cli.command {
        Commands::Render {
            file,
            vars,
            inject,
            chunk_size,
        } => {
            assert_eq!(file.to_string_lossy(), "page.html");
            assert_eq!(
                vars,
                vec![
                    ("title".to_string(), "A=B".to_string()),
                    ("name".to_string(), "Ann".to_string())
                ]
            );
            assert!(inject.is_none());
            assert_eq!(chunk_size, Some(16));
        }
        _ => panic!("Expected Render command"),
    }
}

#[test]
fn test_render_var_requires_equals() {
    assert!(Cli::try_parse_from(["embedroute", "render", "x.html", "--var", "title"]).is_err());
}

#[test]
fn test_match_requires_route() {
    assert!(Cli::try_parse_from(["embedroute", "match", "GET", "/"]).is_err());
}

#[test]
fn test_match_command_output() {
    let out = run(&[
        "embedroute",
        "match",
        "--route",
        "GET /users/:id",
        "--route",
        "GET /users/new",
        "get",
        "/users/new",
    ]);
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["matched"], true);
    assert_eq!(doc["pattern"], "/users/new");
    assert_eq!(doc["score"], 6);
}

#[test]
fn test_match_command_decodes_and_binds() {
    let out = run(&[
        "embedroute",
        "match",
        "--route",
        "GET /files/*rest",
        "GET",
        "/files/a%20b/c",
    ]);
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["params"][0][0], "rest");
    assert_eq!(doc["params"][0][1], "a b/c");
}

#[test]
fn test_resolve_command_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/index.html"), "<html></html>").unwrap();
    let root = dir.path().to_string_lossy().to_string();

    let out = run(&["embedroute", "resolve", "--root", root.as_str(), "/docs"]);
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["info"]["exists"], true);
    assert_eq!(doc["info"]["is_dir"], true);
    assert_eq!(doc["info"]["storage_path"], "/docs/index.html");
    assert_eq!(doc["content_type"], "text/html");
}

#[test]
fn test_render_command_output() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, "<head></head>{{title}} {{{raw}}} {{other}}").unwrap();
    let page = page.to_string_lossy().to_string();

    let out = run(&[
        "embedroute",
        "render",
        page.as_str(),
        "--var",
        "title=A & B",
        "--var",
        "raw=<i>",
        "--inject",
        "<!--X-->",
        "--chunk-size",
        "3",
    ]);
    assert_eq!(out, "<head><!--X--></head>A &amp; B <i> {{other}}");
}
