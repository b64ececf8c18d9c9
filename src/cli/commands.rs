use crate::config::ServerConfig;
use crate::dispatcher::decode_path;
use crate::render::{RenderOptions, Renderer};
use crate::router::Router;
use crate::server::WriteSink;
use crate::static_files::{resolve, AssetSource};
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::json;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing::info;

/// Command-line tools for embedroute
///
/// Inspect static resolution, render templates and test route tables without
/// running a server.
#[derive(Parser, Debug)]
#[command(name = "embedroute", version)]
#[command(about = "embedroute CLI", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true, env = "EMBEDROUTE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a request path against a directory and print the asset descriptor
    Resolve {
        /// Base directory of the filesystem source
        #[arg(long)]
        root: PathBuf,

        /// Request path relative to the mount, e.g. `/docs/`
        path: String,
    },
    /// Stream-render a template file to stdout
    Render {
        file: PathBuf,

        /// Placeholder value as key=value (repeatable)
        #[arg(long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,

        /// Snippet inserted after the first <head> tag
        #[arg(long)]
        inject: Option<String>,

        /// Output chunk size in bytes (overrides the configuration)
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Match a path against a set of route patterns
    Match {
        /// Route as "METHOD PATTERN" (repeatable, registration order)
        #[arg(long = "route", required = true)]
        routes: Vec<String>,

        method: String,

        /// Raw request path, percent-encoded
        path: String,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn parse_method(s: &str) -> anyhow::Result<Method> {
    Method::from_bytes(s.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method '{s}'"))
}

/// Load `--config` (if any) and apply environment overrides.
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ServerConfig> {
    let config = match path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    Ok(config.apply_env())
}

/// Run the parsed command, writing results to stdout.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&cli, &mut out)
}

/// Run the parsed command, writing results to `out`.
pub fn run_command(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())?;
    match &cli.command {
        Commands::Resolve { root, path } => {
            let source = AssetSource::filesystem(root.clone());
            let info = resolve(&source, path, &config);
            let doc = json!({
                "content_type": info.content_type(),
                "info": info,
            });
            serde_json::to_writer_pretty(&mut *out, &doc)?;
            writeln!(out)?;
            Ok(())
        }
        Commands::Render {
            file,
            vars,
            inject,
            chunk_size,
        } => {
            let template = File::open(file)
                .with_context(|| format!("failed to open template {}", file.display()))?;
            let mut options = RenderOptions::from(&config);
            if let Some(size) = chunk_size {
                options.chunk_size = (*size).max(1);
            }
            let values: HashMap<String, String> = vars.iter().cloned().collect();
            let mut renderer = Renderer::new(options);
            if !values.is_empty() {
                renderer = renderer.with_resolver(&values);
            }
            if let Some(snippet) = inject {
                renderer = renderer.with_head_injection(snippet);
            }

            let mut reader = BufReader::new(template);
            let mut sink = WriteSink::new(out);
            let stats = renderer
                .render(&mut reader, &mut sink)
                .with_context(|| format!("failed to render {}", file.display()))?;
            info!(
                file = %file.display(),
                bytes_written = stats.bytes_written,
                substitutions = stats.substitutions,
                unresolved = stats.unresolved,
                injected = stats.injected,
                "Rendered template"
            );
            Ok(())
        }
        Commands::Match {
            routes,
            method,
            path,
        } => {
            let mut router: Router<String> = Router::new();
            for entry in routes {
                let (m, pattern) = entry
                    .trim()
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("route '{entry}' must look like \"GET /path\""))?;
                let pattern = pattern.trim();
                router
                    .register(parse_method(m)?, pattern, pattern.to_string())
                    .with_context(|| format!("invalid route '{entry}'"))?;
            }
            router.dump_routes();

            let method = parse_method(method)?;
            let raw_path = path.split_once('?').map_or(path.as_str(), |(p, _)| p);
            let decoded = decode_path(raw_path)?;
            let doc = match router.route_path(&method, &decoded) {
                Some(m) => {
                    let params: Vec<(&str, &str)> = m
                        .path_params
                        .iter()
                        .map(|(k, v)| (k.as_ref(), v.as_str()))
                        .collect();
                    json!({
                        "matched": true,
                        "pattern": m.route.handler,
                        "score": m.route.score(),
                        "params": params,
                    })
                }
                None => json!({ "matched": false, "path": decoded }),
            };
            serde_json::to_writer_pretty(&mut *out, &doc)?;
            writeln!(out)?;
            Ok(())
        }
    }
}
