// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` shader bake tool.
//!
//! Decodes an encoded shader graph, flattens it and prints the renderer
//! representation as RON on stdout:
//!
//! ```text
//! ordoplay_shader_bake <graph.json> [--config <settings.ron>]
//! ```
//!
//! Entries the decoder has to skip are logged to stderr and do not fail the
//! bake.

use ordoplay_shader_graph::{create_shader_registry, decode, flatten, ConfigError, GraphSettings};
use std::path::PathBuf;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, thiserror::Error)]
enum BakeError {
    #[error("usage: ordoplay_shader_bake <graph.json> [--config <settings.ron>]")]
    Usage,

    #[error("Failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to render output: {0}")]
    Render(#[from] ron::Error),
}

#[derive(Debug, PartialEq)]
struct Args {
    graph: PathBuf,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, BakeError> {
        let mut graph = None;
        let mut config = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(args.next().ok_or(BakeError::Usage)?)),
                _ if arg.starts_with('-') || graph.is_some() => return Err(BakeError::Usage),
                _ => graph = Some(PathBuf::from(arg)),
            }
        }
        Ok(Self {
            graph: graph.ok_or(BakeError::Usage)?,
            config,
        })
    }
}

fn run(args: Args) -> Result<(), BakeError> {
    let settings = match &args.config {
        Some(path) => GraphSettings::load(path)?,
        None => GraphSettings::default(),
    };

    let text = std::fs::read_to_string(&args.graph).map_err(|source| BakeError::Read {
        path: args.graph.clone(),
        source,
    })?;

    let registry = create_shader_registry();
    let decoded = decode(&text, &registry);
    if !decoded.is_complete() {
        tracing::warn!("{} entries of {:?} were skipped", decoded.issues.len(), args.graph);
    }

    let flat = flatten(&decoded.graph, &settings.flatten);
    let pretty = ron::ser::PrettyConfig::default()
        .struct_names(true)
        .enumerate_arrays(false);
    println!("{}", ron::ser::to_string_pretty(&flat, pretty)?);

    tracing::info!(
        "Baked {} nodes and {} connections from {:?}",
        flat.nodes.len(),
        flat.connections.len(),
        args.graph
    );
    Ok(())
}

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["ordoplay_shader_bake=info", "ordoplay_shader_graph=warn"] {
        if let Ok(directive) = directive.parse::<Directive>() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = Args::parse(std::env::args().skip(1)).and_then(run) {
        tracing::error!("Bake failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, BakeError> {
        Args::parse(list.iter().map(ToString::to_string))
    }

    #[test]
    fn test_parse_graph_only() {
        let parsed = args(&["material.json"]).unwrap();
        assert_eq!(parsed, Args { graph: PathBuf::from("material.json"), config: None });
    }

    #[test]
    fn test_parse_config_either_side() {
        let expected = Args {
            graph: PathBuf::from("material.json"),
            config: Some(PathBuf::from("bake.ron")),
        };
        assert_eq!(args(&["material.json", "--config", "bake.ron"]).unwrap(), expected);
        assert_eq!(args(&["--config", "bake.ron", "material.json"]).unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_bad_usage() {
        assert!(matches!(args(&[]), Err(BakeError::Usage)));
        assert!(matches!(args(&["a.json", "b.json"]), Err(BakeError::Usage)));
        assert!(matches!(args(&["a.json", "--config"]), Err(BakeError::Usage)));
        assert!(matches!(args(&["--verbose", "a.json"]), Err(BakeError::Usage)));
    }

    #[test]
    fn test_missing_graph_file_is_an_error() {
        let result = run(Args {
            graph: PathBuf::from("/nonexistent/ordoplay/graph.json"),
            config: None,
        });
        assert!(matches!(result, Err(BakeError::Read { .. })));
    }
}
