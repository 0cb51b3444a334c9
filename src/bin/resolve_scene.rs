//! Resolves a scene document and prints the result as JSON.
//!
//! ```text
//! resolve-scene <scene.json> [--timeout-ms N] [--sequential]
//! ```
//!
//! Warnings go to the log (`RUST_LOG` controls verbosity), the resolved scene
//! to stdout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use haggis_scene::config::ResolveOptions;
use haggis_scene::vars::FsLoader;
use haggis_scene::SceneResolver;

const USAGE: &str = "usage: resolve-scene <scene.json> [--timeout-ms N] [--sequential]";

struct Args {
    scene: PathBuf,
    options: ResolveOptions,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut scene = None;
    let mut options = ResolveOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--timeout-ms" => {
                let value = args.next().context("--timeout-ms needs a value")?;
                let millis: u64 = value
                    .parse()
                    .with_context(|| format!("invalid --timeout-ms value '{value}'"))?;
                options = options.with_load_timeout(Duration::from_millis(millis));
            }
            "--sequential" => options = options.with_concurrent_loads(false),
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'\n{USAGE}"),
            path if scene.is_none() => scene = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument '{extra}'\n{USAGE}"),
        }
    }

    Ok(Args {
        scene: scene.context(USAGE)?,
        options,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    let resolver = SceneResolver::new(Arc::new(FsLoader::new()), args.options);

    let resolution = resolver
        .resolve_file(&args.scene)
        .with_context(|| format!("failed to resolve {}", args.scene.display()))?;

    for warning in &resolution.warnings {
        log::warn!("{warning}");
    }

    let stats = resolution.scene.statistics();
    log::info!(
        "{} objects ({} lights, {} inline materials), {} named materials, {} models, {} constants",
        stats.object_count,
        stats.light_count,
        stats.inline_material_count,
        stats.named_material_count,
        stats.model_count,
        stats.constant_count
    );

    let json = serde_json::to_string_pretty(&resolution)?;
    println!("{json}");
    Ok(())
}
