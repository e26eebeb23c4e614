mod renderer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use folio_flow_core::{Coordinator, FlowConfig};
use folio_flow_protocol::{Environment, PageSnapshot};
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "Usage: folio-flow <layout.json> [--config <config.json>] [--log <file>] [--reduced-motion]";

struct Args {
    layout: PathBuf,
    config: Option<PathBuf>,
    log: Option<PathBuf>,
    reduced_motion: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut layout = None;
    let mut config = None;
    let mut log = None;
    let mut reduced_motion = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().context(USAGE)?)),
            "--log" => log = Some(PathBuf::from(args.next().context(USAGE)?)),
            "--reduced-motion" => reduced_motion = true,
            "-h" | "--help" => bail!(USAGE),
            _ if layout.is_none() => layout = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument `{arg}`\n{USAGE}"),
        }
    }

    Ok(Args {
        layout: layout.context(USAGE)?,
        config,
        log,
        reduced_motion,
    })
}

/// Logs go to a file: the terminal belongs to the preview.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args()?;
    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let data = std::fs::read_to_string(&args.layout)
        .with_context(|| format!("cannot read {}", args.layout.display()))?;
    let snapshot: PageSnapshot = serde_json::from_str(&data)
        .with_context(|| format!("{} is not a page layout", args.layout.display()))?;

    let config = match &args.config {
        Some(path) => FlowConfig::from_json(
            &std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?,
        )?,
        None => FlowConfig::default(),
    };
    let env = Environment {
        reduced_motion: args.reduced_motion,
        touch_capable: false,
    };

    let coordinator = Coordinator::new(config, env, snapshot.clone())?;
    tracing::info!(layout = %args.layout.display(), "preview starting");
    renderer::run_preview(coordinator, snapshot)
}
