use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use todo_core::cli::{KeyVal, init_tracing};
use todo_core::config::Config;
use todo_server::WebRoot;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "todo-server", version, about = "Static host for the to-do list front-end")]
struct Args {
    #[arg(long = "config")]
    config: Option<PathBuf>,

    #[arg(long)]
    listen: Option<SocketAddr>,

    #[arg(long)]
    root: Option<PathBuf>,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    rc_overrides: Vec<KeyVal>,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    quiet: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet, "info")?;

    let mut cfg = Config::load(args.config.as_deref())?;
    cfg.apply_overrides(
        args.rc_overrides
            .into_iter()
            .map(|kv| (kv.key, kv.value)),
    );

    let listen = match args.listen {
        Some(addr) => addr,
        None => cfg.listen_addr()?,
    };
    let root = args.root.unwrap_or_else(|| cfg.web_root());
    if !root.is_dir() {
        warn!(root = %root.display(), "web root does not exist yet; requests will 404");
    }
    let web_root = WebRoot::new(root, cfg.index_document()?);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    info!("todo-server listening on http://{listen}");

    todo_server::serve(listener, web_root).await
}
