#![warn(clippy::pedantic)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::prelude::*;
use wasmcloud_todo::{context, invoke, load_config, open_store, parse_key_val, read_payload, serve};
use wasmcloud_todo_handlers::{Operation, CONFIG_BUCKET, CONFIG_CODEC};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding one sub-directory per bucket; todos are kept in memory if omitted
    #[arg(long, env = "TODO_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Bucket todos are kept in
    #[arg(long, env = "TODO_BUCKET")]
    bucket: Option<String>,

    /// Payload codec, `utf8` or `utf8-lossy`
    #[arg(long, env = "TODO_CODEC")]
    codec: Option<String>,

    /// Named configuration value, may be repeated
    #[arg(short = 'c', long = "config", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    config: Vec<(String, String)>,

    /// Emit logs as JSON
    #[arg(long, env = "TODO_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a todo under the payload's `id`
    Create {
        /// JSON payload, or `-` to read it from stdin
        payload: String,
    },
    /// Read a todo by `id`, or list all ids
    Read {
        /// JSON payload, or `-` to read it from stdin
        #[arg(default_value = "{}")]
        payload: String,
    },
    /// Handle `<operation> <payload>` lines from stdin until EOF
    Serve,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .without_time()
                    .with_writer(io::stderr),
            )
            .with(filter)
            .init();
    }

    let config = load_config(
        args.config,
        [(CONFIG_BUCKET, args.bucket), (CONFIG_CODEC, args.codec)],
    )?;
    let kv = open_store(args.store_dir.as_deref(), &config)?;
    let ctx = context(kv, &config);

    let (op, payload) = match args.command {
        Command::Create { payload } => (Operation::Create, payload),
        Command::Read { payload } => (Operation::Read, payload),
        Command::Serve => {
            let stats = serve(&ctx, io::stdin().lock(), io::stdout().lock())?;
            info!(?stats, "input exhausted");
            return Ok(ExitCode::SUCCESS);
        }
    };
    let payload = read_payload(&payload, io::stdin().lock())?;
    let envelope = invoke(&ctx, op, &payload, io::stdout().lock())
        .with_context(|| format!("failed to invoke `{op}`"))?;
    Ok(if envelope.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
