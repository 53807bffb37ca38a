//! Local host harness for the todo handlers.
//!
//! Plays the part of the host runtime: it opens a key-value bucket, injects it into the
//! invocation [`Context`] and invokes handlers by name, one payload at a time or as a stream
//! of `<operation> <payload>` lines.

use std::collections::HashMap;
use std::io::{BufRead, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _};
use tracing::{debug, error, info, instrument};
use wasmcloud_todo_handlers::{Context, HostServices, Operation, ResultEnvelope, TodoConfig};
use wasmcloud_todo_keyvalue::{FsKeyValue, KeyValue, KeyValueStore};

/// Payload used when a request line or argument carries none
pub const EMPTY_PAYLOAD: &[u8] = b"{}";

/// Opens the bucket named in `config`, below `store_dir` if given and in memory otherwise
pub fn open_store(
    store_dir: Option<&Path>,
    config: &TodoConfig,
) -> anyhow::Result<Arc<dyn KeyValueStore + Send + Sync>> {
    match store_dir {
        Some(dir) => {
            let root = dir.join(&config.bucket);
            let kv = FsKeyValue::open(&root)
                .with_context(|| format!("failed to open bucket at `{}`", root.display()))?;
            info!(root = %kv.root().display(), "using filesystem store");
            Ok(Arc::new(kv))
        }
        None => {
            info!(bucket = %config.bucket, "using in-memory store");
            Ok(Arc::new(KeyValue::new()))
        }
    }
}

/// Builds the invocation context for `config` around `kv`
pub fn context(kv: Arc<dyn KeyValueStore + Send + Sync>, config: &TodoConfig) -> Context {
    Context::from_config(HostServices::from_arc(kv), config)
}

/// Builds a [`TodoConfig`] from `key=value` pairs, with `overrides` taking precedence
pub fn load_config(
    pairs: impl IntoIterator<Item = (String, String)>,
    overrides: impl IntoIterator<Item = (&'static str, Option<String>)>,
) -> anyhow::Result<TodoConfig> {
    let mut values: HashMap<String, String> = pairs.into_iter().collect();
    for (key, value) in overrides {
        if let Some(value) = value {
            values.insert(key.to_string(), value);
        }
    }
    TodoConfig::from_map(&values).context("invalid configuration")
}

/// Parses a `key=value` pair
pub fn parse_key_val(s: &str) -> anyhow::Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => bail!("invalid `key=value` pair: `{s}`"),
    }
}

/// Reads a payload argument, where `-` means the raw bytes of `stdin`
pub fn read_payload(arg: &str, mut stdin: impl Read) -> anyhow::Result<Vec<u8>> {
    if arg == "-" {
        let mut buf = Vec::new();
        stdin
            .read_to_end(&mut buf)
            .context("failed to read payload from stdin")?;
        Ok(buf)
    } else {
        Ok(arg.as_bytes().to_vec())
    }
}

/// Splits a request line into its operation and payload.
///
/// Returns `None` for blank lines. A missing payload means [`EMPTY_PAYLOAD`].
pub fn parse_request(line: &[u8]) -> anyhow::Result<Option<(Operation, &[u8])>> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, payload) = match line.iter().position(u8::is_ascii_whitespace) {
        Some(at) => (&line[..at], line[at..].trim_ascii_start()),
        None => (line, EMPTY_PAYLOAD),
    };
    let name = std::str::from_utf8(name).context("operation name is not valid UTF-8")?;
    let op = name.parse()?;
    Ok(Some((op, payload)))
}

/// Invokes `op` once and writes the envelope as a single JSON line
pub fn invoke(
    ctx: &Context,
    op: Operation,
    payload: &[u8],
    mut output: impl Write,
) -> anyhow::Result<ResultEnvelope> {
    let envelope = op.invoke(ctx, payload);
    serde_json::to_writer(&mut output, &envelope).context("failed to encode envelope")?;
    output.write_all(b"\n").context("failed to write envelope")?;
    Ok(envelope)
}

/// Counters reported by [`serve`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub succeeded: usize,
    pub failed: usize,
    pub rejected: usize,
}

/// Handles request lines from `input` until EOF, writing one envelope line per request.
///
/// Lines that do not name a known operation are logged and skipped.
#[instrument(level = "debug", skip_all)]
pub fn serve(
    ctx: &Context,
    input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<ServeStats> {
    let mut stats = ServeStats::default();
    for (n, line) in input.split(b'\n').enumerate() {
        let line = line.context("failed to read request")?;
        let (op, payload) = match parse_request(&line) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => {
                error!(line = n + 1, "skipping request: {err:#}");
                stats.rejected += 1;
                continue;
            }
        };
        debug!(line = n + 1, %op, "handling request");
        if invoke(ctx, op, payload, &mut output)?.is_success() {
            stats.succeeded += 1;
        } else {
            stats.failed += 1;
        }
        output.flush().context("failed to flush output")?;
    }
    Ok(stats)
}
