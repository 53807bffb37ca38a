use std::collections::HashMap;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::CodecKind;

pub const DEFAULT_BUCKET: &str = "default";

pub const CONFIG_BUCKET: &str = "bucket";
pub const CONFIG_CODEC: &str = "codec";

fn default_bucket() -> String {
    DEFAULT_BUCKET.into()
}

/// Configuration of the todo handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Key-value bucket todos are kept in
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Codec applied to payloads and stored records
    #[serde(default)]
    pub codec: CodecKind,
}

impl Default for TodoConfig {
    fn default() -> TodoConfig {
        TodoConfig {
            bucket: default_bucket(),
            codec: CodecKind::default(),
        }
    }
}

impl TodoConfig {
    /// Construct configuration from named config values, e.g. `bucket=todos`
    pub fn from_map(values: &HashMap<String, String>) -> Result<TodoConfig> {
        let mut config = TodoConfig::default();

        if let Some(bucket) = values.get(CONFIG_BUCKET) {
            if bucket.is_empty() {
                anyhow::bail!("configuration item `{CONFIG_BUCKET}` must not be empty");
            }
            config.bucket.clone_from(bucket);
        }
        if let Some(codec) = values.get(CONFIG_CODEC) {
            config.codec = codec
                .parse()
                .with_context(|| format!("invalid configuration item `{CONFIG_CODEC}`"))?;
        }
        Ok(config)
    }
}
