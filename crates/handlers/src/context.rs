use core::fmt::{self, Debug};

use std::sync::Arc;

use wasmcloud_todo_keyvalue::KeyValueStore;

use crate::{PayloadCodec, TodoConfig, Utf8};

/// Capabilities the host makes available to a handler invocation
#[derive(Clone)]
pub struct HostServices {
    kv: Arc<dyn KeyValueStore + Send + Sync>,
}

impl HostServices {
    pub fn new(kv: impl KeyValueStore + Send + Sync + 'static) -> Self {
        Self { kv: Arc::new(kv) }
    }

    /// Shares an already reference-counted store, e.g. one the host also inspects
    pub fn from_arc(kv: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        Self { kv }
    }

    /// The key-value capability
    pub fn kv(&self) -> &(dyn KeyValueStore + Send + Sync) {
        self.kv.as_ref()
    }
}

impl Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices")
            .field("kv", &"KeyValueStore")
            .finish()
    }
}

/// Invocation context passed to every handler
#[derive(Clone)]
pub struct Context {
    host_services: HostServices,
    codec: Arc<dyn PayloadCodec + Send + Sync>,
}

impl Context {
    /// Builds a context decoding with strict [`Utf8`]
    pub fn new(host_services: HostServices) -> Self {
        Self {
            host_services,
            codec: Arc::new(Utf8),
        }
    }

    pub fn from_config(host_services: HostServices, config: &TodoConfig) -> Self {
        Self {
            host_services,
            codec: config.codec.codec(),
        }
    }

    #[must_use]
    pub fn with_codec(self, codec: impl PayloadCodec + Send + Sync + 'static) -> Self {
        Self {
            codec: Arc::new(codec),
            ..self
        }
    }

    pub fn host_services(&self) -> &HostServices {
        &self.host_services
    }

    pub fn codec(&self) -> &dyn PayloadCodec {
        self.codec.as_ref()
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("host_services", &self.host_services)
            .field("codec", &self.codec.name())
            .finish()
    }
}
