use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use data_encoding::BASE64URL_NOPAD;
use tracing::{debug, instrument, warn};

use crate::{KeyValueStore, Result, StoreError};

/// Monotonic suffix for temporary files, so concurrent writers in one process never share one
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Longest file or directory name a single encoded key segment occupies
const SEGMENT_LEN: usize = 200;

/// Marks a directory holding the continuation of longer encoded keys. It is outside of the
/// base64url alphabet, so such a directory never collides with a key file.
const DIR_SUFFIX: char = '~';

/// Directory-backed [`KeyValueStore`] implementation
///
/// File names are the base64url encoding of the key, so no key can address a path outside of
/// the root. Encodings longer than 200 characters are split across nested directories, which
/// keeps every name within file system limits; only the platform's total path length bounds
/// the key size.
#[derive(Debug, Clone)]
pub struct FsKeyValue {
    root: PathBuf,
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn encode_key(key: &str) -> String {
    BASE64URL_NOPAD.encode(key.as_bytes())
}

fn decode_key(encoded: &str) -> Option<String> {
    let key = BASE64URL_NOPAD.decode(encoded.as_bytes()).ok()?;
    String::from_utf8(key).ok()
}

/// Writes `value` to a fresh file at `path`, removing it again if the write fails
fn write_new(path: &Path, value: &[u8]) -> Result<()> {
    if let Err(err) = std::fs::write(path, value) {
        let _ = std::fs::remove_file(path);
        return Err(io_error(path)(err));
    }
    Ok(())
}

fn collect_keys(dir: &Path, prefix: &str, keys: &mut Vec<String>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(io_error(dir))?;
    for entry in entries {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            warn!(file = %path.display(), "skipping file that does not name a key");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let file_type = entry.file_type().map_err(io_error(&path))?;
        if file_type.is_dir() {
            if let Some(segment) = name.strip_suffix(DIR_SUFFIX) {
                collect_keys(&path, &format!("{prefix}{segment}"), keys)?;
            }
        } else if file_type.is_file() {
            match decode_key(&format!("{prefix}{name}")) {
                Some(key) => keys.push(key),
                None => warn!(
                    file = %path.display(),
                    "skipping file that does not name a key"
                ),
            }
        }
    }
    Ok(())
}

impl FsKeyValue {
    /// Opens the bucket rooted at `root`, creating the directory if it does not exist
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(io_error(&root))?;
        debug!(root = %root.display(), "opened filesystem bucket");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let encoded = encode_key(key);
        let mut path = self.root.clone();
        let mut rest = encoded.as_str();
        // base64url is ASCII, so every byte offset is a char boundary
        while rest.len() > SEGMENT_LEN {
            let (segment, tail) = rest.split_at(SEGMENT_LEN);
            path.push(format!("{segment}{DIR_SUFFIX}"));
            rest = tail;
        }
        path.push(rest);
        Ok(path)
    }
}

impl KeyValueStore for FsKeyValue {
    #[instrument(level = "trace", skip(self))]
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key)?;
        match std::fs::read(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    #[instrument(level = "trace", skip(self, value), fields(len = value.len()))]
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path(key)?;
        if let Some(parent) = path.parent().filter(|parent| *parent != self.root) {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        // dot-prefixed names are outside of the base64url alphabet and never listed as keys
        let tmp = self.root.join(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        write_new(&tmp, value)?;
        if let Err(err) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_error(&path)(err));
        }
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        collect_keys(&self.root, "", &mut keys)?;
        keys.sort();
        Ok(keys)
    }
}
