//! End-to-end behaviour of the `create` and `read` handlers against both store backends

use std::sync::Arc;
use std::thread;

use anyhow::Context as _;
use serde_json::json;
use test_case::test_case;
use wasmcloud_todo::{context, open_store};
use wasmcloud_todo_handlers::{
    Context, ErrorKind, HostServices, Operation, ResultEnvelope, TodoConfig,
};
use wasmcloud_todo_keyvalue::KeyValueStore;
use wasmcloud_todo_test_util::{Call, RecordingStore};

#[derive(Clone, Copy, Debug)]
enum Backend {
    Memory,
    Fs,
}

type Store = Arc<dyn KeyValueStore + Send + Sync>;

struct Harness {
    store: RecordingStore<Store>,
    ctx: Context,
    _dir: Option<tempfile::TempDir>,
}

impl Harness {
    fn new(backend: Backend) -> anyhow::Result<Self> {
        let config = TodoConfig::default();
        let (kv, dir) = match backend {
            Backend::Memory => (open_store(None, &config)?, None),
            Backend::Fs => {
                let dir = tempfile::tempdir().context("failed to create store dir")?;
                (open_store(Some(dir.path()), &config)?, Some(dir))
            }
        };
        let store = RecordingStore::new(kv);
        let ctx = Context::from_config(HostServices::new(store.clone()), &config);
        Ok(Self {
            store,
            ctx,
            _dir: dir,
        })
    }

    fn create(&self, payload: impl AsRef<[u8]>) -> ResultEnvelope {
        Operation::Create.invoke(&self.ctx, payload.as_ref())
    }

    fn read(&self, payload: impl AsRef<[u8]>) -> ResultEnvelope {
        Operation::Read.invoke(&self.ctx, payload.as_ref())
    }
}

#[test_case(Backend::Memory; "memory")]
#[test_case(Backend::Fs; "filesystem")]
fn round_trip_is_byte_exact(backend: Backend) -> anyhow::Result<()> {
    let h = Harness::new(backend)?;
    let todo = r#"{ "id": "write-docs", "name": "Write docs",  "tags": ["ünïcødé", 1.50] }"#;

    let created = h.create(todo);
    assert_eq!(
        serde_json::to_value(&created)?,
        json!({ "id": "write-docs", "status": "success" })
    );

    let read = h.read(r#"{"id":"write-docs"}"#);
    assert_eq!(
        read,
        ResultEnvelope::Todo {
            todo: todo.to_string()
        }
    );
    Ok(())
}

#[test_case(Backend::Memory; "memory")]
#[test_case(Backend::Fs; "filesystem")]
fn lists_all_created_ids(backend: Backend) -> anyhow::Result<()> {
    let h = Harness::new(backend)?;
    for id in ["c", "a", "b"] {
        assert!(h.create(format!(r#"{{"id":"{id}"}}"#)).is_success());
    }

    let ResultEnvelope::Keys { mut keys } = h.read("{}") else {
        anyhow::bail!("expected a key listing");
    };
    keys.sort();
    assert_eq!(keys, ["a", "b", "c"]);
    Ok(())
}

#[test_case(Backend::Memory; "memory")]
#[test_case(Backend::Fs; "filesystem")]
fn overwrite_keeps_latest(backend: Backend) -> anyhow::Result<()> {
    let h = Harness::new(backend)?;
    assert!(h.create(r#"{"id":"a","rev":1}"#).is_success());
    assert!(h.create(r#"{"id":"a","rev":2}"#).is_success());

    assert_eq!(
        h.read(r#"{"id":"a"}"#),
        ResultEnvelope::Todo {
            todo: r#"{"id":"a","rev":2}"#.into()
        }
    );
    assert_eq!(h.store.inner().keys()?, ["a"]);
    Ok(())
}

#[test_case(Backend::Memory; "memory")]
#[test_case(Backend::Fs; "filesystem")]
fn malformed_payloads_do_not_mutate(backend: Backend) -> anyhow::Result<()> {
    let h = Harness::new(backend)?;
    for (payload, kind) in [
        (&b"\xc0\xaf"[..], ErrorKind::Decode),
        (&b"{\"id\": \"a\""[..], ErrorKind::Parse),
        (&b"{\"name\":\"no id\"}"[..], ErrorKind::InvalidPayload),
    ] {
        let envelope = h.create(payload);
        assert_eq!(
            envelope.failure().map(|failure| failure.kind),
            Some(kind),
            "{envelope:?}"
        );
        assert_eq!(serde_json::to_value(&envelope)?["status"], "failed");
    }
    assert!(h.store.mutations().is_empty());
    assert!(h.store.inner().keys()?.is_empty());
    Ok(())
}

#[test_case(Backend::Memory; "memory")]
#[test_case(Backend::Fs; "filesystem")]
fn unknown_id_is_a_failure(backend: Backend) -> anyhow::Result<()> {
    let h = Harness::new(backend)?;
    let envelope = h.read(r#"{"id":"missing"}"#);
    let failure = envelope.failure().context("expected failure")?;
    assert_eq!(failure.kind, ErrorKind::Store);
    assert!(failure.message.contains("missing"));
    Ok(())
}

#[test_case(Backend::Memory; "memory")]
#[test_case(Backend::Fs; "filesystem")]
fn long_ids_round_trip(backend: Backend) -> anyhow::Result<()> {
    let h = Harness::new(backend)?;
    let id = "x".repeat(400);
    let todo = format!(r#"{{"id":"{id}","name":"long"}}"#);

    assert_eq!(
        serde_json::to_value(h.create(&todo))?,
        json!({ "id": &id, "status": "success" })
    );
    assert_eq!(
        h.read(format!(r#"{{"id":"{id}"}}"#)),
        ResultEnvelope::Todo { todo }
    );
    assert_eq!(h.read("{}"), ResultEnvelope::Keys { keys: vec![id] });
    Ok(())
}

#[test_case(Backend::Memory, "1.0", "1"; "whole float")]
#[test_case(Backend::Fs, "1.0", "1"; "whole float on filesystem")]
#[test_case(Backend::Memory, "1e2", "100"; "exponent")]
#[test_case(Backend::Fs, "1e2", "100"; "exponent on filesystem")]
fn equivalent_numeric_ids_share_a_record(
    backend: Backend,
    created: &str,
    read: &str,
) -> anyhow::Result<()> {
    let h = Harness::new(backend)?;
    let todo = format!(r#"{{"id":{created}}}"#);
    assert!(h.create(&todo).is_success());

    assert_eq!(
        h.read(format!(r#"{{"id":{read}}}"#)),
        ResultEnvelope::Todo { todo }
    );
    assert_eq!(
        h.read("{}"),
        ResultEnvelope::Keys {
            keys: vec![read.to_string()]
        }
    );
    Ok(())
}

#[test]
fn handlers_touch_only_their_key() -> anyhow::Result<()> {
    let h = Harness::new(Backend::Memory)?;
    assert!(h.create(r#"{"id":"a"}"#).is_success());
    assert!(h.create(r#"{"id":7,"n":1}"#).is_success());
    assert!(h.read(r#"{"id":"a"}"#).is_success());
    assert!(h.read("{}").is_success());

    assert_eq!(
        h.store.mutations(),
        [
            Call::Set {
                key: "a".into(),
                value: br#"{"id":"a"}"#.to_vec(),
            },
            Call::Set {
                key: "7".into(),
                value: br#"{"id":7,"n":1}"#.to_vec(),
            },
        ]
    );
    Ok(())
}

#[test]
fn concurrent_creates_are_all_stored() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = TodoConfig::default();
    let kv = open_store(Some(dir.path()), &config)?;
    let ctx = context(Arc::clone(&kv), &config);

    thread::scope(|s| {
        for worker in 0..4 {
            let ctx = ctx.clone();
            s.spawn(move || {
                for n in 0..25 {
                    let payload = format!(r#"{{"id":"{worker}-{n}"}}"#);
                    assert!(Operation::Create.invoke(&ctx, payload.as_bytes()).is_success());
                }
            });
        }
    });

    assert_eq!(kv.keys()?.len(), 100);
    Ok(())
}

#[test]
fn buckets_are_isolated() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let first = TodoConfig {
        bucket: "first".into(),
        ..Default::default()
    };
    let second = TodoConfig {
        bucket: "second".into(),
        ..Default::default()
    };
    let first_ctx = context(open_store(Some(dir.path()), &first)?, &first);
    let second_ctx = context(open_store(Some(dir.path()), &second)?, &second);

    assert!(Operation::Create
        .invoke(&first_ctx, br#"{"id":"a"}"#)
        .is_success());
    assert_eq!(
        Operation::Read.invoke(&second_ctx, b"{}"),
        ResultEnvelope::Keys { keys: vec![] }
    );
    assert!(dir.path().join("first").is_dir());
    Ok(())
}
