//! Shared payloads and client builders for API contract tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file
//! in `tests/`), so this file is pulled in with:
//!
//! ```rust
//! #[path = "common/fixtures.rs"]
//! mod fixtures;
//! ```

use camino::Utf8PathBuf;
use lambdacloud::{LambdaApi, MapEnv, TokenResolver, TokenStore};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

/// Client pointed at a mock server, with its own token directory.
pub struct TestClient {
    pub api: LambdaApi<MapEnv>,
    pub store: TokenStore,
    _tmp: TempDir,
}

/// Builds a client for `server` that resolves tokens from `env` and a fresh
/// temporary token file.
pub fn client_for(server: &MockServer, env: MapEnv) -> TestClient {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let dir = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temp path should be utf8: {}", path.display()));
    let store = TokenStore::in_dir(dir);
    let api = LambdaApi::new(
        Some(&server.uri()),
        None,
        TokenResolver::new(store.clone(), env),
    )
    .unwrap_or_else(|err| panic!("client: {err}"));
    TestClient {
        api,
        store,
        _tmp: tmp,
    }
}

pub fn region(name: &str) -> Value {
    json!({"name": name, "description": format!("{name} description")})
}

pub fn instance_type_entry(name: &str, cents: u64, regions: &[&str]) -> Value {
    json!({
        "instance_type": {
            "name": name,
            "description": format!("{name} description"),
            "price_cents_per_hour": cents,
            "specs": {"vcpus": 30, "memory_gib": 200, "storage_gib": 512}
        },
        "regions_with_capacity_available": regions
            .iter()
            .map(|name| region(name))
            .collect::<Vec<_>>()
    })
}

/// Listing with a type that has capacity in two regions, one without
/// capacity, and one with capacity in a single region, in that order. The
/// body is assembled by hand because `json!` objects sort their keys.
pub fn instance_types_body() -> String {
    format!(
        r#"{{"data": {{"gpu_1x_a10": {}, "gpu_8x_h100": {}, "cpu_4x_general": {}}}}}"#,
        instance_type_entry("gpu_1x_a10", 60, &["us-east-1", "us-west-1"]),
        instance_type_entry("gpu_8x_h100", 2_399, &[]),
        instance_type_entry("cpu_4x_general", 12, &["europe-central-1"])
    )
}

pub fn instance(id: &str) -> Value {
    json!({
        "id": id,
        "name": "training",
        "ip": "198.51.100.2",
        "status": "active",
        "ssh_key_names": ["laptop"],
        "file_system_names": [],
        "region": region("us-east-1"),
        "instance_type": {
            "name": "gpu_1x_a10",
            "description": "1x A10 (24 GB PCIe)",
            "price_cents_per_hour": 60,
            "specs": {"vcpus": 30}
        },
        "hostname": "198-51-100-2.cloud.lambdalabs.com",
        "jupyter_token": "jt",
        "jupyter_url": "https://jupyter.example"
    })
}

pub fn ssh_key(id: &str, name: &str, public_key: &str) -> Value {
    json!({"id": id, "name": name, "public_key": public_key})
}
