#![allow(dead_code)]

use std::{fs, path::Path};

use assert_cmd::{assert::Assert, Command};
use serde_json::{json, Value};
use tempfile::TempDir;

pub fn nft() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("nft");
    cmd.env_remove("NFT_DIR")
        .env_remove("NFT_PLATFORM")
        .env("NO_COLOR", "1");
    cmd
}

pub fn write_sidecar(dir: &Path, file_name: &str, value: &Value) {
    fs::write(dir.join(file_name), serde_json::to_vec_pretty(value).expect("json"))
        .expect("write sidecar");
}

pub fn sidecar(platform: &str, objects: Value, executable: &str) -> Value {
    json!({
        "objectDigests": objects,
        "executableDigest": executable,
        "machine": "x86_64",
        "platform": platform,
        "flags": {"opt": "noopt"},
        "compiler": "gcc"
    })
}

/// `simple` for linux (with artifacts on disk) and `waitthread` for darwin.
pub fn prepare_fixture() -> TempDir {
    let temp = tempfile::Builder::new()
        .prefix("nft-cli")
        .tempdir()
        .expect("tempdir");
    write_sidecar(
        temp.path(),
        "simple.json.v3",
        &json!({
            "configName": "debug-noopt-dynamic",
            "baseName": "simple",
            "objectSuffix": ".o",
            "objectDigests": {"main": "aaaa"},
            "executableSuffix": "",
            "executableDigest": "bbbb",
            "machine": "x86_64",
            "platform": "linux",
            "flags": {},
            "compiler": "gcc"
        }),
    );
    fs::write(temp.path().join("simple.main.aaaa.o"), b"obj").expect("object");
    fs::write(temp.path().join("simple.bbbb"), b"exe").expect("executable");
    write_sidecar(
        temp.path(),
        "waitthread.json.v1",
        &sidecar("darwin", json!({"waitthread": "cccc"}), "dddd"),
    );
    temp
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn stdout(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout")
}
