use std::{fs, fs::File, io::Write};

use zip::write::FileOptions;

mod common;

use common::{nft, parse_json, prepare_fixture, stdout};

#[test]
fn module_renders_exec_path_constants() {
    let fixture = prepare_fixture();
    let assert = nft()
        .arg("--dir")
        .arg(fixture.path())
        .args(["--platform", "any", "module", "simple", "waitthread"])
        .assert()
        .success();
    let source = stdout(&assert);
    let simple = fixture.path().join("simple.bbbb");
    assert!(
        source.contains(&format!(
            "pub const SIMPLE_EXEC_PATH: &str = {:?};",
            simple.display().to_string()
        )),
        "{source}"
    );
    assert!(source.contains("pub const WAITTHREAD_EXEC_PATH"), "{source}");
}

#[test]
fn module_writes_to_file() {
    let fixture = prepare_fixture();
    let out = fixture.path().join("native_file_tests.rs");
    nft()
        .arg("--dir")
        .arg(fixture.path())
        .args(["--platform", "linux", "module", "simple", "--out"])
        .arg(&out)
        .assert()
        .success();
    let written = fs::read_to_string(&out).expect("module written");
    assert!(written.starts_with("// @generated by nft"));
    assert!(written.contains("SIMPLE_EXEC_PATH"));
}

#[test]
fn module_with_unknown_name_fails() {
    let fixture = prepare_fixture();
    nft()
        .arg("--dir")
        .arg(fixture.path())
        .args(["--platform", "linux", "module", "waitthread"])
        .assert()
        .code(1);
}

#[test]
fn extract_unpacks_bundle_into_dir() {
    let temp = tempfile::tempdir().expect("tempdir");
    let bundle = temp.path().join("native-file-tests-linux-1.0.zip");
    {
        let mut writer = zip::ZipWriter::new(File::create(&bundle).expect("zip"));
        writer
            .start_file(
                "native-file-tests-linux-1.0/simple.json.v1",
                FileOptions::default(),
            )
            .expect("start");
        writer
            .write_all(
                br#"{"objectDigests": {"main": "aa"}, "executableDigest": "ee",
                     "machine": "x86_64", "platform": "linux", "flags": {}, "compiler": "gcc"}"#,
            )
            .expect("write");
        writer.finish().expect("finish");
    }
    let dest = temp.path().join("native-file-tests");

    let assert = nft()
        .arg("--dir")
        .arg(&dest)
        .arg("--json")
        .arg("extract")
        .arg(&bundle)
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["extracted"], true);
    assert!(dest.join("simple.json.v1").is_file());

    let assert = nft()
        .arg("--dir")
        .arg(&dest)
        .args(["--platform", "linux", "exec", "simple"])
        .assert()
        .success();
    assert_eq!(
        stdout(&assert).trim_end(),
        dest.join("simple.ee").display().to_string()
    );

    let again = nft()
        .arg("--json")
        .arg("extract")
        .arg(&bundle)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success();
    assert_eq!(parse_json(&again)["details"]["extracted"], false);
}

#[cfg(target_os = "linux")]
#[test]
fn symbols_reads_the_recorded_executable() {
    let fixture = prepare_fixture();
    fs::copy(env!("CARGO_BIN_EXE_nft"), fixture.path().join("simple.bbbb")).expect("copy exe");

    let assert = nft()
        .arg("--dir")
        .arg(fixture.path())
        .args(["--platform", "linux", "symbols", "simple", "main"])
        .assert()
        .success();
    let output = stdout(&assert);
    assert!(output.trim_end().ends_with("\tmain"), "{output}");

    let assert = nft()
        .arg("--dir")
        .arg(fixture.path())
        .args([
            "--platform",
            "linux",
            "module",
            "simple",
            "--symbol",
            "simple:main=simple_main",
        ])
        .assert()
        .success();
    let source = stdout(&assert);
    assert!(source.contains("pub const SIMPLE_MAIN: u64 = 0x"), "{source}");
    assert!(source.contains("pub const SIMPLE_MAIN_LENGTH: u64 = "), "{source}");

    let assert = nft()
        .arg("--dir")
        .arg(fixture.path())
        .args(["--json", "--platform", "linux", "symbols", "simple", "no_such_symbol"])
        .assert()
        .code(1);
    assert_eq!(parse_json(&assert)["details"]["reason"], "symbol_missing");
}

#[test]
fn symbols_of_a_non_executable_fail() {
    let fixture = prepare_fixture();
    let assert = nft()
        .arg("--dir")
        .arg(fixture.path())
        .args(["--json", "--platform", "linux", "symbols", "simple"])
        .assert()
        .code(2);
    assert_eq!(parse_json(&assert)["details"]["reason"], "executable_invalid");
}

#[test]
fn module_rejects_malformed_symbol_requests() {
    let fixture = prepare_fixture();
    nft()
        .arg("--dir")
        .arg(fixture.path())
        .args(["--platform", "linux", "module", "simple", "--symbol", "function1"])
        .assert()
        .failure();
}
