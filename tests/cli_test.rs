//! CLI integration tests for profile-spec binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const BATTERY: &str = r#"{
    "swagger": "2.0",
    "basePath": "/gotapi/battery",
    "info": { "title": "Battery Profile", "version": "1.0" },
    "paths": {
        "/level": {
            "get": {
                "x-type": "one-shot",
                "parameters": [
                    { "name": "serviceId", "in": "query", "required": true, "type": "string" },
                    { "name": "precision", "in": "query", "type": "integer",
                      "minimum": 0, "maximum": 3 }
                ],
                "responses": { "200": { "description": "level" } }
            }
        }
    }
}"#;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("profile-spec"))
}

// Helper to create a temp spec file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod resolve_command {
    use super::*;

    #[test]
    fn resolve_from_file() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "--method",
                "get",
                "--path",
                "/gotapi/battery/level",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""name":"serviceId""#))
            .stdout(predicate::str::contains(r#""x-type":"one-shot""#));
    }

    #[test]
    fn resolve_with_pretty() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "-m",
                "GET",
                "-p",
                "/gotapi/battery/level/",
                "--pretty",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"precision\""));
    }

    #[test]
    fn resolve_by_profile_name() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "Battery.json", BATTERY);

        cmd()
            .args([
                "resolve",
                "battery",
                "-m",
                "get",
                "-p",
                "/gotapi/battery/level",
                "--spec-dir",
                dir.path().to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("serviceId"));
    }

    #[test]
    fn resolve_to_output_file() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);
        let output = dir.path().join("operation.json");

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "-m",
                "get",
                "-p",
                "/gotapi/battery/level",
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["parameters"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn undeclared_operation_exits_1() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "-m",
                "delete",
                "-p",
                "/gotapi/battery/level",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No operation declared for DELETE"));
    }

    #[test]
    fn unknown_profile_exits_3() {
        let dir = TempDir::new().unwrap();

        cmd()
            .args([
                "resolve",
                "vibration",
                "-m",
                "get",
                "-p",
                "/gotapi/vibration",
                "--spec-dir",
                dir.path().to_str().unwrap(),
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("vibration"));
    }

    #[test]
    fn malformed_spec_exits_2() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "bad.json", r#"{"swagger": "2.0"}"#);

        cmd()
            .args([
                "resolve",
                spec.to_str().unwrap(),
                "-m",
                "get",
                "-p",
                "/gotapi/bad",
            ])
            .assert()
            .code(2);
    }

    #[test]
    fn unknown_method_rejected() {
        cmd()
            .args(["resolve", "battery", "-m", "fetch", "-p", "/gotapi/battery"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown HTTP method"));
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_params() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "-m",
                "get",
                "-p",
                "/gotapi/battery/level",
                "--param",
                "serviceId=host",
                "--param",
                "precision=2",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn invalid_params_exit_1() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "-m",
                "get",
                "-p",
                "/gotapi/battery/level",
                "--param",
                "precision=9",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("serviceId (query): required but missing"))
            .stderr(predicate::str::contains("precision (query): invalid value"));
    }

    #[test]
    fn json_output() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "-m",
                "get",
                "-p",
                "/gotapi/battery/level",
                "--param",
                "serviceId=host",
                "--param",
                "precision=-1",
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""name":"precision""#));
    }

    #[test]
    fn params_file_with_overrides() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);
        let params = write_temp_file(
            &dir,
            "params.json",
            r#"{"serviceId": "host", "precision": 7}"#,
        );

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "-m",
                "get",
                "-p",
                "/gotapi/battery/level",
                "--params-file",
                params.to_str().unwrap(),
                "--param",
                "precision=1",
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""valid":true"#));
    }

    #[test]
    fn params_file_must_be_object() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);
        let params = write_temp_file(&dir, "params.json", "[1, 2]");

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "-m",
                "get",
                "-p",
                "/gotapi/battery/level",
                "--params-file",
                params.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("JSON object"));
    }

    #[test]
    fn unresolved_request_is_valid() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "battery.json", BATTERY);

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "-m",
                "put",
                "-p",
                "/gotapi/battery/level",
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""resolved":false"#));
    }

    #[test]
    fn malformed_param_flag_rejected() {
        cmd()
            .args([
                "validate",
                "battery",
                "-m",
                "get",
                "-p",
                "/gotapi/battery/level",
                "--param",
                "precision",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("NAME=VALUE"));
    }
}

mod lint_command {
    use super::*;

    #[test]
    fn clean_file_passes() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "battery.json", BATTERY);

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 files checked, all passed"));
    }

    #[test]
    fn syntax_error_exits_1() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "broken.json", "{ not json");

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("E001"));
    }

    #[test]
    fn json_format() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "battery.json", BATTERY);

        let output = cmd()
            .args(["lint", dir.path().to_str().unwrap(), "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["files_checked"], 1);
        assert_eq!(result["errors"], 0);
    }

    #[test]
    fn strict_fails_on_warnings() {
        let dir = TempDir::new().unwrap();
        let file = write_temp_file(
            &dir,
            "echo.json",
            r#"{"basePath": "/gotapi/echo", "paths": {"/": {"get": {}}}}"#,
        );

        cmd()
            .args(["lint", file.to_str().unwrap()])
            .assert()
            .success();

        cmd()
            .args(["lint", file.to_str().unwrap(), "--strict"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("W002"));
    }

    #[test]
    fn missing_path_exits_2() {
        cmd()
            .args(["lint", "/nonexistent/specs"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("path not found"));
    }
}
