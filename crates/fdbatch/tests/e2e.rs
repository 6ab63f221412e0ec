//! End-to-end CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fdbatch() -> Command {
    Command::cargo_bin("fdbatch").expect("binary not found")
}

fn write_run_config(dir: &Path, fit: &Path, predict: Option<&Path>, names: &[&str]) -> PathBuf {
    let data = dir.join("data");
    std::fs::create_dir_all(&data).unwrap();
    let out = dir.join("out");
    std::fs::create_dir_all(&out).unwrap();
    let datasets: Vec<String> = names
        .iter()
        .map(|n| {
            let path = data.join(n);
            std::fs::write(&path, "# RESPONSE TIME\n1 0.5\n0 0.7\n1 0.9\n").unwrap();
            path.display().to_string()
        })
        .collect();
    let mut executables = serde_json::json!({ "fit": fit });
    if let Some(predict) = predict {
        executables["predict_cdf"] = serde_json::json!(predict);
    }
    let config = serde_json::json!({
        "method": "ks",
        "response_column": 0,
        "time_column": 1,
        "jobs": 2,
        "datasets": datasets,
        "output_dir": out,
        "session_name": "run",
        "executables": executables,
    });
    let path = dir.join("run.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

#[test]
fn help_flag() {
    fdbatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("estimate"))
        .stdout(predicate::str::contains("simulate"));
}

#[test]
fn version_flag() {
    fdbatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fdbatch"));
}

#[test]
fn completion_bash() {
    fdbatch()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fdbatch"));
}

#[test]
fn template_prints_control_file() {
    let dir = TempDir::new().unwrap();
    let config = write_run_config(dir.path(), Path::new("/usr/bin/fast-dm"), None, &["s1.dat"]);
    fdbatch()
        .args(["template", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("method ks\nprecision 3.0\n"))
        .stdout(predicate::str::contains("format RESPONSE TIME\n"))
        .stdout(predicate::str::contains("load \"{}\"\nsave \"{}\"\n"));
}

#[test]
fn missing_config_file_fails() {
    fdbatch()
        .args(["estimate", "--config", "/no/such/run.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("run.json"));
}

#[test]
fn quiet_mode_still_reports_errors_on_stderr() {
    fdbatch()
        .env("NO_COLOR", "1")
        .args(["-q", "template", "--config", "/no/such/run.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("[ERROR] "))
        .stderr(predicate::str::contains("/no/such/run.json"));
}

#[test]
fn invalid_configuration_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    let config = write_run_config(dir.path(), Path::new("/no/such/fast-dm"), None, &["s1.dat"]);
    fdbatch()
        .args(["-q", "estimate", "--config"])
        .arg(&config)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("fast-dm executable"));
}

#[cfg(unix)]
mod with_tools {
    use super::*;
    use fdbatch_tests::write_script;

    fn fit(dir: &Path) -> PathBuf {
        write_script(
            dir,
            "fit",
            r#"load=$(sed -n 's/^load "\(.*\)"$/\1/p' "$1")
save=$(sed -n 's/^save "\(.*\)"$/\1/p' "$1")
case "$(basename "$load")" in
  bad*) echo "parameter invalid"; exit 0 ;;
esac
printf 'a = 1.10\nv = 0.40\n' > "$save"
"#,
        )
        .unwrap()
    }

    fn plot(dir: &Path) -> PathBuf {
        write_script(
            dir,
            "plot",
            r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift 2; else shift; fi
done
printf '%s\n' '0.1 0.5' > "$out"
"#,
        )
        .unwrap()
    }

    #[test]
    fn estimate_writes_table_and_cdfs() {
        let dir = TempDir::new().unwrap();
        let config = write_run_config(
            dir.path(),
            &fit(dir.path()),
            Some(&plot(dir.path())),
            &["s1.dat", "s2.dat", "s3.dat"],
        );
        fdbatch()
            .args(["-q", "estimate", "--config"])
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("estimates_all.csv"));

        let session = dir.path().join("out").join("run");
        let table = std::fs::read_to_string(session.join("estimates_all.csv")).unwrap();
        assert_eq!(
            table,
            "dataset;a;v\ns1.dat;1.10;0.40\ns2.dat;1.10;0.40\ns3.dat;1.10;0.40\n"
        );
        assert!(session.join("session.ctl").is_file());
        for stem in ["s1", "s2", "s3"] {
            assert!(session.join("cdf").join(format!("parameters_{stem}_cdf.csv")).is_file());
        }
    }

    #[test]
    fn session_and_cdf_overrides() {
        let dir = TempDir::new().unwrap();
        let config = write_run_config(dir.path(), &fit(dir.path()), Some(&plot(dir.path())), &["s1.dat"]);
        fdbatch()
            .args(["-q", "estimate", "--no-cdf", "--session", "custom", "--config"])
            .arg(&config)
            .env("FDBATCH_JOBS", "1")
            .assert()
            .success();
        let session = dir.path().join("out").join("custom");
        assert!(session.join("estimates_all.csv").is_file());
        assert!(!session.join("cdf").exists());
    }

    #[test]
    fn failed_batch_exits_with_batch_code() {
        let dir = TempDir::new().unwrap();
        let config = write_run_config(dir.path(), &fit(dir.path()), None, &["s1.dat", "bad2.dat"]);
        fdbatch()
            .args(["estimate", "--config"])
            .arg(&config)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("bad2.dat"));
    }

    #[test]
    fn simulate_runs_tool_with_pattern() {
        let dir = TempDir::new().unwrap();
        let tool = write_script(dir.path(), "construct", "echo \"$@\" > \"$(dirname \"$0\")/args.txt\"\n").unwrap();
        let config = serde_json::json!({
            "parameters": { "a": 1.5, "zr": 0.5, "v": 2.0, "t0": 0.3, "d": 0.0, "szr": 0.0, "sv": 0.0, "st0": 0.0 },
            "trials": 100,
            "deterministic": true,
            "output_dir": dir.path(),
            "session_name": "sim",
            "construct_samples": tool,
        });
        let path = dir.path().join("sim.json");
        std::fs::write(&path, config.to_string()).unwrap();

        fdbatch()
            .args(["-q", "simulate", "--config"])
            .arg(&path)
            .assert()
            .success();
        let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
        let pattern = dir.path().join("sim").join("sim_%d.lst");
        assert_eq!(
            args.trim_end(),
            format!(
                "-a 1.5 -z 0.5 -v 2.0 -t 0.3 -d 0.0 -Z 0.0 -V 0.0 -T 0.0 -n 100 -N 1 -p 4.0 -o {}",
                pattern.display()
            )
        );
    }
}
