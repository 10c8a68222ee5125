//! Integration tests for the startup-cache CLI

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn cache_file(&self) -> PathBuf {
            self.dir.path().join("startupCache.blob")
        }

        /// Command isolated from the user's config and cache
        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("startup-cache");
            cmd.env("STARTUP_CACHE_CONFIG", self.dir.path().join("config.toml"))
                .env("STARTUP_CACHE_FILE", self.cache_file());
            cmd
        }

        /// Temp file as left by a writer, optionally aged by `age`
        fn temp_file(&self, suffix: &str, age: Duration) -> PathBuf {
            let path = self.dir.path().join(format!(".startupCache.blob.tmp.{suffix}"));
            std::fs::write(&path, b"partial").unwrap();
            std::fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(SystemTime::now() - age)
                .unwrap();
            path
        }

        fn stats_json(&self, extra: &[&str]) -> serde_json::Value {
            let output = self
                .cmd()
                .args(["stats", "-o", "json"])
                .args(extra)
                .output()
                .unwrap();
            assert!(output.status.success());
            serde_json::from_slice(&output.stdout).unwrap()
        }
    }

    #[test]
    fn help_displays() {
        Sandbox::new()
            .cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Persistent startup cache for precomputed extension data",
            ));
    }

    #[test]
    fn version_displays() {
        Sandbox::new()
            .cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("startup-cache"));
    }

    #[test]
    fn set_then_get() {
        let sandbox = Sandbox::new();

        sandbox
            .cmd()
            .args(["set", "ext-1", r#"{"m":"hi"}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("Set ext-1"));

        assert!(sandbox.cache_file().exists());

        sandbox
            .cmd()
            .args(["get", "ext-1"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""m": "hi""#));
    }

    #[test]
    fn get_missing_entry_fails() {
        Sandbox::new()
            .cmd()
            .args(["get", "nonexistent"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache entry not found"));
    }

    #[test]
    fn set_invalid_json_fails() {
        let sandbox = Sandbox::new();

        sandbox
            .cmd()
            .args(["set", "ext-1", "{not json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache entry"));

        assert!(!sandbox.cache_file().exists());
    }

    #[test]
    fn show_lists_entries() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["set", "a@x/manifest", "1"]).assert().success();
        sandbox.cmd().args(["set", "b@x", "2"]).assert().success();

        sandbox
            .cmd()
            .args(["show", "-o", "plain"])
            .assert()
            .success()
            .stdout("a@x/manifest\nb@x\n");
    }

    #[test]
    fn show_empty_cache() {
        Sandbox::new()
            .cmd()
            .arg("show")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached entries"));
    }

    #[test]
    fn stats_missing_file_counts_not_found() {
        let stats = Sandbox::new().stats_json(&[]);

        assert_eq!(
            stats["keyed_scalars"]["extensions.startupCache.read_errors"],
            serde_json::json!({"NotFoundError": 1})
        );

        let metric = &stats["metrics"]["extensions.startup_cache_load_time"];
        assert!(metric.as_u64().unwrap() > 0);
        assert_eq!(&stats["scalars"]["extensions.startupCache.load_time"], metric);
    }

    #[test]
    fn stats_save_records_file_size() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["set", "ext-1", r#"{"m":"hi"}"#])
            .assert()
            .success();

        let stats = sandbox.stats_json(&["--save"]);
        let size = std::fs::metadata(sandbox.cache_file()).unwrap().len();

        assert_eq!(
            stats["scalars"]["extensions.startupCache.write_byteLength"].as_u64(),
            Some(size)
        );
        assert!(stats["keyed_scalars"].as_object().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_counts_decode_error() {
        let sandbox = Sandbox::new();
        std::fs::write(sandbox.cache_file(), b"garbage").unwrap();

        let stats = sandbox.stats_json(&[]);

        assert_eq!(
            stats["keyed_scalars"]["extensions.startupCache.read_errors"]["DecodeError"],
            1
        );
    }

    #[test]
    fn clear_addon_keeps_others() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["set", "a@x/manifest", "1"]).assert().success();
        sandbox.cmd().args(["set", "a@x/locales", "2"]).assert().success();
        sandbox.cmd().args(["set", "b@x", "3"]).assert().success();

        sandbox
            .cmd()
            .args(["clear", "--addon", "a@x"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 2 entries"));

        sandbox
            .cmd()
            .args(["show", "-o", "plain"])
            .assert()
            .success()
            .stdout("b@x\n");
    }

    #[test]
    fn invalidate_removes_file() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["set", "ext-1", "1"]).assert().success();

        sandbox.cmd().arg("invalidate").assert().success();

        assert!(!sandbox.cache_file().exists());
    }

    #[test]
    fn info_leaves_temp_files_alone() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["set", "ext-1", "1"]).assert().success();
        let stale = sandbox.temp_file("stale", Duration::from_secs(24 * 60 * 60));
        let fresh = sandbox.temp_file("fresh", Duration::ZERO);

        sandbox
            .cmd()
            .arg("info")
            .assert()
            .success()
            .stdout(predicate::str::contains("orphaned").not());

        assert!(stale.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn invalidate_sweeps_only_stale_temp_files() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["set", "ext-1", "1"]).assert().success();
        let stale = sandbox.temp_file("stale", Duration::from_secs(24 * 60 * 60));
        let fresh = sandbox.temp_file("fresh", Duration::ZERO);

        sandbox
            .cmd()
            .arg("invalidate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 1 orphaned temp file(s)"));

        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn path_prints_cache_file() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .arg("path")
            .assert()
            .success()
            .stdout(predicate::str::contains("startupCache.blob"));
    }

    #[test]
    fn config_path() {
        Sandbox::new()
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        Sandbox::new()
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }
}
