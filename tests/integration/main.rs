//! Integration tests for wsm

use std::path::{Path, PathBuf};

/// Write a config file pointing storage at `dir`
fn write_config(dir: &Path, kind: &str, max_lifetime_secs: u64) -> PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        r#"
[session]
cookie_name = "sid"
max_lifetime_secs = {max_lifetime_secs}

[storage]
kind = "{kind}"
state_dir = "{}"
"#,
        dir.join("state").display()
    );
    std::fs::write(&path, content).unwrap();
    path
}

mod cli_tests {
    use super::write_config;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn wsm() -> Command {
        let mut cmd = cargo_bin_cmd!("wsm");
        cmd.env_remove("WSM_CONFIG");
        cmd
    }

    #[test]
    fn help_displays() {
        wsm()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Web Sessions Manager"));
    }

    #[test]
    fn version_displays() {
        wsm()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("wsm"));
    }

    #[test]
    fn backends_lists_supported_media() {
        wsm()
            .arg("backends")
            .assert()
            .success()
            .stdout(predicate::str::contains("memory").and(predicate::str::contains("file")));
    }

    #[test]
    fn config_path() {
        wsm()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "memory", 60);

        wsm()
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("[session]")
                    .and(predicate::str::contains("cookie_name = \"sid\"")),
            );
    }

    #[test]
    fn config_set_then_show() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("nested").join("config.toml");

        wsm()
            .arg("--config")
            .arg(&config)
            .args(["config", "set", "session.max_lifetime_secs", "90"])
            .assert()
            .success();

        wsm()
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("max_lifetime_secs = 90"));
    }

    #[test]
    fn config_set_rejects_unsupported_storage() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");

        wsm()
            .arg("--config")
            .arg(&config)
            .args(["config", "set", "storage.kind", "postgres"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("postgres"));
    }

    #[test]
    fn demo_runs_full_cycle() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "memory", 60);

        wsm()
            .arg("--config")
            .arg(&config)
            .arg("demo")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("Set-Cookie: sid=")
                    .and(predicate::str::contains("Max-Age=60"))
                    .and(predicate::str::contains("Max-Age=0")),
            );

        assert!(temp
            .path()
            .join("state")
            .join("registered_storage.json")
            .exists());
    }

    #[test]
    fn sweep_requires_file_storage() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "memory", 60);

        wsm()
            .arg("--config")
            .arg(&config)
            .arg("sweep")
            .assert()
            .failure()
            .stderr(predicate::str::contains("storage.kind"));
    }

    #[test]
    fn sweep_and_list_file_storage() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "file", 60);

        wsm()
            .arg("--config")
            .arg(&config)
            .arg("sweep")
            .assert()
            .success();

        wsm()
            .arg("--config")
            .arg(&config)
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn sweep_rejects_zero_lifetime() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "file", 60);

        wsm()
            .arg("--config")
            .arg(&config)
            .args(["sweep", "--max-lifetime", "0"])
            .assert()
            .failure();
    }
}

mod lifecycle_tests {
    use chrono::{Duration as ChronoDuration, Utc};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use wsm::storage::{FileStorage, MemoryStorage};
    use wsm::{
        CookieSource, RequestCookies, ResponseCookies, SessionManager, StorageMedia,
        StorageMediaRef, WsmError,
    };

    fn cookie_request(response: &ResponseCookies) -> RequestCookies {
        let cookie = response.get("sid").unwrap();
        RequestCookies::new().with(cookie.name.clone(), cookie.value.clone())
    }

    #[tokio::test]
    async fn session_survives_requests_until_expired() {
        let storage = Arc::new(MemoryStorage::new());
        let media: StorageMediaRef = storage.clone();
        let manager = SessionManager::with_storage(media, "sid", Duration::from_secs(2)).unwrap();

        let mut response = ResponseCookies::new();
        let first = manager
            .start_session(&RequestCookies::new(), &mut response)
            .await
            .unwrap();
        first.set_value("user", json!("ada")).await.unwrap();
        let request = cookie_request(&response);

        let mut response = ResponseCookies::new();
        let again = manager.start_session(&request, &mut response).await.unwrap();
        assert_eq!(again.session_id(), first.session_id());
        assert_eq!(again.get_value("user").await.unwrap(), Some(json!("ada")));
        assert!(response.is_empty());

        let later = Utc::now() + ChronoDuration::seconds(3);
        assert_eq!(storage.terminate_expired_at(later, Duration::from_secs(2)), 1);

        let err = manager
            .start_session(&request, &mut ResponseCookies::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WsmError::SessionNotExist));
        assert!(err.warrants_new_session());
    }

    #[tokio::test]
    async fn file_sessions_persist_across_reopen() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("sessions");

        let request = {
            let storage: StorageMediaRef = Arc::new(FileStorage::open(&dir).await.unwrap());
            let manager =
                SessionManager::with_storage(storage, "sid", Duration::from_secs(60)).unwrap();
            let mut response = ResponseCookies::new();
            let session = manager
                .start_session(&RequestCookies::new(), &mut response)
                .await
                .unwrap();
            session.set_value("cart", json!([1, 2])).await.unwrap();
            cookie_request(&response)
        };

        let storage = Arc::new(FileStorage::open(&dir).await.unwrap());
        assert_eq!(storage.active_sessions().await, 1);

        let manager =
            SessionManager::with_storage(storage.clone(), "sid", Duration::from_secs(60)).unwrap();
        let session = manager
            .start_session(&request, &mut ResponseCookies::new())
            .await
            .unwrap();
        assert_eq!(session.get_value("cart").await.unwrap(), Some(json!([1, 2])));

        let mut response = ResponseCookies::new();
        manager.end_session(&request, &mut response).await;
        assert!(response.get("sid").unwrap().is_removal());
        assert_eq!(storage.active_sessions().await, 0);
        assert!(request.cookie("sid").is_some());
    }
}
