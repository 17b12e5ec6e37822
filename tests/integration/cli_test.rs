use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Isolated home, working directory and session file for one binary run.
struct CliEnv {
    dir: TempDir,
    api_url: String,
}

impl CliEnv {
    fn new(api_url: impl Into<String>) -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
            api_url: api_url.into(),
        }
    }

    fn offline() -> Self {
        Self::new("http://127.0.0.1:9")
    }

    fn session_path(&self) -> PathBuf {
        self.dir.path().join("session.json")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_stackchat"));
        cmd.args(args)
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("STACKCHAT_API_URL", &self.api_url)
            .env("STACKCHAT_SESSION__STORE_PATH", self.session_path())
            .env("STACKCHAT_DISPLAY__COLOR", "false")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("STACKCHAT_LOG_LEVEL");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute stackchat command")
    }

    async fn run_async(&self, args: &[&str]) -> Output {
        let mut cmd = self.command(args);
        tokio::task::spawn_blocking(move || cmd.output())
            .await
            .expect("join")
            .expect("Failed to execute stackchat command")
    }

    fn write_session(&self, session: Value) {
        std::fs::write(self.session_path(), session.to_string()).expect("write session");
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let output = CliEnv::offline().run(&["version"]);
        let out = stdout(&output);

        assert!(output.status.success(), "version command should succeed");
        assert!(out.contains("stackchat"));
        assert!(out.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_version_command_detailed() {
        let output = CliEnv::offline().run(&["version", "--detailed"]);
        let out = stdout(&output);

        assert!(output.status.success());
        assert!(out.contains("Version"));
        assert!(out.contains("Apache-2.0"));
    }
}

mod help_command_tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let output = CliEnv::offline().run(&["--help"]);
        let out = stdout(&output);

        assert!(output.status.success());
        for command in ["login", "logout", "signup", "chats", "ask", "train", "status"] {
            assert!(out.contains(command), "help should mention '{}'", command);
        }
    }

    #[test]
    fn test_train_help() {
        let output = CliEnv::offline().run(&["train", "--help"]);
        let out = stdout(&output);

        assert!(output.status.success());
        assert!(out.contains("start"));
        assert!(out.contains("watch"));
    }
}

mod invalid_command_tests {
    use super::*;

    #[test]
    fn test_invalid_command() {
        let output = CliEnv::offline().run(&["frobnicate"]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let output = CliEnv::offline().run(&["status", "--format", "yaml"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("Unknown output format 'yaml'"));
    }

    #[test]
    fn test_ask_requires_login() {
        let output = CliEnv::offline().run(&["ask", "1", "what", "is", "rust?"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("[E1001]"));
    }

    #[test]
    fn test_train_status_without_task() {
        let env = CliEnv::offline();
        env.write_session(json!({"tokens": {"access": "a", "refresh": "r"}}));

        let output = env.run(&["train", "status"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("[E1002]"));
    }
}

mod session_command_tests {
    use super::*;

    #[test]
    fn test_status_json_when_signed_out() {
        let env = CliEnv::offline();
        let output = env.run(&["status", "--format", "json"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let status: Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(status["authenticated"], json!(false));
        assert_eq!(status["api_url"], json!("http://127.0.0.1:9"));
        assert_eq!(status["task_id"], Value::Null);
    }

    #[test]
    fn test_logout_when_signed_out() {
        let output = CliEnv::offline().run(&["logout"]);
        assert!(output.status.success());
        assert!(stdout(&output).contains("Not logged in."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_status_logout_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_auth/login/"))
            .and(body_json(json!({"email": "ada@example.com", "password": "Engine#1843"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access": "acc", "refresh": "ref"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/app_auth/logout/"))
            .and(header("Authorization", "Bearer acc"))
            .and(body_json(json!({"refresh": "ref"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let env = CliEnv::new(server.uri());

        let login = env
            .run_async(&["login", "--email", "ada@example.com", "--password", "Engine#1843"])
            .await;
        assert!(login.status.success(), "stderr: {}", stderr(&login));
        assert!(stdout(&login).contains("Logged in as ada@example.com"));
        assert!(env.session_path().exists());

        let status = env.run_async(&["status", "--format", "json"]).await;
        let status: Value = serde_json::from_str(&stdout(&status)).unwrap();
        assert_eq!(status["authenticated"], json!(true));

        let logout = env.run_async(&["logout"]).await;
        assert!(logout.status.success(), "stderr: {}", stderr(&logout));

        let status = env.run_async(&["status", "--format", "json"]).await;
        let status: Value = serde_json::from_str(&stdout(&status)).unwrap();
        assert_eq!(status["authenticated"], json!(false));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_login_reports_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_auth/login/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                json!({"detail": "No active account found with the given credentials"}),
            ))
            .mount(&server)
            .await;

        let env = CliEnv::new(server.uri());
        let output = env
            .run_async(&["login", "--email", "ada@example.com", "--password", "wrong"])
            .await;

        assert!(!output.status.success());
        let err = stderr(&output);
        assert!(err.contains("[E3001] Login failed (HTTP 401)"));
        assert!(err.contains("No active account"));
    }
}

mod chat_command_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_chats_list_json_groups_by_date() {
        let server = MockServer::start().await;
        let now = chrono::Utc::now();
        let old = now - chrono::Duration::days(30);
        Mock::given(method("GET"))
            .and(path("/app_model/chat/list/"))
            .and(header("Authorization", "Bearer a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "chat_name": "Old", "user_id": 1, "created_at": old.to_rfc3339()},
                {"id": 2, "chat_name": "New", "user_id": 1, "created_at": now.to_rfc3339()}
            ])))
            .mount(&server)
            .await;

        let env = CliEnv::new(server.uri());
        env.write_session(json!({"tokens": {"access": "a", "refresh": "r"}}));

        let output = env.run_async(&["chats", "list", "--format", "json"]).await;
        assert!(output.status.success(), "stderr: {}", stderr(&output));

        let groups: Value = serde_json::from_str(&stdout(&output)).unwrap();
        let text = groups.to_string();
        assert!(text.contains("\"New\""));
        assert!(text.contains("\"Old\""));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_log_level_setting_controls_stderr() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app_model/chat/list/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let env = CliEnv::new(server.uri());
        env.write_session(json!({"tokens": {"access": "a", "refresh": "r"}}));

        let quiet = env.run_async(&["chats", "list"]).await;
        assert!(quiet.status.success(), "stderr: {}", stderr(&quiet));
        assert!(!stderr(&quiet).contains("Chats listed"));

        let mut cmd = env.command(&["chats", "list"]);
        cmd.env("STACKCHAT_LOG_LEVEL", "debug");
        let verbose = tokio::task::spawn_blocking(move || cmd.output())
            .await
            .unwrap()
            .unwrap();
        assert!(verbose.status.success(), "stderr: {}", stderr(&verbose));
        assert!(stderr(&verbose).contains("Chats listed"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_chat_with_blank_name_sends_nothing() {
        let server = MockServer::start().await;
        let env = CliEnv::new(server.uri());
        env.write_session(json!({"tokens": {"access": "a", "refresh": "r"}}));

        let output = env.run_async(&["chats", "create", " "]).await;
        assert!(!output.status.success());
        assert!(stderr(&output).contains("[E4001]"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
