use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use stackchat_core::{
    ApiClient, ApiConfig, MemorySessionStore, PollerState, Session, SessionTokens,
    TrainingMonitor, TrainingPoller, TrainingStage,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const INTERVAL: Duration = Duration::from_millis(20);

fn client_with_task(server: &MockServer, task_id: Option<&str>) -> Arc<ApiClient> {
    let mut session = Session::authenticated(SessionTokens {
        access: "access".to_string(),
        refresh: "refresh".to_string(),
    });
    session.task_id = task_id.map(str::to_string);
    let store = Arc::new(MemorySessionStore::with_session(session));
    Arc::new(ApiClient::new(&ApiConfig::with_base_url(server.uri()), store).unwrap())
}

/// Replays monitor responses in order, repeating the last one.
struct Script {
    responses: Vec<Value>,
    calls: Arc<AtomicUsize>,
}

impl Respond for Script {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self.responses[n.min(self.responses.len() - 1)].clone();
        ResponseTemplate::new(200).set_body_json(body)
    }
}

fn status(state: &str, result: &str) -> Value {
    json!({"task_id": "t-1", "status": state, "result": result})
}

async fn mount_script(server: &MockServer, responses: Vec<Value>) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    Mock::given(method("POST"))
        .and(path("/app_model/monitor/training/"))
        .and(body_json(json!({"task_id": "t-1"})))
        .respond_with(Script {
            responses,
            calls: calls.clone(),
        })
        .mount(server)
        .await;
    calls
}

mod poller_tests {
    use super::*;

    #[tokio::test]
    async fn test_start_then_follow_to_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_model/train/model/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(
                json!({"message": "Training started successfully.", "task_id": "t-1"}),
            ))
            .expect(1)
            .mount(&server)
            .await;
        let stages: Vec<Value> = TrainingStage::ALL[..4]
            .iter()
            .map(|stage| status("STARTED", stage.phrase()))
            .chain([status("SUCCESS", TrainingStage::IndexReady.phrase())])
            .collect();
        let calls = mount_script(&server, stages).await;

        let client = client_with_task(&server, None);
        assert!(client.train_model().await.unwrap());

        let monitor: Arc<dyn TrainingMonitor> = client.clone();
        let handle = TrainingPoller::new(monitor, INTERVAL).spawn();
        let mut rx = handle.subscribe();

        let mut percents = Vec::new();
        loop {
            if rx.changed().await.is_err() {
                break;
            }
            let snapshot = rx.borrow_and_update().clone();
            percents.push(snapshot.progress.percent);
            if snapshot.state.is_terminal() {
                break;
            }
        }

        let last = handle.wait().await;
        assert_eq!(last.state, PollerState::Succeeded);
        assert_eq!(last.polls, 5);
        assert!(last.progress.continue_ready);
        assert_eq!(last.progress.status_text, TrainingStage::IndexReady.phrase());
        assert_eq!(percents.last(), Some(&100));
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_failure_stops_polling() {
        let server = MockServer::start().await;
        let calls = mount_script(
            &server,
            vec![
                status("STARTED", TrainingStage::Downloading.phrase()),
                status("FAILURE", "Dataset download timed out"),
            ],
        )
        .await;

        let client = client_with_task(&server, Some("t-1"));
        let handle = TrainingPoller::new(client, INTERVAL).spawn();
        let last = handle.wait().await;

        assert_eq!(last.state, PollerState::Failed);
        assert_eq!(last.progress.percent, 25);
        assert_eq!(last.progress.status_text, "Dataset download timed out");
        assert!(!last.progress.continue_ready);

        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_phrase_keeps_last_percent() {
        let server = MockServer::start().await;
        mount_script(
            &server,
            vec![
                status("STARTED", TrainingStage::LoadingDatabase.phrase()),
                status("STARTED", "Compacting shards"),
                status("SUCCESS", "done"),
            ],
        )
        .await;

        let client = client_with_task(&server, Some("t-1"));
        let handle = TrainingPoller::new(client, INTERVAL).spawn();
        let mut rx = handle.subscribe();

        let mut seen_unknown = None;
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.progress.status_text == "Compacting shards" {
                seen_unknown = Some(snapshot.progress.percent);
            }
            if snapshot.state.is_terminal() {
                break;
            }
        }

        assert_eq!(seen_unknown, Some(50));
        assert_eq!(handle.wait().await.progress.percent, 100);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_requests() {
        let server = MockServer::start().await;
        let calls = mount_script(
            &server,
            vec![status("STARTED", TrainingStage::Starting.phrase())],
        )
        .await;

        let client = client_with_task(&server, Some("t-1"));
        let handle = TrainingPoller::new(client, INTERVAL).spawn();
        tokio::time::sleep(INTERVAL * 3).await;
        drop(handle);

        tokio::time::sleep(INTERVAL * 2).await;
        let after_drop = calls.load(Ordering::SeqCst);
        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test]
    async fn test_lost_session_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_model/monitor/training/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_with_task(&server, Some("t-1"));
        let handle = TrainingPoller::new(client, INTERVAL).spawn();
        let last = handle.wait().await;

        assert_eq!(last.state, PollerState::Aborted);
        assert_eq!(last.polls, 1);
    }
}
