use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{json, Value};
use stackchat_core::{
    group_chats_by_date, send_message, ApiClient, ApiConfig, MemorySessionStore, SendStage,
    Session, SessionTokens, StackchatError, Transcript,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn logged_in_client(server: &MockServer) -> ApiClient {
    let store = Arc::new(MemorySessionStore::with_session(Session::authenticated(
        SessionTokens {
            access: "access".to_string(),
            refresh: "refresh".to_string(),
        },
    )));
    ApiClient::new(&ApiConfig::with_base_url(server.uri()), store).unwrap()
}

/// Message table shared by the create and list mocks of one chat.
#[derive(Clone, Default)]
struct MessageTable {
    rows: Arc<Mutex<Vec<Value>>>,
}

impl MessageTable {
    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

struct CreateMessage(MessageTable);

impl Respond for CreateMessage {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match request.body_json() {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let mut rows = self.0.rows.lock().unwrap();
        let row = json!({
            "id": rows.len() as i64 + 1,
            "chat_id": body["chat_id"],
            "text": body["text"],
            "is_user": body["is_user"],
            "created_at": Utc::now().to_rfc3339(),
        });
        rows.push(row.clone());
        ResponseTemplate::new(201).set_body_json(row)
    }
}

struct ListMessages(MessageTable);

impl Respond for ListMessages {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let rows = self.0.rows.lock().unwrap().clone();
        ResponseTemplate::new(200).set_body_json(Value::Array(rows))
    }
}

async fn mount_chat(server: &MockServer, chat_id: i64) -> MessageTable {
    let table = MessageTable::default();
    Mock::given(method("POST"))
        .and(path(format!("/app_model/message/{}/create/", chat_id)))
        .respond_with(CreateMessage(table.clone()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/app_model/message/{}/list/", chat_id)))
        .respond_with(ListMessages(table.clone()))
        .mount(server)
        .await;
    table
}

mod send_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_question_and_answer_are_persisted_in_order() {
        let server = MockServer::start().await;
        let table = mount_chat(&server, 4).await;
        Mock::given(method("POST"))
            .and(path("/app_model/search/information/"))
            .and(body_json(json!({"prompt": "How do lifetimes work?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "They bound how long a borrow lives.",
                "references": [{"content": "Lifetimes are regions of code.", "score": "91.20%"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = logged_in_client(&server);
        let mut transcript = Transcript::new(4);
        let mut stages = Vec::new();
        let mut pending_seen = false;

        let revealed = send_message(&client, &mut transcript, "How do lifetimes work?", |stage, t| {
            stages.push(stage);
            if stage == SendStage::Thinking {
                pending_seen = t.has_pending();
            }
        })
        .await
        .unwrap();

        assert_eq!(
            stages,
            vec![
                SendStage::PromptSaved,
                SendStage::Thinking,
                SendStage::AnswerSaved,
                SendStage::RevealMarked
            ]
        );
        assert!(pending_seen);
        assert!(!transcript.has_pending());
        assert_eq!(table.len(), 2);

        let persisted: Vec<_> = transcript.persisted().collect();
        assert_eq!(persisted.len(), 2);
        assert!(persisted[0].is_user);
        assert_eq!(persisted[0].text, "How do lifetimes work?");

        let answer = transcript.last_bot_message().unwrap();
        assert_eq!(revealed, Some(answer.id));
        assert_eq!(answer.display_text(), "They bound how long a borrow lives.");
        assert_eq!(answer.references()[0].score_percent(), "91.20%");
    }

    #[tokio::test]
    async fn test_follow_up_keeps_earlier_turns() {
        let server = MockServer::start().await;
        let table = mount_chat(&server, 9).await;
        Mock::given(method("POST"))
            .and(path("/app_model/search/information/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("Plain answer")))
            .mount(&server)
            .await;

        let client = logged_in_client(&server);
        let mut transcript = Transcript::new(9);
        send_message(&client, &mut transcript, "first", |_, _| {})
            .await
            .unwrap();
        let second = send_message(&client, &mut transcript, "second", |_, _| {})
            .await
            .unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(transcript.len(), 4);
        assert_eq!(second, Some(4));
        assert_eq!(transcript.last_bot_message().unwrap().display_text(), "Plain answer");
    }

    #[tokio::test]
    async fn test_answer_failure_keeps_prompt_and_placeholder() {
        let server = MockServer::start().await;
        let table = mount_chat(&server, 2).await;
        Mock::given(method("POST"))
            .and(path("/app_model/search/information/"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "index not built"})),
            )
            .mount(&server)
            .await;

        let client = logged_in_client(&server);
        let mut transcript = Transcript::new(2);
        let err = send_message(&client, &mut transcript, "anyone there?", |_, _| {})
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(table.len(), 1);
        assert!(transcript.has_pending());
        assert!(transcript.last_bot_message().is_none());
        assert!(transcript.reveal_target().is_none());
    }

    #[tokio::test]
    async fn test_blank_prompt_sends_nothing() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server);
        let mut transcript = Transcript::new(1);

        let err = send_message(&client, &mut transcript, "   ", |_, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, StackchatError::EmptyPrompt));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

mod chat_lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_list_delete() {
        let server = MockServer::start().await;
        let now = Utc::now();
        Mock::given(method("POST"))
            .and(path("/app_model/chat/create/"))
            .and(body_json(json!({"chat_name": "Cooking"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Chat created succesfully",
                "chat_id": 12,
                "name": "Cooking",
                "created_at": now.to_rfc3339()
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/app_model/chat/list/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "chat_name": "Archive", "user_id": 1, "created_at": (now - chrono::Duration::days(40)).to_rfc3339()},
                {"id": 12, "chat_name": "Cooking", "user_id": 1, "created_at": now.to_rfc3339()},
                {"id": 8, "chat_name": "Travel", "user_id": 1, "created_at": (now - chrono::Duration::days(1)).to_rfc3339()}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/app_model/chat/12/delete/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = logged_in_client(&server);

        let chat = client.create_chat("  Cooking  ").await.unwrap();
        assert_eq!(chat.id, 12);
        assert_eq!(chat.chat_name, "Cooking");

        let chats = client.list_chats().await.unwrap();
        let ids: Vec<i64> = chats.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![12, 8, 3]);

        let groups = group_chats_by_date(&chats, now);
        assert_eq!(groups.today.len(), 1);
        assert_eq!(groups.older.len(), 1);
        assert_eq!(groups.len(), 3);

        assert!(client.delete_chat(12).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_chat_reports_false() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/app_model/chat/77/delete/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = logged_in_client(&server);
        assert!(!client.delete_chat(77).await.unwrap());
    }
}
