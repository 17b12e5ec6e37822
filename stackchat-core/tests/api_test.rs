#![allow(dead_code, unused_imports, unused_variables, unused_mut)]

use serde_json::json;
use stackchat_core::{
    ApiClient, ApiConfig, FileSessionStore, LoginField, MemorySessionStore, NewUser, Session,
    SessionStore, SessionTokens, StackchatError, TaskState, UserUpdate,
};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tokens() -> SessionTokens {
    SessionTokens {
        access: "access-1".to_string(),
        refresh: "refresh-1".to_string(),
    }
}

fn logged_in_client(server: &MockServer) -> (ApiClient, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::with_session(Session::authenticated(
        tokens(),
    )));
    let client = ApiClient::new(&ApiConfig::with_base_url(server.uri()), store.clone()).unwrap();
    (client, store)
}

fn anonymous_client(server: &MockServer) -> (ApiClient, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::new(&ApiConfig::with_base_url(server.uri()), store.clone()).unwrap();
    (client, store)
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or(0)
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_then_logout_leaves_no_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/app_auth/login/"))
            .and(body_json(json!({"email": "ada@example.com", "password": "Secret#123"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access": "a", "refresh": "r"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/app_auth/logout/"))
            .and(header("Authorization", "Bearer a"))
            .and(body_json(json!({"refresh": "r"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = anonymous_client(&server);

        let tokens = client.login("ada@example.com", "Secret#123").await.unwrap();
        assert_eq!(tokens.access, "a");
        assert!(client.is_authenticated().await);
        assert_eq!(store.snapshot().tokens.unwrap().refresh, "r");

        client.logout().await.unwrap();
        assert!(!client.is_authenticated().await);
        assert!(store.snapshot().tokens.is_none());
    }

    #[tokio::test]
    async fn test_logout_persists_across_clients() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_auth/logout/"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        let store = Arc::new(FileSessionStore::new(&file));
        store.save(&Session::authenticated(tokens())).unwrap();

        let config = ApiConfig::with_base_url(server.uri());
        let client = ApiClient::new(&config, store.clone()).unwrap();
        client.logout().await.unwrap();

        let fresh = ApiClient::new(&config, Arc::new(FileSessionStore::new(&file))).unwrap();
        assert!(!fresh.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_failure_stays_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_auth/login/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "No active account found"})),
            )
            .mount(&server)
            .await;

        let (client, store) = anonymous_client(&server);
        let err = client.login("ada@example.com", "wrong").await.unwrap_err();

        match err {
            StackchatError::ApiRequestFailed {
                operation,
                status,
                detail,
            } => {
                assert_eq!(operation, "Login");
                assert_eq!(status, 401);
                assert_eq!(detail.as_deref(), Some("No active account found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!client.is_authenticated().await);
        assert!(store.snapshot().tokens.is_none());
    }

    #[tokio::test]
    async fn test_login_with_username_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_auth/login/"))
            .and(body_json(json!({"username": "ada", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access": "a", "refresh": "r"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ApiConfig::with_base_url(server.uri());
        config.login_field = LoginField::Username;
        let client = ApiClient::in_memory(&config).unwrap();
        client.login("ada", "pw").await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_without_tokens_sends_nothing() {
        let server = MockServer::start().await;
        let (client, _) = anonymous_client(&server);

        let err = client.logout().await.unwrap_err();
        assert!(matches!(err, StackchatError::NotAuthenticated));
        assert_eq!(request_count(&server).await, 0);
    }

    #[tokio::test]
    async fn test_forget_session_clears_file_without_request() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        let store = Arc::new(FileSessionStore::new(&file));
        let mut session = Session::authenticated(tokens());
        session.task_id = Some("t-9".to_string());
        store.save(&session).unwrap();

        let config = ApiConfig::with_base_url(server.uri());
        let client = ApiClient::new(&config, store.clone()).unwrap();
        client.forget_session().await.unwrap();

        assert!(!client.is_authenticated().await);
        assert_eq!(request_count(&server).await, 0);
        let fresh = ApiClient::new(&config, Arc::new(FileSessionStore::new(&file))).unwrap();
        assert!(!fresh.is_authenticated().await);
        assert!(fresh.session().await.task_id.is_none());
    }

    #[tokio::test]
    async fn test_refresh_replaces_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_auth/token/refresh/"))
            .and(body_json(json!({"refresh": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = logged_in_client(&server);
        client.refresh_access_token().await.unwrap();

        let session = store.snapshot();
        let tokens = session.tokens.unwrap();
        assert_eq!(tokens.access, "access-2");
        assert_eq!(tokens.refresh, "refresh-1");
    }

    #[tokio::test]
    async fn test_sign_up_validates_before_sending() {
        let server = MockServer::start().await;
        let (client, _) = anonymous_client(&server);

        let err = client
            .sign_up(&NewUser::new("Ada", "Lovelace", "ada@example.com", "short"))
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(request_count(&server).await, 0);
    }

    #[tokio::test]
    async fn test_sign_up_posts_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/create/"))
            .and(body_json(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "password": "Secret#123"
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"message": "User created successfully"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = anonymous_client(&server);
        let message = client
            .sign_up(&NewUser::new(
                "Ada",
                "Lovelace",
                "ada@example.com",
                "Secret#123",
            ))
            .await
            .unwrap();
        assert_eq!(message, "User created successfully");
    }
}

mod account_tests {
    use super::*;

    #[tokio::test]
    async fn test_read_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/read/"))
            .and(header("Authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com"
            })))
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        let user = client.read_user().await.unwrap();
        assert_eq!(user.id, Some(3));
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_update_user() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/user/update/"))
            .and(body_json(json!({
                "first_name": "Grace",
                "last_name": "Hopper",
                "email": "grace@example.com"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "User updated successfully"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        let message = client
            .update_user(&UserUpdate {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: "grace@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(message, "User updated successfully");
    }

    #[tokio::test]
    async fn test_delete_user_ends_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/user/delete/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = logged_in_client(&server);
        client.delete_user().await.unwrap();
        assert!(!client.is_authenticated().await);
        assert!(store.snapshot().tokens.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_surfaces_session_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/read/"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Authentication failed."})),
            )
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        let err = client.read_user().await.unwrap_err();
        assert!(matches!(
            err,
            StackchatError::SessionExpired {
                operation: "Read user"
            }
        ));
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        let server = MockServer::start().await;
        let (client, _) = anonymous_client(&server);

        assert!(matches!(
            client.read_user().await,
            Err(StackchatError::NotAuthenticated)
        ));
        assert!(matches!(
            client.list_chats().await,
            Err(StackchatError::NotAuthenticated)
        ));
        assert!(matches!(
            client.train_model().await,
            Err(StackchatError::NotAuthenticated)
        ));
        assert_eq!(request_count(&server).await, 0);
    }
}

mod chat_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_chats_sorted_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app_model/chat/list/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "chat_name": "old", "user_id": 3, "created_at": "2024-05-01T10:00:00Z"},
                {"id": 2, "chat_name": "newest", "user_id": 3, "created_at": "2024-05-03T10:00:00Z"},
                {"id": 3, "chat_name": "middle", "user_id": 3, "created_at": "2024-05-02T10:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        let chats = client.list_chats().await.unwrap();
        let ids: Vec<i64> = chats.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_create_chat_rejects_blank_name_without_request() {
        let server = MockServer::start().await;
        let (client, _) = logged_in_client(&server);

        for name in ["", "   ", "\t\n"] {
            assert!(matches!(
                client.create_chat(name).await,
                Err(StackchatError::EmptyChatName)
            ));
        }
        assert_eq!(request_count(&server).await, 0);
    }

    #[tokio::test]
    async fn test_create_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_model/chat/create/"))
            .and(body_json(json!({"chat_name": "Sourdough"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Chat created succesfully",
                "chat_id": 11,
                "name": "Sourdough",
                "created_at": "2024-05-01T10:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        let chat = client.create_chat("  Sourdough ").await.unwrap();
        assert_eq!(chat.id, 11);
        assert_eq!(chat.chat_name, "Sourdough");
    }

    #[tokio::test]
    async fn test_delete_chat() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/app_model/chat/4/delete/"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/app_model/chat/5/delete/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/app_model/chat/6/delete/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        assert!(client.delete_chat(4).await.unwrap());
        assert!(!client.delete_chat(5).await.unwrap());
        let err = client.delete_chat(6).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}

mod message_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_and_create_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app_model/message/7/list/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "text": "how do I boil an egg?", "is_user": true, "created_at": "2024-05-01T10:00:00Z", "chat_id": 7},
                {"id": 2, "text": [{"response": "Ten minutes.", "references": [{"content": "egg faq", "similarity": "88.00%"}]}], "is_user": false, "created_at": "2024-05-01T10:00:05Z", "chat_id": 7}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/app_model/message/7/create/"))
            .and(body_json(json!({"chat_id": 7, "text": "thanks", "is_user": true})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 3, "chat_id": 7, "is_user": true, "text": "thanks", "created_at": "2024-05-01T10:01:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        let messages = client.list_messages(7).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].display_text(), "Ten minutes.");
        assert_eq!(messages[1].references()[0].score_percent(), "88.00%");

        let created = client.create_message(7, "thanks", true).await.unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.chat, Some(7));
    }

    #[tokio::test]
    async fn test_get_answer_string_and_object_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_model/search/information/"))
            .and(body_json(json!({"prompt": "string?"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!("[{\"response\": \"yes\", \"references\": []}]")),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/app_model/search/information/"))
            .and(body_json(json!({"prompt": "object?"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "also yes", "references": []})),
            )
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        let answer = client.get_answer("string?").await.unwrap();
        assert_eq!(answer, "[{\"response\": \"yes\", \"references\": []}]");

        let answer = client.get_answer("object?").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&answer).unwrap();
        assert_eq!(value["response"], "also yes");
    }
}

mod training_tests {
    use super::*;

    #[tokio::test]
    async fn test_train_stores_task_id_and_monitor_uses_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_model/train/model/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Training started successfully.",
                "task_id": "celery-42"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/app_model/monitor/training/"))
            .and(body_json(json!({"task_id": "celery-42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task_id": "celery-42",
                "status": "STARTED",
                "result": "Downloading data from HuggingFace",
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-01T10:00:05Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = logged_in_client(&server);
        assert!(client.train_model().await.unwrap());
        assert_eq!(store.snapshot().task_id.as_deref(), Some("celery-42"));

        let status = client.monitor_training().await.unwrap();
        assert_eq!(status.status, TaskState::Started);
        assert_eq!(
            status.result.as_deref(),
            Some("Downloading data from HuggingFace")
        );
    }

    #[tokio::test]
    async fn test_train_without_task_id_is_noop() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_model/train/model/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "Nothing to do"})),
            )
            .mount(&server)
            .await;

        let (client, store) = logged_in_client(&server);
        assert!(!client.train_model().await.unwrap());
        assert!(store.snapshot().task_id.is_none());
    }

    #[tokio::test]
    async fn test_monitor_without_task_id_sends_nothing() {
        let server = MockServer::start().await;
        let (client, _) = logged_in_client(&server);

        assert!(matches!(
            client.monitor_training().await,
            Err(StackchatError::MissingTaskId)
        ));
        assert_eq!(request_count(&server).await, 0);
    }

    #[tokio::test]
    async fn test_train_error_carries_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app_model/train/model/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Dataset missing"})),
            )
            .mount(&server)
            .await;

        let (client, _) = logged_in_client(&server);
        let err = client.train_model().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "[E3001] Train model failed (HTTP 400): Dataset missing"
        );
    }
}
