use std::sync::Arc;

use serde_json::json;
use stackchat_core::{
    ApiClient, ApiConfig, FileSessionStore, NewUser, SessionStore, StackchatError, UserUpdate,
};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A fresh client over the same session file, like a second CLI invocation.
fn client_for(server: &MockServer, dir: &TempDir) -> (ApiClient, Arc<FileSessionStore>) {
    let store = Arc::new(FileSessionStore::new(dir.path().join("session.json")));
    let client = ApiClient::new(&ApiConfig::with_base_url(server.uri()), store.clone()).unwrap();
    (client, store)
}

async fn mount_login(server: &MockServer, access: &str) {
    Mock::given(method("POST"))
        .and(path("/app_auth/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": access, "refresh": "refresh-1"})),
        )
        .mount(server)
        .await;
}

mod account_lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_login_edit_and_delete() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        Mock::given(method("POST"))
            .and(path("/user/create/"))
            .and(body_json(json!({
                "first_name": "Grace",
                "last_name": "Hopper",
                "email": "grace@example.com",
                "password": "Cobol#1959"
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"message": "User created successfully."})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_login(&server, "access-1").await;
        Mock::given(method("GET"))
            .and(path("/user/read/"))
            .and(header("Authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 5,
                "first_name": "Grace",
                "last_name": "Hopper",
                "email": "grace@example.com"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/user/update/"))
            .and(body_json(json!({
                "first_name": "Grace",
                "last_name": "Brewster Hopper",
                "email": "grace@example.com"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "User updated successfully."})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/user/delete/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (first, _) = client_for(&server, &dir);
        let message = first
            .sign_up(&NewUser::new("Grace", "Hopper", "grace@example.com", "Cobol#1959"))
            .await
            .unwrap();
        assert_eq!(message, "User created successfully.");
        assert!(!first.is_authenticated().await);

        first.login("grace@example.com", "Cobol#1959").await.unwrap();

        // Later invocation picks the tokens up from disk.
        let (second, store) = client_for(&server, &dir);
        assert!(second.is_authenticated().await);

        let user = second.read_user().await.unwrap();
        assert_eq!(user.full_name(), "Grace Hopper");

        let update = UserUpdate {
            last_name: "Brewster Hopper".to_string(),
            ..UserUpdate::from(&user)
        };
        let message = second.update_user(&update).await.unwrap();
        assert_eq!(message, "User updated successfully.");

        second.delete_user().await.unwrap();
        assert!(!second.is_authenticated().await);
        assert!(store.load().unwrap().tokens.is_none());
    }

    #[tokio::test]
    async fn test_weak_password_is_rejected_locally() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let (client, _) = client_for(&server, &dir);

        let err = client
            .sign_up(&NewUser::new("Grace", "Hopper", "grace@example.com", "password"))
            .await
            .unwrap_err();

        assert!(matches!(err, StackchatError::ValidationError(_)));
        assert_eq!(err.error_code(), "E4004");
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

mod token_tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_is_used_by_later_requests() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        mount_login(&server, "stale").await;
        Mock::given(method("POST"))
            .and(path("/app_auth/token/refresh/"))
            .and(body_json(json!({"refresh": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/app_model/chat/list/"))
            .and(header("Authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = client_for(&server, &dir);
        client.login("ada@example.com", "Engine#1843").await.unwrap();
        client.refresh_access_token().await.unwrap();

        let session = store.load().unwrap();
        let tokens = session.tokens.unwrap();
        assert_eq!(tokens.access, "fresh");
        assert_eq!(tokens.refresh, "refresh-1");

        assert!(client.list_chats().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_then_logout_clears_tokens() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        mount_login(&server, "expired").await;
        Mock::given(method("GET"))
            .and(path("/app_model/chat/list/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                json!({"detail": "Given token not valid for any token type"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/app_auth/logout/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (client, store) = client_for(&server, &dir);
        client.login("ada@example.com", "Engine#1843").await.unwrap();

        let err = client.list_chats().await.unwrap_err();
        assert!(matches!(err, StackchatError::SessionExpired { .. }));

        let _ = client.logout().await;
        assert!(!client.is_authenticated().await);
        assert!(store.load().unwrap().tokens.is_none());
    }

    #[tokio::test]
    async fn test_login_clears_previous_training_task() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        mount_login(&server, "access-1").await;
        Mock::given(method("POST"))
            .and(path("/app_model/train/model/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(
                json!({"message": "Training started successfully.", "task_id": "t-42"}),
            ))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server, &dir);
        client.login("ada@example.com", "Engine#1843").await.unwrap();
        assert!(client.train_model().await.unwrap());
        assert_eq!(client.session().await.task_id.as_deref(), Some("t-42"));

        client.login("ada@example.com", "Engine#1843").await.unwrap();
        let err = client.monitor_training().await.unwrap_err();
        assert!(matches!(err, StackchatError::MissingTaskId));
    }
}
