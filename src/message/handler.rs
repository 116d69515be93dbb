use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use log::debug;
use serde::Deserialize;

use crate::auth;
use crate::error::Error;

use super::model::{MessageList, UpdateParams};
use super::service::{CreateOutcome, MessageService, UpdateOutcome};
use super::{Id, upload};

#[derive(Deserialize)]
pub struct ChatPath {
    chat_id: String,
}

#[derive(Deserialize)]
pub struct MessagePath {
    chat_id: String,
    message_id: String,
}

fn parse_id(raw: &str) -> crate::Result<Id> {
    Id::parse_str(raw).map_err(|_| Error::MalformedId(raw.to_owned()))
}

impl IntoResponse for CreateOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Created => StatusCode::OK.into_response(),
            Self::Ignored => StatusCode::NO_CONTENT.into_response(),
            Self::Invalid(messages) => (StatusCode::BAD_REQUEST, Json(messages)).into_response(),
        }
    }
}

impl IntoResponse for UpdateOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Updated | Self::Unchanged => StatusCode::OK.into_response(),
            Self::Invalid(messages) => (StatusCode::BAD_REQUEST, Json(messages)).into_response(),
        }
    }
}

pub async fn find_all(
    Path(path): Path<ChatPath>,
    message_service: State<MessageService>,
) -> crate::Result<Json<MessageList>> {
    let chat_id = parse_id(&path.chat_id)?;

    let list = message_service.find_all(&chat_id).await?;

    Ok(Json(MessageList { list }))
}

pub async fn create(
    Extension(user): Extension<auth::User>,
    Path(path): Path<ChatPath>,
    upload_config: State<upload::Config>,
    message_service: State<MessageService>,
    multipart: Multipart,
) -> crate::Result<CreateOutcome> {
    let chat_id = parse_id(&path.chat_id)?;

    let form = upload::read_form(multipart, &upload_config).await?;
    let params = form.params()?;

    let outcome = message_service
        .create(&chat_id, user.id(), params, form.file)
        .await?;

    if outcome == CreateOutcome::Ignored {
        debug!(
            "Ignoring empty message from {} in chat {chat_id}",
            user.nickname()
        );
    }

    Ok(outcome)
}

pub async fn update(
    Extension(user): Extension<auth::User>,
    Path(path): Path<MessagePath>,
    message_service: State<MessageService>,
    Json(params): Json<UpdateParams>,
) -> crate::Result<UpdateOutcome> {
    let chat_id = parse_id(&path.chat_id)?;
    let id = parse_id(&path.message_id)?;

    let outcome = message_service.update(&chat_id, &id, params).await?;

    if outcome == UpdateOutcome::Unchanged {
        debug!(
            "Message {id} edited by {} without changes",
            user.nickname()
        );
    }

    Ok(outcome)
}

pub async fn delete(
    Path(path): Path<MessagePath>,
    message_service: State<MessageService>,
) -> crate::Result<StatusCode> {
    let chat_id = parse_id(&path.chat_id)?;
    let id = parse_id(&path.message_id)?;

    message_service.delete(&chat_id, &id).await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth;
    use crate::auth::tests::{SECRET, token_for};
    use crate::chat;
    use crate::chat::model::Chat;
    use crate::integration::Env;
    use crate::message::model::{EMPTY_TEXT, EXCEEDS_LIMIT, Message};
    use crate::message::repository::tests::InMemoryMessageRepository;
    use crate::message::upload;
    use crate::state::AppState;
    use crate::user::model::User;
    use crate::user::repository::tests::InMemoryUserRepository;

    const BOUNDARY: &str = "X-CHAT-BOUNDARY";

    struct TestApp {
        router: Router,
        repository: Arc<InMemoryMessageRepository>,
        chat_id: chat::Id,
        author: User,
        token: String,
    }

    impl TestApp {
        fn new(messages: Vec<Message>, author: User) -> Self {
            Self::with_upload(messages, author, upload::Config::default())
        }

        fn with_upload(messages: Vec<Message>, author: User, upload: upload::Config) -> Self {
            let mut chat = Chat::new(chat::Id::new());
            chat.messages = messages;
            let chat_id = chat.id;

            let repository = Arc::new(InMemoryMessageRepository::with_chats([chat]));
            let users = Arc::new(InMemoryUserRepository::with_users([author.clone()]));

            let state = AppState::new(
                repository.clone(),
                users,
                &auth::Config::new(SECRET),
                upload,
            );

            Self {
                router: crate::app(state, &Env::Local),
                repository,
                chat_id,
                token: token_for(&author.id),
                author,
            }
        }

        fn messages_uri(&self) -> String {
            format!("/api/chats/{}/messages", self.chat_id)
        }

        fn message_uri(&self, id: &impl std::fmt::Display) -> String {
            format!("/api/chats/{}/messages/{id}", self.chat_id)
        }

        fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, body.to_vec())
        }

        async fn messages(&self) -> Vec<Message> {
            self.repository.chat(&self.chat_id).await.unwrap().messages
        }
    }

    fn multipart(json: Option<&str>, file: Option<&[u8]>) -> Body {
        let mut body = Vec::new();
        if let Some(json) = json {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"json\"\r\n\r\n{json}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(file) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"pic.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(file);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    fn alice() -> User {
        User::new("alice", "Alice")
    }

    async fn post_form(app: &TestApp, body: Body) -> (StatusCode, Vec<u8>) {
        let request = app
            .request("POST", &app.messages_uri())
            .header(header::CONTENT_TYPE, multipart_content_type())
            .body(body)
            .unwrap();
        app.send(request).await
    }

    async fn put_text(app: &TestApp, id: &chat::Id, json: &str) -> (StatusCode, Vec<u8>) {
        let request = app
            .request("PUT", &app.message_uri(id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_owned()))
            .unwrap();
        app.send(request).await
    }

    #[tokio::test]
    async fn list_returns_messages_with_expanded_users() {
        let author = alice();
        let first = Message::new(author.id, Some("one".to_owned()), None);
        let second = Message::new(author.id, None, Some("data:image/jpeg;base64,AA==".to_owned()));
        let app = TestApp::new(vec![first.clone(), second.clone()], author.clone());

        let request = app
            .request("GET", &app.messages_uri())
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send(request).await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        let list = json["list"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["_id"], first.id.to_hex());
        assert_eq!(list[0]["text"], "one");
        assert_eq!(list[0]["user"]["_id"], author.id.to_hex());
        assert_eq!(list[0]["user"]["name"], "Alice");
        assert_eq!(list[1]["_id"], second.id.to_hex());
        assert_eq!(list[1]["text"], Value::Null);
    }

    #[tokio::test]
    async fn list_of_unknown_chat_is_not_found() {
        let app = TestApp::new(Vec::new(), alice());

        let request = app
            .request("GET", &format!("/api/chats/{}/messages", chat::Id::new()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_chat_id_is_bad_request() {
        let app = TestApp::new(Vec::new(), alice());

        let request = app
            .request("GET", "/api/chats/not-an-id/messages")
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn requests_without_token_are_unauthorized() {
        let app = TestApp::new(Vec::new(), alice());

        let request = Request::builder()
            .uri(app.messages_uri())
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn tokens_of_unknown_users_are_unauthorized() {
        let app = TestApp::new(Vec::new(), alice());

        let request = Request::builder()
            .uri(app.messages_uri())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(&crate::user::Id::new())),
            )
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_text_message() {
        let app = TestApp::new(Vec::new(), alice());

        let (status, body) = post_form(&app, multipart(Some(r#"{"text":"  hi there "}"#), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        let messages = app.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].user, app.author.id);
        assert_eq!(messages[0].text.as_deref(), Some("hi there"));
        assert_eq!(messages[0].image, None);
    }

    #[tokio::test]
    async fn create_image_message() {
        let app = TestApp::new(Vec::new(), alice());

        let (status, _) = post_form(&app, multipart(Some("{}"), Some(&b"\x89PNG"[..]))).await;

        assert_eq!(status, StatusCode::OK);
        let messages = app.messages().await;
        assert_eq!(messages[0].text, None);
        assert_eq!(
            messages[0].image.as_deref(),
            Some("data:image/jpeg;base64,iVBORw==")
        );
    }

    #[tokio::test]
    async fn create_with_long_text_lists_validation_messages() {
        let app = TestApp::new(Vec::new(), alice());
        let json = format!(r#"{{"text":"{}"}}"#, "x".repeat(901));

        let (status, body) = post_form(&app, multipart(Some(&json), None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let messages: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(messages, vec![EXCEEDS_LIMIT]);
        assert!(app.messages().await.is_empty());
    }

    #[tokio::test]
    async fn create_without_text_or_file_answers_nothing() {
        let app = TestApp::new(Vec::new(), alice());

        let (status, body) = post_form(&app, multipart(Some(r#"{"text":"   "}"#), None)).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
        assert!(app.messages().await.is_empty());
    }

    #[tokio::test]
    async fn create_with_malformed_json_field_is_bad_request() {
        let app = TestApp::new(Vec::new(), alice());

        let (status, _) = post_form(&app, multipart(Some("{text"), None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.messages().await.is_empty());
    }

    #[tokio::test]
    async fn create_with_oversized_file_is_rejected() {
        let app = TestApp::with_upload(Vec::new(), alice(), upload::Config::new(8));

        let (status, _) = post_form(&app, multipart(Some("{}"), Some(&[0u8; 16][..]))).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(app.messages().await.is_empty());
    }

    #[tokio::test]
    async fn update_edits_text() {
        let author = alice();
        let msg = Message::new(author.id, Some("before".to_owned()), None);
        let app = TestApp::new(vec![msg.clone()], author);

        let (status, body) = put_text(&app, &msg.id, r#"{"text":" after "}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        let messages = app.messages().await;
        assert_eq!(messages[0].text.as_deref(), Some("after"));
        assert!(messages[0].edited);
    }

    #[tokio::test]
    async fn update_with_patch_is_accepted() {
        let author = alice();
        let msg = Message::new(author.id, Some("before".to_owned()), None);
        let app = TestApp::new(vec![msg.clone()], author);

        let request = app
            .request("PATCH", &app.message_uri(&msg.id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"text":"after"}"#))
            .unwrap();
        let (status, _) = app.send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.messages().await[0].text.as_deref(), Some("after"));
    }

    #[tokio::test]
    async fn update_with_same_text_succeeds_without_change() {
        let author = alice();
        let msg = Message::new(author.id, Some("same".to_owned()), None);
        let app = TestApp::new(vec![msg.clone()], author);

        let (status, _) = put_text(&app, &msg.id, r#"{"text":"same "}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.messages().await, vec![msg]);
    }

    #[tokio::test]
    async fn update_with_blank_text_is_bad_request() {
        let author = alice();
        let msg = Message::new(author.id, Some("before".to_owned()), None);
        let app = TestApp::new(vec![msg.clone()], author);

        let (status, body) = put_text(&app, &msg.id, r#"{"text":"  "}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let messages: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(messages, vec![EMPTY_TEXT]);
        assert_eq!(app.messages().await, vec![msg]);
    }

    #[tokio::test]
    async fn update_with_long_text_is_bad_request() {
        let author = alice();
        let msg = Message::new(author.id, Some("before".to_owned()), None);
        let app = TestApp::new(vec![msg.clone()], author);
        let json = format!(r#"{{"text":"{}"}}"#, "x".repeat(901));

        let (status, body) = put_text(&app, &msg.id, &json).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let messages: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(messages, vec![EXCEEDS_LIMIT]);
    }

    #[tokio::test]
    async fn delete_twice_succeeds_both_times() {
        let author = alice();
        let msg = Message::new(author.id, Some("bye".to_owned()), None);
        let app = TestApp::new(vec![msg.clone()], author);

        for _ in 0..2 {
            let request = app
                .request("DELETE", &app.message_uri(&msg.id))
                .body(Body::empty())
                .unwrap();
            let (status, body) = app.send(request).await;

            assert_eq!(status, StatusCode::OK);
            assert!(body.is_empty());
            assert!(app.messages().await.is_empty());
        }
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = TestApp::new(Vec::new(), alice());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;

        assert_eq!(status, StatusCode::OK);
    }
}
