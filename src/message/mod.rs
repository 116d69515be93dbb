use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;
use crate::{chat, user};

mod handler;
pub mod model;
pub mod repository;
pub mod service;
pub mod upload;

type Result<T> = std::result::Result<T, Error>;
pub type Id = mongodb::bson::oid::ObjectId;

pub fn api<S>(state: AppState) -> Router<S> {
    let body_limit = state.upload.body_limit();

    Router::new()
        .route("/chats/{chat_id}/messages", get(handler::find_all))
        .route(
            "/chats/{chat_id}/messages",
            post(handler::create).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/chats/{chat_id}/messages/{message_id}",
            delete(handler::delete)
                .put(handler::update)
                .patch(handler::update),
        )
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("message not found: {0}")]
    NotFound(Id),
    #[error("file exceeds the upload limit of {0} bytes")]
    FileTooLarge(usize),
    #[error("unexpected field: {0}")]
    UnexpectedField(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    _Chat(#[from] chat::Error),
    #[error(transparent)]
    _User(#[from] user::Error),

    #[error(transparent)]
    _Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
    #[error(transparent)]
    _Bson(#[from] mongodb::bson::ser::Error),
    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}
