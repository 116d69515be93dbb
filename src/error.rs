use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

use crate::{auth, chat, integration, message, user};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed id: {0}")]
    MalformedId(String),

    #[error(transparent)]
    _Auth(#[from] auth::Error),
    #[error(transparent)]
    _Chat(#[from] chat::Error),
    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Integration(#[from] integration::Error),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::MalformedId(_) => StatusCode::BAD_REQUEST,

            Self::_Auth(auth::Error::_User(user::Error::_MongoDB(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::_Auth(_) => StatusCode::UNAUTHORIZED,

            Self::_Chat(chat::Error::NotFound(_))
            | Self::_Message(message::Error::_Chat(chat::Error::NotFound(_)))
            | Self::_Message(message::Error::NotFound(_))
            | Self::_User(user::Error::NotFound(_)) => StatusCode::NOT_FOUND,

            Self::_Message(message::Error::FileTooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::_Message(
                message::Error::UnexpectedField(_)
                | message::Error::MissingField(_)
                | message::Error::_Multipart(_)
                | message::Error::_ParseJson(_),
            ) => StatusCode::BAD_REQUEST,

            Self::_Message(_) | Self::_User(_) | Self::_Integration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let status = self.status();
        let message = if status.is_server_error() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}
