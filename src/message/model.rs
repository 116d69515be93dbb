use std::borrow::Cow;

use chrono::Utc;
use mongodb::bson::DateTime;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::user;
use crate::user::model::{User, UserDto};

use super::Id;

pub const EXCEEDS_LIMIT: &str = "Message exceeds character limit.";
pub const EMPTY_TEXT: &str = "Messages cannot be empty.";

/// Message embedded in a chat document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: Id,
    pub user: user::Id,
    pub timestamp: DateTime,
    pub text: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub edited: bool,
}

impl Message {
    pub fn new(user: user::Id, text: Option<String>, image: Option<String>) -> Self {
        Self {
            id: Id::new(),
            user,
            timestamp: DateTime::now(),
            text,
            image,
            edited: false,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MessageDto {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: Id,
    /// `None` when the author no longer exists.
    pub user: Option<UserDto>,
    pub timestamp: chrono::DateTime<Utc>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub edited: bool,
}

impl MessageDto {
    pub fn new(message: Message, user: Option<User>) -> Self {
        Self {
            id: message.id,
            user: user.map(UserDto::from),
            timestamp: message.timestamp.to_chrono(),
            text: message.text,
            image: message.image,
            edited: message.edited,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct MessageList {
    pub list: Vec<MessageDto>,
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct CreateParams {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(max = 900, message = "Message exceeds character limit."))]
    pub text: String,
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct UpdateParams {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 900, message = "Message exceeds character limit.")
    )]
    pub text: String,
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.map(|t| t.trim().to_owned()).unwrap_or_default())
}

fn not_blank(text: &str) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(EMPTY_TEXT)));
    }

    Ok(())
}

/// Human readable messages of every failed validation, in declaration order.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect()
}
