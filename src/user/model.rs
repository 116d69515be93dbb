use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub nickname: String,
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

impl User {
    pub fn new(nickname: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            nickname: nickname.into(),
            name: name.into(),
            picture: String::new(),
        }
    }
}

/// Public representation used when a user is expanded into another resource.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserDto {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: Id,
    pub nickname: String,
    pub name: String,
    pub picture: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            name: user.name,
            picture: user.picture,
        }
    }
}
