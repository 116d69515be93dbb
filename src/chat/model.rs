use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::message;
use crate::message::model::Message;

use super::Id;

/// Chat document with its messages embedded in insertion order.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Chat {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_recent_update: Option<DateTime>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Chat {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            most_recent_update: None,
            messages: Vec::new(),
        }
    }

    pub fn message(&self, id: &message::Id) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }
}
