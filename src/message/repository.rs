use async_trait::async_trait;
use mongodb::bson::doc;

use crate::chat;
use crate::chat::model::Chat;

use super::Id;
use super::model::Message;

/// Messages live embedded in their chat document, every operation is scoped by the chat id.
#[async_trait]
pub trait MessageRepository {
    async fn find_chat(&self, chat_id: &chat::Id) -> super::Result<Chat>;

    /// Appends to the chat and bumps its `most_recent_update`.
    async fn push(&self, chat_id: &chat::Id, message: &Message) -> super::Result<()>;

    /// Sets the text of the matching message and marks it edited.
    async fn update_text(&self, chat_id: &chat::Id, id: &Id, text: &str) -> super::Result<()>;

    async fn pull(&self, chat_id: &chat::Id, id: &Id) -> super::Result<()>;
}

pub struct MongoMessageRepository {
    collection: mongodb::Collection<Chat>,
}

impl MongoMessageRepository {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            collection: database.collection(chat::CHATS_COLLECTION),
        }
    }
}

#[async_trait]
impl MessageRepository for MongoMessageRepository {
    async fn find_chat(&self, chat_id: &chat::Id) -> super::Result<Chat> {
        let chat = self
            .collection
            .find_one(doc! { "_id": *chat_id })
            .await?
            .ok_or(chat::Error::NotFound(*chat_id))?;

        Ok(chat)
    }

    async fn push(&self, chat_id: &chat::Id, message: &Message) -> super::Result<()> {
        let bson = mongodb::bson::to_bson(message)?;

        self.collection
            .update_one(
                doc! { "_id": *chat_id },
                doc! {
                    "$push": { "messages": bson },
                    "$set": { "most_recent_update": message.timestamp },
                },
            )
            .await?;

        Ok(())
    }

    async fn update_text(&self, chat_id: &chat::Id, id: &Id, text: &str) -> super::Result<()> {
        self.collection
            .update_one(
                doc! { "_id": *chat_id, "messages._id": *id },
                doc! {"$set": {
                    "messages.$.text": text,
                    "messages.$.edited": true,
                }},
            )
            .await?;

        Ok(())
    }

    async fn pull(&self, chat_id: &chat::Id, id: &Id) -> super::Result<()> {
        self.collection
            .update_one(
                doc! { "_id": *chat_id },
                doc! { "$pull": { "messages": { "_id": *id } } },
            )
            .await?;

        Ok(())
    }
}
