use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use log::debug;
use validator::Validate;

use crate::{chat, user};

use super::Id;
use super::model::{CreateParams, Message, MessageDto, UpdateParams, validation_messages};
use super::repository::MessageRepository;
use super::upload;

/// Result of a create request that did not fault.
#[derive(Debug, PartialEq)]
pub enum CreateOutcome {
    Created,
    /// Neither text nor file was sent; nothing is stored and nothing is answered.
    Ignored,
    Invalid(Vec<String>),
}

/// Result of an update request that did not fault.
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    Updated,
    /// The text equals the stored one; nothing is written.
    Unchanged,
    Invalid(Vec<String>),
}

#[derive(Clone)]
pub struct MessageService {
    repository: Arc<dyn MessageRepository + Send + Sync>,
    user_repository: user::Repository,
}

impl MessageService {
    pub fn new(
        repository: Arc<dyn MessageRepository + Send + Sync>,
        user_repository: user::Repository,
    ) -> Self {
        Self {
            repository,
            user_repository,
        }
    }
}

impl MessageService {
    /// Messages of the chat in stored order, authors expanded.
    pub async fn find_all(&self, chat_id: &chat::Id) -> super::Result<Vec<MessageDto>> {
        let chat = self.repository.find_chat(chat_id).await?;

        let author_ids = chat
            .messages
            .iter()
            .map(|m| m.user)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        let authors = self
            .user_repository
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect::<HashMap<_, _>>();

        let messages = chat
            .messages
            .into_iter()
            .map(|m| {
                let author = authors.get(&m.user).cloned();
                MessageDto::new(m, author)
            })
            .collect();

        Ok(messages)
    }

    pub async fn create(
        &self,
        chat_id: &chat::Id,
        author: &user::Id,
        params: CreateParams,
        file: Option<Bytes>,
    ) -> super::Result<CreateOutcome> {
        if file.is_none() && params.text.is_empty() {
            return Ok(CreateOutcome::Ignored);
        }

        if let Err(e) = params.validate() {
            return Ok(CreateOutcome::Invalid(validation_messages(&e)));
        }

        let text = Some(params.text).filter(|t| !t.is_empty());
        let image = file.as_deref().map(upload::data_uri);

        let message = Message::new(*author, text, image);
        self.repository.push(chat_id, &message).await?;

        debug!("Message {} appended to chat {chat_id}", message.id);
        Ok(CreateOutcome::Created)
    }

    pub async fn update(
        &self,
        chat_id: &chat::Id,
        id: &Id,
        params: UpdateParams,
    ) -> super::Result<UpdateOutcome> {
        let chat = self.repository.find_chat(chat_id).await?;
        let stored = chat.message(id).ok_or(super::Error::NotFound(*id))?;

        if stored.text.as_deref() == Some(params.text.as_str()) {
            return Ok(UpdateOutcome::Unchanged);
        }

        if let Err(e) = params.validate() {
            return Ok(UpdateOutcome::Invalid(validation_messages(&e)));
        }

        self.repository
            .update_text(chat_id, id, &params.text)
            .await?;

        Ok(UpdateOutcome::Updated)
    }

    /// Removes the message if present; absent ids are not an error.
    pub async fn delete(&self, chat_id: &chat::Id, id: &Id) -> super::Result<()> {
        self.repository.pull(chat_id, id).await
    }
}
