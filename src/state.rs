use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{self, Verifier};
use crate::integration::{self, db};
use crate::message::repository::{MessageRepository, MongoMessageRepository};
use crate::message::service::MessageService;
use crate::message::upload;
use crate::user;
use crate::user::repository::MongoUserRepository;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub message_service: MessageService,
    pub user_repository: user::Repository,
    pub verifier: Verifier,
    pub upload: upload::Config,
}

impl AppState {
    pub fn new(
        message_repository: Arc<dyn MessageRepository + Send + Sync>,
        user_repository: user::Repository,
        auth: &auth::Config,
        upload: upload::Config,
    ) -> Self {
        Self {
            message_service: MessageService::new(message_repository, user_repository.clone()),
            user_repository,
            verifier: Verifier::new(auth),
            upload,
        }
    }

    pub fn init(config: &integration::Config) -> crate::Result<Self> {
        let database = db::init(&config.mongo)?;

        Ok(Self::new(
            Arc::new(MongoMessageRepository::new(&database)),
            Arc::new(MongoUserRepository::new(&database)),
            &config.auth,
            config.upload.clone(),
        ))
    }
}
