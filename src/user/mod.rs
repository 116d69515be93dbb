use std::sync::Arc;

pub mod model;
pub mod repository;

type Result<T> = std::result::Result<T, Error>;
pub type Id = mongodb::bson::oid::ObjectId;
pub type Repository = Arc<dyn repository::UserRepository + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user not found: {0}")]
    NotFound(Id),

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}
