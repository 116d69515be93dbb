pub mod model;

pub type Id = mongodb::bson::oid::ObjectId;

pub(crate) const CHATS_COLLECTION: &str = "chats";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("chat not found: {0}")]
    NotFound(Id),
}
