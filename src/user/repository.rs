use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;

use super::Id;
use super::model::User;

const USERS_COLLECTION: &str = "users";

#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Id) -> super::Result<User>;

    /// Users matching any of `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<User>>;
}

pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_id(&self, id: &Id) -> super::Result<User> {
        self.collection
            .find_one(doc! { "_id": *id })
            .await?
            .ok_or(super::Error::NotFound(*id))
    }

    async fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;

        let users = cursor.try_collect::<Vec<User>>().await?;

        Ok(users)
    }
}
