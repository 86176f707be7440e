use bson::doc;
use bson::oid::ObjectId;
use mongodb::Database;
use rocket::futures::TryStreamExt;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::USER_COLLECTION_NAME;
use crate::data::{filter, DbResult};
use crate::resp::ack::{InsertAck, UpdateAck};
use crate::role::Role;

use super::User;

/// Result of registering a user: either the new record or a notice it already exists.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UserCreated {
    Inserted(InsertAck),
    Exists { message: String },
}

impl UserCreated {
    pub fn exists() -> UserCreated {
        UserCreated::Exists {
            message: "user already exists".to_string(),
        }
    }
}

#[rocket::async_trait]
pub trait UserDbExt: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>>;

    async fn insert_user(&self, user: &User) -> DbResult<InsertAck>;

    async fn list_users(&self) -> DbResult<Vec<User>>;

    async fn list_users_with_role(&self, role: Role) -> DbResult<Vec<User>>;

    async fn set_user_role(&self, id: ObjectId, role: Role) -> DbResult<UpdateAck>;

    /// Inserts the user unless one with the same email is already stored.
    async fn create_user(&self, user: User) -> DbResult<UserCreated> {
        if self.find_user_by_email(&user.email).await?.is_some() {
            tracing::debug!("user with email {} already exists", user.email);
            return Ok(UserCreated::exists());
        }

        let ack = self.insert_user(&user).await?;
        tracing::info!("created user {} with id {}", user.email, ack.inserted_id);

        Ok(UserCreated::Inserted(ack))
    }

    async fn user_has_role(&self, email: &str, role: Role) -> DbResult<bool> {
        Ok(self
            .find_user_by_email(email)
            .await?
            .map(|user| user.role == role)
            .unwrap_or(false))
    }
}

#[rocket::async_trait]
impl UserDbExt for Database {
    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(self
            .collection::<User>(USER_COLLECTION_NAME)
            .find_one(filter::by_email(email), None)
            .await?)
    }

    async fn insert_user(&self, user: &User) -> DbResult<InsertAck> {
        Ok(self
            .collection::<User>(USER_COLLECTION_NAME)
            .insert_one(user, None)
            .await?
            .into())
    }

    async fn list_users(&self) -> DbResult<Vec<User>> {
        let cursor = self
            .collection::<User>(USER_COLLECTION_NAME)
            .find(doc! {}, None)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn list_users_with_role(&self, role: Role) -> DbResult<Vec<User>> {
        let cursor = self
            .collection::<User>(USER_COLLECTION_NAME)
            .find(filter::by_role(role), None)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn set_user_role(&self, id: ObjectId, role: Role) -> DbResult<UpdateAck> {
        Ok(self
            .collection::<User>(USER_COLLECTION_NAME)
            .update_one(filter::by_id(id), filter::set(doc! { "role": role }), None)
            .await?
            .into())
    }
}
