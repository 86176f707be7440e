use bson::doc;
use bson::oid::ObjectId;
use mongodb::Database;
use rocket::futures::TryStreamExt;

use crate::config::SELECTION_COLLECTION_NAME;
use crate::data::{filter, DbResult};
use crate::resp::ack::{DeleteAck, InsertAck, UpdateAck};

use super::{Selection, SelectionStatus};

#[rocket::async_trait]
pub trait SelectionDbExt: Send + Sync {
    async fn insert_selection(&self, selection: &Selection) -> DbResult<InsertAck>;

    async fn get_selection(&self, id: ObjectId) -> DbResult<Option<Selection>>;

    async fn list_selections_by_email(&self, email: &str) -> DbResult<Vec<Selection>>;

    async fn mark_selection_paid(&self, id: ObjectId) -> DbResult<UpdateAck>;

    async fn delete_selection(&self, id: ObjectId) -> DbResult<DeleteAck>;
}

#[rocket::async_trait]
impl SelectionDbExt for Database {
    async fn insert_selection(&self, selection: &Selection) -> DbResult<InsertAck> {
        Ok(self
            .collection::<Selection>(SELECTION_COLLECTION_NAME)
            .insert_one(selection, None)
            .await?
            .into())
    }

    async fn get_selection(&self, id: ObjectId) -> DbResult<Option<Selection>> {
        Ok(self
            .collection::<Selection>(SELECTION_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await?)
    }

    async fn list_selections_by_email(&self, email: &str) -> DbResult<Vec<Selection>> {
        let cursor = self
            .collection::<Selection>(SELECTION_COLLECTION_NAME)
            .find(filter::by_email(email), None)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn mark_selection_paid(&self, id: ObjectId) -> DbResult<UpdateAck> {
        Ok(self
            .collection::<Selection>(SELECTION_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                filter::set(doc! { "status": SelectionStatus::Paid }),
                None,
            )
            .await?
            .into())
    }

    async fn delete_selection(&self, id: ObjectId) -> DbResult<DeleteAck> {
        Ok(self
            .collection::<Selection>(SELECTION_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await?
            .into())
    }
}
