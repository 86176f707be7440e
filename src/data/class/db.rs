use bson::doc;
use bson::oid::ObjectId;
use mongodb::Database;
use rocket::futures::TryStreamExt;

use crate::config::CLASS_COLLECTION_NAME;
use crate::data::{filter, DbResult};
use crate::resp::ack::{InsertAck, UpdateAck};

use super::{Class, ClassInfoUpdate, ClassStatus};

#[rocket::async_trait]
pub trait ClassDbExt: Send + Sync {
    async fn insert_class(&self, class: &Class) -> DbResult<InsertAck>;

    async fn get_class(&self, id: ObjectId) -> DbResult<Option<Class>>;

    async fn list_classes(&self) -> DbResult<Vec<Class>>;

    async fn list_classes_by_instructor(&self, email: &str) -> DbResult<Vec<Class>>;

    async fn list_classes_with_status(&self, status: ClassStatus) -> DbResult<Vec<Class>>;

    async fn set_class_status(&self, id: ObjectId, status: ClassStatus) -> DbResult<UpdateAck>;

    async fn set_class_feedback(&self, id: ObjectId, feedback: &str) -> DbResult<UpdateAck>;

    async fn update_class_info(&self, id: ObjectId, update: &ClassInfoUpdate) -> DbResult<UpdateAck>;

    /// Takes one seat and counts one more student in a single conditional update.
    ///
    /// Nothing is matched when the class doesn't exist or has no seats left.
    async fn enroll_student(&self, id: ObjectId) -> DbResult<UpdateAck>;
}

#[rocket::async_trait]
impl ClassDbExt for Database {
    async fn insert_class(&self, class: &Class) -> DbResult<InsertAck> {
        Ok(self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .insert_one(class, None)
            .await?
            .into())
    }

    async fn get_class(&self, id: ObjectId) -> DbResult<Option<Class>> {
        Ok(self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await?)
    }

    async fn list_classes(&self) -> DbResult<Vec<Class>> {
        let cursor = self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .find(doc! {}, None)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn list_classes_by_instructor(&self, email: &str) -> DbResult<Vec<Class>> {
        let cursor = self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .find(filter::by_instructor_email(email), None)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn list_classes_with_status(&self, status: ClassStatus) -> DbResult<Vec<Class>> {
        let cursor = self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .find(filter::by_status(status), None)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn set_class_status(&self, id: ObjectId, status: ClassStatus) -> DbResult<UpdateAck> {
        Ok(self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .update_one(filter::by_id(id), filter::set(doc! { "status": status }), None)
            .await?
            .into())
    }

    async fn set_class_feedback(&self, id: ObjectId, feedback: &str) -> DbResult<UpdateAck> {
        Ok(self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                filter::set(doc! { "feedback": feedback }),
                None,
            )
            .await?
            .into())
    }

    async fn update_class_info(&self, id: ObjectId, update: &ClassInfoUpdate) -> DbResult<UpdateAck> {
        Ok(self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .update_one(filter::by_id(id), filter::set(update.to_document()), None)
            .await?
            .into())
    }

    async fn enroll_student(&self, id: ObjectId) -> DbResult<UpdateAck> {
        Ok(self
            .collection::<Class>(CLASS_COLLECTION_NAME)
            .update_one(
                filter::with_free_seat(id),
                doc! { "$inc": { "availableSeats": -1, "totalStudent": 1 } },
                None,
            )
            .await?
            .into())
    }
}
