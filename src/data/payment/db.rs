use mongodb::Database;
use rocket::futures::TryStreamExt;

use crate::config::PAYMENT_COLLECTION_NAME;
use crate::data::{filter, DbResult};
use crate::resp::ack::InsertAck;

use super::Payment;

#[rocket::async_trait]
pub trait PaymentDbExt: Send + Sync {
    async fn insert_payment(&self, payment: &Payment) -> DbResult<InsertAck>;

    async fn list_payments_by_email(&self, email: &str) -> DbResult<Vec<Payment>>;
}

#[rocket::async_trait]
impl PaymentDbExt for Database {
    async fn insert_payment(&self, payment: &Payment) -> DbResult<InsertAck> {
        Ok(self
            .collection::<Payment>(PAYMENT_COLLECTION_NAME)
            .insert_one(payment, None)
            .await?
            .into())
    }

    async fn list_payments_by_email(&self, email: &str) -> DbResult<Vec<Payment>> {
        let cursor = self
            .collection::<Payment>(PAYMENT_COLLECTION_NAME)
            .find(filter::by_email(email), None)
            .await?;

        Ok(cursor.try_collect().await?)
    }
}
