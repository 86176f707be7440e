use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};
use crate::util::is_email;

pub mod db;

/// A completed charge. Payments are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::data::object_id_hex::serialize"
    )]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    pub email: String,
    pub price: f64,
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreateData {
    #[schema(format = "email")]
    pub email: String,
    pub price: f64,
    pub transaction_id: String,
    #[serde(default)]
    pub selected_class_id: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl PaymentCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if !is_email(&self.email) {
            return Err(problems::bad_field("email", "Not a valid e-mail address."));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(problems::bad_field("price", "Price must be a non-negative number."));
        }
        if self.transaction_id.trim().is_empty() {
            return Err(problems::bad_field(
                "transactionId",
                "Transaction id can't be empty.",
            ));
        }
        Ok(())
    }
}

impl From<PaymentCreateData> for Payment {
    fn from(data: PaymentCreateData) -> Self {
        Payment {
            id: None,
            email: data.email,
            price: data.price,
            transaction_id: data.transaction_id,
            selected_class_id: data.selected_class_id,
            class_name: data.class_name,
            date: data.date.unwrap_or_else(Utc::now),
        }
    }
}
