use bson::oid::ObjectId;
use bson::Bson;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};
use crate::util::is_email;

pub mod db;

/// Documents written before payment support have no status and read as `Selected`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStatus {
    #[default]
    Selected,
    Paid,
}

impl SelectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionStatus::Selected => "selected",
            SelectionStatus::Paid => "paid",
        }
    }
}

impl From<SelectionStatus> for Bson {
    fn from(status: SelectionStatus) -> Self {
        Bson::String(status.as_str().to_string())
    }
}

/// A user's cart entry for a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::data::object_id_hex::serialize"
    )]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    pub class_id: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_image: Option<String>,
    #[serde(default)]
    pub instructor_name: String,
    #[serde(default)]
    pub price: f64,
    pub email: String,
    #[serde(default)]
    pub status: SelectionStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionCreateData {
    pub class_id: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub class_image: Option<String>,
    #[serde(default)]
    pub instructor_name: String,
    #[serde(default)]
    pub price: f64,
    #[schema(format = "email")]
    pub email: String,
}

impl SelectionCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        crate::data::parse_id(&self.class_id)
            .map_err(|_| problems::bad_field("classId", "Not a valid class identifier."))?;

        if !is_email(&self.email) {
            return Err(problems::bad_field("email", "Not a valid e-mail address."));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(problems::bad_field("price", "Price must be a non-negative number."));
        }
        Ok(())
    }
}

impl From<SelectionCreateData> for Selection {
    fn from(data: SelectionCreateData) -> Self {
        Selection {
            id: None,
            class_id: data.class_id,
            class_name: data.class_name,
            class_image: data.class_image,
            instructor_name: data.instructor_name,
            price: data.price,
            email: data.email,
            status: SelectionStatus::Selected,
        }
    }
}
