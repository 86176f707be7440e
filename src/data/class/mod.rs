use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};
use crate::util::is_email;

pub mod db;

/// Review state of a submitted class.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    #[default]
    Pending,
    Approved,
    Deny,
}

impl ClassStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassStatus::Pending => "pending",
            ClassStatus::Approved => "approved",
            ClassStatus::Deny => "deny",
        }
    }
}

impl From<ClassStatus> for Bson {
    fn from(status: ClassStatus) -> Self {
        Bson::String(status.as_str().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::data::object_id_hex::serialize"
    )]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_image: Option<String>,
    #[serde(default)]
    pub instructor_name: String,
    pub instructor_email: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub available_seats: i32,
    #[serde(default)]
    pub total_student: i32,
    #[serde(default)]
    pub status: ClassStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Class submitted by an instructor. New classes always start pending review.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassCreateData {
    pub class_name: String,
    #[serde(default)]
    pub class_image: Option<String>,
    #[serde(default)]
    pub instructor_name: String,
    #[schema(format = "email")]
    pub instructor_email: String,
    pub price: f64,
    pub available_seats: i32,
}

fn check_price(price: f64) -> Result<(), Problem> {
    if !price.is_finite() || price < 0.0 {
        return Err(problems::bad_field("price", "Price must be a non-negative number."));
    }
    Ok(())
}

fn check_seats(seats: i32) -> Result<(), Problem> {
    if seats < 0 {
        return Err(problems::bad_field(
            "availableSeats",
            "Available seats can't be negative.",
        ));
    }
    Ok(())
}

impl ClassCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if self.class_name.trim().is_empty() {
            return Err(problems::bad_field("className", "Class name can't be empty."));
        }
        if !is_email(&self.instructor_email) {
            return Err(problems::bad_field(
                "instructorEmail",
                "Not a valid e-mail address.",
            ));
        }
        check_price(self.price)?;
        check_seats(self.available_seats)
    }
}

impl From<ClassCreateData> for Class {
    fn from(data: ClassCreateData) -> Self {
        Class {
            id: None,
            class_name: data.class_name,
            class_image: data.class_image,
            instructor_name: data.instructor_name,
            instructor_email: data.instructor_email,
            price: data.price,
            available_seats: data.available_seats,
            total_student: 0,
            status: ClassStatus::Pending,
            feedback: None,
        }
    }
}

/// Fields an instructor may change on an existing class.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfoUpdate {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub class_image: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub available_seats: Option<i32>,
}

impl ClassInfoUpdate {
    pub fn validate(&self) -> Result<(), Problem> {
        if self.is_empty() {
            return Err(problems::bad_field("body", "Nothing to update."));
        }
        if let Some(name) = &self.class_name {
            if name.trim().is_empty() {
                return Err(problems::bad_field("className", "Class name can't be empty."));
            }
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(seats) = self.available_seats {
            check_seats(seats)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.class_name.is_none()
            && self.class_image.is_none()
            && self.price.is_none()
            && self.available_seats.is_none()
    }

    /// Fields for a `$set` update document.
    pub fn to_document(&self) -> Document {
        let mut fields = doc! {};
        if let Some(name) = &self.class_name {
            fields.insert("className", name.clone());
        }
        if let Some(image) = &self.class_image {
            fields.insert("classImage", image.clone());
        }
        if let Some(price) = self.price {
            fields.insert("price", price);
        }
        if let Some(seats) = self.available_seats {
            fields.insert("availableSeats", seats);
        }
        fields
    }

    pub fn apply(&self, class: &mut Class) {
        if let Some(name) = &self.class_name {
            class.class_name = name.clone();
        }
        if let Some(image) = &self.class_image {
            class.class_image = Some(image.clone());
        }
        if let Some(price) = self.price {
            class.price = price;
        }
        if let Some(seats) = self.available_seats {
            class.available_seats = seats;
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeedbackData {
    pub feedback: String,
}
