use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::data::class::ClassStatus;
use crate::role::Role;

#[inline]
pub fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

#[inline]
pub fn by_email(email: impl Into<String>) -> Document {
    doc! { "email": email.into() }
}

#[inline]
pub fn by_role(role: Role) -> Document {
    doc! { "role": role }
}

#[inline]
pub fn by_status(status: ClassStatus) -> Document {
    doc! { "status": status }
}

#[inline]
pub fn by_instructor_email(email: impl Into<String>) -> Document {
    doc! { "instructorEmail": email.into() }
}

/// Matches the class only while it still has a free seat.
#[inline]
pub fn with_free_seat(id: ObjectId) -> Document {
    doc! { "_id": id, "availableSeats": { "$gt": 0 } }
}

#[inline]
pub fn set(fields: Document) -> Document {
    doc! { "$set": fields }
}
