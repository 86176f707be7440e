use bson::oid::ObjectId;

use crate::resp::problem::{problems, Problem};

pub mod class;
pub mod filter;
pub mod memory;
pub mod payment;
pub mod selection;
pub mod user;

use class::db::ClassDbExt;
use payment::db::PaymentDbExt;
use selection::db::SelectionDbExt;
use user::db::UserDbExt;

// TODO: Store fns shouldn't be erroring with Problem, a store error type would let
// guards tell a missing user apart from an unreachable database.
pub type DbResult<T> = Result<T, Problem>;

/// Everything the routes need from a document store.
pub trait Store: UserDbExt + ClassDbExt + SelectionDbExt + PaymentDbExt + Send + Sync {}

impl<T> Store for T where T: UserDbExt + ClassDbExt + SelectionDbExt + PaymentDbExt + Send + Sync {}

/// Store handle kept in rocket managed state.
pub type Db = Box<dyn Store>;

pub fn parse_id(id: &str) -> Result<ObjectId, Problem> {
    ObjectId::parse_str(id).map_err(|_| problems::bad_id(id))
}

/// Serializes document ids as hex strings in JSON responses.
pub(crate) mod object_id_hex {
    use bson::oid::ObjectId;
    use serde::Serializer;

    pub fn serialize<S>(id: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => serializer.serialize_str(&id.to_hex()),
            None => serializer.serialize_none(),
        }
    }
}
