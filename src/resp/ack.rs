//! Store acknowledgments, shaped like the MongoDB driver's JSON results.

use bson::oid::ObjectId;
use bson::Bson;
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertAck {
    pub fn new(id: ObjectId) -> InsertAck {
        InsertAck {
            acknowledged: true,
            inserted_id: id.to_hex(),
        }
    }
}

impl From<InsertOneResult> for InsertAck {
    fn from(result: InsertOneResult) -> Self {
        let inserted_id = match result.inserted_id {
            Bson::ObjectId(id) => id.to_hex(),
            other => other.to_string(),
        };

        InsertAck {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateAck {
    pub fn new(matched_count: u64, modified_count: u64) -> UpdateAck {
        UpdateAck {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_id: None,
        }
    }
}

impl From<UpdateResult> for UpdateAck {
    fn from(result: UpdateResult) -> Self {
        UpdateAck {
            upserted_id: result.upserted_id.map(|id| match id {
                Bson::ObjectId(id) => id.to_hex(),
                other => other.to_string(),
            }),
            ..UpdateAck::new(result.matched_count, result.modified_count)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> DeleteAck {
        DeleteAck {
            acknowledged: true,
            deleted_count,
        }
    }
}

impl From<DeleteResult> for DeleteAck {
    fn from(result: DeleteResult) -> Self {
        DeleteAck::new(result.deleted_count)
    }
}
