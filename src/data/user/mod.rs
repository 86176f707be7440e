use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};
use crate::role::Role;
use crate::util::is_email;

pub mod db;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::data::object_id_hex::serialize"
    )]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Role::is_student")]
    pub role: Role,
}

/// Body of the sign-in registration request. The role can't be chosen by the client.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSignupData {
    #[schema(format = "email")]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl UserSignupData {
    pub fn validate(&self) -> Result<(), Problem> {
        if !is_email(&self.email) {
            return Err(problems::bad_field("email", "Not a valid e-mail address."));
        }
        Ok(())
    }
}

impl From<UserSignupData> for User {
    fn from(data: UserSignupData) -> Self {
        User {
            id: None,
            email: data.email,
            name: data.name,
            photo_url: data.photo_url,
            role: Role::Student,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct AdminCheck {
    pub admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct InstructorCheck {
    pub instructor: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_role_isnt_serialized() {
        let user = User::from(UserSignupData {
            email: "student@example.com".to_string(),
            name: "Student".to_string(),
            photo_url: None,
        });
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("role").is_none());
        assert!(json.get("_id").is_none());
        assert_eq!(json["email"], "student@example.com");
    }

    #[test]
    fn ids_are_rendered_as_hex() {
        let id = ObjectId::new();
        let user = User {
            id: Some(id),
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            photo_url: None,
            role: Role::Admin,
        };
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["role"], "admin");
    }
}
