use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User role. Students are stored without a `role` field.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    pub fn is_student(&self) -> bool {
        *self == Role::Student
    }

    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Role> for bson::Bson {
    fn from(role: Role) -> Self {
        bson::Bson::String(role.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(Role::Admin.satisfies(Role::Instructor));
        assert!(Role::Instructor.satisfies(Role::Instructor));
        assert!(!Role::Student.satisfies(Role::Instructor));
        assert!(!Role::Instructor.satisfies(Role::Admin));
    }

    #[test]
    fn roles_use_stored_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"instructor\"").unwrap();
        assert_eq!(role, Role::Instructor);
    }
}
