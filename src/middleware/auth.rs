use rocket::http::Status;
use rocket::outcome::try_outcome;
use rocket::outcome::Outcome::{Error, Success};
use rocket::request::{self, FromRequest, Request};

use crate::data::user::User;
use crate::data::Db;
use crate::resp::jwt::{forbidden_problem, UserToken};
use crate::resp::problem::{problems, GuardProblem, Problem};
use crate::role::Role;

/// Single authorization policy for every role-gated route.
pub fn authorize(user: Option<User>, required: Role) -> Result<User, Problem> {
    match user {
        Some(user) if user.role.satisfies(required) => Ok(user),
        Some(user) => Err(forbidden_problem(format!(
            "Route requires the {} role, user has {}.",
            required, user.role
        ))),
        None => Err(forbidden_problem("Authenticated user isn't registered.")),
    }
}

/// Looks the token owner up fresh from the store and checks their role.
async fn require_role(req: &Request<'_>, required: Role) -> request::Outcome<(UserToken, User), Problem> {
    let token = try_outcome!(req.guard::<UserToken>().await);

    let db = match req.rocket().state::<Db>() {
        Some(it) => it,
        None => {
            tracing::error!("store isn't managed by rocket");
            return Error((
                Status::InternalServerError,
                problems::internal("Store unavailable."),
            ));
        }
    };

    let user = match db.find_user_by_email(&token.email).await {
        Ok(it) => it,
        Err(e) => return Error((e.status, e)),
    };

    match authorize(user, required) {
        Ok(user) => Success((token, user)),
        Err(e) => {
            tracing::debug!("{} denied access requiring {}", token.email, required);
            GuardProblem::remember(req, &e);
            Error((Status::Forbidden, e))
        }
    }
}

/// Authenticated user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub token: UserToken,
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        require_role(req, Role::Admin)
            .await
            .map(|(token, user)| AdminUser { token, user })
    }
}

/// Authenticated user allowed to teach; admins qualify too.
#[derive(Debug, Clone)]
pub struct InstructorUser {
    pub token: UserToken,
    pub user: User,
}

impl InstructorUser {
    /// Instructors may only manage their own classes, admins may manage all.
    pub fn owns(&self, instructor_email: &str) -> bool {
        self.user.role == Role::Admin || self.user.email == instructor_email
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for InstructorUser {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        require_role(req, Role::Instructor)
            .await
            .map(|(token, user)| InstructorUser { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: None,
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            photo_url: None,
            role,
        }
    }

    #[test]
    fn policy_follows_role_order() {
        assert!(authorize(Some(user(Role::Admin)), Role::Admin).is_ok());
        assert!(authorize(Some(user(Role::Admin)), Role::Instructor).is_ok());
        assert!(authorize(Some(user(Role::Instructor)), Role::Instructor).is_ok());

        let denied = authorize(Some(user(Role::Student)), Role::Instructor).unwrap_err();
        assert_eq!(denied.status, Status::Forbidden);
        assert_eq!(denied.body["message"], "forbidden message");
    }

    #[test]
    fn unknown_users_are_forbidden() {
        let denied = authorize(None, Role::Admin).unwrap_err();
        assert_eq!(denied.status, Status::Forbidden);
    }
}
