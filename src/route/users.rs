use rocket::serde::json::Json;
use rocket::State;

use crate::data::parse_id;
use crate::data::user::db::UserCreated;
use crate::data::user::{AdminCheck, InstructorCheck, User, UserSignupData};
use crate::data::Db;
use crate::middleware::AdminUser;
use crate::resp::ack::UpdateAck;
use crate::resp::jwt::UserToken;
use crate::resp::problem::Problem;
use crate::role::Role;

/// Register a user on first sign-in
#[utoipa::path(
    request_body = UserSignupData,
    responses(
        (status = 200, description = "Insert acknowledgment, or a notice the email is taken", body = UserCreated),
        (status = 400, description = "Invalid user data", body = Problem),
    )
)]
#[post("/users", data = "<user>")]
#[tracing::instrument(skip(db))]
pub async fn user_create(user: Json<UserSignupData>, db: &State<Db>) -> Result<Json<UserCreated>, Problem> {
    user.validate()?;

    Ok(Json(db.create_user(User::from(user.into_inner())).await?))
}

/// List all users
#[utoipa::path(
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/users")]
#[tracing::instrument(skip(db))]
pub async fn user_list(_auth: UserToken, db: &State<Db>) -> Result<Json<Vec<User>>, Problem> {
    Ok(Json(db.list_users().await?))
}

async fn promote(id: &str, role: Role, db: &Db) -> Result<Json<UpdateAck>, Problem> {
    let id = parse_id(id)?;
    let ack = db.set_user_role(id, role).await?;
    tracing::info!("set role of user {} to {}", id, role);

    Ok(Json(ack))
}

/// Make a user an admin
#[utoipa::path(
    params(
        ("id", description = "user ID")
    ),
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 400, description = "Malformed user ID", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[patch("/users/admin/<id>")]
#[tracing::instrument(skip(db))]
pub async fn user_make_admin(id: &str, _admin: AdminUser, db: &State<Db>) -> Result<Json<UpdateAck>, Problem> {
    promote(id, Role::Admin, db).await
}

/// Make a user an instructor
#[utoipa::path(
    params(
        ("id", description = "user ID")
    ),
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 400, description = "Malformed user ID", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[patch("/users/instructor/<id>")]
#[tracing::instrument(skip(db))]
pub async fn user_make_instructor(
    id: &str,
    _admin: AdminUser,
    db: &State<Db>,
) -> Result<Json<UpdateAck>, Problem> {
    promote(id, Role::Instructor, db).await
}

/// Check whether the signed-in user is an admin
#[utoipa::path(
    params(
        ("email", description = "user email")
    ),
    responses(
        (status = 200, description = "Whether the user is an admin", body = AdminCheck),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/users/admin/<email>")]
#[tracing::instrument(skip(db))]
pub async fn user_is_admin(email: &str, auth: UserToken, db: &State<Db>) -> Result<Json<AdminCheck>, Problem> {
    // Users can only ask about themselves
    if auth.email != email {
        return Ok(Json(AdminCheck { admin: false }));
    }

    Ok(Json(AdminCheck {
        admin: db.user_has_role(email, Role::Admin).await?,
    }))
}

/// Check whether the signed-in user is an instructor
#[utoipa::path(
    params(
        ("email", description = "user email")
    ),
    responses(
        (status = 200, description = "Whether the user is an instructor", body = InstructorCheck),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/users/instructor/<email>")]
#[tracing::instrument(skip(db))]
pub async fn user_is_instructor(
    email: &str,
    auth: UserToken,
    db: &State<Db>,
) -> Result<Json<InstructorCheck>, Problem> {
    if auth.email != email {
        return Ok(Json(InstructorCheck { instructor: false }));
    }

    Ok(Json(InstructorCheck {
        instructor: db.user_has_role(email, Role::Instructor).await?,
    }))
}

/// List all instructors
#[utoipa::path(
    responses(
        (status = 200, description = "Users with the instructor role", body = Vec<User>),
    )
)]
#[get("/instructors")]
#[tracing::instrument(skip(db))]
pub async fn instructor_list(db: &State<Db>) -> Result<Json<Vec<User>>, Problem> {
    Ok(Json(db.list_users_with_role(Role::Instructor).await?))
}

///////////////////////
//       TESTS
///////////////////////
