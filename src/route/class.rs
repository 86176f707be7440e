use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use crate::data::class::{Class, ClassCreateData, ClassInfoUpdate, ClassStatus, FeedbackData};
use crate::data::{parse_id, Db};
use crate::middleware::{AdminUser, InstructorUser};
use crate::resp::ack::{InsertAck, UpdateAck};
use crate::resp::jwt::forbidden_problem;
use crate::resp::problem::{problems, Problem};

/// Submit a class for review
#[utoipa::path(
    request_body = ClassCreateData,
    responses(
        (status = 200, description = "Insert acknowledgment", body = InsertAck),
        (status = 400, description = "Invalid class data", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Caller can't teach or submits for someone else", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[post("/allClasses", data = "<class>")]
#[tracing::instrument(skip(db))]
pub async fn class_create(
    class: Json<ClassCreateData>,
    instructor: InstructorUser,
    db: &State<Db>,
) -> Result<Json<InsertAck>, Problem> {
    class.validate()?;

    if !instructor.owns(&class.instructor_email) {
        return Err(forbidden_problem("Instructors can only submit their own classes."));
    }

    let ack = db.insert_class(&Class::from(class.into_inner())).await?;
    tracing::info!("class {} submitted for review", ack.inserted_id);

    Ok(Json(ack))
}

/// List all classes
#[utoipa::path(
    responses(
        (status = 200, description = "All classes", body = Vec<Class>),
    )
)]
#[get("/allClasses")]
#[tracing::instrument(skip(db))]
pub async fn class_list(db: &State<Db>) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(db.list_classes().await?))
}

/// Get a single class
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Class information", body = Class),
        (status = 400, description = "Malformed class ID", body = Problem),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
    )
)]
#[get("/updateOne/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_info(id: &str, db: &State<Db>) -> Result<Option<Json<Class>>, Problem> {
    let id = parse_id(id)?;

    Ok(db.get_class(id).await?.map(Json))
}

/// List classes taught by an instructor
#[utoipa::path(
    params(
        ("email", description = "instructor email")
    ),
    responses(
        (status = 200, description = "Classes of the instructor", body = Vec<Class>),
        (status = 400, description = "Missing email", body = Problem),
    )
)]
#[get("/classesByInstructorEmail?<email>")]
#[tracing::instrument(skip(db))]
pub async fn class_list_by_instructor(email: Option<&str>, db: &State<Db>) -> Result<Json<Vec<Class>>, Problem> {
    let email = email.ok_or_else(|| problems::bad_field("email", "Instructor email is required."))?;

    Ok(Json(db.list_classes_by_instructor(email).await?))
}

/// List classes approved for enrollment
#[utoipa::path(
    responses(
        (status = 200, description = "Approved classes", body = Vec<Class>),
    )
)]
#[get("/approvedClasses")]
#[tracing::instrument(skip(db))]
pub async fn class_list_approved(db: &State<Db>) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(db.list_classes_with_status(ClassStatus::Approved).await?))
}

async fn review(id: &str, status: ClassStatus, db: &Db) -> Result<Json<UpdateAck>, Problem> {
    let id = parse_id(id)?;
    let ack = db.set_class_status(id, status).await?;
    tracing::info!("class {} marked {}", id, status.as_str());

    Ok(Json(ack))
}

/// Approve a class
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[put("/updateStatusApproved/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_approve(id: &str, _admin: AdminUser, db: &State<Db>) -> Result<Json<UpdateAck>, Problem> {
    review(id, ClassStatus::Approved, db).await
}

/// Deny a class
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[put("/updateStatusDeny/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_deny(id: &str, _admin: AdminUser, db: &State<Db>) -> Result<Json<UpdateAck>, Problem> {
    review(id, ClassStatus::Deny, db).await
}

/// Attach review feedback to a class
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    request_body = FeedbackData,
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[patch("/updateFeedback/<id>", data = "<feedback>")]
#[tracing::instrument(skip(db))]
pub async fn class_feedback(
    id: &str,
    feedback: Json<FeedbackData>,
    _admin: AdminUser,
    db: &State<Db>,
) -> Result<Json<UpdateAck>, Problem> {
    let id = parse_id(id)?;

    Ok(Json(db.set_class_feedback(id, &feedback.feedback).await?))
}

/// Update details of an own class
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    request_body = ClassInfoUpdate,
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 400, description = "Invalid update", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Class isn't owned by the caller", body = Problem),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[patch("/updateClassInfo/<id>", data = "<update>")]
#[tracing::instrument(skip(db))]
pub async fn class_update_info(
    id: &str,
    update: Json<ClassInfoUpdate>,
    instructor: InstructorUser,
    db: &State<Db>,
) -> Result<Json<UpdateAck>, Problem> {
    let oid = parse_id(id)?;
    update.validate()?;

    let class = db
        .get_class(oid)
        .await?
        .ok_or_else(|| problems::not_found("Class", id))?;

    if !instructor.owns(&class.instructor_email) {
        return Err(forbidden_problem("Class not owned by user."));
    }

    Ok(Json(db.update_class_info(oid, &update).await?))
}

/// Enroll a student: takes a seat and counts the student
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
        (status = 409, description = "Class has no seats left", body = Problem),
    )
)]
#[patch("/update/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_enroll(id: &str, db: &State<Db>) -> Result<Json<UpdateAck>, Problem> {
    let oid = parse_id(id)?;

    let ack = db.enroll_student(oid).await?;
    if ack.matched_count > 0 {
        tracing::info!("enrolled a student in class {}", oid);
        return Ok(Json(ack));
    }

    match db.get_class(oid).await? {
        None => Err(problems::not_found("Class", id)),
        Some(_) => Err(Problem::new_untyped(Status::Conflict, "Class is full.")
            .insert_str("id", id)
            .detail("No seats are available in this class.")
            .to_owned()),
    }
}

///////////////////////
//       TESTS
///////////////////////
