use rocket::serde::json::Json;
use rocket::State;

use crate::data::selection::{Selection, SelectionCreateData};
use crate::data::{parse_id, Db};
use crate::resp::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::resp::problem::Problem;

/// Add a class to a user's selection
#[utoipa::path(
    request_body = SelectionCreateData,
    responses(
        (status = 200, description = "Insert acknowledgment", body = InsertAck),
        (status = 400, description = "Invalid selection", body = Problem),
    )
)]
#[post("/selectedClass", data = "<item>")]
#[tracing::instrument(skip(db))]
pub async fn selection_create(item: Json<SelectionCreateData>, db: &State<Db>) -> Result<Json<InsertAck>, Problem> {
    item.validate()?;

    Ok(Json(db.insert_selection(&Selection::from(item.into_inner())).await?))
}

/// List selections of a user. Without an email nothing is listed.
#[utoipa::path(
    params(
        ("email", description = "user email")
    ),
    responses(
        (status = 200, description = "Selections of the user", body = Vec<Selection>),
    )
)]
#[get("/selectedClass?<email>")]
#[tracing::instrument(skip(db))]
pub async fn selection_list(email: Option<&str>, db: &State<Db>) -> Result<Json<Vec<Selection>>, Problem> {
    match email {
        Some(email) if !email.is_empty() => Ok(Json(db.list_selections_by_email(email).await?)),
        _ => Ok(Json(vec![])),
    }
}

/// Get a single selection
#[utoipa::path(
    params(
        ("id", description = "selection ID")
    ),
    responses(
        (status = 200, description = "Selection information", body = Selection),
        (status = 400, description = "Malformed selection ID", body = Problem),
        (status = 404, description = "Queried selection doesn't exist", body = Problem),
    )
)]
#[get("/selectedClass/<id>")]
#[tracing::instrument(skip(db))]
pub async fn selection_info(id: &str, db: &State<Db>) -> Result<Option<Json<Selection>>, Problem> {
    let id = parse_id(id)?;

    Ok(db.get_selection(id).await?.map(Json))
}

/// Mark a selection as paid
#[utoipa::path(
    params(
        ("id", description = "selection ID")
    ),
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 400, description = "Malformed selection ID", body = Problem),
    )
)]
#[put("/selectedClass/<id>")]
#[tracing::instrument(skip(db))]
pub async fn selection_mark_paid(id: &str, db: &State<Db>) -> Result<Json<UpdateAck>, Problem> {
    let id = parse_id(id)?;
    let ack = db.mark_selection_paid(id).await?;
    tracing::info!("selection {} paid", id);

    Ok(Json(ack))
}

/// Remove a selection
#[utoipa::path(
    params(
        ("id", description = "selection ID")
    ),
    responses(
        (status = 200, description = "Delete acknowledgment", body = DeleteAck),
        (status = 400, description = "Malformed selection ID", body = Problem),
    )
)]
#[delete("/selectedClass/<id>")]
#[tracing::instrument(skip(db))]
pub async fn selection_delete(id: &str, db: &State<Db>) -> Result<Json<DeleteAck>, Problem> {
    let id = parse_id(id)?;
    let ack = db.delete_selection(id).await?;
    tracing::info!("removed selection {}", id);

    Ok(Json(ack))
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod selection_endpoints {
    use bson::oid::ObjectId;
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};

    use crate::testing::TestApp;

    async fn select(app: &TestApp, email: &str) -> String {
        let response = app
            .client
            .post("/selectedClass")
            .header(ContentType::JSON)
            .body(
                json!({
                    "classId": ObjectId::new().to_hex(),
                    "className": "Drums 101",
                    "instructorName": "Teacher",
                    "price": 25.5,
                    "email": email
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let ack: Value = response.into_json().await.expect("invalid response json");
        ack["insertedId"].as_str().expect("inserted id").to_string()
    }

    async fn selections_of(app: &TestApp, email: &str) -> Vec<Value> {
        let response = app
            .client
            .get(format!("/selectedClass?email={}", email))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        response.into_json().await.expect("invalid response json")
    }

    #[rocket::async_test]
    async fn selected_class_is_listed_until_deleted() {
        let app = TestApp::new().await;
        let id = select(&app, "student@example.com").await;
        select(&app, "other@example.com").await;

        let listed = selections_of(&app, "student@example.com").await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["_id"], id.as_str());
        assert_eq!(listed[0]["status"], "selected");

        let response = app
            .client
            .delete(format!("/selectedClass/{}", id))
            .dispatch()
            .await;
        let ack: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(ack["deletedCount"], 1);

        assert!(selections_of(&app, "student@example.com").await.is_empty());
    }

    #[rocket::async_test]
    async fn listing_without_email_is_empty() {
        let app = TestApp::new().await;
        select(&app, "student@example.com").await;

        let response = app.client.get("/selectedClass").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let listed: Vec<Value> = response.into_json().await.expect("invalid response json");
        assert!(listed.is_empty());
    }

    #[rocket::async_test]
    async fn paid_selection_is_updated() {
        let app = TestApp::new().await;
        let id = select(&app, "student@example.com").await;

        let response = app.client.put(format!("/selectedClass/{}", id)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let response = app.client.get(format!("/selectedClass/{}", id)).dispatch().await;
        let selection: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(selection["status"], "paid");
    }

    #[rocket::async_test]
    async fn selection_with_bad_class_id_is_rejected() {
        let app = TestApp::new().await;

        let response = app
            .client
            .post("/selectedClass")
            .header(ContentType::JSON)
            .body(json!({ "classId": "123", "email": "student@example.com" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }
}
