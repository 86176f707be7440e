use rocket::http::Status;
use rocket::{Build, Request, Rocket, Route};

pub mod class;
pub mod payment;
pub mod selection;
pub mod token;
pub mod users;

use class::*;
use payment::*;
use selection::*;
use token::*;
use users::*;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    data::{
        class as cd,
        payment as pd,
        selection as sd,
        user::{self as ud, db::UserCreated},
    },
    payment::{IntentCreateData, IntentCreatedResponse},
    resp::{
        ack::{DeleteAck, InsertAck, UpdateAck},
        jwt::{auth_problem, doc::JWTAuth, forbidden_problem, TokenRequest, TokenResponse},
        problem::{problems, GuardProblem, Problem},
    },
    role::Role,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        index,
        token_issue,
        user_create,
        user_list,
        user_make_admin,
        user_make_instructor,
        user_is_admin,
        user_is_instructor,
        instructor_list,
        class_create,
        class_list,
        class_info,
        class_list_by_instructor,
        class_list_approved,
        class_approve,
        class_deny,
        class_feedback,
        class_update_info,
        class_enroll,
        selection_create,
        selection_list,
        selection_info,
        selection_mark_paid,
        selection_delete,
        payment_intent_create,
        payment_create,
        payment_list
    ),
    components(schemas(
        Role,
        ud::User,
        ud::UserSignupData,
        ud::AdminCheck,
        ud::InstructorCheck,
        UserCreated,
        cd::Class,
        cd::ClassStatus,
        cd::ClassCreateData,
        cd::ClassInfoUpdate,
        cd::FeedbackData,
        sd::Selection,
        sd::SelectionStatus,
        sd::SelectionCreateData,
        pd::Payment,
        pd::PaymentCreateData,
        IntentCreateData,
        IntentCreatedResponse,
        TokenRequest,
        TokenResponse,
        InsertAck,
        UpdateAck,
        DeleteAck,
        Problem
    )),
    modifiers(&JWTAuth)
)]
pub struct ApiDoc;

pub fn api() -> Vec<Route> {
    routes![
        index,
        token_issue,
        user_create,
        user_list,
        user_make_admin,
        user_make_instructor,
        user_is_admin,
        user_is_instructor,
        instructor_list,
        class_create,
        class_list,
        class_info,
        class_list_by_instructor,
        class_list_approved,
        class_approve,
        class_deny,
        class_feedback,
        class_update_info,
        class_enroll,
        selection_create,
        selection_list,
        selection_info,
        selection_mark_paid,
        selection_delete,
        payment_intent_create,
        payment_create,
        payment_list
    ]
}

#[catch(401)]
fn unauthorized(req: &Request) -> Problem {
    GuardProblem::recall(req, Status::Unauthorized)
        .unwrap_or_else(|| auth_problem("Missing, malformed or expired bearer token."))
}

#[catch(403)]
fn forbidden(req: &Request) -> Problem {
    GuardProblem::recall(req, Status::Forbidden)
        .unwrap_or_else(|| forbidden_problem("Authenticated user lacks the required role."))
}

#[catch(422)]
fn unprocessable() -> Problem {
    problems::schema_problem()
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> Problem {
    Problem::new_untyped(status, status.reason().unwrap_or("Problem"))
        .instance_uri(req.uri().to_string())
        .to_owned()
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api())
        .mount(
            "/",
            SwaggerUi::new("/swagger/<_..>").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .register("/", catchers![unauthorized, forbidden, unprocessable, default_catcher])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;
    use serde_json::Value;

    use crate::testing::TestApp;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/users/admin/{id}"));
        assert!(paths.contains_key("/create-payment-intent"));
        assert!(paths.contains_key("/selectedClass/{id}"));
    }

    #[rocket::async_test]
    async fn unknown_route_is_problem_json() {
        let app = TestApp::new().await;

        let response = app.client.get("/nowhere").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(body["status"], 404);
        assert_eq!(body["instance"], "/nowhere");
    }

    #[rocket::async_test]
    async fn malformed_body_is_problem_json() {
        let app = TestApp::new().await;

        let response = app
            .client
            .post("/users")
            .header(rocket::http::ContentType::JSON)
            .body("{\"name\": 1}")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);

        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(body["status"], 422);
        assert_eq!(body["title"], "There was a problem parsing part of the request.");
    }
}
