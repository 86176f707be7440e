use rocket::serde::json::Json;
use rocket::State;

use crate::resp::jwt::{TokenRequest, TokenResponse, UserToken};
use crate::resp::problem::{problems, Problem};
use crate::security::Security;
use crate::util::is_email;

/// Issue an access token valid for one hour
#[utoipa::path(
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed bearer token", body = TokenResponse),
        (status = 400, description = "Invalid email", body = Problem),
    )
)]
#[post("/jwt", data = "<claims>")]
#[tracing::instrument(skip(security))]
pub async fn token_issue(claims: Json<TokenRequest>, security: &State<Security>) -> Result<Json<TokenResponse>, Problem> {
    if !is_email(&claims.email) {
        return Err(problems::bad_field("email", "Not a valid e-mail address."));
    }

    let claims = claims.into_inner();
    let token = UserToken::new(claims.email, claims.name).encode_jwt(&security.token_secret)?;

    Ok(Json(TokenResponse { token }))
}

/// Liveness check
#[utoipa::path(
    responses(
        (status = 200, description = "Server is up", body = String),
    )
)]
#[get("/")]
pub fn index() -> &'static str {
    "Server is running.."
}

#[cfg(test)]
mod token_endpoints {
    use chrono::{Duration, Utc};
    use rocket::http::{ContentType, Header, Status};
    use serde_json::{json, Value};

    use crate::resp::jwt::UserToken;
    use crate::testing::{TestApp, TEST_SECRET};

    #[rocket::async_test]
    async fn issued_token_carries_claims() {
        let app = TestApp::new().await;

        let response = app
            .client
            .post("/jwt")
            .header(ContentType::JSON)
            .body(json!({ "email": "student@example.com", "name": "Student" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().await.expect("invalid response json");
        let token = body["token"].as_str().expect("token string");

        let claims = UserToken::decode_jwt(token, TEST_SECRET).expect("issued token verifies");
        assert_eq!(claims.email, "student@example.com");
        assert_eq!(claims.name.as_deref(), Some("Student"));

        let response = app
            .client
            .get("/users")
            .header(Header::new("Authorization", format!("Bearer {}", token)))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn malformed_token_is_unauthorized() {
        let app = TestApp::new().await;

        let response = app
            .client
            .get("/users")
            .header(Header::new("Authorization", "Bearer not.a.token"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(body["message"], "unauthorized access");
    }

    #[rocket::async_test]
    async fn expired_token_is_unauthorized() {
        let app = TestApp::new().await;
        let issued = Utc::now() - Duration::hours(1) - Duration::seconds(5);
        let expired = UserToken::issued_at(issued, "student@example.com", None)
            .encode_jwt(TEST_SECRET)
            .expect("test token encodes");

        let response = app
            .client
            .get("/users")
            .header(Header::new("Authorization", format!("Bearer {}", expired)))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "unauthorized access");
        assert_eq!(body["detail"], "Expired JWT signature.");
    }

    #[rocket::async_test]
    async fn liveness_text() {
        let app = TestApp::new().await;

        let response = app.client.get("/").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some("Server is running.."));
    }
}
