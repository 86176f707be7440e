use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::outcome::Outcome::{Error, Success};
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{GuardProblem, Problem};
use crate::security::Security;

pub static AUTH_HEADER_NAME: &str = "Authorization";

/// Access tokens expire an hour after they were issued.
pub fn token_lifetime() -> Duration {
    Duration::hours(1)
}

/// Identity the client asks to be signed into a token.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(format = "email")]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserToken {
    #[serde(with = "jwt_numeric_date")]
    iat: DateTime<Utc>,
    #[serde(with = "jwt_numeric_date")]
    exp: DateTime<Utc>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserToken {
    pub fn new(email: impl ToString, name: Option<String>) -> UserToken {
        UserToken::issued_at(Utc::now(), email, name)
    }

    pub fn issued_at(iat: DateTime<Utc>, email: impl ToString, name: Option<String>) -> UserToken {
        UserToken {
            iat,
            exp: iat + token_lifetime(),
            email: email.to_string(),
            name,
        }
    }

    pub fn expires(&self) -> DateTime<Utc> {
        self.exp
    }

    pub fn encode_jwt(&self, secret: impl AsRef<[u8]>) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_ref());

        encode(&header, &self, &key)
    }

    pub fn decode_jwt(token: &str, secret: impl AsRef<[u8]>) -> Result<UserToken, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<UserToken>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
            .map(|data| data.claims)
    }
}

pub fn auth_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Unauthorized, "Unable to authorize user.")
        .insert("error", true)
        .insert_str("message", "unauthorized access")
        .detail(detail)
        .clone()
}

pub fn forbidden_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Forbidden, "Permission level too low.")
        .insert("error", true)
        .insert_str("message", "forbidden message")
        .detail(detail)
        .clone()
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, Problem> {
    let header = header.ok_or_else(|| auth_problem("No authorization header."))?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(auth_problem("Authorization header isn't a bearer token.")),
    }
}

pub fn extract_claims(header: Option<&str>, secret: impl AsRef<[u8]>) -> Result<UserToken, Problem> {
    let token = bearer_token(header)?;
    tracing::trace!("extracted bearer token from authorization header");

    match UserToken::decode_jwt(token, secret) {
        Ok(it) => {
            tracing::debug!("decoded user token for: {}", it.email);
            Ok(it)
        }
        Err(e) => Err(Problem::from(e)),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let security = match req.rocket().state::<Security>() {
            Some(it) => it,
            None => {
                tracing::error!("security information isn't managed by rocket");
                return Error((
                    Status::InternalServerError,
                    crate::resp::problem::problems::internal("Token verification unavailable."),
                ));
            }
        };

        let header = req.headers().get_one(AUTH_HEADER_NAME);
        match extract_claims(header, &security.token_secret) {
            Ok(claims) => Success(claims),
            Err(e) => {
                tracing::debug!("unable to extract claims from authorization header");
                GuardProblem::remember(req, &e);
                Error((Status::Unauthorized, e))
            }
        }
    }
}

mod jwt_numeric_date {
    //! Custom serialization of DateTime<Utc> to conform to the JWT spec (RFC 7519 section 2, "Numeric Date")
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date.timestamp())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Utc.timestamp_opt(i64::deserialize(deserializer)?, 0)
            .single()
            .ok_or_else(|| serde::de::Error::custom("Invalid Unix timestamp value."))
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> Self {
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            )
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            if let Some(c) = openapi.components.as_mut() {
                c.add_security_scheme("jwt", *self)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    const SECRET: &[u8] = b"jwt-test-secret";

    #[test]
    fn jwt_configured_properly() {
        let now = Utc::now().round_subsecs(0);

        let token = UserToken::issued_at(now, "student@example.com", Some("Student".to_string()));
        let encoded = token.encode_jwt(SECRET).expect("encoding should work for example");
        let decoded = UserToken::decode_jwt(&encoded, SECRET).expect("unable to decode encoded token");

        assert_eq!(decoded, token);
        assert_eq!(now + Duration::hours(1), decoded.expires());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now().round_subsecs(0) - Duration::hours(1) - Duration::seconds(5);
        let encoded = UserToken::issued_at(issued, "student@example.com", None)
            .encode_jwt(SECRET)
            .expect("encoding should work for example");

        let problem = extract_claims(Some(&format!("Bearer {}", encoded)), SECRET)
            .expect_err("expired token must not verify");
        assert_eq!(problem.status, Status::Unauthorized);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let encoded = UserToken::new("student@example.com", None)
            .encode_jwt(b"another-secret")
            .unwrap();

        assert!(UserToken::decode_jwt(&encoded, SECRET).is_err());
    }

    #[test]
    fn bearer_header_is_required() {
        assert!(bearer_token(None).is_err());
        assert!(bearer_token(Some("Basic abc")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn auth_problem_carries_legacy_message() {
        let problem = auth_problem("test");
        assert_eq!(problem.body["error"], true);
        assert_eq!(problem.body["message"], "unauthorized access");
    }
}
