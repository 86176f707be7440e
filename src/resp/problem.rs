use std::fmt::{Display, Formatter};
use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,
    pub instance_uri: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            instance_uri: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: "about:blank".to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn instance_uri(&mut self, value: String) -> &mut Problem {
        self.instance_uri = Some(value);
        self
    }

    pub fn insert<V: Serialize>(&mut self, key: impl ToString, value: V) -> &mut Problem {
        // Values that can't be represented in JSON are dropped
        if let Ok(value) = serde_json::to_value(value) {
            self.body.insert(key.to_string(), value);
        }
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    fn into_json(self) -> Map<String, Value> {
        let mut body = self.body;

        // Following are required by rfc7807
        body.insert(String::from("type"), Value::from(self.type_uri));
        body.insert(String::from("title"), Value::from(self.title));

        // Optional parameters as specified by rfc7807
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }
        body.insert(String::from("status"), Value::from(self.status.code));
        if let Some(instance) = self.instance_uri {
            body.insert(String::from("instance"), Value::from(instance));
        }

        body
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status;
        let body_string = Value::Object(self.into_json()).to_string();

        Response::build()
            .status(status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

/// Problem raised by a request guard, kept in the request cache so the catcher
/// rendering the failed request can answer with it.
#[derive(Debug, Clone, Default)]
pub struct GuardProblem(Option<Problem>);

impl GuardProblem {
    /// The first guard problem of a request wins.
    pub fn remember(req: &Request<'_>, problem: &Problem) {
        req.local_cache(|| GuardProblem(Some(problem.clone())));
    }

    pub fn recall(req: &Request<'_>, status: Status) -> Option<Problem> {
        req.local_cache(GuardProblem::default)
            .0
            .clone()
            .filter(|it| it.status == status)
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn schema_problem() -> Problem {
        Problem::new_untyped(
            Status::UnprocessableEntity,
            "There was a problem parsing part of the request.",
        )
        .detail("Request body doesn't match the expected schema.")
        .to_owned()
    }

    #[inline]
    pub fn bad_id(id: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Invalid identifier.")
            .insert_str("id", id)
            .detail("Identifiers must be 24 character hex strings.")
            .to_owned()
    }

    #[inline]
    pub fn bad_field(field: &str, detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Invalid request field.")
            .insert_str("field", field)
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn not_found(what: &str, id: impl ToString) -> Problem {
        Problem::new_untyped(Status::NotFound, format!("{} doesn't exist.", what))
            .insert_str("id", id)
            .to_owned()
    }

    #[inline]
    pub fn internal(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::InternalServerError, "Unable to process request.")
            .detail(detail)
            .to_owned()
    }
}

/// Duplicate key error code reported by MongoDB write errors.
const DUPLICATE_KEY: i32 = 11000;

fn store_problem(status: Status, title: &str) -> Problem {
    Problem::new_untyped(status, title)
        .insert_str("source", "store")
        .to_owned()
}

impl From<mongodb::error::Error> for Problem {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        tracing::error!("MongoDB error: {}", e);

        match e.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::InvalidTlsConfig { .. }
            | ErrorKind::IncompatibleServer { .. } => {
                store_problem(Status::ServiceUnavailable, "Records are unreachable right now.")
            }
            ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == DUPLICATE_KEY => {
                store_problem(Status::Conflict, "Record already exists.")
                    .detail(w.message.clone())
                    .to_owned()
            }
            ErrorKind::Io(_) | ErrorKind::Write(_) => {
                store_problem(Status::InternalServerError, "Unable to store submitted data.")
                    .detail("The change might not have been saved.")
                    .to_owned()
            }
            ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
                store_problem(Status::InternalServerError, "Stored record has an unexpected shape.")
            }
            _ => store_problem(Status::InternalServerError, "Store failed while processing request."),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => {
                crate::resp::jwt::auth_problem("Expired JWT signature.")
            }
            ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) => {
                problems::internal("Token signing key is unusable.")
            }
            _ => crate::resp::jwt::auth_problem("Error while handling JWT."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_json_has_rfc7807_members() {
        let problem = Problem::new_untyped(Status::Conflict, "No seats left.")
            .detail("class is full")
            .insert("error", true)
            .to_owned();
        let json = problem.into_json();

        assert_eq!(json["type"], "about:blank");
        assert_eq!(json["title"], "No seats left.");
        assert_eq!(json["status"], 409);
        assert_eq!(json["detail"], "class is full");
        assert_eq!(json["error"], true);
        assert!(json.get("instance").is_none());
    }
}
