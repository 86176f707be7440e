use rocket::serde::json::Json;
use rocket::State;

use crate::config::Config;
use crate::data::payment::{Payment, PaymentCreateData};
use crate::data::Db;
use crate::payment::{price_to_cents, Gateway, IntentCreateData, IntentCreatedResponse, IntentRequest};
use crate::resp::ack::InsertAck;
use crate::resp::jwt::UserToken;
use crate::resp::problem::Problem;

/// Create a card payment intent for a price
#[utoipa::path(
    request_body = IntentCreateData,
    responses(
        (status = 200, description = "Client secret of the created intent", body = IntentCreatedResponse),
        (status = 400, description = "Price isn't chargeable", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 502, description = "Payment gateway failed", body = Problem),
        (status = 503, description = "Payment gateway isn't configured", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[post("/create-payment-intent", data = "<intent>")]
#[tracing::instrument(skip(gateway, config))]
pub async fn payment_intent_create(
    intent: Json<IntentCreateData>,
    auth: UserToken,
    gateway: &State<Gateway>,
    config: &State<Config>,
) -> Result<Json<IntentCreatedResponse>, Problem> {
    let amount = price_to_cents(intent.price)?;

    let created = gateway
        .create_payment_intent(IntentRequest::card(amount, &config.currency))
        .await?;
    tracing::debug!("payment intent {} for {}", created.id, auth.email);

    Ok(Json(IntentCreatedResponse {
        client_secret: created.client_secret,
    }))
}

/// Record a completed payment
#[utoipa::path(
    request_body = PaymentCreateData,
    responses(
        (status = 200, description = "Insert acknowledgment", body = InsertAck),
        (status = 400, description = "Invalid payment", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[post("/payments", data = "<payment>")]
#[tracing::instrument(skip(db))]
pub async fn payment_create(
    payment: Json<PaymentCreateData>,
    _auth: UserToken,
    db: &State<Db>,
) -> Result<Json<InsertAck>, Problem> {
    payment.validate()?;

    let ack = db.insert_payment(&Payment::from(payment.into_inner())).await?;
    tracing::info!("recorded payment {}", ack.inserted_id);

    Ok(Json(ack))
}

/// Payment history of a user. Without an email nothing is listed.
#[utoipa::path(
    params(
        ("email", description = "user email")
    ),
    responses(
        (status = 200, description = "Payments of the user", body = Vec<Payment>),
    )
)]
#[get("/payments?<email>")]
#[tracing::instrument(skip(db))]
pub async fn payment_list(email: Option<&str>, db: &State<Db>) -> Result<Json<Vec<Payment>>, Problem> {
    match email {
        Some(email) if !email.is_empty() => Ok(Json(db.list_payments_by_email(email).await?)),
        _ => Ok(Json(vec![])),
    }
}

///////////////////////
//       TESTS
///////////////////////
