//! Rocket client wired to the in-memory store and a recording payment gateway.

use std::sync::{Arc, Mutex};

use bson::oid::ObjectId;
use rocket::http::Header;
use rocket::local::asynchronous::Client;

use crate::config::Config;
use crate::data::memory::MemoryStore;
use crate::data::user::User;
use crate::data::Db;
use crate::payment::{GatewayError, IntentRequest, PaymentGateway, PaymentIntent};
use crate::resp::jwt::UserToken;
use crate::role::Role;
use crate::security::Security;

pub const TEST_SECRET: &str = "music-school-test-secret";

#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    pub calls: Arc<Mutex<Vec<IntentRequest>>>,
}

#[rocket::async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_payment_intent(&self, request: IntentRequest) -> Result<PaymentIntent, GatewayError> {
        let intent = PaymentIntent {
            id: format!("pi_test_{}", request.amount),
            client_secret: format!("pi_test_{}_secret", request.amount),
        };
        self.calls.lock().expect("gateway calls lock").push(request);
        Ok(intent)
    }
}

pub struct TestApp {
    pub client: Client,
    pub gateway: RecordingGateway,
}

impl TestApp {
    pub async fn new() -> TestApp {
        let gateway = RecordingGateway::default();
        let rocket = crate::build(
            Config::default(),
            Security::new(TEST_SECRET, None),
            Box::new(MemoryStore::new()),
            Box::new(gateway.clone()),
        )
        .expect("test rocket should build");

        let client = Client::tracked(rocket).await.expect("invalid backend");

        TestApp { client, gateway }
    }

    pub fn db(&self) -> &Db {
        self.client.rocket().state::<Db>().expect("store is managed")
    }

    pub fn gateway_calls(&self) -> Vec<IntentRequest> {
        self.gateway.calls.lock().expect("gateway calls lock").clone()
    }
}

pub fn token(email: &str) -> String {
    UserToken::new(email, None)
        .encode_jwt(TEST_SECRET)
        .expect("test token encodes")
}

pub fn bearer(email: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token(email)))
}

pub async fn seed_user(app: &TestApp, email: &str, role: Role) -> ObjectId {
    let ack = app
        .db()
        .insert_user(&User {
            id: None,
            email: email.to_string(),
            name: email.split('@').next().unwrap_or_default().to_string(),
            photo_url: None,
            role,
        })
        .await
        .expect("seeding user");

    ObjectId::parse_str(&ack.inserted_id).expect("inserted id is an object id")
}
