#[macro_use]
extern crate rocket;

use bson::doc;
use mongodb::Client;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::data::memory::MemoryStore;
use crate::data::Db;
use crate::error::{BackendError, ConfigurationError};
use crate::payment::stripe::StripeGateway;
use crate::payment::Gateway;
use crate::route::mount_api;
use crate::security::Security;

pub mod config;
pub mod data;
pub mod error;
pub mod middleware;
pub mod payment;
pub mod resp;
pub mod role;
pub mod route;
pub mod security;
pub mod util;

#[cfg(test)]
mod testing;

/// Assembles the server around already initialized state.
pub fn build(config: Config, security: Security, db: Db, gateway: Gateway) -> Result<Rocket<Build>, BackendError> {
    let figment = rocket::Config::figment()
        .merge(("address", config.address.clone()))
        .merge(("port", config.port));

    let mut r = rocket::custom(figment)
        .manage(config)
        .manage(security)
        .manage(db)
        .manage(gateway);

    tracing::info!("Setting up CORS...");
    let cors = rocket_cors::CorsOptions {
        allowed_origins: AllowedOrigins::All,
        allowed_methods: vec![
            Method::Get,
            Method::Post,
            Method::Put,
            Method::Patch,
            Method::Delete,
            Method::Options,
        ]
        .into_iter()
        .map(From::from)
        .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    r = r.attach(cors);
    r = mount_api(r);

    Ok(r)
}

pub async fn create(log_level: Option<Level>, in_memory: bool) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
        if let Err(err) = tracing_log::LogTracer::init() {
            eprintln!("Unable to forward log records: {}", err);
        }
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    let security = Security::load()?;
    tracing::debug!("{:?}", security);

    let gateway = StripeGateway::new(&c.stripe_api_base, security.gateway_secret.clone())?;

    if in_memory {
        tracing::warn!("Using in-memory store. Data is lost on shutdown.");
        let db: Db = Box::new(MemoryStore::new());
        return build(c, security, db, Box::new(gateway));
    }

    tracing::info!("Connecting to MongoDB...");
    let client = Client::with_uri_str(c.mongodb_uri.as_str()).await?;

    tracing::info!("Using MongoDB database: {}", c.mongodb_db);
    let database = client.database(c.mongodb_db.as_str());

    if let Err(err) = database.run_command(doc! { "ping": 1 }, None).await {
        tracing::error!("Unable to connect to MongoDB: {}", err);
        return Err(err.into());
    }
    tracing::info!("Connected to MongoDB.");

    let r = build(c, security, Box::new(database), Box::new(gateway))?;

    Ok(r.attach(AdHoc::on_shutdown("MongoDB client", |_| {
        Box::pin(async move {
            client.shutdown().await;
            tracing::info!("MongoDB client closed.");
        })
    })))
}
