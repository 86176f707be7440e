use crate::error::ConfigurationError;
use crate::util;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub static USER_COLLECTION_NAME: &str = "users";
pub static CLASS_COLLECTION_NAME: &str = "allClasses";
pub static SELECTION_COLLECTION_NAME: &str = "selectedClass";
pub static PAYMENT_COLLECTION_NAME: &str = "payments";

fn default_mongodb_uri() -> String {
    if let Ok(uri) = env::var("MONGODB_URI") {
        return uri;
    }

    match (env::var("DB_USER"), env::var("DB_PASS")) {
        (Ok(user), Ok(pass)) => {
            let host = env::var("DB_HOST").unwrap_or("cluster0.mjrrjle.mongodb.net".to_string());
            format!("mongodb+srv://{user}:{pass}@{host}/?retryWrites=true&w=majority")
        }
        _ => "mongodb://localhost:27017".to_string(),
    }
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("musicSchool".to_string())
}

fn default_address() -> String {
    env::var("ADDRESS").unwrap_or("0.0.0.0".to_string())
}

fn default_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(5000)
}

fn default_stripe_api_base() -> String {
    env::var("STRIPE_API_BASE").unwrap_or("https://api.stripe.com".to_string())
}

fn default_currency() -> String {
    env::var("PAYMENT_CURRENCY").unwrap_or("usd".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,

    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_stripe_api_base")]
    pub stripe_api_base: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            address: default_address(),
            port: default_port(),
            stripe_api_base: default_stripe_api_base(),
            currency: default_currency(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_yaml::from_str("port: 8080\n").expect("valid yaml");

        assert_eq!(config.port, 8080);
        assert!(!config.mongodb_uri.is_empty());
        assert!(!config.mongodb_db.is_empty());
        assert!(config.stripe_api_base.starts_with("http"));
    }

    #[test]
    fn file_path_isnt_serialized() {
        let yaml = serde_yaml::to_string(&Config::default()).expect("serializable config");
        assert!(!yaml.contains("file_path"));
        assert!(yaml.contains("mongodb_uri"));
    }
}
