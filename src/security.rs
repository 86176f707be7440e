use std::path::PathBuf;
use std::{env, fs};

use crate::error::ConfigurationError;

const ACCESS_TOKEN_SECRET: &str = "access_token.secret";

/// Secrets the server needs at runtime. Never serialized into the settings file.
#[derive(Clone)]
pub struct Security {
    pub token_secret: Vec<u8>,
    pub gateway_secret: Option<String>,
}

impl std::fmt::Debug for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Security(token_secret: {} bytes, gateway: {})",
            self.token_secret.len(),
            if self.gateway_secret.is_some() {
                "configured"
            } else {
                "missing"
            }
        )
    }
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|it| !it.trim().is_empty())
}

/// 48 random bytes, base64 encoded so the saved file stays printable.
#[cfg(feature = "generate-security")]
fn generate_token_secret() -> Vec<u8> {
    use base64::Engine;
    use rand::Rng;

    let mut raw = [0u8; 48];
    rand::thread_rng().fill(&mut raw[..]);

    crate::util::base64_engine().encode(raw).into_bytes()
}

impl Security {
    pub fn new(token_secret: impl Into<Vec<u8>>, gateway_secret: Option<String>) -> Security {
        Security {
            token_secret: token_secret.into(),
            gateway_secret,
        }
    }

    pub fn load() -> Result<Security, ConfigurationError> {
        let gateway_secret = non_empty_var("STRIPE_SECRET");
        if gateway_secret.is_none() {
            tracing::warn!("STRIPE_SECRET isn't set. Payment intents will be unavailable.");
        }

        tracing::info!("Loading access token secret...");
        if let Some(secret) = non_empty_var("ACCESS_TOKEN_SECRET") {
            tracing::info!("Access token secret loaded from environment.");
            return Ok(Security::new(secret, gateway_secret));
        }

        let dir = security_dir();
        let stored = fs::read(dir.join(ACCESS_TOKEN_SECRET))
            .ok()
            .filter(|it| !it.is_empty());

        let token_secret = match stored {
            Some(secret) => {
                tracing::info!("Access token secret found and loaded.");
                secret
            }
            #[cfg(feature = "generate-security")]
            None => {
                tracing::info!(
                    "Secret not found in '{}'. Generating a new access token secret.",
                    dir.join(ACCESS_TOKEN_SECRET).display()
                );
                fs::create_dir_all(&dir)?;

                let secret = generate_token_secret();
                fs::write(dir.join(ACCESS_TOKEN_SECRET), &secret)?;

                secret
            }
            #[cfg(not(feature = "generate-security"))]
            None => return Err(ConfigurationError::MissingSecret("ACCESS_TOKEN_SECRET")),
        };

        Ok(Security::new(token_secret, gateway_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secrets() {
        let security = Security::new("super-secret", Some("sk_test_hidden".to_string()));
        let printed = format!("{:?}", security);

        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("sk_test_hidden"));
        assert!(printed.contains("configured"));
    }

    #[cfg(feature = "generate-security")]
    #[test]
    fn generated_secrets_are_random_base64() {
        use base64::Engine;

        let first = generate_token_secret();
        let second = generate_token_secret();
        assert_ne!(first, second);

        let raw = crate::util::base64_engine()
            .decode(&first)
            .expect("generated secret is base64");
        assert_eq!(raw.len(), 48);
    }
}
