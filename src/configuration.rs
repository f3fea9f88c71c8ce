use crate::errors::ConfigurationError;
use config::{Config, Environment as EnvSource, FileFormat};
use lettre::Address;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::env::var;
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: Application,
    pub mail: MailSettings,
    pub session: SessionSettings,
}

impl Settings {
    pub fn check_if_valid(&self) -> Result<(), ConfigurationError> {
        if self.mail.relay_host.trim().is_empty() {
            return Err(ConfigurationError::MissingRelayHost);
        }
        if self.session.ttl_secs == 0 {
            return Err(ConfigurationError::ZeroTtl("session.ttl_secs"));
        }
        if self.session.flash_ttl_secs == 0 {
            return Err(ConfigurationError::ZeroTtl("session.flash_ttl_secs"));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Application {
    pub host: String,
    pub port: u16,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MailSettings {
    pub relay_host: String,
    pub relay_port: u16,
    #[serde_as(as = "DisplayFromStr")]
    pub from: Address,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionSettings {
    pub ttl_secs: u64,
    pub flash_ttl_secs: u64,
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn flash_ttl(&self) -> Duration {
        Duration::from_secs(self.flash_ttl_secs)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            flash_ttl_secs: 5 * 60,
        }
    }
}

/// The possible runtime environment for our application.
#[derive(Debug, Eq, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(format!(
                "{other} is not a supported environment. Use either `dev` or `prod`."
            )),
        }
    }
}

pub fn get_env() -> Result<Environment, config::ConfigError> {
    var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "dev".into())
        .try_into()
        .map_err(config::ConfigError::Message)
}

/// Layers `configuration/base.yaml`, the environment file and `APP__*` variables.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let environment = get_env()?;
    let second_source = format!("configuration/{}", environment.as_str());
    let settings = Config::builder()
        .add_source(config::File::new("configuration/base", FileFormat::Yaml))
        .add_source(config::File::new(&second_source, FileFormat::Yaml).required(false))
        .add_source(
            EnvSource::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
