//! Runtime configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables. Database credentials are read from a `DEV_*` or
//! `PROD_*` family depending on the selected [`Profile`].

use std::{
    collections::HashMap, fmt, net::SocketAddr, path::Path, str::FromStr,
};

use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
    #[error("could not assemble the database url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Dev,
    Prod,
}

impl Profile {
    fn prefix(self) -> &'static str {
        match self {
            Profile::Dev => "DEV",
            Profile::Prod => "PROD",
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Profile::Dev),
            "prod" | "production" => Ok(Profile::Prod),
            other => Err(format!("unknown profile `{other}`")),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Profile::Dev => "dev",
            Profile::Prod => "prod",
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
    /// Takes precedence over the individual fields when set.
    pub url: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: String::new(),
            pool_size: 10,
            url: None,
        }
    }
}

impl DatabaseSettings {
    /// A `mysql://` url with percent-encoded credentials.
    pub fn url(&self) -> Result<String, SettingsError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let mut url = Url::parse("mysql://localhost")?;
        url.set_host(Some(&self.host))?;
        // these only fail for urls that cannot carry credentials, which a
        // `mysql://` url always can
        let _ = url.set_port(Some(self.port));
        let _ = url.set_username(&self.user);
        if !self.password.is_empty() {
            let _ = url.set_password(Some(&self.password));
        }
        url.set_path(&self.name);
        Ok(url.to_string())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            user: String::new(),
            password: String::new(),
        }
    }
}

impl SmtpSettings {
    pub fn is_configured(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ProcedureSettings {
    pub allow: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub bind: SocketAddr,
    pub database: DatabaseSettings,
    pub smtp: SmtpSettings,
    pub procedures: ProcedureSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database: DatabaseSettings::default(),
            smtp: SmtpSettings::default(),
            procedures: ProcedureSettings::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `path` (if any) and the process environment.
    pub fn load(
        path: Option<&Path>,
        profile: Profile,
    ) -> Result<Self, SettingsError> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let env: HashMap<String, String> = std::env::vars().collect();
        settings.with_env(&env, profile)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            SettingsError::Read {
                path: path.display().to_string(),
                source,
            }
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Applies environment overrides. Unset variables leave the current
    /// value alone.
    pub fn with_env(
        mut self,
        env: &HashMap<String, String>,
        profile: Profile,
    ) -> Result<Self, SettingsError> {
        let var = |key: &str| -> Option<String> {
            env.get(key).filter(|v| !v.is_empty()).cloned()
        };
        let prefix = profile.prefix();

        if let Some(bind) = var("BIND_ADDR") {
            self.bind = parse("BIND_ADDR", &bind)?;
        }

        let db = &mut self.database;
        if let Some(host) = var(&format!("{prefix}_HOST")) {
            db.host = host;
        }
        if let Some(port) = var(&format!("{prefix}_PORT")) {
            db.port = parse(&format!("{prefix}_PORT"), &port)?;
        }
        if let Some(user) = var(&format!("{prefix}_USER")) {
            db.user = user;
        }
        if let Some(password) = var(&format!("{prefix}_PASSWORD")) {
            db.password = password;
        }
        if let Some(name) = var("DBNAME") {
            db.name = name;
        }
        if let Some(size) = var("DB_POOL_SIZE") {
            db.pool_size = parse("DB_POOL_SIZE", &size)?;
        }
        if let Some(url) = var("DATABASE_URL") {
            info!("DATABASE_URL set, ignoring {prefix}_* database settings");
            db.url = Some(url);
        }

        let smtp = &mut self.smtp;
        if let Some(host) = var("SMTP_HOST") {
            smtp.host = host;
        }
        if let Some(port) = var("SMTP_PORT") {
            smtp.port = parse("SMTP_PORT", &port)?;
        }
        if let Some(user) = var("EMAIL_USER") {
            smtp.user = user;
        }
        if let Some(password) = var("EMAIL_PASSWORD") {
            smtp.password = password;
        }
        if !smtp.is_configured() {
            warn!("EMAIL_USER/EMAIL_PASSWORD not set, otp email is disabled");
        }

        if let Some(allow) = var("ALLOWED_PROCEDURES") {
            self.procedures.allow = allow
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(self)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value.trim().parse().map_err(|_| SettingsError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}
