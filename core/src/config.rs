//! Database settings shared by the service and the client's analysis log.
//!
//! A full `DATABASE_URL` wins when present. Otherwise the DSN is assembled
//! from the `MYSQL_*` variables the deployment environment provides.

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Connection parameters read from `MYSQL_HOST`, `MYSQL_PORT`,
/// `MYSQL_USER`, `MYSQL_PASSWORD` and `MYSQL_DATABASE`.
#[derive(Clone, Deserialize)]
pub struct MySqlSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

fn default_port() -> u16 {
    3306
}

// Manual impl keeps the password out of logs.
impl std::fmt::Debug for MySqlSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl MySqlSettings {
    /// Read settings from an iterator of environment-style pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let settings: Self = envy::prefixed("MYSQL_").from_iter(vars)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Empty values are as good as unset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("MYSQL_HOST", &self.host),
            ("MYSQL_USER", &self.user),
            ("MYSQL_PASSWORD", &self.password),
            ("MYSQL_DATABASE", &self.database),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        Ok(())
    }

    /// Build a `mysql://` DSN with user, password and database escaped.
    pub fn to_url(&self) -> Result<String, ConfigError> {
        let mut url = Url::parse("mysql://localhost")?;
        url.set_host(Some(&self.host))?;
        url.set_port(Some(self.port))
            .map_err(|()| ConfigError::Invalid("MYSQL_PORT"))?;
        url.set_username(&self.user)
            .map_err(|()| ConfigError::Invalid("MYSQL_USER"))?;
        url.set_password(Some(&self.password))
            .map_err(|()| ConfigError::Invalid("MYSQL_PASSWORD"))?;
        url.path_segments_mut()
            .map_err(|()| ConfigError::Invalid("MYSQL_DATABASE"))?
            .clear()
            .push(&self.database);
        Ok(url.into())
    }
}

/// Resolve the database DSN from environment-style pairs.
pub fn database_url_from_vars<I>(vars: I) -> Result<String, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: Vec<(String, String)> = vars.into_iter().collect();
    let explicit = vars
        .iter()
        .find(|(key, value)| key == DATABASE_URL_VAR && !value.trim().is_empty());
    if let Some((_, url)) = explicit {
        return Ok(url.clone());
    }
    MySqlSettings::from_vars(vars)?.to_url()
}

/// Resolve the database DSN from the process environment.
pub fn database_url_from_env() -> Result<String, ConfigError> {
    database_url_from_vars(std::env::vars())
}

/// Replace the password of a DSN so it can be logged.
pub fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("***")).is_err() {
                return "***".to_string();
            }
            url.into()
        }
        Err(_) if dsn.contains('@') => "***".to_string(),
        Err(_) => dsn.to_string(),
    }
}
