//! Connection configuration types.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Gmail IMAP host.
pub const GMAIL_HOST: &str = "imap.gmail.com";

/// Connection security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption (port 143). **Not recommended for production.**
    None,
    /// Start with plaintext, upgrade with STARTTLS (port 143).
    StartTls,
    /// TLS from the start (port 993). **Recommended.**
    #[default]
    Implicit,
}

impl Security {
    /// Returns the default port for this security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None | Self::StartTls => 143,
            Self::Implicit => 993,
        }
    }
}

/// Login credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl Credentials {
    /// Creates a new credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// IMAP connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Login credentials.
    pub credentials: Credentials,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// How often an opened folder is checked for new mail.
    pub poll_interval: Duration,
}

impl Config {
    /// Creates a new configuration with implicit TLS on port 993.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        ConfigBuilder::new(host).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }

    /// Creates a Gmail configuration for the given account.
    #[must_use]
    pub fn gmail(credentials: Credentials) -> Self {
        let mut config = Self::new(GMAIL_HOST);
        config.credentials = credentials;
        config
    }

    /// Overrides host, port and security with the Gmail defaults.
    pub fn use_gmail(&mut self) -> &mut Self {
        self.host = GMAIL_HOST.to_string();
        self.port = 993;
        self.security = Security::Implicit;
        self
    }

    /// Loads a configuration from a JSON file.
    ///
    /// ```json
    /// { "host": "imap.example.com", "port": 993, "security": "implicit",
    ///   "username": "me@example.com", "password": "secret" }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not a valid configuration.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        Ok(file.into())
    }
}

/// On-disk shape of a configuration.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    host: String,
    port: Option<u16>,
    #[serde(default)]
    security: Security,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    connect_timeout_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let mut builder = ConfigBuilder::new(file.host)
            .security(file.security)
            .credentials(Credentials::new(file.username, file.password));
        if let Some(port) = file.port {
            builder = builder.port(port);
        }
        if let Some(secs) = file.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = file.poll_interval_secs {
            builder = builder.poll_interval(Duration::from_secs(secs));
        }
        builder.build()
    }
}

/// Builder for connection configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: Option<u16>,
    security: Security,
    credentials: Credentials,
    connect_timeout: Duration,
    poll_interval: Duration,
}

impl ConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::Implicit,
            credentials: Credentials::default(),
            connect_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(10),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the new-mail poll interval.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port.unwrap_or_else(|| self.security.default_port()),
            security: self.security,
            credentials: self.credentials,
            connect_timeout: self.connect_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(Security::None.default_port(), 143);
        assert_eq!(Security::StartTls.default_port(), 143);
        assert_eq!(Security::Implicit.default_port(), 993);
    }

    #[test]
    fn test_config_new() {
        let config = Config::new("imap.example.com");
        assert_eq!(config.host, "imap.example.com");
        assert_eq!(config.port, 993);
        assert_eq!(config.security, Security::Implicit);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder("imap.example.com")
            .port(1993)
            .security(Security::Implicit)
            .credentials(Credentials::new("me", "secret"))
            .connect_timeout(Duration::from_secs(10))
            .build();

        assert_eq!(config.port, 1993);
        assert_eq!(config.credentials.username, "me");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_builder_default_port() {
        let config = Config::builder("imap.example.com")
            .security(Security::None)
            .build();

        assert_eq!(config.port, 143);
    }

    #[test]
    fn test_use_gmail_overrides_connection_settings() {
        let mut config = Config::builder("localhost")
            .security(Security::None)
            .credentials(Credentials::new("me@gmail.com", "app-password"))
            .build();

        config.use_gmail();

        assert_eq!(config.host, GMAIL_HOST);
        assert_eq!(config.port, 993);
        assert_eq!(config.security, Security::Implicit);
        assert_eq!(config.credentials.username, "me@gmail.com");
    }

    #[test]
    fn test_gmail_constructor() {
        let config = Config::gmail(Credentials::new("me@gmail.com", "pw"));
        assert_eq!(config.host, GMAIL_HOST);
        assert_eq!(config.port, 993);
    }

    #[test]
    fn test_from_json() {
        let config = Config::from_json(
            r#"{
                "host": "mail.example.org",
                "security": "none",
                "username": "alice",
                "password": "pw",
                "poll_interval_secs": 60
            }"#,
        )
        .unwrap();

        assert_eq!(config.host, "mail.example.org");
        assert_eq!(config.port, 143);
        assert_eq!(config.security, Security::None);
        assert_eq!(config.credentials, Credentials::new("alice", "pw"));
        assert_eq!(config.poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Config::from_json("{ \"port\": 993 }").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config::builder("imap.example.com")
            .credentials(Credentials::new("me", "hunter2"))
            .build();

        let rendered = format!("{config:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }
}
