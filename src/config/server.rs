use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Duration;
use rand::RngCore;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DB_FILE_NAME: &str = "curio.db";
pub const SECRET_FILE_NAME: &str = ".signing_secret";
pub const CONFIG_FILE_NAME: &str = "curio.toml";

const DEFAULT_ISSUER: &str = "curio";
const DEFAULT_AUDIENCE: &str = "curio-clients";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const SECRET_BYTES: usize = 32;
const MIN_SECRET_BYTES: usize = 16;

/// Token signing and validation settings. Built once at startup.
#[derive(Clone)]
pub struct AuthConfig {
    pub signing_secret: Vec<u8>,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(signing_secret: Vec<u8>) -> Result<Self> {
        if signing_secret.len() < MIN_SECRET_BYTES {
            return Err(Error::Config(format!(
                "signing secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }
        Ok(Self {
            signing_secret,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        })
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Optional overrides read from `<data-dir>/curio.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub token_ttl_hours: Option<i64>,
    pub max_upload_bytes: Option<usize>,
}

impl FileConfig {
    /// Loads the file if present; a missing file yields the defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn apply(self, config: &mut ServerConfig) -> Result<()> {
        if let Some(issuer) = self.issuer {
            config.auth.issuer = issuer;
        }
        if let Some(audience) = self.audience {
            config.auth.audience = audience;
        }
        if let Some(hours) = self.token_ttl_hours {
            if hours <= 0 {
                return Err(Error::Config("token_ttl_hours must be positive".to_string()));
            }
            config.auth.token_ttl = Duration::hours(hours);
        }
        if let Some(max) = self.max_upload_bytes {
            config.max_upload_bytes = max;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Public base URL for external access (e.g., "https://curio.example.com").
    /// Used for absolute image URLs. If not set, URLs are derived from request headers.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
    pub auth: AuthConfig,
}

impl ServerConfig {
    #[must_use]
    pub fn new(data_dir: PathBuf, auth: AuthConfig) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir,
            public_base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            auth,
        }
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    #[must_use]
    pub fn secret_path(&self) -> PathBuf {
        self.data_dir.join(SECRET_FILE_NAME)
    }
}

/// Generates a random signing secret, base64 encoded for storage.
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Decodes a stored signing secret.
pub fn decode_secret(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::Config(format!("signing secret is not valid base64: {e}")))
}
