//! Service account credentials
//!
//! The credential file is the JSON document downloaded from the Google Cloud
//! console. Only the fields needed to mint an access token are read.

use crate::{CREDENTIALS_ENV, DEFAULT_TOKEN_URI};
use fire_common::{FireError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Always "service_account" for files we can use
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,

    pub project_id: String,

    #[serde(default)]
    pub private_key_id: Option<String>,

    /// PEM encoded RSA key
    pub private_key: String,

    pub client_email: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// Keeps the private key out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_type", &self.account_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl Credentials {
    /// Load the credential file named by `GOOGLE_APPLICATION_CREDENTIALS`
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CREDENTIALS_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::load(path.as_deref())
    }

    /// Load credentials from an optional path; `None` means the variable was unset
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.ok_or_else(|| FireError::MissingEnv(CREDENTIALS_ENV.to_string()))?;
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading credentials from {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|source| {
            FireError::CredentialsRead {
                path: path.display().to_string(),
                source,
            }
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let credentials: Credentials = serde_json::from_str(content)
            .map_err(|e| FireError::CredentialsParse(e.to_string()))?;
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> Result<()> {
        if let Some(kind) = &self.account_type {
            if kind != "service_account" {
                return Err(FireError::CredentialsParse(format!(
                    "expected a service_account key, found '{}'",
                    kind
                )));
            }
        }
        if self.project_id.trim().is_empty() {
            return Err(FireError::CredentialsParse(
                "project_id cannot be empty".to_string(),
            ));
        }
        if self.client_email.trim().is_empty() {
            return Err(FireError::CredentialsParse(
                "client_email cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Project to query: the override when given, else the file's project
    pub fn project(&self, project_override: Option<&str>) -> String {
        project_override
            .map(str::to_string)
            .unwrap_or_else(|| self.project_id.clone())
    }
}
