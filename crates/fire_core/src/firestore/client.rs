use crate::firestore::auth::Authenticator;
use crate::firestore::path::CollectionPath;
use crate::firestore::wire;
use crate::model::Document;
use crate::store::DocumentStore;
use async_trait::async_trait;
use fire_common::{FireError, Result};
use fire_config::{ClientConfig, Credentials, Environment};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Everything needed to reach one Firestore database
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Scheme and host, without a trailing slash
    pub base_url: String,
    pub project: String,
    pub database: String,
    pub timeout: Duration,
}

/// Firestore REST client
///
/// One access token is fetched lazily and reused for every request made
/// through this handle.
pub struct FirestoreClient {
    http: reqwest::Client,
    options: ClientOptions,
    auth: Authenticator,
    token: OnceCell<String>,
}

impl FirestoreClient {
    /// Build the client for the environment the binary runs in
    pub fn new(credentials: Credentials, config: &ClientConfig, env: &Environment) -> Result<Self> {
        let options = ClientOptions {
            base_url: config.base_url(env.emulator_host.as_deref()),
            project: credentials.project(env.project_override.as_deref()),
            database: config.database.clone(),
            timeout: config.timeout(),
        };

        let auth = if env.emulator_host.is_some() {
            tracing::info!("Using Firestore emulator at {}", options.base_url);
            Authenticator::Emulator
        } else {
            Authenticator::ServiceAccount(credentials)
        };

        Self::with_options(options, auth)
    }

    pub fn with_options(options: ClientOptions, auth: Authenticator) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("firebrowse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FireError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            options,
            auth,
            token: OnceCell::new(),
        })
    }

    pub fn project(&self) -> &str {
        &self.options.project
    }

    /// `{base}/v1/projects/{project}/databases/{database}/documents`
    pub fn documents_root(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            self.options.base_url, self.options.project, self.options.database
        )
    }

    async fn bearer(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| self.auth.access_token(&self.http))
            .await?;
        Ok(token.as_str())
    }

    /// POST a JSON body and return the raw response text
    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<String> {
        let token = self.bearer().await?;
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let text = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            tracing::debug!("Request failed with {}: {}", status, text);
            return Err(wire::decode_error(status, &text));
        }

        Ok(text)
    }
}

fn network_error(e: reqwest::Error) -> FireError {
    if e.is_timeout() {
        FireError::Network(format!("request timed out: {}", e))
    } else {
        FireError::Network(e.to_string())
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, collection: &str, limit: u32) -> Result<Vec<Document>> {
        let path = CollectionPath::parse(collection)?;
        let url = format!("{}:runQuery", path.parent_url(&self.documents_root()));

        let body = self.post(&url, &wire::run_query_body(&path, limit)).await?;
        let documents = wire::decode_documents(&body)?;

        tracing::info!("Fetched {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    #[tracing::instrument(skip(self))]
    async fn count(&self, collection: &str) -> Result<u64> {
        let path = CollectionPath::parse(collection)?;
        let url = format!(
            "{}:runAggregationQuery",
            path.parent_url(&self.documents_root())
        );

        let body = self.post(&url, &wire::count_query_body(&path)).await?;
        wire::decode_count(&body)
    }
}
