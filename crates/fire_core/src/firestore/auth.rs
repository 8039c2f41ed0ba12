//! Access tokens for the Firestore REST API
//!
//! Service accounts use the OAuth2 JWT bearer flow: sign an RS256 assertion
//! with the account's private key and trade it at `token_uri` for a short
//! lived access token. The emulator accepts the fixed token `owner`.

use chrono::{DateTime, Duration, Utc};
use fire_common::{FireError, Result};
use fire_config::Credentials;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// OAuth scope granting Firestore access
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Token the Firestore emulator treats as an admin
pub const EMULATOR_TOKEN: &str = "owner";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion (the maximum Google accepts)
const ASSERTION_TTL_SECS: i64 = 3600;

/// Claims of the signed assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// How requests are authorized
#[derive(Debug, Clone)]
pub enum Authenticator {
    /// Local emulator, no token exchange
    Emulator,
    ServiceAccount(Credentials),
}

impl Authenticator {
    /// Obtain a bearer token, exchanging a signed assertion when needed
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String> {
        match self {
            Authenticator::Emulator => Ok(EMULATOR_TOKEN.to_string()),
            Authenticator::ServiceAccount(credentials) => {
                let assertion = sign_assertion(credentials, Utc::now())?;
                exchange_assertion(http, &credentials.token_uri, &assertion).await
            }
        }
    }
}

/// Build the RS256 assertion for `credentials`, issued at `now`
pub fn sign_assertion(credentials: &Credentials, now: DateTime<Utc>) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .map_err(|e| FireError::Auth(format!("invalid private key: {}", e)))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = credentials.private_key_id.clone();

    let claims = AssertionClaims {
        iss: credentials.client_email.clone(),
        sub: credentials.client_email.clone(),
        aud: credentials.token_uri.clone(),
        scope: DATASTORE_SCOPE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ASSERTION_TTL_SECS)).timestamp(),
    };

    encode(&header, &claims, &key)
        .map_err(|e| FireError::Auth(format!("failed to sign assertion: {}", e)))
}

async fn exchange_assertion(
    http: &reqwest::Client,
    token_uri: &str,
    assertion: &str,
) -> Result<String> {
    tracing::debug!("Exchanging service account assertion at {}", token_uri);

    let response = http
        .post(token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
        .send()
        .await
        .map_err(|e| FireError::Network(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| FireError::Network(e.to_string()))?;

    if !status.is_success() {
        let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(TokenErrorResponse {
                error,
                error_description: Some(description),
            }) => format!("{}: {}", error, description),
            Ok(TokenErrorResponse { error, .. }) => error,
            Err(_) => format!("token endpoint returned {}", status),
        };
        return Err(FireError::Auth(reason));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| FireError::Auth(format!("unexpected token response: {}", e)))?;

    tracing::debug!("Obtained access token valid for {:?}s", token.expires_in);
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    const TEST_KEY: &str = include_str!("../../tests/fixtures/test_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../../tests/fixtures/test_key.pub.pem");

    fn credentials() -> Credentials {
        let json = serde_json::json!({
            "type": "service_account",
            "project_id": "demo-project",
            "private_key_id": "key-1",
            "private_key": TEST_KEY,
            "client_email": "browser@demo-project.iam.gserviceaccount.com",
            "token_uri": "https://oauth2.googleapis.com/token",
        });
        Credentials::from_json(&json.to_string()).unwrap()
    }

    #[test]
    fn test_assertion_claims_and_header() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let token = sign_assertion(&credentials(), now).unwrap();

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let claims = decode::<AssertionClaims>(&token, &key, &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.iss, "browser@demo-project.iam.gserviceaccount.com");
        assert_eq!(claims.sub, claims.iss);
        assert_eq!(claims.scope, DATASTORE_SCOPE);
        assert_eq!(claims.iat, 1_704_067_200);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_invalid_private_key() {
        let mut creds = credentials();
        creds.private_key = "not a key".to_string();
        let err = sign_assertion(&creds, Utc::now()).unwrap_err();
        assert!(matches!(err, FireError::Auth(_)));
        assert!(!err.is_configuration());
    }

    #[tokio::test]
    async fn test_emulator_token() {
        let http = reqwest::Client::new();
        let token = Authenticator::Emulator.access_token(&http).await.unwrap();
        assert_eq!(token, "owner");
    }
}
