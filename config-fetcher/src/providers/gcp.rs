//! Google Cloud Secret Manager provider implementation
//!
//! Talks to the Secret Manager REST API with a blocking HTTP client. The
//! client is built for each access and dropped afterwards. Do not call it
//! from inside an async runtime; wrap it in `spawn_blocking` there.
//!
//! Tokens come from, in order: a configured access token, a configured
//! service account key file, then Application Default Credentials as
//! discovered by `gcp_auth` (`GOOGLE_APPLICATION_CREDENTIALS`, gcloud user
//! credentials, the GCE metadata server).

use crate::config::SecretManagerConfig;
use crate::providers::SecretProvider;
use crate::{FetchError, Result, SecretRef};
use base64::Engine;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

pub struct GcpSecretManagerProvider {
    config: SecretManagerConfig,
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    #[serde(default)]
    name: Option<String>,
    payload: Option<SecretPayload>,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GcpSecretManagerProvider {
    pub fn new(config: SecretManagerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SecretManagerConfig {
        &self.config
    }

    fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder();
        if let Some(secs) = self.config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| FetchError::RemoteService(format!("Failed to create Secret Manager client: {}", e)))
    }

    fn access_token(&self) -> Result<String> {
        if let Some(ref token) = self.config.access_token {
            return Ok(token.clone());
        }

        // gcp_auth is async; drive it on a runtime that lives for this call only.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FetchError::RemoteService(format!("Failed to start auth runtime: {}", e)))?;
        runtime.block_on(fetch_token(self.config.credentials_file.as_deref()))
    }
}

async fn fetch_token(credentials_file: Option<&str>) -> Result<String> {
    let provider: Arc<dyn TokenProvider> = match credentials_file {
        Some(path) => {
            debug!("Using service account key file: {}", path);
            let account = CustomServiceAccount::from_file(path).map_err(auth_error)?;
            Arc::new(account)
        }
        None => {
            debug!("Discovering Application Default Credentials");
            gcp_auth::provider().await.map_err(auth_error)?
        }
    };

    let token = provider.token(&[CLOUD_PLATFORM_SCOPE]).await.map_err(auth_error)?;
    Ok(token.as_str().to_string())
}

fn auth_error(err: gcp_auth::Error) -> FetchError {
    FetchError::RemoteService(format!("Failed to obtain Google credentials: {}", err))
}

impl SecretProvider for GcpSecretManagerProvider {
    fn name(&self) -> &str {
        "gcp-secret-manager"
    }

    fn access_secret_version(&self, secret: &SecretRef) -> Result<Vec<u8>> {
        let name = secret.resource_name();
        debug!("Getting secret from GCP Secret Manager: {}", name);

        let client = self.build_client()?;
        let token = self.access_token()?;

        let url = format!("{}/v1/{}:access", self.config.endpoint.trim_end_matches('/'), name);
        let response = client.get(&url).bearer_auth(token).send()?;
        let response = ensure_success(response, "GCP Secret Manager")?;

        let body: AccessSecretVersionResponse = response
            .json()
            .map_err(|e| FetchError::RemoteService(format!("Invalid Secret Manager response: {}", e)))?;

        let data = body
            .payload
            .and_then(|p| p.data)
            .ok_or_else(|| FetchError::RemoteService(format!("Secret {} has no payload", name)))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map_err(|e| FetchError::RemoteService(format!("Secret payload is not valid base64: {}", e)))?;

        debug!(
            "Fetched {} bytes from {}",
            bytes.len(),
            body.name.as_deref().unwrap_or(&name)
        );
        Ok(bytes)
    }
}

/// Turns a non-2xx response into a `RemoteService` error carrying the
/// service's own message.
fn ensure_success(response: Response, service: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("{}: {}", code, envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body,
    };

    Err(FetchError::RemoteService(format!(
        "{} error ({}): {}",
        service,
        status.as_u16(),
        detail.trim()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn payload(data: &[u8]) -> String {
        serde_json::json!({
            "name": "projects/123/secrets/app-config/versions/4",
            "payload": {
                "data": base64::engine::general_purpose::STANDARD.encode(data),
                "dataCrc32c": "1234"
            }
        })
        .to_string()
    }

    #[test]
    fn fetches_payload_with_static_token() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/v1/projects/my-project/secrets/app-config/versions/latest:access")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(payload(b"data:\n  nest_one_one: foo\n"))
            .create();

        let provider = GcpSecretManagerProvider::new(
            SecretManagerConfig::default()
                .with_endpoint(server.url())
                .with_access_token("test-token"),
        );

        let bytes = provider
            .access_secret_version(&SecretRef::new("my-project", "app-config"))
            .unwrap();

        assert_eq!(bytes, b"data:\n  nest_one_one: foo\n");
        mock.assert();
    }

    fn write_service_account_key(token_uri: &str) -> tempfile::NamedTempFile {
        let key = serde_json::json!({
            "type": "service_account",
            "project_id": "my-project",
            "private_key_id": "0123456789abcdef",
            "private_key": include_str!("../../tests/fixtures/test_service_account_key.pem"),
            "client_email": "config-reader@my-project.iam.gserviceaccount.com",
            "client_id": "100000000000000000001",
            "token_uri": token_uri,
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, key.to_string().as_bytes()).unwrap();
        file
    }

    #[test]
    fn fetches_token_with_service_account_key() {
        let mut server = Server::new();
        let token_mock = server
            .mock("POST", "/token")
            .match_body(Matcher::Regex("jwt-bearer".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"sa-token","expires_in":3599,"token_type":"Bearer"}"#)
            .create();
        let secret_mock = server
            .mock("GET", "/v1/projects/p/secrets/s/versions/2:access")
            .match_header("authorization", "Bearer sa-token")
            .with_status(200)
            .with_body(payload(b"{}"))
            .create();

        let key_file = write_service_account_key(&format!("{}/token", server.url()));
        let provider = GcpSecretManagerProvider::new(
            SecretManagerConfig::default()
                .with_endpoint(server.url())
                .with_credentials_file(key_file.path().to_string_lossy()),
        );

        let bytes = provider
            .access_secret_version(&SecretRef::new("p", "s").with_version("2"))
            .unwrap();

        assert_eq!(bytes, b"{}");
        token_mock.assert();
        secret_mock.assert();
    }

    #[test]
    fn rejected_key_is_remote_error_without_secret_request() {
        let mut server = Server::new();
        let _token_mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#)
            .create();
        let secret_mock = server
            .mock("GET", Matcher::Regex("^/v1/".to_string()))
            .expect(0)
            .create();

        let key_file = write_service_account_key(&format!("{}/token", server.url()));
        let provider = GcpSecretManagerProvider::new(
            SecretManagerConfig::default()
                .with_endpoint(server.url())
                .with_credentials_file(key_file.path().to_string_lossy()),
        );

        let err = provider
            .access_secret_version(&SecretRef::new("p", "s"))
            .unwrap_err();
        assert!(err.is_remote(), "{err}");
        secret_mock.assert();
    }

    #[test]
    fn missing_key_file_is_remote_error() {
        let provider = GcpSecretManagerProvider::new(
            SecretManagerConfig::default()
                .with_endpoint("http://127.0.0.1:1")
                .with_credentials_file("/nonexistent/config-fetcher/key.json"),
        );

        let err = provider
            .access_secret_version(&SecretRef::new("p", "s"))
            .unwrap_err();
        assert!(matches!(err, FetchError::RemoteService(ref m) if m.contains("credentials")), "{err}");
    }

    #[test]
    fn passes_remote_error_through() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .with_body(
                r#"{"error":{"code":404,"message":"Secret [projects/p/secrets/s] not found or has no versions.","status":"NOT_FOUND"}}"#,
            )
            .create();

        let provider = GcpSecretManagerProvider::new(
            SecretManagerConfig::default()
                .with_endpoint(server.url())
                .with_access_token("t"),
        );

        let err = provider
            .access_secret_version(&SecretRef::new("p", "s"))
            .unwrap_err();

        assert!(err.is_remote());
        let message = err.to_string();
        assert!(message.contains("404"), "{message}");
        assert!(message.contains("NOT_FOUND"), "{message}");
        assert!(message.contains("not found or has no versions"), "{message}");
    }

    #[test]
    fn permission_denied_is_remote_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create();

        let provider = GcpSecretManagerProvider::new(
            SecretManagerConfig::default()
                .with_endpoint(server.url())
                .with_access_token("t"),
        );

        let err = provider
            .access_secret_version(&SecretRef::new("p", "s"))
            .unwrap_err();
        assert!(matches!(err, FetchError::RemoteService(ref m) if m.contains("403") && m.contains("forbidden")));
    }

    #[test]
    fn missing_payload_is_remote_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"name":"projects/p/secrets/s/versions/1"}"#)
            .create();

        let provider = GcpSecretManagerProvider::new(
            SecretManagerConfig::default()
                .with_endpoint(server.url())
                .with_access_token("t"),
        );

        let err = provider
            .access_secret_version(&SecretRef::new("p", "s"))
            .unwrap_err();
        assert!(err.is_remote());
    }

    #[test]
    fn unreachable_service_is_remote_error() {
        let provider = GcpSecretManagerProvider::new(
            SecretManagerConfig::default()
                .with_endpoint("http://127.0.0.1:1")
                .with_access_token("t"),
        );

        let err = provider
            .access_secret_version(&SecretRef::new("p", "s"))
            .unwrap_err();
        assert!(err.is_remote());
    }
}
