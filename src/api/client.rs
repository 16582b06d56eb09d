use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;

use crate::auth::AuthContext;
use crate::config::ServerConfig;
use crate::error::ClientError;

use super::types::{
    LoginResponse, MessageResponse, RecordingMeta, RecordingsResponse, WireAnalysis,
};

/// HTTP client for the two backend services.
///
/// Every call is a single attempt: failures map into the ClientError
/// taxonomy and are never retried here. The bearer token comes from the
/// injected AuthContext rather than being re-read from disk per request.
pub struct ApiClient<'a> {
    /// Normal client with the configured per-request timeout.
    http: reqwest::Client,
    /// Analysis fetches wait indefinitely: the server runs the full
    /// pipeline on first request and can take minutes.
    slow: reqwest::Client,
    api_url: String,
    analysis_url: String,
    auth: &'a AuthContext,
}

impl<'a> ApiClient<'a> {
    pub fn new(cfg: &ServerConfig, auth: &'a AuthContext) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(ClientError::Network)?;
        let slow = reqwest::Client::builder()
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            http,
            slow,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            analysis_url: cfg.analysis_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// POST /login. Returns the bearer token; the caller decides whether
    /// to persist it.
    pub fn login(&self, name: &str, password: &str) -> Result<String> {
        let url = format!("{}/login", self.api_url);
        let body = json!({ "name": name, "password": password });

        block_on(async {
            let resp = self.http.post(&url).json(&body).send().await.map_err(ClientError::Network)?;
            let resp = check_status(resp).await?;
            let parsed: LoginResponse = resp.json().await.map_err(ClientError::Network)?;

            if parsed.status == "ok" {
                if let Some(token) = parsed.token {
                    return Ok(token);
                }
            }
            Err(ClientError::Api {
                status: 200,
                message: parsed
                    .message
                    .unwrap_or_else(|| "login rejected".to_string()),
            }
            .into())
        })
    }

    /// POST /register.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let url = format!("{}/register", self.api_url);
        let body = json!({ "name": name, "email": email, "password": password });

        block_on(async {
            let resp = self.http.post(&url).json(&body).send().await.map_err(ClientError::Network)?;
            let resp = check_status(resp).await?;
            let parsed: MessageResponse = resp.json().await.map_err(ClientError::Network)?;
            Ok(parsed.message.unwrap_or_else(|| "registered".to_string()))
        })
    }

    /// POST /recordings: multipart upload of a finished WAV artifact.
    pub fn upload_recording(&self, path: &Path, file_name: &str) -> Result<()> {
        let token = self.auth.require_token()?;
        let url = format!("{}/recordings", self.api_url);

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read artifact: {}", path.display()))?;
        log::debug!("uploading {} ({} bytes)", path.display(), bytes.len());

        block_on(async {
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(format!("{file_name}.wav"))
                .mime_str("audio/x-wav")
                .map_err(ClientError::Network)?;
            let form = reqwest::multipart::Form::new()
                .part("file", part)
                .text("fileName", file_name.to_string());

            let resp = self
                .http
                .post(&url)
                .bearer_auth(&token)
                .multipart(form)
                .send()
                .await
                .map_err(ClientError::Network)?;
            check_status(resp).await?;
            Ok(())
        })
    }

    /// GET /recordings: the user's library.
    pub fn list_recordings(&self) -> Result<Vec<RecordingMeta>> {
        let token = self.auth.require_token()?;
        let url = format!("{}/recordings", self.api_url);

        block_on(async {
            let resp = self.http.get(&url).bearer_auth(&token).send().await.map_err(ClientError::Network)?;
            let resp = check_status(resp).await?;
            let parsed: RecordingsResponse = resp.json().await.map_err(ClientError::Network)?;
            Ok(parsed.recordings)
        })
    }

    /// DELETE /recordings/{id}.
    pub fn delete_recording(&self, id: &str) -> Result<()> {
        let token = self.auth.require_token()?;
        let url = format!("{}/recordings/{id}", self.api_url);

        block_on(async {
            let resp = self.http.delete(&url).bearer_auth(&token).send().await.map_err(ClientError::Network)?;
            check_status(resp).await?;
            Ok(())
        })
    }

    /// GET /recordings/{fileId}/transcript: the unified analysis payload.
    /// Uses the untimed client: the first fetch blocks until the backend
    /// has run its whole pipeline.
    pub fn fetch_analysis(&self, file_id: &str) -> Result<WireAnalysis> {
        let token = self.auth.require_token()?;
        let url = format!("{}/recordings/{file_id}/transcript", self.analysis_url);

        block_on(async {
            let resp = self.slow.get(&url).bearer_auth(&token).send().await.map_err(ClientError::Network)?;
            let resp = check_status(resp).await?;
            Ok(resp.json::<WireAnalysis>().await.map_err(ClientError::Network)?)
        })
    }

    pub fn change_name(&self, new_name: &str) -> Result<String> {
        self.account_post("changeName", json!({ "newName": new_name }))
    }

    pub fn change_email(&self, new_email: &str) -> Result<String> {
        self.account_post("changeEmail", json!({ "newEmail": new_email }))
    }

    pub fn change_password(&self, new_password: &str) -> Result<String> {
        self.account_post("changePassword", json!({ "newPassword": new_password }))
    }

    pub fn delete_user(&self) -> Result<String> {
        self.account_post("deleteUser", json!({}))
    }

    fn account_post(&self, endpoint: &str, body: serde_json::Value) -> Result<String> {
        let token = self.auth.require_token()?;
        let url = format!("{}/{endpoint}", self.api_url);

        block_on(async {
            let resp = self
                .http
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await
                .map_err(ClientError::Network)?;
            let resp = check_status(resp).await?;
            let parsed: MessageResponse = resp.json().await.map_err(ClientError::Network)?;
            Ok(parsed.message.unwrap_or_else(|| "done".to_string()))
        })
    }
}

/// Map a non-success response into ClientError::Api, pulling the server's
/// `message` field out of the body when it has one.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&body)
        .ok()
        .and_then(|m| m.message)
        .unwrap_or(body);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Drive an async call to completion on a throwaway current-thread
/// runtime. The CLI is synchronous; only reqwest needs async here.
fn block_on<T>(fut: impl Future<Output = Result<T>>) -> Result<T> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    rt.block_on(fut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use tempfile::TempDir;

    fn logged_out_auth(dir: &TempDir) -> AuthContext {
        AuthContext::load_from(dir.path().join("token"))
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let auth = logged_out_auth(&dir);
        let cfg = ServerConfig {
            api_url: "http://localhost:5001/".into(),
            analysis_url: "http://localhost:5002///".into(),
            timeout_secs: 5,
        };
        let client = ApiClient::new(&cfg, &auth).unwrap();
        assert_eq!(client.api_url, "http://localhost:5001");
        assert_eq!(client.analysis_url, "http://localhost:5002");
    }

    #[test]
    fn authorized_calls_fail_fast_without_token() {
        let dir = TempDir::new().unwrap();
        let auth = logged_out_auth(&dir);
        let client = ApiClient::new(&ServerConfig::default(), &auth).unwrap();

        // No network involved: the token check rejects before any request.
        let err = client.list_recordings().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::AuthMissing)
        ));

        let err = client.delete_recording("some-id").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::AuthMissing)
        ));
    }
}
