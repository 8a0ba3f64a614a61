use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;

use super::gateway::{ApplicationCreated, ApplicationGateway, FailureBody, SubmissionError};
use super::payload::StudentApplicationPayload;

const APPLICATIONS_PATH: &str = "api/v1/student-applications";

/// Raised when the HTTP client cannot be constructed from configuration.
#[derive(Debug, thiserror::Error)]
pub enum GatewayBuildError {
    #[error("invalid API base URL: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("invalid API token: {0}")]
    Token(#[from] header::InvalidHeaderValue),
    #[error("HTTP client could not be built: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`ApplicationGateway`] backed by the training REST API.
#[derive(Debug, Clone)]
pub struct HttpApplicationGateway {
    client: Client,
    endpoint: Url,
}

impl HttpApplicationGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayBuildError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = &config.token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: applications_endpoint(&config.base_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolve the create endpoint, keeping any path prefix on the base URL.
fn applications_endpoint(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(APPLICATIONS_PATH)
}

#[async_trait]
impl ApplicationGateway for HttpApplicationGateway {
    async fn submit_application(
        &self,
        payload: &StudentApplicationPayload,
    ) -> Result<ApplicationCreated, SubmissionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        debug!(%status, bytes = body.len(), "student application response received");

        if status.is_success() {
            return serde_json::from_slice(&body)
                .map_err(|err| SubmissionError::Decode(err.to_string()));
        }

        Err(SubmissionError::Rejected {
            status: status.as_u16(),
            body: failure_body(status, &body),
        })
    }
}

/// Decode a failure body leniently; anything unreadable becomes an empty body.
fn failure_body(status: StatusCode, raw: &[u8]) -> FailureBody {
    match serde_json::from_slice::<FailureBody>(raw) {
        Ok(body) => body,
        Err(err) => {
            debug!(%status, %err, "failure body is not a backend error envelope");
            FailureBody::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let base = Url::parse("https://api.example.sn/backend").expect("valid url");
        assert_eq!(
            applications_endpoint(&base).expect("joins").as_str(),
            "https://api.example.sn/backend/api/v1/student-applications"
        );

        let base = Url::parse("http://127.0.0.1:8000/").expect("valid url");
        assert_eq!(
            applications_endpoint(&base).expect("joins").as_str(),
            "http://127.0.0.1:8000/api/v1/student-applications"
        );
    }

    #[test]
    fn non_json_failure_body_is_empty() {
        let body = failure_body(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(body, FailureBody::default());
    }

    #[test]
    fn backend_fail_envelope_is_decoded() {
        let body = failure_body(
            StatusCode::BAD_REQUEST,
            br#"{"success":false,"message":"Bank transfer receipt is required","error_code":"STUDENT_ATTACHMENT_REQUIRED"}"#,
        );
        assert_eq!(body.error_code.as_deref(), Some("STUDENT_ATTACHMENT_REQUIRED"));
        assert_eq!(body.message.as_deref(), Some("Bank transfer receipt is required"));
    }
}
