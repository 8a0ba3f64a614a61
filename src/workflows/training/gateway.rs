use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::payload::StudentApplicationPayload;

/// Backend error code returned when a bank-transfer application lacks its receipt.
pub const ATTACHMENT_REQUIRED_CODE: &str = "STUDENT_ATTACHMENT_REQUIRED";
/// Status reported when the backend does not return one.
pub const DEFAULT_APPLICATION_STATUS: &str = "RECEIVED";

pub const BANK_RECEIPT_REQUIRED_MESSAGE: &str =
    "Le reçu de virement bancaire est obligatoire pour ce mode de paiement.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Une erreur est survenue lors de la soumission. Veuillez réessayer.";

/// Outbound seam to the training backend.
#[async_trait]
pub trait ApplicationGateway: Send + Sync {
    async fn submit_application(
        &self,
        payload: &StudentApplicationPayload,
    ) -> Result<ApplicationCreated, SubmissionError>;
}

/// Success envelope: `{success, message, data: {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCreated {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<CreatedApplication>,
}

impl ApplicationCreated {
    pub fn with_data(data: CreatedApplication) -> Self {
        Self {
            success: Some(true),
            message: None,
            data: Some(data),
        }
    }

    /// Application number shown to the applicant.
    ///
    /// Precedence: a non-blank `application_number`, then the stringified `id`, then `""`.
    /// An `id` of `0` is a real identifier and is kept.
    pub fn application_number(&self) -> String {
        let data = self.data.as_ref();
        data.and_then(|data| data.application_number.as_deref())
            .filter(|number| !number.trim().is_empty())
            .map(str::to_string)
            .or_else(|| data.and_then(|data| data.id.as_ref()).map(ToString::to_string))
            .unwrap_or_default()
    }

    /// Stringified `id`, or `""` when absent.
    pub fn application_id(&self) -> String {
        self.data
            .as_ref()
            .and_then(|data| data.id.as_ref())
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Backend status, defaulting to [`DEFAULT_APPLICATION_STATUS`] when missing or blank.
    pub fn status(&self) -> String {
        self.data
            .as_ref()
            .and_then(|data| data.status.as_deref())
            .filter(|status| !status.trim().is_empty())
            .unwrap_or(DEFAULT_APPLICATION_STATUS)
            .to_string()
    }

    /// Payment link for online payments, when the provider initiated one.
    pub fn payment_link(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.payment.as_ref())
            .and_then(|payment| payment.payment_link.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedApplication {
    #[serde(default)]
    pub application_number: Option<String>,
    #[serde(default)]
    pub id: Option<ApplicationRef>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment: Option<PaymentInfo>,
}

/// Backend identifiers are numeric today, but string ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplicationRef {
    Number(i64),
    Text(String),
}

impl fmt::Display for ApplicationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationRef::Number(id) => write!(f, "{id}"),
            ApplicationRef::Text(id) => f.write_str(id),
        }
    }
}

/// Online payment block returned alongside the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    #[serde(default)]
    pub payment_provider: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_link: Option<String>,
}

/// Failure body: `{success: false, message, error_code}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Why a submission did not produce an application.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("backend rejected the application (HTTP {status})")]
    Rejected { status: u16, body: FailureBody },
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("unreadable backend response: {0}")]
    Decode(String),
}

impl SubmissionError {
    pub fn rejected(status: u16, error_code: Option<&str>, message: Option<&str>) -> Self {
        Self::Rejected {
            status,
            body: FailureBody {
                error_code: error_code.map(str::to_string),
                message: message.map(str::to_string),
            },
        }
    }

    fn body(&self) -> Option<&FailureBody> {
        match self {
            SubmissionError::Rejected { body, .. } => Some(body),
            SubmissionError::Transport(_) | SubmissionError::Decode(_) => None,
        }
    }

    /// Message shown under the form.
    ///
    /// The attachment-required code always maps to the receipt message; otherwise the
    /// backend message is shown verbatim, falling back to a generic retry prompt.
    pub fn user_message(&self) -> String {
        let body = self.body();

        if body.and_then(|body| body.error_code.as_deref()) == Some(ATTACHMENT_REQUIRED_CODE) {
            return BANK_RECEIPT_REQUIRED_MESSAGE.to_string();
        }

        body.and_then(|body| body.message.as_deref())
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string()
    }
}
