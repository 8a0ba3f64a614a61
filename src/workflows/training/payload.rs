use serde::{Deserialize, Serialize};

use super::domain::{PaymentMethod, UploadedFiles};
use super::form::ApplicationFormValues;

/// Country code attached to every application.
pub const DEFAULT_COUNTRY_CODE: &str = "SN";

/// Body of `POST /api/v1/student-applications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentApplicationPayload {
    pub email: String,
    pub target_session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub civility: Option<String>,
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentDescriptor>,
}

/// Reference to an already uploaded file, tagged with its attachment type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub name: String,
}

impl StudentApplicationPayload {
    /// Assemble the body from the current form values.
    ///
    /// `payment_selection` is the payment method chosen outside the form (the payment tabs);
    /// it is used only when the form's own `payment_method` control is blank. Known codes are
    /// sent in their canonical upper-case spelling.
    pub fn build(
        values: &ApplicationFormValues,
        payment_selection: Option<&str>,
        files: &UploadedFiles,
    ) -> Self {
        let payment_method = non_blank(&values.payment_method)
            .or_else(|| payment_selection.and_then(non_blank))
            .map(canonical_payment_code);

        Self {
            email: values.email.trim().to_string(),
            target_session_id: values.target_session_id.trim().to_string(),
            first_name: non_blank(&values.first_name),
            last_name: non_blank(&values.last_name),
            phone_number: non_blank(&values.phone_number),
            civility: non_blank(&values.civility),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            city: non_blank(&values.city),
            address: non_blank(&values.address),
            date_of_birth: non_blank(&values.date_of_birth),
            payment_method,
            attachments: attachments_from(files),
        }
    }
}

/// One descriptor per uploaded file, in registration order.
pub fn attachments_from(files: &UploadedFiles) -> Vec<AttachmentDescriptor> {
    files
        .iter()
        .map(|(kind, file)| AttachmentDescriptor {
            kind: kind.to_string(),
            url: file.url.clone(),
            name: file.name.clone(),
        })
        .collect()
}

/// The backend matches payment codes exactly; unknown codes pass through for it to reject.
fn canonical_payment_code(raw: String) -> String {
    match PaymentMethod::from_code(&raw) {
        Some(method) => method.code().to_string(),
        None => raw,
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
