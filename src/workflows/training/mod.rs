//! Training application intake from the applicant's side.
//!
//! [`ApplicationSubmitter`] holds the form, the selected session and the uploaded files,
//! validates them on submit, sends a [`StudentApplicationPayload`] through an
//! [`ApplicationGateway`] and either navigates to the success page or records an error
//! message for the form.

pub mod domain;
pub mod form;
pub mod gateway;
pub mod http;
pub mod navigation;
pub mod payload;
pub mod submitter;

#[cfg(test)]
mod tests;

pub use domain::{
    PaymentMethod, TrainingSession, TrainingSummary, UploadedFile, UploadedFiles,
    BANK_TRANSFER_RECEIPT,
};
pub use form::{ApplicationForm, ApplicationFormValues, FieldError, FormField};
pub use gateway::{
    ApplicationCreated, ApplicationGateway, ApplicationRef, CreatedApplication, FailureBody,
    PaymentInfo, SubmissionError, ATTACHMENT_REQUIRED_CODE, BANK_RECEIPT_REQUIRED_MESSAGE,
    DEFAULT_APPLICATION_STATUS, GENERIC_FAILURE_MESSAGE,
};
pub use http::{GatewayBuildError, HttpApplicationGateway};
pub use navigation::{NavigationRequest, Navigator, SuccessRedirect, SUCCESS_PATH};
pub use payload::{AttachmentDescriptor, StudentApplicationPayload, DEFAULT_COUNTRY_CODE};
pub use submitter::{
    ApplicationSubmitter, SubmissionPhase, SubmissionView, SubmitOutcome,
    SESSION_REQUIRED_MESSAGE,
};
