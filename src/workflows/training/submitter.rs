use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::domain::{
    PaymentMethod, TrainingSession, UploadedFile, UploadedFiles, BANK_TRANSFER_RECEIPT,
};
use super::form::{ApplicationForm, FormField};
use super::gateway::ApplicationGateway;
use super::navigation::{NavigationRequest, Navigator, SuccessRedirect};
use super::payload::StudentApplicationPayload;

/// Shown when the applicant submits without choosing a session.
pub const SESSION_REQUIRED_MESSAGE: &str = "Veuillez sélectionner une session de formation.";

/// Where the submission flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// Editable; also the state after a failed attempt.
    Idle,
    Submitting,
    /// The applicant has been redirected to the success page.
    Succeeded,
}

/// What a call to [`ApplicationSubmitter::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Preconditions failed; every field is now touched and nothing was sent.
    Invalid { missing_session: bool },
    /// Another submission is in flight; the call was ignored.
    AlreadySubmitting,
    Redirected(NavigationRequest),
    Failed { message: String },
}

/// View state owned by the submitter.
#[derive(Debug, Clone)]
pub struct SubmissionView {
    pub form: ApplicationForm,
    pub selected_session: Option<TrainingSession>,
    pub uploaded_files: UploadedFiles,
    pub payment_method: Option<String>,
    pub phase: SubmissionPhase,
    pub submit_error: Option<String>,
}

impl SubmissionView {
    fn new(form: ApplicationForm) -> Self {
        Self {
            form,
            selected_session: None,
            uploaded_files: UploadedFiles::new(),
            payment_method: None,
            phase: SubmissionPhase::Idle,
            submit_error: None,
        }
    }
}

/// Ticket handed from the precondition step to the network step.
struct PreparedSubmission {
    payload: StudentApplicationPayload,
    training_title: String,
}

/// View-model for the training application form.
pub struct ApplicationSubmitter<G, N> {
    gateway: Arc<G>,
    navigator: Arc<N>,
    state: Mutex<SubmissionView>,
}

impl<G, N> ApplicationSubmitter<G, N>
where
    G: ApplicationGateway + 'static,
    N: Navigator + 'static,
{
    pub fn new(gateway: Arc<G>, navigator: Arc<N>, form: ApplicationForm) -> Self {
        Self {
            gateway,
            navigator,
            state: Mutex::new(SubmissionView::new(form)),
        }
    }

    fn state(&self) -> MutexGuard<'_, SubmissionView> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the whole view state.
    pub fn snapshot(&self) -> SubmissionView {
        self.state().clone()
    }

    pub fn form(&self) -> ApplicationForm {
        self.state().form.clone()
    }

    pub fn update_form<F>(&self, edit: F)
    where
        F: FnOnce(&mut ApplicationForm),
    {
        edit(&mut self.state().form);
    }

    /// Select (or clear) the target session. Selecting also fills `target_session_id`.
    pub fn select_session(&self, session: Option<TrainingSession>) {
        let mut state = self.state();
        if let Some(session) = &session {
            state.form.set(FormField::TargetSessionId, session.id.clone());
        }
        state.selected_session = session;
    }

    pub fn set_payment_method(&self, method: Option<String>) {
        self.state().payment_method = method;
    }

    pub fn register_upload(&self, kind: impl Into<String>, file: UploadedFile) {
        self.state().uploaded_files.insert(kind, file);
    }

    pub fn remove_upload(&self, kind: &str) -> Option<UploadedFile> {
        self.state().uploaded_files.remove(kind)
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state().phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase() == SubmissionPhase::Submitting
    }

    pub fn submit_error(&self) -> Option<String> {
        self.state().submit_error.clone()
    }

    /// Payload the next submit would send, without sending it.
    pub fn preview_payload(&self) -> StudentApplicationPayload {
        let state = self.state();
        StudentApplicationPayload::build(
            state.form.values(),
            state.payment_method.as_deref(),
            &state.uploaded_files,
        )
    }

    /// Validate, send and route the application.
    ///
    /// Exactly one of navigation or an error message results from every attempt that
    /// reaches the gateway. Calls made while an attempt is in flight are ignored.
    pub async fn submit(&self) -> SubmitOutcome {
        let prepared = match self.begin() {
            Ok(prepared) => prepared,
            Err(outcome) => return outcome,
        };

        let result = self.gateway.submit_application(&prepared.payload).await;

        match result {
            Ok(response) => {
                let redirect = SuccessRedirect {
                    application_number: response.application_number(),
                    application_id: response.application_id(),
                    email: prepared.payload.email.clone(),
                    training_title: prepared.training_title,
                    status: response.status(),
                };
                let request = redirect.into_request();

                {
                    let mut state = self.state();
                    state.phase = SubmissionPhase::Succeeded;
                }

                info!(
                    application_number = request.param("applicationNumber").unwrap_or_default(),
                    status = request.param("status").unwrap_or_default(),
                    payment_link = response.payment_link().unwrap_or_default(),
                    "training application accepted"
                );

                self.navigator.navigate(request.clone());
                SubmitOutcome::Redirected(request)
            }
            Err(error) => {
                let message = error.user_message();
                warn!(%error, %message, "training application rejected");

                let mut state = self.state();
                state.phase = SubmissionPhase::Idle;
                state.submit_error = Some(message.clone());
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Precondition checks and the `Idle -> Submitting` transition, under one lock.
    fn begin(&self) -> Result<PreparedSubmission, SubmitOutcome> {
        let mut state = self.state();

        if state.phase == SubmissionPhase::Submitting {
            debug!("submit ignored: a submission is already in flight");
            return Err(SubmitOutcome::AlreadySubmitting);
        }

        let missing_session = state.selected_session.is_none();
        if !state.form.is_valid() || missing_session {
            state.form.mark_all_touched();
            if missing_session {
                state.submit_error = Some(SESSION_REQUIRED_MESSAGE.to_string());
            }
            debug!(
                missing_session,
                errors = state.form.errors().len(),
                "submit blocked by form validation"
            );
            return Err(SubmitOutcome::Invalid { missing_session });
        }

        state.phase = SubmissionPhase::Submitting;
        state.submit_error = None;

        let payload = StudentApplicationPayload::build(
            state.form.values(),
            state.payment_method.as_deref(),
            &state.uploaded_files,
        );

        let needs_receipt = payload
            .payment_method
            .as_deref()
            .and_then(PaymentMethod::from_code)
            .is_some_and(PaymentMethod::requires_bank_receipt);
        if needs_receipt && !state.uploaded_files.contains(BANK_TRANSFER_RECEIPT) {
            warn!("bank transfer selected without a receipt upload; backend will reject it");
        }

        let training_title = state
            .selected_session
            .as_ref()
            .and_then(TrainingSession::training_title)
            .unwrap_or_default()
            .to_string();

        info!(
            session = %payload.target_session_id,
            attachments = payload.attachments.len(),
            "submitting training application"
        );

        Ok(PreparedSubmission {
            payload,
            training_title,
        })
    }
}
