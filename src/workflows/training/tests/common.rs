use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::workflows::training::domain::TrainingSession;
use crate::workflows::training::form::{ApplicationForm, ApplicationFormValues};
use crate::workflows::training::gateway::{
    ApplicationCreated, ApplicationGateway, ApplicationRef, CreatedApplication, SubmissionError,
};
use crate::workflows::training::navigation::{NavigationRequest, Navigator};
use crate::workflows::training::payload::StudentApplicationPayload;
use crate::workflows::training::submitter::ApplicationSubmitter;

pub(super) fn form_values() -> ApplicationFormValues {
    ApplicationFormValues {
        email: "awa.diop@example.sn".to_string(),
        target_session_id: String::new(),
        first_name: "Awa".to_string(),
        last_name: "Diop".to_string(),
        phone_number: "+221770000000".to_string(),
        civility: "MME".to_string(),
        city: "Dakar".to_string(),
        address: "Sacré-Coeur 3".to_string(),
        date_of_birth: "2001-05-12".to_string(),
        payment_method: String::new(),
    }
}

pub(super) fn session() -> TrainingSession {
    TrainingSession::new("session-42").with_title("Développement Web & Mobile")
}

pub(super) fn created(
    application_number: Option<&str>,
    id: Option<i64>,
    status: Option<&str>,
) -> ApplicationCreated {
    ApplicationCreated::with_data(CreatedApplication {
        application_number: application_number.map(str::to_string),
        id: id.map(ApplicationRef::Number),
        status: status.map(str::to_string),
        payment: None,
    })
}

/// Gateway replaying canned results and recording every payload it receives.
#[derive(Default)]
pub(super) struct ScriptedGateway {
    responses: Mutex<VecDeque<Result<ApplicationCreated, SubmissionError>>>,
    payloads: Mutex<Vec<StudentApplicationPayload>>,
}

impl ScriptedGateway {
    pub(super) fn replying(
        responses: impl IntoIterator<Item = Result<ApplicationCreated, SubmissionError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn payloads(&self) -> Vec<StudentApplicationPayload> {
        self.payloads.lock().expect("payload mutex poisoned").clone()
    }

    pub(super) fn calls(&self) -> usize {
        self.payloads.lock().expect("payload mutex poisoned").len()
    }
}

#[async_trait]
impl ApplicationGateway for ScriptedGateway {
    async fn submit_application(
        &self,
        payload: &StudentApplicationPayload,
    ) -> Result<ApplicationCreated, SubmissionError> {
        self.payloads
            .lock()
            .expect("payload mutex poisoned")
            .push(payload.clone());
        self.responses
            .lock()
            .expect("response mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(SubmissionError::Transport("no scripted response".to_string())))
    }
}

/// Gateway that parks every call until the test releases it.
pub(super) struct GatedGateway {
    pub(super) entered: Notify,
    pub(super) release: Notify,
    calls: AtomicUsize,
    response: Mutex<Option<Result<ApplicationCreated, SubmissionError>>>,
}

impl GatedGateway {
    pub(super) fn new(response: Result<ApplicationCreated, SubmissionError>) -> Self {
        Self {
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
            response: Mutex::new(Some(response)),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApplicationGateway for GatedGateway {
    async fn submit_application(
        &self,
        _payload: &StudentApplicationPayload,
    ) -> Result<ApplicationCreated, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        self.response
            .lock()
            .expect("response mutex poisoned")
            .take()
            .unwrap_or_else(|| Err(SubmissionError::Transport("response consumed".to_string())))
    }
}

#[derive(Default)]
pub(super) struct RecordingNavigator {
    requests: Mutex<Vec<NavigationRequest>>,
}

impl RecordingNavigator {
    pub(super) fn requests(&self) -> Vec<NavigationRequest> {
        self.requests.lock().expect("navigator mutex poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, request: NavigationRequest) {
        self.requests
            .lock()
            .expect("navigator mutex poisoned")
            .push(request);
    }
}

pub(super) fn build_submitter(
    responses: impl IntoIterator<Item = Result<ApplicationCreated, SubmissionError>>,
) -> (
    ApplicationSubmitter<ScriptedGateway, RecordingNavigator>,
    Arc<ScriptedGateway>,
    Arc<RecordingNavigator>,
) {
    let gateway = Arc::new(ScriptedGateway::replying(responses));
    let navigator = Arc::new(RecordingNavigator::default());
    let submitter = ApplicationSubmitter::new(
        gateway.clone(),
        navigator.clone(),
        ApplicationForm::from_values(form_values()),
    );
    (submitter, gateway, navigator)
}

/// Submitter with a valid form and a selected session.
pub(super) fn ready_submitter(
    responses: impl IntoIterator<Item = Result<ApplicationCreated, SubmissionError>>,
) -> (
    ApplicationSubmitter<ScriptedGateway, RecordingNavigator>,
    Arc<ScriptedGateway>,
    Arc<RecordingNavigator>,
) {
    let (submitter, gateway, navigator) = build_submitter(responses);
    submitter.select_session(Some(session()));
    (submitter, gateway, navigator)
}
