use std::{sync::Arc, time::Duration};

use reqwest::Client;
use shared::{
    domain::{Roster, StatusMessage},
    protocol::{MutationConfirmation, MutationRejection},
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, info, warn};

pub mod error;

pub use error::{FetchError, MutationError};

/// How long a status banner stays visible after the most recent outcome.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(5);

const SIGNUP_TRANSPORT_FAILURE_TEXT: &str = "Failed to sign up. Please try again.";
const UNREGISTER_TRANSPORT_FAILURE_TEXT: &str = "Failed to unregister. Please try again.";
const REJECTION_FALLBACK_TEXT: &str = "An error occurred";

/// Presentation surface for roster snapshots.
///
/// Every `render` call replaces the entire displayed list and the
/// activity-selection options; nothing from a previous render survives. For
/// each activity, in roster order, an implementation presents the title,
/// description, schedule, the derived spots-left count, one removal control
/// per participant addressed by `(activity name, email)`, and one selection
/// option whose value and label are the activity name.
pub trait Renderer: Send + Sync {
    fn render(&self, roster: &Roster);
    /// Show a static failure notice in the roster area. The selection
    /// control keeps its prior options; a failed fetch must not corrupt it.
    fn render_unavailable(&self);
    /// Clear the email input and activity selection after a confirmed signup.
    fn reset_signup_form(&self);
}

/// Transient banner for mutation outcomes. At most one message is visible at
/// any instant; `show` always replaces the current one.
pub trait StatusSurface: Send + Sync {
    fn show(&self, message: &StatusMessage);
    fn clear(&self);
}

/// Confirmation prompt shown before an unregister request is issued, naming
/// both the email and the activity. Returning `false` aborts the operation
/// with no network call.
pub trait ConfirmationGate: Send + Sync {
    fn confirm_unregister(&self, activity: &str, email: &str) -> bool;
}

/// Gate that approves every removal without prompting.
pub struct AlwaysConfirm;

impl ConfirmationGate for AlwaysConfirm {
    fn confirm_unregister(&self, _activity: &str, _email: &str) -> bool {
        true
    }
}

/// Where the coordinator is in its mutation cycle. Terminal phases fall back
/// to `Idle` when the status banner expires or the next mutation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Which arm of a mutation ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The service confirmed the mutation and the roster was re-fetched.
    Completed,
    /// The service declined the mutation; the roster was left untouched.
    Rejected,
    /// The request never completed; the roster was left untouched.
    TransportFailed,
    /// The user declined the confirmation prompt; nothing was sent.
    Aborted,
}

pub struct EnrollmentClient {
    http: Client,
    server_url: String,
    renderer: Arc<dyn Renderer>,
    status_surface: Arc<dyn StatusSurface>,
    confirmation: Arc<dyn ConfirmationGate>,
    inner: Mutex<ClientState>,
}

#[derive(Default)]
struct ClientState {
    last_roster: Option<Roster>,
    phase: MutationPhase,
    status: Option<StatusMessage>,
    status_expiry: Option<JoinHandle<()>>,
}

impl EnrollmentClient {
    pub fn new(
        server_url: impl Into<String>,
        renderer: Arc<dyn Renderer>,
        status_surface: Arc<dyn StatusSurface>,
        confirmation: Arc<dyn ConfirmationGate>,
    ) -> Arc<Self> {
        let mut server_url = server_url.into();
        while server_url.ends_with('/') {
            server_url.pop();
        }
        Arc::new(Self {
            http: Client::new(),
            server_url,
            renderer,
            status_surface,
            confirmation,
            inner: Mutex::new(ClientState::default()),
        })
    }

    /// Fetch the full roster and hand it to the renderer as a wholesale
    /// replacement. On failure the renderer shows its unavailable state and
    /// the previously fetched snapshot is left alone.
    pub async fn refresh_roster(&self) -> Result<(), FetchError> {
        match self.fetch_roster().await {
            Ok(roster) => {
                self.renderer.render(&roster);
                self.inner.lock().await.last_roster = Some(roster);
                Ok(())
            }
            Err(err) => {
                error!("roster fetch failed: {err}");
                self.renderer.render_unavailable();
                Err(err)
            }
        }
    }

    async fn fetch_roster(&self) -> Result<Roster, FetchError> {
        let response = self
            .http
            .get(format!("{}/activities", self.server_url))
            .send()
            .await
            .map_err(FetchError::Transport)?;
        let response = response.error_for_status().map_err(FetchError::Transport)?;
        response.json().await.map_err(FetchError::Decode)
    }

    /// Enroll `email` in `activity`. Every failure arm is converted into a
    /// visible status message; the returned outcome reports which arm ran.
    pub async fn sign_up(self: &Arc<Self>, activity: &str, email: &str) -> MutationOutcome {
        self.set_phase(MutationPhase::Submitting).await;
        let url = format!(
            "{}/activities/{}/signup",
            self.server_url,
            urlencoding::encode(activity)
        );
        let request = self.http.post(url).query(&[("email", email)]);
        let result = self.submit_mutation(request).await;
        self.conclude_mutation(
            "signup",
            activity,
            email,
            SIGNUP_TRANSPORT_FAILURE_TEXT,
            true,
            result,
        )
        .await
    }

    /// Remove `email` from `activity`, gated on an explicit confirmation.
    /// Declining the prompt aborts with no network call and no state change.
    pub async fn unregister(self: &Arc<Self>, activity: &str, email: &str) -> MutationOutcome {
        if !self.confirmation.confirm_unregister(activity, email) {
            info!(activity, email, "unregister declined at confirmation prompt");
            return MutationOutcome::Aborted;
        }
        self.set_phase(MutationPhase::Submitting).await;
        let url = format!(
            "{}/activities/{}/unregister",
            self.server_url,
            urlencoding::encode(activity)
        );
        let request = self.http.delete(url).query(&[("email", email)]);
        let result = self.submit_mutation(request).await;
        self.conclude_mutation(
            "unregister",
            activity,
            email,
            UNREGISTER_TRANSPORT_FAILURE_TEXT,
            false,
            result,
        )
        .await
    }

    async fn submit_mutation(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<MutationConfirmation, MutationError> {
        let response = request.send().await.map_err(MutationError::Transport)?;
        if response.status().is_success() {
            response
                .json::<MutationConfirmation>()
                .await
                .map_err(MutationError::Transport)
        } else {
            let rejection: MutationRejection =
                response.json().await.map_err(MutationError::Transport)?;
            Err(MutationError::Rejected {
                detail: rejection.detail,
            })
        }
    }

    async fn conclude_mutation(
        self: &Arc<Self>,
        operation: &'static str,
        activity: &str,
        email: &str,
        transport_failure_text: &'static str,
        resets_form: bool,
        result: Result<MutationConfirmation, MutationError>,
    ) -> MutationOutcome {
        match result {
            Ok(confirmation) => {
                info!(operation, activity, email, "mutation confirmed by service");
                // Reconcile with authoritative server state before surfacing
                // the confirmation; local deltas are never merged.
                let _ = self.refresh_roster().await;
                self.publish_status(StatusMessage::success(confirmation.message))
                    .await;
                if resets_form {
                    self.renderer.reset_signup_form();
                }
                self.set_phase(MutationPhase::Succeeded).await;
                MutationOutcome::Completed
            }
            Err(MutationError::Rejected { detail }) => {
                warn!(
                    operation,
                    activity,
                    email,
                    detail = detail.as_deref(),
                    "mutation declined by service"
                );
                let text = detail.unwrap_or_else(|| REJECTION_FALLBACK_TEXT.to_string());
                self.publish_status(StatusMessage::error(text)).await;
                self.set_phase(MutationPhase::Failed).await;
                MutationOutcome::Rejected
            }
            Err(MutationError::Transport(err)) => {
                warn!(operation, activity, email, "mutation request failed: {err}");
                self.publish_status(StatusMessage::error(transport_failure_text))
                    .await;
                self.set_phase(MutationPhase::Failed).await;
                MutationOutcome::TransportFailed
            }
        }
    }

    async fn publish_status(self: &Arc<Self>, message: StatusMessage) {
        let client = Arc::clone(self);
        let expiry = tokio::spawn(async move {
            tokio::time::sleep(STATUS_MESSAGE_TTL).await;
            client.expire_status().await;
        });

        // Surface calls happen under the state lock so a racing expiry task
        // cannot hide a message that was just replaced.
        let mut guard = self.inner.lock().await;
        if let Some(previous) = guard.status_expiry.replace(expiry) {
            previous.abort();
        }
        guard.status = Some(message.clone());
        self.status_surface.show(&message);
    }

    async fn expire_status(&self) {
        let mut guard = self.inner.lock().await;
        guard.status = None;
        guard.status_expiry = None;
        if matches!(guard.phase, MutationPhase::Succeeded | MutationPhase::Failed) {
            guard.phase = MutationPhase::Idle;
        }
        self.status_surface.clear();
    }

    async fn set_phase(&self, phase: MutationPhase) {
        self.inner.lock().await.phase = phase;
    }

    /// Phase of the most recent mutation cycle.
    pub async fn current_phase(&self) -> MutationPhase {
        self.inner.lock().await.phase
    }

    /// The status banner currently visible, if any.
    pub async fn visible_status(&self) -> Option<StatusMessage> {
        self.inner.lock().await.status.clone()
    }

    /// Last successfully fetched roster, cached for rendering only.
    pub async fn last_roster(&self) -> Option<Roster> {
        self.inner.lock().await.last_roster.clone()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
