//! Session controller: connect → login → originate, exactly once
//!
//! Remote failures terminate the session the same way success does; they are
//! logged here and folded into the returned [`Outcome`] rather than
//! propagated. There is no retry and no deadline on either step.

use amicall_manager_core::{CallRequest, Credentials, ManagerClient, ManagerError};
use tracing::{debug, error, info};

/// Terminal result of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The originate request was accepted by the server
    Success,
    /// Login or originate failed
    Failure,
}

/// Lifecycle of the one manager session this process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection yet
    Disconnected,
    /// Connection opened, credentials submitted
    LoggingIn,
    /// Authentication accepted
    LoggedIn,
    /// Originate submitted, awaiting the response
    OriginateInFlight,
    /// Terminal
    Completed(Outcome),
}

/// Drives the login and originate sequence against one server
pub struct Session {
    state: SessionState,
    host: String,
    port: u16,
    credentials: Credentials,
    request: CallRequest,
}

impl Session {
    /// Create a session in the Disconnected state
    pub fn new(host: String, port: u16, credentials: Credentials, request: CallRequest) -> Self {
        Self {
            state: SessionState::Disconnected,
            host,
            port,
            credentials,
            request,
        }
    }

    /// Run the session to a terminal state
    pub async fn run(&mut self) -> Outcome {
        self.transition(SessionState::LoggingIn);
        let mut client = match ManagerClient::connect(&self.host, self.port).await {
            Ok(client) => client,
            Err(err) => {
                error!("Failed to log in: {err}");
                return self.complete(Outcome::Failure);
            }
        };
        match client.login(&self.credentials).await {
            Ok(()) => {}
            Err(ManagerError::Authentication { reason }) => {
                error!("Failed to log in: {reason}");
                return self.complete(Outcome::Failure);
            }
            Err(err) => {
                error!("Failed to log in: {err}");
                return self.complete(Outcome::Failure);
            }
        }
        self.transition(SessionState::LoggedIn);

        self.transition(SessionState::OriginateInFlight);
        let outcome = match client.originate(&self.request).await {
            Ok(()) => {
                info!(channel = %self.request.channel(), "originate request accepted");
                Outcome::Success
            }
            Err(ManagerError::ActionFailed { reason, .. }) => {
                error!("Originate failed: {reason}");
                Outcome::Failure
            }
            Err(err) => {
                error!("Originate failed: {err}");
                Outcome::Failure
            }
        };

        // Best-effort farewell; never changes the outcome.
        if let Err(err) = client.logoff().await {
            debug!("logoff failed: {err}");
        }

        self.complete(outcome)
    }

    /// Current state, mostly useful for inspection in tests
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session state change");
        self.state = next;
    }

    fn complete(&mut self, outcome: Outcome) -> Outcome {
        self.transition(SessionState::Completed(outcome));
        outcome
    }
}
