//! Outgoing manager actions and their wire serialization
//!
//! An action is a block of `Key: Value` lines terminated by an empty line.
//! Every action carries an `ActionID` so the matching response can be picked
//! out of the packet stream.

use crate::error::{ManagerError, Result};

/// Login credentials for the manager interface
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Manager username
    pub username: String,
    /// Manager secret (password)
    pub secret: String,
}

impl Credentials {
    /// Create a new set of credentials
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

/// Where an originated call is connected once it answers
///
/// Exactly one destination mode exists per request; the enum makes the
/// "application XOR context/extension/priority" rule unrepresentable
/// rather than checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Connect the answered call to a dialplan application
    Application {
        /// Application name, e.g. `Echo`
        application: String,
        /// Arguments passed to the application, may be empty
        data: String,
    },
    /// Send the answered call to a dialplan location
    Extension {
        /// Dialplan context
        context: String,
        /// Extension within the context
        exten: String,
        /// Priority of the extension
        priority: String,
    },
}

/// A validated request to originate one outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    channel: String,
    destination: Destination,
}

impl CallRequest {
    /// Build a call request, rejecting empty channel or destination fields
    pub fn new(channel: impl Into<String>, destination: Destination) -> Result<Self> {
        let channel = channel.into();
        if channel.is_empty() {
            return Err(ManagerError::invalid_request("channel must not be empty"));
        }
        match &destination {
            Destination::Application { application, .. } => {
                if application.is_empty() {
                    return Err(ManagerError::invalid_request(
                        "application must not be empty",
                    ));
                }
            }
            Destination::Extension {
                context,
                exten,
                priority,
            } => {
                if context.is_empty() || exten.is_empty() || priority.is_empty() {
                    return Err(ManagerError::invalid_request(
                        "context, extension and priority must all be set",
                    ));
                }
            }
        }
        Ok(Self {
            channel,
            destination,
        })
    }

    /// The outbound channel string, e.g. `SIP/100`
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The destination the call is connected to once it answers
    pub fn destination(&self) -> &Destination {
        &self.destination
    }
}

/// Actions this client can send to the server
#[derive(Debug, Clone)]
pub enum ManagerAction {
    /// Authenticate the session
    Login(Credentials),
    /// Place one outbound call (always sent with `Async: true`)
    Originate(CallRequest),
    /// Close the session politely
    Logoff,
}

impl ManagerAction {
    /// Wire name of the action
    pub fn name(&self) -> &'static str {
        match self {
            ManagerAction::Login(_) => "Login",
            ManagerAction::Originate(_) => "Originate",
            ManagerAction::Logoff => "Logoff",
        }
    }

    /// Render the action as a CRLF-framed block ready to write to the socket
    pub fn to_wire(&self, action_id: &str) -> String {
        let mut out = String::new();
        push_field(&mut out, "Action", self.name());
        push_field(&mut out, "ActionID", action_id);
        match self {
            ManagerAction::Login(credentials) => {
                push_field(&mut out, "Username", &credentials.username);
                push_field(&mut out, "Secret", &credentials.secret);
            }
            ManagerAction::Originate(request) => {
                push_field(&mut out, "Channel", request.channel());
                match request.destination() {
                    Destination::Application { application, data } => {
                        push_field(&mut out, "Application", application);
                        push_field(&mut out, "Data", data);
                    }
                    Destination::Extension {
                        context,
                        exten,
                        priority,
                    } => {
                        push_field(&mut out, "Context", context);
                        push_field(&mut out, "Exten", exten);
                        push_field(&mut out, "Priority", priority);
                    }
                }
                // Fire-and-continue call setup; the response acknowledges the
                // originate request rather than waiting for the call to answer.
                push_field(&mut out, "Async", "true");
            }
            ManagerAction::Logoff => {}
        }
        out.push_str("\r\n");
        out
    }
}

fn push_field(buf: &mut String, key: &str, value: &str) {
    buf.push_str(key);
    buf.push_str(": ");
    buf.push_str(value);
    buf.push_str("\r\n");
}
