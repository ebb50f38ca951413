//! Command-line surface and request validation
//!
//! clap handles the flag grammar; destination-mode validation lives in
//! [`Cli::into_spec`] so the rules stay testable without a terminal.

use amicall_manager_core::{CallRequest, Destination};
use clap::Parser;
use thiserror::Error;

const ABOUT: &str = "Originate a call on an Asterisk server";

const LONG_ABOUT: &str = "This program is used to originate a call on an Asterisk server using \
the Asterisk Manager Interface (AMI). The channel argument to this application tells Asterisk \
what outbound call to make. There are various options that can be used to specify what the \
outbound call is connected to once it answers.";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "amicall", version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Cli {
    /// Enable debug output
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// AMI username
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// AMI password
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Hostname or IP address of the Asterisk server
    #[arg(short = 'H', long, default_value = "localhost")]
    pub host: String,

    /// Port number for the AMI
    #[arg(short = 't', long, default_value_t = 5038)]
    pub port: u16,

    /// Application to connect the call to. Do not use this option and the
    /// context, extension, and priority options at the same time
    #[arg(short = 'a', long, default_value = "")]
    pub application: String,

    /// Arguments to pass to the dialplan application specified with
    /// -a/--application
    #[arg(short = 'D', long, default_value = "")]
    pub data: String,

    /// Context in the dialplan to send the call to once it answers. If using
    /// this option, you must also specify an extension and priority
    #[arg(short = 'c', long, default_value = "")]
    pub context: String,

    /// Extension to connect the call to. This should be used along with the
    /// context and priority options
    #[arg(short = 'e', long, default_value = "")]
    pub extension: String,

    /// Priority of the extension to connect the call to. This should be used
    /// along with the context and extension options
    #[arg(short = 'P', long, default_value = "")]
    pub priority: String,

    /// Outbound channel to originate, e.g. SIP/100
    #[arg(value_name = "CHANNEL")]
    pub channel: Option<String>,
}

/// Bad or missing arguments, detected before any network activity
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct UsageError(pub String);

/// A fully validated run: what to call and where the server is
#[derive(Debug)]
pub struct CallSpec {
    /// The originate request to submit
    pub request: CallRequest,
    /// Manager host
    pub host: String,
    /// Manager port
    pub port: u16,
    /// Username, if given on the command line
    pub username: Option<String>,
    /// Password, if given on the command line
    pub password: Option<String>,
}

impl Cli {
    /// Validate the parsed arguments into a [`CallSpec`].
    ///
    /// Exactly one destination mode must be in play: a non-empty
    /// application, or context, extension and priority all non-empty.
    /// Mixing the application flag with any extension-mode flag is
    /// ambiguous and rejected.
    pub fn into_spec(self) -> Result<CallSpec, UsageError> {
        let channel = match self.channel {
            Some(channel) if !channel.is_empty() => channel,
            _ => {
                return Err(UsageError(
                    "Please specify a single outbound channel.".to_string(),
                ))
            }
        };

        let has_application = !self.application.is_empty();
        let any_extension_field = !self.context.is_empty()
            || !self.extension.is_empty()
            || !self.priority.is_empty();
        let full_extension = !self.context.is_empty()
            && !self.extension.is_empty()
            && !self.priority.is_empty();

        let destination = if has_application && any_extension_field {
            return Err(UsageError(
                "Please specify only one of extension and application.".to_string(),
            ));
        } else if has_application {
            Destination::Application {
                application: self.application,
                data: self.data,
            }
        } else if full_extension {
            Destination::Extension {
                context: self.context,
                exten: self.extension,
                priority: self.priority,
            }
        } else {
            return Err(UsageError(
                "Please specify a valid point to connect the call to once it answers. \
                 Either specify an application or a context, extension, and priority."
                    .to_string(),
            ));
        };

        let request = CallRequest::new(channel, destination)
            .map_err(|err| UsageError(err.to_string()))?;

        Ok(CallSpec {
            request,
            host: self.host,
            port: self.port,
            username: self.username,
            password: self.password,
        })
    }
}
