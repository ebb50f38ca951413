//! Originate a call on an Asterisk server over the Manager Interface.
//!
//! Exit code 0 for every terminal outcome of a validated request, including
//! a logged login or originate failure; exit code 1 for usage errors.

use std::process::ExitCode;

use amicall_cli::args::{CallSpec, Cli};
use amicall_cli::{prompt, session};
use amicall_manager_core::Credentials;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap renders its own output; --help and --version land here too
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let CallSpec {
        request,
        host,
        port,
        username,
        password,
    } = match cli.into_spec() {
        Ok(spec) => spec,
        Err(usage) => {
            tracing::error!("{usage}");
            eprintln!("{}", Cli::command().render_usage());
            return ExitCode::FAILURE;
        }
    };

    let username = match prompt::resolve_username(username) {
        Ok(username) => username,
        Err(err) => {
            tracing::error!("{err:#}");
            return ExitCode::FAILURE;
        }
    };
    let password = match prompt::resolve_password(password) {
        Ok(password) => password,
        Err(err) => {
            tracing::error!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = session::Session::new(host, port, Credentials::new(username, password), request);
    let outcome = session.run().await;
    tracing::debug!(?outcome, "session finished");

    // Remote failures were already logged by the session; they do not turn
    // into a non-zero exit.
    ExitCode::SUCCESS
}
