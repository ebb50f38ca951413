//! Interactive credential prompts
//!
//! Only used when -u/--username or -p/--password are omitted. The password
//! is always read with echoing disabled.

use anyhow::{Context, Result};
use std::io::{IsTerminal, Write};

/// Return the username, prompting when none was given.
///
/// Empty input at the prompt resolves to the invoking OS user.
pub fn resolve_username(provided: Option<String>) -> Result<String> {
    if let Some(username) = provided.filter(|u| !u.is_empty()) {
        return Ok(username);
    }
    ensure_terminal()?;

    let fallback = os_username();
    print!("Username [{fallback}]: ");
    std::io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read username")?;
    Ok(pick_username(&line, &fallback))
}

/// Return the password, prompting with echoing disabled when none was given.
pub fn resolve_password(provided: Option<String>) -> Result<String> {
    if let Some(password) = provided.filter(|p| !p.is_empty()) {
        return Ok(password);
    }
    ensure_terminal()?;
    rpassword::prompt_password("Password: ").context("failed to read password")
}

fn ensure_terminal() -> Result<()> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!(
            "cannot prompt for credentials without a terminal; pass --username and --password"
        );
    }
    Ok(())
}

fn pick_username(typed: &str, fallback: &str) -> String {
    let typed = typed.trim();
    if typed.is_empty() {
        fallback.to_string()
    } else {
        typed.to_string()
    }
}

fn os_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
