//! # Manager Core - Asterisk Manager Interface client library
//!
//! This crate provides the pieces needed to drive one action/response
//! exchange with an Asterisk Manager Interface (AMI) server:
//!
//! - **action**: outgoing actions (`Login`, `Originate`, `Logoff`) and their
//!   `Key: Value` wire framing
//! - **message**: incoming packet parsing (responses and unsolicited events)
//! - **client**: a single-connection async client with one request in
//!   flight at a time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use amicall_manager_core::{CallRequest, Credentials, Destination, ManagerClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = ManagerClient::connect("localhost", 5038).await?;
//!     client.login(&Credentials::new("admin", "secret")).await?;
//!
//!     let request = CallRequest::new(
//!         "SIP/100",
//!         Destination::Application {
//!             application: "Echo".to_string(),
//!             data: String::new(),
//!         },
//!     )?;
//!     client.originate(&request).await?;
//!     client.logoff().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod action;
pub mod client;
pub mod error;
pub mod message;

// Re-export main types
pub use action::{CallRequest, Credentials, Destination, ManagerAction};
pub use client::ManagerClient;
pub use error::{ManagerError, Result};
pub use message::{ManagerEvent, ManagerResponse, Packet, ResponseStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
