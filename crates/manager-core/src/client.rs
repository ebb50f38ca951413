//! Single-connection async manager client
//!
//! One TCP connection, one request in flight at a time. Every action gets a
//! fresh UUID `ActionID`; the client reads packets until the response with
//! that ID arrives, skipping any events that show up in between.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::action::{CallRequest, Credentials, ManagerAction};
use crate::error::{ManagerError, Result};
use crate::message::{ManagerResponse, Packet, ResponseStatus};

/// Client for the manager interface of one server
pub struct ManagerClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: String,
}

impl std::fmt::Debug for ManagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerClient")
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}

impl ManagerClient {
    /// Open a TCP connection to `host:port` and consume the server banner.
    ///
    /// The server announces itself with a single line (for example
    /// `Asterisk Call Manager/5.0.2`) before any packet exchange.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| ManagerError::connect(host, port, source))?;
        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut banner = String::new();
        let n = reader.read_line(&mut banner).await?;
        if n == 0 {
            return Err(ManagerError::ConnectionClosed);
        }
        let peer = format!("{host}:{port}");
        debug!(peer = %peer, banner = banner.trim(), "connected to manager interface");

        Ok(Self {
            reader,
            writer: write_half,
            peer,
        })
    }

    /// Authenticate the session.
    ///
    /// An `Error` response maps to [`ManagerError::Authentication`] carrying
    /// the server-supplied reason.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        let response = self
            .send_action(ManagerAction::Login(credentials.clone()))
            .await?;
        match response.status {
            ResponseStatus::Success => {
                debug!(peer = %self.peer, username = %credentials.username, "logged in");
                Ok(())
            }
            ResponseStatus::Error => Err(ManagerError::authentication(response.reason())),
        }
    }

    /// Submit an originate request for one outbound call.
    ///
    /// The action is sent with `Async: true`, so a `Success` response means
    /// the server accepted the request, not that the call was answered. An
    /// `Error` response maps to [`ManagerError::ActionFailed`] carrying the
    /// server-supplied reason.
    pub async fn originate(&mut self, request: &CallRequest) -> Result<()> {
        let response = self
            .send_action(ManagerAction::Originate(request.clone()))
            .await?;
        match response.status {
            ResponseStatus::Success => {
                debug!(peer = %self.peer, channel = %request.channel(), "originate accepted");
                Ok(())
            }
            ResponseStatus::Error => Err(ManagerError::action_failed(
                "Originate",
                response.reason(),
            )),
        }
    }

    /// Send a `Logoff` action without waiting for a reply.
    ///
    /// The server answers logoff with a farewell packet rather than a normal
    /// response, and the connection is about to be dropped anyway.
    pub async fn logoff(&mut self) -> Result<()> {
        let wire = ManagerAction::Logoff.to_wire(&Uuid::new_v4().to_string());
        self.writer.write_all(wire.as_bytes()).await?;
        self.writer.flush().await?;
        debug!(peer = %self.peer, "logged off");
        Ok(())
    }

    /// Write one action and read packets until its correlated response.
    async fn send_action(&mut self, action: ManagerAction) -> Result<ManagerResponse> {
        let action_id = Uuid::new_v4().to_string();
        let wire = action.to_wire(&action_id);
        trace!(action = action.name(), action_id = %action_id, "sending action");
        self.writer.write_all(wire.as_bytes()).await?;
        self.writer.flush().await?;

        loop {
            match self.read_packet().await? {
                Packet::Event(event) => {
                    trace!(event = %event.name, "skipping uncorrelated event");
                }
                Packet::Response(response) => {
                    if response.action_id.as_deref() == Some(action_id.as_str()) {
                        return Ok(response);
                    }
                    trace!(
                        action_id = ?response.action_id,
                        "skipping response for a different action"
                    );
                }
            }
        }
    }

    /// Read lines off the socket until a blank line completes a packet.
    async fn read_packet(&mut self) -> Result<Packet> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let n = self.reader.read_line(&mut line).await?;
            if n == 0 {
                return Err(ManagerError::ConnectionClosed);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if lines.is_empty() {
                    // stray blank line between packets
                    continue;
                }
                return Packet::parse(&lines);
            }
            lines.push(line.to_string());
        }
    }
}
