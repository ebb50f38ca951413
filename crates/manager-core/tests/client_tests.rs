//! Integration tests for the manager client
//!
//! Each test runs an in-process mock manager server on an ephemeral port and
//! drives the real client against it.

use amicall_manager_core::{
    CallRequest, Credentials, Destination, ManagerClient, ManagerError,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const BANNER: &str = "Asterisk Call Manager/5.0.2\r\n";

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("amicall_manager_core=trace")
        .try_init();
}

/// One action block as the server received it
#[derive(Debug)]
struct ReceivedAction {
    fields: Vec<(String, String)>,
}

impl ReceivedAction {
    fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    fn name(&self) -> &str {
        self.get("Action").unwrap_or("")
    }

    fn action_id(&self) -> &str {
        self.get("ActionID").unwrap_or("")
    }
}

struct MockConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl MockConnection {
    async fn accept(listener: TcpListener) -> Self {
        let (stream, _) = listener.accept().await.expect("accept failed");
        Self::new(stream).await
    }

    async fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        let mut conn = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        conn.send_raw(BANNER).await;
        conn
    }

    /// Read one action block; `None` once the client hangs up.
    async fn read_action(&mut self) -> Option<ReceivedAction> {
        let mut fields = Vec::new();
        loop {
            let mut line = String::new();
            let n = self.reader.read_line(&mut line).await.expect("read failed");
            if n == 0 {
                assert!(fields.is_empty(), "connection dropped mid-action");
                return None;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                return Some(ReceivedAction { fields });
            }
            if let Some((key, value)) = line.split_once(':') {
                fields.push((key.trim().to_string(), value.trim().to_string()));
            }
        }
    }

    async fn send_raw(&mut self, raw: &str) {
        self.writer
            .write_all(raw.as_bytes())
            .await
            .expect("write failed");
    }

    async fn send_response(&mut self, action_id: &str, status: &str, message: Option<&str>) {
        let mut packet = format!("Response: {status}\r\nActionID: {action_id}\r\n");
        if let Some(message) = message {
            packet.push_str(&format!("Message: {message}\r\n"));
        }
        packet.push_str("\r\n");
        self.send_raw(&packet).await;
    }

    async fn send_event(&mut self, name: &str) {
        self.send_raw(&format!("Event: {name}\r\nPrivilege: system,all\r\n\r\n"))
            .await;
    }
}

/// Bind an ephemeral listener and run `server` against the first connection.
async fn spawn_server<F, Fut>(server: F) -> (String, u16, JoinHandle<()>)
where
    F: FnOnce(MockConnection) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let port = listener.local_addr().expect("no local addr").port();
    let handle = tokio::spawn(async move {
        let conn = MockConnection::accept(listener).await;
        server(conn).await;
    });
    ("127.0.0.1".to_string(), port, handle)
}

fn echo_request() -> CallRequest {
    CallRequest::new(
        "SIP/100",
        Destination::Application {
            application: "Echo".to_string(),
            data: String::new(),
        },
    )
    .expect("valid request")
}

#[tokio::test]
async fn login_then_originate_application_mode() {
    init_logging();
    let (host, port, handle) = spawn_server(|mut conn| async move {
        let login = conn.read_action().await.expect("expected Login");
        assert_eq!(login.name(), "Login");
        assert_eq!(login.get("Username"), Some("admin"));
        assert_eq!(login.get("Secret"), Some("s3cret"));
        let id = login.action_id().to_string();
        conn.send_response(&id, "Success", Some("Authentication accepted"))
            .await;

        let originate = conn.read_action().await.expect("expected Originate");
        assert_eq!(originate.name(), "Originate");
        assert_eq!(originate.get("Channel"), Some("SIP/100"));
        assert_eq!(originate.get("Application"), Some("Echo"));
        assert_eq!(originate.get("Data"), Some(""));
        assert_eq!(originate.get("Async"), Some("true"));
        assert_eq!(originate.get("Context"), None);
        let id = originate.action_id().to_string();
        conn.send_response(&id, "Success", None).await;
    })
    .await;

    let mut client = ManagerClient::connect(&host, port).await.expect("connect");
    client
        .login(&Credentials::new("admin", "s3cret"))
        .await
        .expect("login should succeed");
    client
        .originate(&echo_request())
        .await
        .expect("originate should succeed");

    drop(client);
    handle.await.expect("server panicked");
}

#[tokio::test]
async fn originate_extension_mode_fields() {
    let (host, port, handle) = spawn_server(|mut conn| async move {
        let login = conn.read_action().await.expect("expected Login");
        conn.send_response(login.action_id(), "Success", None).await;

        let originate = conn.read_action().await.expect("expected Originate");
        assert_eq!(originate.get("Context"), Some("default"));
        assert_eq!(originate.get("Exten"), Some("100"));
        assert_eq!(originate.get("Priority"), Some("1"));
        assert_eq!(originate.get("Application"), None);
        conn.send_response(originate.action_id(), "Success", None)
            .await;
    })
    .await;

    let request = CallRequest::new(
        "SIP/100",
        Destination::Extension {
            context: "default".to_string(),
            exten: "100".to_string(),
            priority: "1".to_string(),
        },
    )
    .expect("valid request");

    let mut client = ManagerClient::connect(&host, port).await.expect("connect");
    client
        .login(&Credentials::new("admin", "s3cret"))
        .await
        .expect("login should succeed");
    client.originate(&request).await.expect("originate");

    drop(client);
    handle.await.expect("server panicked");
}

#[tokio::test]
async fn rejected_login_never_sends_originate() {
    init_logging();
    let (host, port, handle) = spawn_server(|mut conn| async move {
        let login = conn.read_action().await.expect("expected Login");
        conn.send_response(login.action_id(), "Error", Some("Authentication failed"))
            .await;
        // The client must hang up without sending anything further.
        assert!(conn.read_action().await.is_none());
    })
    .await;

    let mut client = ManagerClient::connect(&host, port).await.expect("connect");
    let err = client
        .login(&Credentials::new("admin", "wrong"))
        .await
        .expect_err("login should fail");
    match err {
        ManagerError::Authentication { reason } => {
            assert_eq!(reason, "Authentication failed");
        }
        other => panic!("expected authentication error, got {other:?}"),
    }

    drop(client);
    handle.await.expect("server panicked");
}

#[tokio::test]
async fn rejected_originate_reports_server_reason() {
    let (host, port, handle) = spawn_server(|mut conn| async move {
        let login = conn.read_action().await.expect("expected Login");
        conn.send_response(login.action_id(), "Success", None).await;

        let originate = conn.read_action().await.expect("expected Originate");
        conn.send_response(
            originate.action_id(),
            "Error",
            Some("Extension does not exist."),
        )
        .await;
    })
    .await;

    let mut client = ManagerClient::connect(&host, port).await.expect("connect");
    client
        .login(&Credentials::new("admin", "s3cret"))
        .await
        .expect("login should succeed");
    let err = client
        .originate(&echo_request())
        .await
        .expect_err("originate should fail");
    match err {
        ManagerError::ActionFailed { action, reason } => {
            assert_eq!(action, "Originate");
            assert_eq!(reason, "Extension does not exist.");
        }
        other => panic!("expected action failure, got {other:?}"),
    }

    drop(client);
    handle.await.expect("server panicked");
}

#[tokio::test]
async fn events_before_the_response_are_skipped() {
    let (host, port, handle) = spawn_server(|mut conn| async move {
        let login = conn.read_action().await.expect("expected Login");
        conn.send_event("FullyBooted").await;
        conn.send_event("PeerStatus").await;
        conn.send_response(login.action_id(), "Success", None).await;
    })
    .await;

    let mut client = ManagerClient::connect(&host, port).await.expect("connect");
    client
        .login(&Credentials::new("admin", "s3cret"))
        .await
        .expect("login should succeed despite interleaved events");

    drop(client);
    handle.await.expect("server panicked");
}

#[tokio::test]
async fn logoff_sends_a_logoff_action() {
    let (host, port, handle) = spawn_server(|mut conn| async move {
        let login = conn.read_action().await.expect("expected Login");
        conn.send_response(login.action_id(), "Success", None).await;

        let logoff = conn.read_action().await.expect("expected Logoff");
        assert_eq!(logoff.name(), "Logoff");
    })
    .await;

    let mut client = ManagerClient::connect(&host, port).await.expect("connect");
    client
        .login(&Credentials::new("admin", "s3cret"))
        .await
        .expect("login should succeed");
    client.logoff().await.expect("logoff should send");

    drop(client);
    handle.await.expect("server panicked");
}

#[tokio::test]
async fn client_debug_output_names_the_peer() {
    let (host, port, handle) = spawn_server(|mut conn| async move {
        // Client connects and hangs up without sending anything.
        assert!(conn.read_action().await.is_none());
    })
    .await;

    let client = ManagerClient::connect(&host, port).await.expect("connect");
    let rendered = format!("{client:?}");
    assert!(rendered.contains("ManagerClient"));
    assert!(rendered.contains(&format!("{host}:{port}")));

    drop(client);
    handle.await.expect("server panicked");
}

#[tokio::test]
async fn connection_refused_maps_to_connect_error() {
    // Bind then immediately drop to get a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let port = listener.local_addr().expect("no local addr").port();
    drop(listener);

    let err = ManagerClient::connect("127.0.0.1", port)
        .await
        .expect_err("connect should fail");
    assert!(matches!(err, ManagerError::Connect { .. }));
}
