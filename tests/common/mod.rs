//! Shared utilities for portal integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use route_gate::lifecycle::{build_server, Shutdown};
use route_gate::routing::RoleSet;
use route_gate::session::{Session, SessionId, SessionStore};
use route_gate::AppConfig;
use tokio::net::TcpListener;

/// A running portal on an ephemeral port.
pub struct Portal {
    pub addr: SocketAddr,
    pub sessions: SessionStore,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl Portal {
    pub async fn start() -> Self {
        let mut config = AppConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();

        let server = build_server(config).unwrap();
        let sessions = server.sessions().clone();
        let listener = TcpListener::bind(&server.config().listener.bind_address)
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, rx).await;
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        Self {
            addr,
            sessions,
            shutdown,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Sign a seeded user in and return the session id for the cookie.
    pub fn sign_in(&self, user_id: &str, name: &str, roles: &[&str]) -> SessionId {
        let roles: RoleSet = roles.iter().copied().collect();
        self.sessions.insert(Session::authenticated(user_id, name, roles))
    }

    pub async fn get(&self, path: &str, session: Option<SessionId>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(id) = session {
            request = request.header(
                reqwest::header::COOKIE,
                format!("{}={}", self.sessions.cookie_name(), id),
            );
        }
        request.send().await.unwrap()
    }
}
