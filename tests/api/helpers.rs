use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Result;
use howdy_waitlist::{app, database::DbManager, App, AppState};
use tokio::net::TcpListener;

pub struct TestApp {
    pub addr: SocketAddr,
    pub dm: DbManager,
    pub http_client: reqwest::Client,
}

/// Trying to bind port 0 will trigger an OS scan for an available port
/// which will then be bound to the application.
const TEST_SOCK_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0);

impl TestApp {
    /// Spawns the app on a random port against a throwaway database and
    /// returns handles for driving it over HTTP and inspecting rows directly.
    pub async fn spawn() -> Result<Self> {
        let dm = DbManager::test_init().await?;
        let app_state = AppState::new(dm.clone());

        let listener = TcpListener::bind(&TEST_SOCK_ADDR).await?;
        let addr = listener.local_addr()?;

        tokio::spawn(app::serve(App::new(app_state, listener)));

        let http_client = reqwest::Client::new();

        Ok(TestApp {
            addr,
            dm,
            http_client,
        })
    }

    pub async fn post_waitlist(&self, body: &serde_json::Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(format!("http://{}/", self.addr))
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    /// Posts a raw body with a JSON content type, for the malformed-body cases.
    pub async fn post_waitlist_raw(&self, body: &'static str) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(format!("http://{}/", self.addr))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        Ok(res)
    }

    pub async fn waitlist_row_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM waitlist")
            .fetch_one(self.dm.db())
            .await?;
        Ok(count)
    }
}
