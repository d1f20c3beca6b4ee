//! Test server management.
//!
//! Spawns and manages tinircd instances for integration testing.

use std::process::{Child, Command};
use std::time::Duration;

use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    password: String,
}

impl TestServer {
    /// Spawn a server on the given port with the given password.
    ///
    /// Every test uses its own port so test binaries can run concurrently.
    pub async fn spawn(port: u16, password: &str) -> anyhow::Result<Self> {
        let child = Command::new(env!("CARGO_BIN_EXE_tinircd"))
            .arg(port.to_string())
            .arg(password)
            .spawn()?;

        let server = Self {
            child,
            port,
            password: password.to_string(),
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// The server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Connect a test client to this server.
    pub async fn connect(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address(), nick).await
    }

    /// Connect and fully register a test client.
    #[allow(dead_code)]
    pub async fn connect_registered(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        let mut client = self.connect(nick).await?;
        client.register(&self.password).await?;
        Ok(client)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
