//! Test protocol client.
//!
//! A thin buffered TCP client that sends commands and parses replies with
//! tinirc-proto.

use std::time::Duration;

use tinirc_proto::{Command, Message, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A test client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    nick: String,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str, nick: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            nick: nick.to_string(),
        })
    }

    /// Send a raw line, appending the terminator if missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send raw bytes exactly as given (for partial-write tests).
    #[allow(dead_code)]
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a command.
    pub async fn send(&mut self, cmd: Command) -> anyhow::Result<()> {
        let msg = Message::from(cmd);
        self.send_raw(&msg.to_string()).await
    }

    /// Receive a single message.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a message with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        line.trim_end()
            .parse::<Message>()
            .map_err(|e| anyhow::anyhow!("parse error on {:?}: {}", line, e))
    }

    /// Receive messages until the predicate matches, returning all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Message>>
    where
        F: FnMut(&Message) -> bool,
    {
        let mut messages = Vec::new();
        loop {
            let msg = self.recv().await?;
            let done = predicate(&msg);
            messages.push(msg);
            if done {
                break;
            }
        }
        Ok(messages)
    }

    /// Receive until a numeric reply with the given response arrives.
    pub async fn recv_until_response(&mut self, wanted: Response) -> anyhow::Result<Message> {
        let mut messages = self
            .recv_until(|msg| msg.response() == Some(wanted))
            .await?;
        Ok(messages.pop().expect("predicate matched"))
    }

    /// Assert that nothing arrives within the given window.
    #[allow(dead_code)]
    pub async fn assert_silent(&mut self, dur: Duration) {
        if let Ok(msg) = self.recv_timeout(dur).await {
            panic!("expected silence, received: {}", msg);
        }
    }

    /// Register with the server (PASS + NICK + USER), waiting for 001.
    pub async fn register(&mut self, password: &str) -> anyhow::Result<()> {
        self.send(Command::PASS(password.to_string())).await?;
        self.send(Command::NICK(self.nick.clone())).await?;
        self.send(Command::USER(
            self.nick.clone(),
            "0".to_string(),
            "*".to_string(),
            format!("Test User {}", self.nick),
        ))
        .await?;

        self.recv_until_response(Response::RPL_WELCOME).await?;
        Ok(())
    }

    /// Join a channel and wait for the end-of-names marker.
    #[allow(dead_code)]
    pub async fn join(&mut self, channel: &str) -> anyhow::Result<Vec<Message>> {
        self.send(Command::JOIN(channel.to_string(), None)).await?;
        self.recv_until(|msg| msg.response() == Some(Response::RPL_ENDOFNAMES))
            .await
    }

    /// Join a keyed channel and wait for the end-of-names marker.
    #[allow(dead_code)]
    pub async fn join_with_key(&mut self, channel: &str, key: &str) -> anyhow::Result<Vec<Message>> {
        self.send(Command::JOIN(channel.to_string(), Some(key.to_string())))
            .await?;
        self.recv_until(|msg| msg.response() == Some(Response::RPL_ENDOFNAMES))
            .await
    }

    /// Send a PRIVMSG.
    #[allow(dead_code)]
    pub async fn privmsg(&mut self, target: &str, text: &str) -> anyhow::Result<()> {
        self.send(Command::PRIVMSG(target.to_string(), text.to_string()))
            .await
    }

    /// Send QUIT.
    #[allow(dead_code)]
    pub async fn quit(&mut self, reason: Option<String>) -> anyhow::Result<()> {
        self.send(Command::QUIT(reason)).await
    }
}
