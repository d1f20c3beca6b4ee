//! Integration tests for channel flows: JOIN, NAMES, PRIVMSG, PART.

mod common;

use std::time::Duration;

use common::TestServer;
use tinirc_proto::{Command, Response};

fn namreply_names(params: &[String]) -> &str {
    // 353 params: nick, "=", channel, names
    params.last().map(String::as_str).unwrap_or("")
}

#[tokio::test]
async fn test_join_names_and_privmsg_fanout() {
    let server = TestServer::spawn(17621, "secret").await.expect("spawn");
    let mut alice = server.connect_registered("alice").await.expect("alice");
    let mut bob = server.connect_registered("bob").await.expect("bob");

    // Creator joins: JOIN echo, no topic, names list with op prefix
    let burst = alice.join("#room").await.expect("alice join");
    assert!(burst
        .iter()
        .any(|m| matches!(&m.command, Command::JOIN(c, _) if c == "#room")));
    assert!(burst
        .iter()
        .any(|m| m.response() == Some(Response::RPL_NOTOPIC)));
    let names = burst
        .iter()
        .find(|m| m.response() == Some(Response::RPL_NAMREPLY))
        .expect("353");
    match &names.command {
        Command::Response(_, params) => assert_eq!(namreply_names(params), "@alice"),
        other => panic!("unexpected: {:?}", other),
    }

    // Second member: names list shows the operator prefixed distinctly
    let burst = bob.join("#room").await.expect("bob join");
    let names = burst
        .iter()
        .find(|m| m.response() == Some(Response::RPL_NAMREPLY))
        .expect("353");
    match &names.command {
        Command::Response(_, params) => assert_eq!(namreply_names(params), "@alice bob"),
        other => panic!("unexpected: {:?}", other),
    }

    // Alice sees bob's JOIN broadcast
    alice
        .recv_until(|m| {
            matches!(&m.command, Command::JOIN(c, _) if c == "#room")
                && m.source_nickname() == Some("bob")
        })
        .await
        .expect("bob join broadcast");

    // Channel message reaches bob, attributed to alice, but not alice
    alice.privmsg("#room", "hi").await.expect("privmsg");
    let received = bob
        .recv_until(|m| matches!(&m.command, Command::PRIVMSG(c, t) if c == "#room" && t == "hi"))
        .await
        .expect("bob receives privmsg");
    assert_eq!(
        received.last().and_then(|m| m.source_nickname()),
        Some("alice")
    );
    alice.assert_silent(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_privmsg_direct_to_nick() {
    let server = TestServer::spawn(17622, "secret").await.expect("spawn");
    let mut alice = server.connect_registered("alice").await.expect("alice");
    let mut bob = server.connect_registered("bob").await.expect("bob");

    alice.privmsg("bob", "psst").await.expect("privmsg");
    let received = bob
        .recv_until(|m| matches!(&m.command, Command::PRIVMSG(t, x) if t == "bob" && x == "psst"))
        .await
        .expect("unicast");
    assert_eq!(
        received.last().and_then(|m| m.source_nickname()),
        Some("alice")
    );
}

#[tokio::test]
async fn test_privmsg_unknown_targets() {
    let server = TestServer::spawn(17623, "secret").await.expect("spawn");
    let mut alice = server.connect_registered("alice").await.expect("alice");

    alice.privmsg("ghost", "hello?").await.expect("send");
    let reply = alice.recv().await.expect("401");
    assert_eq!(reply.response(), Some(Response::ERR_NOSUCHNICK));

    alice.privmsg("#nowhere", "hello?").await.expect("send");
    let reply = alice.recv().await.expect("403");
    assert_eq!(reply.response(), Some(Response::ERR_NOSUCHCHANNEL));

    alice.send_raw("PRIVMSG ghost :").await.expect("send");
    let reply = alice.recv().await.expect("412");
    assert_eq!(reply.response(), Some(Response::ERR_NOTEXTTOSEND));
}

#[tokio::test]
async fn test_part_broadcast_and_operator_handoff() {
    let server = TestServer::spawn(17624, "secret").await.expect("spawn");
    let mut alice = server.connect_registered("alice").await.expect("alice");
    let mut bob = server.connect_registered("bob").await.expect("bob");

    alice.join("#room").await.expect("alice join");
    bob.join("#room").await.expect("bob join");
    alice
        .recv_until(|m| m.source_nickname() == Some("bob"))
        .await
        .expect("join broadcast");

    // The sole operator leaves; bob sees the PART, then the hand-off MODE
    alice.send(Command::PART("#room".to_string())).await.expect("part");
    bob.recv_until(|m| {
        matches!(&m.command, Command::PART(c) if c == "#room")
            && m.source_nickname() == Some("alice")
    })
    .await
    .expect("part broadcast");
    let handoff = bob
        .recv_until(|m| matches!(&m.command, Command::MODE(..)))
        .await
        .expect("hand-off notice");
    assert_eq!(
        handoff.last().map(|m| &m.command),
        Some(&Command::MODE(
            "#room".to_string(),
            "+o".to_string(),
            Some("bob".to_string())
        ))
    );

    // The promoted member now passes the operator gate
    bob.send(Command::MODE("#room".to_string(), "+t".to_string(), None))
        .await
        .expect("mode");
    bob.recv_until(|m| {
        matches!(&m.command, Command::MODE(c, modes, _) if c == "#room" && modes == "+t")
    })
    .await
    .expect("mode broadcast");
}

#[tokio::test]
async fn test_part_rejections() {
    let server = TestServer::spawn(17625, "secret").await.expect("spawn");
    let mut alice = server.connect_registered("alice").await.expect("alice");

    alice.send(Command::PART("#nowhere".to_string())).await.expect("send");
    let reply = alice.recv().await.expect("403");
    assert_eq!(reply.response(), Some(Response::ERR_NOSUCHCHANNEL));

    let mut bob = server.connect_registered("bob").await.expect("bob");
    bob.join("#room").await.expect("join");
    alice.send(Command::PART("#room".to_string())).await.expect("send");
    let reply = alice.recv().await.expect("442");
    assert_eq!(reply.response(), Some(Response::ERR_NOTONCHANNEL));
}

#[tokio::test]
async fn test_list_shows_all_channels_unfiltered() {
    let server = TestServer::spawn(17626, "secret").await.expect("spawn");
    let mut alice = server.connect_registered("alice").await.expect("alice");
    let mut carol = server.connect_registered("carol").await.expect("carol");

    alice.join("#one").await.expect("join");
    alice.join("#two").await.expect("join");

    // Carol is a member of neither channel but sees both
    carol.send(Command::LIST).await.expect("list");
    let replies = carol
        .recv_until(|m| m.response() == Some(Response::RPL_LISTEND))
        .await
        .expect("list output");
    let listed: Vec<&String> = replies
        .iter()
        .filter(|m| m.response() == Some(Response::RPL_LIST))
        .filter_map(|m| match &m.command {
            Command::Response(_, params) => params.get(1),
            _ => None,
        })
        .collect();
    assert_eq!(listed, ["#one", "#two"]);
}

#[tokio::test]
async fn test_empty_channel_is_recreated_fresh() {
    let server = TestServer::spawn(17627, "secret").await.expect("spawn");
    let mut alice = server.connect_registered("alice").await.expect("alice");
    let mut bob = server.connect_registered("bob").await.expect("bob");

    // Alice creates, locks the channel down, and leaves it empty
    alice.join("#room").await.expect("join");
    alice
        .send(Command::MODE("#room".to_string(), "+i".to_string(), None))
        .await
        .expect("mode");
    alice
        .recv_until(|m| matches!(&m.command, Command::MODE(..)))
        .await
        .expect("mode echo");
    alice.send(Command::PART("#room".to_string())).await.expect("part");

    // The emptied channel was deleted: a new JOIN creates a fresh channel
    // (no +i gate) with bob as its fresh operator
    let burst = bob.join("#room").await.expect("rejoin");
    let names = burst
        .iter()
        .find(|m| m.response() == Some(Response::RPL_NAMREPLY))
        .expect("353");
    match &names.command {
        Command::Response(_, params) => assert_eq!(namreply_names(params), "@bob"),
        other => panic!("unexpected: {:?}", other),
    }
}
