//! Integration tests for the server, handler, and full connection flow.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tictac::prelude::*;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server(config: RegistryConfig) -> String {
    let server = TictacServerBuilder::new()
        .bind("127.0.0.1:0")
        .registry_config(config)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, command: &ClientCommand) {
    let json = serde_json::to_string(command).expect("encode");
    ws.send(Message::text(json)).await.expect("send");
}

/// Reads notifications until one matches `pred`, skipping the rest.
async fn recv_until(ws: &mut ClientWs, pred: impl Fn(&ServerMessage) -> bool) -> ServerMessage {
    let fut = async {
        loop {
            let frame = ws.next().await.expect("stream open").expect("frame");
            let Message::Text(text) = frame else {
                continue;
            };
            let msg: ServerMessage = serde_json::from_str(&text).expect("decode notification");
            if pred(&msg) {
                return msg;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(2), fut)
        .await
        .expect("timed out waiting for notification")
}

async fn recv_error(ws: &mut ClientWs) -> String {
    match recv_until(ws, |m| matches!(m, ServerMessage::Error { .. })).await {
        ServerMessage::Error { message } => message,
        _ => unreachable!(),
    }
}

async fn recv_table_state(ws: &mut ClientWs) -> TableSnapshot {
    match recv_until(ws, |m| matches!(m, ServerMessage::TableState { .. })).await {
        ServerMessage::TableState { table } => table,
        _ => unreachable!(),
    }
}

async fn play(ws: &mut ClientWs, table_id: TableId, position: i64) {
    send(ws, &ClientCommand::MakeMove { table_id, position }).await;
}

/// Two connected players at table 1, with game_start received by both.
async fn seated_pair(addr: &str) -> (ClientWs, ClientWs) {
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    send(&mut a, &ClientCommand::CreateTable).await;
    recv_until(&mut a, |m| matches!(m, ServerMessage::TableJoined { .. })).await;
    send(&mut b, &ClientCommand::JoinTable { table_id: TableId(1) }).await;
    recv_until(&mut a, |m| matches!(m, ServerMessage::GameStart { .. })).await;
    recv_until(&mut b, |m| matches!(m, ServerMessage::GameStart { .. })).await;
    (a, b)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_get_tables_on_fresh_server() {
    let addr = start_server(RegistryConfig::default()).await;
    let mut ws = connect(&addr).await;

    send(&mut ws, &ClientCommand::GetTables).await;

    let msg = recv_until(&mut ws, |_| true).await;
    assert_eq!(msg, ServerMessage::Tables { tables: vec![] });
}

#[tokio::test]
async fn test_notifications_are_text_json() {
    let addr = start_server(RegistryConfig::default()).await;
    let mut ws = connect(&addr).await;

    ws.send(Message::text(r#"{"command": "GET_TABLES"}"#.to_owned()))
        .await
        .expect("send");

    let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("reply")
        .expect("open")
        .expect("frame");
    let text = match frame {
        Message::Text(text) => text,
        other => panic!("expected a text frame, got {other:?}"),
    };
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value["type"], "tables");
    assert_eq!(value["tables"], serde_json::json!([]));
}

#[tokio::test]
async fn test_full_game_over_websocket() {
    let addr = start_server(RegistryConfig::default()).await;
    let (mut a, mut b) = seated_pair(&addr).await;
    let t = TableId(1);

    play(&mut a, t, 0).await;
    let state = recv_table_state(&mut b).await;
    assert_eq!(recv_table_state(&mut a).await, state);
    let mut expected = [Cell::Empty; 9];
    expected[0] = Cell::X;
    assert_eq!(state.board, expected);
    assert_eq!(state.turn, Mark::O);

    play(&mut b, t, 4).await;
    let state = recv_table_state(&mut a).await;
    assert_eq!(recv_table_state(&mut b).await, state);
    expected[4] = Cell::O;
    assert_eq!(state.board, expected);
    assert_eq!(state.turn, Mark::X);

    // X completes the left column. Each move is acknowledged before the
    // next one goes out so the two connections don't race.
    play(&mut a, t, 3).await;
    recv_table_state(&mut b).await;
    recv_table_state(&mut a).await;
    play(&mut b, t, 8).await;
    recv_table_state(&mut a).await;
    recv_table_state(&mut b).await;
    play(&mut a, t, 6).await;

    for ws in [&mut a, &mut b] {
        match recv_until(ws, |m| matches!(m, ServerMessage::GameEnd { .. })).await {
            ServerMessage::GameEnd { table } => {
                assert_eq!(table.winner, Some(Outcome::X));
                assert!(!table.available);
            }
            _ => unreachable!(),
        }
    }

    // The finished table is gone from the lobby.
    send(&mut a, &ClientCommand::GetTables).await;
    let lobby = recv_until(&mut a, |m| matches!(m, ServerMessage::Tables { .. })).await;
    assert_eq!(lobby, ServerMessage::Tables { tables: vec![] });
}

#[tokio::test]
async fn test_move_from_spectator_rejected() {
    let addr = start_server(RegistryConfig::default()).await;
    let (_a, _b) = seated_pair(&addr).await;
    let mut c = connect(&addr).await;

    play(&mut c, TableId(1), 0).await;

    let message = recv_error(&mut c).await;
    assert!(message.contains("not seated at table T-1"), "{message}");
}

#[tokio::test]
async fn test_malformed_message_keeps_connection_open() {
    let addr = start_server(RegistryConfig::default()).await;
    let mut ws = connect(&addr).await;

    ws.send(Message::text("not json".to_owned())).await.expect("send");
    let message = recv_error(&mut ws).await;
    assert!(message.starts_with("malformed message"), "{message}");

    ws.send(Message::text(r#"{"command": "DANCE"}"#.to_owned()))
        .await
        .expect("send");
    let message = recv_error(&mut ws).await;
    assert!(message.starts_with("malformed message"), "{message}");

    // Still usable.
    send(&mut ws, &ClientCommand::GetTables).await;
    let msg = recv_until(&mut ws, |m| matches!(m, ServerMessage::Tables { .. })).await;
    assert_eq!(msg, ServerMessage::Tables { tables: vec![] });
}

#[tokio::test]
async fn test_binary_frames_are_accepted() {
    let addr = start_server(RegistryConfig::default()).await;
    let mut ws = connect(&addr).await;

    let bytes = serde_json::to_vec(&ClientCommand::GetTables).expect("encode");
    ws.send(Message::binary(bytes)).await.expect("send");

    let msg = recv_until(&mut ws, |_| true).await;
    assert_eq!(msg, ServerMessage::Tables { tables: vec![] });
}

#[tokio::test]
async fn test_disconnect_cascade() {
    let addr = start_server(RegistryConfig::default()).await;
    let (mut a, mut b) = seated_pair(&addr).await;

    a.close(None).await.expect("close");
    drop(a);

    let state = recv_table_state(&mut b).await;
    assert_eq!(state.players, 1);
    assert!(state.available);

    let lobby = recv_until(&mut b, |m| matches!(m, ServerMessage::Tables { .. })).await;
    match lobby {
        ServerMessage::Tables { tables } => {
            assert_eq!(tables.len(), 1);
            assert_eq!(tables[0].status, TableStatus::Waiting);
        }
        _ => unreachable!(),
    }

    // Last player out removes the table.
    b.close(None).await.expect("close");
    drop(b);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut c = connect(&addr).await;
    send(&mut c, &ClientCommand::JoinTable { table_id: TableId(1) }).await;
    assert_eq!(recv_error(&mut c).await, "table T-1 not found");
}

#[tokio::test]
async fn test_capacity_over_websocket() {
    let addr = start_server(RegistryConfig {
        max_waiting_tables: 1,
    })
    .await;
    let mut a = connect(&addr).await;
    let mut b = connect(&addr).await;

    send(&mut a, &ClientCommand::CreateTable).await;
    recv_until(&mut a, |m| matches!(m, ServerMessage::TableJoined { .. })).await;

    send(&mut b, &ClientCommand::CreateTable).await;
    let message = recv_error(&mut b).await;
    assert!(message.starts_with("cannot create a table now"), "{message}");

    send(&mut b, &ClientCommand::JoinTable { table_id: TableId(1) }).await;
    recv_until(&mut b, |m| matches!(m, ServerMessage::GameStart { .. })).await;

    let mut c = connect(&addr).await;
    send(&mut c, &ClientCommand::CreateTable).await;
    match recv_until(&mut c, |m| {
        matches!(m, ServerMessage::TableJoined { .. } | ServerMessage::Error { .. })
    })
    .await
    {
        ServerMessage::TableJoined { table } => assert_eq!(table.id, TableId(2)),
        other => panic!("expected table_joined, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lobby_broadcast_reaches_idle_connections() {
    let addr = start_server(RegistryConfig::default()).await;
    let mut idle = connect(&addr).await;
    let mut a = connect(&addr).await;
    // Make sure both sessions exist before the broadcast.
    tokio::time::sleep(Duration::from_millis(20)).await;

    send(&mut a, &ClientCommand::CreateTable).await;

    match recv_until(&mut idle, |m| matches!(m, ServerMessage::Tables { .. })).await {
        ServerMessage::Tables { tables } => {
            assert_eq!(tables.len(), 1);
            assert_eq!(tables[0].id, TableId(1));
            assert!(tables[0].available);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_silent_peer_does_not_block_other_clients() {
    let addr = start_server(RegistryConfig::default()).await;

    // Opens TCP and never sends the upgrade request.
    let _silent = tokio::net::TcpStream::connect(addr.as_str()).await.expect("tcp connect");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (mut ws, _) = tokio::time::timeout(
        Duration::from_secs(2),
        tokio_tungstenite::connect_async(format!("ws://{addr}")),
    )
    .await
    .expect("a real client must get through while another peer stalls")
    .expect("should connect");

    send(&mut ws, &ClientCommand::GetTables).await;
    let msg = recv_until(&mut ws, |m| matches!(m, ServerMessage::Tables { .. })).await;
    assert_eq!(msg, ServerMessage::Tables { tables: vec![] });
}

#[tokio::test]
async fn test_builder_entry_point_needs_no_type_annotation() {
    let server = TictacServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    assert_eq!(server.local_addr().expect("local addr").ip().to_string(), "127.0.0.1");
}
