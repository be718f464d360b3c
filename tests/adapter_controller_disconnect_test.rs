use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};

use tui_blockfall::adapter::protocol::{create_ack, create_command, create_hello, AssignedRole, WelcomeMessage};
use tui_blockfall::adapter::{
    run_server, AdapterStatus, InboundCommand, InboundPayload, OutboundMessage, ServerConfig,
};

type LineReader = Lines<BufReader<OwnedReadHalf>>;

async fn read_line(lines: &mut LineReader) -> String {
    tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timeout waiting for line")
        .expect("io error")
        .expect("expected line")
}

async fn send_line(writer: &mut OwnedWriteHalf, line: &str) {
    writer.write_all(line.as_bytes()).await.unwrap();
    writer.write_all(b"\n").await.unwrap();
    writer.flush().await.unwrap();
}

async fn join(addr: std::net::SocketAddr, name: &str) -> (LineReader, OwnedWriteHalf, WelcomeMessage) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let hello = create_hello(1, name, false);
    send_line(&mut write_half, &serde_json::to_string(&hello).unwrap()).await;
    let welcome: WelcomeMessage = serde_json::from_str(&read_line(&mut lines).await).unwrap();
    (lines, write_half, welcome)
}

async fn wait_for_status(
    status_rx: &mut watch::Receiver<AdapterStatus>,
    pred: impl FnMut(&AdapterStatus) -> bool,
) -> AdapterStatus {
    *tokio::time::timeout(Duration::from_secs(2), status_rx.wait_for(pred))
        .await
        .expect("timeout waiting for status")
        .expect("status channel closed")
}

#[tokio::test]
async fn controller_disconnect_promotes_lowest_remaining_client() {
    let config = ServerConfig {
        port: 0,
        max_pending_commands: 64,
        ..ServerConfig::default()
    };

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(64);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (status_tx, mut status_rx) = watch::channel(AdapterStatus::default());
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, status_tx, Some(ready_tx)).await;
    });

    // Minimal game loop: ack every action batch.
    let engine_handle = tokio::spawn(async move {
        while let Some(inbound) = cmd_rx.recv().await {
            if matches!(inbound.payload, InboundPayload::Actions(_)) {
                let _ = out_tx.send(OutboundMessage::ToClientAck {
                    client_id: inbound.client_id,
                    ack: create_ack(inbound.seq),
                });
            }
        }
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();

    let (lines1, writer1, w1) = join(addr, "ctrl").await;
    assert_eq!(w1.role, AssignedRole::Controller);

    let (mut lines2, mut writer2, w2) = join(addr, "second").await;
    let (_lines3, _writer3, w3) = join(addr, "third").await;
    assert_eq!(w2.role, AssignedRole::Observer);
    assert_eq!(w3.role, AssignedRole::Observer);
    assert!(w2.client_id < w3.client_id);

    let status = wait_for_status(&mut status_rx, |s| s.client_count == 3).await;
    assert_eq!(status.controller_id, Some(w1.client_id as usize));

    // Controller leaves.
    drop(lines1);
    drop(writer1);

    let status = wait_for_status(&mut status_rx, |s| s.client_count == 2).await;
    assert_eq!(status.controller_id, Some(w2.client_id as usize));

    // The promoted client may now command.
    let cmd = create_command(2, &["start"]);
    send_line(&mut writer2, &serde_json::to_string(&cmd).unwrap()).await;
    let ack: serde_json::Value = serde_json::from_str(&read_line(&mut lines2).await).unwrap();
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);

    // Newcomers see the new controller.
    let (_lines4, _writer4, w4) = join(addr, "late").await;
    assert_eq!(w4.role, AssignedRole::Observer);
    assert_eq!(w4.controller_id, Some(w2.client_id));

    server_handle.abort();
    engine_handle.abort();
}

#[tokio::test]
async fn last_client_leaving_releases_controller() {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };

    let (cmd_tx, _cmd_rx) = mpsc::channel::<InboundCommand>(16);
    let (_out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (status_tx, mut status_rx) = watch::channel(AdapterStatus::default());
    let (ready_tx, ready_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, status_tx, Some(ready_tx)).await;
    });
    let addr = ready_rx.await.unwrap();

    let (lines, writer, welcome) = join(addr, "solo").await;
    assert_eq!(welcome.role, AssignedRole::Controller);
    drop(lines);
    drop(writer);

    let status = wait_for_status(&mut status_rx, |s| s.client_count == 0).await;
    assert_eq!(status.controller_id, None);

    // The next client to say hello takes control.
    let (_lines, _writer, next) = join(addr, "next").await;
    assert_eq!(next.role, AssignedRole::Controller);

    server_handle.abort();
}
