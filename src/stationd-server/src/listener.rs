// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Line-oriented token listener.
//!
//! Each line is one token name (`PWR_ON`, `V_TRANS_ON`, ...). Every line
//! gets exactly one JSON `ClientResponse` back, newline terminated.

use std::net::SocketAddr;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info};

use stationd_core::{Advisory, StationRequest, StationSnapshot, Token};

#[derive(Debug, Clone, Serialize)]
pub struct ClientResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StationSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
}

impl ClientResponse {
    fn ok(state: StationSnapshot) -> Self {
        Self {
            success: true,
            state: Some(state),
            error: None,
            advisory: None,
        }
    }

    fn rejected(state: StationSnapshot, advisory: Advisory) -> Self {
        Self {
            success: false,
            state: Some(state),
            error: Some(advisory.to_string()),
            advisory: Some(advisory),
        }
    }

    fn internal(message: &str) -> Self {
        Self {
            success: false,
            state: None,
            error: Some(message.to_string()),
            advisory: None,
        }
    }
}

/// Accept operator connections until the shutdown flag flips.
pub async fn run_listener(
    addr: SocketAddr,
    station_tx: mpsc::Sender<StationRequest>,
    snapshot_rx: watch::Receiver<StationSnapshot>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening for tokens on {}", addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = accepted?;
                info!("Client connected: {}", peer);

                let tx = station_tx.clone();
                let srx = snapshot_rx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(socket, peer, tx, srx).await {
                        error!("Client {} error: {:?}", peer, e);
                    }
                });
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!("Listener on {} stopping", addr);
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    tx: mpsc::Sender<StationRequest>,
    snapshot_rx: watch::Receiver<StationSnapshot>,
) -> std::io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            info!("Client {} disconnected", addr);
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let token = Token::decode(trimmed);
        debug!("Client {} sent {} ({})", addr, trimmed, token);

        // STATUS never reaches the station task.
        if token == Token::Status {
            let state = snapshot_rx.borrow().clone();
            write_response(&mut writer, &ClientResponse::ok(state)).await?;
            continue;
        }

        let (resp_tx, resp_rx) = oneshot::channel();
        let req = StationRequest {
            token,
            respond_to: resp_tx,
        };

        if let Err(e) = tx.send(req).await {
            error!("Failed to send request to station task: {:?}", e);
            let resp = ClientResponse::internal("Internal error: station task not available");
            write_response(&mut writer, &resp).await?;
            continue;
        }

        let resp = match resp_rx.await {
            Ok(Ok(snapshot)) => ClientResponse::ok(snapshot),
            Ok(Err(advisory)) => {
                let state = snapshot_rx.borrow().clone();
                ClientResponse::rejected(state, advisory)
            }
            Err(e) => {
                error!("Station response oneshot recv error: {:?}", e);
                ClientResponse::internal("Internal error waiting for station response")
            }
        };
        write_response(&mut writer, &resp).await?;
    }

    Ok(())
}

async fn write_response(writer: &mut OwnedWriteHalf, resp: &ClientResponse) -> std::io::Result<()> {
    let resp_line = serde_json::to_string(resp)? + "\n";
    writer.write_all(resp_line.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener as StdTcpListener;

    fn loopback_addr() -> SocketAddr {
        let sock = StdTcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = sock.local_addr().expect("local_addr");
        drop(sock);
        addr
    }

    async fn roundtrip(
        reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
        writer: &mut OwnedWriteHalf,
        line: &str,
    ) -> serde_json::Value {
        writer.write_all(line.as_bytes()).await.expect("write");
        writer.write_all(b"\n").await.expect("newline");
        writer.flush().await.expect("flush");
        let mut reply = String::new();
        reader.read_line(&mut reply).await.expect("read");
        serde_json::from_str(reply.trim_end()).expect("response json")
    }

    #[test]
    fn test_rejected_response_carries_advisory() {
        let resp = ClientResponse::rejected(
            StationSnapshot::initial(),
            Advisory::TokenInvalid {
                token: Token::SelectRx,
                state: "INIT:NONE".into(),
            },
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["advisory"]["kind"], "token_invalid");
        assert_eq!(json["state"]["primary"], "INIT");
    }

    #[tokio::test]
    #[ignore = "requires TCP bind permissions"]
    async fn serves_status_and_forwards_tokens() {
        let addr = loopback_addr();
        let (station_tx, mut station_rx) = mpsc::channel::<StationRequest>(8);
        let (_snapshot_tx, snapshot_rx) = watch::channel(StationSnapshot::initial());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let station = tokio::spawn(async move {
            if let Some(req) = station_rx.recv().await {
                assert_eq!(req.token, Token::SelectRx);
                let _ = req.respond_to.send(Err(Advisory::TokenInvalid {
                    token: req.token,
                    state: "INIT:NONE".into(),
                }));
            }
        });
        let handle = tokio::spawn(run_listener(addr, station_tx, snapshot_rx, shutdown_rx));
        tokio::task::yield_now().await;

        let stream = TcpStream::connect(addr).await.expect("connect");
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let status = roundtrip(&mut reader, &mut writer, "STATUS").await;
        assert_eq!(status["success"], true);
        assert_eq!(status["state"]["secondary"], "NONE");

        let rejected = roundtrip(&mut reader, &mut writer, "RX").await;
        assert_eq!(rejected["success"], false);
        assert_eq!(rejected["advisory"]["kind"], "token_invalid");

        let _ = station.await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();
    }
}
