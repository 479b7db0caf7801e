//! # TCP Port Transport
//!
//! Connects component ports across processes. Frames are length-delimited
//! (`tokio-util`'s [`LengthDelimitedCodec`], 4-byte big-endian prefix) and each
//! frame carries one packet.
//!
//! - Input ports **bind** and accept any number of upstream connections; every
//!   frame from every connection lands in the same channel.
//! - Output ports **connect** to their downstream and keep reconnecting with a
//!   fixed delay. Packets produced while disconnected queue in the channel
//!   until it fills up.

use super::PortError;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};
use tokio_util::sync::CancellationToken;

/// Pause between two connection attempts of an output port.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Normalizes `tcp://host:port`, `tcp://*:port` and `host:port` endpoints.
pub fn parse_endpoint(endpoint: &str) -> Result<String, PortError> {
    let address = endpoint.strip_prefix("tcp://").unwrap_or(endpoint);
    let Some((host, port)) = address.rsplit_once(':') else {
        return Err(PortError::InvalidEndpoint(endpoint.to_string()));
    };
    if host.is_empty() || host.contains("://") || port.parse::<u16>().is_err() {
        return Err(PortError::InvalidEndpoint(endpoint.to_string()));
    }
    let host = if host == "*" { "0.0.0.0" } else { host };
    Ok(format!("{}:{}", host, port))
}

/// Binds an input port and returns its packet channel and bound address.
pub async fn bind_input(
    endpoint: &str,
    capacity: usize,
    shutdown: CancellationToken,
) -> Result<(mpsc::Receiver<Bytes>, SocketAddr), PortError> {
    let address = parse_endpoint(endpoint)?;
    let bind_error = |source| PortError::Bind {
        endpoint: endpoint.to_string(),
        source,
    };
    let listener = TcpListener::bind(&address).await.map_err(bind_error)?;
    let local = listener.local_addr().map_err(bind_error)?;
    log::debug!("Input port listening on {}", local);

    let (tx, rx) = mpsc::channel(capacity);
    tokio::spawn(accept_loop(listener, tx, shutdown));
    Ok((rx, local))
}

async fn accept_loop(listener: TcpListener, tx: mpsc::Sender<Bytes>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    log::debug!("Upstream connected from {}", peer);
                    tokio::spawn(read_frames(stream, peer, tx.clone(), shutdown.clone()));
                }
                Err(e) => log::error!("Failed to accept connection: {}", e),
            },
        }
    }
}

async fn read_frames(stream: TcpStream, peer: SocketAddr, tx: mpsc::Sender<Bytes>, shutdown: CancellationToken) {
    let mut frames = FramedRead::new(stream, LengthDelimitedCodec::new());
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            next = frames.next() => match next {
                Some(Ok(frame)) => {
                    if tx.send(frame.freeze()).await.is_err() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    log::warn!("Dropping upstream {}: {}", peer, e);
                    break;
                }
                None => {
                    log::debug!("Upstream {} disconnected", peer);
                    break;
                }
            },
        }
    }
}

/// Creates an output port connected to `endpoint`.
///
/// Connection happens in the background, so a downstream that starts later
/// is picked up without restarting this component.
pub fn connect_output(
    endpoint: &str,
    capacity: usize,
    shutdown: CancellationToken,
) -> Result<mpsc::Sender<Bytes>, PortError> {
    let address = parse_endpoint(endpoint)?;
    let (tx, rx) = mpsc::channel(capacity);
    tokio::spawn(write_frames(address, rx, shutdown));
    Ok(tx)
}

async fn write_frames(address: String, mut rx: mpsc::Receiver<Bytes>, shutdown: CancellationToken) {
    let mut pending: Option<Bytes> = None;

    loop {
        let connected = tokio::select! {
            _ = shutdown.cancelled() => return,
            connected = TcpStream::connect(&address) => connected,
        };
        let stream = match connected {
            Ok(stream) => stream,
            Err(e) => {
                log::debug!("Downstream {} unavailable ({}), retrying in {:?}", address, e, RECONNECT_DELAY);
                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    _ = tokio::time::sleep(RECONNECT_DELAY) => continue,
                }
            }
        };
        log::debug!("Output port connected to {}", address);
        let mut sink = FramedWrite::new(stream, LengthDelimitedCodec::new());

        loop {
            let frame = match pending.take() {
                Some(frame) => frame,
                None => tokio::select! {
                    _ = shutdown.cancelled() => return,
                    frame = rx.recv() => match frame {
                        Some(frame) => frame,
                        None => return,
                    },
                },
            };
            if let Err(e) = sink.send(frame.clone()).await {
                log::warn!("Lost connection to {}: {}", address, e);
                pending = Some(frame);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_forms() {
        assert_eq!(parse_endpoint("tcp://127.0.0.1:5000").unwrap(), "127.0.0.1:5000");
        assert_eq!(parse_endpoint("localhost:5001").unwrap(), "localhost:5001");
        assert_eq!(parse_endpoint("tcp://*:5002").unwrap(), "0.0.0.0:5002");
        for bad in ["", "5000", "tcp://:5000", "ipc:///tmp/x", "host:port", "udp://host:1"] {
            assert!(parse_endpoint(bad).is_err(), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn frames_flow_from_output_to_input() {
        let shutdown = CancellationToken::new();
        let (mut rx, local) = bind_input("tcp://127.0.0.1:0", 8, shutdown.clone()).await.unwrap();

        let tx = connect_output(&local.to_string(), 8, shutdown.clone()).unwrap();
        tx.send(Bytes::from_static(b"10s")).await.unwrap();
        tx.send(Bytes::from_static(b"{\"a\":1}")).await.unwrap();

        let mut received = Vec::new();
        while received.len() < 2 {
            let frame = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
            received.push(frame);
        }
        assert_eq!(received, [Bytes::from_static(b"10s"), Bytes::from_static(b"{\"a\":1}")]);

        shutdown.cancel();
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let shutdown = CancellationToken::new();
        let (_rx, local) = bind_input("127.0.0.1:0", 1, shutdown.clone()).await.unwrap();
        let err = bind_input(&local.to_string(), 1, shutdown).await.unwrap_err();
        assert!(matches!(err, PortError::Bind { .. }));
    }
}
