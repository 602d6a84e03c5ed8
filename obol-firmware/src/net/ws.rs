//! Secure WebSocket connection task
//!
//! Owns the socket plumbing end to end: DNS lookup, TCP connect, TLS 1.3
//! handshake, WebSocket upgrade, then the frame pump. The session drives
//! it only through the static channels: events out, text frames in,
//! open/close control. Any failure collapses to a Disconnected event and
//! the fixed retry interval re-arms, so recovery never needs an explicit
//! handshake request but always honors one.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_rp::clocks::RoscRng;
use embassy_time::Timer;
use embedded_io_async::{Read, Write};
use embedded_tls::{Aes128GcmSha256, TlsConfig, TlsConnection, TlsContext, UnsecureProvider};
use embedded_websocket::{
    Error as WsProtocolError, WebSocketClient, WebSocketCloseStatusCode, WebSocketOptions,
    WebSocketReceiveMessageType, WebSocketSendMessageType,
};
use heapless::{String, Vec};

use obol_core::config::{Endpoint, RECONNECT_INTERVAL_MS};
use obol_core::session::{StreamEvent, MAX_FRAME_LEN};
use obol_core::traits::StreamTransport;

use crate::channels::{
    TransportControl, MAX_OUTBOUND_LEN, OUTBOUND_FRAMES, STREAM_EVENTS, TRANSPORT_CONTROL,
};
use crate::config;

/// Channel-backed transport handle the session drives.
///
/// The socket work happens in [`connection_task`]; this type only
/// translates trait calls into channel traffic, so `poll_event` never
/// blocks and the session stays free of async plumbing.
pub struct ChannelTransport;

impl StreamTransport for ChannelTransport {
    fn open(&mut self, _endpoint: &Endpoint) {
        // The connection task holds the (compile-time) endpoint; the
        // signal only requests a fresh handshake.
        TRANSPORT_CONTROL.signal(TransportControl::Open);
    }

    fn poll_event(&mut self) -> Option<StreamEvent> {
        STREAM_EVENTS.try_receive().ok()
    }

    fn send_text(&mut self, text: &str) -> bool {
        let mut frame: String<MAX_OUTBOUND_LEN> = String::new();
        if frame.push_str(text).is_err() {
            warn!("stream: outbound frame too large, dropped");
            return false;
        }
        OUTBOUND_FRAMES.try_send(frame).is_ok()
    }

    fn close(&mut self) {
        TRANSPORT_CONTROL.signal(TransportControl::Close);
    }
}

/// Connection-level failures; all of them collapse to a reconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum WsError {
    Dns,
    Connect,
    Tls,
    Handshake,
    Protocol,
    Overrun,
    Closed,
}

/// Connection task - keeps the WebSocket session alive
#[embassy_executor::task]
pub async fn connection_task(stack: Stack<'static>) {
    info!("Connection task started");

    let endpoint = config::ENDPOINT;

    // The first handshake is requested by the lifecycle task once the
    // link is up; until then there is nothing to connect through.
    while TRANSPORT_CONTROL.wait().await != TransportControl::Open {}

    let mut rx_buffer = [0u8; 4096];
    let mut tx_buffer = [0u8; 4096];
    let mut read_record_buffer = [0u8; 16640];
    let mut write_record_buffer = [0u8; 16640];

    loop {
        info!(
            "stream: connecting to {=str}:{=u16}{=str}",
            endpoint.host, endpoint.port, endpoint.path
        );

        match run_connection(
            stack,
            &endpoint,
            &mut rx_buffer,
            &mut tx_buffer,
            &mut read_record_buffer,
            &mut write_record_buffer,
        )
        .await
        {
            Ok(()) => info!("stream: connection closed"),
            Err(e) => warn!("stream: connection lost: {}", e),
        }

        STREAM_EVENTS.send(StreamEvent::Disconnected).await;

        // Fixed retry interval. Handshake requests arriving meanwhile
        // only re-arm the already-pending attempt.
        Timer::after_millis(RECONNECT_INTERVAL_MS).await;
        TRANSPORT_CONTROL.try_take();
    }
}

/// One connection attempt: resolve, connect, upgrade, pump until it dies
async fn run_connection(
    stack: Stack<'static>,
    endpoint: &Endpoint,
    rx_buffer: &mut [u8],
    tx_buffer: &mut [u8],
    read_record_buffer: &mut [u8],
    write_record_buffer: &mut [u8],
) -> Result<(), WsError> {
    let addrs = stack
        .dns_query(endpoint.host, DnsQueryType::A)
        .await
        .map_err(|_| WsError::Dns)?;
    let addr = *addrs.first().ok_or(WsError::Dns)?;
    debug!("stream: resolved {=str} -> {}", endpoint.host, addr);

    let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
    socket
        .connect((addr, endpoint.port))
        .await
        .map_err(|_| WsError::Connect)?;

    // SNI only; the feed is public, no client certificate
    let tls_config = TlsConfig::new().with_server_name(endpoint.host);
    let mut tls: TlsConnection<'_, TcpSocket<'_>, Aes128GcmSha256> =
        TlsConnection::new(socket, read_record_buffer, write_record_buffer);
    tls.open(TlsContext::new(
        &tls_config,
        UnsecureProvider::new::<Aes128GcmSha256>(RoscRng),
    ))
    .await
    .map_err(|_| WsError::Tls)?;

    let result = run_websocket(&mut tls, endpoint).await;

    // Best effort close_notify so the server drops us cleanly
    let _ = tls.close().await;
    result
}

/// WebSocket upgrade plus the frame pump
async fn run_websocket<'a>(
    tls: &mut TlsConnection<'a, TcpSocket<'a>, Aes128GcmSha256>,
    endpoint: &Endpoint,
) -> Result<(), WsError> {
    let mut ws = WebSocketClient::new_client(RoscRng);
    let options = WebSocketOptions {
        path: endpoint.path,
        host: endpoint.host,
        origin: "",
        sub_protocols: None,
        additional_headers: None,
    };

    // Decrypted stream bytes not yet consumed by the frame decoder
    let mut net_buf = [0u8; 4096];
    // Decoded payload of the frame currently being read
    let mut payload_buf = [0u8; MAX_FRAME_LEN];
    // Encoded outbound frames
    let mut out_buf = [0u8; 1024];

    // HTTP upgrade request
    let (len, key) = ws
        .client_connect(&options, &mut net_buf)
        .map_err(|_| WsError::Handshake)?;
    tls.write_all(&net_buf[..len]).await.map_err(|_| WsError::Tls)?;
    tls.flush().await.map_err(|_| WsError::Tls)?;

    // Upgrade response; may arrive fragmented, and frame bytes may ride
    // along behind the headers
    let mut filled = 0;
    loop {
        let n = tls
            .read(&mut net_buf[filled..])
            .await
            .map_err(|_| WsError::Tls)?;
        if n == 0 {
            return Err(WsError::Closed);
        }
        filled += n;

        match ws.client_accept(&key, &net_buf[..filled]) {
            Ok(consumed) => {
                net_buf.copy_within(consumed..filled, 0);
                filled -= consumed;
                break;
            }
            Err(WsProtocolError::HttpHeaderIncomplete) => {
                if filled == net_buf.len() {
                    return Err(WsError::Overrun);
                }
            }
            Err(_) => return Err(WsError::Handshake),
        }
    }

    info!("stream: websocket established");
    STREAM_EVENTS.send(StreamEvent::Connected).await;

    // Accumulates fragmented text messages into one frame
    let mut message: Vec<u8, MAX_FRAME_LEN> = Vec::new();

    loop {
        // Drain complete frames already buffered
        while filled > 0 {
            let result = match ws.read(&net_buf[..filled], &mut payload_buf) {
                Ok(result) => result,
                Err(WsProtocolError::ReadFrameIncomplete) => break,
                Err(_) => return Err(WsError::Protocol),
            };

            net_buf.copy_within(result.len_from..filled, 0);
            filled -= result.len_from;

            match result.message_type {
                WebSocketReceiveMessageType::Text => {
                    message
                        .extend_from_slice(&payload_buf[..result.len_to])
                        .map_err(|_| WsError::Overrun)?;
                    if result.end_of_message {
                        match StreamEvent::text(&message) {
                            Some(event) => STREAM_EVENTS.send(event).await,
                            None => warn!("stream: dropping oversized text frame"),
                        }
                        message.clear();
                    }
                }
                WebSocketReceiveMessageType::Binary => {
                    // The feed is text-only
                    debug!("stream: ignoring {=usize} binary bytes", result.len_to);
                }
                WebSocketReceiveMessageType::Ping => {
                    let len = ws
                        .write(
                            WebSocketSendMessageType::Pong,
                            true,
                            &payload_buf[..result.len_to],
                            &mut out_buf,
                        )
                        .map_err(|_| WsError::Protocol)?;
                    tls.write_all(&out_buf[..len]).await.map_err(|_| WsError::Tls)?;
                    tls.flush().await.map_err(|_| WsError::Tls)?;
                }
                WebSocketReceiveMessageType::Pong => {}
                WebSocketReceiveMessageType::CloseMustReply => {
                    let len = ws
                        .write(
                            WebSocketSendMessageType::CloseReply,
                            true,
                            &payload_buf[..result.len_to],
                            &mut out_buf,
                        )
                        .map_err(|_| WsError::Protocol)?;
                    let _ = tls.write_all(&out_buf[..len]).await;
                    let _ = tls.flush().await;
                    return Err(WsError::Closed);
                }
                WebSocketReceiveMessageType::CloseCompleted => return Err(WsError::Closed),
            }
        }

        if filled == net_buf.len() {
            // A single frame larger than the net buffer cannot complete
            return Err(WsError::Overrun);
        }

        // Wait for inbound bytes, an outbound frame, or a control request
        let outcome = select3(
            tls.read(&mut net_buf[filled..]),
            OUTBOUND_FRAMES.receive(),
            TRANSPORT_CONTROL.wait(),
        )
        .await;

        match outcome {
            Either3::First(read) => {
                let n = read.map_err(|_| WsError::Tls)?;
                if n == 0 {
                    return Err(WsError::Closed);
                }
                filled += n;
            }
            Either3::Second(frame) => {
                let len = ws
                    .write(
                        WebSocketSendMessageType::Text,
                        true,
                        frame.as_bytes(),
                        &mut out_buf,
                    )
                    .map_err(|_| WsError::Protocol)?;
                tls.write_all(&out_buf[..len]).await.map_err(|_| WsError::Tls)?;
                tls.flush().await.map_err(|_| WsError::Tls)?;
                debug!("stream: sent {=usize} byte frame", frame.len());
            }
            Either3::Third(TransportControl::Close) => {
                let len = ws
                    .close(WebSocketCloseStatusCode::NormalClosure, None, &mut out_buf)
                    .map_err(|_| WsError::Protocol)?;
                let _ = tls.write_all(&out_buf[..len]).await;
                let _ = tls.flush().await;
                info!("stream: closed by request");
                return Ok(());
            }
            Either3::Third(TransportControl::Open) => {
                // Already connected; a re-issued handshake is a no-op
            }
        }
    }
}
