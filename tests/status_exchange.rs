/// End-to-end exchanges against the connection handler over in-memory and
/// loopback streams.
use std::{net::SocketAddr, time::Duration};

use lodestone::{
    config::LodestoneConfig, connection::Connection, server::Lodestone, utils::leak,
};
use net::{
    encode_packet, mc::encode_raw_packet, HandshakeC2s, HandshakeNextState, LoginDisconnectS2c, PacketDecoder,
    PacketFrame, StatusPayload, StatusPingC2s, StatusRequestC2s, StatusResponseS2c,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt, DuplexStream},
    net::{TcpListener, TcpStream},
    sync::broadcast,
    task::JoinHandle,
};

const PING_PAYLOAD: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

fn handshake_bytes(protocol_version: i32, next_state: HandshakeNextState) -> Vec<u8> {
    let mut out = Vec::new();
    encode_packet(
        &mut out,
        &HandshakeC2s {
            declared_length: 0,
            request_type: 0x00,
            protocol_version,
            hostname: b"localhost",
            port: 25565,
            next_state,
        },
    )
    .unwrap();
    out
}

fn spawn_handler(config: LodestoneConfig) -> (DuplexStream, JoinHandle<()>) {
    spawn_handler_with_buffer(config, 4096)
}

fn spawn_handler_with_buffer(
    config: LodestoneConfig,
    max_buf_size: usize,
) -> (DuplexStream, JoinHandle<()>) {
    let lodestone = leak(Lodestone::new(config).unwrap());
    let (client, server) = tokio::io::duplex(max_buf_size);
    let addr: SocketAddr = "127.0.0.1:50000".parse().unwrap();
    let task = tokio::spawn(async move {
        lodestone
            .handle_connection(Connection::new(server, addr))
            .await;
    });
    (client, task)
}

async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R, dec: &mut PacketDecoder) -> PacketFrame {
    let mut buf = [0u8; 512];
    loop {
        if let Some(frame) = dec.try_next_packet().unwrap() {
            return frame;
        }
        let n = reader.read(&mut buf).await.unwrap();
        assert_ne!(n, 0, "server closed before sending a full frame");
        dec.queue_slice(&buf[..n]);
    }
}

async fn assert_closed<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 16];
    assert_eq!(reader.read(&mut buf).await.unwrap(), 0);
}

fn parse_status(frame: &PacketFrame) -> StatusPayload {
    assert_eq!(frame.id, StatusResponseS2c::ID);
    let mut body = frame.body.as_slice();
    let response = StatusResponseS2c::decode_body(&mut body).unwrap();
    assert!(body.is_empty());
    serde_json::from_str(response.json).unwrap()
}

fn ping_bytes() -> Vec<u8> {
    let mut out = Vec::new();
    encode_packet(
        &mut out,
        &StatusPingC2s {
            payload: PING_PAYLOAD,
        },
    )
    .unwrap();
    out
}

#[tokio::test]
async fn status_then_ping() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    let mut dec = PacketDecoder::new();

    let mut request = handshake_bytes(763, HandshakeNextState::Status);
    encode_packet(&mut request, &StatusRequestC2s).unwrap();
    client.write_all(&request).await.unwrap();

    let status = parse_status(&read_frame(&mut client, &mut dec).await);
    assert_eq!(status.version.protocol, 763);
    assert_eq!(status.players.online, 0);
    assert_eq!(status.players.max, 20);
    assert!(status.players.sample.is_empty());

    client.write_all(&ping_bytes()).await.unwrap();
    let pong = read_frame(&mut client, &mut dec).await;
    assert_eq!(pong.id, 0x01);
    assert_eq!(pong.body, PING_PAYLOAD.to_vec());

    assert_closed(&mut client).await;
    task.await.unwrap();
}

#[tokio::test]
async fn reported_protocol_ignores_client_version() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    let mut dec = PacketDecoder::new();

    client
        .write_all(&handshake_bytes(47, HandshakeNextState::Status))
        .await
        .unwrap();
    let mut request = Vec::new();
    encode_packet(&mut request, &StatusRequestC2s).unwrap();
    client.write_all(&request).await.unwrap();

    let status = parse_status(&read_frame(&mut client, &mut dec).await);
    assert_eq!(status.version.protocol, 763);

    drop(client);
    task.await.unwrap();
}

#[tokio::test]
async fn ping_without_status_request() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    let mut dec = PacketDecoder::new();

    let mut request = handshake_bytes(763, HandshakeNextState::Status);
    request.extend_from_slice(&ping_bytes());
    client.write_all(&request).await.unwrap();

    let pong = read_frame(&mut client, &mut dec).await;
    assert_eq!(pong.id, 0x01);
    assert_eq!(pong.body, PING_PAYLOAD.to_vec());
    task.await.unwrap();
}

#[tokio::test]
async fn login_receives_configured_disconnect() {
    let mut config = LodestoneConfig::default();
    config.login.disconnect_message = Some("Status only".to_string());
    let (mut client, task) = spawn_handler(config);
    let mut dec = PacketDecoder::new();

    client
        .write_all(&handshake_bytes(763, HandshakeNextState::Login))
        .await
        .unwrap();

    let frame = read_frame(&mut client, &mut dec).await;
    assert_eq!(frame.id, LoginDisconnectS2c::ID);
    let mut body = frame.body.as_slice();
    let disconnect = LoginDisconnectS2c::decode_body(&mut body).unwrap();
    let reason: serde_json::Value = serde_json::from_str(disconnect.reason).unwrap();
    assert_eq!(reason["text"], "Status only");

    assert_closed(&mut client).await;
    task.await.unwrap();
}

#[tokio::test]
async fn login_without_message_closes_silently() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    client
        .write_all(&handshake_bytes(763, HandshakeNextState::Login))
        .await
        .unwrap();
    assert_closed(&mut client).await;
    task.await.unwrap();
}

#[tokio::test]
async fn legacy_ping_gets_no_response() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    client.write_all(&[0xfe, 0x01, 0xfa]).await.unwrap();
    assert_closed(&mut client).await;
    task.await.unwrap();
}

#[tokio::test]
async fn truncated_handshake_is_dropped() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    client.write_all(&[0x03, 0x00, 0xfb, 0x05]).await.unwrap();
    assert_closed(&mut client).await;
    task.await.unwrap();
}

#[tokio::test]
async fn unknown_next_state_is_ignored() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    client
        .write_all(&handshake_bytes(763, HandshakeNextState::Unknown(3)))
        .await
        .unwrap();
    assert_closed(&mut client).await;
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn silent_client_times_out() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    assert_closed(&mut client).await;
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unknown_packets_do_not_extend_status_deadline() {
    let (mut client, task) = spawn_handler(LodestoneConfig::default());
    client
        .write_all(&handshake_bytes(763, HandshakeNextState::Status))
        .await
        .unwrap();

    let junk = tokio::spawn(async move {
        let mut frame = Vec::new();
        encode_raw_packet(&mut frame, 0x7f, &[]).unwrap();
        for _ in 0..100 {
            if client.write_all(&frame).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2_500)).await;
        }
    });

    // Default status budget is 3 s; the junk stream would last 250 s.
    tokio::time::timeout(Duration::from_secs(10), task)
        .await
        .expect("handler outlived the status deadline")
        .unwrap();
    junk.abort();
}

#[tokio::test]
async fn peer_gone_before_response_ends_handler() {
    let (mut client, task) = spawn_handler_with_buffer(LodestoneConfig::default(), 16);
    let mut request = handshake_bytes(763, HandshakeNextState::Status);
    encode_packet(&mut request, &StatusRequestC2s).unwrap();
    client.write_all(&request).await.unwrap();
    drop(client);

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("handler kept running after the peer left")
        .unwrap();
}

#[tokio::test]
async fn serves_over_tcp_until_stopped() {
    let mut config = LodestoneConfig::default();
    config.status.description = "loopback".to_string();
    let lodestone = leak(Lodestone::new(config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stop_rx) = broadcast::channel(1);
    let server = tokio::spawn(lodestone.serve(listener, stop_rx));

    let mut client = TcpStream::connect(addr).await.unwrap();
    let mut dec = PacketDecoder::new();
    let mut request = handshake_bytes(763, HandshakeNextState::Status);
    encode_packet(&mut request, &StatusRequestC2s).unwrap();
    request.extend_from_slice(&ping_bytes());
    client.write_all(&request).await.unwrap();

    let status = parse_status(&read_frame(&mut client, &mut dec).await);
    assert_eq!(status.description.text, "loopback");
    let pong = read_frame(&mut client, &mut dec).await;
    assert_eq!(pong.body, PING_PAYLOAD.to_vec());

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
