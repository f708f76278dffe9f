use criterion::{black_box, criterion_group, criterion_main, Criterion};
use net::{
    encode_packet, frame_handshake, mc::Result as McResult, HandshakeC2s, HandshakeNextState,
    PacketDecoder, PacketFrame, PacketState, PingResponder, StatusDescription, StatusPayload,
    StatusPingC2s, StatusPlayers, StatusRequestC2s, StatusResponder, StatusVersion,
};

const PROTOCOL_VERSION: i32 = 763;

enum PacketRef<'a> {
    Handshake(HandshakeC2s<'a>),
    StatusRequest(StatusRequestC2s),
    StatusPing(StatusPingC2s),
}

impl<'a> PacketRef<'a> {
    fn encode_into(&self, out: &mut Vec<u8>) -> McResult<()> {
        match self {
            PacketRef::Handshake(packet) => encode_packet(out, packet),
            PacketRef::StatusRequest(packet) => encode_packet(out, packet),
            PacketRef::StatusPing(packet) => encode_packet(out, packet),
        }
    }
}

fn decode_handshake(frame: &PacketFrame) -> McResult<()> {
    black_box(frame.decode_serverbound(PacketState::Handshaking)?);
    Ok(())
}

fn decode_status(frame: &PacketFrame) -> McResult<()> {
    black_box(frame.decode_serverbound(PacketState::Status)?);
    Ok(())
}

fn handshake() -> HandshakeC2s<'static> {
    HandshakeC2s {
        declared_length: 0,
        request_type: 0x00,
        protocol_version: PROTOCOL_VERSION,
        hostname: b"localhost",
        port: 25565,
        next_state: HandshakeNextState::Status,
    }
}

fn packet_entries() -> Vec<(PacketRef<'static>, fn(&PacketFrame) -> McResult<()>)> {
    vec![
        (PacketRef::Handshake(handshake()), decode_handshake),
        (PacketRef::StatusRequest(StatusRequestC2s), decode_status),
        (
            PacketRef::StatusPing(StatusPingC2s { payload: [7; 8] }),
            decode_status,
        ),
    ]
}

fn bench_decode_round_robin(c: &mut Criterion) {
    let encoded: Vec<_> = packet_entries()
        .into_iter()
        .map(|(packet, decode)| {
            let mut bytes = Vec::new();
            packet.encode_into(&mut bytes).unwrap();
            (bytes, decode)
        })
        .collect();

    let mut idx = 0usize;
    let mut decoder = PacketDecoder::new();

    c.bench_function("decode_round_robin", |b| {
        b.iter(|| {
            let (bytes, decode) = &encoded[idx];
            idx = (idx + 1) % encoded.len();
            decoder.queue_slice(bytes);
            let frame = decoder.try_next_packet().unwrap().unwrap();
            decode(&frame).unwrap();
            black_box(frame);
        })
    });
}

fn bench_single_read_handshake(c: &mut Criterion) {
    let mut bytes = Vec::new();
    encode_packet(&mut bytes, &handshake()).unwrap();

    c.bench_function("frame_handshake", |b| {
        b.iter(|| black_box(frame_handshake(black_box(&bytes), bytes.len()).unwrap()))
    });
}

fn bench_status_and_ping(c: &mut Criterion) {
    let responder = StatusResponder::new(&StatusPayload {
        version: StatusVersion {
            name: "1.20.1".into(),
            protocol: PROTOCOL_VERSION,
        },
        players: StatusPlayers {
            max: 20,
            online: 0,
            sample: Vec::new(),
        },
        description: StatusDescription {
            text: "bench".into(),
        },
        favicon: None,
        enforces_secure_chat: true,
        previews_chat: true,
    })
    .unwrap();
    let request = PacketFrame {
        id: 0x00,
        body: Vec::new(),
    };
    let ping = PacketFrame {
        id: 0x01,
        body: vec![1, 2, 3, 4, 5, 6, 7, 8],
    };

    c.bench_function("status_respond", |b| {
        b.iter(|| black_box(responder.respond(&request).unwrap()))
    });
    c.bench_function("ping_respond", |b| {
        b.iter(|| black_box(PingResponder::respond(&ping).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_decode_round_robin,
    bench_single_read_handshake,
    bench_status_and_ping
);
criterion_main!(benches);
