use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use gate_protocol::config::MAX_DATAGRAM_SIZE;
use gate_protocol::core::codec::{make_packet, parse_packet, Key, KEY_LEN, TAG_LEN};
use gate_protocol::core::device_id::DeviceId;
use gate_protocol::core::packet::{PacketHead, HEADER_SIZE, NONCE_LEN};
use gate_protocol::protocol::{Dispatcher, HelloGate, MemoryKeyStore, MsgType, RequestHead};

const DEVICE: DeviceId = DeviceId([0x02, 0, 0, 0, 0, 0x01]);

#[allow(clippy::unwrap_used)]
fn bench_packet_seal_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_seal_open");
    let key = Key::new([0x42; KEY_LEN]);
    let head = PacketHead::for_request(DEVICE, [7u8; NONCE_LEN]);
    let max_data = MAX_DATAGRAM_SIZE - HEADER_SIZE - 1 - TAG_LEN;

    for size in [0usize, 16, 256, max_data] {
        let data = vec![0u8; size];
        let envelope = RequestHead::from(MsgType::Open);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("make_packet_{size}b"), |b| {
            b.iter(|| make_packet(&head, &envelope, &data, &key).unwrap())
        });

        let packet = make_packet(&head, &envelope, &data, &key).unwrap();
        group.bench_function(format!("parse_packet_{size}b"), |b| {
            b.iter(|| parse_packet::<RequestHead>(&packet, &key).unwrap())
        });
    }

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_dispatch(c: &mut Criterion) {
    let key = Key::new([0x42; KEY_LEN]);
    let keys = MemoryKeyStore::new().with_device(DEVICE, key.clone());
    let dispatcher = Dispatcher::new(HelloGate, keys);
    let head = PacketHead::for_request(DEVICE, [9u8; NONCE_LEN]);
    let packet = make_packet(&head, &RequestHead::from(MsgType::Open), b"\x05Hello", &key).unwrap();

    c.bench_function("handle_request_open", |b| {
        b.iter(|| dispatcher.handle_request(&packet).unwrap())
    });
}

criterion_group!(benches, bench_packet_seal_open, bench_dispatch);
criterion_main!(benches);
