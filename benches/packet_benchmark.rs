use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wmbus_radio::wmbus::dll_crc::{add_format_a_crcs, add_format_b_crcs};
use wmbus_radio::wmbus::encoding::encode_3of6;
use wmbus_radio::Packet;

fn telegram(len: usize) -> Vec<u8> {
    let mut frame: Vec<u8> = (0..len).map(|i| (i * 13 + 5) as u8).collect();
    frame[0] = (len - 1) as u8;
    frame
}

fn c1_capture(frame: &[u8], format_b: bool) -> Vec<u8> {
    let (preamble, coded) = if format_b {
        (0x3D, add_format_b_crcs(frame))
    } else {
        (0xCD, add_format_a_crcs(frame))
    };
    let mut capture = vec![0x54, preamble];
    capture.extend_from_slice(&coded);
    capture
}

fn benchmark_convert(c: &mut Criterion) {
    let frame = telegram(120);
    let c1_a = c1_capture(&frame, false);
    let c1_b = c1_capture(&frame, true);
    let t1 = encode_3of6(&add_format_a_crcs(&frame));

    c.bench_function("convert_c1_format_a", |b| {
        b.iter(|| Packet::from_bytes(black_box(&c1_a)).try_into_frame())
    });
    c.bench_function("convert_c1_format_b", |b| {
        b.iter(|| Packet::from_bytes(black_box(&c1_b)).try_into_frame())
    });
    c.bench_function("convert_t1", |b| {
        b.iter(|| Packet::from_bytes(black_box(&t1)).try_into_frame())
    });
}

fn benchmark_expected_size(c: &mut Criterion) {
    let t1 = encode_3of6(&add_format_a_crcs(&telegram(120)));

    c.bench_function("expected_size_t1_head", |b| {
        b.iter(|| {
            let mut packet = Packet::from_bytes(black_box(&t1[..3]));
            black_box(packet.expected_size())
        })
    });
}

criterion_group!(benches, benchmark_convert, benchmark_expected_size);
criterion_main!(benches);
