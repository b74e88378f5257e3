#![no_main]

use libfuzzer_sys::fuzz_target;
use wmbus_radio::Packet;

fuzz_target!(|data: &[u8]| {
    // whole capture at once
    let _ = Packet::from_bytes(data).try_into_frame();

    // first byte picks the FIFO read size, the rest is streamed in
    let Some((&chunk, rest)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);
    let mut packet = Packet::new();
    let mut offset = 0;

    while offset < rest.len() && packet.rx_capacity() > 0 {
        let region = packet.rx_region();
        let n = region.len().min(chunk).min(rest.len() - offset);
        region[..n].copy_from_slice(&rest[offset..offset + n]);
        packet.commit(n);
        offset += n;
        packet.calculate_payload_size();
    }

    if let Ok(frame) = packet.try_into_frame() {
        assert!(frame.size() <= frame.raw_size());
    }
});
