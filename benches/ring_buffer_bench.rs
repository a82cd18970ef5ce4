//! Criterion benchmark untuk RingBuffer dan SynchronizedChannel
//!
//! Run dengan: cargo bench

use std::thread;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ringpipe::core::RingBuffer;
use ringpipe::{ChannelConfig, SynchronizedChannel, Wait};

const CAPACITY: usize = 64 * 1024;

fn bench_ring_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");

    for msg_size in [16usize, 256, 4096].iter() {
        group.throughput(Throughput::Bytes(*msg_size as u64));

        group.bench_function(format!("write_read_{}", msg_size), |b| {
            let mut rb = RingBuffer::with_capacity(CAPACITY).unwrap();
            let msg = vec![0x5Au8; *msg_size];
            let mut out = vec![0u8; *msg_size];
            b.iter(|| {
                rb.write(black_box(&msg));
                black_box(rb.read(&mut out));
            });
        });
    }

    // Wraparound: capacity bukan kelipatan ukuran pesan
    group.throughput(Throughput::Bytes(100));
    group.bench_function("write_read_wrapping", |b| {
        let mut rb = RingBuffer::with_capacity(1021).unwrap();
        let msg = [7u8; 100];
        let mut out = [0u8; 100];
        b.iter(|| {
            rb.write(black_box(&msg));
            black_box(rb.read(&mut out));
        });
    });

    group.finish();
}

fn bench_channel(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel");

    group.throughput(Throughput::Bytes(256));
    group.bench_function("uncontended_write_read", |b| {
        let ch = SynchronizedChannel::new(ChannelConfig::with_capacity(CAPACITY)).unwrap();
        let msg = [1u8; 256];
        let mut out = [0u8; 256];
        b.iter(|| {
            ch.write(black_box(&msg), Wait::NonBlocking).unwrap();
            black_box(ch.read(&mut out, Wait::NonBlocking).unwrap());
        });
    });

    // Producer/consumer lintas thread, memaksa banyak siklus block/wake
    const STREAM: usize = 1024 * 1024;
    group.throughput(Throughput::Bytes(STREAM as u64));
    group.bench_function("threaded_stream_1mb", |b| {
        b.iter(|| {
            let ch = SynchronizedChannel::new(ChannelConfig::with_capacity(4096)).unwrap();
            let producer = {
                let ch = ch.clone();
                thread::spawn(move || {
                    let chunk = [3u8; 512];
                    let mut sent = 0;
                    while sent < STREAM {
                        sent += ch.write(&chunk, Wait::Blocking).unwrap();
                    }
                })
            };

            let mut out = [0u8; 2048];
            let mut received = 0;
            while received < STREAM {
                received += ch.read(&mut out, Wait::Blocking).unwrap();
            }
            producer.join().unwrap();
            black_box(received)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_ring_buffer, bench_channel);
criterion_main!(benches);
