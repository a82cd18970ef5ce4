//! RingPipe - demo & benchmark
//!
//! Dua endpoint, dua channel:
//! - Endpoint 0 streaming byte ke endpoint 1 dalam chunk acak (thread writer)
//! - Main thread membaca dan memverifikasi urutan byte
//! - Lalu benchmark raw RingBuffer tanpa lock
//!
//! Usage:
//!   cargo run --release -- [OPTIONS]

use std::process;
use std::thread;
use std::time::Instant;

use clap::Parser;
use rand::Rng;
use thiserror::Error;

use ringpipe::config::{DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_READERS};
use ringpipe::{
    Access, CancelToken, EndpointHandle, PipeConfig, PipeError, PipeRegistry, RingBuffer, Wait,
    WritePolicy,
};

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Pipe(#[from] PipeError),
    #[error("stream corrupted at byte {offset}")]
    Corrupted { offset: usize },
    #[error("writer thread panicked")]
    WriterPanicked,
}

/// Command-line options
#[derive(Parser, Debug)]
#[command(name = "ringpipe", version, about = "Bounded blocking byte pipe demo")]
struct Args {
    /// Buffer capacity per channel in bytes (one byte is reserved)
    #[arg(short, long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    capacity: usize,

    /// Total bytes to stream from endpoint 0 to endpoint 1
    #[arg(short, long, default_value_t = 16 * 1024 * 1024)]
    bytes: usize,

    /// Largest write chunk; each write picks a random size up to this
    #[arg(long, default_value_t = 1024)]
    chunk: usize,

    /// Concurrent reader limit per endpoint
    #[arg(short, long, default_value_t = DEFAULT_MAX_READERS)]
    readers: usize,

    /// Accept partial writes instead of waiting for the whole chunk to fit
    #[arg(long)]
    partial: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn pipe_config(&self) -> PipeConfig {
        PipeConfig::default()
            .with_buffer_capacity(self.capacity)
            .with_max_readers(self.readers)
            .with_write_policy(if self.partial {
                WritePolicy::Partial
            } else {
                WritePolicy::Whole
            })
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    println!("🚀 RingPipe - bounded blocking byte pipe");
    println!("========================================\n");

    if let Err(e) = benchmark_pipe(&args) {
        log::error!("pipe benchmark failed: {}", e);
        eprintln!("❌ Pipe error: {}", e);
        process::exit(1);
    }

    if let Err(e) = benchmark_ring_buffer(args.capacity) {
        eprintln!("❌ Ring buffer error: {}", e);
        process::exit(1);
    }

    println!("\n✅ All benchmarks complete!");
}

/// Byte ke-`i` dari stream: pola deterministik untuk verifikasi urutan
#[inline(always)]
fn pattern(i: usize) -> u8 {
    (i % 251) as u8
}

fn benchmark_pipe(args: &Args) -> Result<(), DemoError> {
    println!("📊 Pipe Benchmark (endpoint 0 -> endpoint 1)");
    println!("---------------------------------------------");

    let registry = PipeRegistry::new(args.pipe_config())?;
    let writer = registry.open(0, Access::Write)?;
    let reader = registry.open(1, Access::Read)?;
    let cancel = CancelToken::new();

    // Policy Whole menolak chunk lebih besar dari usable capacity
    let max_chunk = args.chunk.clamp(1, args.capacity.saturating_sub(1).max(1));
    let total = args.bytes;

    let start = Instant::now();
    let received = thread::scope(|scope| -> Result<usize, DemoError> {
        let producer = scope.spawn(|| -> Result<(), PipeError> {
            let result = produce(&writer, total, max_chunk, &cancel);
            if result.is_err() {
                cancel.cancel();
            }
            result
        });

        let consumed = consume(&reader, total, max_chunk, &cancel);
        if consumed.is_err() {
            // Writer mungkin sedang tidur menunggu space
            cancel.cancel();
        }

        let produced = producer.join().map_err(|_| DemoError::WriterPanicked)?;
        match (consumed, produced) {
            // Reader di-interrupt karena writer gagal: laporkan error writer
            (Err(DemoError::Pipe(PipeError::Interrupted)), Err(e)) => Err(e.into()),
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e.into()),
            (Ok(n), Ok(())) => Ok(n),
        }
    })?;
    let duration = start.elapsed();

    let stats = registry.channel(1)?.stats();
    println!("  Capacity:      {} bytes ({} usable)", stats.capacity, stats.capacity - 1);
    println!("  Max chunk:     {} bytes", max_chunk);
    println!("  Transferred:   {} bytes (verified in order)", received);
    println!("  Channel stats: {:?}", stats);
    println!(
        "  Throughput:    {:.2} MB/sec\n",
        received as f64 / duration.as_secs_f64() / 1_000_000.0
    );
    Ok(())
}

fn produce(
    writer: &EndpointHandle,
    total: usize,
    max_chunk: usize,
    cancel: &CancelToken,
) -> Result<(), PipeError> {
    let mut rng = rand::thread_rng();
    let mut chunk = vec![0u8; max_chunk];
    let mut sent = 0;

    while sent < total {
        let len = rng.gen_range(1..=max_chunk).min(total - sent);
        for (offset, byte) in chunk[..len].iter_mut().enumerate() {
            *byte = pattern(sent + offset);
        }
        // Partial policy bisa menulis kurang dari len
        let mut done = 0;
        while done < len {
            done += writer.write_interruptible(&chunk[done..len], Wait::Blocking, cancel)?;
        }
        sent += len;
    }
    Ok(())
}

fn consume(
    reader: &EndpointHandle,
    total: usize,
    max_chunk: usize,
    cancel: &CancelToken,
) -> Result<usize, DemoError> {
    let mut buf = vec![0u8; max_chunk.max(4096)];
    let mut received = 0;

    while received < total {
        let n = reader.read_interruptible(&mut buf, Wait::Blocking, cancel)?;
        if let Some(offset) = buf[..n]
            .iter()
            .enumerate()
            .position(|(i, &byte)| byte != pattern(received + i))
        {
            return Err(DemoError::Corrupted {
                offset: received + offset,
            });
        }
        received += n;
    }
    Ok(received)
}

fn benchmark_ring_buffer(capacity: usize) -> Result<(), DemoError> {
    println!("📊 Ring Buffer Benchmark (single thread, no lock)");
    println!("-------------------------------------------------");

    const ITERATIONS: usize = 1_000_000;
    const MSG_SIZE: usize = 64;

    let mut rb = RingBuffer::with_capacity(capacity.max(MSG_SIZE + 1))?;
    let msg = [0xA5u8; MSG_SIZE];
    let mut out = [0u8; MSG_SIZE];

    // Warm up
    for _ in 0..1000 {
        rb.write(&msg);
        rb.read(&mut out);
    }

    let start = Instant::now();
    for _ in 0..ITERATIONS {
        if rb.write(&msg) < MSG_SIZE {
            rb.read(&mut out);
            rb.write(&msg);
        }
        rb.read(&mut out);
    }
    let duration = start.elapsed();

    let ns = duration.as_nanos() as f64 / ITERATIONS as f64;
    println!("  Message size: {} bytes", MSG_SIZE);
    println!("  Operations:   {}", ITERATIONS);
    println!("  Write+read latency: {:.2} ns/op ({:.3} μs/op)", ns, ns / 1000.0);
    println!(
        "  Throughput:   {:.2} MB/sec",
        (ITERATIONS * MSG_SIZE) as f64 / duration.as_secs_f64() / 1_000_000.0
    );
    Ok(())
}
