//! Scenario & property tests untuk channel dan registry
//!
//! Usage:
//!   cargo test --test pipe_scenarios

use proptest::prelude::*;
use ringpipe::{
    Access, ChannelConfig, Control, PipeConfig, PipeError, PipeRegistry, SynchronizedChannel,
    Wait, WritePolicy,
};

fn channel(capacity: usize) -> SynchronizedChannel {
    SynchronizedChannel::new(ChannelConfig::with_capacity(capacity)).unwrap()
}

fn partial_channel(capacity: usize) -> SynchronizedChannel {
    SynchronizedChannel::new(
        ChannelConfig::with_capacity(capacity).with_write_policy(WritePolicy::Partial),
    )
    .unwrap()
}

#[test]
fn capacity_eight_scenario() {
    let ch = channel(8);

    assert_eq!(ch.write(b"ABCDEFG", Wait::Blocking), Ok(7));
    assert_eq!(ch.write(b"X", Wait::NonBlocking), Err(PipeError::WouldBlock));
    assert_eq!(ch.read_vec(3, Wait::Blocking).unwrap(), b"ABC");
    assert_eq!(ch.write(b"XY", Wait::Blocking), Ok(2));
    assert_eq!(ch.read_vec(6, Wait::Blocking).unwrap(), b"DEFGXY");
    assert_eq!(ch.used_space(), 0);
}

#[test]
fn fresh_channel_reports_usable_capacity() {
    for capacity in [2usize, 8, 4000, 65536] {
        let ch = channel(capacity);
        assert_eq!(ch.free_space(), capacity - 1);
        assert_eq!(ch.used_space(), 0);
        assert_eq!(ch.capacity(), capacity);
    }
}

#[test]
fn capacity_must_exceed_one() {
    assert_eq!(
        SynchronizedChannel::new(ChannelConfig::with_capacity(1)).unwrap_err(),
        PipeError::InvalidCapacity(1)
    );
}

#[test]
fn filling_then_one_more_byte_would_block() {
    let ch = channel(32);
    ch.write(b"0123456789", Wait::Blocking).unwrap();
    ch.read_vec(4, Wait::Blocking).unwrap();

    let free = ch.free_space();
    let fill = vec![b'z'; free];
    assert_eq!(ch.write(&fill, Wait::NonBlocking), Ok(free));
    assert_eq!(ch.write(b"!", Wait::NonBlocking), Err(PipeError::WouldBlock));

    // Buffer tidak korup
    let mut expected = b"456789".to_vec();
    expected.extend_from_slice(&fill);
    assert_eq!(ch.read_vec(64, Wait::NonBlocking).unwrap(), expected);
}

#[test]
fn resize_shrink_rejection_leaves_bytes() {
    let ch = channel(16);
    ch.write(b"abcdefghij", Wait::Blocking).unwrap();
    ch.read_vec(6, Wait::Blocking).unwrap();
    ch.write(b"klmnopq", Wait::Blocking).unwrap(); // wrapped

    assert_eq!(
        ch.resize(11),
        Err(PipeError::WouldShrinkBelowUsedData { requested: 11, used: 11 })
    );
    assert_eq!(ch.capacity(), 16);
    assert_eq!(ch.read_vec(32, Wait::NonBlocking).unwrap(), b"ghijklmnopq");
}

#[test]
fn two_party_pipe_roundtrip() {
    let registry = PipeRegistry::new(PipeConfig::default()).unwrap();
    let left = registry.open(0, Access::ReadWrite).unwrap();
    let right = registry.open(1, Access::ReadWrite).unwrap();

    left.write(b"ping", Wait::Blocking).unwrap();
    let mut buf = [0u8; 16];
    let n = right.read(&mut buf, Wait::Blocking).unwrap();
    assert_eq!(&buf[..n], b"ping");

    right.write(b"pong", Wait::Blocking).unwrap();
    let n = left.read(&mut buf, Wait::Blocking).unwrap();
    assert_eq!(&buf[..n], b"pong");

    // Tidak ada loopback ke diri sendiri
    assert_eq!(left.read(&mut buf, Wait::NonBlocking), Err(PipeError::WouldBlock));
}

#[test]
fn control_surface_resizes_live_pipe() {
    let registry = PipeRegistry::new(PipeConfig::default().with_buffer_capacity(8)).unwrap();
    let writer = registry.open(0, Access::Write).unwrap();
    let reader = registry.open(1, Access::Read).unwrap();

    assert_eq!(
        writer.write(b"0123456789", Wait::NonBlocking),
        Err(PipeError::SizeExceeded { requested: 10, usable: 7 })
    );
    writer.write(b"abc", Wait::NonBlocking).unwrap();

    assert_eq!(registry.control(Control::SetBufferSize(64)), Ok(64));
    assert_eq!(registry.control(Control::UsedSpace(1)), Ok(3));
    assert_eq!(writer.write(b"0123456789", Wait::NonBlocking), Ok(10));

    let mut buf = [0u8; 32];
    let n = reader.read(&mut buf, Wait::NonBlocking).unwrap();
    assert_eq!(&buf[..n], b"abc0123456789");
}

#[cfg(unix)]
#[test]
fn errors_map_to_device_errno() {
    let ch = channel(4);
    let err = ch.read(&mut [0u8; 1], Wait::NonBlocking).unwrap_err();
    assert_eq!(err.errno(), libc::EAGAIN);
    let err = ch.write(b"too long", Wait::Blocking).unwrap_err();
    assert_eq!(err.errno(), libc::EMSGSIZE);
}

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..48).prop_map(Op::Write),
        (0usize..48).prop_map(Op::Read),
    ]
}

proptest! {
    #[test]
    fn fifo_byte_stream(capacity in 2usize..64, ops in prop::collection::vec(op(), 1..64)) {
        let ch = partial_channel(capacity);
        let mut written = Vec::new();
        let mut read = Vec::new();

        for op in ops {
            match op {
                Op::Write(bytes) => {
                    match ch.write(&bytes, Wait::NonBlocking) {
                        Ok(n) => written.extend_from_slice(&bytes[..n]),
                        Err(e) => prop_assert_eq!(e, PipeError::WouldBlock),
                    }
                }
                Op::Read(max) => {
                    match ch.read_vec(max, Wait::NonBlocking) {
                        Ok(bytes) => read.extend_from_slice(&bytes),
                        Err(e) => prop_assert_eq!(e, PipeError::WouldBlock),
                    }
                }
            }
            prop_assert_eq!(ch.free_space() + ch.used_space(), ch.capacity() - 1);
        }

        read.extend_from_slice(&ch.read_vec(capacity, Wait::NonBlocking).unwrap_or_default());
        prop_assert_eq!(read, written);
    }

    #[test]
    fn resize_preserves_content(
        capacity in 2usize..64,
        fill in prop::collection::vec(any::<u8>(), 0..64),
        drained in 0usize..64,
        refill in prop::collection::vec(any::<u8>(), 0..64),
        new_capacity in 1usize..128,
    ) {
        let ch = partial_channel(capacity);
        let mut expected = Vec::new();

        let n = ch.write(&fill, Wait::NonBlocking).unwrap_or(0);
        expected.extend_from_slice(&fill[..n]);
        let gone = ch.read_vec(drained, Wait::NonBlocking).map(|b| b.len()).unwrap_or(0);
        expected.drain(..gone);
        let n = ch.write(&refill, Wait::NonBlocking).unwrap_or(0);
        expected.extend_from_slice(&refill[..n]);

        let used = ch.used_space();
        prop_assert_eq!(used, expected.len());

        match ch.resize(new_capacity) {
            Ok(()) => {
                prop_assert!(new_capacity > used);
                prop_assert_eq!(ch.capacity(), new_capacity);
                prop_assert_eq!(ch.used_space(), used);
            }
            Err(PipeError::WouldShrinkBelowUsedData { .. }) => {
                prop_assert!(new_capacity <= used);
                prop_assert_eq!(ch.capacity(), capacity);
            }
            Err(e) => {
                prop_assert_eq!(e, PipeError::InvalidCapacity(new_capacity));
                prop_assert_eq!(ch.capacity(), capacity);
            }
        }

        let content = ch.read_vec(128, Wait::NonBlocking).unwrap_or_default();
        prop_assert_eq!(content, expected);
    }
}
