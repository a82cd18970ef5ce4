//! Synchronized Channel: RingBuffer + Mutex + dua Condvar
//!
//! Monitor klasik:
//! - Satu `Mutex` menjaga storage dan kedua cursor
//! - `readable` di-broadcast setelah write, `writable` setelah read/resize
//! - Waiter selalu re-check kondisi setelah bangun (spurious & lost wakeup)
//! - Mutasi hanya terjadi setelah kondisi terpenuhi, di bawah lock,
//!   dalam satu langkah. Call yang gagal tidak pernah mengubah buffer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::cancel::{CancelToken, Parked};
use super::Wait;
use crate::config::{ChannelConfig, WritePolicy};
use crate::core::{RingBuffer, Storage};
use crate::error::{PipeError, Result};

/// Snapshot of a channel's occupancy and traffic counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    pub capacity: usize,
    pub used: usize,
    pub free: usize,
    pub readers: usize,
    pub writers: usize,
    pub bytes_written: u64,
    pub bytes_read: u64,
}

struct State {
    ring: RingBuffer,
    bytes_written: u64,
    bytes_read: u64,
}

pub(crate) struct Shared {
    id: usize,
    policy: WritePolicy,
    state: Mutex<State>,
    readable: Condvar,
    writable: Condvar,
    readers: AtomicUsize,
    writers: AtomicUsize,
}

impl Shared {
    /// Bangunkan semua waiter agar mereka mengecek flag cancel.
    ///
    /// Lock diambil dulu: waiter yang belum tidur pasti melihat flag,
    /// waiter yang sudah tidur pasti menerima notify.
    pub(crate) fn interrupt(&self) {
        let _state = self.state.lock();
        log::debug!("channel {}: interrupting blocked callers", self.id);
        self.readable.notify_all();
        self.writable.notify_all();
    }
}

/// Which side of the monitor a caller is waiting on.
#[derive(Clone, Copy)]
enum Side {
    Reader,
    Writer,
}

/// Cloneable handle to one bounded byte channel.
///
/// Clones share the same buffer; storage is released when the last clone drops.
#[derive(Clone)]
pub struct SynchronizedChannel {
    shared: Arc<Shared>,
}

impl SynchronizedChannel {
    /// Create a channel. Capacity must be > 1 (one sentinel byte).
    pub fn new(config: ChannelConfig) -> Result<Self> {
        Self::with_id(0, config)
    }

    /// Create a channel with an id used in log output.
    pub fn with_id(id: usize, config: ChannelConfig) -> Result<Self> {
        let ring = RingBuffer::with_capacity(config.capacity)?;
        log::debug!(
            "channel {}: created (capacity {}, policy {:?})",
            id,
            config.capacity,
            config.write_policy
        );

        Ok(Self {
            shared: Arc::new(Shared {
                id,
                policy: config.write_policy,
                state: Mutex::new(State {
                    ring,
                    bytes_written: 0,
                    bytes_read: 0,
                }),
                readable: Condvar::new(),
                writable: Condvar::new(),
                readers: AtomicUsize::new(0),
                writers: AtomicUsize::new(0),
            }),
        })
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.shared.id
    }

    #[inline]
    pub fn write_policy(&self) -> WritePolicy {
        self.shared.policy
    }

    /// Read up to `out.len()` bytes, waiting while the buffer is empty.
    pub fn read(&self, out: &mut [u8], wait: Wait) -> Result<usize> {
        self.read_inner(out, wait, None)
    }

    /// Like [`read`](Self::read), returning `Interrupted` if `cancel` fires
    /// while suspended.
    pub fn read_interruptible(
        &self,
        out: &mut [u8],
        wait: Wait,
        cancel: &CancelToken,
    ) -> Result<usize> {
        self.read_inner(out, wait, Some(cancel))
    }

    /// Read up to `max_bytes` into a freshly allocated vector.
    pub fn read_vec(&self, max_bytes: usize, wait: Wait) -> Result<Vec<u8>> {
        let mut out = vec![0u8; max_bytes];
        let n = self.read(&mut out, wait)?;
        out.truncate(n);
        Ok(out)
    }

    /// Write `data`, waiting for space according to the channel's policy.
    ///
    /// `WritePolicy::Whole` tunggu sampai seluruh `data` muat; payload yang
    /// melebihi usable capacity langsung `SizeExceeded`.
    /// `WritePolicy::Partial` tunggu selama buffer penuh, lalu tulis
    /// sebanyak yang muat.
    pub fn write(&self, data: &[u8], wait: Wait) -> Result<usize> {
        self.write_inner(data, wait, None)
    }

    /// Like [`write`](Self::write), returning `Interrupted` if `cancel` fires
    /// while suspended. Nothing is written in that case.
    pub fn write_interruptible(
        &self,
        data: &[u8],
        wait: Wait,
        cancel: &CancelToken,
    ) -> Result<usize> {
        self.write_inner(data, wait, Some(cancel))
    }

    fn read_inner(&self, out: &mut [u8], wait: Wait, cancel: Option<&CancelToken>) -> Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        let deadline = wait.deadline();
        let mut state = self.shared.state.lock();
        let mut parked: Option<Parked<'_>> = None;

        while state.ring.is_empty() {
            if let Some(token) = cancel {
                // Daftar ulang: cancel() sebelumnya sudah mengosongkan daftar token
                drop(parked.take());
                parked = Some(token.park(&self.shared));
            }
            self.suspend(&mut state, Side::Reader, wait, deadline, cancel)?;
        }

        let n = state.ring.read(out);
        state.bytes_read += n as u64;
        drop(state);
        drop(parked);

        self.shared.writable.notify_all();
        log::trace!("channel {}: read {} bytes", self.shared.id, n);
        Ok(n)
    }

    fn write_inner(&self, data: &[u8], wait: Wait, cancel: Option<&CancelToken>) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let deadline = wait.deadline();
        let mut state = self.shared.state.lock();
        let mut parked: Option<Parked<'_>> = None;

        loop {
            // Dihitung ulang tiap iterasi: resize bisa mengubah capacity saat kita tidur
            let required = match self.shared.policy {
                WritePolicy::Whole => {
                    let usable = state.ring.usable_capacity();
                    if data.len() > usable {
                        return Err(PipeError::SizeExceeded {
                            requested: data.len(),
                            usable,
                        });
                    }
                    data.len()
                }
                WritePolicy::Partial => 1,
            };

            if state.ring.capacity_free() >= required {
                break;
            }

            if let Some(token) = cancel {
                // Daftar ulang: cancel() sebelumnya sudah mengosongkan daftar token
                drop(parked.take());
                parked = Some(token.park(&self.shared));
            }
            self.suspend(&mut state, Side::Writer, wait, deadline, cancel)?;
        }

        let n = state.ring.write(data);
        state.bytes_written += n as u64;
        drop(state);
        drop(parked);

        self.shared.readable.notify_all();
        log::trace!("channel {}: wrote {} bytes", self.shared.id, n);
        Ok(n)
    }

    /// Tidur satu kali di condvar sisi `side`.
    ///
    /// Returns `Ok(())` setelah bangun (caller wajib re-check kondisi), atau
    /// error jika call tidak boleh/lagi menunggu.
    fn suspend(
        &self,
        state: &mut MutexGuard<'_, State>,
        side: Side,
        wait: Wait,
        deadline: Option<Instant>,
        cancel: Option<&CancelToken>,
    ) -> Result<()> {
        if wait.is_non_blocking() {
            return Err(PipeError::WouldBlock);
        }
        if cancel.is_some_and(CancelToken::is_cancelled) {
            log::debug!("channel {}: wait interrupted", self.shared.id);
            return Err(PipeError::Interrupted);
        }

        let condvar = match side {
            Side::Reader => &self.shared.readable,
            Side::Writer => &self.shared.writable,
        };

        match deadline {
            Some(deadline) => {
                if Instant::now() >= deadline {
                    return Err(PipeError::TimedOut);
                }
                condvar.wait_until(state, deadline);
            }
            None => {
                log::debug!(
                    "channel {}: {} going to sleep (used {}, free {})",
                    self.shared.id,
                    match side {
                        Side::Reader => "reader",
                        Side::Writer => "writer",
                    },
                    state.ring.used(),
                    state.ring.capacity_free()
                );
                condvar.wait(state);
            }
        }
        Ok(())
    }

    /// Free bytes available to writers.
    pub fn free_space(&self) -> usize {
        self.shared.state.lock().ring.capacity_free()
    }

    /// Bytes buffered and not yet read: `capacity - 1 - free_space`.
    pub fn used_space(&self) -> usize {
        self.shared.state.lock().ring.used()
    }

    /// Total allocation size, sentinel included.
    pub fn capacity(&self) -> usize {
        self.shared.state.lock().ring.capacity()
    }

    pub fn usable_capacity(&self) -> usize {
        self.shared.state.lock().ring.usable_capacity()
    }

    /// Migrate the buffer to `new_capacity` bytes under the channel lock.
    ///
    /// Reader/writer lain melihat state lama atau state baru yang sudah
    /// lengkap, tidak pernah campuran. Ditolak jika `new_capacity <= used`.
    pub fn resize(&self, new_capacity: usize) -> Result<()> {
        let mut state = self.shared.state.lock();
        let old = state.ring.capacity();

        if let Err(e) = state.ring.resize(new_capacity) {
            log::warn!("channel {}: resize {} -> {} rejected: {}", self.shared.id, old, new_capacity, e);
            return Err(e);
        }
        drop(state);

        log::info!("channel {}: resized {} -> {} bytes", self.shared.id, old, new_capacity);
        // Capacity berubah: writer yang menunggu (atau yang kini SizeExceeded) harus re-check
        self.shared.writable.notify_all();
        Ok(())
    }

    /// Resize several distinct channels as one step.
    ///
    /// Lock semua channel diambil berurutan sesuai slice. Tidak ada channel
    /// yang berubah kecuali semuanya lolos cek dan semua alokasi berhasil.
    pub(crate) fn resize_group(channels: &[SynchronizedChannel], new_capacity: usize) -> Result<()> {
        let mut states: Vec<MutexGuard<'_, State>> =
            channels.iter().map(|ch| ch.shared.state.lock()).collect();

        for (ch, state) in channels.iter().zip(&states) {
            if let Err(e) = state.ring.check_resize(new_capacity) {
                log::warn!("channel {}: resize to {} rejected: {}", ch.shared.id, new_capacity, e);
                return Err(e);
            }
        }

        let storages = states
            .iter()
            .map(|_| Storage::allocate(new_capacity))
            .collect::<Result<Vec<_>>>()?;
        for (state, storage) in states.iter_mut().zip(storages) {
            state.ring.install(storage);
        }
        drop(states);

        for ch in channels {
            ch.shared.writable.notify_all();
        }
        log::info!("{} channels resized to {} bytes", channels.len(), new_capacity);
        Ok(())
    }

    /// Discard buffered bytes and reset both cursors.
    pub fn clear(&self) {
        self.shared.state.lock().ring.clear();
        self.shared.writable.notify_all();
    }

    /// Tear the channel handle down: buffered bytes are dropped and the
    /// storage is released once no other handle refers to it.
    ///
    /// Caller must ensure no transfer is in flight on this channel.
    pub fn destroy(self) {
        self.shared.state.lock().ring.clear();
        log::debug!(
            "channel {}: destroyed ({} handles left)",
            self.shared.id,
            Arc::strong_count(&self.shared) - 1
        );
    }

    pub fn stats(&self) -> ChannelStats {
        let state = self.shared.state.lock();
        ChannelStats {
            capacity: state.ring.capacity(),
            used: state.ring.used(),
            free: state.ring.capacity_free(),
            readers: self.readers(),
            writers: self.writers(),
            bytes_written: state.bytes_written,
            bytes_read: state.bytes_read,
        }
    }

    /// Readers currently attached through endpoint handles.
    pub fn readers(&self) -> usize {
        self.shared.readers.load(Ordering::Acquire)
    }

    pub fn writers(&self) -> usize {
        self.shared.writers.load(Ordering::Acquire)
    }

    pub(crate) fn attach_reader(&self) {
        self.shared.readers.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn detach_reader(&self) {
        let _ = self
            .shared
            .readers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    pub(crate) fn attach_writer(&self) {
        self.shared.writers.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn detach_writer(&self) {
        let _ = self
            .shared
            .writers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    /// `true` if both handles refer to the same underlying channel.
    pub fn same_channel(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl std::fmt::Debug for SynchronizedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynchronizedChannel")
            .field("id", &self.shared.id)
            .field("policy", &self.shared.policy)
            .finish_non_exhaustive()
    }
}
