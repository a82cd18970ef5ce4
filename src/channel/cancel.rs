//! Cancellation untuk blocked read/write
//!
//! Token menyimpan daftar channel tempat holder sedang tidur. `cancel()`
//! menaikkan flag lalu, untuk setiap channel, mengambil lock channel sebelum
//! broadcast. Waiter mendaftar dan mengecek flag di bawah lock yang sama,
//! jadi tidak ada window di mana wakeup bisa hilang.
//!
//! `cancel()` mengosongkan daftar, jadi waiter mendaftar ulang setiap kali
//! akan tidur (token bisa di-`reset()` lalu di-cancel lagi).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::synchronized::Shared;

/// Cloneable cancellation handle for interruptible channel calls.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    next_ticket: AtomicU64,
    parked: Mutex<Vec<(u64, Weak<Shared>)>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every channel a holder is blocked on.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);

        // Ambil daftar dulu: lock token tidak boleh dipegang saat lock channel
        let parked = std::mem::take(&mut *self.inner.parked.lock());
        for shared in parked.iter().filter_map(|(_, w)| w.upgrade()) {
            shared.interrupt();
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused.
    pub fn reset(&self) {
        self.inner.cancelled.store(false, Ordering::SeqCst);
    }

    /// Register `shared` as a channel this token must wake on cancel.
    ///
    /// Dipanggil dengan lock channel dipegang, sebelum cek flag, pada setiap
    /// iterasi wait loop.
    pub(crate) fn park(&self, shared: &Arc<Shared>) -> Parked<'_> {
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        let mut parked = self.inner.parked.lock();
        parked.retain(|(_, w)| w.strong_count() > 0);
        parked.push((ticket, Arc::downgrade(shared)));
        Parked {
            token: self,
            ticket,
        }
    }

    /// Number of live registrations.
    #[cfg(test)]
    pub(crate) fn parked_len(&self) -> usize {
        self.inner.parked.lock().len()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Deregisters one wait from the token when it ends.
pub(crate) struct Parked<'a> {
    token: &'a CancelToken,
    ticket: u64,
}

impl Drop for Parked<'_> {
    fn drop(&mut self) {
        // Entry sudah hilang jika cancel() mengambil daftar lebih dulu
        let mut parked = self.token.inner.parked.lock();
        if let Some(pos) = parked.iter().position(|(t, _)| *t == self.ticket) {
            parked.swap_remove(pos);
        }
    }
}
