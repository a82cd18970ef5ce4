//! Byte Ring Buffer dengan sentinel slot
//!
//! Cursor berupa offset `[0, capacity)` ke dalam storage, bukan pointer.
//! Satu byte selalu dicadangkan sebagai sentinel:
//! - `read_pos == write_pos` berarti KOSONG, tidak pernah penuh
//! - Penuh jika memajukan `write_pos` satu byte akan menyamai `read_pos`
//! - Usable capacity = `capacity - 1`
//!
//! Tidak ada sinkronisasi di sini. Caller (channel) wajib men-serialize akses.

use super::Storage;
use crate::error::{PipeError, Result};

/// Circular byte buffer with explicit modulo cursor arithmetic.
#[derive(Debug)]
pub struct RingBuffer {
    storage: Storage,
    capacity: usize,
    read_pos: usize,
    write_pos: usize,
}

impl RingBuffer {
    /// Membuat ring buffer dengan total alokasi `capacity` bytes.
    ///
    /// Returns `InvalidCapacity` jika `capacity < 2` (harus ada minimal satu
    /// byte usable selain sentinel), atau `OutOfMemory` jika map gagal.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(PipeError::InvalidCapacity(capacity));
        }

        Ok(Self {
            storage: Storage::allocate(capacity)?,
            capacity,
            read_pos: 0,
            write_pos: 0,
        })
    }

    /// Total allocation size, sentinel included.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that fit into an empty buffer.
    #[inline(always)]
    pub fn usable_capacity(&self) -> usize {
        self.capacity - 1
    }

    /// Free bytes yang bisa ditulis tanpa menimpa data belum terbaca.
    #[inline(always)]
    pub fn capacity_free(&self) -> usize {
        if self.read_pos == self.write_pos {
            return self.capacity - 1;
        }
        // read_pos != write_pos, jadi read_pos + capacity - write_pos >= 1
        (self.read_pos + self.capacity - self.write_pos - 1) % self.capacity
    }

    /// Bytes written and not yet consumed.
    #[inline(always)]
    pub fn used(&self) -> usize {
        (self.write_pos + self.capacity - self.read_pos) % self.capacity
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.read_pos == self.write_pos
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.capacity_free() == 0
    }

    /// Copy sebanyak mungkin dari `data`, maksimal `capacity_free()` bytes.
    ///
    /// Copy dipecah menjadi maksimal dua segmen jika melewati akhir storage.
    /// Returns jumlah byte yang ditulis; partial write adalah hal normal.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.capacity_free());
        if n == 0 {
            return 0;
        }

        let start = self.write_pos;
        let first = n.min(self.capacity - start);
        let storage = self.storage.as_mut_slice();

        storage[start..start + first].copy_from_slice(&data[..first]);
        if first < n {
            // Wraparound ke offset 0
            storage[..n - first].copy_from_slice(&data[first..n]);
        }

        self.write_pos = (start + n) % self.capacity;
        n
    }

    /// Copy sampai `out.len()` bytes keluar dari buffer.
    ///
    /// Hanya membaca region `[read_pos, write_pos)` sehingga tidak pernah
    /// menyentuh byte yang belum ditulis.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.used());
        if n == 0 {
            return 0;
        }

        let (head, tail) = self.readable_segments();
        let first = n.min(head.len());
        out[..first].copy_from_slice(&head[..first]);
        if first < n {
            out[first..n].copy_from_slice(&tail[..n - first]);
        }

        self.read_pos = (self.read_pos + n) % self.capacity;
        n
    }

    /// Buffered content as (up to) two contiguous slices, oldest first.
    pub fn readable_segments(&self) -> (&[u8], &[u8]) {
        let storage = self.storage.as_slice();
        if self.read_pos <= self.write_pos {
            (&storage[self.read_pos..self.write_pos], &storage[..0])
        } else {
            (&storage[self.read_pos..], &storage[..self.write_pos])
        }
    }

    /// Pindahkan isi buffer ke alokasi baru berukuran `new_capacity`.
    ///
    /// Data yang masih tersimpan di-copy berurutan mulai offset 0, lalu
    /// `read_pos = 0` dan `write_pos = used`. Alokasi lama dilepas setelah
    /// alokasi baru terpasang. Jika gagal, buffer tidak berubah sama sekali.
    pub fn resize(&mut self, new_capacity: usize) -> Result<()> {
        self.check_resize(new_capacity)?;
        let storage = Storage::allocate(new_capacity)?;
        self.install(storage);
        Ok(())
    }

    /// Validate a resize without touching the buffer.
    ///
    /// Urutan cek: shrink di bawah data tersimpan dulu, baru capacity < 2.
    pub fn check_resize(&self, new_capacity: usize) -> Result<()> {
        let used = self.used();
        if new_capacity <= used {
            return Err(PipeError::WouldShrinkBelowUsedData {
                requested: new_capacity,
                used,
            });
        }
        if new_capacity < 2 {
            return Err(PipeError::InvalidCapacity(new_capacity));
        }
        Ok(())
    }

    /// Linearise the content into `storage` and adopt it.
    ///
    /// `storage` harus sudah lolos `check_resize` untuk panjangnya.
    pub(crate) fn install(&mut self, mut storage: Storage) {
        let used = self.used();
        debug_assert!(storage.len() > used);
        {
            let (head, tail) = self.readable_segments();
            let dst = storage.as_mut_slice();
            dst[..head.len()].copy_from_slice(head);
            dst[head.len()..used].copy_from_slice(tail);
        }

        // Storage lama di-drop di sini, setelah storage baru terpasang
        self.capacity = storage.len();
        self.storage = storage;
        self.read_pos = 0;
        self.write_pos = used;
    }

    /// Drop all buffered bytes and reset both cursors.
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }
}
