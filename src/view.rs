//! Scoped memory-mapped views over file handles.
//!
//! A [`MemoryView`] maps `len` bytes of a file descriptor, read-only or
//! read-write, and unmaps them exactly once: either through the fallible
//! [`MemoryView::close`] or, failing that, when the view is dropped. A failed
//! unmap during drop is never propagated. It is logged with `tracing` and
//! counted in [`release_failures`].
//!
//! The mapping does not keep the descriptor alive; the caller may close the
//! handle once [`MemoryView::acquire`] returns. A length past the end of the
//! file is refused with `InvalidArgument` at acquire time. The file must not
//! be truncated below `len` while the view is alive; touching pages past the
//! end of the file raises `SIGBUS`.

use std::ffi::c_void;
use std::num::NonZeroUsize;
use std::os::fd::BorrowedFd;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use nix::sys::mman::{mmap, msync, munmap, MapFlags, MsFlags, ProtFlags};
use nix::sys::stat::fstat;

use crate::error::{CompressError, Result};

// ── Process-wide bookkeeping ─────────────────────────────────────────────────

/// Number of views currently mapped.
static OUTSTANDING_VIEWS: AtomicUsize = AtomicUsize::new(0);

/// Number of unmap failures swallowed during drop.
static RELEASE_FAILURES: AtomicUsize = AtomicUsize::new(0);

/// Views acquired and not yet released, across the whole process.
pub fn outstanding_views() -> usize {
    OUTSTANDING_VIEWS.load(Ordering::SeqCst)
}

/// Unmap failures that happened during teardown and could not be returned.
pub fn release_failures() -> usize {
    RELEASE_FAILURES.load(Ordering::SeqCst)
}

/// Record an unmap failure that is not handed back to the caller.
pub(crate) fn note_release_failure(error: &CompressError) {
    RELEASE_FAILURES.fetch_add(1, Ordering::SeqCst);
    tracing::warn!(error = %error, "view release failed during teardown");
}

// ── MemoryView ───────────────────────────────────────────────────────────────

/// Access mode of a [`MemoryView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Read,
    Write,
}

impl ViewMode {
    fn map_operation(self) -> &'static str {
        match self {
            ViewMode::Read => "Failed to Map Input View",
            ViewMode::Write => "Failed to Map Output View",
        }
    }

    fn unmap_operation(self) -> &'static str {
        match self {
            ViewMode::Read => "Failed to Unmap Input View",
            ViewMode::Write => "Failed to Unmap Output View",
        }
    }
}

/// Exclusively-owned mapping of a byte range.
#[derive(Debug)]
pub struct MemoryView {
    addr: NonNull<c_void>,
    len: usize,
    mode: ViewMode,
    released: bool,
}

// SAFETY: the mapping is owned by exactly one `MemoryView` and is not tied to
// the thread that created it. Mutation goes through `&mut self`.
unsafe impl Send for MemoryView {}

impl MemoryView {
    /// Map the first `len` bytes of `fd` with `MAP_SHARED`.
    ///
    /// `ViewMode::Write` needs a descriptor opened read-write. `len` must be
    /// between 1 and the current size of the file.
    pub fn acquire(fd: BorrowedFd<'_>, len: usize, mode: ViewMode) -> Result<Self> {
        let length = NonZeroUsize::new(len)
            .ok_or_else(|| CompressError::invalid("view length must be at least 1"))?;
        let stat = fstat(fd).map_err(|errno| CompressError::os(mode.map_operation(), errno))?;
        let file_len = u64::try_from(stat.st_size).unwrap_or(0);
        if len as u64 > file_len {
            return Err(CompressError::invalid(format!(
                "view length {} exceeds file size {}",
                len, file_len
            )));
        }
        let prot = match mode {
            ViewMode::Read => ProtFlags::PROT_READ,
            ViewMode::Write => ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
        };

        // SAFETY: we request a fresh mapping (no fixed address), so no existing
        // memory is replaced. `fd` is borrowed for the duration of the call and
        // the mapping stays valid after the descriptor is closed.
        let addr = unsafe { mmap(None, length, prot, MapFlags::MAP_SHARED, fd, 0) }
            .map_err(|errno| CompressError::os(mode.map_operation(), errno))?;

        OUTSTANDING_VIEWS.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(len, ?mode, "view mapped");
        Ok(MemoryView {
            addr,
            len,
            mode,
            released: false,
        })
    }

    /// Address and length of the mapping.
    pub fn get(&self) -> (NonNull<u8>, usize) {
        (self.addr.cast(), self.len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `addr` points to `len` mapped, readable bytes until release,
        // and release consumes or drops `self`.
        unsafe { std::slice::from_raw_parts(self.addr.as_ptr() as *const u8, self.len) }
    }

    /// Writable access; fails for read-only views.
    pub fn as_mut_slice(&mut self) -> Result<&mut [u8]> {
        if self.mode != ViewMode::Write {
            return Err(CompressError::invalid("view is mapped read-only"));
        }
        // SAFETY: as in `as_slice`, plus the mapping is writable and `&mut self`
        // guarantees exclusive access.
        Ok(unsafe { std::slice::from_raw_parts_mut(self.addr.as_ptr() as *mut u8, self.len) })
    }

    /// Write dirty pages back to the file (`msync(MS_SYNC)`).
    pub fn flush(&self) -> Result<()> {
        if self.mode != ViewMode::Write {
            return Ok(());
        }
        // SAFETY: `addr`/`len` describe a live mapping owned by `self`.
        unsafe { msync(self.addr, self.len, MsFlags::MS_SYNC) }
            .map_err(|errno| CompressError::os("Failed to Flush Output View", errno))
    }

    /// Unmap now, reporting failure to the caller.
    pub fn close(mut self) -> Result<()> {
        self.unmap()
    }

    fn unmap(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        OUTSTANDING_VIEWS.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(len = self.len, mode = ?self.mode, "view released");
        // SAFETY: the mapping was created by `acquire` with this address and
        // length, and `released` guarantees it is unmapped once.
        unsafe { munmap(self.addr, self.len) }
            .map_err(|errno| CompressError::os(self.mode.unmap_operation(), errno))
    }
}

impl Drop for MemoryView {
    fn drop(&mut self) {
        if let Err(e) = self.unmap() {
            note_release_failure(&e);
        }
    }
}
