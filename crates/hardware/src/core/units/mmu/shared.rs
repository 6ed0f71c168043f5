//! Shared Translation Cache.
//!
//! A [`Tlb`] that several CPU threads consult. Lookups and translations take the read
//! lock; fills and invalidations take the write lock, so an invalidation is never observed
//! half-applied.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{AccessType, Exception, PhysAddr, VirtAddr};
use crate::core::arch::mode::PrivilegeLevel;

use super::tlb::{Tlb, TlbEntry, TlbHit, TlbStats};

/// Cloneable handle to a TLB shared between CPUs.
#[derive(Clone, Debug)]
pub struct SharedTlb {
    inner: Arc<RwLock<Tlb>>,
}

impl SharedTlb {
    /// Creates an empty shared TLB.
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self::from_tlb(Tlb::new(capacity, seed))
    }

    /// Wraps an existing TLB.
    pub fn from_tlb(tlb: Tlb) -> Self {
        Self { inner: Arc::new(RwLock::new(tlb)) }
    }

    /// See [`Tlb::lookup`].
    ///
    /// # Errors
    ///
    /// Returns `Exception::TlbRefill` on a miss.
    pub fn lookup(&self, asid: u16, va: u64) -> Result<TlbHit, Exception> {
        self.inner.read().lookup(asid, va)
    }

    /// See [`Tlb::probe`].
    pub fn probe(&self, asid: u16, va: u64) -> Option<usize> {
        self.inner.read().probe(asid, va)
    }

    /// See [`Tlb::translate`].
    ///
    /// # Errors
    ///
    /// Returns the translation fault.
    pub fn translate(
        &self,
        asid: u16,
        va: VirtAddr,
        access: AccessType,
        plv: PrivilegeLevel,
    ) -> Result<PhysAddr, Exception> {
        self.inner.read().translate(asid, va, access, plv)
    }

    /// See [`Tlb::fill`].
    pub fn fill(&self, entry: TlbEntry) -> usize {
        self.inner.write().fill(entry)
    }

    /// See [`Tlb::invalidate_page`].
    pub fn invalidate_page(&self, asid: u16, va: u64) {
        self.inner.write().invalidate_page(asid, va);
    }

    /// See [`Tlb::invalidate_asid`].
    pub fn invalidate_asid(&self, asid: u16) {
        self.inner.write().invalidate_asid(asid);
    }

    /// See [`Tlb::invalidate_global`].
    pub fn invalidate_global(&self) {
        self.inner.write().invalidate_global();
    }

    /// See [`Tlb::invalidate_all`].
    pub fn invalidate_all(&self) {
        self.inner.write().invalidate_all();
    }

    /// Runs `f` with exclusive access to the TLB.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Tlb) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> TlbStats {
        self.inner.read().stats()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
