//! Debug-only reentrancy guard for table operations.
//!
//! Table methods call into user code (`K: Hash`, `K: Eq`) while a chain is
//! being walked or relinked. A key whose `Eq` calls back into the same table
//! would observe half-updated buckets, so in debug builds every guarded
//! operation records its name and a nested entry panics naming both sides.
//! In release builds the guard compiles to nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table tracker. Guard entry-points with `let _g = self.guard.enter("op");`.
#[derive(Debug)]
pub(crate) struct OpGuard {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // !Send + !Sync, matching the single-threaded table.
    _nosend: PhantomData<*mut ()>,
}

impl OpGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Marks `op` as running. Panics in debug builds if another operation is
    /// already running on the same table.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ActiveOp<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant call to `{op}` while `{outer}` is in progress");
            }
            self.active.set(Some(op));
            return ActiveOp { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return ActiveOp { _z: PhantomData };
        }
    }

    #[cfg(all(test, debug_assertions))]
    pub(crate) fn current(&self) -> Option<&'static str> {
        self.active.get()
    }
}

impl Default for OpGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII token returned by `OpGuard::enter`; clears the running op on drop.
pub(crate) struct ActiveOp<'a> {
    #[cfg(debug_assertions)]
    owner: &'a OpGuard,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ActiveOp<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
