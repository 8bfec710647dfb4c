//! Debug-only exclusion guard.
//!
//! Map operations call user code (`Eq` comparisons, `Digest`, emplace
//! constructors) while chain links may be transiently inconsistent. The
//! guard catches accidental reentry from that user code: in debug builds a
//! nested `enter` panics; in release builds the guard compiles away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map exclusion flag. Guard public entry points with
/// `let _g = self.exclusion.enter();`.
#[derive(Debug, Default)]
pub(crate) struct DebugExclusion {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // The map is single-threaded; keep !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

impl DebugExclusion {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn enter(&self) -> Entered<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrant use of ChainHashMap from key or constructor code"
            );
            return Entered { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return Entered { _life: PhantomData };
        }
    }
}

/// RAII token returned by [`DebugExclusion::enter`].
pub(crate) struct Entered<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugExclusion,
    #[cfg(not(debug_assertions))]
    _life: PhantomData<&'a ()>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::DebugExclusion;

    #[test]
    fn sequential_entries_are_ok() {
        let x = DebugExclusion::new();
        drop(x.enter());
        drop(x.enter());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_in_debug() {
        let x = DebugExclusion::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = x.enter();
            let _inner = x.enter();
        }));
        assert!(res.is_err(), "nested entry must panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_noop_in_release() {
        let x = DebugExclusion::new();
        let _outer = x.enter();
        let _inner = x.enter();
    }
}
