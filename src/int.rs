use core::num::NonZeroUsize;

/// An extension trait that adds routines to the `u32` primitive type.
pub(crate) trait U32 {
    fn as_usize(self) -> usize;
}

impl U32 for u32 {
    fn as_usize(self) -> usize {
        // OK because we require 32 or 64 bit targets. Therefore, every u32
        // necessarily fits into a usize.
        self as usize
    }
}

/// A `usize` that can never be `usize::MAX`.
///
/// Capture slots are stored as `Option<NonMaxUsize>`, which has the same size
/// as a plain `usize`. Haystack offsets never reach `usize::MAX` since slice
/// lengths always fit into an `isize`.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(transparent)]
pub(crate) struct NonMaxUsize(NonZeroUsize);

impl NonMaxUsize {
    /// Create a new `NonMaxUsize` from the given value.
    ///
    /// This returns `None` only when the given value is equal to `usize::MAX`.
    pub(crate) fn new(value: usize) -> Option<NonMaxUsize> {
        NonZeroUsize::new(value.wrapping_add(1)).map(NonMaxUsize)
    }

    /// Return the underlying `usize` value. The returned value is guaranteed
    /// to not equal `usize::MAX`.
    pub(crate) fn get(self) -> usize {
        self.0.get().wrapping_sub(1)
    }
}

impl core::fmt::Debug for NonMaxUsize {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:?}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_max_roundtrip() {
        assert_eq!(0, NonMaxUsize::new(0).unwrap().get());
        assert_eq!(17, NonMaxUsize::new(17).unwrap().get());
        assert_eq!(None, NonMaxUsize::new(usize::MAX));
    }
}
