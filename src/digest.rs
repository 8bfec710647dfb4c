//! Hash strategies: deterministic key digests.
//!
//! `ChainHashMap` does not use `std::hash::Hash`/`BuildHasher`; bucket
//! placement must be stable across runs so that traversal order (which is
//! bucket-then-chain order) is reproducible. Keys instead implement
//! [`Digest`], which maps a key to a `u64`. Two families are built in:
//! a bit-mixing digest for the primitive integers and a djb2 rolling hash
//! for strings. Hashing never fails; an unsupported key type is a
//! trait-bound error at compile time.

/// A deterministic digest over a key.
///
/// Implementations must agree with `Eq`: equal keys produce equal digests.
/// Borrowed forms used for lookup must also agree with the owned form
/// (`String` and `str` share one implementation for this reason).
pub trait Digest {
    /// The unsigned digest of `self`. Bucket index is `digest % bucket_count`.
    fn digest(&self) -> u64;
}

// Odd multiplier keeps the map `x -> x * M (mod 2^64)` a bijection.
const INT_MIX: u64 = 0xf_883a_77ab;

/// djb2 seed. Non-zero so the empty string does not digest to 0.
const STR_SEED: u64 = 5381;

macro_rules! impl_digest_for_int {
    ($($t:ty),* $(,)?) => {$(
        impl Digest for $t {
            #[inline]
            fn digest(&self) -> u64 {
                // Spread the low bits upward, mix, then fold the high half
                // back down so low-entropy keys do not cluster in one bucket.
                let spread = (*self as u64).wrapping_shl(16);
                let mixed = spread.wrapping_mul(INT_MIX);
                mixed ^ (mixed >> 32)
            }
        }
    )*};
}

impl_digest_for_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl Digest for str {
    #[inline]
    fn digest(&self) -> u64 {
        let mut h = STR_SEED;
        for b in self.bytes() {
            // h * 33 + b
            h = h.wrapping_shl(5).wrapping_add(h).wrapping_add(b as u64);
        }
        h
    }
}

impl Digest for String {
    #[inline]
    fn digest(&self) -> u64 {
        self.as_str().digest()
    }
}

impl<T: Digest + ?Sized> Digest for &T {
    #[inline]
    fn digest(&self) -> u64 {
        (**self).digest()
    }
}
