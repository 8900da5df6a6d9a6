//! Identifier space arithmetic.
//!
//! Every peer is assigned an identifier by hashing its socket address with
//! SHA-256 and reducing modulo 2^m, where `m` is a network-wide constant
//! (§6 of the design: the reduction must match byte-for-byte to interoperate,
//! so the input string is exactly `"<ip>:<port>"`, nothing more).
//!
//! Reducing a 256 bit digest modulo a power of two only depends on the low
//! `m` bits of the digest, so no big-integer arithmetic is needed: we read
//! the last eight bytes of the digest as a big-endian `u64` and mask off the
//! bits above `m`. This holds for any `m <= 64`, which comfortably covers
//! every value this protocol is run with in practice.

use ring::digest;

/// A point on the identifier circle, and the unit everything in this crate
/// navigates by. Negative values are reserved for the "empty" sentinel used
/// by [`crate::peer::PeerHandle`].
///
/// [`crate::peer::PeerHandle`]: ../peer/struct.PeerHandle.html
pub type Id = i64;

/// Hashes `addr` (expected to be a `"host:port"` string) into the identifier
/// space `[0, 2^m)`.
///
/// # Panics
///
/// Panics if `m` is 0 or greater than 63; both are configuration errors, not
/// states a running node should ever reach.
pub fn hash_id(addr: &str, m: u32) -> Id {
    assert!(m > 0 && m < 64, "m must be in 1..64, got {}", m);

    let digest = digest::digest(&digest::SHA256, addr.as_bytes());
    let bytes = digest.as_ref();
    let tail = &bytes[bytes.len() - 8..];

    let mut raw = 0u64;
    for &b in tail {
        raw = (raw << 8) | u64::from(b);
    }

    let mask = (1u64 << m) - 1;
    (raw & mask) as Id
}

/// Reduces `x` into `[0, 2^m)`, wrapping as many times as necessary in
/// either direction. Used whenever arc endpoints are computed with `+1` or
/// `-1` and might step outside the space.
pub fn modulo(x: Id, m: u32) -> Id {
    let n = 1i64 << m;
    ((x % n) + n) % n
}

/// Is `x` in the clockwise arc `[a, b]` on the `2^m`-identifier circle?
///
/// All arcs in the protocol are half-open `(a, b]`; callers that want that
/// form pass `a + 1 mod 2^m` as `a` here. `x < 0` (the empty-peer sentinel)
/// is never considered a member of any arc.
pub fn belongs_to(x: Id, a: Id, b: Id) -> bool {
    if x < 0 {
        return false;
    }

    if a <= b {
        a <= x && x <= b
    } else {
        x >= a || x <= b
    }
}
