//! Constant-time credential comparison.

use subtle::{Choice, ConstantTimeEq};

/// Compare two byte strings without leaking where they first differ.
///
/// A length mismatch returns `false` straight away: the length of the
/// supplied credential is already visible to the caller, the position of the
/// first differing byte is not.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    ct_eq_choice(a, b).into()
}

/// Same as [`constant_time_eq`], but returns a [`Choice`] so several
/// comparisons can be folded together without branching.
pub fn ct_eq_choice(a: &[u8], b: &[u8]) -> Choice {
    a.ct_eq(b)
}
