//!
//! Rights algebra for veil-core.
//! Defines the core bit flags an actor can hold over a resource and the
//! helper functions for their manipulation and validation.

use crate::types::RightsMask; // RightsMask is u32

/// Core rights bit flags (bits 0-3 defined, 4-15 reserved).
pub mod core {
    use super::RightsMask;

    /// Permission to observe a resource through the query gateway.
    pub const READ: RightsMask = 1 << 0; // 0b0001
    /// Permission to mutate a resource's ordinary fields. Implies `READ`.
    pub const WRITE: RightsMask = 1 << 1; // 0b0010
    /// Permission to grant or revoke access-list entries. Implies `READ`.
    pub const SHARE: RightsMask = 1 << 2; // 0b0100
    /// Permission to change a resource's visibility flag. Implies `WRITE` and `SHARE`.
    pub const ADMIN: RightsMask = 1 << 3; // 0b1000

    // Bits 4-15 are reserved and must be zero for now.
    // Bits 16-31 are for host-application extensions; ignored by core checks
    // but preserved.
}

/// Canonicalizes a rights mask by adding any implied rights.
///
/// `ADMIN` implies `WRITE` and `SHARE`; `WRITE` and `SHARE` each imply `READ`.
#[inline]
pub fn canonicalise(mask: RightsMask) -> RightsMask {
    let mut m = mask;
    if (m & core::ADMIN) == core::ADMIN {
        m |= core::WRITE | core::SHARE;
    }
    if (m & core::WRITE) == core::WRITE {
        m |= core::READ;
    }
    if (m & core::SHARE) == core::SHARE {
        m |= core::READ;
    }
    m
}

/// Checks if a given `RightsMask` (`have`) satisfies a required `RightsMask`
/// (`need`): `(canonicalise(have) & need) == need`.
#[inline]
pub fn sufficient(have: RightsMask, need: RightsMask) -> bool {
    let canonical_have = canonicalise(have);
    (canonical_have & need) == need
}
