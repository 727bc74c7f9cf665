// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::hash::Hasher;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Types that can feed a deterministic byte representation of themselves into a hasher.
///
/// Unlike [`std::hash::Hash`], implementations must only use [`Hasher::write`] with explicitly
/// encoded bytes (integers big-endian), so the resulting hash code does not depend on the
/// platform or the std version and can be persisted or shared between processes.
pub trait Hashable {
    fn hash_into<H: Hasher>(&self, state: &mut H);
}

impl<T: Hashable> Hashable for [T] {
    fn hash_into<H: Hasher>(&self, state: &mut H) {
        for item in self {
            item.hash_into(state);
        }
    }
}

/// 64-bit FNV-1a.
#[derive(Clone, Copy, Debug)]
pub struct Fnv64a(u64);

impl Default for Fnv64a {
    fn default() -> Self {
        Fnv64a(FNV_OFFSET_BASIS)
    }
}

impl Hasher for Fnv64a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}

/// Computes the stable hash code of `value` using [`Fnv64a`].
pub fn hash_code<T: Hashable + ?Sized>(value: &T) -> u64 {
    let mut hasher = Fnv64a::default();
    value.hash_into(&mut hasher);
    hasher.finish()
}

/// Writes a length-prefixed byte string, so adjacent fields cannot run into each other.
pub(crate) fn write_bytes<H: Hasher>(state: &mut H, bytes: &[u8]) {
    state.write(&(bytes.len() as u64).to_be_bytes());
    state.write(bytes);
}
