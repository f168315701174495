// Copyright (c) 2018 Aleksandr Bezobchuk
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! The seeded hash family used to derive bit positions.
//!
//! Every `(item, seed)` pair maps to one 32-bit digest. The digest is keyed
//! SipHash-1-3 over the item's bytes followed by the seed, so the same pair
//! hashes identically across runs, processes and platforms.
use std::hash::Hasher;

use siphasher::sip::SipHasher13;

/// Key used for SipHash.
const HASHER_KEY: [u8; 16] = [
    136, 168, 28, 251, 141, 239, 69, 38, 166, 209, 98, 201, 2, 169, 146, 170,
];

/// Hash `item` under the given seed.
///
/// The seed is appended to the message as four little-endian bytes. The
/// first four bytes of the big-endian SipHash output form the digest.
pub fn digest(item: &[u8], seed: u32) -> u32 {
    let mut sip = SipHasher13::new_with_key(&HASHER_KEY);

    sip.write(item);
    sip.write(&seed.to_le_bytes());

    let out = sip.finish().to_be_bytes();

    u32::from_be_bytes([out[0], out[1], out[2], out[3]])
}
