// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The plug's XOR stream cipher.
//!
//! Every frame on the wire is a 4-byte prefix followed by the payload run
//! through an autokey XOR cipher seeded with `171`. Encoding feeds each
//! *output* byte into the key for the next one; decoding feeds each *input*
//! (ciphertext) byte. Both rules produce the same key stream, which is what
//! makes [`decode`] the inverse of [`encode`].
//!
//! # Examples
//!
//! ```
//! use hs100::protocol::cipher;
//!
//! let frame = cipher::encode(b"{}");
//! assert_eq!(frame, [0, 0, 0, 0, 0xd0, 0xad]);
//! assert_eq!(cipher::decode(&frame), b"{}");
//! ```

/// Initial key of every encode or decode run.
pub const INITIAL_KEY: u8 = 171;

/// Length of the frame prefix.
pub const PREFIX_LEN: usize = 4;

/// Encodes a payload into a frame.
///
/// The prefix is zero-filled. Empty input yields just the prefix.
#[must_use]
pub fn encode(plaintext: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(PREFIX_LEN + plaintext.len());
    frame.extend_from_slice(&[0; PREFIX_LEN]);

    let mut key = INITIAL_KEY;
    for &byte in plaintext {
        key ^= byte;
        frame.push(key);
    }
    frame
}

/// Decodes a frame into its payload.
///
/// The prefix is skipped without being checked; a frame shorter than the
/// prefix decodes to an empty payload.
#[must_use]
pub fn decode(frame: &[u8]) -> Vec<u8> {
    let ciphertext = frame.get(PREFIX_LEN..).unwrap_or_default();

    let mut key = INITIAL_KEY;
    ciphertext
        .iter()
        .map(|&byte| {
            let plain = key ^ byte;
            key = byte;
            plain
        })
        .collect()
}

/// Returns the big-endian length carried in the frame prefix, if present.
///
/// Decoding never relies on this value; it is only informational.
#[must_use]
pub fn declared_length(frame: &[u8]) -> Option<u32> {
    let prefix: [u8; PREFIX_LEN] = frame.get(..PREFIX_LEN)?.try_into().ok()?;
    Some(u32::from_be_bytes(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSINFO_QUERY: &[u8] = br#"{"system":{"get_sysinfo":null}}"#;

    #[test]
    fn encode_empty_is_prefix_only() {
        assert_eq!(encode(b""), [0, 0, 0, 0]);
    }

    #[test]
    fn decode_prefix_only_is_empty() {
        assert!(decode(&[0, 0, 0, 0]).is_empty());
    }

    #[test]
    fn decode_short_frame_is_empty() {
        assert!(decode(&[]).is_empty());
        assert!(decode(&[0, 0, 1]).is_empty());
    }

    #[test]
    fn encode_known_sysinfo_query() {
        let frame = encode(SYSINFO_QUERY);
        assert_eq!(frame.len(), 4 + SYSINFO_QUERY.len());
        assert_eq!(
            &frame[..16],
            [
                0x00, 0x00, 0x00, 0x00, 0xd0, 0xf2, 0x81, 0xf8, 0x8b, 0xff, 0x9a, 0xf7, 0xd5, 0xef,
                0x94, 0xb6
            ]
        );
        assert_eq!(frame.last(), Some(&0xeb));
    }

    #[test]
    fn decode_ignores_prefix_content() {
        let mut frame = encode(SYSINFO_QUERY);
        frame[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode(&frame), SYSINFO_QUERY);
    }

    #[test]
    fn decode_inverts_encode() {
        let all_bytes: Vec<u8> = (0..=255).collect();
        for payload in [SYSINFO_QUERY, b"a", all_bytes.as_slice()] {
            assert_eq!(decode(&encode(payload)), payload);
        }
    }

    #[test]
    fn key_update_differs_between_directions() {
        // Equal plaintext bytes produce different ciphertext bytes because
        // the key chains through the previous output.
        let frame = encode(b"aa");
        assert_ne!(frame[4], frame[5]);
        assert_eq!(frame[5], frame[4] ^ b'a');
    }

    #[test]
    fn declared_length_reads_big_endian_prefix() {
        assert_eq!(declared_length(&[0, 0, 1, 2, 9]), Some(258));
        assert_eq!(declared_length(&encode(b"xyz")), Some(0));
        assert_eq!(declared_length(&[0, 0]), None);
    }
}
