//! Reference keystream for the FPGA ChaCha20 core
//!
//! The FPGA emits the first block of the RFC 8439 §2.3.2 block function
//! test (key 00..1f, nonce 000000090000004a00000000, counter 1). This
//! module holds that block and helpers for operator-supplied vectors.

use crate::error::{Result, VerifyError};
use hex_literal::hex;

/// Length of one ChaCha20 block in bytes
pub const KEYSTREAM_LEN: usize = 64;

/// RFC 8439 §2.3.2 serialized block
pub const EXPECTED_KEYSTREAM: [u8; KEYSTREAM_LEN] = hex!(
    "10f1e7e4d13b5915500fdd1fa32071c4"
    "c7d1f4c733c068030422aa9ac3d46c4e"
    "d2826446079faa0914c2d705d98b02a2"
    "b5129cd1de164eb9cbd083e8a2503c4e"
);

/// Parse a 64-byte vector from hex, ignoring whitespace
pub fn parse_vector(text: &str) -> Result<[u8; KEYSTREAM_LEN]> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(compact)?;

    <[u8; KEYSTREAM_LEN]>::try_from(bytes.as_slice()).map_err(|_| VerifyError::VectorLength {
        expected: KEYSTREAM_LEN,
        actual: bytes.len(),
    })
}

/// Lowercase hex with no separators
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
