//! Key encoding for index entries.
//!
//! Every index table shares one keyspace. An entry key is
//! `esc(table) || 0x00 0x01 || esc(hash_value) || 0x00 0x01 || [0x01 || range]`,
//! where `esc` replaces each `0x00` byte with `0x00 0xFF` and `range` is the
//! order-preserving big-endian encoding of the range value. Entries without a
//! range value end right after the second terminator.

use crate::error::{Result, StoreError};

const ESCAPE: u8 = 0x00;
const ESCAPED_NUL: u8 = 0xFF;
const TERMINATOR: [u8; 2] = [0x00, 0x01];
const RANGE_TAG: u8 = 0x01;
const SIGN_BIT: u64 = 1u64 << 63;

/// Encode the key of the entry at `(table, hash_value, range_value)`.
///
/// Any byte string is accepted for the table name and hash value.
///
/// # Errors
///
/// Returns `StoreError::InvalidKey` if the table name is empty or the range
/// value is not finite.
pub fn entry_key(table: &str, hash_value: &str, range_value: Option<f64>) -> Result<Vec<u8>> {
    if table.is_empty() {
        return Err(StoreError::InvalidKey("empty table name".to_string()));
    }

    let mut key = Vec::with_capacity(table.len() + hash_value.len() + 13);
    push_component(&mut key, table.as_bytes());
    push_component(&mut key, hash_value.as_bytes());

    if let Some(range) = range_value {
        if !range.is_finite() {
            return Err(StoreError::InvalidKey(format!(
                "range value is not finite: {range}"
            )));
        }
        key.push(RANGE_TAG);
        key.extend_from_slice(&encode_f64_ordered(range));
    }

    Ok(key)
}

fn push_component(key: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        key.push(b);
        if b == ESCAPE {
            key.push(ESCAPED_NUL);
        }
    }
    key.extend_from_slice(&TERMINATOR);
}

/// Encode an `f64` so that byte order matches numeric order.
///
/// `-0.0` and `0.0` encode identically.
#[must_use]
pub fn encode_f64_ordered(value: f64) -> [u8; 8] {
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    let ordered = if bits & SIGN_BIT == 0 {
        bits ^ SIGN_BIT
    } else {
        !bits
    };
    ordered.to_be_bytes()
}

/// Inverse of [`encode_f64_ordered`].
#[must_use]
pub fn decode_f64_ordered(bytes: [u8; 8]) -> f64 {
    let ordered = u64::from_be_bytes(bytes);
    let bits = if ordered & SIGN_BIT == 0 {
        !ordered
    } else {
        ordered ^ SIGN_BIT
    };
    f64::from_bits(bits)
}
