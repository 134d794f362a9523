//! OPACK2 encoder.
//!
//! Type-tagged binary encoding used inside XPC frames. Scalar number bodies
//! are little-endian; string and bytes length headers are big-endian.
//! Containers switch from a small length-tagged form to a variable
//! sentinel-terminated form above their small-form capacity.

use crate::value::Value;
use devicepair_core::OpackError;

/// Largest integer the wire format can represent exactly (2^53 - 1).
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Small-form capacity of arrays and upper tag of strings/bytes short form.
const SMALL_STRING_MAX: usize = 0x20;

/// Encode a value to OPACK2 bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, OpackError> {
    let mut out = Vec::new();
    encode_value(value, &mut out)?;
    Ok(out)
}

fn encode_value(value: &Value, out: &mut Vec<u8>) -> Result<(), OpackError> {
    match value {
        Value::Null => out.push(0x03),
        Value::Bool(true) => out.push(0x01),
        Value::Bool(false) => out.push(0x02),
        Value::Integer(n) => encode_integer(*n, out)?,
        Value::Float(n) => encode_float(*n, out)?,
        Value::String(s) => encode_string(s, out)?,
        Value::Bytes(b) => encode_bytes(b, out)?,
        Value::Array(items) => {
            if items.len() <= 15 {
                out.push(0xD0 + items.len() as u8);
                for item in items {
                    encode_value(item, out)?;
                }
            } else {
                out.push(0xDF);
                for item in items {
                    encode_value(item, out)?;
                }
                out.push(0x03);
            }
        }
        Value::Dictionary(dict) => {
            // Intentional asymmetry with arrays: the small dictionary form
            // stops below 15 entries, not at 15.
            if dict.len() < 15 {
                out.push(0xE0 + dict.len() as u8);
                for (key, val) in dict.iter() {
                    encode_string(key, out)?;
                    encode_value(val, out)?;
                }
            } else {
                out.push(0xEF);
                for (key, val) in dict.iter() {
                    encode_string(key, out)?;
                    encode_value(val, out)?;
                }
                out.extend_from_slice(&[0x03, 0x03]);
            }
        }
    }
    Ok(())
}

/// Numbers dispatch on value, not variant: negative integers take the
/// float path, matching the single number type of the wire format.
fn encode_integer(value: i64, out: &mut Vec<u8>) -> Result<(), OpackError> {
    if value < 0 {
        encode_f32(value as f64, out);
        return Ok(());
    }
    encode_unsigned(value as u64, out)
}

fn encode_float(value: f64, out: &mut Vec<u8>) -> Result<(), OpackError> {
    if !value.is_finite() {
        return Err(OpackError::NonFiniteNumber);
    }
    if value >= 0.0 && value.fract() == 0.0 {
        // An integral non-negative float encodes as an integer.
        if value > MAX_SAFE_INTEGER as f64 {
            return Err(OpackError::IntegerTooLarge(value as u64));
        }
        return encode_unsigned(value as u64, out);
    }
    encode_f32(value, out);
    Ok(())
}

fn encode_unsigned(value: u64, out: &mut Vec<u8>) -> Result<(), OpackError> {
    if value <= 0x27 {
        out.push(0x08 + value as u8);
    } else if value <= 0xFF {
        out.push(0x30);
        out.push(value as u8);
    } else if value <= 0xFFFF_FFFF {
        out.push(0x32);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else if value <= MAX_SAFE_INTEGER {
        out.push(0x33);
        out.extend_from_slice(&value.to_le_bytes());
    } else {
        return Err(OpackError::IntegerTooLarge(value));
    }
    Ok(())
}

/// Non-integral and negative numbers are emitted as IEEE-754 single
/// precision regardless of precision loss; the peer owns this choice.
fn encode_f32(value: f64, out: &mut Vec<u8>) {
    out.push(0x35);
    out.extend_from_slice(&(value as f32).to_le_bytes());
}

fn encode_string(value: &str, out: &mut Vec<u8>) -> Result<(), OpackError> {
    encode_length_prefixed(value.as_bytes(), 0x40, [0x61, 0x62, 0x63], out)
}

fn encode_bytes(value: &[u8], out: &mut Vec<u8>) -> Result<(), OpackError> {
    encode_length_prefixed(value, 0x70, [0x91, 0x92, 0x93], out)
}

/// Shared header ladder for strings and byte buffers: a short form folding
/// the length into the tag, then 1-byte, 2-byte BE, and 4-byte BE lengths.
fn encode_length_prefixed(
    data: &[u8],
    short_base: u8,
    wide_tags: [u8; 3],
    out: &mut Vec<u8>,
) -> Result<(), OpackError> {
    let len = data.len();
    if len <= SMALL_STRING_MAX {
        out.push(short_base + len as u8);
    } else if len <= 0xFF {
        out.push(wide_tags[0]);
        out.push(len as u8);
    } else if len <= 0xFFFF {
        out.push(wide_tags[1]);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= 0xFFFF_FFFF {
        out.push(wide_tags[2]);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(OpackError::LengthOverflow(len));
    }
    out.extend_from_slice(data);
    Ok(())
}
