//! Deterministic object identifiers
//!
//! Every generated BICAN object is identified by `urn:bkbit:<sha256>` where the
//! digest covers the object's attributes, serialized in a fixed layout: keys
//! sorted, `", "` and `": "` separators, non-ASCII escaped as `\uXXXX`, floats
//! in shortest round-trip form. Identifiers published to the knowledge base
//! depend on this exact byte layout.

use crate::error::{BkbitError, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::io;

/// Prefix shared by every generated identifier
pub const OBJECT_ID_PREFIX: &str = "urn:bkbit:";

/// Build the identifier for an attribute object
pub fn generate_object_id(attributes: &Value) -> String {
    let normalized = normalized_json(attributes);
    let digest = Sha256::digest(normalized.as_bytes());
    format!("{}{}", OBJECT_ID_PREFIX, hex::encode(digest))
}

/// Hash the attribute map and store the result under `id`
pub fn assign_object_id(mut attributes: Map<String, Value>) -> Map<String, Value> {
    attributes.remove("id");
    let id = generate_object_id(&Value::Object(attributes.clone()));
    attributes.insert("id".to_string(), Value::String(id));
    attributes
}

/// Serialize a value, hash it, and return the id
pub fn object_id_of<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    if !value.is_object() {
        return Err(BkbitError::NotAnObject("object id".to_string()));
    }
    Ok(generate_object_id(&value))
}

/// Normalized text the identifier digest is computed over
pub fn normalized_json(value: &Value) -> String {
    let sorted = sort_keys(value);
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);
    // Writing a Value into a Vec cannot fail
    if sorted.serialize(&mut serializer).is_err() {
        return String::new();
    }
    // The formatter only ever emits ASCII
    String::from_utf8(buffer).unwrap_or_default()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k.clone(), sort_keys(v))).collect())
        },
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Compact-with-spaces JSON layout used for hashing
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        for ch in fragment.chars() {
            if ch.is_ascii() && ch != '\u{7f}' {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(float_text(value).as_bytes())
    }

    fn write_f32<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f32) -> io::Result<()> {
        writer.write_all(float_text(f64::from(value)).as_bytes())
    }
}

/// Shortest round-trip float text: always a fraction or exponent, `e+NN` exponents from 1e16
fn float_text(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut out = String::new();
    if negative {
        out.push('-');
    }

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                out.push_str(&digits);
                out.push_str(&"0".repeat(int_len - digits.len()));
                out.push_str(".0");
            } else {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            }
        } else {
            out.push_str("0.");
            out.push_str(&"0".repeat((-exponent - 1) as usize));
            out.push_str(&digits);
        }
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exponent.abs()));
    }
    out
}
