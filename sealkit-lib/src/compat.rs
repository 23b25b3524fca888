//! Wire-compatibility quirks of the remote service.
//!
//! Everything in this module is dictated by the service we talk to and must
//! be reproduced bit-for-bit. None of it is a recommendation:
//!
//! | Item | Quirk |
//! |------|-------|
//! | [`ZERO_IV`] | AES-CBC with an all-zero IV on every request |
//! | [`SignatureMac`] | HMAC over MD5 |
//! | [`key_wrap_padding`] | RSA-OAEP with SHA-1 / MGF1-SHA-1 |
//! | [`to_compact_json`] | `,`/`:` separators, non-ASCII escaped as `\uXXXX` |
//! | [`scalar_literal`] | booleans rendered `True` / `False` in the signed string |
//! | [`float_repr`] | floats as `1e-05`, `0.0001`, `1e+16`, `100.0` |
//!
//! A protocol revision replaces this module; call sites only see the names.

use std::io;

use hmac::Hmac;
use md5::Md5;
use rsa::Oaep;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use sha1::Sha1;

use crate::{Result, SealError};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Initialization vector used for every payload.
pub const ZERO_IV: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

/// Keyed hash used for the `signature` field.
pub type SignatureMac = Hmac<Md5>;

/// Payload cipher (AES-128 in CBC mode).
pub type PayloadEncryptor = cbc::Encryptor<aes::Aes128>;

/// Inverse of [`PayloadEncryptor`].
pub type PayloadDecryptor = cbc::Decryptor<aes::Aes128>;

/// OAEP parameters expected by the service when unwrapping the key.
pub fn key_wrap_padding() -> Oaep {
    Oaep::new::<Sha1>()
}

/// Serialize to compact JSON the way the service's reference client does.
///
/// Object members keep their insertion order.
pub fn to_compact_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut out, AsciiCompactFormatter);
    value.serialize(&mut ser)?;
    // Every byte written by the formatter is ASCII.
    String::from_utf8(out).map_err(|e| SealError::Serialization(e.to_string()))
}

/// Literal form of a scalar inside the signed string.
///
/// Returns `None` for null and for composite values.
pub fn scalar_literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Number(n) if n.is_f64() => n.as_f64().map(float_repr),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Render a finite float the way the reference client's runtime prints it.
///
/// Shortest round-trip digits. Positional notation when the decimal
/// exponent is in `-4..16`, with a trailing `.0` for integral values;
/// scientific otherwise, with a signed exponent of at least two digits.
pub fn float_repr(value: f64) -> String {
    // `{:e}` yields the shortest round-trip digits as `d[.ddd]e<exp>`.
    let sci = format!("{:e}", value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exp: i32 = match exp.parse() {
        Ok(exp) => exp,
        Err(_) => return sci,
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let decpt = exp + 1;

    if (-3..=16).contains(&decpt) {
        let len = digits.len() as i32;
        let body = if decpt <= 0 {
            format!("0.{}{}", "0".repeat((-decpt) as usize), digits)
        } else if decpt < len {
            let (int, frac) = digits.split_at(decpt as usize);
            format!("{}.{}", int, frac)
        } else {
            format!("{}{}.0", digits, "0".repeat((decpt - len) as usize))
        };
        format!("{}{}", sign, body)
    } else {
        let (lead, rest) = digits.split_at(1);
        let exp_sign = if exp < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{}{}e{}{:02}", sign, lead, exp_sign, exp.abs())
        } else {
            format!("{}{}.{}e{}{:02}", sign, lead, rest, exp_sign, exp.abs())
        }
    }
}

/// Compact formatter that escapes everything outside printable ASCII.
struct AsciiCompactFormatter;

impl Formatter for AsciiCompactFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(float_repr(value).as_bytes())
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..idx].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compact_json_has_no_whitespace() {
        let value = json!({"a": [1, 2, {"b": null}], "c": "d e"});
        assert_eq!(
            to_compact_json(&value).unwrap(),
            r#"{"a":[1,2,{"b":null}],"c":"d e"}"#
        );
    }

    #[test]
    fn test_compact_json_escapes_non_ascii() {
        let value = json!({"名": "值", "a": [1, null, true, 1.5]});
        assert_eq!(
            to_compact_json(&value).unwrap(),
            r#"{"\u540d":"\u503c","a":[1,null,true,1.5]}"#
        );
    }

    #[test]
    fn test_compact_json_escapes_astral_as_surrogates() {
        let value = json!("😀");
        assert_eq!(to_compact_json(&value).unwrap(), r#""\ud83d\ude00""#);
    }

    #[test]
    fn test_compact_json_escapes_delete() {
        let value = json!("a\u{7f}b\n");
        assert_eq!(to_compact_json(&value).unwrap(), r#""a\u007fb\n""#);
    }

    #[test]
    fn test_scalar_literals() {
        assert_eq!(scalar_literal(&json!("APP")).as_deref(), Some("APP"));
        assert_eq!(scalar_literal(&json!(1)).as_deref(), Some("1"));
        assert_eq!(scalar_literal(&json!(-7)).as_deref(), Some("-7"));
        assert_eq!(scalar_literal(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(scalar_literal(&json!(true)).as_deref(), Some("True"));
        assert_eq!(scalar_literal(&json!(false)).as_deref(), Some("False"));
        assert_eq!(scalar_literal(&Value::Null), None);
        assert_eq!(scalar_literal(&json!([1])), None);
    }

    #[test]
    fn test_float_repr_matches_reference_runtime() {
        let cases: &[(f64, &str)] = &[
            (1.5, "1.5"),
            (0.1, "0.1"),
            (100.0, "100.0"),
            (-0.0, "-0.0"),
            (0.0001, "0.0001"),
            (1e-5, "1e-05"),
            (2.5e-7, "2.5e-07"),
            (-3.25e-10, "-3.25e-10"),
            (123456789.125, "123456789.125"),
            (1e15, "1000000000000000.0"),
            (1e16, "1e+16"),
            (1.5e300, "1.5e+300"),
        ];
        for (value, expected) in cases {
            assert_eq!(float_repr(*value), *expected, "repr of {:?}", value);
        }
    }

    #[test]
    fn test_compact_json_uses_float_repr() {
        let value = json!({"a": 1e-5, "b": [2.5e-7, 3], "c": 10.0});
        assert_eq!(
            to_compact_json(&value).unwrap(),
            r#"{"a":1e-05,"b":[2.5e-07,3],"c":10.0}"#
        );
    }

    #[test]
    fn test_zero_iv() {
        assert!(ZERO_IV.iter().all(|b| *b == 0));
        assert_eq!(ZERO_IV.len(), BLOCK_SIZE);
    }
}
