//! Canonical signing string.
//!
//! Every non-null entry becomes `key=value`; the pairs are sorted as whole
//! strings (not by key) and joined with `&`. With keys `a` and `a-b` the
//! pair `a-b=...` sorts first because `-` < `=`.

use crate::compat::{scalar_literal, to_compact_json};
use crate::{RequestParameters, Result};

/// Build the canonical string for `params`.
///
/// Scalars use their literal form; arrays and objects are compact JSON.
/// The result does not depend on insertion order.
///
/// # Errors
///
/// Returns `SealError::Serialization` if a composite value cannot be
/// written as JSON.
///
/// # Example
///
/// ```
/// use sealkit_lib::{canonicalize, RequestParameters};
///
/// let params = RequestParameters::try_from(serde_json::json!({"b": "2", "a": "1"}))?;
/// assert_eq!(canonicalize(&params)?, "a=1&b=2");
/// # Ok::<(), sealkit_lib::SealError>(())
/// ```
pub fn canonicalize(params: &RequestParameters) -> Result<String> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params.iter() {
        if value.is_null() {
            continue;
        }
        let rendered = match scalar_literal(value) {
            Some(literal) => literal,
            None => to_compact_json(value)?,
        };
        pairs.push(format!("{}={}", key, rendered));
    }
    pairs.sort_unstable();
    Ok(pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> RequestParameters {
        RequestParameters::try_from(value).unwrap()
    }

    #[test]
    fn test_order_independent() {
        let ab = canonicalize(&params(json!({"b": "2", "a": "1"}))).unwrap();
        let ba = canonicalize(&params(json!({"a": "1", "b": "2"}))).unwrap();
        assert_eq!(ab, "a=1&b=2");
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_sorts_by_full_pair() {
        let canonical = canonicalize(&params(json!({"a": "1", "a-b": "2"}))).unwrap();
        assert_eq!(canonical, "a-b=2&a=1");
    }

    #[test]
    fn test_nulls_skipped() {
        let canonical = canonicalize(&params(json!({"a": null, "b": "x"}))).unwrap();
        assert_eq!(canonical, "b=x");
    }

    #[test]
    fn test_composite_values_are_compact_json() {
        let canonical = canonicalize(&params(json!({
            "list": [1, "two", null],
            "obj": {"k": "值", "n": true},
        })))
        .unwrap();
        assert_eq!(
            canonical,
            r#"list=[1,"two",null]&obj={"k":"\u503c","n":true}"#
        );
    }

    #[test]
    fn test_scalar_rendering() {
        let canonical = canonicalize(&params(json!({
            "flag": true,
            "n": 42,
            "s": "",
        })))
        .unwrap();
        assert_eq!(canonical, "flag=True&n=42&s=");
    }

    #[test]
    fn test_float_rendering() {
        let canonical = canonicalize(&params(json!({
            "a": 1e-5,
            "b": 1e16,
            "c": [2.5e-7],
            "d": 0.0001,
        })))
        .unwrap();
        assert_eq!(canonical, "a=1e-05&b=1e+16&c=[2.5e-07]&d=0.0001");
    }

    #[test]
    fn test_empty() {
        assert_eq!(canonicalize(&RequestParameters::new()).unwrap(), "");
    }
}
