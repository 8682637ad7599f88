//! Lenient integer decoding.
//!
//! Integer fields accept JSON integers and floats with no fractional part,
//! so `45` and `45.0` both decode to `45`. `45.5` is still rejected.

use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};

/// Decode an `i64`, accepting integral floats.
pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    deserializer.deserialize_any(IntegralVisitor)
}

struct IntegralVisitor;

impl Visitor<'_> for IntegralVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        // 2^63 is exactly representable; anything at or above it overflows.
        if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Ok(v as i64)
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn decode(value: Value) -> Result<i64, serde_json::Error> {
        deserialize(value)
    }

    #[rstest]
    #[case::integer(json!(45), 45)]
    #[case::negative(json!(-3), -3)]
    #[case::integral_float(json!(45.0), 45)]
    #[case::negative_zero(json!(-0.0), 0)]
    fn accepts(#[case] value: Value, #[case] expected: i64) {
        assert_eq!(decode(value).unwrap(), expected);
    }

    #[rstest]
    #[case::fractional(json!(45.5))]
    #[case::text(json!("45"))]
    #[case::too_large(json!(1e19))]
    #[case::boolean(json!(true))]
    fn rejects(#[case] value: Value) {
        assert!(decode(value).is_err());
    }
}
