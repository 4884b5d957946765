use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::CodecError;

/// The identifier attached to a JSON-RPC message.
///
/// Every contract lookup, batch de-duplication check and response binding is
/// keyed off this type. `None` marks a notification (no response expected);
/// the empty string is a valid `String` identifier and is distinct from
/// `None`.
#[derive(Debug, Clone, Default)]
pub enum MessageId {
    #[default]
    None,
    String(String),
    Integer(i64),
    Float(f64),
}

impl MessageId {
    pub fn is_none(&self) -> bool {
        matches!(self, MessageId::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MessageId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MessageId::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MessageId::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extracts an identifier from the `id` member of a decoded message.
    ///
    /// `null` (or an absent member, passed in as `Value::Null`) maps to
    /// `None`. Numeric literals that fit a signed 64-bit integer become
    /// `Integer`; integer literals beyond that range are a structural error
    /// rather than a silent wrap. Fractional literals become `Float`. Any
    /// other JSON type is a structural error.
    pub fn from_json(node: &Value) -> Result<Self, CodecError> {
        match node {
            Value::Null => Ok(MessageId::None),
            Value::String(s) => Ok(MessageId::String(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(MessageId::Integer(i));
                }
                if n.as_u64().is_some() {
                    return Err(CodecError::Structural(format!(
                        "message id {n} overflows a signed 64-bit integer"
                    )));
                }
                match n.as_f64() {
                    Some(f) => Ok(MessageId::Float(f)),
                    None => Err(CodecError::Structural(format!(
                        "message id {n} is not a representable number"
                    ))),
                }
            }
            other => Err(CodecError::Structural(format!(
                "message id must be a string, number or null, got {}",
                crate::contract::json_kind(other)
            ))),
        }
    }

    /// Converts the identifier back to its wire value.
    pub fn to_json(&self) -> Value {
        match self {
            MessageId::None => Value::Null,
            MessageId::String(s) => Value::String(s.clone()),
            MessageId::Integer(n) => Value::from(*n),
            MessageId::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }

    // Cross-variant rank. Fixed rule table: None < String < Integer < Float.
    // Kept explicit instead of deriving from declaration order so the sort
    // behavior cannot change by reordering variants.
    fn rank(&self) -> u8 {
        match self {
            MessageId::None => 0,
            MessageId::String(_) => 1,
            MessageId::Integer(_) => 2,
            MessageId::Float(_) => 3,
        }
    }
}

impl PartialEq for MessageId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MessageId::None, MessageId::None) => true,
            (MessageId::String(a), MessageId::String(b)) => a == b,
            (MessageId::Integer(a), MessageId::Integer(b)) => a == b,
            // Bit equality, not approximate equality. Keeps Eq/Hash lawful.
            (MessageId::Float(a), MessageId::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for MessageId {}

impl Hash for MessageId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            MessageId::None => {}
            MessageId::String(s) => s.hash(state),
            MessageId::Integer(n) => n.hash(state),
            MessageId::Float(f) => f.to_bits().hash(state),
        }
    }
}

impl Ord for MessageId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MessageId::String(a), MessageId::String(b)) => a.cmp(b),
            (MessageId::Integer(a), MessageId::Integer(b)) => a.cmp(b),
            (MessageId::Float(a), MessageId::Float(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for MessageId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::None => Ok(()),
            MessageId::String(s) => write!(f, "{}", s),
            MessageId::Integer(n) => write!(f, "{}", n),
            // Shortest round-trippable decimal, but never without a
            // fractional digit so the value stays recognizably a float.
            MessageId::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            MessageId::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId::String(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        MessageId::String(s)
    }
}

impl From<i64> for MessageId {
    fn from(n: i64) -> Self {
        MessageId::Integer(n)
    }
}

impl From<f64> for MessageId {
    fn from(f: f64) -> Self {
        MessageId::Float(f)
    }
}

impl Serialize for MessageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MessageId::None => serializer.serialize_none(),
            MessageId::String(s) => serializer.serialize_str(s),
            MessageId::Integer(n) => serializer.serialize_i64(*n),
            MessageId::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

struct MessageIdVisitor;

impl<'de> Visitor<'de> for MessageIdVisitor {
    type Value = MessageId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, number or null message id")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(MessageId::None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(MessageId::None)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(MessageId::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(MessageId::String(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(MessageId::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(MessageId::Integer)
            .map_err(|_| E::custom(format!("message id {v} overflows a signed 64-bit integer")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(MessageId::Float(v))
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MessageIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cross_variant_order_is_fixed() {
        let none = MessageId::None;
        let string = MessageId::from("a");
        let integer = MessageId::from(5_i64);
        let float = MessageId::from(0.5_f64);

        assert!(none < string);
        assert!(string < integer);
        assert!(integer < float);
        // Transitivity across the whole chain.
        assert!(none < float);

        let mut ids = vec![float.clone(), integer.clone(), none.clone(), string.clone()];
        ids.sort();
        assert_eq!(ids, vec![none, string, integer, float]);
    }

    #[test]
    fn test_within_variant_natural_order() {
        assert!(MessageId::from("a") < MessageId::from("b"));
        assert!(MessageId::from(-3_i64) < MessageId::from(7_i64));
        assert!(MessageId::from(1.5_f64) < MessageId::from(2.5_f64));
        // A large integer still sorts below any float.
        assert!(MessageId::from(i64::MAX) < MessageId::from(0.0_f64));
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(MessageId::from(2.5_f64), MessageId::from(2.5_f64));
        assert_ne!(MessageId::from(0.0_f64), MessageId::from(-0.0_f64));
        assert_ne!(MessageId::from(2.5_f64), MessageId::Integer(2));
    }

    #[test]
    fn test_empty_string_is_distinct_from_none() {
        assert_ne!(MessageId::from(""), MessageId::None);
        assert!(!MessageId::from("").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(MessageId::None.to_string(), "");
        assert_eq!(MessageId::from("req-1").to_string(), "req-1");
        assert_eq!(MessageId::from(42_i64).to_string(), "42");
        assert_eq!(MessageId::from(2.5_f64).to_string(), "2.5");
        assert_eq!(MessageId::from(2.0_f64).to_string(), "2.0");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(MessageId::from_json(&json!(null)).unwrap(), MessageId::None);
        assert_eq!(
            MessageId::from_json(&json!("x")).unwrap(),
            MessageId::from("x")
        );
        assert_eq!(
            MessageId::from_json(&json!(17)).unwrap(),
            MessageId::Integer(17)
        );
        assert_eq!(
            MessageId::from_json(&json!(1.25)).unwrap(),
            MessageId::Float(1.25)
        );
        assert!(MessageId::from_json(&json!(true)).is_err());
        assert!(MessageId::from_json(&json!([1])).is_err());
        // u64 territory overflows the signed identifier space.
        assert!(MessageId::from_json(&json!(u64::MAX)).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        for id in [
            MessageId::None,
            MessageId::from("req"),
            MessageId::from(9_i64),
            MessageId::from(0.5_f64),
        ] {
            let text = serde_json::to_string(&id).unwrap();
            let back: MessageId = serde_json::from_str(&text).unwrap();
            assert_eq!(back, id);
        }
    }
}
