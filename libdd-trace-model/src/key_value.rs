// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::hash::{write_bytes, Hashable};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Binary values longer than this are truncated by [`KeyValue::as_string`].
const MAX_BINARY_DISPLAY_LEN: usize = 256;

/// The type of a tag value. The declaration order is the order used when sorting tags sharing the
/// same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Bool,
    Int64,
    Float64,
    Binary,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::Int64 => "int64",
            ValueType::Float64 => "float64",
            ValueType::Binary => "binary",
        }
    }
}

impl From<ValueType> for u8 {
    fn from(value_type: ValueType) -> u8 {
        match value_type {
            ValueType::String => 0,
            ValueType::Bool => 1,
            ValueType::Int64 => 2,
            ValueType::Float64 => 3,
            ValueType::Binary => 4,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = ValueTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueType::String),
            "bool" => Ok(ValueType::Bool),
            "int64" => Ok(ValueType::Int64),
            "float64" => Ok(ValueType::Float64),
            "binary" => Ok(ValueType::Binary),
            _ => Err(ValueTypeParseError::new(format!("Invalid value type: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTypeParseError {
    pub message: String,
}

impl ValueTypeParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ValueTypeParseError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValueTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueTypeParseError: {}", self.message)
    }
}

impl std::error::Error for ValueTypeParseError {}

/// A typed tag value.
///
/// Values are totally ordered: first by [`ValueType`], then by the value itself. Floats use the
/// IEEE 754 total order, so two NaNs with the same bit pattern are equal and `-0.0 < 0.0`.
///
/// Non-finite floats are encoded as the strings `"NaN"`, `"+Inf"` and `"-Inf"`, since JSON has no
/// number for them. Every NaN decodes as [`f64::NAN`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    String(String),
    Bool(bool),
    Int64(i64),
    Float64(#[serde(with = "float64_value")] f64),
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Bool(_) => ValueType::Bool,
            Value::Int64(_) => ValueType::Int64,
            Value::Float64(_) => ValueType::Float64,
            Value::Binary(_) => ValueType::Binary,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
            (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
            _ => self.value_type().cmp(&other.value_type()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value_type().hash(state);
        match self {
            Value::String(v) => v.hash(state),
            Value::Bool(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Float64(v) => v.to_bits().hash(state),
            Value::Binary(v) => v.hash(state),
        }
    }
}

impl Hashable for Value {
    fn hash_into<H: Hasher>(&self, state: &mut H) {
        state.write(&[u8::from(self.value_type())]);
        match self {
            Value::String(v) => write_bytes(state, v.as_bytes()),
            Value::Bool(v) => state.write(&[u8::from(*v)]),
            Value::Int64(v) => state.write(&v.to_be_bytes()),
            Value::Float64(v) => state.write(&v.to_bits().to_be_bytes()),
            Value::Binary(v) => write_bytes(state, v),
        }
    }
}

/// A tag: a key and a typed value.
///
/// Tags sort by key, then value type, then value, which is the canonical order of
/// [`crate::Process`] tags.
/// ```
/// use libdd_trace_model::KeyValue;
///
/// let mut tags = vec![KeyValue::int64("retries", 3), KeyValue::string("env", "prod")];
/// tags.sort();
/// assert_eq!(tags[0].key, "env");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    #[serde(flatten)]
    pub value: Value,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        KeyValue {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn int64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int64(value))
    }

    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float64(value))
    }

    pub fn binary(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, Value::Binary(value.into()))
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    /// Renders the value as a human readable string. Binary values are hex encoded and cut after
    /// 256 bytes, with a trailing `...`.
    pub fn as_string(&self) -> String {
        match &self.value {
            Value::String(v) => v.clone(),
            Value::Bool(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float64(v) => v.to_string(),
            Value::Binary(v) if v.len() > MAX_BINARY_DISPLAY_LEN => {
                format!("{}...", hex::encode(&v[..MAX_BINARY_DISPLAY_LEN]))
            }
            Value::Binary(v) => hex::encode(v),
        }
    }
}

impl Hashable for KeyValue {
    fn hash_into<H: Hasher>(&self, state: &mut H) {
        write_bytes(state, self.key.as_bytes());
        self.value.hash_into(state);
    }
}

/// Helpers over a list of tags.
pub trait KeyValuesExt {
    /// Returns the first tag with the given key.
    fn find_by_key(&self, key: &str) -> Option<&KeyValue>;

    /// Whether the tags are in canonical order.
    fn is_canonical(&self) -> bool;
}

impl KeyValuesExt for [KeyValue] {
    fn find_by_key(&self, key: &str) -> Option<&KeyValue> {
        self.iter().find(|kv| kv.key == key)
    }

    fn is_canonical(&self) -> bool {
        self.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod float64_value {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    const NAN: &str = "NaN";
    const POS_INF: &str = "+Inf";
    const NEG_INF: &str = "-Inf";

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_str(POS_INF)
        } else if value.is_infinite() {
            serializer.serialize_str(NEG_INF)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    struct Float64Visitor;

    impl Visitor<'_> for Float64Visitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(
                formatter,
                "a number or one of \"{NAN}\", \"{POS_INF}\", \"{NEG_INF}\""
            )
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                NAN => Ok(f64::NAN),
                POS_INF => Ok(f64::INFINITY),
                NEG_INF => Ok(f64::NEG_INFINITY),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(Float64Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("string", ValueType::String)]
    #[test_case("bool", ValueType::Bool)]
    #[test_case("int64", ValueType::Int64)]
    #[test_case("float64", ValueType::Float64)]
    #[test_case("binary", ValueType::Binary)]
    fn value_type_from_str(input: &str, expected: ValueType) {
        assert_eq!(input.parse::<ValueType>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn value_type_from_str_invalid() {
        let err = "double".parse::<ValueType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "ValueTypeParseError: Invalid value type: double"
        );
    }

    #[test]
    fn sorts_by_key_then_type_then_value() {
        let mut tags = vec![
            KeyValue::int64("b", 2),
            KeyValue::string("b", "z"),
            KeyValue::int64("b", 1),
            KeyValue::bool("a", true),
            KeyValue::bool("a", false),
            KeyValue::float64("c", 1.5),
            KeyValue::binary("c", vec![0x01]),
        ];
        tags.sort();
        assert_eq!(
            tags,
            vec![
                KeyValue::bool("a", false),
                KeyValue::bool("a", true),
                KeyValue::string("b", "z"),
                KeyValue::int64("b", 1),
                KeyValue::int64("b", 2),
                KeyValue::float64("c", 1.5),
                KeyValue::binary("c", vec![0x01]),
            ]
        );
        assert!(tags.is_canonical());
    }

    #[test]
    fn equality_requires_same_type() {
        assert_ne!(KeyValue::string("k", "1"), KeyValue::int64("k", 1));
        assert_ne!(KeyValue::int64("k", 1), KeyValue::float64("k", 1.0));
        assert_eq!(KeyValue::int64("k", 1), KeyValue::int64("k", 1));
    }

    #[test]
    fn float_total_order() {
        assert_eq!(
            KeyValue::float64("k", f64::NAN),
            KeyValue::float64("k", f64::NAN)
        );
        assert!(KeyValue::float64("k", -0.0) < KeyValue::float64("k", 0.0));
        assert!(
            KeyValue::float64("k", f64::NEG_INFINITY) < KeyValue::float64("k", -1e300)
        );
    }

    #[test_case(KeyValue::string("k", "v"), "v")]
    #[test_case(KeyValue::bool("k", true), "true")]
    #[test_case(KeyValue::int64("k", -42), "-42")]
    #[test_case(KeyValue::float64("k", 72.5), "72.5")]
    #[test_case(KeyValue::binary("k", vec![0x42, 0x0a]), "420a")]
    fn as_string(kv: KeyValue, expected: &str) {
        assert_eq!(kv.as_string(), expected);
    }

    #[test]
    fn as_string_truncates_long_binary() {
        let kv = KeyValue::binary("k", vec![0xab; 300]);
        let rendered = kv.as_string();
        assert_eq!(rendered.len(), 2 * 256 + 3);
        assert!(rendered.ends_with("ab..."));
    }

    #[test]
    fn find_by_key_returns_first_match() {
        let tags = vec![
            KeyValue::string("a", "1"),
            KeyValue::string("b", "2"),
            KeyValue::string("b", "3"),
        ];
        assert_eq!(tags.find_by_key("b"), Some(&KeyValue::string("b", "2")));
        assert_eq!(tags.find_by_key("c"), None);
    }

    #[test]
    fn serialize_json() {
        let tags = vec![
            KeyValue::string("a", "b"),
            KeyValue::bool("ok", true),
            KeyValue::int64("n", 7),
            KeyValue::float64("f", 0.25),
            KeyValue::binary("bin", b"hi".to_vec()),
        ];
        let json = serde_json::to_value(&tags).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"key": "a", "type": "string", "value": "b"},
                {"key": "ok", "type": "bool", "value": true},
                {"key": "n", "type": "int64", "value": 7},
                {"key": "f", "type": "float64", "value": 0.25},
                {"key": "bin", "type": "binary", "value": "aGk="},
            ])
        );

        let decoded: Vec<KeyValue> = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, tags);
    }

    #[test_case(f64::NAN, "NaN"; "nan")]
    #[test_case(f64::INFINITY, "+Inf"; "positive infinity")]
    #[test_case(f64::NEG_INFINITY, "-Inf"; "negative infinity")]
    fn serialize_json_non_finite_float(value: f64, encoded: &str) {
        let kv = KeyValue::float64("ratio", value);
        let json = serde_json::to_value(&kv).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"key": "ratio", "type": "float64", "value": encoded})
        );

        let decoded: KeyValue = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, kv);
    }

    #[test]
    fn deserialize_float_from_integer() {
        let kv: KeyValue =
            serde_json::from_str(r#"{"key": "f", "type": "float64", "value": 3}"#).unwrap();
        assert_eq!(kv, KeyValue::float64("f", 3.0));
    }

    #[test]
    fn deserialize_rejects_unknown_float_string() {
        let result = serde_json::from_str::<KeyValue>(
            r#"{"key": "f", "type": "float64", "value": "Infinity"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_rejects_bad_base64() {
        let result = serde_json::from_str::<KeyValue>(
            r#"{"key": "bin", "type": "binary", "value": "not base64!"}"#,
        );
        assert!(result.is_err());
    }
}
