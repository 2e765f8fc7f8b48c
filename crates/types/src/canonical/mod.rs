//! Deterministic JSON encoding.
//!
//! Any [`Serialize`] value can be canonicalized. Two values that are
//! semantically equal encode to identical bytes, regardless of the order in
//! which their map keys were inserted:
//!
//! - object keys are sorted by byte order, recursively
//! - numbers use the ECMAScript number formatting rules
//! - no insignificant whitespace is emitted
//!
//! Values without a deterministic representation are rejected instead of
//! being encoded lossily: non-finite floats, absent values ([`None`]) and raw
//! byte strings fail with [`CanonicalError::NonCanonicalValue`]. Shapes that
//! are not plain JSON (data-carrying enum variants, non-string map keys,
//! 128-bit integers) fail with [`CanonicalError::UnsupportedValue`].

mod error;
pub use error::CanonicalError;

mod number;

use serde::ser::{self, Impossible, Serialize};
use std::collections::{btree_map::Entry, BTreeMap};

/// Serialize a value to its canonical JSON text.
pub fn to_canonical_string<T>(value: &T) -> Result<String, CanonicalError>
where
    T: Serialize + ?Sized,
{
    let node = value.serialize(NodeSerializer)?;
    let mut out = String::new();
    node.write_to(&mut out);
    Ok(out)
}

/// Serialize a value to its canonical JSON bytes.
pub fn to_canonical_vec<T>(value: &T) -> Result<Vec<u8>, CanonicalError>
where
    T: Serialize + ?Sized,
{
    to_canonical_string(value).map(String::into_bytes)
}

/// Intermediate tree. Objects are kept in a [`BTreeMap`] so keys come out
/// sorted.
#[derive(Debug)]
enum Node {
    Null,
    Bool(bool),
    Number(String),
    String(String),
    Array(Vec<Node>),
    Object(BTreeMap<String, Node>),
}

impl Node {
    fn write_to(&self, out: &mut String) {
        match self {
            Self::Null => out.push_str("null"),
            Self::Bool(true) => out.push_str("true"),
            Self::Bool(false) => out.push_str("false"),
            Self::Number(n) => out.push_str(n),
            Self::String(s) => write_string(s, out),
            Self::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_to(out);
                }
                out.push(']');
            }
            Self::Object(entries) => {
                out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_string(key, out);
                    out.push(':');
                    value.write_to(out);
                }
                out.push('}');
            }
        }
    }
}

/// Escape a string the way `JSON.stringify` does.
fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{20}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

struct NodeSerializer;

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = CanonicalError;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = Impossible<Node, CanonicalError>;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = Impossible<Node, CanonicalError>;

    fn serialize_bool(self, v: bool) -> Result<Node, CanonicalError> {
        Ok(Node::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Node, CanonicalError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<Node, CanonicalError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<Node, CanonicalError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<Node, CanonicalError> {
        Ok(Node::Number(v.to_string()))
    }

    fn serialize_i128(self, _v: i128) -> Result<Node, CanonicalError> {
        Err(CanonicalError::unsupported("128-bit integer"))
    }

    fn serialize_u8(self, v: u8) -> Result<Node, CanonicalError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<Node, CanonicalError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<Node, CanonicalError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<Node, CanonicalError> {
        Ok(Node::Number(v.to_string()))
    }

    fn serialize_u128(self, _v: u128) -> Result<Node, CanonicalError> {
        Err(CanonicalError::unsupported("128-bit integer"))
    }

    fn serialize_f32(self, v: f32) -> Result<Node, CanonicalError> {
        self.serialize_f64(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<Node, CanonicalError> {
        number::format_f64(v).map(Node::Number)
    }

    fn serialize_char(self, v: char) -> Result<Node, CanonicalError> {
        Ok(Node::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node, CanonicalError> {
        Ok(Node::String(v.to_owned()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Node, CanonicalError> {
        Err(CanonicalError::non_canonical("raw bytes must be text-encoded first"))
    }

    fn serialize_none(self) -> Result<Node, CanonicalError> {
        Err(CanonicalError::non_canonical("absent value"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node, CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node, CanonicalError> {
        Ok(Node::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node, CanonicalError> {
        Ok(Node::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node, CanonicalError> {
        Ok(Node::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node, CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Node, CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        Err(CanonicalError::unsupported(format!("enum variant {name}::{variant}")))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer, CanonicalError> {
        Ok(SeqSerializer { items: Vec::with_capacity(len.unwrap_or_default()) })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSerializer, CanonicalError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqSerializer, CanonicalError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, CanonicalError> {
        Err(CanonicalError::unsupported(format!("enum variant {name}::{variant}")))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer, CanonicalError> {
        Ok(MapSerializer::default())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<MapSerializer, CanonicalError> {
        Ok(MapSerializer::default())
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, CanonicalError> {
        Err(CanonicalError::unsupported(format!("enum variant {name}::{variant}")))
    }
}

struct SeqSerializer {
    items: Vec<Node>,
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = Node;
    type Error = CanonicalError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        let index = self.items.len();
        let node =
            value.serialize(NodeSerializer).map_err(|e| e.in_field(&format!("[{index}]")))?;
        self.items.push(node);
        Ok(())
    }

    fn end(self) -> Result<Node, CanonicalError> {
        Ok(Node::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = Node;
    type Error = CanonicalError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, CanonicalError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Node;
    type Error = CanonicalError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, CanonicalError> {
        ser::SerializeSeq::end(self)
    }
}

#[derive(Default)]
struct MapSerializer {
    entries: BTreeMap<String, Node>,
    next_key: Option<String>,
}

impl MapSerializer {
    fn insert<T>(&mut self, key: String, value: &T) -> Result<(), CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        let node = value.serialize(NodeSerializer).map_err(|e| e.in_field(&key))?;
        match self.entries.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(node);
                Ok(())
            }
            Entry::Occupied(entry) => {
                Err(CanonicalError::non_canonical(format!("duplicate key `{}`", entry.key())))
            }
        }
    }
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Node;
    type Error = CanonicalError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| CanonicalError::unsupported("map value without key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Node, CanonicalError> {
        Ok(Node::Object(self.entries))
    }
}

impl ser::SerializeStruct for MapSerializer {
    type Ok = Node;
    type Error = CanonicalError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<Node, CanonicalError> {
        Ok(Node::Object(self.entries))
    }
}

/// Map keys must be text.
struct KeySerializer;

fn key_error() -> CanonicalError {
    CanonicalError::unsupported("map keys must be strings")
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = CanonicalError;

    type SerializeSeq = Impossible<String, CanonicalError>;
    type SerializeTuple = Impossible<String, CanonicalError>;
    type SerializeTupleStruct = Impossible<String, CanonicalError>;
    type SerializeTupleVariant = Impossible<String, CanonicalError>;
    type SerializeMap = Impossible<String, CanonicalError>;
    type SerializeStruct = Impossible<String, CanonicalError>;
    type SerializeStructVariant = Impossible<String, CanonicalError>;

    fn serialize_str(self, v: &str) -> Result<String, CanonicalError> {
        Ok(v.to_owned())
    }

    fn serialize_char(self, v: char) -> Result<String, CanonicalError> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, CanonicalError> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_i8(self, _v: i8) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_i16(self, _v: i16) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_i32(self, _v: i32) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_i64(self, _v: i64) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_u8(self, _v: u8) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_u16(self, _v: u16) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_u32(self, _v: u32) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_u64(self, _v: u64) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_f32(self, _v: f32) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_f64(self, _v: f64) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_none(self) -> Result<String, CanonicalError> {
        Err(CanonicalError::non_canonical("absent map key"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<String, CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, CanonicalError> {
        Err(key_error())
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, CanonicalError>
    where
        T: Serialize + ?Sized,
    {
        Err(key_error())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, CanonicalError> {
        Err(key_error())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, CanonicalError> {
        Err(key_error())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, CanonicalError> {
        Err(key_error())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, CanonicalError> {
        Err(key_error())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, CanonicalError> {
        Err(key_error())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, CanonicalError> {
        Err(key_error())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, CanonicalError> {
        Err(key_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Serialize;
    use serde_json::json;
    use std::collections::HashMap;

    /// Serializes its pairs as a map, in the given order.
    struct Pairs<'a>(&'a [(String, i64)]);

    impl Serialize for Pairs<'_> {
        fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            use ser::SerializeMap;
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for (k, v) in self.0 {
                map.serialize_entry(k, v)?;
            }
            map.end()
        }
    }

    #[test]
    fn sorts_keys_recursively() {
        let value = json!({
            "zeta": { "b": 1, "a": [ { "y": true, "x": null } ] },
            "alpha": "text",
        });
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#"{"alpha":"text","zeta":{"a":[{"x":null,"y":true}],"b":1}}"#
        );
    }

    #[test]
    fn sorts_by_byte_order() {
        let value = json!({ "b": 0, "B": 0, "a": 0, "_": 0, "é": 0 });
        assert_eq!(to_canonical_string(&value).unwrap(), r#"{"B":0,"_":0,"a":0,"b":0,"é":0}"#);
    }

    #[test]
    fn escapes_like_json_stringify() {
        let value = json!({ "s": "quote\" slash\\ nl\n tab\t bell\u{07} uni\u{2028}é" });
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            "{\"s\":\"quote\\\" slash\\\\ nl\\n tab\\t bell\\u0007 uni\u{2028}é\"}"
        );
    }

    #[test]
    fn struct_fields_are_sorted() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            zed: u8,
            max_tokens: u32,
            temperature: f64,
        }

        let payload = Payload { zed: 1, max_tokens: 16, temperature: 1.0 };
        assert_eq!(
            to_canonical_string(&payload).unwrap(),
            r#"{"maxTokens":16,"temperature":1,"zed":1}"#
        );
    }

    #[test]
    fn rejects_absent_values() {
        #[derive(Serialize)]
        struct WithOption {
            present: u8,
            missing: Option<u8>,
        }

        let err = to_canonical_string(&WithOption { present: 1, missing: None }).unwrap_err();
        assert!(err.is_non_canonical());
        assert!(err.to_string().contains("`missing`"));

        let err = to_canonical_string(&vec![Some(1), None]).unwrap_err();
        assert!(err.is_non_canonical());
        assert!(err.to_string().contains("[1]"));

        // present optionals encode as their inner value
        assert_eq!(to_canonical_string(&Some(3u8)).unwrap(), "3");
    }

    #[test]
    fn rejects_non_finite_numbers() {
        let err = to_canonical_string(&[1.0, f64::NAN]).unwrap_err();
        assert!(err.is_non_canonical());

        let err = to_canonical_string(&HashMap::from([("t", f64::INFINITY)])).unwrap_err();
        assert!(err.is_non_canonical());
    }

    #[test]
    fn rejects_raw_bytes() {
        struct Raw;
        impl Serialize for Raw {
            fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_bytes(&[1, 2, 3])
            }
        }
        assert!(to_canonical_string(&Raw).unwrap_err().is_non_canonical());
    }

    #[test]
    fn rejects_unsupported_shapes() {
        #[derive(Serialize)]
        enum Shape {
            Unit,
            Newtype(u8),
            Struct { x: u8 },
        }

        assert_eq!(to_canonical_string(&Shape::Unit).unwrap(), r#""Unit""#);
        assert!(to_canonical_string(&Shape::Newtype(1)).unwrap_err().is_unsupported());
        assert!(to_canonical_string(&Shape::Struct { x: 1 }).unwrap_err().is_unsupported());
        assert!(to_canonical_string(&HashMap::from([(1u8, 2u8)])).unwrap_err().is_unsupported());
        assert!(to_canonical_string(&1u128).unwrap_err().is_unsupported());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let pairs = vec![("a".to_string(), 1), ("a".to_string(), 2)];
        assert!(to_canonical_string(&Pairs(&pairs)).unwrap_err().is_non_canonical());
    }

    #[test]
    fn scalars() {
        assert_eq!(to_canonical_string(&()).unwrap(), "null");
        assert_eq!(to_canonical_string(&false).unwrap(), "false");
        assert_eq!(to_canonical_string(&-42i32).unwrap(), "-42");
        assert_eq!(to_canonical_string(&u64::MAX).unwrap(), "18446744073709551615");
        assert_eq!(to_canonical_string(&0.2f64).unwrap(), "0.2");
        assert_eq!(to_canonical_string(&'x').unwrap(), r#""x""#);
        assert_eq!(to_canonical_vec("hi").unwrap(), b"\"hi\"".to_vec());
    }

    fn unique_pairs() -> impl Strategy<Value = Vec<(String, i64)>> {
        prop::collection::btree_map("[ -~]{0,12}", any::<i64>(), 0..16)
            .prop_map(|map| map.into_iter().collect())
    }

    proptest! {
        #[test]
        fn key_order_does_not_matter(pairs in unique_pairs(), seed in any::<u64>()) {
            let mut shuffled = pairs.clone();
            // deterministic rotation + reversal driven by the seed
            if !shuffled.is_empty() {
                let by = (seed as usize) % shuffled.len();
                shuffled.rotate_left(by);
            }
            if seed % 2 == 0 {
                shuffled.reverse();
            }

            let a = to_canonical_string(&Pairs(&pairs)).unwrap();
            let b = to_canonical_string(&Pairs(&shuffled)).unwrap();
            prop_assert_eq!(&a, &b);

            // sorted, compact output agrees with serde_json for ints and text
            let sorted: BTreeMap<_, _> = pairs.iter().cloned().collect();
            prop_assert_eq!(a, serde_json::to_string(&sorted).unwrap());
        }

        #[test]
        fn canonicalization_is_deterministic(
            s in ".*",
            n in any::<i64>(),
            f in -1e300f64..1e300f64,
        ) {
            let value = json!({ "s": s, "n": n, "f": f, "list": [n, f] });
            let first = to_canonical_string(&value).unwrap();
            let second = to_canonical_string(&value).unwrap();
            prop_assert_eq!(&first, &second);

            // canonical output is valid JSON that parses back to the same value
            let reparsed: serde_json::Value = serde_json::from_str(&first).unwrap();
            prop_assert_eq!(to_canonical_string(&reparsed).unwrap(), first);
        }
    }
}
