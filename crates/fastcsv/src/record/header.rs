//! Header names declared by a record type.
//!
//! The names come from the type alone, never from a value: [`declared_headers`]
//! drives `T::deserialize` with a deserializer that hands out placeholder
//! values and remembers which struct field every column belongs to. So an
//! empty document still gets its header, and `None` or an empty `Vec` in the
//! first record does not shrink it.

use serde::de::{
    self, Deserialize, DeserializeSeed, SeqAccess, Visitor,
    value::{BorrowedStrDeserializer, StringDeserializer},
};

use crate::{
    error::{CsvError, Result},
    primitive::Date,
};

/// Returns the header line `T` declares, one name per column.
///
/// - `Option<T>` counts as `T`
/// - a `Vec<T>` counts as one element
/// - columns outside any named field get an empty name
///
/// `None` when no column belongs to a named struct field (tuples, scalars).
/// Fails when a leaf type rejects its placeholder value, or when the type
/// nests deeper than `max_depth`.
pub fn declared_headers<T: Deserialize<'static>>(max_depth: usize) -> Result<Option<Vec<&'static str>>> {
    let mut probe = HeaderProbe { names: Vec::new(), field: None, depth: 0, max_depth };
    T::deserialize(&mut probe)?;
    Ok(probe.finish())
}

struct HeaderProbe {
    names: Vec<Option<&'static str>>,
    /// Struct field currently being walked.
    field: Option<&'static str>,
    depth: usize,
    max_depth: usize,
}

impl HeaderProbe {
    fn column(&mut self) {
        self.names.push(self.field);
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(CsvError::RecursionLimit { limit: self.max_depth });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn finish(self) -> Option<Vec<&'static str>> {
        if !self.names.iter().any(Option::is_some) {
            return None;
        }
        Some(self.names.into_iter().map(Option::unwrap_or_default).collect())
    }
}

macro_rules! placeholder {
    ($($method:ident => $visit:ident($($value:expr)?)),* $(,)?) => {
        $(
            fn $method<V: Visitor<'static>>(self, visitor: V) -> Result<V::Value> {
                self.column();
                visitor.$visit($($value)?)
            }
        )*
    };
}

impl de::Deserializer<'static> for &mut HeaderProbe {
    type Error = CsvError;

    placeholder! {
        deserialize_any => visit_borrowed_str(""),
        deserialize_bool => visit_bool(false),
        deserialize_i8 => visit_i8(0),
        deserialize_i16 => visit_i16(0),
        deserialize_i32 => visit_i32(0),
        deserialize_i64 => visit_i64(0),
        deserialize_i128 => visit_i128(0),
        deserialize_u8 => visit_u8(0),
        deserialize_u16 => visit_u16(0),
        deserialize_u32 => visit_u32(0),
        deserialize_u64 => visit_u64(0),
        deserialize_u128 => visit_u128(0),
        deserialize_f32 => visit_f32(0.0),
        deserialize_f64 => visit_f64(0.0),
        deserialize_char => visit_char(' '),
        deserialize_str => visit_borrowed_str(""),
        deserialize_string => visit_borrowed_str(""),
        deserialize_bytes => visit_borrowed_bytes(b""),
        deserialize_byte_buf => visit_borrowed_bytes(b""),
        deserialize_identifier => visit_borrowed_str(""),
        deserialize_unit => visit_unit(),
        deserialize_ignored_any => visit_unit(),
    }

    fn deserialize_option<V: Visitor<'static>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_unit_struct<V: Visitor<'static>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    /// [`Date`] rejects an empty placeholder, so it gets a real date instead.
    fn deserialize_newtype_struct<V: Visitor<'static>>(self, name: &'static str, visitor: V) -> Result<V::Value> {
        if name == Date::SERDE_NAME {
            self.column();
            return visitor.visit_newtype_struct(StringDeserializer::<CsvError>::new(Date::UNIX_EPOCH.to_string()));
        }
        self.nested(|probe| visitor.visit_newtype_struct(probe))
    }

    fn deserialize_seq<V: Visitor<'static>>(self, visitor: V) -> Result<V::Value> {
        self.nested(|probe| visitor.visit_seq(Placeholders { probe, remaining: 1, fields: None, index: 0 }))
    }

    fn deserialize_tuple<V: Visitor<'static>>(self, len: usize, visitor: V) -> Result<V::Value> {
        self.nested(|probe| visitor.visit_seq(Placeholders { probe, remaining: len, fields: None, index: 0 }))
    }

    fn deserialize_tuple_struct<V: Visitor<'static>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'static>>(self, _visitor: V) -> Result<V::Value> {
        Err(CsvError::UnsupportedType("map"))
    }

    fn deserialize_struct<V: Visitor<'static>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.nested(|probe| {
            visitor.visit_seq(Placeholders { probe, remaining: fields.len(), fields: Some(fields), index: 0 })
        })
    }

    fn deserialize_enum<V: Visitor<'static>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let variant = variants.first().copied().ok_or(CsvError::UnsupportedType("enum without variants"))?;
        self.column();
        visitor.visit_enum(BorrowedStrDeserializer::<CsvError>::new(variant))
    }
}

/// Placeholder elements for structs, tuples and sequences.
struct Placeholders<'a> {
    probe: &'a mut HeaderProbe,
    remaining: usize,
    /// Field names when walking a struct.
    fields: Option<&'static [&'static str]>,
    index: usize,
}

impl SeqAccess<'static> for Placeholders<'_> {
    type Error = CsvError;

    fn next_element_seed<T: DeserializeSeed<'static>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        let outer = self.probe.field;
        if let Some(fields) = self.fields {
            self.probe.field = fields.get(self.index).copied();
        }
        self.index += 1;

        let value = seed.deserialize(&mut *self.probe);
        self.probe.field = outer;
        value.map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use serde::Deserialize;

    use super::*;
    use crate::primitive::Precision;

    fn headers<T: Deserialize<'static>>() -> Option<Vec<&'static str>> {
        declared_headers::<T>(64).unwrap()
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    #[serde(rename_all = "UPPERCASE")]
    enum Side {
        Buy,
        Sell,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Order {
        id: u64,
        #[serde(rename = "where")]
        at: Option<Point>,
        side: Side,
        range: (u8, u8),
        placed: Date,
        price: Precision<2>,
        name: &'static str,
        tags: Vec<String>,
    }

    #[test]
    fn test_names_follow_the_type_not_a_value() {
        assert_eq!(
            headers::<Order>().unwrap(),
            vec!["id", "x", "y", "side", "range", "range", "placed", "price", "name", "tags"]
        );
    }

    #[test]
    fn test_tuples_and_scalars_declare_nothing() {
        assert_eq!(headers::<(u32, String)>(), None);
        assert_eq!(headers::<Vec<String>>(), None);
        assert_eq!(headers::<i64>(), None);
    }

    #[test]
    fn test_unnamed_columns_get_empty_names() {
        assert_eq!(headers::<(u32, Point)>().unwrap(), vec!["", "x", "y"]);
    }

    #[test]
    fn test_nested_vec_of_structs_counts_one_element() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Path {
            label: String,
            points: Vec<Point>,
        }

        assert_eq!(headers::<Path>().unwrap(), vec!["label", "x", "y"]);
    }

    #[test]
    fn test_leaf_rejecting_placeholder_fails() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Host {
            name: String,
            addr: Ipv4Addr,
        }

        assert!(declared_headers::<Host>(64).is_err());
    }

    #[test]
    fn test_recursive_type_hits_depth_limit() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Chain {
            next: Option<Box<Chain>>,
        }

        assert!(matches!(declared_headers::<Chain>(64), Err(CsvError::RecursionLimit { limit: 64 })));
    }

    #[test]
    fn test_maps_are_rejected() {
        assert!(matches!(
            declared_headers::<std::collections::BTreeMap<String, i32>>(64),
            Err(CsvError::UnsupportedType("map"))
        ));
    }
}
