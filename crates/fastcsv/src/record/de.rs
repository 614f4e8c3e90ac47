//! Record Deserializer: reads one line of columns into a serde type.

use std::borrow::Cow;

use serde::de::{
    self, Deserialize, DeserializeSeed, SeqAccess, Visitor,
    value::{BorrowedStrDeserializer, StringDeserializer},
};

use crate::{
    dialect::QuoteMode,
    error::{CsvError, Result},
    primitive::{Primitive, decode_str},
    scanner::Scanner,
};

/// Decodes the current line of `scanner` into `T`.
///
/// The scanner is left on the first unconsumed column; moving to the next
/// line is up to the caller.
pub fn decode_record<'de, T: Deserialize<'de>>(scanner: &mut Scanner<'de>) -> Result<T> {
    let mut deserializer = RecordDeserializer::new(scanner);
    T::deserialize(&mut deserializer)
}

/// Column-by-column deserializer over a [`Scanner`].
pub struct RecordDeserializer<'de, 's> {
    scanner: &'s mut Scanner<'de>,
    depth: usize,
    /// Whether the last consumed column was followed by a delimiter.
    advanced: bool,
}

impl<'de, 's> RecordDeserializer<'de, 's> {
    pub fn new(scanner: &'s mut Scanner<'de>) -> Self {
        Self { scanner, depth: 0, advanced: false }
    }

    /// Consumes the current column, raw.
    ///
    /// Past the last column of a line this keeps yielding empty columns.
    fn next_column(&mut self) -> Result<&'de str> {
        if self.scanner.dialect().quote_mode == QuoteMode::Strict && self.scanner.current_column_unterminated() {
            return Err(CsvError::UnterminatedQuote { offset: self.scanner.column_offset() });
        }
        let column = self.scanner.current_column();
        self.advanced = self.scanner.advance_column();
        Ok(column)
    }

    /// Consumes the current column, unquoted.
    fn next_text(&mut self) -> Result<Cow<'de, str>> {
        let dialect = *self.scanner.dialect();
        let raw = self.next_column()?;
        Ok(decode_str(raw, &dialect))
    }

    fn parse_next<T: Primitive>(&mut self) -> Result<T> {
        let text = self.next_text()?;
        T::parse_primitive(&text)
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let limit = self.scanner.dialect().max_depth;
        if self.depth >= limit {
            return Err(CsvError::RecursionLimit { limit });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn has_more_columns(&self) -> bool {
        !self.scanner.end_of_line() || self.advanced
    }
}

macro_rules! deserialize_primitive {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                let value = self.parse_next::<$ty>()?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &mut RecordDeserializer<'de, '_> {
    type Error = CsvError;

    /// Self-describing input is read as text.
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    deserialize_primitive! {
        deserialize_bool => visit_bool: bool,
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
        deserialize_char => visit_char: char,
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.next_text()? {
            Cow::Borrowed(text) => visitor.visit_borrowed_str(text),
            Cow::Owned(text) => visitor.visit_string(text),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.next_text()? {
            Cow::Borrowed(text) => visitor.visit_borrowed_bytes(text.as_bytes()),
            Cow::Owned(text) => visitor.visit_byte_buf(text.into_bytes()),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    /// An empty column is `None`; anything else, quoted `""` included, is `Some`.
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.scanner.current_column_empty() {
            self.next_column()?;
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.next_column()?;
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.nested(|de| visitor.visit_newtype_struct(de))
    }

    /// Reads elements until the line runs out of columns.
    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.nested(|de| {
            let more = de.has_more_columns();
            visitor.visit_seq(Elements { de, remaining: None, more })
        })
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        self.nested(|de| visitor.visit_seq(Elements { de, remaining: Some(len), more: true }))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(CsvError::UnsupportedType("map"))
    }

    /// Struct fields are positional: one after another, in declaration order.
    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(fields.len(), visitor)
    }

    /// Only unit variants have a column layout: the column holds the variant name.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.next_text()? {
            Cow::Borrowed(text) => visitor.visit_enum(BorrowedStrDeserializer::<CsvError>::new(text)),
            Cow::Owned(text) => visitor.visit_enum(StringDeserializer::<CsvError>::new(text)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.next_column()?;
        visitor.visit_unit()
    }
}

/// Sequence access for tuples, structs and trailing vectors.
struct Elements<'a, 'de, 's> {
    de: &'a mut RecordDeserializer<'de, 's>,
    /// Fixed length, or `None` for "until the end of the line".
    remaining: Option<usize>,
    more: bool,
}

impl<'de> SeqAccess<'de> for Elements<'_, 'de, '_> {
    type Error = CsvError;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.remaining {
            Some(0) => return Ok(None),
            Some(ref mut remaining) => *remaining -= 1,
            None if !self.more => return Ok(None),
            None => {}
        }

        let offset = self.de.scanner.column_offset();
        let value = seed.deserialize(&mut *self.de)?;

        if self.remaining.is_none() {
            self.more = self.de.has_more_columns();
            if self.more && self.de.scanner.column_offset() == offset {
                return Err(CsvError::UnsupportedType("sequence of zero-column elements"));
            }
        }

        Ok(Some(value))
    }

    fn size_hint(&self) -> Option<usize> {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::{dialect::Dialect, error::ErrorKind, primitive::Date};

    fn decode<'a, T: Deserialize<'a>>(line: &'a str) -> Result<T> {
        let mut scanner = Scanner::new(line, &Dialect::default());
        decode_record(&mut scanner)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        age: u32,
        active: bool,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Segment {
        label: String,
        from: Point,
        to: Point,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    #[test]
    fn test_struct_fields_are_positional() {
        let person: Person = decode("Alice,30,true").unwrap();
        assert_eq!(person, Person { name: "Alice".to_string(), age: 30, active: true });
    }

    #[test]
    fn test_nested_structs_are_flattened() {
        let segment: Segment = decode("ab,1,2,3,4\n").unwrap();
        assert_eq!(segment.label, "ab");
        assert_eq!(segment.from, Point { x: 1, y: 2 });
        assert_eq!(segment.to, Point { x: 3, y: 4 });
    }

    #[test]
    fn test_tuples_and_arrays() {
        let row: (i32, String, [u8; 2]) = decode("1,two,3,4").unwrap();
        assert_eq!(row, (1, "two".to_string(), [3, 4]));
    }

    #[test]
    fn test_optional_columns() {
        let row: (Option<i32>, Option<String>) = decode(",three").unwrap();
        assert_eq!(row, (None, Some("three".to_string())));

        let row: (Option<i32>, Option<String>) = decode("1,").unwrap();
        assert_eq!(row, (Some(1), None));

        let row: (Option<String>,) = decode("\"\"").unwrap();
        assert_eq!(row, (Some(String::new()),));
    }

    #[test]
    fn test_quoted_strings_are_unescaped() {
        let row: (String, String) = decode(r#""one\"","\"two""#).unwrap();
        assert_eq!(row, ("one\"".to_string(), "\"two".to_string()));
    }

    #[test]
    fn test_borrowed_str() {
        #[derive(Deserialize)]
        struct View<'a> {
            #[serde(borrow)]
            name: &'a str,
            id: u8,
        }

        let view: View<'_> = decode("\"quoted, name\",7").unwrap();
        assert_eq!(view.name, "quoted, name");
        assert_eq!(view.id, 7);
    }

    #[test]
    fn test_scalars_parse_unquoted_text() {
        let row: (i32, bool) = decode("\"12\",\"true\"").unwrap();
        assert_eq!(row, (12, true));
    }

    #[test]
    fn test_trailing_vec_takes_rest_of_line() {
        let row: (String, Vec<i32>) = decode("head,1,2,3").unwrap();
        assert_eq!(row, ("head".to_string(), vec![1, 2, 3]));

        let row: (String, Vec<i32>) = decode("head").unwrap();
        assert_eq!(row, ("head".to_string(), vec![]));

        let row: (String, Vec<String>) = decode("head,").unwrap();
        assert_eq!(row, ("head".to_string(), vec![String::new()]));

        let row: Vec<String> = decode(",\n").unwrap();
        assert_eq!(row, vec![String::new(), String::new()]);
    }

    #[test]
    fn test_unit_enum_by_name() {
        let row: (Color, Color) = decode("Red,Green").unwrap();
        assert_eq!(row, (Color::Red, Color::Green));

        let err = decode::<(Color,)>("Blue").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_date_column() {
        let row: (Date, u8) = decode("2020-02-29,1").unwrap();
        assert_eq!(row.0, Date::new(2020, 2, 29).unwrap());

        let err = decode::<(Date,)>("2020-2-29").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_parse_error_carries_text() {
        match decode::<(i32, i32)>("1,x") {
            Err(CsvError::Parse { type_name, text, .. }) => {
                assert_eq!(type_name, "i32");
                assert_eq!(text, "x");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_columns_read_as_empty() {
        let row: (i32, Option<i32>, String) = decode("5").unwrap();
        assert_eq!(row, (5, None, String::new()));
    }

    #[test]
    fn test_recursive_definition_is_structural() {
        #[derive(Debug, Deserialize)]
        struct Loop(#[allow(dead_code)] Box<Loop>);

        let err = decode::<Loop>("1").unwrap_err();
        assert!(matches!(err, CsvError::RecursionLimit { limit: 64 }));
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_maps_unsupported() {
        let err = decode::<std::collections::HashMap<String, i32>>("a,1").unwrap_err();
        assert!(matches!(err, CsvError::UnsupportedType("map")));
    }

    #[test]
    fn test_strict_quote_mode() {
        let dialect = Dialect { quote_mode: QuoteMode::Strict, ..Dialect::default() };
        let mut scanner = Scanner::new("1,\"open", &dialect);
        let err = decode_record::<(i32, String)>(&mut scanner).unwrap_err();
        assert!(matches!(err, CsvError::UnterminatedQuote { offset: 2 }));

        let mut scanner = Scanner::new("1,\"open", &Dialect::default());
        let row: (i32, String) = decode_record(&mut scanner).unwrap();
        assert_eq!(row, (1, "\"open".to_string()));
    }
}
