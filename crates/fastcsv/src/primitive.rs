//! Scalar codecs.
//!
//! This is the narrow `parse_primitive` / `format_primitive` boundary the record
//! codec calls for every column, plus the quote-aware string codec and the
//! calendar [`Date`] type.

use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
    dialect::Dialect,
    error::{CsvError, Result},
};

/// A scalar that maps to exactly one column.
pub trait Primitive: Sized {
    /// Name used in error messages.
    const NAME: &'static str;

    /// Parses the (already unquoted) column text.
    fn parse_primitive(text: &str) -> Result<Self>;

    /// Appends the canonical text form to `out`.
    fn format_primitive(&self, out: &mut String);
}

macro_rules! impl_primitive_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const NAME: &'static str = stringify!($ty);

                fn parse_primitive(text: &str) -> Result<Self> {
                    text.parse::<$ty>().map_err(|e| CsvError::parse(Self::NAME, text, e))
                }

                fn format_primitive(&self, out: &mut String) {
                    out.push_str(&self.to_string());
                }
            }
        )*
    };
}

impl_primitive_from_str!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

impl Primitive for bool {
    const NAME: &'static str = "bool";

    fn parse_primitive(text: &str) -> Result<Self> {
        match text {
            "true" | "TRUE" | "True" | "t" => Ok(true),
            "false" | "FALSE" | "False" | "f" => Ok(false),
            _ => Err(CsvError::parse(Self::NAME, text, "expected true/TRUE/True/t or false/FALSE/False/f")),
        }
    }

    fn format_primitive(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }
}

impl Primitive for char {
    const NAME: &'static str = "char";

    fn parse_primitive(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CsvError::parse(Self::NAME, text, "expected exactly one character")),
        }
    }

    // Written verbatim, even when it is the delimiter.
    fn format_primitive(&self, out: &mut String) {
        out.push(*self);
    }
}

// ============================================================================
// Strings
// ============================================================================

/// Decodes a raw column into its string value.
///
/// A column of at least two bytes that starts and ends with the quote loses
/// the outer quotes, and every `escape quote` pair inside becomes one quote.
/// Anything else is returned verbatim. Borrows whenever nothing was unescaped.
#[must_use]
pub fn decode_str<'a>(raw: &'a str, dialect: &Dialect) -> Cow<'a, str> {
    let bytes = raw.as_bytes();
    let quoted = bytes.len() >= 2 && bytes[0] == dialect.quote && bytes[bytes.len() - 1] == dialect.quote;
    if !quoted {
        return Cow::Borrowed(raw);
    }

    let inner = &raw[1..raw.len() - 1];
    let inner_bytes = inner.as_bytes();
    let is_pair = |pos: usize| inner_bytes[pos] == dialect.escape && inner_bytes.get(pos + 1) == Some(&dialect.quote);

    let Some(first) = (0..inner_bytes.len()).find(|&pos| is_pair(pos)) else {
        return Cow::Borrowed(inner);
    };

    let mut out = String::with_capacity(inner.len());
    let mut copied = 0;
    let mut pos = first;
    while pos < inner_bytes.len() {
        if is_pair(pos) {
            out.push_str(&inner[copied..pos]);
            out.push(dialect.quote as char);
            pos += 2;
            copied = pos;
        } else {
            pos += 1;
        }
    }
    out.push_str(&inner[copied..]);

    Cow::Owned(out)
}

/// Encodes a string value into `out`.
///
/// - contains the quote: wrapped in quotes, every quote prefixed by `escape`
/// - contains the delimiter or a line terminator: wrapped in quotes as is
/// - otherwise written verbatim
///
/// When `escape` differs from `quote`, a wrapped value that ends with the
/// escape byte does not decode back, whatever caused the wrapping: the
/// closing quote reads as escaped and the column runs on. `a,b\` is written
/// as `"a,b\"` and swallows the next column. A dialect with
/// `escape == quote` has no such case.
pub fn encode_str(value: &str, dialect: &Dialect, out: &mut String) {
    let bytes = value.as_bytes();
    let quote = dialect.quote as char;

    if bytes.contains(&dialect.quote) {
        out.reserve(value.len() + 4);
        out.push(quote);
        for (idx, part) in value.split(quote).enumerate() {
            if idx > 0 {
                out.push(dialect.escape as char);
                out.push(quote);
            }
            out.push_str(part);
        }
        out.push(quote);
    } else if bytes.iter().any(|&b| b == dialect.delimiter || Dialect::is_terminator(b)) {
        out.push(quote);
        out.push_str(value);
        out.push(quote);
    } else {
        out.push_str(value);
    }
}

// ============================================================================
// Date
// ============================================================================

/// Calendar date, encoded as `YYYY-MM-DD`.
///
/// Backed by [`jiff::civil::Date`], so only dates that exist in the
/// proleptic Gregorian calendar can be built or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(jiff::civil::Date);

impl Date {
    const EXPECTING: &'static str = "a date formatted as YYYY-MM-DD";

    /// Name of the newtype `Date` presents to serde.
    pub(crate) const SERDE_NAME: &'static str = "fastcsv::Date";

    pub const UNIX_EPOCH: Self = Self(jiff::civil::date(1970, 1, 1));

    /// Builds a date, rejecting days that do not exist in the given month.
    pub fn new(year: i16, month: i8, day: i8) -> Result<Self> {
        jiff::civil::Date::new(year, month, day)
            .map(Self)
            .map_err(|e| CsvError::parse(Self::NAME, &format!("{year:04}-{month:02}-{day:02}"), e))
    }

    #[must_use]
    pub fn year(self) -> i16 {
        self.0.year()
    }

    #[must_use]
    pub fn month(self) -> i8 {
        self.0.month()
    }

    #[must_use]
    pub fn day(self) -> i8 {
        self.0.day()
    }
}

impl From<jiff::civil::Date> for Date {
    fn from(date: jiff::civil::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for jiff::civil::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl Primitive for Date {
    const NAME: &'static str = "date";

    /// Requires exactly ten bytes split at the fixed offsets 0..4, 5..7 and 8..10.
    fn parse_primitive(text: &str) -> Result<Self> {
        let malformed = || CsvError::parse(Self::NAME, text, "expected YYYY-MM-DD");

        let bytes = text.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(malformed());
        }
        let (Some(year), Some(month), Some(day)) = (text.get(0..4), text.get(5..7), text.get(8..10)) else {
            return Err(malformed());
        };

        let year: i16 = year.parse().map_err(|_| malformed())?;
        let month: i8 = month.parse().map_err(|_| malformed())?;
        let day: i8 = day.parse().map_err(|_| malformed())?;

        jiff::civil::Date::new(year, month, day).map(Self).map_err(|e| CsvError::parse(Self::NAME, text, e))
    }

    fn format_primitive(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.0.year(), self.0.month(), self.0.day())
    }
}

impl FromStr for Date {
    type Err = CsvError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_primitive(s)
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DateVisitor;

        impl<'de> de::Visitor<'de> for DateVisitor {
            type Value = Date;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(Date::EXPECTING)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Date, E> {
                Date::parse_primitive(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }

            fn visit_newtype_struct<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Date, D::Error> {
                deserializer.deserialize_str(self)
            }
        }

        deserializer.deserialize_newtype_struct(Date::SERDE_NAME, DateVisitor)
    }
}

// ============================================================================
// Fixed precision floats
// ============================================================================

/// A float written with exactly `DIGITS` fractional digits.
///
/// Decodes like a plain `f64`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Precision<const DIGITS: usize>(pub f64);

impl<const DIGITS: usize> Serialize for Precision<DIGITS> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.*}", DIGITS, self.0))
    }
}

impl<'de, const DIGITS: usize> Deserialize<'de> for Precision<DIGITS> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> String {
        decode_str(raw, &Dialect::default()).into_owned()
    }

    fn encode(value: &str) -> String {
        let mut out = String::new();
        encode_str(value, &Dialect::default(), &mut out);
        out
    }

    #[test]
    fn test_bool_spellings() {
        for text in ["true", "TRUE", "True", "t"] {
            assert!(bool::parse_primitive(text).unwrap(), "{text}");
        }
        for text in ["false", "FALSE", "False", "f"] {
            assert!(!bool::parse_primitive(text).unwrap(), "{text}");
        }
        for text in ["yes", "1", "tRUE", ""] {
            assert!(matches!(bool::parse_primitive(text), Err(CsvError::Parse { .. })), "{text}");
        }
    }

    #[test]
    fn test_bool_format_is_lowercase() {
        let mut out = String::new();
        true.format_primitive(&mut out);
        out.push(',');
        false.format_primitive(&mut out);
        assert_eq!(out, "true,false");
    }

    #[test]
    fn test_integer_errors_carry_type_and_text() {
        match u8::parse_primitive("256") {
            Err(CsvError::Parse { type_name, text, .. }) => {
                assert_eq!(type_name, "u8");
                assert_eq!(text, "256");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(i32::parse_primitive("1e3").is_err());
        assert!(i32::parse_primitive(" 1").is_err());
        assert_eq!(i64::parse_primitive("-42").unwrap(), -42);
    }

    #[test]
    fn test_float_shortest_round_trip_format() {
        let mut out = String::new();
        0.1f64.format_primitive(&mut out);
        assert_eq!(out, "0.1");
        assert_eq!(f64::parse_primitive("2.5e-3").unwrap(), 0.0025);
        assert!(f32::parse_primitive("1.2.3").is_err());
    }

    #[test]
    fn test_char_requires_exactly_one_character() {
        assert_eq!(char::parse_primitive("x").unwrap(), 'x');
        assert_eq!(char::parse_primitive("ж").unwrap(), 'ж');
        assert!(char::parse_primitive("").is_err());
        assert!(char::parse_primitive("xy").is_err());
    }

    #[test]
    fn test_decode_plain_and_empty() {
        assert_eq!(decode(""), "");
        assert_eq!(decode("abc"), "abc");
        assert_eq!(decode("\""), "\"");
        assert_eq!(decode("s\"one\""), "s\"one\"");
    }

    #[test]
    fn test_decode_quoted() {
        assert_eq!(decode("\"\""), "");
        assert_eq!(decode("\"a,b\""), "a,b");
        assert_eq!(decode("\"one\\\"\""), "one\"");
        assert_eq!(decode("\"\\\"two\""), "\"two");
        assert_eq!(decode("\"a\\b\""), "a\\b");
    }

    #[test]
    fn test_decode_borrows_when_possible() {
        let dialect = Dialect::default();
        assert!(matches!(decode_str("\"plain\"", &dialect), Cow::Borrowed("plain")));
        assert!(matches!(decode_str("\"a\\\"b\"", &dialect), Cow::Owned(_)));
    }

    #[test]
    fn test_encode_rules() {
        assert_eq!(encode("plain"), "plain");
        assert_eq!(encode("a,b"), "\"a,b\"");
        assert_eq!(encode("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(encode("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(encode(""), "");
    }

    #[test]
    fn test_string_round_trip() {
        for value in ["a,b", "\"", "x\"y\"z", "multi\r\nline", "plain", "юникод, да"] {
            assert_eq!(decode(&encode(value)), value);
        }
    }

    #[test]
    fn test_rfc_doubling() {
        let dialect = Dialect { escape: b'"', ..Dialect::default() };
        let mut out = String::new();
        encode_str("a\"b", &dialect, &mut out);
        assert_eq!(out, "\"a\"\"b\"");
        assert_eq!(decode_str(&out, &dialect), "a\"b");
    }

    #[test]
    fn test_date() {
        let date = Date::new(2021, 3, 9).unwrap();
        assert_eq!(Date::parse_primitive("2021-03-09").unwrap(), date);
        assert_eq!(date.to_string(), "2021-03-09");
        assert_eq!((date.year(), date.month(), date.day()), (2021, 3, 9));
        for text in ["2021-3-9", "2021/03/09", "20210309xx", "2021-13-01", "2021-00-10", "abcd-01-01"] {
            assert!(Date::parse_primitive(text).is_err(), "{text}");
        }
        assert_eq!("1999-12-31".parse::<Date>().unwrap(), Date::new(1999, 12, 31).unwrap());
        assert_eq!(Date::UNIX_EPOCH.to_string(), "1970-01-01");
    }

    #[test]
    fn test_date_rejects_days_missing_from_the_month() {
        for text in ["2021-02-31", "2023-04-31", "2021-02-29", "2024-06-31"] {
            assert!(matches!(Date::parse_primitive(text), Err(CsvError::Parse { .. })), "{text}");
        }
        assert_eq!(Date::parse_primitive("2020-02-29").unwrap(), Date::new(2020, 2, 29).unwrap());
        assert!(matches!(Date::new(2021, 2, 31), Err(CsvError::Parse { .. })));
    }

    #[test]
    fn test_date_converts_to_and_from_jiff() {
        let civil = jiff::civil::date(2024, 1, 5);
        let date = Date::from(civil);
        assert_eq!(date.to_string(), "2024-01-05");
        assert_eq!(jiff::civil::Date::from(date), civil);
    }
}
