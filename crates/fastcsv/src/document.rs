//! Whole-document entry points.
//!
//! Thin wrappers around [`Reader`] and [`Writer`] for the common case of
//! decoding a complete buffer into a `Vec` or encoding a slice into a `String`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    dialect::{Dialect, HeaderMode},
    error::{CsvError, Result},
    reader::Reader,
    writer::Writer,
};

/// Decodes every record of `text` with the default dialect.
///
/// ```
/// use fastcsv::HeaderMode;
///
/// let rows: Vec<(u8, bool)> = fastcsv::from_str("n,flag\n1,t\n2,FALSE\n", HeaderMode::Default).unwrap();
/// assert_eq!(rows, vec![(1, true), (2, false)]);
/// ```
pub fn from_str<'a, T: Deserialize<'a>>(text: &'a str, headers: HeaderMode) -> Result<Vec<T>> {
    Reader::from_text(text, headers).read_all()
}

/// Decodes every record of `text` with a custom dialect.
pub fn from_str_with<'a, T: Deserialize<'a>>(text: &'a str, dialect: &Dialect, headers: HeaderMode) -> Result<Vec<T>> {
    dialect.validate()?;
    Reader::with_config(text, dialect, headers).read_all()
}

/// Decodes every record as `W`, then maps it into the domain type `T`.
///
/// Useful when the on-disk layout differs from the type the caller wants,
/// e.g. two optional columns folded into one enum.
pub fn from_str_adapted<'a, W, T, F>(text: &'a str, headers: HeaderMode, mut adapt: F) -> Result<Vec<T>>
where
    W: Deserialize<'a>,
    F: FnMut(W) -> T,
{
    let mut reader = Reader::from_text(text, headers);
    reader.deserialize::<W>().map(|record| record.map(&mut adapt)).collect()
}

/// Encodes `records` into a `String` with the default dialect.
///
/// In default mode the header declared by `T` is written even when
/// `records` is empty.
pub fn to_string<T: Serialize + Deserialize<'static>>(records: &[T], headers: HeaderMode) -> Result<String> {
    to_string_with(records, &Dialect::default(), headers)
}

/// Encodes `records` into a `String` with a custom dialect.
pub fn to_string_with<T: Serialize + Deserialize<'static>>(
    records: &[T],
    dialect: &Dialect,
    headers: HeaderMode,
) -> Result<String> {
    dialect.validate()?;
    let mut writer = Writer::with_config(Vec::new(), dialect, headers);
    writer.serialize_all(records)?;
    debug!(records = writer.records_written(), "wrote CSV document");
    into_string(writer)
}

/// Maps each record into the wire type `W` before encoding it.
pub fn to_string_adapted<T, W, F>(records: &[T], headers: HeaderMode, mut adapt: F) -> Result<String>
where
    W: Serialize + Deserialize<'static>,
    F: FnMut(&T) -> W,
{
    let mut writer = Writer::from_writer(Vec::new(), headers);
    writer.declare_header::<W>()?;
    for record in records {
        writer.serialize(&adapt(record))?;
    }
    into_string(writer)
}

pub(crate) fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| CsvError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::InvalidUtf8(e.utf8_error()))
}
