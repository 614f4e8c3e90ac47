//! Record Serializer: writes one serde value as one line of columns.
//!
//! The serializer only appends columns; the line terminator belongs to the
//! caller, which knows where a record ends.

use serde::ser::{self, Serialize};

use crate::{
    dialect::Dialect,
    error::{CsvError, Result},
    primitive::{Primitive, encode_str},
};

/// Column writer appending to a borrowed `String`.
pub struct RecordSerializer<'o> {
    output: &'o mut String,
    dialect: Dialect,
    /// No column has been written on this line yet.
    first: bool,
    depth: usize,
    /// Struct field currently being written.
    field: Option<&'static str>,
    headers: Option<Vec<Option<&'static str>>>,
}

impl<'o> RecordSerializer<'o> {
    pub fn new(output: &'o mut String, dialect: &Dialect) -> Self {
        Self { output, dialect: *dialect, first: true, depth: 0, field: None, headers: None }
    }

    /// Prepares for a new line.
    pub fn reset(&mut self) {
        self.first = true;
        self.depth = 0;
        self.field = None;
    }

    /// Starts recording the name of every column written from now on.
    ///
    /// Used for record types whose header cannot be derived from the type
    /// alone (see [`declared_headers`](super::declared_headers)).
    pub fn collect_headers(&mut self) {
        self.headers = Some(Vec::new());
    }

    /// Returns the collected column names.
    ///
    /// `None` unless at least one column came from a named struct field;
    /// columns without a name get an empty one.
    pub fn take_headers(&mut self) -> Option<Vec<&'static str>> {
        self.headers
            .take()
            .filter(|names| names.iter().any(Option::is_some))
            .map(|names| names.into_iter().map(|name| name.unwrap_or_default()).collect())
    }

    fn begin_column(&mut self) {
        if !self.first {
            self.output.push(self.dialect.delimiter as char);
        }
        self.first = false;
        if let Some(headers) = &mut self.headers {
            headers.push(self.field);
        }
    }

    fn write_primitive<T: Primitive>(&mut self, value: &T) -> Result<()> {
        self.begin_column();
        value.format_primitive(self.output);
        Ok(())
    }

    fn write_str(&mut self, value: &str) -> Result<()> {
        self.begin_column();
        encode_str(value, &self.dialect, self.output);
        Ok(())
    }

    fn enter(&mut self) -> Result<Compound<'_, 'o>> {
        let limit = self.dialect.max_depth;
        if self.depth >= limit {
            return Err(CsvError::RecursionLimit { limit });
        }
        self.depth += 1;
        Ok(Compound { ser: self })
    }
}

/// Writes a header line (without terminator) with every name encoded like a string column.
pub fn write_header_line<S: AsRef<str>>(names: &[S], dialect: &Dialect, output: &mut String) {
    for (idx, name) in names.iter().enumerate() {
        if idx > 0 {
            output.push(dialect.delimiter as char);
        }
        encode_str(name.as_ref(), dialect, output);
    }
}

macro_rules! serialize_primitive {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<()> {
                self.write_primitive(&v)
            }
        )*
    };
}

impl<'a, 'o> ser::Serializer for &'a mut RecordSerializer<'o> {
    type Ok = ();
    type Error = CsvError;

    type SerializeSeq = Compound<'a, 'o>;
    type SerializeTuple = Compound<'a, 'o>;
    type SerializeTupleStruct = Compound<'a, 'o>;
    type SerializeTupleVariant = ser::Impossible<(), CsvError>;
    type SerializeMap = ser::Impossible<(), CsvError>;
    type SerializeStruct = Compound<'a, 'o>;
    type SerializeStructVariant = ser::Impossible<(), CsvError>;

    serialize_primitive! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.write_str(std::str::from_utf8(v)?)
    }

    fn serialize_none(self) -> Result<()> {
        self.begin_column();
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.begin_column();
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    /// Unit variants are written as their (possibly renamed) name.
    fn serialize_unit_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str) -> Result<()> {
        self.write_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        let mut compound = self.enter()?;
        compound.element(value)?;
        compound.finish()
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Err(CsvError::UnsupportedType("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.enter()
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.enter()
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> {
        self.enter()
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(CsvError::UnsupportedType("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(CsvError::UnsupportedType("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.enter()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(CsvError::UnsupportedType("struct variant"))
    }
}

/// Helper for structs, tuples and sequences: parts are written as consecutive columns.
pub struct Compound<'a, 'o> {
    ser: &'a mut RecordSerializer<'o>,
}

impl Compound<'_, '_> {
    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> Result<()> {
        self.ser.depth -= 1;
        Ok(())
    }
}

impl ser::SerializeSeq for Compound<'_, '_> {
    type Ok = ();
    type Error = CsvError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeTuple for Compound<'_, '_> {
    type Ok = ();
    type Error = CsvError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for Compound<'_, '_> {
    type Ok = ();
    type Error = CsvError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl ser::SerializeStruct for Compound<'_, '_> {
    type Ok = ();
    type Error = CsvError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        let outer = self.ser.field.replace(key);
        let result = self.element(value);
        self.ser.field = outer;
        result
    }

    /// Skipped fields still occupy their column, so positional decoding stays aligned.
    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        let outer = self.ser.field.replace(key);
        self.ser.begin_column();
        self.ser.field = outer;
        Ok(())
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}
