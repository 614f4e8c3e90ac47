//! Multi-column (column-major) reading and writing.
//!
//! A document can be read as one `Vec` per column, and a tuple of slices can
//! be written as the columns of a document. Tuples of arity 1 through 8 are
//! supported.

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    dialect::{Dialect, HeaderMode},
    document::into_string,
    error::{CsvError, Result},
    reader::Reader,
    record::RecordSerializer,
    writer::Writer,
};

/// Row tuple that can be split into per-column vectors.
pub trait ReadColumns: Sized {
    /// `(Vec<A>, Vec<B>, ..)`
    type Columns;

    fn with_capacity(capacity: usize) -> Self::Columns;

    fn push(columns: &mut Self::Columns, row: Self);
}

/// One column of cells.
pub trait Column {
    fn row_count(&self) -> usize;

    fn write_cell(&self, row: usize, serializer: &mut RecordSerializer<'_>) -> Result<()>;
}

impl<T: Serialize> Column for [T] {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn write_cell(&self, row: usize, serializer: &mut RecordSerializer<'_>) -> Result<()> {
        self[row].serialize(serializer)
    }
}

impl<T: Serialize> Column for Vec<T> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn write_cell(&self, row: usize, serializer: &mut RecordSerializer<'_>) -> Result<()> {
        self.as_slice().write_cell(row, serializer)
    }
}

impl<C: Column + ?Sized> Column for &C {
    fn row_count(&self) -> usize {
        (**self).row_count()
    }

    fn write_cell(&self, row: usize, serializer: &mut RecordSerializer<'_>) -> Result<()> {
        (**self).write_cell(row, serializer)
    }
}

/// Tuple of columns written side by side.
pub trait WriteColumns {
    /// Number of columns.
    const WIDTH: usize;

    fn lengths(&self) -> Vec<usize>;

    fn write_row(&self, row: usize, serializer: &mut RecordSerializer<'_>) -> Result<()>;
}

macro_rules! column_tuples {
    ($(($($name:ident . $idx:tt),+))+) => {
        $(
            impl<$($name),+> ReadColumns for ($($name,)+) {
                type Columns = ($(Vec<$name>,)+);

                fn with_capacity(capacity: usize) -> Self::Columns {
                    ($(Vec::<$name>::with_capacity(capacity),)+)
                }

                fn push(columns: &mut Self::Columns, row: Self) {
                    $(columns.$idx.push(row.$idx);)+
                }
            }

            impl<$($name: Column),+> WriteColumns for ($($name,)+) {
                const WIDTH: usize = [$(stringify!($name)),+].len();

                fn lengths(&self) -> Vec<usize> {
                    vec![$(self.$idx.row_count()),+]
                }

                fn write_row(&self, row: usize, serializer: &mut RecordSerializer<'_>) -> Result<()> {
                    $(self.$idx.write_cell(row, serializer)?;)+
                    Ok(())
                }
            }
        )+
    };
}

column_tuples! {
    (A.0)
    (A.0, B.1)
    (A.0, B.1, C.2)
    (A.0, B.1, C.2, D.3)
    (A.0, B.1, C.2, D.3, E.4)
    (A.0, B.1, C.2, D.3, E.4, F.5)
    (A.0, B.1, C.2, D.3, E.4, F.5, G.6)
    (A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7)
}

impl<'a> Reader<'a> {
    /// Reads the remaining records as `(Vec<A>, Vec<B>, ..)`.
    pub fn read_columns<C: ReadColumns + Deserialize<'a>>(&mut self) -> Result<C::Columns> {
        self.skip_header();
        let mut columns = C::with_capacity(self.estimate_rows());
        while let Some(row) = self.read_record::<C>()? {
            C::push(&mut columns, row);
        }
        Ok(columns)
    }
}

impl<W: Write> Writer<W> {
    /// Writes `columns` side by side and returns the number of rows written.
    ///
    /// `headers` shorter than the tuple are padded with empty names, longer
    /// ones are truncated; `None` writes no header line. Columns of unequal
    /// length are cut to the shortest one, or rejected with
    /// [`CsvError::ColumnLengthMismatch`] when the writer was built with
    /// `strict_columns(true)`.
    pub fn write_columns<C: WriteColumns>(&mut self, headers: Option<&[&str]>, columns: &C) -> Result<usize> {
        let lengths = columns.lengths();
        let rows = lengths.iter().copied().min().unwrap_or(0);
        if self.strict_columns && lengths.iter().any(|&len| len != rows) {
            return Err(CsvError::ColumnLengthMismatch { lengths });
        }

        if let Some(names) = headers {
            if self.headers.expects_header() {
                let padded: Vec<&str> = names.iter().copied().chain(std::iter::repeat("")).take(C::WIDTH).collect();
                self.write_header(&padded)?;
            }
        }

        for row in 0..rows {
            self.line.clear();
            let mut serializer = RecordSerializer::new(&mut self.line, &self.dialect);
            columns.write_row(row, &mut serializer)?;
            self.line.push_str(self.dialect.line_terminator.as_str());
            self.inner.write_all(self.line.as_bytes())?;
            self.records_written += 1;
        }

        debug!(rows, columns = C::WIDTH, "wrote CSV columns");
        Ok(rows)
    }
}

/// Reads `text` column-major with the default dialect.
///
/// ```
/// use fastcsv::HeaderMode;
///
/// let (ids, names) = fastcsv::read_columns::<(u32, String)>("1,one\n2,two\n", HeaderMode::NoHeader).unwrap();
/// assert_eq!(ids, vec![1, 2]);
/// assert_eq!(names, vec!["one", "two"]);
/// ```
pub fn read_columns<'a, C: ReadColumns + Deserialize<'a>>(text: &'a str, headers: HeaderMode) -> Result<C::Columns> {
    Reader::from_text(text, headers).read_columns::<C>()
}

/// Writes `columns` into a `String` with the default dialect.
pub fn write_columns<C: WriteColumns>(headers: Option<&[&str]>, columns: &C) -> Result<String> {
    write_columns_with(headers, columns, &Dialect::default())
}

/// Writes `columns` into a `String` with a custom dialect.
pub fn write_columns_with<C: WriteColumns>(headers: Option<&[&str]>, columns: &C, dialect: &Dialect) -> Result<String> {
    dialect.validate()?;
    let mut writer = Writer::with_config(Vec::new(), dialect, HeaderMode::Default);
    writer.write_columns(headers, columns)?;
    into_string(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, writer::WriterBuilder};

    #[test]
    fn test_read_three_columns() {
        let (ints, strings, chars) =
            read_columns::<(i32, String, Vec<char>)>("1,two,a,b\n3,four,c,d\n", HeaderMode::NoHeader).unwrap();
        assert_eq!(ints, vec![1, 3]);
        assert_eq!(strings, vec!["two", "four"]);
        assert_eq!(chars, vec![vec!['a', 'b'], vec!['c', 'd']]);
    }

    #[test]
    fn test_read_columns_skips_header() {
        let (a, b) = read_columns::<(u8, bool)>("a,b\n1,t\n2,f\n", HeaderMode::Default).unwrap();
        assert_eq!(a, vec![1, 2]);
        assert_eq!(b, vec![true, false]);
    }

    #[test]
    fn test_missing_headers_are_padded() {
        let ints = [1, 3];
        let strings = vec!["two".to_string(), "four".to_string()];
        let chars = ['a', 'b'];
        let text = write_columns(Some(&["col1"][..]), &(&ints[..], &strings, &chars[..])).unwrap();
        assert_eq!(text, "col1,,\n1,two,a\n3,four,b\n");
    }

    #[test]
    fn test_extra_headers_are_truncated() {
        let text = write_columns(Some(&["a", "b", "c"][..]), &(vec![1, 2], vec![3, 4])).unwrap();
        assert_eq!(text, "a,b\n1,3\n2,4\n");
    }

    #[test]
    fn test_no_header_list_writes_no_header() {
        let text = write_columns(None, &(vec!["x"],)).unwrap();
        assert_eq!(text, "x\n");
    }

    #[test]
    fn test_shortest_column_wins() {
        let text = write_columns(None, &(vec![1, 2, 3], vec!["a"], vec![true, false])).unwrap();
        assert_eq!(text, "1,a,true\n");
    }

    #[test]
    fn test_strict_columns_reject_mismatch() {
        let mut writer = WriterBuilder::new().strict_columns(true).from_writer(Vec::new()).unwrap();
        let err = writer.write_columns(None, &(vec![1, 2], vec![1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(matches!(err, CsvError::ColumnLengthMismatch { ref lengths } if lengths == &[2, 1]));
        assert_eq!(writer.records_written(), 0);
    }

    #[test]
    fn test_eight_columns_round_trip() {
        let columns = (vec![1u8], vec![2u16], vec![3u32], vec![4u64], vec![5i8], vec![6i16], vec![7i32], vec![8i64]);
        let text = write_columns(None, &columns).unwrap();
        assert_eq!(text, "1,2,3,4,5,6,7,8\n");
        let back = read_columns::<(u8, u16, u32, u64, i8, i16, i32, i64)>(&text, HeaderMode::NoHeader).unwrap();
        assert_eq!(back, columns);
    }
}
