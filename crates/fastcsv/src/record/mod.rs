//! Record codec: maps serde data types onto one CSV line.
//!
//! A record is any `Serialize`/`Deserialize` type. Its leaves are written
//! depth first, in declaration order, one column per leaf:
//!
//! | Rust type                             | Columns                          |
//! |---------------------------------------|----------------------------------|
//! | integers, floats, `bool`, `char`      | one                              |
//! | `String`, `&str`, [`Date`]            | one (quoted when needed)         |
//! | `Option<T>`                           | one, empty for `None`            |
//! | unit enum variants                    | one, the variant name            |
//! | structs, tuples, arrays, newtypes     | the concatenation of their parts |
//! | `Vec<T>`                              | the rest of the line             |
//!
//! Maps and enum variants carrying data have no column layout and are
//! rejected with [`CsvError::UnsupportedType`](crate::CsvError::UnsupportedType).
//!
//! Header names are declared by the type, see [`declared_headers`].
//!
//! [`Date`]: crate::primitive::Date

pub mod de;
pub mod header;
pub mod ser;

pub use de::{RecordDeserializer, decode_record};
pub use header::declared_headers;
pub use ser::{RecordSerializer, write_header_line};
