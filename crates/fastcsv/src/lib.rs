//! Типизированный кодек CSV поверх serde.
//!
//! Крейт превращает текст CSV в `Vec` записей и обратно. Запись — любой
//! тип, реализующий `Serialize`/`Deserialize`: поля структуры соответствуют
//! колонкам строки в порядке объявления, вложенные структуры и кортежи
//! разворачиваются в подряд идущие колонки.
//!
//! - [`scanner`] — курсор по колонкам и строкам с учётом кавычек
//! - [`primitive`] — разбор и запись скалярных значений
//! - [`record`] — serde `Serializer`/`Deserializer` для одной строки
//! - [`Reader`] / [`Writer`] — потоковое чтение и запись документа
//! - [`fs`] — чтение и запись файлов `.csv`
//!
//! # Быстрый старт
//!
//! ```
//! use fastcsv::HeaderMode;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Quote {
//!     ticker: String,
//!     price: f64,
//!     volume: Option<u64>,
//! }
//!
//! let quotes = vec![
//!     Quote { ticker: "AAPL".to_string(), price: 189.5, volume: Some(1200) },
//!     Quote { ticker: "BRK, B".to_string(), price: 402.25, volume: None },
//! ];
//!
//! let text = fastcsv::to_string(&quotes, HeaderMode::Default).unwrap();
//! assert!(text.starts_with("ticker,price,volume"));
//!
//! let parsed: Vec<Quote> = fastcsv::from_str(&text, HeaderMode::Default).unwrap();
//! assert_eq!(parsed, quotes);
//! ```

pub mod columns;
pub mod dialect;
pub mod document;
pub mod error;
pub mod fs;
pub mod primitive;
pub mod reader;
pub mod record;
pub mod scanner;
pub mod writer;

pub use columns::{Column, ReadColumns, WriteColumns, read_columns, write_columns, write_columns_with};
pub use dialect::{Dialect, HeaderMode, LineTerminator, QuoteMode};
pub use document::{from_str, from_str_adapted, from_str_with, to_string, to_string_adapted, to_string_with};
pub use error::{CsvError, ErrorKind, Result};
pub use primitive::{Date, Precision, Primitive};
pub use reader::{DeserializeRecords, Reader, ReaderBuilder};
pub use writer::{Writer, WriterBuilder};

/// Всё необходимое для типичного использования.
pub mod prelude {
    pub use crate::{
        Date, Dialect, HeaderMode, LineTerminator, Precision, QuoteMode, Reader, ReaderBuilder, Writer,
        WriterBuilder,
        error::{CsvError, ErrorKind, Result},
    };
}
