//! Модуль ошибок кодека CSV.

use std::{fmt, io, path::PathBuf, str::Utf8Error};

use serde::{de, ser};
use thiserror::Error;

/// Категория ошибки.
///
/// Позволяет отличить «плохие данные» от «плохого источника» и от ошибки
/// в описании типа записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Текст колонки не соответствует грамматике типа.
    Parse,
    /// Ошибка в описании типа или конфигурации (не ошибка данных).
    Structural,
    /// Ошибка файловой системы или потока вывода.
    Io,
}

/// Главная ошибка кодека.
///
/// Любой сбой чтения или записи прерывает документ целиком: частично
/// разобранные записи никогда не возвращаются.
#[derive(Debug, Error)]
pub enum CsvError {
    // === Ошибки разбора ===
    /// Текст колонки не удалось преобразовать в целевой тип.
    #[error("Failed to parse {type_name} from '{text}': {reason}")]
    Parse {
        /// Имя целевого типа.
        type_name: String,
        /// Текст колонки.
        text: String,
        /// Причина, полученная от примитивного парсера.
        reason: String,
    },

    /// Кавычка открыта, но не закрыта до конца буфера (строгий режим).
    #[error("Unterminated quoted column starting at byte {offset}")]
    UnterminatedQuote {
        /// Смещение начала колонки в буфере.
        offset: usize,
    },

    /// Произвольное сообщение от serde.
    #[error("{0}")]
    Message(String),

    /// Некорректная UTF-8 последовательность в байтовом поле.
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    // === Структурные ошибки ===
    /// Превышена глубина вложенности — тип определён через самого себя.
    #[error("Recursive record definition: nesting exceeded {limit} levels")]
    RecursionLimit {
        /// Настроенный предел вложенности.
        limit: usize,
    },

    /// Тип не может быть представлен последовательностью колонок.
    #[error("Unsupported type for CSV records: {0}")]
    UnsupportedType(&'static str),

    /// Некорректная конфигурация диалекта.
    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),

    /// Колонки разной длины при строгой многоколоночной записи.
    #[error("Column lengths differ: {lengths:?}")]
    ColumnLengthMismatch {
        /// Длины всех колонок в порядке записи.
        lengths: Vec<usize>,
    },

    // === I/O ошибки ===
    /// Ошибка ввода/вывода.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Файл не существует или не является обычным файлом.
    #[error("File does not exist: '{}'", .0.display())]
    FileNotFound(PathBuf),

    /// У файла неверное расширение.
    #[error("File '{}' does not have the required '.{expected}' extension", path.display())]
    WrongExtension {
        /// Путь к файлу.
        path: PathBuf,
        /// Ожидаемое расширение без точки.
        expected: &'static str,
    },

    /// Не удалось прочитать файл целиком.
    #[error("Could not read '{}': {source}", path.display())]
    ReadFile {
        /// Путь к файлу.
        path: PathBuf,
        /// Исходная ошибка.
        source: io::Error,
    },

    /// Не удалось записать файл.
    #[error("Could not write '{}': {source}", path.display())]
    WriteFile {
        /// Путь к файлу.
        path: PathBuf,
        /// Исходная ошибка.
        source: io::Error,
    },

    // === Контекст ===
    /// Ошибка с номером строки документа (1-based, заголовок учитывается).
    #[error("Line {line}: {error}")]
    AtLine {
        /// Номер строки.
        line: usize,
        /// Исходная ошибка (уже входит в текст сообщения).
        error: Box<CsvError>,
    },
}

/// Удобный alias для Result с [`CsvError`].
pub type Result<T> = std::result::Result<T, CsvError>;

impl CsvError {
    /// Создаёт ошибку разбора колонки.
    pub fn parse(type_name: impl Into<String>, text: &str, reason: impl fmt::Display) -> Self {
        Self::Parse { type_name: type_name.into(), text: text.to_string(), reason: reason.to_string() }
    }

    /// Категория ошибки; для [`CsvError::AtLine`] — категория исходной ошибки.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } | Self::UnterminatedQuote { .. } | Self::Message(_) | Self::InvalidUtf8(_) => {
                ErrorKind::Parse
            }
            Self::RecursionLimit { .. }
            | Self::UnsupportedType(_)
            | Self::InvalidDialect(_)
            | Self::ColumnLengthMismatch { .. } => ErrorKind::Structural,
            Self::Io(_)
            | Self::FileNotFound(_)
            | Self::WrongExtension { .. }
            | Self::ReadFile { .. }
            | Self::WriteFile { .. } => ErrorKind::Io,
            Self::AtLine { error, .. } => error.kind(),
        }
    }

    /// Номер строки, если он известен.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Добавляет номер строки; уже привязанные ошибки не оборачиваются повторно.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Self::AtLine { .. } => self,
            other => Self::AtLine { line, error: Box::new(other) },
        }
    }
}

fn unexpected_text(unexp: de::Unexpected<'_>) -> String {
    match unexp {
        de::Unexpected::Str(s) => s.to_string(),
        de::Unexpected::Char(c) => c.to_string(),
        de::Unexpected::Bool(b) => b.to_string(),
        de::Unexpected::Signed(i) => i.to_string(),
        de::Unexpected::Unsigned(u) => u.to_string(),
        de::Unexpected::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

// Required for serde::ser::Serializer
impl ser::Error for CsvError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

// Required for serde::de::Deserializer
impl de::Error for CsvError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }

    fn invalid_type(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        Self::parse(exp.to_string(), &unexpected_text(unexp), "invalid type")
    }

    fn invalid_value(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        Self::parse(exp.to_string(), &unexpected_text(unexp), "invalid value")
    }

    fn unknown_variant(variant: &str, expected: &'static [&'static str]) -> Self {
        Self::parse("enum variant", variant, format!("expected one of {expected:?}"))
    }
}
