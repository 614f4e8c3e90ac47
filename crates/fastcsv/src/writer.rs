//! Потоковый writer для CSV-документов.
//!
//! Предоставляет [`Writer`] для записи записей в любой тип, реализующий
//! [`Write`], и [`WriterBuilder`] для настройки диалекта.

use std::io::{BufWriter, IntoInnerError, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    dialect::{Dialect, HeaderMode, LineTerminator},
    error::Result,
    record::{RecordSerializer, declared_headers, write_header_line},
};

/// Настройки для создания [`Writer`].
#[derive(Debug, Clone, Default)]
pub struct WriterBuilder {
    dialect: Dialect,
    headers: HeaderMode,
    strict_columns: bool,
}

impl WriterBuilder {
    /// Создаёт builder с диалектом по умолчанию.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Заменяет диалект целиком.
    pub fn dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    /// Разделитель колонок.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.dialect.delimiter = delimiter;
        self
    }

    /// Символ кавычки.
    pub fn quote(&mut self, quote: u8) -> &mut Self {
        self.dialect.quote = quote;
        self
    }

    /// Символ экранирования кавычки.
    pub fn escape(&mut self, escape: u8) -> &mut Self {
        self.dialect.escape = escape;
        self
    }

    /// Завершение строки.
    pub fn line_terminator(&mut self, terminator: LineTerminator) -> &mut Self {
        self.dialect.line_terminator = terminator;
        self
    }

    /// Предел вложенности типа записи.
    pub fn max_depth(&mut self, depth: usize) -> &mut Self {
        self.dialect.max_depth = depth;
        self
    }

    /// Режим заголовка.
    pub fn headers(&mut self, mode: HeaderMode) -> &mut Self {
        self.headers = mode;
        self
    }

    /// Колонки разной длины в [`Writer::write_columns`] — ошибка, а не усечение.
    pub fn strict_columns(&mut self, strict: bool) -> &mut Self {
        self.strict_columns = strict;
        self
    }

    /// Создаёт writer; диалект проверяется здесь.
    pub fn from_writer<W: Write>(&self, writer: W) -> Result<Writer<W>> {
        self.dialect.validate()?;
        let mut csv_writer = Writer::with_config(writer, &self.dialect, self.headers);
        csv_writer.strict_columns = self.strict_columns;
        Ok(csv_writer)
    }
}

/// Потоковый writer записей.
///
/// Каждая запись сначала собирается в строку, затем целиком уходит в
/// [`BufWriter`], так что ошибка типа записи не оставляет в выводе
/// половину строки.
///
/// # Пример
///
/// ```
/// use fastcsv::{HeaderMode, Writer};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     id: u32,
///     name: &'static str,
/// }
///
/// let mut writer = Writer::from_writer(Vec::new(), HeaderMode::Default);
/// writer.serialize(&Row { id: 1, name: "one" }).unwrap();
/// writer.serialize(&Row { id: 2, name: "a,b" }).unwrap();
/// let bytes = writer.into_inner().unwrap();
/// assert_eq!(String::from_utf8(bytes).unwrap(), "id,name\n1,one\n2,\"a,b\"\n");
/// ```
pub struct Writer<W: Write> {
    pub(crate) inner: BufWriter<W>,
    pub(crate) dialect: Dialect,
    pub(crate) headers: HeaderMode,
    pub(crate) strict_columns: bool,
    /// Флаг: записан ли заголовок.
    pub(crate) header_written: bool,
    /// Счётчик записанных записей.
    pub(crate) records_written: usize,
    /// Буфер текущей строки.
    pub(crate) line: String,
}

impl<W: Write> Writer<W> {
    /// Создаёт writer с диалектом по умолчанию.
    ///
    /// Завершение строки по умолчанию зависит от платформы; для
    /// воспроизводимого вывода задайте его через [`WriterBuilder`].
    pub fn from_writer(writer: W, headers: HeaderMode) -> Self {
        Self::with_config(writer, &Dialect::default(), headers)
    }

    pub(crate) fn with_config(writer: W, dialect: &Dialect, headers: HeaderMode) -> Self {
        Self {
            inner: BufWriter::new(writer),
            dialect: *dialect,
            headers,
            strict_columns: false,
            header_written: false,
            records_written: 0,
            line: String::new(),
        }
    }

    /// Диалект writer'а.
    #[must_use]
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Записывает одну запись.
    ///
    /// В режиме [`HeaderMode::Default`] перед первой записью выводится
    /// строка заголовка, объявленная типом `T` (см. [`declared_headers`]).
    /// Если тип нельзя обойти без значения, имена берутся из полей первой
    /// записи.
    pub fn serialize<T: Serialize + Deserialize<'static>>(&mut self, record: &T) -> Result<()> {
        let collect = self.declare_header::<T>()?;

        self.line.clear();
        let mut serializer = RecordSerializer::new(&mut self.line, &self.dialect);
        if collect {
            serializer.collect_headers();
        }
        record.serialize(&mut serializer)?;
        let names = if collect { serializer.take_headers() } else { None };

        if let Some(names) = names {
            trace!(columns = names.len(), "writing header from the first record");
            self.write_header(&names)?;
        }

        self.line.push_str(self.dialect.line_terminator.as_str());
        self.inner.write_all(self.line.as_bytes())?;
        self.records_written += 1;
        Ok(())
    }

    /// Выводит заголовок, объявленный типом `T`, если режим его требует.
    ///
    /// Возвращает `true`, когда имена придётся собрать из первой записи.
    pub(crate) fn declare_header<T: Deserialize<'static>>(&mut self) -> Result<bool> {
        if !self.headers.expects_header() || self.header_written || self.records_written > 0 {
            return Ok(false);
        }

        match declared_headers::<T>(self.dialect.max_depth) {
            Ok(Some(names)) => {
                trace!(columns = names.len(), "writing header declared by the record type");
                self.write_header(&names)?;
                Ok(false)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                debug!(error = %e, "record type has no static header, using the first record");
                Ok(true)
            }
        }
    }

    /// Записывает строку заголовка; повторные вызовы ничего не делают.
    pub fn write_header<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        let mut header = String::new();
        write_header_line(names, &self.dialect, &mut header);
        header.push_str(self.dialect.line_terminator.as_str());
        self.inner.write_all(header.as_bytes())?;
        self.header_written = true;
        Ok(())
    }

    /// Записывает несколько записей.
    ///
    /// Заголовок выводится и для пустого среза.
    pub fn serialize_all<T: Serialize + Deserialize<'static>>(&mut self, records: &[T]) -> Result<()> {
        self.declare_header::<T>()?;
        for record in records {
            self.serialize(record)?;
        }
        Ok(())
    }

    /// Принудительно сбрасывает буфер.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Возвращает количество записанных записей.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Получает ссылку на внутренний writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Извлекает внутренний writer (с предварительным flush).
    pub fn into_inner(self) -> std::result::Result<W, IntoInnerError<BufWriter<W>>> {
        self.inner.into_inner()
    }
}
