//! Потоковый reader для CSV-документов.
//!
//! Предоставляет [`Reader`], который разбирает записи из текстового буфера
//! по одной строке, и [`ReaderBuilder`] для настройки диалекта.

use std::marker::PhantomData;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::{
    dialect::{Dialect, HeaderMode, QuoteMode},
    error::Result,
    record::decode_record,
    scanner::Scanner,
};

/// Настройки для создания [`Reader`].
///
/// # Пример
///
/// ```
/// use fastcsv::ReaderBuilder;
///
/// let mut reader = ReaderBuilder::new().delimiter(b';').from_text("id;name\n1;one\n").unwrap();
/// let row: Option<(u32, String)> = reader.read_record().unwrap();
/// assert_eq!(row, Some((1, "one".to_string())));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReaderBuilder {
    dialect: Dialect,
    headers: HeaderMode,
}

impl ReaderBuilder {
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

    /// Поведение при незакрытой кавычке.
    pub fn quote_mode(&mut self, mode: QuoteMode) -> &mut Self {
        self.dialect.quote_mode = mode;
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

    /// Создаёт reader над буфером; диалект проверяется здесь.
    pub fn from_text<'a>(&self, text: &'a str) -> Result<Reader<'a>> {
        self.dialect.validate()?;
        Ok(Reader::with_config(text, &self.dialect, self.headers))
    }
}

/// Reader записей поверх текстового буфера.
///
/// Записи не копируют буфер: строковые поля могут заимствовать `&'a str`.
/// Первая ошибка прерывает чтение: последующие вызовы возвращают `Ok(None)`.
/// Номер строки (с учётом заголовка) доступен через
/// [`CsvError::line`](crate::CsvError::line).
pub struct Reader<'a> {
    scanner: Scanner<'a>,
    headers: HeaderMode,
    /// Флаг: был ли обработан заголовок.
    header_skipped: bool,
    /// Флаг остановки после ошибки.
    finished: bool,
    /// Номер последней прочитанной строки (1-based).
    line: usize,
    /// Счётчик прочитанных записей.
    records_read: usize,
}

impl<'a> Reader<'a> {
    /// Создаёт reader с диалектом по умолчанию.
    pub fn from_text(text: &'a str, headers: HeaderMode) -> Self {
        Self::with_config(text, &Dialect::default(), headers)
    }

    pub(crate) fn with_config(text: &'a str, dialect: &Dialect, headers: HeaderMode) -> Self {
        Self {
            scanner: Scanner::new(text, dialect),
            headers,
            header_skipped: false,
            finished: false,
            line: 0,
            records_read: 0,
        }
    }

    /// Диалект reader'а.
    #[must_use]
    pub fn dialect(&self) -> &Dialect {
        self.scanner.dialect()
    }

    /// Читает одну запись.
    ///
    /// Возвращает `Ok(None)` в конце буфера. Пустая строка в середине
    /// документа тоже является записью (из одной пустой колонки).
    pub fn read_record<T: Deserialize<'a>>(&mut self) -> Result<Option<T>> {
        self.skip_header();

        if self.finished || self.scanner.end_of_file() {
            return Ok(None);
        }

        self.line += 1;
        let record = match decode_record(&mut self.scanner) {
            Ok(record) => record,
            Err(e) => {
                self.finished = true; // Остановка при ошибке
                return Err(e.at_line(self.line));
            }
        };
        self.scanner.advance_line();
        self.records_read += 1;

        Ok(Some(record))
    }

    /// Итератор по оставшимся записям.
    pub fn deserialize<T: Deserialize<'a>>(&mut self) -> DeserializeRecords<'_, 'a, T> {
        DeserializeRecords { reader: self, finished: false, _record: PhantomData }
    }

    /// Читает все оставшиеся записи.
    pub fn read_all<T: Deserialize<'a>>(&mut self) -> Result<Vec<T>> {
        self.skip_header();
        let mut records = Vec::with_capacity(self.estimate_rows());
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        debug!(records = records.len(), lines = self.line, "read CSV document");
        Ok(records)
    }

    /// Возвращает количество успешно прочитанных записей.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Номер последней прочитанной строки (заголовок учитывается).
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn skip_header(&mut self) {
        if self.header_skipped {
            return;
        }
        self.header_skipped = true;
        if self.headers.expects_header() && !self.scanner.end_of_file() {
            self.scanner.advance_line();
            self.line += 1;
            trace!("skipped header line");
        }
    }

    /// Оценка числа строк по длине текущей (первой с данными) строки.
    pub(crate) fn estimate_rows(&self) -> usize {
        match self.scanner.line_len_hint() {
            0 => 0,
            hint => self.scanner.text().len() / (hint + 1),
        }
    }
}

/// Итератор записей, возвращаемый [`Reader::deserialize`].
///
/// После первой ошибки возвращает `None`.
pub struct DeserializeRecords<'r, 'a, T> {
    reader: &'r mut Reader<'a>,
    /// Флаг достижения конца буфера или ошибки.
    finished: bool,
    _record: PhantomData<T>,
}

impl<'a, T: Deserialize<'a>> Iterator for DeserializeRecords<'_, 'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true; // Остановка при ошибке
                Some(Err(e))
            }
        }
    }
}
