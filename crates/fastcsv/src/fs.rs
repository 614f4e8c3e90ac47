//! Файловые помощники.
//!
//! Файл читается и пишется целиком; имя файла обязано иметь расширение
//! `.csv`. Ошибки файловой системы имеют категорию
//! [`ErrorKind::Io`](crate::ErrorKind::Io) и не смешиваются с ошибками разбора.

use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::trace;

use crate::{
    columns::WriteColumns,
    dialect::{CSV_EXTENSION, HeaderMode},
    document,
    error::{CsvError, Result},
};

fn check_extension(path: &Path) -> Result<()> {
    match path.extension() {
        Some(ext) if ext == CSV_EXTENSION => Ok(()),
        _ => Err(CsvError::WrongExtension { path: path.to_path_buf(), expected: CSV_EXTENSION }),
    }
}

/// Читает файл целиком.
///
/// Проверяет, что файл существует и является обычным файлом, затем
/// расширение, и только потом читает содержимое.
pub fn load_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CsvError::FileNotFound(path.to_path_buf()));
    }
    check_extension(path)?;

    let text =
        std::fs::read_to_string(path).map_err(|source| CsvError::ReadFile { path: path.to_path_buf(), source })?;
    trace!(path = %path.display(), bytes = text.len(), "loaded CSV file");
    Ok(text)
}

/// Записывает текст в файл, создавая или перезаписывая его.
pub fn save_text(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();
    check_extension(path)?;

    std::fs::write(path, text).map_err(|source| CsvError::WriteFile { path: path.to_path_buf(), source })?;
    trace!(path = %path.display(), bytes = text.len(), "saved CSV file");
    Ok(())
}

/// Читает все записи из файла.
///
/// Записи владеют своими данными: буфер файла не переживает вызов.
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>, headers: HeaderMode) -> Result<Vec<T>> {
    let text = load_text(path)?;
    document::from_str(&text, headers)
}

/// Записывает записи в файл.
pub fn save<T: Serialize + Deserialize<'static>>(path: impl AsRef<Path>, records: &[T], headers: HeaderMode) -> Result<()> {
    let text = document::to_string(records, headers)?;
    save_text(path, &text)
}

/// Записывает колонки в файл (см. [`crate::write_columns`]).
pub fn save_columns<C: WriteColumns>(path: impl AsRef<Path>, headers: Option<&[&str]>, columns: &C) -> Result<()> {
    let text = crate::columns::write_columns(headers, columns)?;
    save_text(path, &text)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct City {
        name: String,
        population: u64,
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cities.csv");
        let cities = vec![
            City { name: "Москва".to_string(), population: 13_000_000 },
            City { name: "Tromsø, Norway".to_string(), population: 77_000 },
        ];

        save(&path, &cities, HeaderMode::Default).unwrap();
        let text = load_text(&path).unwrap();
        assert!(text.starts_with("name,population\n"));

        let loaded: Vec<City> = load(&path, HeaderMode::Default).unwrap();
        assert_eq!(loaded, cities);
    }

    #[test]
    fn test_save_empty_keeps_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        save::<City>(&path, &[], HeaderMode::Default).unwrap();
        assert_eq!(load_text(&path).unwrap(), "name,population\n");
        assert!(load::<City>(&path, HeaderMode::Default).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_text(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, CsvError::FileNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        let err = load_text(dir.path()).unwrap_err();
        assert!(matches!(err, CsvError::FileNotFound(_)));
    }

    #[test]
    fn test_wrong_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "1,2\n").unwrap();

        let err = load_text(&path).unwrap_err();
        assert!(matches!(err, CsvError::WrongExtension { expected: "csv", .. }));
        assert_eq!(err.kind(), ErrorKind::Io);

        let err = save_text(&path, "1,2\n").unwrap_err();
        assert!(matches!(err, CsvError::WrongExtension { .. }));
    }

    #[test]
    fn test_parse_error_is_not_io() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        save_text(&path, "name,population\nOslo,many\n").unwrap();

        let err = load::<City>(&path, HeaderMode::Default).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_save_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("columns.csv");
        save_columns(&path, Some(&["x", "y"][..]), &(vec![1, 2], vec![3, 4])).unwrap();
        assert_eq!(load_text(&path).unwrap(), "x,y\n1,3\n2,4\n");
    }
}
