//! Reading and writing JSON documents on disk.

use crate::Result;
use camino::Utf8Path;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};

/// Load a JSON document from a file.
pub fn load<T>(path: &Utf8Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let file = File::open(path).into_app_err_with(|| format!("unable to open file '{path}'"))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).into_app_err_with(|| format!("unable to parse file '{path}'"))
}

/// Save a JSON document to a file, creating parent directories as needed.
pub fn save<T>(data: &T, path: &Utf8Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_app_err_with(|| format!("unable to create directory '{parent}'"))?;
    }

    let file = File::create(path).into_app_err_with(|| format!("unable to create file '{path}'"))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, data).into_app_err_with(|| format!("unable to write file '{path}'"))?;
    writer.flush().into_app_err_with(|| format!("unable to flush file '{path}'"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: u64,
    }

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri does not support file system operations")]
    fn test_save_creates_parents_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "nested/doc.json");

        let original = TestData {
            name: "test".to_string(),
            value: 42,
        };
        save(&original, &path).unwrap();

        let loaded: TestData = load(&path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri does not support file system operations")]
    fn test_load_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<TestData> = load(&temp_path(&dir, "missing.json"));
        assert!(result.unwrap_err().to_string().contains("unable to open"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri does not support file system operations")]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "bad.json");
        fs::write(&path, "not valid json").unwrap();

        let result: Result<TestData> = load(&path);
        assert!(result.unwrap_err().to_string().contains("unable to parse"));
    }
}
