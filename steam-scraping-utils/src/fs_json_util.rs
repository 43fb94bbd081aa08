use std::{
    fmt::Debug,
    io::{BufReader, BufWriter},
    path::PathBuf,
};

use anyhow::{bail, Context};
use fs_err::File;
use serde::{Deserialize, Serialize};

pub fn read_json<P: Into<PathBuf> + Debug, T: for<'de> Deserialize<'de>>(
    path: P,
) -> anyhow::Result<T> {
    let path = path.into();
    (|| serde_json::from_reader(BufReader::new(File::open(&path)?)).map_err(anyhow::Error::new))()
        .with_context(|| {
            format!(
                "While trying to parse {path:?} as {}",
                std::any::type_name::<T>()
            )
        })
}
pub fn write_json<P: Into<PathBuf>, T: Serialize>(path: P, value: &T) -> anyhow::Result<()> {
    Ok(serde_json::to_writer(
        BufWriter::new(File::create(path)?),
        value,
    )?)
}

pub fn read_toml<P: Into<PathBuf> + Debug, T: for<'de> Deserialize<'de>>(
    path: P,
) -> anyhow::Result<T> {
    let path = path.into();
    (|| toml::from_str(&fs_err::read_to_string(&path)?).map_err(anyhow::Error::new))().with_context(
        || {
            format!(
                "While trying to parse {path:?} as {}",
                std::any::type_name::<T>()
            )
        },
    )
}

/// Reads a single secret (e.g. an API token) from a file.
/// Surrounding whitespace is dropped; an empty file is an error.
pub fn read_secret<P: Into<PathBuf> + Debug>(path: P) -> anyhow::Result<String> {
    let path = path.into();
    let secret = fs_err::read_to_string(&path)
        .with_context(|| format!("The secret file {path:?} could not be read"))?
        .trim()
        .to_owned();
    if secret.is_empty() {
        bail!("The secret file {path:?} is empty");
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{read_json, read_secret, read_toml, write_json};

    #[test]
    fn json_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let map = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2)]);
        write_json(&path, &map).unwrap();
        let read: BTreeMap<String, i32> = read_json(&path).unwrap();
        assert_eq!(read, map);
    }

    #[test]
    fn toml_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs_err::write(&path, "port = ").unwrap();
        let e = read_toml::<_, BTreeMap<String, u16>>(&path).unwrap_err();
        assert!(format!("{e:#}").contains("broken.toml"));
    }

    #[test]
    fn secret_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".token");
        fs_err::write(&path, "  abc123\n").unwrap();
        assert_eq!(read_secret(&path).unwrap(), "abc123");
    }

    #[test]
    fn missing_or_empty_secret_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_secret(dir.path().join("nope")).is_err());
        let path = dir.path().join("empty");
        fs_err::write(&path, "\n").unwrap();
        assert!(read_secret(&path).is_err());
    }
}
