//! Reading structured documents (JSON or TOML) into the JSON value model.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors reading a document from disk
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("{0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are TOML, everything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

/// A parsed document plus the digest of its raw bytes
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub path: PathBuf,
    pub value: Value,
    /// SHA-256 of the raw file bytes, hex encoded
    pub digest: String,
}

/// Read and parse a document
pub fn read_document(path: &Path) -> Result<RawDocument, DocumentError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            DocumentError::NotFound(path.to_path_buf())
        } else {
            DocumentError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let digest = hex::encode(Sha256::digest(&bytes));

    let contents = String::from_utf8(bytes).map_err(|e| DocumentError::Parse {
        path: path.to_path_buf(),
        message: format!("invalid UTF-8: {}", e),
    })?;

    let value = parse_str(&contents, DocumentFormat::from_path(path)).map_err(|message| {
        DocumentError::Parse {
            path: path.to_path_buf(),
            message,
        }
    })?;

    Ok(RawDocument {
        path: path.to_path_buf(),
        value,
        digest,
    })
}

/// Parse document text in the given format
pub fn parse_str(contents: &str, format: DocumentFormat) -> Result<Value, String> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(contents).map_err(|e| format!("JSON parse error: {}", e))
        }
        DocumentFormat::Toml => toml::from_str::<toml::Value>(contents)
            .map(toml_to_json)
            .map_err(|e| format!("TOML parse error: {}", e)),
    }
}

/// Convert TOML Value to JSON Value
pub fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Human-readable kind of a JSON value, for diagnostics
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.TOML")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a/b")), DocumentFormat::Json);
    }

    #[test]
    fn test_read_json_document() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, r#"{{"mainApiHost": "10.0.0.1"}}"#).unwrap();

        let doc = read_document(temp.path()).unwrap();
        assert_eq!(doc.value["mainApiHost"], "10.0.0.1");
        assert_eq!(doc.digest.len(), 64);
    }

    #[test]
    fn test_read_toml_document() {
        let mut temp = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(temp, "devtool = \"eval\"").unwrap();
        writeln!(temp, "[resolve]").unwrap();
        writeln!(temp, "extensions = [\".ts\"]").unwrap();

        let doc = read_document(temp.path()).unwrap();
        assert_eq!(doc.value["devtool"], "eval");
        assert_eq!(doc.value["resolve"]["extensions"][0], ".ts");
    }

    #[test]
    fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound(_)));
    }

    #[test]
    fn test_malformed_document() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "{{ not json").unwrap();

        let err = read_document(temp.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_digest_is_stable() {
        let mut a = NamedTempFile::new().unwrap();
        let mut b = NamedTempFile::new().unwrap();
        write!(a, "{{}}").unwrap();
        write!(b, "{{}}").unwrap();
        assert_eq!(
            read_document(a.path()).unwrap().digest,
            read_document(b.path()).unwrap().digest
        );
    }
}
