//! Raw documents as read from disk.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::{IngestError, Result};

/// Text encoding of a document, detected from its byte order mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl SourceEncoding {
    /// Detects the encoding from a leading byte order mark, defaulting to UTF-8.
    pub fn detect(bytes: &[u8]) -> Self {
        match Encoding::for_bom(bytes) {
            Some((found, _)) if found == UTF_16LE => Self::Utf16Le,
            Some((found, _)) if found == UTF_16BE => Self::Utf16Be,
            _ => Self::Utf8,
        }
    }

    pub fn encoding(self) -> &'static Encoding {
        match self {
            Self::Utf8 => UTF_8,
            Self::Utf16Le => UTF_16LE,
            Self::Utf16Be => UTF_16BE,
        }
    }

    pub fn label(self) -> &'static str {
        self.encoding().name()
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// File name used to identify a document in reports and logs.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A document read once from disk.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub path: PathBuf,
    /// File name as written to the report.
    pub name: String,
    pub bytes: Vec<u8>,
    pub encoding: SourceEncoding,
}

impl RawDocument {
    /// Reads the whole file; the handle is closed before this returns.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(path, bytes))
    }

    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Self {
        let name = display_name(path);
        let encoding = SourceEncoding::detect(&bytes);
        Self {
            path: path.to_path_buf(),
            name,
            bytes,
            encoding,
        }
    }

    /// Decodes the content, dropping a byte order mark that matches the
    /// detected encoding. Malformed sequences are an error, never replaced.
    pub fn text(&self) -> Result<String> {
        let encoding = self.encoding.encoding();
        let body = match Encoding::for_bom(&self.bytes) {
            Some((found, bom_len)) if found == encoding => {
                self.bytes.get(bom_len..).unwrap_or_default()
            }
            _ => self.bytes.as_slice(),
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(Cow::into_owned)
            .ok_or_else(|| IngestError::Decode {
                path: self.path.clone(),
                encoding: self.encoding.label(),
                reason: "malformed byte sequence".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str, big_endian: bool) -> Vec<u8> {
        let mut bytes = if big_endian {
            vec![0xFE, 0xFF]
        } else {
            vec![0xFF, 0xFE]
        };
        for unit in text.encode_utf16() {
            let pair = if big_endian {
                unit.to_be_bytes()
            } else {
                unit.to_le_bytes()
            };
            bytes.extend_from_slice(&pair);
        }
        bytes
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<ClinicalDocument/>");
        let doc = RawDocument::from_bytes(Path::new("dir/a.xml"), bytes);
        assert_eq!(doc.name, "a.xml");
        assert_eq!(doc.encoding, SourceEncoding::Utf8);
        assert_eq!(doc.text().unwrap(), "<ClinicalDocument/>");
    }

    #[test]
    fn utf16_documents_decode() {
        for big_endian in [false, true] {
            let doc = RawDocument::from_bytes(Path::new("a.xml"), utf16("<a>é</a>", big_endian));
            assert_eq!(doc.text().unwrap(), "<a>é</a>");
        }
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let doc = RawDocument::from_bytes(Path::new("bad.xml"), vec![b'<', 0xFF, 0xFE, 0xFD]);
        assert!(matches!(
            doc.text(),
            Err(IngestError::Decode { encoding: "UTF-8", .. })
        ));
    }

    #[test]
    fn truncated_utf16_is_a_decode_error() {
        let doc = RawDocument {
            path: PathBuf::from("short.xml"),
            name: "short.xml".to_string(),
            bytes: vec![0x3C],
            encoding: SourceEncoding::Utf16Le,
        };
        assert!(matches!(
            doc.text(),
            Err(IngestError::Decode { encoding: "UTF-16LE", .. })
        ));

        let odd = RawDocument::from_bytes(Path::new("odd.xml"), vec![0xFF, 0xFE, 0x3C]);
        assert_eq!(odd.encoding, SourceEncoding::Utf16Le);
        assert!(odd.text().is_err());
    }

    #[test]
    fn utf16_bom_without_content_is_empty() {
        let doc = RawDocument::from_bytes(Path::new("empty.xml"), vec![0xFE, 0xFF]);
        assert_eq!(doc.encoding, SourceEncoding::Utf16Be);
        assert_eq!(doc.text().unwrap(), "");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = RawDocument::read(Path::new("/definitely/not/here.xml")).unwrap_err();
        assert!(matches!(err, IngestError::FileRead { .. }));
    }
}
