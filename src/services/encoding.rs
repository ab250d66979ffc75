use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use serde::Serialize;

use crate::error::CatalogError;

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub source: DetectionSource,
    pub candidates: Vec<EncodingCandidate>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    Bom,
    Declaration,
    Utf8,
    Guess,
}

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^<\?xml[^>]*\bencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
            .expect("declaration regex is valid")
    })
}

/// Label from `<?xml ... encoding="..."?>` at the start of the document.
fn declared_label(bytes: &[u8]) -> Option<&[u8]> {
    let head = &bytes[..bytes.len().min(256)];
    declaration_re()
        .captures(head)
        .and_then(|c| c.get(1))
        .map(|m| m.as_bytes())
}

fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize, DetectionSource) {
    if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
        return (enc, bom_len, DetectionSource::Bom);
    }

    if let Some(enc) = declared_label(bytes).and_then(Encoding::for_label) {
        // utf-16 without a BOM is not something a declaration can fix
        if enc.is_ascii_compatible() {
            return (enc, 0, DetectionSource::Declaration);
        }
    }

    if std::str::from_utf8(bytes).is_ok() {
        return (UTF_8, 0, DetectionSource::Utf8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    (detector.guess(None, true), 0, DetectionSource::Guess)
}

/// Decodes a catalog file's bytes. Input that does not decode cleanly in
/// the chosen encoding is rejected rather than patched with U+FFFD.
pub fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, CatalogError> {
    let (encoding, bom_len, _) = detect_encoding(bytes);
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or_else(|| CatalogError::Encoding(encoding.name().to_string()))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    let (encoding, _, source) = detect_encoding(bytes);
    let best = encoding.name().to_lowercase();

    let confidence = match source {
        DetectionSource::Bom => 0.99,
        DetectionSource::Declaration => 0.95,
        DetectionSource::Utf8 | DetectionSource::Guess => estimate_confidence(bytes, encoding),
    };

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    if best == "utf-8" && source != DetectionSource::Bom {
        candidates.push(EncodingCandidate {
            name: "windows-1252".into(),
            confidence: (confidence - 0.40).max(0.0),
        });
    } else if best == "windows-1252" {
        candidates.push(EncodingCandidate {
            name: "iso-8859-15".into(),
            confidence: (confidence - 0.05).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        source,
        candidates,
    }
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult, CatalogError> {
    let bytes = fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(detect(&bytes))
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8() {
        let text = "<TS><context><name>Äänitaso</name></context></TS>";
        assert_eq!(decode(text.as_bytes()).unwrap(), text);
        assert_eq!(detect(text.as_bytes()).source, DetectionSource::Utf8);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<TS/>");
        assert_eq!(decode(&bytes).unwrap(), "<TS/>");
        let result = detect(&bytes);
        assert_eq!(result.source, DetectionSource::Bom);
        assert_eq!(result.best, "utf-8");
    }

    #[test]
    fn utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<TS/>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode(&bytes).unwrap(), "<TS/>");
    }

    #[test]
    fn declared_latin1() {
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><TS><context><name>"#.to_vec();
        bytes.push(0xC4); // Ä
        bytes.extend_from_slice(b"</name></context></TS>");

        let text = decode(&bytes).unwrap();
        assert!(text.contains("<name>Ä</name>"));
        assert_eq!(detect(&bytes).source, DetectionSource::Declaration);
    }

    #[test]
    fn broken_utf8_declared_as_utf8_is_an_error() {
        let mut bytes = br#"<?xml version="1.0" encoding="utf-8"?><TS>"#.to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(b"</TS>");
        assert!(matches!(decode(&bytes), Err(CatalogError::Encoding(_))));
    }
}
