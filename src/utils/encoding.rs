//! Source file reading with encoding detection.
//!
//! Source files handed to the generator are not guaranteed to be UTF-8.
//! Reading goes BOM first, then strict UTF-8, then a `chardetng` guess,
//! and finally lossy UTF-8 so that a single odd file never stops a run.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::path::Path;

const DETECTION_SAMPLE: usize = 8192;

/// Read `path` as text, returning the decoded content.
pub fn read_source(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_source(&bytes))
}

/// Decode raw bytes of a source file.
pub fn decode_source(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return decoded.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let sample = &bytes[..bytes.len().min(DETECTION_SAMPLE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    let guessed = detector.guess(None, true);

    // UTF-16 guesses on BOM-less input are unreliable; lossy UTF-8 is safer.
    let encoding = if guessed == UTF_16LE || guessed == UTF_16BE { UTF_8 } else { guessed };
    let (decoded, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("Decoded source with replacement characters using {}", used.name());
    }
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_plain_utf8() {
        let mut file = NamedTempFile::new().expect("tmp");
        file.write_all("def héllo(): pass 🚀".as_bytes()).expect("write");
        file.flush().expect("flush");

        assert_eq!(read_source(file.path()).expect("read"), "def héllo(): pass 🚀");
    }

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice(b"print(1)");
        assert_eq!(decode_source(&bytes), "print(1)");
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let mut bytes = vec![0xff, 0xfe];
        for unit in "ok".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_source(&bytes), "ok");
    }

    #[test]
    fn falls_back_for_latin1_bytes() {
        let decoded = decode_source(b"caf\xe9 = 1");
        assert!(decoded.starts_with("caf"));
        assert!(decoded.ends_with(" = 1"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_source(Path::new("/definitely/not/here.py")).is_err());
    }
}
