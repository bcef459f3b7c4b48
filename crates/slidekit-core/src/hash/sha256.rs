use sha2::{Digest, Sha256};

/// Hex SHA-256 of `bytes`. Used as a bucket key only; equality checks
/// compare the bytes themselves.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn fingerprint_str(s: &str) -> String {
    fingerprint(s.as_bytes())
}

/// Fingerprint of an XML part after a parse/serialize pass, so that copies
/// written by this crate match their originals. Falls back to the raw bytes
/// when the part does not parse.
pub fn fingerprint_xml(bytes: &[u8]) -> String {
    crate::xml::parser::parse_bytes(bytes)
        .and_then(|doc| crate::xml::builder::serialize_bytes(&doc))
        .map(|canonical| fingerprint(&canonical))
        .unwrap_or_else(|_| fingerprint(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_of_empty_input() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn fingerprint_of_text() {
        assert_eq!(
            fingerprint_str("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn xml_fingerprint_ignores_declaration_and_spacing_in_tags() {
        let a = br#"<?xml version="1.0" encoding="UTF-8"?><a:theme xmlns:a="urn:a" name="Office"/>"#;
        let b = br#"<a:theme xmlns:a="urn:a" name="Office" />"#;
        assert_eq!(fingerprint_xml(a), fingerprint_xml(b));
    }

    #[test]
    fn xml_fingerprint_falls_back_to_bytes() {
        assert_eq!(fingerprint_xml(b"<unclosed"), fingerprint(b"<unclosed"));
    }
}
