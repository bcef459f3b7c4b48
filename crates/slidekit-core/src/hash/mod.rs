pub mod sha256;

pub use sha256::{fingerprint, fingerprint_str, fingerprint_xml};
