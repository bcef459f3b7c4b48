use super::content_types::content_type_values;
use super::part_kind::PartKind;
use super::relationships::Relationships;

/// A stored part: raw bytes plus its outgoing relationships. XML parts are
/// parsed on demand by the package.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub relationships: Relationships,
}

impl Part {
    pub fn new(name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            content_type: content_type.to_string(),
            data,
            relationships: Relationships::new(),
        }
    }

    pub fn is_xml(&self) -> bool {
        content_type_values::is_xml(&self.content_type)
    }

    pub fn kind(&self) -> Option<PartKind> {
        PartKind::from_content_type(&self.content_type)
    }
}
