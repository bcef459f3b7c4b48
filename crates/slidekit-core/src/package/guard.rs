use super::ooxml::OoxmlPackage;
use crate::error::Result;
use crate::xml::XmlDocument;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Scoped edit of one XML part. The document is written back to the
/// package on [`commit`](Self::commit), or when the guard is dropped.
pub struct XmlPartGuard<'a> {
    package: &'a mut OoxmlPackage,
    name: String,
    doc: XmlDocument,
    flushed: bool,
}

impl<'a> XmlPartGuard<'a> {
    pub(crate) fn new(package: &'a mut OoxmlPackage, name: &str, doc: XmlDocument) -> Self {
        Self {
            package,
            name: name.to_string(),
            doc,
            flushed: false,
        }
    }

    pub fn part_name(&self) -> &str {
        &self.name
    }

    /// Writes the document back, surfacing serialization errors.
    pub fn commit(mut self) -> Result<()> {
        self.flushed = true;
        self.package.put_xml_part(&self.name, &self.doc)
    }
}

impl Deref for XmlPartGuard<'_> {
    type Target = XmlDocument;

    fn deref(&self) -> &XmlDocument {
        &self.doc
    }
}

impl DerefMut for XmlPartGuard<'_> {
    fn deref_mut(&mut self) -> &mut XmlDocument {
        &mut self.doc
    }
}

impl Drop for XmlPartGuard<'_> {
    fn drop(&mut self) {
        if self.flushed {
            return;
        }
        if let Err(e) = self.package.put_xml_part(&self.name, &self.doc) {
            warn!(part = %self.name, error = %e, "failed to flush XML part on drop");
        }
    }
}
