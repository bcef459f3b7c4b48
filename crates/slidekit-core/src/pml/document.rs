use crate::error::{Result, SlidekitError};
use crate::package::relationship_types as rt;
use crate::package::OoxmlPackage;
use crate::types::DocumentType;
use crate::util::paragraph_texts;
use crate::xml::namespaces::{P, R};
use crate::xml::{XName, XmlDocument};
use indextree::NodeId;
use std::path::Path;
use tracing::debug;

/// A presentation package. Cheap to share read-only across threads.
#[derive(Debug, Clone)]
pub struct PmlDocument {
    package: OoxmlPackage,
    file_name: Option<String>,
}

impl PmlDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(OoxmlPackage::open(bytes)?)
    }

    pub fn from_package(package: OoxmlPackage) -> Result<Self> {
        if package.document_type() != DocumentType::PowerPoint {
            return Err(SlidekitError::UnsupportedDocumentKind {
                content_type: package
                    .content_type(package.main_part_name())
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        Ok(Self {
            package,
            file_name: None,
        })
    }

    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = Self::from_package(OoxmlPackage::open_file(path)?)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self {
            file_name: name,
            ..doc
        })
    }

    /// An empty presentation: no slides, masters, or size.
    pub fn new_empty() -> Result<Self> {
        Self::from_package(OoxmlPackage::create_empty(DocumentType::PowerPoint)?)
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.package.save()
    }

    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        self.package.save_as(path)
    }

    pub fn package(&self) -> &OoxmlPackage {
        &self.package
    }

    pub fn package_mut(&mut self) -> &mut OoxmlPackage {
        &mut self.package
    }

    pub fn into_package(self) -> OoxmlPackage {
        self.package
    }

    pub fn presentation_part(&self) -> &str {
        self.package.main_part_name()
    }

    fn presentation(&self) -> Result<(XmlDocument, NodeId)> {
        let doc = self.package.xml_part(self.presentation_part())?;
        let root = doc.root().ok_or_else(|| SlidekitError::InvalidPackage {
            message: format!("{} has no root element", self.presentation_part()),
        })?;
        Ok((doc, root))
    }

    /// Slide part names in `p:sldIdLst` order. Entries whose relationship
    /// does not resolve are skipped.
    pub fn slide_parts(&self) -> Result<Vec<String>> {
        self.id_list_parts(&P::sldIdLst(), &P::sldId())
    }

    pub fn slide_master_parts(&self) -> Result<Vec<String>> {
        self.id_list_parts(&P::sldMasterIdLst(), &P::sldMasterId())
    }

    fn id_list_parts(&self, list: &XName, entry: &XName) -> Result<Vec<String>> {
        let (doc, root) = self.presentation()?;
        let Some(list) = doc.child_element(root, list) else {
            return Ok(Vec::new());
        };

        let mut parts = Vec::new();
        for node in doc.elements_by_name(list, entry) {
            let Some(r_id) = doc.attribute(node, &R::id()) else {
                continue;
            };
            match self.package.part_by_id(self.presentation_part(), r_id) {
                Some(part) if self.package.contains_part(part) => parts.push(part.to_string()),
                _ => debug!(r_id, "skipping unresolvable id list entry"),
            }
        }
        Ok(parts)
    }

    pub fn slide_count(&self) -> Result<usize> {
        Ok(self.slide_parts()?.len())
    }

    /// `p:sldSz` as (cx, cy) in EMUs.
    pub fn slide_size(&self) -> Result<Option<(i64, i64)>> {
        let (doc, root) = self.presentation()?;
        Ok(doc
            .child_element(root, &P::sldSz())
            .and_then(|node| read_extent(&doc, node)))
    }

    /// Text of the slide's title placeholder (`title` or `ctrTitle`).
    pub fn slide_title(&self, slide_part: &str) -> Result<Option<String>> {
        let doc = self.package.xml_part(slide_part)?;
        let Some(root) = doc.root() else {
            return Ok(None);
        };

        let ph_type = XName::local("type");
        for sp in doc.descendants_named(root, &P::sp()) {
            let is_title = doc
                .find_path(sp, &[P::nvSpPr(), P::nvPr(), P::ph()])
                .and_then(|ph| doc.attribute(ph, &ph_type))
                .map(|t| t == "title" || t == "ctrTitle")
                .unwrap_or(false);
            if !is_title {
                continue;
            }
            let text = doc
                .child_element(sp, &P::txBody())
                .map(|body| paragraph_texts(&doc, body).join(" "))
                .unwrap_or_default();
            let text = text.trim();
            if !text.is_empty() {
                return Ok(Some(text.to_string()));
            }
        }
        Ok(None)
    }

    /// Paragraph texts of the slide's shape tree, in document order.
    pub fn slide_text(&self, slide_part: &str) -> Result<Vec<String>> {
        let doc = self.package.xml_part(slide_part)?;
        let Some(root) = doc.root() else {
            return Ok(Vec::new());
        };
        Ok(doc
            .find_path(root, &[P::cSld(), P::spTree()])
            .map(|tree| paragraph_texts(&doc, tree))
            .unwrap_or_default())
    }

    pub fn notes_part(&self, slide_part: &str) -> Option<&str> {
        self.package.related_part(slide_part, rt::NOTES_SLIDE)
    }

    pub fn title(&self) -> Option<String> {
        self.package.title()
    }
}

pub(crate) fn read_extent(doc: &XmlDocument, node: NodeId) -> Option<(i64, i64)> {
    let cx = doc.attribute(node, &XName::local("cx"))?.parse().ok()?;
    let cy = doc.attribute(node, &XName::local("cy"))?.parse().ok()?;
    Some((cx, cy))
}
