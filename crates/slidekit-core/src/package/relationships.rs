use super::pack_uri;
use crate::error::{Result, SlidekitError};
use crate::xml::builder::serialize_bytes;
use crate::xml::namespaces::PR;
use crate::xml::parser::parse_bytes;
use crate::xml::{XAttribute, XName, XmlDocument, XmlNodeData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum TargetMode {
    #[default]
    Internal,
    External,
}

/// One relationship. Internal targets hold the resolved absolute part name;
/// external targets hold the URI as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default)]
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn new(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::Internal,
        }
    }

    pub fn external(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::External,
        }
    }

    pub fn is_external(&self) -> bool {
        self.target_mode == TargetMode::External
    }
}

/// Outgoing relationships of one part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `.rels` part owned by `source`.
    pub fn parse(bytes: &[u8], source: &str) -> Result<Self> {
        let doc = parse_bytes(bytes)?;
        let mut rels = Self::new();
        let Some(root) = doc.root() else {
            return Ok(rels);
        };

        let id_name = XName::local("Id");
        let type_name = XName::local("Type");
        let target_name = XName::local("Target");
        let mode_name = XName::local("TargetMode");

        for node in doc.elements_by_name(root, &PR::Relationship()) {
            let (Some(id), Some(rel_type), Some(target)) = (
                doc.attribute(node, &id_name),
                doc.attribute(node, &type_name),
                doc.attribute(node, &target_name),
            ) else {
                return Err(SlidekitError::InvalidRelationship {
                    message: format!(
                        "relationship in {} lacks Id, Type or Target",
                        pack_uri::rels_uri(source)
                    ),
                });
            };

            let rel = if doc.attribute(node, &mode_name) == Some("External") {
                Relationship::external(id, rel_type, target)
            } else {
                Relationship::new(id, rel_type, &pack_uri::from_rel_ref(source, target))
            };
            rels.add(source, rel)?;
        }
        Ok(rels)
    }

    pub fn to_bytes(&self, source: &str) -> Result<Vec<u8>> {
        let (mut doc, root) = XmlDocument::with_root(PR::Relationships(), &[("", PR::NS)]);
        for rel in &self.items {
            let target = match rel.target_mode {
                TargetMode::External => rel.target.clone(),
                TargetMode::Internal => pack_uri::relative_ref(source, &rel.target),
            };
            let mut attrs = vec![
                XAttribute::new(XName::local("Id"), &rel.id),
                XAttribute::new(XName::local("Type"), &rel.rel_type),
                XAttribute::new(XName::local("Target"), &target),
            ];
            if rel.is_external() {
                attrs.push(XAttribute::new(XName::local("TargetMode"), "External"));
            }
            doc.add_child(root, XmlNodeData::element_with_attrs(PR::Relationship(), attrs));
        }
        serialize_bytes(&doc)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Relationship] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn by_type<'a, 'b>(
        &'a self,
        rel_type: &'b str,
    ) -> impl Iterator<Item = &'a Relationship> + 'b
    where
        'a: 'b,
    {
        self.items.iter().filter(move |r| r.rel_type == rel_type)
    }

    /// First internal relationship pointing at `target`.
    pub fn find_internal(&self, target: &str) -> Option<&Relationship> {
        self.items
            .iter()
            .find(|r| !r.is_external() && r.target == target)
    }

    pub fn find(&self, target: &str, rel_type: &str) -> Option<&Relationship> {
        self.items
            .iter()
            .find(|r| !r.is_external() && r.target == target && r.rel_type == rel_type)
    }

    /// `rId{N}` with N one past the largest numeric `rId` suffix in use.
    pub fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    pub fn add(&mut self, source: &str, rel: Relationship) -> Result<()> {
        if self.contains(&rel.id) {
            return Err(SlidekitError::DuplicateRelationshipId {
                part: source.to_string(),
                id: rel.id,
            });
        }
        self.items.push(rel);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let index = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(index))
    }

    /// Drops every internal relationship targeting `target`.
    pub fn remove_targeting(&mut self, target: &str) {
        self.items.retain(|r| r.is_external() || r.target != target);
    }
}

pub mod relationship_types {
    const OFFICE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    macro_rules! office_rel {
        ($name:ident, $suffix:literal) => {
            pub const $name: &str = concat!(
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/",
                $suffix
            );
        };
    }

    office_rel!(OFFICE_DOCUMENT, "officeDocument");
    office_rel!(EXTENDED_PROPERTIES, "extended-properties");
    office_rel!(CUSTOM_PROPERTIES, "custom-properties");
    office_rel!(SLIDE, "slide");
    office_rel!(SLIDE_LAYOUT, "slideLayout");
    office_rel!(SLIDE_MASTER, "slideMaster");
    office_rel!(NOTES_SLIDE, "notesSlide");
    office_rel!(NOTES_MASTER, "notesMaster");
    office_rel!(HANDOUT_MASTER, "handoutMaster");
    office_rel!(THEME, "theme");
    office_rel!(THEME_OVERRIDE, "themeOverride");
    office_rel!(PRESENTATION_PROPERTIES, "presProps");
    office_rel!(VIEW_PROPERTIES, "viewProps");
    office_rel!(TABLE_STYLES, "tableStyles");
    office_rel!(COMMENT_AUTHORS, "commentAuthors");
    office_rel!(COMMENTS, "comments");
    office_rel!(TAGS, "tags");
    office_rel!(IMAGE, "image");
    office_rel!(HYPERLINK, "hyperlink");
    office_rel!(VIDEO, "video");
    office_rel!(AUDIO, "audio");
    office_rel!(OLE_OBJECT, "oleObject");
    office_rel!(PACKAGE, "package");
    office_rel!(CHART, "chart");
    office_rel!(CHART_USER_SHAPES, "chartUserShapes");
    office_rel!(DIAGRAM_DATA, "diagramData");
    office_rel!(DIAGRAM_LAYOUT, "diagramLayout");
    office_rel!(DIAGRAM_STYLE, "diagramQuickStyle");
    office_rel!(DIAGRAM_COLORS, "diagramColors");
    office_rel!(FONT, "font");
    office_rel!(CUSTOM_XML, "customXml");
    office_rel!(CUSTOM_XML_PROPERTIES, "customXmlProps");
    office_rel!(VML_DRAWING, "vmlDrawing");
    office_rel!(CONTROL, "control");
    office_rel!(SLIDE_UPDATE_INFO, "slideUpdateInfo");

    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const THUMBNAIL: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/thumbnail";

    pub const MEDIA: &str = "http://schemas.microsoft.com/office/2007/relationships/media";
    pub const HD_PHOTO: &str = "http://schemas.microsoft.com/office/2007/relationships/hdphoto";
    pub const DIAGRAM_DRAWING: &str =
        "http://schemas.microsoft.com/office/2007/relationships/diagramDrawing";
    pub const ACTIVEX_BINARY: &str =
        "http://schemas.microsoft.com/office/2006/relationships/activeXControlBinary";
    pub const LEGACY_DIAGRAM_TEXT: &str =
        "http://schemas.microsoft.com/office/2006/relationships/legacyDiagramText";
    pub const CHART_STYLE: &str = "http://schemas.microsoft.com/office/2011/relationships/chartStyle";
    pub const CHART_COLORS: &str =
        "http://schemas.microsoft.com/office/2011/relationships/chartColorStyle";
    pub const CHART_EX: &str = "http://schemas.microsoft.com/office/2014/relationships/chartEx";
    pub const MODERN_COMMENTS: &str =
        "http://schemas.microsoft.com/office/2018/10/relationships/comments";
    pub const AUTHORS: &str = "http://schemas.microsoft.com/office/2018/10/relationships/authors";

    /// Relationship types whose targets go through the image cache.
    pub fn is_image(rel_type: &str) -> bool {
        rel_type == IMAGE || rel_type == HD_PHOTO
    }

    /// Relationship types whose targets go through the media cache.
    pub fn is_media(rel_type: &str) -> bool {
        rel_type == MEDIA || rel_type == VIDEO || rel_type == AUDIO
    }

    pub fn is_office(rel_type: &str) -> bool {
        rel_type.starts_with(OFFICE)
    }
}
