use crate::error::{Result, SlidekitError};
use crate::xml::builder::serialize_bytes;
use crate::xml::namespaces::CT;
use crate::xml::parser::parse_bytes;
use crate::xml::{XAttribute, XName, XmlDocument, XmlNodeData};
use std::collections::BTreeMap;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// `[Content_Types].xml`: extension defaults plus per-part overrides.
/// Extensions are stored lowercased; part names carry a leading slash.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        let mut types = Self::default();
        types.add_default("rels", content_type_values::RELATIONSHIPS);
        types.add_default("xml", content_type_values::XML);
        types
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let doc = parse_bytes(bytes)?;
        let root = doc.root().ok_or_else(|| SlidekitError::InvalidPackage {
            message: format!("{} has no root element", CONTENT_TYPES_PART),
        })?;
        if !doc.is_named(root, &CT::Types()) {
            return Err(SlidekitError::InvalidPackage {
                message: format!("{} root is not <Types>", CONTENT_TYPES_PART),
            });
        }

        let mut types = Self::default();
        let extension = XName::local("Extension");
        let part_name = XName::local("PartName");
        let content_type = XName::local("ContentType");
        for child in doc.elements(root) {
            let Some(ct) = doc.attribute(child, &content_type) else {
                continue;
            };
            if doc.is_named(child, &CT::Default()) {
                if let Some(ext) = doc.attribute(child, &extension) {
                    types.add_default(ext, ct);
                }
            } else if doc.is_named(child, &CT::Override()) {
                if let Some(name) = doc.attribute(child, &part_name) {
                    types.set_content_type(name, ct);
                }
            }
        }
        Ok(types)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (mut doc, root) = XmlDocument::with_root(CT::Types(), &[("", CT::NS)]);
        for (ext, ct) in &self.defaults {
            doc.add_child(
                root,
                XmlNodeData::element_with_attrs(
                    CT::Default(),
                    vec![
                        XAttribute::new(XName::local("Extension"), ext),
                        XAttribute::new(XName::local("ContentType"), ct),
                    ],
                ),
            );
        }
        for (name, ct) in &self.overrides {
            doc.add_child(
                root,
                XmlNodeData::element_with_attrs(
                    CT::Override(),
                    vec![
                        XAttribute::new(XName::local("PartName"), name),
                        XAttribute::new(XName::local("ContentType"), ct),
                    ],
                ),
            );
        }
        serialize_bytes(&doc)
    }

    pub fn get_content_type(&self, path: &str) -> Option<&str> {
        if let Some(ct) = self.overrides.get(path) {
            return Some(ct);
        }
        // Part names are case-insensitive in OPC.
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(path))
        {
            return Some(ct);
        }

        let file_name = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        self.defaults.get(&ext.to_ascii_lowercase()).map(|s| s.as_str())
    }

    pub fn set_content_type(&mut self, path: &str, content_type: &str) {
        self.overrides.insert(path.to_string(), content_type.to_string());
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.defaults
            .get(&extension.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn remove_override(&mut self, path: &str) {
        self.overrides.remove(path);
    }

    pub fn retain_overrides(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.overrides.retain(|name, _| keep(name));
    }

    /// Registers `content_type` for a new part: a Default when the extension
    /// is free or already maps to the same type, an Override otherwise.
    pub fn register_part(&mut self, path: &str, content_type: &str) {
        let ext = path
            .rsplit('/')
            .next()
            .and_then(|f| f.rsplit_once('.'))
            .map(|(_, e)| e.to_ascii_lowercase());
        match ext {
            Some(ext) if ext != "xml" => match self.defaults.get(&ext) {
                Some(existing) if existing == content_type => {}
                None => self.add_default(&ext, content_type),
                Some(_) => self.set_content_type(path, content_type),
            },
            _ => self.set_content_type(path, content_type),
        }
    }
}

pub mod content_type_values {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";

    pub const WORD_DOCUMENT: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WORD_TEMPLATE: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
    pub const WORD_MACRO_DOCUMENT: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
    pub const WORD_MACRO_TEMPLATE: &str =
        "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";

    pub const EXCEL_WORKBOOK: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const EXCEL_TEMPLATE: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml";
    pub const EXCEL_MACRO_WORKBOOK: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";
    pub const EXCEL_MACRO_TEMPLATE: &str =
        "application/vnd.ms-excel.template.macroEnabled.main+xml";
    pub const EXCEL_ADDIN: &str = "application/vnd.ms-excel.addin.macroEnabled.main+xml";

    pub const POWERPOINT_PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const POWERPOINT_TEMPLATE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
    pub const POWERPOINT_SLIDESHOW: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";
    pub const POWERPOINT_MACRO_PRESENTATION: &str =
        "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
    pub const POWERPOINT_MACRO_TEMPLATE: &str =
        "application/vnd.ms-powerpoint.template.macroEnabled.main+xml";
    pub const POWERPOINT_MACRO_SLIDESHOW: &str =
        "application/vnd.ms-powerpoint.slideshow.macroEnabled.main+xml";

    pub const POWERPOINT_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const NOTES_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
    pub const NOTES_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml";
    pub const HANDOUT_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.handoutMaster+xml";
    pub const PRESENTATION_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
    pub const VIEW_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
    pub const TABLE_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
    pub const COMMENT_AUTHORS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.commentAuthors+xml";
    pub const COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.comments+xml";
    pub const MODERN_COMMENTS: &str = "application/vnd.ms-powerpoint.comments+xml";
    pub const AUTHORS: &str = "application/vnd.ms-powerpoint.authors+xml";
    pub const TAGS: &str = "application/vnd.openxmlformats-officedocument.presentationml.tags+xml";
    pub const LEGACY_DIAGRAM_TEXT: &str = "application/vnd.ms-powerpoint.legacyDiagramText";

    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const THEME_OVERRIDE: &str = "application/vnd.openxmlformats-officedocument.themeOverride+xml";

    pub const CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
    pub const CHART_EX: &str = "application/vnd.ms-office.chartex+xml";
    pub const CHART_STYLE: &str = "application/vnd.ms-office.chartstyle+xml";
    pub const CHART_COLORS: &str = "application/vnd.ms-office.chartcolorstyle+xml";
    pub const CHART_DRAWING: &str =
        "application/vnd.openxmlformats-officedocument.drawingml.chartshapes+xml";
    pub const DIAGRAM_DATA: &str =
        "application/vnd.openxmlformats-officedocument.drawingml.diagramData+xml";
    pub const DIAGRAM_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.drawingml.diagramLayout+xml";
    pub const DIAGRAM_STYLE: &str =
        "application/vnd.openxmlformats-officedocument.drawingml.diagramStyle+xml";
    pub const DIAGRAM_COLORS: &str =
        "application/vnd.openxmlformats-officedocument.drawingml.diagramColors+xml";
    pub const DIAGRAM_DRAWING: &str = "application/vnd.ms-office.drawingml.diagramDrawing+xml";

    pub const VML_DRAWING: &str = "application/vnd.openxmlformats-officedocument.vmlDrawing";
    pub const ACTIVEX: &str = "application/vnd.ms-office.activeX+xml";
    pub const ACTIVEX_BINARY: &str = "application/vnd.ms-office.activeX";
    pub const OLE_OBJECT: &str = "application/vnd.openxmlformats-officedocument.oleObject";
    pub const INK: &str = "application/inkml+xml";
    pub const CUSTOM_XML_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.customXmlProperties+xml";

    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const CUSTOM_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.custom-properties+xml";

    pub const FONT_DATA: &str = "application/x-fontdata";
    pub const OBFUSCATED_FONT: &str = "application/vnd.openxmlformats-officedocument.obfuscatedFont";

    pub fn is_xml(content_type: &str) -> bool {
        content_type.ends_with("+xml") || content_type == XML || content_type == VML_DRAWING
    }

    pub fn is_image(content_type: &str) -> bool {
        content_type.starts_with("image/")
    }

    pub fn is_media(content_type: &str) -> bool {
        content_type.starts_with("video/")
            || content_type.starts_with("audio/")
            || content_type == "application/vnd.ms-asf"
            || content_type == "application/x-shockwave-flash"
    }

    /// File extension for binary content. Falls back to `bin`.
    pub fn extension_for(content_type: &str) -> &'static str {
        match content_type {
            "image/png" => "png",
            "image/jpeg" => "jpeg",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            "image/x-emf" => "emf",
            "image/x-wmf" => "wmf",
            "image/svg+xml" => "svg",
            "image/vnd.ms-photo" => "wdp",
            "image/x-icon" => "ico",
            "image/pict" => "pict",
            "video/mp4" => "mp4",
            "video/x-ms-wmv" => "wmv",
            "video/avi" | "video/x-msvideo" => "avi",
            "video/quicktime" => "mov",
            "video/mpeg" => "mpg",
            "audio/mpeg" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/mp4" => "m4a",
            "audio/x-ms-wma" => "wma",
            "application/vnd.ms-asf" => "asf",
            FONT_DATA => "fntdata",
            OBFUSCATED_FONT => "odttf",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
            VML_DRAWING => "vml",
            _ => "bin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="PNG" ContentType="image/png"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#;

    #[test]
    fn parse_reads_defaults_and_overrides() {
        let types = ContentTypes::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            types.get_content_type("/ppt/presentation.xml"),
            Some(content_type_values::POWERPOINT_PRESENTATION)
        );
        assert_eq!(types.get_content_type("/ppt/media/image1.png"), Some("image/png"));
        assert_eq!(types.get_content_type("/ppt/other.xml"), Some("application/xml"));
    }

    #[test]
    fn serialized_types_parse_back() {
        let mut types = ContentTypes::new();
        types.register_part("/ppt/slides/slide1.xml", content_type_values::POWERPOINT_SLIDE);
        types.register_part("/ppt/media/image1.jpeg", "image/jpeg");

        let bytes = types.to_bytes().unwrap();
        let reparsed = ContentTypes::parse(&bytes).unwrap();

        assert_eq!(
            reparsed.get_content_type("/ppt/slides/slide1.xml"),
            Some(content_type_values::POWERPOINT_SLIDE)
        );
        assert_eq!(reparsed.default_for("jpeg"), Some("image/jpeg"));
    }

    #[test]
    fn conflicting_extension_becomes_override() {
        let mut types = ContentTypes::new();
        types.register_part("/ppt/embeddings/oleObject1.bin", content_type_values::OLE_OBJECT);
        types.register_part("/ppt/activeX/activeX1.bin", content_type_values::ACTIVEX_BINARY);

        assert_eq!(
            types.get_content_type("/ppt/embeddings/oleObject1.bin"),
            Some(content_type_values::OLE_OBJECT)
        );
        assert_eq!(
            types.get_content_type("/ppt/activeX/activeX1.bin"),
            Some(content_type_values::ACTIVEX_BINARY)
        );
    }
}
