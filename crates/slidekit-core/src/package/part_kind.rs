//! Capability table for the part kinds the copy engine creates.
//!
//! Each kind knows its content type (when fixed), the relationship type a
//! parent uses to reach it, where new instances go in the package, and which
//! kinds of sub-parts it may own.

use super::content_types::content_type_values as ct;
use super::relationships::relationship_types as rt;
use crate::types::DocumentType;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartKind {
    Presentation,
    Slide,
    SlideLayout,
    SlideMaster,
    NotesSlide,
    NotesMaster,
    HandoutMaster,
    Theme,
    ThemeOverride,
    PresentationProperties,
    ViewProperties,
    TableStyles,
    CommentAuthors,
    Comments,
    ModernComments,
    Authors,
    Tags,
    Chart,
    ChartEx,
    ChartStyle,
    ChartColors,
    ChartDrawing,
    DiagramData,
    DiagramLayout,
    DiagramStyle,
    DiagramColors,
    DiagramDrawing,
    VmlDrawing,
    ActiveX,
    ActiveXBinary,
    OleObject,
    EmbeddedPackage,
    Ink,
    CustomXml,
    CustomXmlProperties,
    CoreProperties,
    ExtendedProperties,
    CustomProperties,
    Thumbnail,
    Font,
    Image,
    Media,
    LegacyDiagramText,
}

/// Kinds of sub-parts a part may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Images,
    Media,
    Charts,
    Diagrams,
    OleObjects,
    ActiveX,
    Ink,
    Tags,
    VmlDrawings,
    Themes,
    Layouts,
    Notes,
    Comments,
    ChartParts,
    EmbeddedData,
    CustomXml,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Images => "images",
            Self::Media => "media",
            Self::Charts => "charts",
            Self::Diagrams => "diagrams",
            Self::OleObjects => "OLE objects",
            Self::ActiveX => "ActiveX controls",
            Self::Ink => "ink",
            Self::Tags => "tags",
            Self::VmlDrawings => "VML drawings",
            Self::Themes => "themes",
            Self::Layouts => "layouts",
            Self::Notes => "notes",
            Self::Comments => "comments",
            Self::ChartParts => "chart styles",
            Self::EmbeddedData => "embedded data",
            Self::CustomXml => "custom XML",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct PartKindInfo {
    pub kind: PartKind,
    /// Fixed content type. `None` for binary kinds, whose type comes from
    /// the source part.
    pub content_type: Option<&'static str>,
    pub rel_type: &'static str,
    pub folder: &'static str,
    pub stem: &'static str,
    /// Fixed extension. `None` derives it from the content type.
    pub extension: Option<&'static str>,
    /// Singletons take the bare `{folder}/{stem}.{ext}` name when it is free.
    pub singleton: bool,
    pub capabilities: &'static [Capability],
}

impl PartKindInfo {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn is_xml(&self) -> bool {
        self.content_type.map(ct::is_xml).unwrap_or(false)
    }
}

use Capability::*;

const SLIDE_CONTENT: &[Capability] = &[
    Images, Media, Charts, Diagrams, OleObjects, EmbeddedData, ActiveX, Ink, Tags, VmlDrawings,
    Layouts, Notes, Comments, CustomXml,
];
const LAYOUT_CONTENT: &[Capability] = &[
    Images, Media, Charts, Diagrams, OleObjects, EmbeddedData, ActiveX, Ink, Tags, VmlDrawings,
    CustomXml,
];
const MASTER_CONTENT: &[Capability] = &[
    Images, Media, Charts, Diagrams, OleObjects, EmbeddedData, ActiveX, Ink, Tags, VmlDrawings,
    Themes, Layouts, CustomXml,
];
const NOTES_CONTENT: &[Capability] = &[
    Images, Media, Charts, Diagrams, OleObjects, EmbeddedData, Ink, Tags, VmlDrawings, CustomXml,
];
const NOTES_MASTER_CONTENT: &[Capability] = &[
    Images, Charts, Diagrams, OleObjects, Tags, VmlDrawings, Themes, CustomXml,
];
const CHART_CONTENT: &[Capability] = &[Images, Themes, ChartParts, EmbeddedData, OleObjects, Charts];
const DRAWING_CONTENT: &[Capability] = &[Images, Media];
const ACTIVEX_CONTENT: &[Capability] = &[Images, EmbeddedData];
const NONE: &[Capability] = &[];

macro_rules! kind {
    ($kind:ident, $ct:expr, $rel:expr, $folder:literal, $stem:literal, $ext:expr, $single:literal, $caps:expr) => {
        PartKindInfo {
            kind: PartKind::$kind,
            content_type: $ct,
            rel_type: $rel,
            folder: $folder,
            stem: $stem,
            extension: $ext,
            singleton: $single,
            capabilities: $caps,
        }
    };
}

static REGISTRY: Lazy<Vec<PartKindInfo>> = Lazy::new(|| {
    let xml = Some("xml");
    vec![
        kind!(Presentation, Some(ct::POWERPOINT_PRESENTATION), rt::OFFICE_DOCUMENT, "/ppt", "presentation", xml, true, &[Themes, Layouts, Notes, Comments, CustomXml]),
        kind!(Slide, Some(ct::POWERPOINT_SLIDE), rt::SLIDE, "/ppt/slides", "slide", xml, false, SLIDE_CONTENT),
        kind!(SlideLayout, Some(ct::SLIDE_LAYOUT), rt::SLIDE_LAYOUT, "/ppt/slideLayouts", "slideLayout", xml, false, LAYOUT_CONTENT),
        kind!(SlideMaster, Some(ct::SLIDE_MASTER), rt::SLIDE_MASTER, "/ppt/slideMasters", "slideMaster", xml, false, MASTER_CONTENT),
        kind!(NotesSlide, Some(ct::NOTES_SLIDE), rt::NOTES_SLIDE, "/ppt/notesSlides", "notesSlide", xml, false, NOTES_CONTENT),
        kind!(NotesMaster, Some(ct::NOTES_MASTER), rt::NOTES_MASTER, "/ppt/notesMasters", "notesMaster", xml, false, NOTES_MASTER_CONTENT),
        kind!(HandoutMaster, Some(ct::HANDOUT_MASTER), rt::HANDOUT_MASTER, "/ppt/handoutMasters", "handoutMaster", xml, false, NOTES_MASTER_CONTENT),
        kind!(Theme, Some(ct::THEME), rt::THEME, "/ppt/theme", "theme", xml, false, &[Images]),
        kind!(ThemeOverride, Some(ct::THEME_OVERRIDE), rt::THEME_OVERRIDE, "/ppt/theme", "themeOverride", xml, false, &[Images]),
        kind!(PresentationProperties, Some(ct::PRESENTATION_PROPERTIES), rt::PRESENTATION_PROPERTIES, "/ppt", "presProps", xml, true, NONE),
        kind!(ViewProperties, Some(ct::VIEW_PROPERTIES), rt::VIEW_PROPERTIES, "/ppt", "viewProps", xml, true, NONE),
        kind!(TableStyles, Some(ct::TABLE_STYLES), rt::TABLE_STYLES, "/ppt", "tableStyles", xml, true, NONE),
        kind!(CommentAuthors, Some(ct::COMMENT_AUTHORS), rt::COMMENT_AUTHORS, "/ppt", "commentAuthors", xml, true, NONE),
        kind!(Comments, Some(ct::COMMENTS), rt::COMMENTS, "/ppt/comments", "comment", xml, false, NONE),
        kind!(ModernComments, Some(ct::MODERN_COMMENTS), rt::MODERN_COMMENTS, "/ppt/comments", "modernComment", xml, false, NONE),
        kind!(Authors, Some(ct::AUTHORS), rt::AUTHORS, "/ppt", "authors", xml, true, NONE),
        kind!(Tags, Some(ct::TAGS), rt::TAGS, "/ppt/tags", "tag", xml, false, NONE),
        kind!(Chart, Some(ct::CHART), rt::CHART, "/ppt/charts", "chart", xml, false, CHART_CONTENT),
        kind!(ChartEx, Some(ct::CHART_EX), rt::CHART_EX, "/ppt/charts", "chartEx", xml, false, CHART_CONTENT),
        kind!(ChartStyle, Some(ct::CHART_STYLE), rt::CHART_STYLE, "/ppt/charts", "style", xml, false, NONE),
        kind!(ChartColors, Some(ct::CHART_COLORS), rt::CHART_COLORS, "/ppt/charts", "colors", xml, false, NONE),
        kind!(ChartDrawing, Some(ct::CHART_DRAWING), rt::CHART_USER_SHAPES, "/ppt/drawings", "drawing", xml, false, &[Images, Charts]),
        kind!(DiagramData, Some(ct::DIAGRAM_DATA), rt::DIAGRAM_DATA, "/ppt/diagrams", "data", xml, false, DRAWING_CONTENT),
        kind!(DiagramLayout, Some(ct::DIAGRAM_LAYOUT), rt::DIAGRAM_LAYOUT, "/ppt/diagrams", "layout", xml, false, &[Images]),
        kind!(DiagramStyle, Some(ct::DIAGRAM_STYLE), rt::DIAGRAM_STYLE, "/ppt/diagrams", "quickStyle", xml, false, NONE),
        kind!(DiagramColors, Some(ct::DIAGRAM_COLORS), rt::DIAGRAM_COLORS, "/ppt/diagrams", "colors", xml, false, NONE),
        kind!(DiagramDrawing, Some(ct::DIAGRAM_DRAWING), rt::DIAGRAM_DRAWING, "/ppt/diagrams", "drawing", xml, false, DRAWING_CONTENT),
        kind!(VmlDrawing, Some(ct::VML_DRAWING), rt::VML_DRAWING, "/ppt/drawings", "vmlDrawing", Some("vml"), false, &[Images, OleObjects]),
        kind!(ActiveX, Some(ct::ACTIVEX), rt::CONTROL, "/ppt/activeX", "activeX", xml, false, ACTIVEX_CONTENT),
        kind!(ActiveXBinary, Some(ct::ACTIVEX_BINARY), rt::ACTIVEX_BINARY, "/ppt/activeX", "activeX", Some("bin"), false, NONE),
        kind!(OleObject, Some(ct::OLE_OBJECT), rt::OLE_OBJECT, "/ppt/embeddings", "oleObject", Some("bin"), false, NONE),
        kind!(EmbeddedPackage, None, rt::PACKAGE, "/ppt/embeddings", "package", None, false, NONE),
        kind!(Ink, Some(ct::INK), rt::CUSTOM_XML, "/ppt/ink", "ink", xml, false, NONE),
        kind!(CustomXml, Some(ct::XML), rt::CUSTOM_XML, "/customXml", "item", xml, false, &[CustomXml]),
        kind!(CustomXmlProperties, Some(ct::CUSTOM_XML_PROPERTIES), rt::CUSTOM_XML_PROPERTIES, "/customXml", "itemProps", xml, false, NONE),
        kind!(CoreProperties, Some(ct::CORE_PROPERTIES), rt::CORE_PROPERTIES, "/docProps", "core", xml, true, NONE),
        kind!(ExtendedProperties, Some(ct::EXTENDED_PROPERTIES), rt::EXTENDED_PROPERTIES, "/docProps", "app", xml, true, NONE),
        kind!(CustomProperties, Some(ct::CUSTOM_PROPERTIES), rt::CUSTOM_PROPERTIES, "/docProps", "custom", xml, true, NONE),
        kind!(Thumbnail, None, rt::THUMBNAIL, "/docProps", "thumbnail", None, true, NONE),
        kind!(Font, None, rt::FONT, "/ppt/fonts", "font", None, false, NONE),
        kind!(Image, None, rt::IMAGE, "/ppt/media", "image", None, false, NONE),
        kind!(Media, None, rt::MEDIA, "/ppt/media", "media", None, false, NONE),
        kind!(LegacyDiagramText, Some(ct::LEGACY_DIAGRAM_TEXT), rt::LEGACY_DIAGRAM_TEXT, "/ppt", "legacyDiagramText", Some("bin"), false, NONE),
    ]
});

static BY_KIND: Lazy<HashMap<PartKind, usize>> = Lazy::new(|| {
    REGISTRY
        .iter()
        .enumerate()
        .map(|(i, info)| (info.kind, i))
        .collect()
});

impl PartKind {
    pub fn info(self) -> &'static PartKindInfo {
        // Every variant has a registry row; covered by a unit test.
        &REGISTRY[BY_KIND[&self]]
    }

    pub fn supports(self, capability: Capability) -> bool {
        self.info().supports(capability)
    }

    /// Kind of an existing part, judged by its content type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if ct::is_image(content_type) {
            return Some(Self::Image);
        }
        if ct::is_media(content_type) {
            return Some(Self::Media);
        }
        if DocumentType::from_main_content_type(content_type) == Some(DocumentType::PowerPoint) {
            return Some(Self::Presentation);
        }
        if content_type == ct::FONT_DATA || content_type == ct::OBFUSCATED_FONT {
            return Some(Self::Font);
        }
        REGISTRY
            .iter()
            .find(|info| info.content_type == Some(content_type))
            .map(|info| info.kind)
    }

    /// Kind a copied target becomes, from the relationship that reached it
    /// and the target's content type.
    pub fn for_target(rel_type: &str, content_type: &str) -> Option<Self> {
        if rt::is_image(rel_type) {
            return Some(Self::Image);
        }
        if rt::is_media(rel_type) {
            return Some(Self::Media);
        }
        if rel_type == rt::CUSTOM_XML && content_type == ct::INK {
            return Some(Self::Ink);
        }
        if rel_type == rt::PACKAGE {
            return Some(Self::EmbeddedPackage);
        }
        if rel_type == rt::OLE_OBJECT && content_type != ct::OLE_OBJECT {
            // Some producers embed OLE payloads as packages.
            return Some(Self::EmbeddedPackage);
        }
        Self::from_content_type(content_type)
            .filter(|kind| kind.info().rel_type == rel_type || !rt::is_office(rel_type))
            .or_else(|| {
                REGISTRY
                    .iter()
                    .find(|info| info.rel_type == rel_type)
                    .map(|info| info.kind)
            })
    }

    /// Capability a parent needs to own a target reached through `rel_type`.
    pub fn required_capability(rel_type: &str) -> Option<Capability> {
        let cap = match rel_type {
            t if rt::is_image(t) => Images,
            t if rt::is_media(t) => Media,
            rt::CHART | rt::CHART_EX | rt::CHART_USER_SHAPES => Charts,
            rt::CHART_STYLE | rt::CHART_COLORS => ChartParts,
            rt::DIAGRAM_DATA | rt::DIAGRAM_LAYOUT | rt::DIAGRAM_STYLE | rt::DIAGRAM_COLORS
            | rt::DIAGRAM_DRAWING => Diagrams,
            rt::OLE_OBJECT => OleObjects,
            rt::CONTROL => ActiveX,
            rt::TAGS => Tags,
            rt::VML_DRAWING => VmlDrawings,
            rt::THEME | rt::THEME_OVERRIDE => Themes,
            rt::SLIDE_LAYOUT => Layouts,
            rt::NOTES_SLIDE => Notes,
            rt::COMMENTS | rt::MODERN_COMMENTS => Comments,
            rt::PACKAGE | rt::ACTIVEX_BINARY => EmbeddedData,
            rt::CUSTOM_XML | rt::CUSTOM_XML_PROPERTIES => CustomXml,
            _ => return None,
        };
        Some(cap)
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
