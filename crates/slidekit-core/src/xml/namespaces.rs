#![allow(non_snake_case)]

use super::xname::XName;

pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

pub mod P {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

    pub fn presentation() -> XName { XName::new(NS, "presentation") }
    pub fn sldMasterIdLst() -> XName { XName::new(NS, "sldMasterIdLst") }
    pub fn sldMasterId() -> XName { XName::new(NS, "sldMasterId") }
    pub fn notesMasterIdLst() -> XName { XName::new(NS, "notesMasterIdLst") }
    pub fn notesMasterId() -> XName { XName::new(NS, "notesMasterId") }
    pub fn handoutMasterIdLst() -> XName { XName::new(NS, "handoutMasterIdLst") }
    pub fn handoutMasterId() -> XName { XName::new(NS, "handoutMasterId") }
    pub fn sldIdLst() -> XName { XName::new(NS, "sldIdLst") }
    pub fn sldId() -> XName { XName::new(NS, "sldId") }
    pub fn sldSz() -> XName { XName::new(NS, "sldSz") }
    pub fn notesSz() -> XName { XName::new(NS, "notesSz") }
    pub fn smartTags() -> XName { XName::new(NS, "smartTags") }
    pub fn embeddedFontLst() -> XName { XName::new(NS, "embeddedFontLst") }
    pub fn embeddedFont() -> XName { XName::new(NS, "embeddedFont") }
    pub fn font() -> XName { XName::new(NS, "font") }
    pub fn regular() -> XName { XName::new(NS, "regular") }
    pub fn bold() -> XName { XName::new(NS, "bold") }
    pub fn italic() -> XName { XName::new(NS, "italic") }
    pub fn boldItalic() -> XName { XName::new(NS, "boldItalic") }
    pub fn custShowLst() -> XName { XName::new(NS, "custShowLst") }
    pub fn photoAlbum() -> XName { XName::new(NS, "photoAlbum") }
    pub fn custDataLst() -> XName { XName::new(NS, "custDataLst") }
    pub fn custData() -> XName { XName::new(NS, "custData") }
    pub fn kinsoku() -> XName { XName::new(NS, "kinsoku") }
    pub fn defaultTextStyle() -> XName { XName::new(NS, "defaultTextStyle") }
    pub fn modifyVerifier() -> XName { XName::new(NS, "modifyVerifier") }
    pub fn extLst() -> XName { XName::new(NS, "extLst") }
    pub fn ext() -> XName { XName::new(NS, "ext") }
    pub fn sld() -> XName { XName::new(NS, "sld") }
    pub fn sldLayout() -> XName { XName::new(NS, "sldLayout") }
    pub fn sldMaster() -> XName { XName::new(NS, "sldMaster") }
    pub fn sldLayoutIdLst() -> XName { XName::new(NS, "sldLayoutIdLst") }
    pub fn sldLayoutId() -> XName { XName::new(NS, "sldLayoutId") }
    pub fn notes() -> XName { XName::new(NS, "notes") }
    pub fn cSld() -> XName { XName::new(NS, "cSld") }
    pub fn spTree() -> XName { XName::new(NS, "spTree") }
    pub fn sp() -> XName { XName::new(NS, "sp") }
    pub fn nvSpPr() -> XName { XName::new(NS, "nvSpPr") }
    pub fn nvPr() -> XName { XName::new(NS, "nvPr") }
    pub fn ph() -> XName { XName::new(NS, "ph") }
    pub fn txBody() -> XName { XName::new(NS, "txBody") }
    pub fn oleObj() -> XName { XName::new(NS, "oleObj") }
    pub fn control() -> XName { XName::new(NS, "control") }
    pub fn tags() -> XName { XName::new(NS, "tags") }
    pub fn sndTgt() -> XName { XName::new(NS, "sndTgt") }
    pub fn snd() -> XName { XName::new(NS, "snd") }
    pub fn contentPart() -> XName { XName::new(NS, "contentPart") }
    pub fn cmAuthorLst() -> XName { XName::new(NS, "cmAuthorLst") }
    pub fn cmAuthor() -> XName { XName::new(NS, "cmAuthor") }
    pub fn cmLst() -> XName { XName::new(NS, "cmLst") }
    pub fn cm() -> XName { XName::new(NS, "cm") }
    pub fn clrMap() -> XName { XName::new(NS, "clrMap") }
    pub fn txStyles() -> XName { XName::new(NS, "txStyles") }
    pub fn pos() -> XName { XName::new(NS, "pos") }
    pub fn text() -> XName { XName::new(NS, "text") }
}

/// Modern (threaded) comments and their author list.
pub mod P188 {
    use super::XName;
    pub const NS: &str = "http://schemas.microsoft.com/office/powerpoint/2018/8/main";

    pub fn authorLst() -> XName { XName::new(NS, "authorLst") }
    pub fn author() -> XName { XName::new(NS, "author") }
}

pub mod P14 {
    use super::XName;
    pub const NS: &str = "http://schemas.microsoft.com/office/powerpoint/2010/main";

    pub fn sectionLst() -> XName { XName::new(NS, "sectionLst") }
    pub fn media() -> XName { XName::new(NS, "media") }
    pub fn contentPart() -> XName { XName::new(NS, "contentPart") }
}

pub mod A {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    pub fn p() -> XName { XName::new(NS, "p") }
    pub fn r() -> XName { XName::new(NS, "r") }
    pub fn t() -> XName { XName::new(NS, "t") }
    pub fn off() -> XName { XName::new(NS, "off") }
    pub fn ext() -> XName { XName::new(NS, "ext") }
    pub fn chOff() -> XName { XName::new(NS, "chOff") }
    pub fn chExt() -> XName { XName::new(NS, "chExt") }
    pub fn xfrm() -> XName { XName::new(NS, "xfrm") }
    pub fn blip() -> XName { XName::new(NS, "blip") }
    pub fn hlinkClick() -> XName { XName::new(NS, "hlinkClick") }
    pub fn hlinkHover() -> XName { XName::new(NS, "hlinkHover") }
    pub fn hlinkMouseOver() -> XName { XName::new(NS, "hlinkMouseOver") }
    pub fn videoFile() -> XName { XName::new(NS, "videoFile") }
    pub fn audioFile() -> XName { XName::new(NS, "audioFile") }
    pub fn quickTimeFile() -> XName { XName::new(NS, "quickTimeFile") }
    pub fn wavAudioFile() -> XName { XName::new(NS, "wavAudioFile") }
    pub fn snd() -> XName { XName::new(NS, "snd") }
    pub fn rPr() -> XName { XName::new(NS, "rPr") }
    pub fn defRPr() -> XName { XName::new(NS, "defRPr") }
    pub fn endParaRPr() -> XName { XName::new(NS, "endParaRPr") }
    pub fn tbl() -> XName { XName::new(NS, "tbl") }
    pub fn tableStyleId() -> XName { XName::new(NS, "tableStyleId") }
    pub fn tblStyleLst() -> XName { XName::new(NS, "tblStyleLst") }
    pub fn tblStyle() -> XName { XName::new(NS, "tblStyle") }
    pub fn gridCol() -> XName { XName::new(NS, "gridCol") }
    pub fn tr() -> XName { XName::new(NS, "tr") }
}

pub mod A14 {
    use super::XName;
    pub const NS: &str = "http://schemas.microsoft.com/office/drawing/2010/main";

    pub fn imgLayer() -> XName { XName::new(NS, "imgLayer") }
}

pub mod ASVG {
    use super::XName;
    pub const NS: &str = "http://schemas.microsoft.com/office/drawing/2016/SVG/main";

    pub fn svgBlip() -> XName { XName::new(NS, "svgBlip") }
}

pub mod C {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

    pub fn chart() -> XName { XName::new(NS, "chart") }
    pub fn userShapes() -> XName { XName::new(NS, "userShapes") }
    pub fn externalData() -> XName { XName::new(NS, "externalData") }
}

pub mod CX {
    use super::XName;
    pub const NS: &str = "http://schemas.microsoft.com/office/drawing/2014/chartex";

    pub fn chart() -> XName { XName::new(NS, "chart") }
    pub fn externalData() -> XName { XName::new(NS, "externalData") }
}

pub mod DGM {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";

    pub fn relIds() -> XName { XName::new(NS, "relIds") }
}

pub mod DSP {
    use super::XName;
    pub const NS: &str = "http://schemas.microsoft.com/office/drawing/2008/diagram";

    pub fn dataModelExt() -> XName { XName::new(NS, "dataModelExt") }
    pub fn relId() -> XName { XName::local("relId") }
}

pub mod R {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    pub fn id() -> XName { XName::new(NS, "id") }
    pub fn embed() -> XName { XName::new(NS, "embed") }
    pub fn link() -> XName { XName::new(NS, "link") }
    pub fn dm() -> XName { XName::new(NS, "dm") }
    pub fn lo() -> XName { XName::new(NS, "lo") }
    pub fn qs() -> XName { XName::new(NS, "qs") }
    pub fn cs() -> XName { XName::new(NS, "cs") }
    pub fn pict() -> XName { XName::new(NS, "pict") }
}

pub mod V {
    use super::XName;
    pub const NS: &str = "urn:schemas-microsoft-com:vml";

    pub fn imagedata() -> XName { XName::new(NS, "imagedata") }
    pub fn fill() -> XName { XName::new(NS, "fill") }
    pub fn stroke() -> XName { XName::new(NS, "stroke") }
}

pub mod O {
    use super::XName;
    pub const NS: &str = "urn:schemas-microsoft-com:office:office";

    pub fn relid() -> XName { XName::new(NS, "relid") }
}

pub mod MC {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

    pub fn AlternateContent() -> XName { XName::new(NS, "AlternateContent") }
    pub fn Choice() -> XName { XName::new(NS, "Choice") }
    pub fn Fallback() -> XName { XName::new(NS, "Fallback") }
}

pub mod CP {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

    pub fn coreProperties() -> XName { XName::new(NS, "coreProperties") }
    pub fn lastModifiedBy() -> XName { XName::new(NS, "lastModifiedBy") }
}

pub mod DC {
    use super::XName;
    pub const NS: &str = "http://purl.org/dc/elements/1.1/";

    pub fn title() -> XName { XName::new(NS, "title") }
    pub fn creator() -> XName { XName::new(NS, "creator") }
}

pub mod DCTERMS {
    use super::XName;
    pub const NS: &str = "http://purl.org/dc/terms/";

    pub fn created() -> XName { XName::new(NS, "created") }
    pub fn modified() -> XName { XName::new(NS, "modified") }
}

pub mod XSI {
    use super::XName;
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

    pub fn r#type() -> XName { XName::new(NS, "type") }
}

/// Package relationship parts (`*.rels`).
pub mod PR {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

    pub fn Relationships() -> XName { XName::new(NS, "Relationships") }
    pub fn Relationship() -> XName { XName::new(NS, "Relationship") }
}

/// `[Content_Types].xml`.
pub mod CT {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

    pub fn Types() -> XName { XName::new(NS, "Types") }
    pub fn Default() -> XName { XName::new(NS, "Default") }
    pub fn Override() -> XName { XName::new(NS, "Override") }
}
