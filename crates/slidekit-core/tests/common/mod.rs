//! In-memory presentation fixtures.
//!
//! Decks are written with the `zip` crate straight from XML strings so the
//! tests control every part, relationship and id.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const NS_DECLS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PML_CT: &str = "application/vnd.openxmlformats-officedocument.presentationml";

pub const SIZE_4X3: (i64, i64) = (9_144_000, 6_858_000);
pub const SIZE_16X9: (i64, i64) = (12_192_000, 6_858_000);

/// A tiny valid PNG; pass a different `seed` for distinct bytes.
pub fn png(seed: u8) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0, 1, 0, 0, 0, 1, 8, 6]);
    bytes.extend_from_slice(&[0, 0, 0, seed, 0x1F, 0x15, 0xC4, 0x89]);
    bytes
}

/// Relationship type in the office document namespace.
pub fn office_rel(short: &str) -> String {
    format!("{}/{}", REL, short)
}

/// A part reached through a relationship from a slide, the presentation or
/// the package. Targets are written as absolute part names.
#[derive(Debug, Clone)]
pub struct ExtraPart {
    pub id: String,
    pub rel_type: String,
    pub name: String,
    pub content_type: String,
    /// `None` relates to a part written by another `ExtraPart`.
    pub bytes: Option<Vec<u8>>,
    pub children: Vec<ExtraPart>,
}

impl ExtraPart {
    pub fn new(id: &str, rel_type: &str, name: &str, content_type: &str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: Some(bytes.into()),
            children: Vec::new(),
        }
    }

    /// Second relationship to a part some other `ExtraPart` writes.
    pub fn link(id: &str, rel_type: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            name: name.to_string(),
            content_type: String::new(),
            bytes: None,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: ExtraPart) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlideSpec {
    pub title: String,
    pub body: Vec<String>,
    pub image: Option<Vec<u8>>,
    pub notes: Option<String>,
    /// Adds an `a:blip` pointing at a relationship id that does not exist.
    pub dangling_reference: bool,
    /// Position and size of the body shape.
    pub body_xfrm: Option<(i64, i64, i64, i64)>,
    /// Raw markup appended to the shape tree.
    pub shapes: Vec<String>,
    /// Parts related from the slide. Ids rId1 to rId3 are taken.
    pub parts: Vec<ExtraPart>,
}

impl SlideSpec {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: vec![format!("{} body", title)],
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_shape(mut self, markup: &str) -> Self {
        self.shapes.push(markup.to_string());
        self
    }

    pub fn with_part(mut self, part: ExtraPart) -> Self {
        self.parts.push(part);
        self
    }
}

#[derive(Debug, Clone)]
pub struct DeckSpec {
    pub slide_size: Option<(i64, i64)>,
    /// Colour of the master background; decks with different colours get
    /// masters that must not be merged.
    pub master_color: String,
    pub theme_name: String,
    pub title: Option<String>,
    pub slides: Vec<SlideSpec>,
    /// Parts related from the presentation. Ids below rId11 are taken.
    pub presentation_parts: Vec<ExtraPart>,
    /// Markup placed after `p:notesSz` in the presentation part.
    pub presentation_tail: String,
    /// Parts related from the package root. rId1 and rId2 are taken.
    pub package_parts: Vec<ExtraPart>,
}

impl DeckSpec {
    pub fn new(slides: Vec<SlideSpec>) -> Self {
        Self {
            slide_size: Some(SIZE_4X3),
            master_color: "FFFFFF".to_string(),
            theme_name: "Office Theme".to_string(),
            title: None,
            slides,
            presentation_parts: Vec::new(),
            presentation_tail: String::new(),
            package_parts: Vec::new(),
        }
    }

    /// `count` slides titled "Slide 1" .. "Slide N".
    pub fn numbered(count: usize) -> Self {
        Self::new(
            (1..=count)
                .map(|i| SlideSpec::titled(&format!("Slide {}", i)))
                .collect(),
        )
    }

    pub fn with_size(mut self, size: (i64, i64)) -> Self {
        self.slide_size = Some(size);
        self
    }

    pub fn with_master_color(mut self, color: &str) -> Self {
        self.master_color = color.to_string();
        self
    }

    pub fn with_presentation_part(mut self, part: ExtraPart) -> Self {
        self.presentation_parts.push(part);
        self
    }

    pub fn with_presentation_tail(mut self, markup: &str) -> Self {
        self.presentation_tail.push_str(markup);
        self
    }

    pub fn with_package_part(mut self, part: ExtraPart) -> Self {
        self.package_parts.push(part);
        self
    }

    fn has_notes(&self) -> bool {
        self.slides.iter().any(|s| s.notes.is_some())
    }

    pub fn build(&self) -> Vec<u8> {
        let mut files: Vec<(String, String)> = Vec::new();
        let mut binaries: Vec<(String, Vec<u8>)> = Vec::new();
        let mut overrides = vec![
            ("/ppt/presentation.xml".to_string(), format!("{}.presentation.main+xml", PML_CT)),
            ("/ppt/slideMasters/slideMaster1.xml".to_string(), format!("{}.slideMaster+xml", PML_CT)),
            ("/ppt/slideLayouts/slideLayout1.xml".to_string(), format!("{}.slideLayout+xml", PML_CT)),
            (
                "/ppt/theme/theme1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.theme+xml".to_string(),
            ),
            (
                "/docProps/core.xml".to_string(),
                "application/vnd.openxmlformats-package.core-properties+xml".to_string(),
            ),
        ];

        let mut package_rels = vec![
            ("rId1".to_string(), format!("{}/officeDocument", REL), "ppt/presentation.xml".to_string()),
            (
                "rId2".to_string(),
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties"
                    .to_string(),
                "docProps/core.xml".to_string(),
            ),
        ];
        for part in &self.package_parts {
            add_extra(part, &mut package_rels, &mut files, &mut binaries, &mut overrides);
        }
        files.push(("_rels/.rels".to_string(), owned_rels(&package_rels)));
        files.push(("docProps/core.xml".to_string(), self.core_xml()));

        let mut pres_rels = vec![
            ("rId1".to_string(), format!("{}/slideMaster", REL), "slideMasters/slideMaster1.xml".to_string()),
            ("rId2".to_string(), format!("{}/theme", REL), "theme/theme1.xml".to_string()),
        ];
        if self.has_notes() {
            pres_rels.push((
                "rId3".to_string(),
                format!("{}/notesMaster", REL),
                "notesMasters/notesMaster1.xml".to_string(),
            ));
            overrides.push((
                "/ppt/notesMasters/notesMaster1.xml".to_string(),
                format!("{}.notesMaster+xml", PML_CT),
            ));
            files.push(("ppt/notesMasters/notesMaster1.xml".to_string(), notes_master_xml()));
        }

        let mut slide_ids = String::new();
        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            let r_id = format!("rId{}", 10 + n);
            slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 255 + n, r_id));
            pres_rels.push((r_id, format!("{}/slide", REL), format!("slides/slide{}.xml", n)));
            overrides.push((format!("/ppt/slides/slide{}.xml", n), format!("{}.slide+xml", PML_CT)));

            let mut slide_rels = vec![(
                "rId1".to_string(),
                format!("{}/slideLayout", REL),
                "../slideLayouts/slideLayout1.xml".to_string(),
            )];
            if let Some(image) = &slide.image {
                let media = format!("ppt/media/pic{}.png", n);
                binaries.push((media, image.clone()));
                slide_rels.push((
                    "rId2".to_string(),
                    format!("{}/image", REL),
                    format!("../media/pic{}.png", n),
                ));
            }
            if let Some(notes) = &slide.notes {
                slide_rels.push((
                    "rId3".to_string(),
                    format!("{}/notesSlide", REL),
                    format!("../notesSlides/notesSlide{}.xml", n),
                ));
                overrides.push((
                    format!("/ppt/notesSlides/notesSlide{}.xml", n),
                    format!("{}.notesSlide+xml", PML_CT),
                ));
                files.push((format!("ppt/notesSlides/notesSlide{}.xml", n), notes_xml(notes)));
                files.push((
                    format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", n),
                    owned_rels(&[
                        (
                            "rId1".to_string(),
                            format!("{}/notesMaster", REL),
                            "../notesMasters/notesMaster1.xml".to_string(),
                        ),
                        ("rId2".to_string(), format!("{}/slide", REL), format!("../slides/slide{}.xml", n)),
                    ]),
                ));
            }
            for part in &slide.parts {
                add_extra(part, &mut slide_rels, &mut files, &mut binaries, &mut overrides);
            }
            files.push((format!("ppt/slides/slide{}.xml", n), slide_xml(slide)));
            files.push((format!("ppt/slides/_rels/slide{}.xml.rels", n), owned_rels(&slide_rels)));
        }

        for part in &self.presentation_parts {
            add_extra(part, &mut pres_rels, &mut files, &mut binaries, &mut overrides);
        }

        let notes_master_list = if self.has_notes() {
            r#"<p:notesMasterIdLst><p:notesMasterId r:id="rId3"/></p:notesMasterIdLst>"#
        } else {
            ""
        };
        let size = self
            .slide_size
            .map(|(cx, cy)| format!(r#"<p:sldSz cx="{}" cy="{}"/>"#, cx, cy))
            .unwrap_or_default();
        files.push((
            "ppt/presentation.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {ns}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{notes}<p:sldIdLst>{ids}</p:sldIdLst>{size}<p:notesSz cx="6858000" cy="9144000"/>{tail}</p:presentation>"#,
                ns = NS_DECLS,
                notes = notes_master_list,
                ids = slide_ids,
                size = size,
                tail = self.presentation_tail
            ),
        ));
        files.push(("ppt/_rels/presentation.xml.rels".to_string(), owned_rels(&pres_rels)));

        files.push(("ppt/slideMasters/slideMaster1.xml".to_string(), self.master_xml()));
        files.push((
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            rels(&[
                ("rId1", &format!("{}/slideLayout", REL), "../slideLayouts/slideLayout1.xml"),
                ("rId2", &format!("{}/theme", REL), "../theme/theme1.xml"),
            ]),
        ));
        files.push(("ppt/slideLayouts/slideLayout1.xml".to_string(), layout_xml()));
        files.push((
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            rels(&[("rId1", &format!("{}/slideMaster", REL), "../slideMasters/slideMaster1.xml")]),
        ));
        files.push(("ppt/theme/theme1.xml".to_string(), self.theme_xml()));

        let overrides_xml: String = overrides
            .iter()
            .map(|(part, ct)| format!(r#"<Override PartName="{}" ContentType="{}"/>"#, part, ct))
            .collect();
        let content_types = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>{}</Types>"#,
            overrides_xml
        );

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(content_types.as_bytes()).unwrap();
        for (name, text) in files {
            zip.start_file(name, options).unwrap();
            zip.write_all(text.as_bytes()).unwrap();
        }
        for (name, bytes) in binaries {
            zip.start_file(name, options).unwrap();
            zip.write_all(&bytes).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn core_xml(&self) -> String {
        let title = self
            .title
            .as_ref()
            .map(|t| format!("<dc:title>{}</dc:title>", t))
            .unwrap_or_default();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">{}<dc:creator>fixture</dc:creator></cp:coreProperties>"#,
            title
        )
    }

    fn master_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {ns}><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr></p:sp></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"/></a:lvl1pPr></p:titleStyle><p:bodyStyle/><p:otherStyle/></p:txStyles></p:sldMaster>"#,
            ns = NS_DECLS,
            color = self.master_color
        )
    }

    fn theme_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="{}"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#,
            self.theme_name
        )
    }
}

fn layout_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {ns} type="title" preserve="1"><p:cSld name="Title Slide"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="685800" y="2130425"/><a:ext cx="7772400" cy="1470025"/></a:xfrm></p:spPr></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        ns = NS_DECLS
    )
}

fn slide_xml(slide: &SlideSpec) -> String {
    let (x, y, cx, cy) = slide.body_xfrm.unwrap_or((457_200, 1_600_200, 8_229_600, 4_525_963));
    let paragraphs: String = slide
        .body
        .iter()
        .map(|text| format!(r#"<a:p><a:r><a:rPr lang="en-US" sz="2400" dirty="0" smtClean="0"/><a:t>{}</a:t></a:r></a:p>"#, text))
        .collect();
    let picture = if slide.image.is_some() {
        r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="1000000" y="1000000"/><a:ext cx="2000000" cy="1000000"/></a:xfrm></p:spPr></p:pic>"#
    } else {
        ""
    };
    let dangling = if slide.dangling_reference {
        r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Broken"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId99"/></p:blipFill><p:spPr/></p:pic>"#
    } else {
        ""
    };
    let extra: String = slide.shapes.concat();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {ns}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>{title}</a:t></a:r></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Content 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/>{paragraphs}</p:txBody></p:sp>{picture}{dangling}{extra}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        ns = NS_DECLS,
        title = slide.title,
        x = x,
        y = y,
        cx = cx,
        cy = cy,
        paragraphs = paragraphs,
        picture = picture,
        dangling = dangling,
        extra = extra
    )
}

fn notes_master_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notesMaster {ns}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:notesMaster>"#,
        ns = NS_DECLS
    )
}

fn notes_xml(text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {ns}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Notes 1"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#,
        ns = NS_DECLS,
        text = text
    )
}

/// Writes `part` and its children, relating it from the owner whose
/// relationships are `owner_rels`.
fn add_extra(
    part: &ExtraPart,
    owner_rels: &mut Vec<(String, String, String)>,
    files: &mut Vec<(String, String)>,
    binaries: &mut Vec<(String, Vec<u8>)>,
    overrides: &mut Vec<(String, String)>,
) {
    owner_rels.push((part.id.clone(), part.rel_type.clone(), part.name.clone()));
    let Some(bytes) = &part.bytes else {
        return;
    };
    overrides.push((part.name.clone(), part.content_type.clone()));
    binaries.push((part.name.trim_start_matches('/').to_string(), bytes.clone()));
    if part.children.is_empty() {
        return;
    }
    let mut rels = Vec::new();
    for child in &part.children {
        add_extra(child, &mut rels, files, binaries, overrides);
    }
    let (folder, file) = part.name.trim_start_matches('/').rsplit_once('/').unwrap();
    files.push((format!("{}/_rels/{}.rels", folder, file), owned_rels(&rels)));
}

fn rels(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(id, rel_type, target)| {
            format!(r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#, id, rel_type, target)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}

fn owned_rels(items: &[(String, String, String)]) -> String {
    let borrowed: Vec<(&str, &str, &str)> = items
        .iter()
        .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
        .collect();
    rels(&borrowed)
}

/// Attribute values of every element named `local` in the given XML.
pub fn attribute_values(xml: &[u8], local: &str, attr: &str) -> Vec<String> {
    let text = std::str::from_utf8(xml).unwrap();
    let doc = roxmltree::Document::parse(text).unwrap();
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == local)
        .filter_map(|n| n.attribute(attr).map(|v| v.to_string()))
        .collect()
}

pub fn element_count(xml: &[u8], local: &str) -> usize {
    let text = std::str::from_utf8(xml).unwrap();
    let doc = roxmltree::Document::parse(text).unwrap();
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == local)
        .count()
}

/// `(cx, cy)` of every `a:ext` carrying a size in the given XML.
pub fn extents(xml: &[u8]) -> Vec<(i64, i64)> {
    let text = std::str::from_utf8(xml).unwrap();
    let doc = roxmltree::Document::parse(text).unwrap();
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "ext")
        .filter_map(|n| {
            let cx = n.attribute("cx")?.parse().ok()?;
            let cy = n.attribute("cy")?.parse().ok()?;
            Some((cx, cy))
        })
        .collect()
}

/// Values of the relationships-namespace attribute `attr` (`id`, `embed`,
/// `link`, ...) on every element named `local`.
pub fn relationship_refs(xml: &[u8], local: &str, attr: &str) -> Vec<String> {
    let text = std::str::from_utf8(xml).unwrap();
    let doc = roxmltree::Document::parse(text).unwrap();
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == local)
        .filter_map(|n| n.attribute((REL, attr)).map(|v| v.to_string()))
        .collect()
}
