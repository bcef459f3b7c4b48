//! Copies a content part and everything it references from a source
//! package into a destination package, rewriting relationship ids.

use super::cache::EquivalenceCache;
use super::settings::PresentationBuilderSettings;
use crate::error::{Result, SlidekitError};
use crate::package::relationship_types as rt;
use crate::package::{OoxmlPackage, PartKind, Relationship};
use crate::xml::namespaces::{A, A14, ASVG, C, CX, DGM, DSP, O, P, P14, R, V};
use crate::xml::parser::parse_bytes;
use crate::xml::{XName, XmlDocument};
use indextree::NodeId;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// A reference the copy engine could not carry over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub source_part: String,
    pub relationship_id: String,
    pub site: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}): {}",
            self.source_part, self.relationship_id, self.site, self.message
        )
    }
}

/// Well-known reference sites, for readable diagnostics. Any other
/// attribute in the relationships namespace is handled the same way.
static REFERENCE_SITES: Lazy<HashMap<(XName, XName), &'static str>> = Lazy::new(|| {
    [
        (A::blip(), R::embed(), "a:blip/@r:embed"),
        (A::blip(), R::link(), "a:blip/@r:link"),
        (A14::imgLayer(), R::embed(), "a14:imgLayer/@r:embed"),
        (ASVG::svgBlip(), R::embed(), "asvg:svgBlip/@r:embed"),
        (A::videoFile(), R::link(), "a:videoFile/@r:link"),
        (A::audioFile(), R::link(), "a:audioFile/@r:link"),
        (A::quickTimeFile(), R::link(), "a:quickTimeFile/@r:link"),
        (A::wavAudioFile(), R::embed(), "a:wavAudioFile/@r:embed"),
        (A::snd(), R::embed(), "a:snd/@r:embed"),
        (P::snd(), R::embed(), "p:snd/@r:embed"),
        (P::sndTgt(), R::embed(), "p:sndTgt/@r:embed"),
        (P14::media(), R::embed(), "p14:media/@r:embed"),
        (P14::media(), R::link(), "p14:media/@r:link"),
        (P::control(), R::id(), "p:control/@r:id"),
        (P::oleObj(), R::id(), "p:oleObj/@r:id"),
        (DGM::relIds(), R::dm(), "dgm:relIds/@r:dm"),
        (DGM::relIds(), R::lo(), "dgm:relIds/@r:lo"),
        (DGM::relIds(), R::qs(), "dgm:relIds/@r:qs"),
        (DGM::relIds(), R::cs(), "dgm:relIds/@r:cs"),
        (C::chart(), R::id(), "c:chart/@r:id"),
        (CX::chart(), R::id(), "cx:chart/@r:id"),
        (C::userShapes(), R::id(), "c:userShapes/@r:id"),
        (C::externalData(), R::id(), "c:externalData/@r:id"),
        (CX::externalData(), R::id(), "cx:externalData/@r:id"),
        (P::tags(), R::id(), "p:tags/@r:id"),
        (P::custData(), R::id(), "p:custData/@r:id"),
        (P::contentPart(), R::id(), "p:contentPart/@r:id"),
        (P14::contentPart(), R::id(), "p14:contentPart/@r:id"),
        (A::hlinkClick(), R::id(), "a:hlinkClick/@r:id"),
        (A::hlinkHover(), R::id(), "a:hlinkHover/@r:id"),
        (A::hlinkMouseOver(), R::id(), "a:hlinkMouseOver/@r:id"),
        (V::imagedata(), O::relid(), "v:imagedata/@o:relid"),
        (V::imagedata(), R::id(), "v:imagedata/@r:id"),
        (V::fill(), O::relid(), "v:fill/@o:relid"),
        (V::fill(), R::id(), "v:fill/@r:id"),
        (V::stroke(), O::relid(), "v:stroke/@o:relid"),
        (P::font(), R::id(), "p:font/@r:id"),
    ]
    .into_iter()
    .map(|(element, attr, label)| ((element, attr), label))
    .collect()
});

/// Relationships a part owns without naming them in its markup.
const IMPLICIT_RELATIONSHIPS: &[&str] = &[
    rt::VML_DRAWING,
    rt::CHART_STYLE,
    rt::CHART_COLORS,
    rt::THEME_OVERRIDE,
    rt::DIAGRAM_DRAWING,
    rt::CUSTOM_XML_PROPERTIES,
    rt::LEGACY_DIAGRAM_TEXT,
];

/// Attributes holding a relationship id: anything in the relationships
/// namespace, plus VML's `o:relid`.
pub(crate) fn is_reference_attribute(name: &XName) -> bool {
    name.in_namespace(R::NS) || *name == O::relid()
}

fn site_label(element: Option<&XName>, attr: &XName) -> String {
    element
        .and_then(|e| REFERENCE_SITES.get(&(e.clone(), attr.clone())))
        .map(|label| label.to_string())
        .unwrap_or_else(|| match element {
            Some(e) => format!("{}/@{}", e.local_name, attr.local_name),
            None => format!("@{}", attr.local_name),
        })
}

/// Old id to new id for one markup pass; `None` marks a dropped reference.
pub(crate) type IdMap = HashMap<String, Option<String>>;

struct Resolved {
    id: String,
    /// Set when the target was deep-copied into a new part.
    copied: Option<String>,
}

pub(crate) struct PartCopier<'a> {
    pub source: &'a OoxmlPackage,
    pub destination: &'a mut OoxmlPackage,
    pub cache: &'a mut EquivalenceCache,
    pub diagnostics: &'a mut Vec<Diagnostic>,
    pub settings: &'a PresentationBuilderSettings,
}

impl<'a> PartCopier<'a> {
    /// Brings every part referenced from `doc` (the owned copy of
    /// `old_part`, to be stored as `new_part`) into the destination and
    /// rewrites the ids in `doc`. The caller stores `doc` afterwards.
    pub fn copy_content_part(
        &mut self,
        old_part: &str,
        new_part: &str,
        doc: &mut XmlDocument,
    ) -> Result<()> {
        let Some(root) = doc.root() else {
            return Ok(());
        };
        let (mut ids, diagram_data) = self.copy_references(old_part, new_part, doc, root)?;
        let implicit = self.copy_implicit(old_part, new_part, &ids)?;
        ids.extend(implicit);

        for data_part in diagram_data {
            self.relink_diagram_drawing(&data_part, &ids)?;
        }
        Ok(())
    }

    /// Markup pass over the subtree at `node`. Returns the id map and the
    /// diagram data parts created along the way.
    pub fn copy_references(
        &mut self,
        old_part: &str,
        new_part: &str,
        doc: &mut XmlDocument,
        node: NodeId,
    ) -> Result<(IdMap, Vec<String>)> {
        let mut ids = IdMap::new();
        let mut diagram_data = Vec::new();

        let nodes: Vec<NodeId> = doc.descendants(node).collect();
        for n in nodes {
            let element = doc.name(n).cloned();
            let references: Vec<(XName, String)> = doc
                .get(n)
                .and_then(|d| d.attributes())
                .map(|attrs| {
                    attrs
                        .iter()
                        .filter(|a| is_reference_attribute(&a.name) && !a.value.is_empty())
                        .map(|a| (a.name.clone(), a.value.clone()))
                        .collect()
                })
                .unwrap_or_default();

            for (attr, old_id) in references {
                if !ids.contains_key(&old_id) {
                    let site = site_label(element.as_ref(), &attr);
                    let resolved = self.resolve(old_part, new_part, &old_id, &site)?;
                    if let Some(Resolved {
                        copied: Some(copied),
                        ..
                    }) = &resolved
                    {
                        if self.destination.content_type(copied)
                            == PartKind::DiagramData.info().content_type
                        {
                            diagram_data.push(copied.clone());
                        }
                    }
                    ids.insert(old_id.clone(), resolved.map(|r| r.id));
                }

                match ids.get(&old_id) {
                    Some(Some(new_id)) => doc.set_attribute(n, &attr, new_id),
                    _ => doc.remove_attribute(n, &attr),
                }
            }
        }
        Ok((ids, diagram_data))
    }

    fn copy_implicit(&mut self, old_part: &str, new_part: &str, seen: &IdMap) -> Result<IdMap> {
        let implicit: Vec<Relationship> = self
            .source
            .relationships(old_part)
            .iter()
            .filter(|r| !seen.contains_key(&r.id))
            .filter(|r| {
                IMPLICIT_RELATIONSHIPS.contains(&r.rel_type.as_str())
                    || (self.settings.copy_comments && r.rel_type == rt::MODERN_COMMENTS)
            })
            .cloned()
            .collect();

        let mut ids = IdMap::new();
        for rel in implicit {
            let resolved = self.relate(old_part, new_part, &rel, Some(&rel.id), "implicit")?;
            ids.insert(rel.id.clone(), resolved.map(|r| r.id));
        }
        Ok(ids)
    }

    /// `dsp:dataModelExt/@relId` in a diagram data part names the owning
    /// part's relationship to the diagram drawing.
    fn relink_diagram_drawing(&mut self, data_part: &str, ids: &IdMap) -> Result<()> {
        let mut doc = self.destination.edit_xml_part(data_part)?;
        let Some(root) = doc.root() else {
            return Ok(());
        };
        let rel_id = DSP::relId();
        for node in doc.descendants_named(root, &DSP::dataModelExt()) {
            let Some(old) = doc.attribute(node, &rel_id).map(|s| s.to_string()) else {
                continue;
            };
            match ids.get(&old) {
                Some(Some(new)) => doc.set_attribute(node, &rel_id, new),
                _ => doc.remove_attribute(node, &rel_id),
            }
        }
        doc.commit()
    }

    fn resolve(
        &mut self,
        old_part: &str,
        new_part: &str,
        old_id: &str,
        site: &str,
    ) -> Result<Option<Resolved>> {
        let Some(rel) = self.source.relationship(old_part, old_id).cloned() else {
            self.diagnose(old_part, old_id, site, "no relationship with this id");
            return Ok(None);
        };
        self.relate(old_part, new_part, &rel, None, site)
    }

    fn relate(
        &mut self,
        old_part: &str,
        new_part: &str,
        rel: &Relationship,
        preferred_id: Option<&str>,
        site: &str,
    ) -> Result<Option<Resolved>> {
        if rel.is_external() {
            let id = self
                .destination
                .add_external_relationship(new_part, &rel.target, &rel.rel_type)?;
            return Ok(Some(Resolved { id, copied: None }));
        }

        self.check_capability(new_part, &rel.rel_type)?;

        let Some(bytes) = self.source.part_bytes(&rel.target) else {
            self.diagnose(old_part, &rel.id, site, "target part is missing");
            return Ok(None);
        };
        let content_type = self
            .source
            .content_type(&rel.target)
            .unwrap_or_default()
            .to_string();

        if rt::is_image(&rel.rel_type) {
            let handle = self.cache.get_or_add_image(&content_type, bytes);
            let id = self
                .cache
                .materialize(&handle, self.destination, new_part, &rel.rel_type)?;
            return Ok(Some(Resolved { id, copied: None }));
        }
        if rt::is_media(&rel.rel_type) {
            let handle = self.cache.get_or_add_media(&content_type, bytes);
            let id = self
                .cache
                .materialize(&handle, self.destination, new_part, &rel.rel_type)?;
            return Ok(Some(Resolved { id, copied: None }));
        }
        if rel.rel_type == rt::SLIDE {
            self.diagnose(old_part, &rel.id, site, "links to another slide; dropped");
            return Ok(None);
        }

        let Some(kind) = PartKind::for_target(&rel.rel_type, &content_type) else {
            self.diagnose(
                old_part,
                &rel.id,
                site,
                &format!("cannot copy target of type {}", rel.rel_type),
            );
            return Ok(None);
        };

        let copied = self.copy_target(&rel.target, kind, &content_type)?;
        let id = self.link(new_part, &copied, &rel.rel_type, preferred_id)?;
        debug!(from = old_part, target = %rel.target, to = %copied, "copied related part");
        Ok(Some(Resolved {
            id,
            copied: Some(copied),
        }))
    }

    fn check_capability(&self, new_part: &str, rel_type: &str) -> Result<()> {
        let Some(capability) = PartKind::required_capability(rel_type) else {
            return Ok(());
        };
        let Some(kind) = self
            .destination
            .content_type(new_part)
            .and_then(PartKind::from_content_type)
        else {
            return Ok(());
        };
        if kind.supports(capability) {
            return Ok(());
        }
        Err(SlidekitError::internal(format!(
            "{{slide}}: a {} part cannot hold {} ({})",
            kind, capability, new_part
        )))
    }

    fn link(
        &mut self,
        new_part: &str,
        target: &str,
        rel_type: &str,
        preferred_id: Option<&str>,
    ) -> Result<String> {
        match preferred_id {
            Some(id) if !self.destination.has_relationship(new_part, id) => {
                self.destination
                    .add_relationship_with_id(new_part, id, target, rel_type)?;
                Ok(id.to_string())
            }
            _ => self.destination.add_relationship(new_part, target, rel_type),
        }
    }

    /// Copies one target part and, recursively, what it references.
    fn copy_target(&mut self, target: &str, kind: PartKind, content_type: &str) -> Result<String> {
        let bytes = self
            .source
            .part_bytes(target)
            .map(|b| b.to_vec())
            .unwrap_or_default();
        let is_xml = self.source.part(target).map(|p| p.is_xml()).unwrap_or(false);
        let new_part = self.destination.add_part(kind, content_type, bytes.clone());
        if !is_xml {
            return Ok(new_part);
        }

        match parse_bytes(&bytes) {
            Ok(mut doc) => {
                self.copy_content_part(target, &new_part, &mut doc)?;
                self.destination.put_xml_part(&new_part, &doc)?;
            }
            Err(err) => {
                debug!(part = target, error = %err, "copying unparsable part verbatim");
                self.copy_opaque_relationships(target, &new_part)?;
            }
        }
        Ok(new_part)
    }

    /// Parts that do not parse (legacy VML, mostly) keep their bytes, so
    /// their relationships must keep their ids.
    fn copy_opaque_relationships(&mut self, old_part: &str, new_part: &str) -> Result<()> {
        let rels: Vec<Relationship> = self.source.relationships(old_part).to_vec();
        for rel in rels {
            if rel.is_external() {
                self.destination.insert_relationship(new_part, rel)?;
                continue;
            }
            self.check_capability(new_part, &rel.rel_type)?;
            let Some(bytes) = self.source.part_bytes(&rel.target) else {
                self.diagnose(old_part, &rel.id, "opaque", "target part is missing");
                continue;
            };
            let content_type = self
                .source
                .content_type(&rel.target)
                .unwrap_or_default()
                .to_string();

            let target = if rt::is_image(&rel.rel_type) {
                let handle = self.cache.get_or_add_image(&content_type, bytes);
                self.cache.materialize_part(&handle, self.destination)?
            } else if rt::is_media(&rel.rel_type) {
                let handle = self.cache.get_or_add_media(&content_type, bytes);
                self.cache.materialize_part(&handle, self.destination)?
            } else if let Some(kind) = PartKind::for_target(&rel.rel_type, &content_type) {
                self.copy_target(&rel.target, kind, &content_type)?
            } else {
                self.diagnose(old_part, &rel.id, "opaque", "cannot copy target");
                continue;
            };
            self.destination
                .add_relationship_with_id(new_part, &rel.id, &target, &rel.rel_type)?;
        }
        Ok(())
    }

    fn diagnose(&mut self, part: &str, id: &str, site: &str, message: &str) {
        let diagnostic = Diagnostic {
            source_part: part.to_string(),
            relationship_id: id.to_string(),
            site: site.to_string(),
            message: message.to_string(),
        };
        warn!(%diagnostic, "skipped reference");
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::content_types::content_type_values as ct;
    use crate::types::DocumentType;
    use crate::xml::parser::parse;

    const SLIDE: &str = r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:pic><p:blipFill><a:blip r:embed="rId2"/></p:blipFill></p:pic><p:pic><p:blipFill><a:blip r:embed="rId2"/></p:blipFill></p:pic><p:sp><p:txBody><a:p><a:r><a:rPr><a:hlinkClick r:id="rId3"/></a:rPr><a:t>link</a:t></a:r></a:p></p:txBody></p:sp><p:pic><p:blipFill><a:blip r:embed="rId9"/></p:blipFill></p:pic></p:spTree></p:cSld></p:sld>"#;

    fn source() -> OoxmlPackage {
        let mut pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let slide = pkg.add_part(PartKind::Slide, ct::POWERPOINT_SLIDE, SLIDE.as_bytes().to_vec());
        let layout = pkg.add_part(PartKind::SlideLayout, ct::SLIDE_LAYOUT, Vec::new());
        pkg.add_relationship(&slide, &layout, rt::SLIDE_LAYOUT).unwrap();
        let png = pkg.add_part(PartKind::Image, "image/png", b"png".to_vec());
        pkg.add_relationship(&slide, &png, rt::IMAGE).unwrap();
        pkg.add_external_relationship(&slide, "https://example.com", rt::HYPERLINK)
            .unwrap();
        pkg
    }

    #[test]
    fn rewrites_references_and_reports_missing_ones() {
        let source = source();
        let mut destination = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let mut cache = EquivalenceCache::new();
        let mut diagnostics = Vec::new();
        let settings = PresentationBuilderSettings::default();

        let old = "/ppt/slides/slide1.xml";
        let new = destination.add_part(PartKind::Slide, ct::POWERPOINT_SLIDE, Vec::new());
        let mut doc = source.xml_part(old).unwrap();
        let mut copier = PartCopier {
            source: &source,
            destination: &mut destination,
            cache: &mut cache,
            diagnostics: &mut diagnostics,
            settings: &settings,
        };
        copier.copy_content_part(old, &new, &mut doc).unwrap();

        let root = doc.root().unwrap();
        let blips = doc.descendants_named(root, &A::blip());
        let first = doc.attribute(blips[0], &R::embed()).unwrap().to_string();
        assert_eq!(doc.attribute(blips[1], &R::embed()), Some(first.as_str()));
        assert_eq!(doc.attribute(blips[2], &R::embed()), None);

        let image = destination.part_by_id(&new, &first).unwrap();
        assert_eq!(destination.part_bytes(image), Some(&b"png"[..]));

        let link = doc.descendants_named(root, &A::hlinkClick())[0];
        let link_id = doc.attribute(link, &R::id()).unwrap();
        assert!(destination.relationship(&new, link_id).unwrap().is_external());

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].relationship_id, "rId9");
        assert_eq!(diagnostics[0].site, "a:blip/@r:embed");
        // The layout relationship is the builder's business.
        assert!(destination.related_part(&new, rt::SLIDE_LAYOUT).is_none());
    }

    #[test]
    fn capability_violation_is_an_internal_error() {
        let mut source = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let tags = source.add_part(
            PartKind::Tags,
            ct::TAGS,
            br#"<p:tagLst xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#.to_vec(),
        );
        let png = source.add_part(PartKind::Image, "image/png", b"png".to_vec());
        source.add_relationship(&tags, &png, rt::IMAGE).unwrap();

        let mut destination = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let new = destination.add_part(PartKind::Tags, ct::TAGS, Vec::new());
        let mut doc = parse(r#"<x xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:embed="rId1"/>"#).unwrap();
        let mut cache = EquivalenceCache::new();
        let mut diagnostics = Vec::new();
        let settings = PresentationBuilderSettings::default();
        let mut copier = PartCopier {
            source: &source,
            destination: &mut destination,
            cache: &mut cache,
            diagnostics: &mut diagnostics,
            settings: &settings,
        };

        let err = copier.copy_content_part(&tags, &new, &mut doc).unwrap_err();
        assert!(matches!(err, SlidekitError::Internal { .. }));
    }

    #[test]
    fn empty_action_button_link_is_left_alone() {
        let source = source();
        let mut destination = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let new = destination.add_part(PartKind::Slide, ct::POWERPOINT_SLIDE, Vec::new());
        let mut doc = parse(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="4" name="Action Button: Forward"><a:hlinkClick r:id="" action="ppaction://hlinkshowjump?jump=nextslide"/></p:cNvPr></p:nvSpPr></p:sp></p:spTree></p:cSld></p:sld>"#).unwrap();
        let mut cache = EquivalenceCache::new();
        let mut diagnostics = Vec::new();
        let settings = PresentationBuilderSettings::default();
        let mut copier = PartCopier {
            source: &source,
            destination: &mut destination,
            cache: &mut cache,
            diagnostics: &mut diagnostics,
            settings: &settings,
        };
        copier
            .copy_content_part("/ppt/slides/slide1.xml", &new, &mut doc)
            .unwrap();

        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let root = doc.root().unwrap();
        let link = doc.descendants_named(root, &A::hlinkClick())[0];
        assert_eq!(doc.attribute(link, &R::id()), Some(""));
        assert!(doc.attribute(link, &XName::local("action")).is_some());
    }

    #[test]
    fn reference_attributes_include_vml_relid() {
        assert!(is_reference_attribute(&R::embed()));
        assert!(is_reference_attribute(&O::relid()));
        assert!(!is_reference_attribute(&DSP::relId()));
        assert!(!is_reference_attribute(&XName::local("id")));
    }
}
