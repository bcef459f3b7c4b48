//! Assembles a destination presentation out of slides and masters taken
//! from any number of source presentations.
//!
//! A builder starts uninitialized. The first slide or master it receives
//! fixes the destination slide size and brings over presentation-wide
//! parts (document properties, presentation and view properties, notes and
//! handout masters, embedded fonts, default text style). Every later source
//! is scaled to that size. Masters and layouts are deduplicated through the
//! [`EquivalenceCache`], images and media too.

use super::cache::{CacheStats, EquivalenceCache};
use super::copy::{Diagnostic, PartCopier};
use super::document::{read_extent, PmlDocument};
use super::scale::{scale_factor, scale_part};
use super::settings::PresentationBuilderSettings;
use super::signature::{layout_signature, master_signature};
use crate::error::{Result, SlidekitError};
use crate::package::content_types::content_type_values as ct;
use crate::package::relationship_types as rt;
use crate::package::{OoxmlPackage, PartKind, PACKAGE_URI};
use crate::xml::namespaces::{A, P, P14, P188, R};
use crate::xml::{XAttribute, XName, XmlDocument, XmlNodeData};
use indextree::NodeId;
use std::collections::HashMap;
use tracing::{debug, info};

const FIRST_SLIDE_ID: u32 = 256;
/// Slide master and layout ids share one range starting here.
const FIRST_MASTER_ID: u32 = 2_147_483_648;
/// 4:3 at 10in x 7.5in, used when a source declares no slide size.
const DEFAULT_SLIDE_SIZE: (i64, i64) = (9_144_000, 6_858_000);

/// Child order of `p:presentation`.
const PRESENTATION_ORDER: &[&str] = &[
    "sldMasterIdLst",
    "notesMasterIdLst",
    "handoutMasterIdLst",
    "sldIdLst",
    "sldSz",
    "notesSz",
    "smartTags",
    "embeddedFontLst",
    "custShowLst",
    "photoAlbum",
    "custDataLst",
    "kinsoku",
    "defaultTextStyle",
    "modifyVerifier",
    "extLst",
];

/// Child order of `p:sldMaster`.
const MASTER_ORDER: &[&str] = &[
    "cSld",
    "clrMap",
    "sldLayoutIdLst",
    "transition",
    "timing",
    "hf",
    "txStyles",
    "extLst",
];

const PRESENTATION_PARTS: &[(&str, PartKind)] = &[
    (rt::PRESENTATION_PROPERTIES, PartKind::PresentationProperties),
    (rt::VIEW_PROPERTIES, PartKind::ViewProperties),
    (rt::COMMENT_AUTHORS, PartKind::CommentAuthors),
];

const DOCUMENT_PROPERTIES: &[(&str, PartKind)] = &[
    (rt::CORE_PROPERTIES, PartKind::CoreProperties),
    (rt::EXTENDED_PROPERTIES, PartKind::ExtendedProperties),
    (rt::CUSTOM_PROPERTIES, PartKind::CustomProperties),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum BuildState {
    Uninitialized,
    Initialized { slide_size: (i64, i64) },
}

pub struct PresentationBuilder {
    destination: OoxmlPackage,
    settings: PresentationBuilderSettings,
    cache: EquivalenceCache,
    state: BuildState,
    diagnostics: Vec<Diagnostic>,
}

impl PresentationBuilder {
    /// Builder over a new, empty presentation.
    pub fn new(settings: PresentationBuilderSettings) -> Result<Self> {
        Ok(Self {
            destination: PmlDocument::new_empty()?.into_package(),
            settings,
            cache: EquivalenceCache::new(),
            state: BuildState::Uninitialized,
            diagnostics: Vec::new(),
        })
    }

    /// Builder appending to `document`. Its masters and layouts seed the
    /// cache so equivalent ones from sources are reused.
    pub fn with_document(document: PmlDocument, settings: PresentationBuilderSettings) -> Result<Self> {
        let state = match document.slide_size()? {
            Some(slide_size) => BuildState::Initialized { slide_size },
            None => BuildState::Uninitialized,
        };
        let masters = document.slide_master_parts()?;

        let mut builder = Self {
            destination: document.into_package(),
            settings,
            cache: EquivalenceCache::new(),
            state,
            diagnostics: Vec::new(),
        };
        for master in masters {
            let doc = builder.destination.xml_part(&master)?;
            let signature = master_signature(&builder.destination, &master, &doc)?;
            builder.cache.get_or_add_slide_master(&signature, &master);

            for layout in builder.destination.related_parts(&master, rt::SLIDE_LAYOUT) {
                let doc = builder.destination.xml_part(&layout)?;
                let signature = layout_signature(&builder.destination, &layout, &doc)?;
                builder.cache.get_or_add_slide_layout(&master, &signature, &layout);
            }
        }
        debug!(stats = ?builder.cache.stats(), "seeded equivalence cache");
        Ok(builder)
    }

    pub fn settings(&self) -> &PresentationBuilderSettings {
        &self.settings
    }

    pub fn package(&self) -> &OoxmlPackage {
        &self.destination
    }

    /// References skipped so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Copies `master` and all of its layouts. Returns the destination
    /// master, which may be an existing equivalent one.
    pub fn add_slide_master_part(&mut self, source: &PmlDocument, master: &str) -> Result<String> {
        self.copy_master_with_layouts(source, master).map_err(|e| {
            let deck = source.file_name().unwrap_or("source presentation");
            e.in_slide_context(&format!("{}, slide master {}", deck, master))
        })
    }

    /// Copies `slide` with its layout, master, notes and comments, and
    /// appends it to the slide list. Returns the new slide part.
    pub fn add_slide_part(&mut self, source: &PmlDocument, slide: &str) -> Result<String> {
        self.copy_slide(source, slide)
            .map_err(|e| e.in_slide_context(&slide_label(source, slide)))
    }

    /// Appends `count` slides of `source` starting at zero-based `start`;
    /// `None` takes the rest of the deck.
    pub fn append_slides(
        &mut self,
        source: &PmlDocument,
        start: usize,
        count: Option<usize>,
    ) -> Result<Vec<String>> {
        let slides = source.slide_parts()?;
        let end = match count {
            Some(count) => start.checked_add(count),
            None => Some(slides.len()),
        };
        let range = match end {
            Some(end) if start <= end && end <= slides.len() => start..end,
            _ => {
                return Err(SlidekitError::InvalidSlideSource {
                    message: format!(
                        "{}: start {} count {:?} outside {} slides",
                        source.file_name().unwrap_or("source presentation"),
                        start,
                        count,
                        slides.len()
                    ),
                })
            }
        };

        slides[range]
            .iter()
            .map(|slide| self.add_slide_part(source, slide))
            .collect()
    }

    /// Copies every master of `source`, in `p:sldMasterIdLst` order.
    pub fn append_masters(&mut self, source: &PmlDocument) -> Result<Vec<String>> {
        source
            .slide_master_parts()?
            .iter()
            .map(|master| self.add_slide_master_part(source, master))
            .collect()
    }

    /// Applies the final clean-ups and hands out the presentation.
    pub fn finish(mut self) -> Result<PmlDocument> {
        let presentation = self.destination.main_part_name().to_string();

        if self.settings.strip_section_lists {
            strip_section_lists(&mut self.destination, &presentation)?;
        }
        if self.settings.clear_custom_properties {
            let custom = self
                .destination
                .related_part(PACKAGE_URI, rt::CUSTOM_PROPERTIES)
                .map(|s| s.to_string());
            if let Some(custom) = custom {
                self.destination.delete_part(&custom);
            }
        }
        if self.settings.strip_smt_clean {
            strip_smt_clean(&mut self.destination)?;
        }

        let document = PmlDocument::from_package(self.destination)?;
        info!(
            slides = document.slide_count()?,
            masters = document.slide_master_parts()?.len(),
            diagnostics = self.diagnostics.len(),
            stats = ?self.cache.stats(),
            "finished presentation"
        );
        Ok(document)
    }

    fn copier<'s>(&'s mut self, source: &'s OoxmlPackage) -> PartCopier<'s> {
        PartCopier {
            source,
            destination: &mut self.destination,
            cache: &mut self.cache,
            diagnostics: &mut self.diagnostics,
            settings: &self.settings,
        }
    }

    fn presentation_part(&self) -> String {
        self.destination.main_part_name().to_string()
    }

    /// Scale factor for `source`, initializing the destination from it on
    /// first use.
    fn prepare(&mut self, source: &PmlDocument) -> Result<f64> {
        let slide_size = match self.state {
            BuildState::Initialized { slide_size } => slide_size,
            BuildState::Uninitialized => self.initialize(source)?,
        };
        Ok(match source.slide_size()? {
            Some(source_size) => scale_factor(slide_size, source_size),
            None => 1.0,
        })
    }

    fn initialize(&mut self, source: &PmlDocument) -> Result<(i64, i64)> {
        let src = source.package();
        let src_pres = source.presentation_part().to_string();
        let dest_pres = self.presentation_part();

        self.copy_document_properties(src)?;
        for &(rel_type, kind) in PRESENTATION_PARTS {
            if rel_type == rt::COMMENT_AUTHORS && !self.settings.copy_comments {
                continue;
            }
            self.copy_presentation_part(src, &src_pres, rel_type, kind)?;
        }
        if self.settings.copy_notes {
            self.ensure_notes_master(src, &src_pres)?;
        }
        self.ensure_singleton_master(
            src,
            &src_pres,
            rt::HANDOUT_MASTER,
            PartKind::HandoutMaster,
            "handoutMasterIdLst",
            P::handoutMasterId(),
        )?;

        let src_doc = src.xml_part(&src_pres)?;
        let mut pres = self.destination.xml_part(&dest_pres)?;
        let (Some(src_root), Some(root)) = (src_doc.root(), pres.root()) else {
            return Err(SlidekitError::InvalidPackage {
                message: "presentation part has no root element".to_string(),
            });
        };

        for name in [P::sldSz(), P::notesSz(), P::defaultTextStyle(), P::embeddedFontLst()] {
            let Some(node) = src_doc.child_element(src_root, &name) else {
                continue;
            };
            if let Some(existing) = pres.child_element(root, &name) {
                pres.remove(existing);
            }
            let Some(imported) = pres.import_subtree(&src_doc, node, Some(root)) else {
                continue;
            };
            if name == P::embeddedFontLst() {
                self.copier(src)
                    .copy_references(&src_pres, &dest_pres, &mut pres, imported)?;
            }
        }

        let slide_size = match pres.child_element(root, &P::sldSz()) {
            Some(node) => read_extent(&pres, node).unwrap_or(DEFAULT_SLIDE_SIZE),
            None => {
                let node = ensure_child(&mut pres, root, "sldSz", PRESENTATION_ORDER);
                pres.set_attribute(node, &XName::local("cx"), &DEFAULT_SLIDE_SIZE.0.to_string());
                pres.set_attribute(node, &XName::local("cy"), &DEFAULT_SLIDE_SIZE.1.to_string());
                DEFAULT_SLIDE_SIZE
            }
        };
        ensure_child(&mut pres, root, "sldIdLst", PRESENTATION_ORDER);
        sort_by_schema(&mut pres, root, PRESENTATION_ORDER);
        self.destination.put_xml_part(&dest_pres, &pres)?;

        self.state = BuildState::Initialized { slide_size };
        debug!(cx = slide_size.0, cy = slide_size.1, "initialized destination presentation");
        Ok(slide_size)
    }

    fn copy_document_properties(&mut self, src: &OoxmlPackage) -> Result<()> {
        for &(rel_type, kind) in DOCUMENT_PROPERTIES {
            if self.destination.related_part(PACKAGE_URI, rel_type).is_some() {
                continue;
            }
            let Some(old) = src.related_part(PACKAGE_URI, rel_type) else {
                continue;
            };
            let Some(bytes) = src.part_bytes(old) else {
                continue;
            };
            let content_type = src
                .content_type(old)
                .or(kind.info().content_type)
                .unwrap_or(ct::XML);
            let new = self.destination.add_part(kind, content_type, bytes.to_vec());
            self.destination
                .add_relationship(PACKAGE_URI, &new, rel_type)?;
        }
        Ok(())
    }

    fn copy_presentation_part(
        &mut self,
        src: &OoxmlPackage,
        src_pres: &str,
        rel_type: &str,
        kind: PartKind,
    ) -> Result<()> {
        let dest_pres = self.presentation_part();
        if self.destination.related_part(&dest_pres, rel_type).is_some() {
            return Ok(());
        }
        let Some(old) = src.related_part(src_pres, rel_type) else {
            return Ok(());
        };
        let new = self.store_copy(src, old, kind, src.xml_part(old)?)?;
        self.destination.add_relationship(&dest_pres, &new, rel_type)?;
        Ok(())
    }

    /// Copies `doc`, the possibly transformed content of `old`, into a new
    /// part of `kind` together with everything it references.
    fn store_copy(
        &mut self,
        src: &OoxmlPackage,
        old: &str,
        kind: PartKind,
        mut doc: XmlDocument,
    ) -> Result<String> {
        let content_type = src
            .content_type(old)
            .or(kind.info().content_type)
            .unwrap_or(ct::XML);
        let new = self.destination.add_part(kind, content_type, Vec::new());
        self.copier(src).copy_content_part(old, &new, &mut doc)?;
        self.destination.put_xml_part(&new, &doc)?;
        debug!(from = old, to = %new, "copied part");
        Ok(new)
    }

    fn copy_theme(&mut self, src: &OoxmlPackage, old_owner: &str, new_owner: &str) -> Result<Option<String>> {
        let Some(theme) = src.related_part(old_owner, rt::THEME) else {
            return Ok(None);
        };
        if !src.contains_part(theme) {
            return Ok(None);
        }
        let new = self.store_copy(src, theme, PartKind::Theme, src.xml_part(theme)?)?;
        self.destination.add_relationship(new_owner, &new, rt::THEME)?;
        Ok(Some(new))
    }

    fn ensure_notes_master(&mut self, src: &OoxmlPackage, src_pres: &str) -> Result<Option<String>> {
        self.ensure_singleton_master(
            src,
            src_pres,
            rt::NOTES_MASTER,
            PartKind::NotesMaster,
            "notesMasterIdLst",
            P::notesMasterId(),
        )
    }

    /// Notes and handout masters: at most one each, copied from the first
    /// source that has one.
    fn ensure_singleton_master(
        &mut self,
        src: &OoxmlPackage,
        src_pres: &str,
        rel_type: &str,
        kind: PartKind,
        list: &str,
        entry: XName,
    ) -> Result<Option<String>> {
        let dest_pres = self.presentation_part();
        if let Some(existing) = self.destination.related_part(&dest_pres, rel_type) {
            return Ok(Some(existing.to_string()));
        }
        let Some(old) = src.related_part(src_pres, rel_type) else {
            return Ok(None);
        };
        if !src.contains_part(old) {
            return Ok(None);
        }

        let new = self.store_copy(src, old, kind, src.xml_part(old)?)?;
        self.copy_theme(src, old, &new)?;
        let id = self.destination.add_relationship(&dest_pres, &new, rel_type)?;

        let mut pres = self.destination.edit_xml_part(&dest_pres)?;
        if let Some(root) = pres.root() {
            let list = ensure_child(&mut pres, root, list, PRESENTATION_ORDER);
            pres.remove_children(list);
            pres.add_child(
                list,
                XmlNodeData::element_with_attrs(entry, vec![XAttribute::new(R::id(), &id)]),
            );
        }
        pres.commit()?;
        Ok(Some(new))
    }

    /// Next id in the shared master/layout range.
    fn next_master_id(&self) -> Result<u32> {
        let pres_name = self.presentation_part();
        let pres = self.destination.xml_part(&pres_name)?;
        let mut max = None;

        if let Some(list) = pres
            .root()
            .and_then(|root| pres.child_element(root, &P::sldMasterIdLst()))
        {
            let master_id = P::sldMasterId();
            max = pres
                .elements_by_name(list, &master_id)
                .filter_map(|n| pres.attribute(n, &XName::local("id")))
                .filter_map(|v| v.parse::<u32>().ok())
                .max();
        }

        for master in self.destination.related_parts(&pres_name, rt::SLIDE_MASTER) {
            let doc = self.destination.xml_part(&master)?;
            let Some(list) = doc
                .root()
                .and_then(|root| doc.child_element(root, &P::sldLayoutIdLst()))
            else {
                continue;
            };
            let layout_id = P::sldLayoutId();
            let layout_max = doc
                .elements_by_name(list, &layout_id)
                .filter_map(|n| doc.attribute(n, &XName::local("id")))
                .filter_map(|v| v.parse::<u32>().ok())
                .max();
            max = max.max(layout_max);
        }

        let next = match max {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                SlidekitError::internal("slide master and layout ids exhausted")
            })?,
            None => FIRST_MASTER_ID,
        };
        Ok(next.max(FIRST_MASTER_ID))
    }

    fn copy_master_with_layouts(&mut self, source: &PmlDocument, master: &str) -> Result<String> {
        let scale = self.prepare(source)?;
        let new_master = self.copy_slide_master(source, master, scale)?;
        for layout in layout_parts(source.package(), master)? {
            self.copy_slide_layout(source, &layout, &new_master, scale)?;
        }
        Ok(new_master)
    }

    fn copy_slide_master(&mut self, source: &PmlDocument, master: &str, scale: f64) -> Result<String> {
        let src = source.package();
        let mut doc = src.xml_part(master)?;
        scale_part(&mut doc, scale, self.settings.scale_font_sizes);

        let signature = master_signature(src, master, &doc)?;
        if let Some(found) = self.cache.find_slide_master(&signature) {
            debug!(master, reused = %found.part, "reusing equivalent slide master");
            return Ok(found.part.clone());
        }

        if let Some(list) = doc
            .root()
            .and_then(|root| doc.child_element(root, &P::sldLayoutIdLst()))
        {
            doc.remove_children(list);
        }
        let id = self.next_master_id()?;
        let new = self.store_copy(src, master, PartKind::SlideMaster, doc)?;
        let theme = self.copy_theme(src, master, &new)?;

        let dest_pres = self.presentation_part();
        if let Some(theme) = theme {
            if self.destination.related_part(&dest_pres, rt::THEME).is_none() {
                self.destination.add_relationship(&dest_pres, &theme, rt::THEME)?;
            }
        }

        let r_id = self
            .destination
            .add_relationship(&dest_pres, &new, rt::SLIDE_MASTER)?;
        let mut pres = self.destination.edit_xml_part(&dest_pres)?;
        if let Some(root) = pres.root() {
            let list = ensure_child(&mut pres, root, "sldMasterIdLst", PRESENTATION_ORDER);
            pres.add_child(
                list,
                XmlNodeData::element_with_attrs(
                    P::sldMasterId(),
                    vec![
                        XAttribute::new(XName::local("id"), &id.to_string()),
                        XAttribute::new(R::id(), &r_id),
                    ],
                ),
            );
        }
        pres.commit()?;

        Ok(self.cache.get_or_add_slide_master(&signature, &new))
    }

    fn copy_slide_layout(
        &mut self,
        source: &PmlDocument,
        layout: &str,
        new_master: &str,
        scale: f64,
    ) -> Result<String> {
        let src = source.package();
        let mut doc = src.xml_part(layout)?;
        scale_part(&mut doc, scale, self.settings.scale_font_sizes);

        let signature = layout_signature(src, layout, &doc)?;
        if let Some(found) = self.cache.find_slide_layout(new_master, &signature) {
            return Ok(found.part.clone());
        }

        let id = self.next_master_id()?;
        let new = self.store_copy(src, layout, PartKind::SlideLayout, doc)?;
        self.destination
            .add_relationship(&new, new_master, rt::SLIDE_MASTER)?;
        let r_id = self
            .destination
            .add_relationship(new_master, &new, rt::SLIDE_LAYOUT)?;

        let mut master = self.destination.edit_xml_part(new_master)?;
        if let Some(root) = master.root() {
            let list = ensure_child(&mut master, root, "sldLayoutIdLst", MASTER_ORDER);
            master.add_child(
                list,
                XmlNodeData::element_with_attrs(
                    P::sldLayoutId(),
                    vec![
                        XAttribute::new(XName::local("id"), &id.to_string()),
                        XAttribute::new(R::id(), &r_id),
                    ],
                ),
            );
        }
        master.commit()?;

        Ok(self.cache.get_or_add_slide_layout(new_master, &signature, &new))
    }

    fn copy_slide(&mut self, source: &PmlDocument, slide: &str) -> Result<String> {
        let scale = self.prepare(source)?;
        let src = source.package();

        let Some(layout) = src.related_part(slide, rt::SLIDE_LAYOUT).map(|s| s.to_string()) else {
            return Err(SlidekitError::internal("{slide} has no slide layout"));
        };
        let Some(master) = src.related_part(&layout, rt::SLIDE_MASTER).map(|s| s.to_string()) else {
            return Err(SlidekitError::internal("the layout of {slide} has no slide master"));
        };
        let new_master = self.copy_slide_master(source, &master, scale)?;
        let new_layout = self.copy_slide_layout(source, &layout, &new_master, scale)?;

        let mut doc = src.xml_part(slide)?;
        scale_part(&mut doc, scale, self.settings.scale_font_sizes);
        self.copy_table_styles(src, source.presentation_part(), &doc)?;
        let new_slide = self.store_copy(src, slide, PartKind::Slide, doc)?;
        self.destination
            .add_relationship(&new_slide, &new_layout, rt::SLIDE_LAYOUT)?;

        if self.settings.copy_notes {
            self.copy_notes(source, slide, &new_slide)?;
        }
        if self.settings.copy_comments {
            self.copy_legacy_comments(source, slide, &new_slide)?;
            if src.related_part(slide, rt::MODERN_COMMENTS).is_some() {
                self.merge_modern_comment_authors(source)?;
            }
        }

        self.append_slide_id(&new_slide)?;
        debug!(from = slide, to = %new_slide, layout = %new_layout, "copied slide");
        Ok(new_slide)
    }

    fn append_slide_id(&mut self, new_slide: &str) -> Result<()> {
        let dest_pres = self.presentation_part();
        let r_id = self
            .destination
            .add_relationship(&dest_pres, new_slide, rt::SLIDE)?;

        let mut pres = self.destination.edit_xml_part(&dest_pres)?;
        let Some(root) = pres.root() else {
            return Err(SlidekitError::InvalidPackage {
                message: "presentation part has no root element".to_string(),
            });
        };
        let list = ensure_child(&mut pres, root, "sldIdLst", PRESENTATION_ORDER);
        let max = pres
            .elements_by_name(list, &P::sldId())
            .filter_map(|n| pres.attribute(n, &XName::local("id")))
            .filter_map(|v| v.parse::<u32>().ok())
            .max();
        let id = match max {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| SlidekitError::internal("slide ids exhausted"))?
                .max(FIRST_SLIDE_ID),
            None => FIRST_SLIDE_ID,
        };
        pres.add_child(
            list,
            XmlNodeData::element_with_attrs(
                P::sldId(),
                vec![
                    XAttribute::new(XName::local("id"), &id.to_string()),
                    XAttribute::new(R::id(), &r_id),
                ],
            ),
        );
        pres.commit()
    }

    /// Brings the `a:tblStyle` definitions the slide's tables name into the
    /// destination table styles part. Built-in styles have no definition
    /// and are left alone.
    fn copy_table_styles(&mut self, src: &OoxmlPackage, src_pres: &str, slide: &XmlDocument) -> Result<()> {
        let Some(root) = slide.root() else {
            return Ok(());
        };
        let mut wanted: Vec<String> = slide
            .descendants_named(root, &A::tableStyleId())
            .into_iter()
            .map(|n| slide.text(n).trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        wanted.sort();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(());
        }
        let Some(src_styles) = src.related_part(src_pres, rt::TABLE_STYLES) else {
            return Ok(());
        };
        let src_doc = src.xml_part(src_styles)?;
        let Some(src_root) = src_doc.root() else {
            return Ok(());
        };

        let style_id = XName::local("styleId");
        let dest_pres = self.presentation_part();
        let dest_styles = match self.destination.related_part(&dest_pres, rt::TABLE_STYLES) {
            Some(part) => part.to_string(),
            None => {
                let (mut doc, new_root) =
                    XmlDocument::with_root(A::tblStyleLst(), &[("a", A::NS)]);
                let def = XName::local("def");
                if let Some(default) = src_doc.attribute(src_root, &def) {
                    doc.set_attribute(new_root, &def, default);
                }
                let part = self.destination.add_xml_part(PartKind::TableStyles, &doc)?;
                self.destination
                    .add_relationship(&dest_pres, &part, rt::TABLE_STYLES)?;
                part
            }
        };

        let mut dest_doc = self.destination.xml_part(&dest_styles)?;
        let Some(dest_root) = dest_doc.root() else {
            return Ok(());
        };
        let present: Vec<String> = dest_doc
            .elements_by_name(dest_root, &A::tblStyle())
            .filter_map(|n| dest_doc.attribute(n, &style_id).map(|s| s.to_string()))
            .collect();

        for id in wanted.iter().filter(|id| !present.contains(id)) {
            let Some(style) = src_doc
                .elements_by_name(src_root, &A::tblStyle())
                .find(|&n| src_doc.attribute(n, &style_id) == Some(id.as_str()))
            else {
                continue;
            };
            if let Some(imported) = dest_doc.import_subtree(&src_doc, style, Some(dest_root)) {
                self.copier(src)
                    .copy_references(src_styles, &dest_styles, &mut dest_doc, imported)?;
                debug!(style = %id, "copied table style");
            }
        }
        self.destination.put_xml_part(&dest_styles, &dest_doc)
    }

    fn copy_notes(&mut self, source: &PmlDocument, slide: &str, new_slide: &str) -> Result<()> {
        let src = source.package();
        let Some(notes) = source.notes_part(slide).map(|s| s.to_string()) else {
            return Ok(());
        };
        if !src.contains_part(&notes) {
            return Ok(());
        }
        let Some(notes_master) = self.ensure_notes_master(src, source.presentation_part())? else {
            debug!(slide, "no notes master available; notes not copied");
            return Ok(());
        };

        let new_notes = self.store_copy(src, &notes, PartKind::NotesSlide, src.xml_part(&notes)?)?;
        self.destination
            .add_relationship(&new_notes, &notes_master, rt::NOTES_MASTER)?;
        self.destination
            .add_relationship(&new_notes, new_slide, rt::SLIDE)?;
        self.destination
            .add_relationship(new_slide, &new_notes, rt::NOTES_SLIDE)?;
        Ok(())
    }

    /// Copies the slide's legacy comment list, mapping each author onto a
    /// destination author with the same name and initials.
    fn copy_legacy_comments(&mut self, source: &PmlDocument, slide: &str, new_slide: &str) -> Result<()> {
        let src = source.package();
        let Some(comments) = src.related_part(slide, rt::COMMENTS).map(|s| s.to_string()) else {
            return Ok(());
        };
        if !src.contains_part(&comments) {
            return Ok(());
        }

        let src_authors = src
            .related_part(source.presentation_part(), rt::COMMENT_AUTHORS)
            .map(|part| src.xml_part(part))
            .transpose()?;
        let authors_part = self.ensure_comment_authors()?;
        let mut authors = self.destination.xml_part(&authors_part)?;
        let mut doc = src.xml_part(&comments)?;

        let id_attr = XName::local("id");
        let author_id = XName::local("authorId");
        let idx = XName::local("idx");
        let last_idx = XName::local("lastIdx");
        let mut mapped: HashMap<String, NodeId> = HashMap::new();

        let nodes = match doc.root() {
            Some(root) => doc.descendants_named(root, &P::cm()),
            None => Vec::new(),
        };
        for cm in nodes {
            let Some(old_id) = doc.attribute(cm, &author_id).map(|s| s.to_string()) else {
                continue;
            };
            let author = match mapped.get(&old_id) {
                Some(&node) => node,
                None => {
                    let source_author = src_authors.as_ref().and_then(|d| {
                        let root = d.root()?;
                        d.elements_by_name(root, &P::cmAuthor())
                            .find(|&n| d.attribute(n, &id_attr) == Some(old_id.as_str()))
                            .map(|n| (d, n))
                    });
                    let node = merge_comment_author(&mut authors, source_author)?;
                    mapped.insert(old_id.clone(), node);
                    node
                }
            };

            if let Some(new_id) = authors.attribute(author, &id_attr).map(|s| s.to_string()) {
                doc.set_attribute(cm, &author_id, &new_id);
            }
            // Indexes are unique per author in the destination.
            let next = authors
                .attribute(author, &last_idx)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0)
                + 1;
            doc.set_attribute(cm, &idx, &next.to_string());
            authors.set_attribute(author, &last_idx, &next.to_string());
        }
        self.destination.put_xml_part(&authors_part, &authors)?;

        let new_comments = self.store_copy(src, &comments, PartKind::Comments, doc)?;
        self.destination
            .add_relationship(new_slide, &new_comments, rt::COMMENTS)?;
        Ok(())
    }

    fn ensure_comment_authors(&mut self) -> Result<String> {
        let dest_pres = self.presentation_part();
        if let Some(part) = self.destination.related_part(&dest_pres, rt::COMMENT_AUTHORS) {
            return Ok(part.to_string());
        }
        let (doc, _) = XmlDocument::with_root(
            P::cmAuthorLst(),
            &[("a", A::NS), ("r", R::NS), ("p", P::NS)],
        );
        let part = self.destination.add_xml_part(PartKind::CommentAuthors, &doc)?;
        self.destination
            .add_relationship(&dest_pres, &part, rt::COMMENT_AUTHORS)?;
        Ok(part)
    }

    /// Adds the source's modern comment authors the destination lacks,
    /// matching on their id.
    fn merge_modern_comment_authors(&mut self, source: &PmlDocument) -> Result<()> {
        let src = source.package();
        let Some(src_part) = src.related_part(source.presentation_part(), rt::AUTHORS) else {
            return Ok(());
        };
        let src_doc = src.xml_part(src_part)?;
        let Some(src_root) = src_doc.root() else {
            return Ok(());
        };

        let dest_pres = self.presentation_part();
        let dest_part = match self.destination.related_part(&dest_pres, rt::AUTHORS) {
            Some(part) => part.to_string(),
            None => {
                let (doc, _) = XmlDocument::with_root(
                    P188::authorLst(),
                    &[("a", A::NS), ("r", R::NS), ("p188", P188::NS)],
                );
                let part = self.destination.add_xml_part(PartKind::Authors, &doc)?;
                self.destination
                    .add_relationship(&dest_pres, &part, rt::AUTHORS)?;
                part
            }
        };

        let id_attr = XName::local("id");
        let mut dest_doc = self.destination.edit_xml_part(&dest_part)?;
        let Some(dest_root) = dest_doc.root() else {
            return Ok(());
        };
        for author in src_doc.elements_by_name(src_root, &P188::author()) {
            let Some(id) = src_doc.attribute(author, &id_attr) else {
                continue;
            };
            let known = dest_doc
                .elements_by_name(dest_root, &P188::author())
                .any(|n| dest_doc.attribute(n, &id_attr) == Some(id));
            if !known {
                dest_doc.import_subtree(&src_doc, author, Some(dest_root));
            }
        }
        dest_doc.commit()
    }
}

/// Destination author matching `source_author` by name and initials,
/// created with the next free id when there is none.
fn merge_comment_author(
    authors: &mut XmlDocument,
    source_author: Option<(&XmlDocument, NodeId)>,
) -> Result<NodeId> {
    let root = authors.root().ok_or_else(|| SlidekitError::InvalidPackage {
        message: "comment authors part has no root element".to_string(),
    })?;
    let id_attr = XName::local("id");
    let name_attr = XName::local("name");
    let initials_attr = XName::local("initials");
    let clr_idx = XName::local("clrIdx");

    let (name, initials, color) = match source_author {
        Some((doc, node)) => (
            doc.attribute(node, &name_attr).unwrap_or_default().to_string(),
            doc.attribute(node, &initials_attr).unwrap_or_default().to_string(),
            doc.attribute(node, &clr_idx).map(|s| s.to_string()),
        ),
        None => ("Unknown".to_string(), String::new(), None),
    };

    let existing = authors.elements_by_name(root, &P::cmAuthor()).find(|&n| {
        authors.attribute(n, &name_attr) == Some(name.as_str())
            && authors.attribute(n, &initials_attr).unwrap_or_default() == initials
    });
    if let Some(node) = existing {
        return Ok(node);
    }

    let next = authors
        .elements_by_name(root, &P::cmAuthor())
        .filter_map(|n| authors.attribute(n, &id_attr))
        .filter_map(|v| v.parse::<u32>().ok())
        .max()
        .map(|max| max + 1)
        .unwrap_or(0);
    let color = color.unwrap_or_else(|| (next % 8).to_string());
    Ok(authors.add_child(
        root,
        XmlNodeData::element_with_attrs(
            P::cmAuthor(),
            vec![
                XAttribute::new(id_attr, &next.to_string()),
                XAttribute::new(name_attr, &name),
                XAttribute::new(initials_attr, &initials),
                XAttribute::new(XName::local("lastIdx"), "0"),
                XAttribute::new(clr_idx, &color),
            ],
        ),
    ))
}

/// Layouts of `master` in `p:sldLayoutIdLst` order, falling back to the
/// relationship order when the list is missing.
fn layout_parts(package: &OoxmlPackage, master: &str) -> Result<Vec<String>> {
    let doc = package.xml_part(master)?;
    let listed: Vec<String> = doc
        .root()
        .and_then(|root| doc.child_element(root, &P::sldLayoutIdLst()))
        .map(|list| {
            doc.elements_by_name(list, &P::sldLayoutId())
                .filter_map(|n| doc.attribute(n, &R::id()))
                .filter_map(|id| package.part_by_id(master, id))
                .filter(|part| package.contains_part(part))
                .map(|part| part.to_string())
                .collect()
        })
        .unwrap_or_default();
    if listed.is_empty() {
        return Ok(package.related_parts(master, rt::SLIDE_LAYOUT));
    }
    Ok(listed)
}

fn slide_label(source: &PmlDocument, slide: &str) -> String {
    let deck = source.file_name().unwrap_or("source presentation");
    let position = source
        .slide_parts()
        .ok()
        .and_then(|parts| parts.iter().position(|p| p == slide));
    match position {
        Some(index) => format!("{}, slide {} ({})", deck, index + 1, slide),
        None => format!("{}, {}", deck, slide),
    }
}

fn schema_position(data: &XmlNodeData, order: &[&str]) -> usize {
    match data.name() {
        Some(name) if name.in_namespace(P::NS) => order
            .iter()
            .position(|o| *o == name.local_name)
            .unwrap_or(order.len()),
        _ => order.len(),
    }
}

fn sort_by_schema(doc: &mut XmlDocument, parent: NodeId, order: &[&str]) {
    doc.sort_children_by_key(parent, |data| schema_position(data, order));
}

/// The `p:` child `local` of `parent`, created at its schema position.
fn ensure_child(doc: &mut XmlDocument, parent: NodeId, local: &str, order: &[&str]) -> NodeId {
    let name = XName::new(P::NS, local);
    if let Some(node) = doc.child_element(parent, &name) {
        return node;
    }
    let node = doc.add_child(parent, XmlNodeData::element(name));
    sort_by_schema(doc, parent, order);
    node
}

fn strip_section_lists(package: &mut OoxmlPackage, presentation: &str) -> Result<()> {
    let mut doc = package.edit_xml_part(presentation)?;
    let Some(root) = doc.root() else {
        return Ok(());
    };
    for section_list in doc.descendants_named(root, &P14::sectionLst()) {
        doc.remove(section_list);
    }
    for ext in doc.descendants_named(root, &P::ext()) {
        if doc.elements(ext).next().is_none() {
            doc.remove(ext);
        }
    }
    if let Some(ext_list) = doc.child_element(root, &P::extLst()) {
        if doc.elements(ext_list).next().is_none() {
            doc.remove(ext_list);
        }
    }
    doc.commit()
}

/// Drops the unqualified `smtClean` attribute PowerPoint leaves on text,
/// rewriting only the parts that carried it.
fn strip_smt_clean(package: &mut OoxmlPackage) -> Result<()> {
    let smt_clean = XName::local("smtClean");
    let names: Vec<String> = package
        .part_names()
        .filter(|name| package.part(name).map(|p| p.is_xml()).unwrap_or(false))
        .map(|name| name.to_string())
        .collect();

    for name in names {
        let Ok(mut doc) = package.xml_part(&name) else {
            debug!(part = %name, "skipping unparsable part");
            continue;
        };
        let Some(root) = doc.root() else {
            continue;
        };
        let marked: Vec<NodeId> = doc
            .descendants(root)
            .filter(|&n| doc.attribute(n, &smt_clean).is_some())
            .collect();
        if marked.is_empty() {
            continue;
        }
        for node in marked {
            doc.remove_attribute(node, &smt_clean);
        }
        package.put_xml_part(&name, &doc)?;
    }
    Ok(())
}
