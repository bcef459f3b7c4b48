use crate::error::{Result, SlidekitError};
use crate::types::DocumentType;
use crate::xml::namespaces::{CP, DC, DCTERMS, XSI};
use crate::xml::{XAttribute, XName, XmlDocument, XmlNodeData};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use super::content_types::{content_type_values as ct, ContentTypes, CONTENT_TYPES_PART};
use super::guard::XmlPartGuard;
use super::pack_uri::{self, PACKAGE_URI};
use super::part_kind::PartKind;
use super::parts::Part;
use super::relationships::{relationship_types as rt, Relationship, Relationships};

const OCTET_STREAM: &str = "application/octet-stream";

fn entry_options() -> zip::write::FileOptions<'static, ()> {
    zip::write::FileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Core document properties from `docProps/core.xml`.
#[derive(Debug, Clone, Default)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub last_modified_by: Option<String>,
    pub modified: Option<String>,
}

/// An OPC package held in memory. Part names are absolute; the package's
/// own relationships are addressed through [`PACKAGE_URI`].
#[derive(Debug, Clone)]
pub struct OoxmlPackage {
    parts: BTreeMap<String, Part>,
    package_relationships: Relationships,
    content_types: ContentTypes,
    document_type: DocumentType,
    main_part: String,
}

impl OoxmlPackage {
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| SlidekitError::InvalidPackage {
                message: format!("not a zip archive: {}", e),
            })?;

        let mut entries: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            entries.insert(name, content);
        }

        let content_types = match entries.remove(CONTENT_TYPES_PART) {
            Some(bytes) => ContentTypes::parse(&bytes)?,
            None => {
                return Err(SlidekitError::InvalidPackage {
                    message: format!("{} is missing", CONTENT_TYPES_PART),
                })
            }
        };

        let package_rels_name = pack_uri::rels_uri(PACKAGE_URI);
        let package_relationships = match entries.remove(pack_uri::to_zip_name(&package_rels_name)) {
            Some(bytes) => Relationships::parse(&bytes, PACKAGE_URI)?,
            None => {
                return Err(SlidekitError::InvalidPackage {
                    message: format!("{} is missing", package_rels_name),
                })
            }
        };

        let main_part = package_relationships
            .by_type(rt::OFFICE_DOCUMENT)
            .next()
            .map(|r| r.target.clone())
            .ok_or_else(|| SlidekitError::InvalidPackage {
                message: "no officeDocument relationship".to_string(),
            })?;
        if !entries.contains_key(pack_uri::to_zip_name(&main_part)) {
            return Err(SlidekitError::InvalidPackage {
                message: format!("officeDocument target {} does not exist", main_part),
            });
        }

        let main_content_type = content_types
            .get_content_type(&main_part)
            .unwrap_or(OCTET_STREAM)
            .to_string();
        let document_type = DocumentType::from_main_content_type(&main_content_type).ok_or(
            SlidekitError::UnsupportedDocumentKind {
                content_type: main_content_type,
            },
        )?;

        let mut parts = BTreeMap::new();
        let mut rels_entries = Vec::new();
        for (entry, data) in entries {
            let name = pack_uri::from_zip_name(&entry);
            if pack_uri::source_of_rels(&name).is_some() {
                rels_entries.push((name, data));
                continue;
            }
            let content_type = content_types.get_content_type(&name).unwrap_or(OCTET_STREAM);
            parts.insert(name.clone(), Part::new(&name, content_type, data));
        }

        for (rels_name, data) in rels_entries {
            let Some(source) = pack_uri::source_of_rels(&rels_name) else {
                continue;
            };
            match parts.get_mut(&source) {
                Some(part) => part.relationships = Relationships::parse(&data, &source)?,
                None => debug!(rels = %rels_name, "ignoring relationships of a missing part"),
            }
        }

        debug!(
            parts = parts.len(),
            document_type = %document_type,
            "opened package"
        );

        Ok(Self {
            parts,
            package_relationships,
            content_types,
            document_type,
            main_part,
        })
    }

    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    /// A package holding only a minimal main part for `kind`.
    pub fn create_empty(kind: DocumentType) -> Result<Self> {
        use crate::xml::namespaces::{A, P, R};

        let doc = match kind {
            DocumentType::PowerPoint => {
                let (mut doc, root) = XmlDocument::with_root(
                    P::presentation(),
                    &[("a", A::NS), ("r", R::NS), ("p", P::NS)],
                );
                doc.add_child(
                    root,
                    XmlNodeData::element_with_attrs(
                        P::notesSz(),
                        vec![
                            XAttribute::new(XName::local("cx"), "6858000"),
                            XAttribute::new(XName::local("cy"), "9144000"),
                        ],
                    ),
                );
                doc
            }
            DocumentType::Word => {
                const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
                let (mut doc, root) =
                    XmlDocument::with_root(XName::new(W, "document"), &[("w", W), ("r", R::NS)]);
                doc.add_child(root, XmlNodeData::element(XName::new(W, "body")));
                doc
            }
            DocumentType::Excel => {
                const X: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
                let (mut doc, root) =
                    XmlDocument::with_root(XName::new(X, "workbook"), &[("", X), ("r", R::NS)]);
                doc.add_child(root, XmlNodeData::element(XName::new(X, "sheets")));
                doc
            }
        };

        let main_part = kind.main_part_name().to_string();
        let mut package = Self {
            parts: BTreeMap::new(),
            package_relationships: Relationships::new(),
            content_types: ContentTypes::new(),
            document_type: kind,
            main_part: main_part.clone(),
        };
        package.put_part(&main_part, kind.main_content_type(), crate::xml::builder::serialize_bytes(&doc)?);
        package.add_relationship(PACKAGE_URI, &main_part, rt::OFFICE_DOCUMENT)?;
        Ok(package)
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.save_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    pub fn save_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        zip.start_file(CONTENT_TYPES_PART, entry_options())?;
        zip.write_all(&self.content_types_for_save().to_bytes()?)?;

        let package_rels = pack_uri::rels_uri(PACKAGE_URI);
        zip.start_file(pack_uri::to_zip_name(&package_rels), entry_options())?;
        zip.write_all(&self.package_relationships.to_bytes(PACKAGE_URI)?)?;

        for part in self.parts.values() {
            zip.start_file(pack_uri::to_zip_name(&part.name), entry_options())?;
            zip.write_all(&part.data)?;
            if !part.relationships.is_empty() {
                let rels_name = pack_uri::rels_uri(&part.name);
                zip.start_file(pack_uri::to_zip_name(&rels_name), entry_options())?;
                zip.write_all(&part.relationships.to_bytes(&part.name)?)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.save()?)?;
        Ok(())
    }

    fn content_types_for_save(&self) -> ContentTypes {
        let mut types = self.content_types.clone();
        types.retain_overrides(|name| self.parts.contains_key(name));
        for part in self.parts.values() {
            if types.get_content_type(&part.name) != Some(part.content_type.as_str()) {
                types.set_content_type(&part.name, &part.content_type);
            }
        }
        types
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn main_part_name(&self) -> &str {
        &self.main_part
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(|k| k.as_str())
    }

    pub fn contains_part(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.get(name)
    }

    pub fn part_bytes(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(|p| p.data.as_slice())
    }

    pub fn content_type(&self, name: &str) -> Option<&str> {
        self.parts.get(name).map(|p| p.content_type.as_str())
    }

    pub fn parts_with_content_type(&self, content_type: &str) -> Vec<String> {
        self.parts
            .values()
            .filter(|p| p.content_type == content_type)
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn xml_part(&self, name: &str) -> Result<XmlDocument> {
        let bytes = self.part_bytes(name).ok_or_else(|| self.missing(name))?;
        crate::xml::parser::parse_bytes(bytes)
    }

    pub fn put_xml_part(&mut self, name: &str, doc: &XmlDocument) -> Result<()> {
        let bytes = crate::xml::builder::serialize_bytes(doc)?;
        self.set_part_bytes(name, bytes)
    }

    pub fn set_part_bytes(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let missing = self.missing(name);
        let part = self.parts.get_mut(name).ok_or(missing)?;
        part.data = data;
        Ok(())
    }

    /// Parses `name` and hands out a guard that writes it back on commit
    /// or drop.
    pub fn edit_xml_part(&mut self, name: &str) -> Result<XmlPartGuard<'_>> {
        let doc = self.xml_part(name)?;
        Ok(XmlPartGuard::new(self, name, doc))
    }

    /// Stores a part under an explicit name, replacing any previous content
    /// but keeping its relationships.
    pub fn put_part(&mut self, name: &str, content_type: &str, data: Vec<u8>) {
        self.content_types.register_part(name, content_type);
        match self.parts.get_mut(name) {
            Some(part) => {
                part.content_type = content_type.to_string();
                part.data = data;
            }
            None => {
                self.parts
                    .insert(name.to_string(), Part::new(name, content_type, data));
            }
        }
    }

    /// Next free name for a new part of `kind`: `{folder}/{stem}{N}.{ext}`
    /// with N one past the largest suffix already used in that folder.
    pub fn allocate_part_name(&self, kind: PartKind, content_type: &str) -> String {
        let info = kind.info();
        let ext = info
            .extension
            .unwrap_or_else(|| ct::extension_for(content_type));

        if info.singleton {
            let name = format!("{}/{}.{}", info.folder, info.stem, ext);
            if !self.contains_part(&name) {
                return name;
            }
        }

        let next = self
            .parts
            .keys()
            .filter(|n| pack_uri::base_uri(n) == info.folder)
            .filter_map(|n| pack_uri::index_after_stem(n, info.stem))
            .max()
            .unwrap_or(0)
            + 1;
        format!("{}/{}{}.{}", info.folder, info.stem, next, ext)
    }

    pub fn add_part(&mut self, kind: PartKind, content_type: &str, data: Vec<u8>) -> String {
        let name = self.allocate_part_name(kind, content_type);
        self.put_part(&name, content_type, data);
        debug!(part = %name, kind = %kind, "added part");
        name
    }

    pub fn add_xml_part(&mut self, kind: PartKind, doc: &XmlDocument) -> Result<String> {
        let content_type = kind.info().content_type.unwrap_or(ct::XML);
        let bytes = crate::xml::builder::serialize_bytes(doc)?;
        Ok(self.add_part(kind, content_type, bytes))
    }

    /// Removes a part, its relationships, and every relationship that
    /// pointed at it.
    pub fn delete_part(&mut self, name: &str) {
        if self.parts.remove(name).is_none() {
            return;
        }
        self.content_types.remove_override(name);
        self.package_relationships.remove_targeting(name);
        for part in self.parts.values_mut() {
            part.relationships.remove_targeting(name);
        }
    }

    pub fn relationships(&self, source: &str) -> &[Relationship] {
        self.rels(source).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn relationship(&self, source: &str, id: &str) -> Option<&Relationship> {
        self.rels(source)?.get(id)
    }

    pub fn has_relationship(&self, source: &str, id: &str) -> bool {
        self.relationship(source, id).is_some()
    }

    /// Internal target of relationship `id` on `source`.
    pub fn part_by_id(&self, source: &str, id: &str) -> Option<&str> {
        self.relationship(source, id)
            .filter(|r| !r.is_external())
            .map(|r| r.target.as_str())
    }

    pub fn id_of_part(&self, source: &str, target: &str) -> Option<&str> {
        self.rels(source)?
            .find_internal(target)
            .map(|r| r.id.as_str())
    }

    /// First internal target of `rel_type` on `source`.
    pub fn related_part(&self, source: &str, rel_type: &str) -> Option<&str> {
        self.rels(source)?
            .by_type(rel_type)
            .find(|r| !r.is_external())
            .map(|r| r.target.as_str())
    }

    pub fn related_parts(&self, source: &str, rel_type: &str) -> Vec<String> {
        self.rels(source)
            .map(|rels| {
                rels.by_type(rel_type)
                    .filter(|r| !r.is_external())
                    .map(|r| r.target.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn add_relationship(&mut self, source: &str, target: &str, rel_type: &str) -> Result<String> {
        let rels = self.rels_mut(source)?;
        let id = rels.next_id();
        rels.add(source, Relationship::new(&id, rel_type, target))?;
        Ok(id)
    }

    /// Adds a relationship under a caller-chosen id. Fails with
    /// `DuplicateRelationshipId` when the id is taken.
    pub fn add_relationship_with_id(
        &mut self,
        source: &str,
        id: &str,
        target: &str,
        rel_type: &str,
    ) -> Result<()> {
        self.rels_mut(source)?
            .add(source, Relationship::new(id, rel_type, target))
    }

    /// Copies `rel` onto `source` as is, keeping its id.
    pub fn insert_relationship(&mut self, source: &str, rel: Relationship) -> Result<()> {
        self.rels_mut(source)?.add(source, rel)
    }

    pub fn add_external_relationship(&mut self, source: &str, uri: &str, rel_type: &str) -> Result<String> {
        let rels = self.rels_mut(source)?;
        let id = rels.next_id();
        rels.add(source, Relationship::external(&id, rel_type, uri))?;
        Ok(id)
    }

    /// Id of the relationship from `source` to `target`, creating one of
    /// `rel_type` when none exists yet.
    pub fn get_or_create_id_of_part(&mut self, source: &str, target: &str, rel_type: &str) -> Result<String> {
        if let Some(rel) = self.rels(source).and_then(|r| r.find(target, rel_type)) {
            return Ok(rel.id.clone());
        }
        self.add_relationship(source, target, rel_type)
    }

    pub fn remove_relationship(&mut self, source: &str, id: &str) -> Option<Relationship> {
        self.rels_mut(source).ok()?.remove(id)
    }

    fn rels(&self, source: &str) -> Option<&Relationships> {
        if source == PACKAGE_URI {
            Some(&self.package_relationships)
        } else {
            self.parts.get(source).map(|p| &p.relationships)
        }
    }

    fn rels_mut(&mut self, source: &str) -> Result<&mut Relationships> {
        if source == PACKAGE_URI {
            return Ok(&mut self.package_relationships);
        }
        let missing = self.missing(source);
        self.parts
            .get_mut(source)
            .map(|p| &mut p.relationships)
            .ok_or(missing)
    }

    fn missing(&self, name: &str) -> SlidekitError {
        SlidekitError::MissingPart {
            part_path: name.to_string(),
            document_type: self.document_type.to_string(),
        }
    }

    fn core_properties_part(&self) -> Option<String> {
        self.related_part(PACKAGE_URI, rt::CORE_PROPERTIES)
            .filter(|name| self.contains_part(name))
            .map(|s| s.to_string())
    }

    pub fn core_properties(&self) -> CoreProperties {
        let mut props = CoreProperties::default();
        let Some(doc) = self
            .core_properties_part()
            .and_then(|name| self.xml_part(&name).ok())
        else {
            return props;
        };
        let Some(root) = doc.root() else {
            return props;
        };

        let text_of = |name: XName| {
            doc.child_element(root, &name)
                .map(|node| doc.text(node).trim().to_string())
                .filter(|t| !t.is_empty())
        };
        props.title = text_of(DC::title());
        props.creator = text_of(DC::creator());
        props.last_modified_by = text_of(CP::lastModifiedBy());
        props.modified = text_of(DCTERMS::modified());
        props
    }

    pub fn title(&self) -> Option<String> {
        self.core_properties().title
    }

    /// Sets `dc:title`, creating `docProps/core.xml` when the package has
    /// none.
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let name = match self.core_properties_part() {
            Some(name) => name,
            None => self.create_core_properties()?,
        };

        let mut guard = self.edit_xml_part(&name)?;
        let root = guard.root().ok_or_else(|| SlidekitError::InvalidPackage {
            message: format!("{} is empty", name),
        })?;
        let node = match guard.child_element(root, &DC::title()) {
            Some(node) => node,
            None => guard.add_child(root, XmlNodeData::element(DC::title())),
        };
        guard.remove_children(node);
        guard.add_child(node, XmlNodeData::text(title));
        guard.commit()
    }

    fn create_core_properties(&mut self) -> Result<String> {
        let (mut doc, root) = XmlDocument::with_root(
            CP::coreProperties(),
            &[
                ("cp", CP::NS),
                ("dc", DC::NS),
                ("dcterms", DCTERMS::NS),
                ("xsi", XSI::NS),
            ],
        );
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        for name in [DCTERMS::created(), DCTERMS::modified()] {
            let node = doc.add_child(
                root,
                XmlNodeData::element_with_attrs(
                    name,
                    vec![XAttribute::new(XSI::r#type(), "dcterms:W3CDTF")],
                ),
            );
            doc.add_child(node, XmlNodeData::text(&now));
        }

        let name = self.add_xml_part(PartKind::CoreProperties, &doc)?;
        self.add_relationship(PACKAGE_URI, &name, rt::CORE_PROPERTIES)?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_presentation_round_trips() {
        let pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let saved = pkg.save().unwrap();
        let loaded = OoxmlPackage::open(&saved).unwrap();

        assert_eq!(loaded.document_type(), DocumentType::PowerPoint);
        assert_eq!(loaded.main_part_name(), "/ppt/presentation.xml");
        assert_eq!(
            loaded.content_type("/ppt/presentation.xml"),
            Some(ct::POWERPOINT_PRESENTATION)
        );
        let doc = loaded.xml_part("/ppt/presentation.xml").unwrap();
        let root = doc.root().unwrap();
        assert!(doc
            .child_element(root, &crate::xml::namespaces::P::notesSz())
            .is_some());
    }

    #[test]
    fn empty_packages_of_other_kinds_open_as_their_kind() {
        for kind in [DocumentType::Word, DocumentType::Excel] {
            let saved = OoxmlPackage::create_empty(kind).unwrap().save().unwrap();
            let loaded = OoxmlPackage::open(&saved).unwrap();
            assert_eq!(loaded.document_type(), kind);
            assert_eq!(loaded.main_part_name(), kind.main_part_name());
        }
    }

    #[test]
    fn removed_relationship_no_longer_resolves() {
        let mut pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let main = pkg.main_part_name().to_string();
        let image = pkg.add_part(PartKind::Image, "image/png", vec![0]);
        let id = pkg.add_relationship(&main, &image, rt::IMAGE).unwrap();

        let removed = pkg.remove_relationship(&main, &id).unwrap();
        assert_eq!(removed.target, image);
        assert!(!pkg.has_relationship(&main, &id));
    }

    #[test]
    fn open_rejects_non_zip_bytes() {
        let err = OoxmlPackage::open(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, SlidekitError::InvalidPackage { .. }));
    }

    #[test]
    fn add_part_uses_folder_convention() {
        let mut pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let first = pkg.add_part(PartKind::Image, "image/png", vec![1, 2, 3]);
        let second = pkg.add_part(PartKind::Image, "image/jpeg", vec![4, 5, 6]);
        assert_eq!(first, "/ppt/media/image1.png");
        assert_eq!(second, "/ppt/media/image2.jpeg");

        let props = pkg.add_part(PartKind::PresentationProperties, ct::PRESENTATION_PROPERTIES, Vec::new());
        assert_eq!(props, "/ppt/presProps.xml");
    }

    #[test]
    fn relationship_helpers_agree() {
        let mut pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let main = pkg.main_part_name().to_string();
        let image = pkg.add_part(PartKind::Image, "image/png", vec![0]);

        let id = pkg.get_or_create_id_of_part(&main, &image, rt::IMAGE).unwrap();
        let again = pkg.get_or_create_id_of_part(&main, &image, rt::IMAGE).unwrap();
        assert_eq!(id, again);
        assert!(pkg.has_relationship(&main, &id));
        assert_eq!(pkg.part_by_id(&main, &id), Some(image.as_str()));
        assert_eq!(pkg.id_of_part(&main, &image), Some(id.as_str()));

        let err = pkg
            .add_relationship_with_id(&main, &id, &image, rt::IMAGE)
            .unwrap_err();
        assert!(matches!(err, SlidekitError::DuplicateRelationshipId { .. }));

        let link = pkg
            .add_external_relationship(&main, "https://example.com/", rt::HYPERLINK)
            .unwrap();
        assert_eq!(pkg.part_by_id(&main, &link), None);
        assert!(pkg.relationship(&main, &link).unwrap().is_external());
    }

    #[test]
    fn set_title_creates_core_properties() {
        let mut pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        assert_eq!(pkg.title(), None);

        pkg.set_title("Quarterly review").unwrap();
        pkg.set_title("Quarterly review, final").unwrap();

        let loaded = OoxmlPackage::open(&pkg.save().unwrap()).unwrap();
        assert_eq!(loaded.title().as_deref(), Some("Quarterly review, final"));
        assert_eq!(loaded.parts_with_content_type(ct::CORE_PROPERTIES).len(), 1);
    }

    #[test]
    fn delete_part_drops_incoming_relationships() {
        let mut pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let main = pkg.main_part_name().to_string();
        let image = pkg.add_part(PartKind::Image, "image/png", vec![0]);
        pkg.add_relationship(&main, &image, rt::IMAGE).unwrap();

        pkg.delete_part(&image);
        assert!(!pkg.contains_part(&image));
        assert!(pkg.id_of_part(&main, &image).is_none());
    }
}
