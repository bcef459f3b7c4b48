//! Comparable signatures for slide masters and slide layouts.
//!
//! Relationship ids differ between packages even when the content is the
//! same, so every reference attribute is replaced by the identity of what it
//! points at before the tree is serialized.

use super::copy::is_reference_attribute;
use crate::error::Result;
use crate::hash::{fingerprint, fingerprint_xml};
use crate::package::relationship_types as rt;
use crate::package::OoxmlPackage;
use crate::xml::builder::serialize_subtree;
use crate::xml::namespaces::P;
use crate::xml::{XName, XmlDocument};

/// Default `type` of a layout that does not declare one.
const CUSTOM_LAYOUT_TYPE: &str = "cust";

/// Signature of the master `part` of `package`, computed over `doc`, which
/// must already be scaled to the destination slide size.
pub fn master_signature(package: &OoxmlPackage, part: &str, doc: &XmlDocument) -> Result<String> {
    let theme = package
        .related_part(part, rt::THEME)
        .and_then(|theme| package.part_bytes(theme))
        .map(fingerprint_xml)
        .unwrap_or_else(|| "none".to_string());
    let body = normalized_tree(package, part, doc, &[P::cSld(), P::txStyles()])?;
    Ok(format!("theme:{}\n{}", theme, body))
}

/// Signature of the layout `part`, computed over its scaled `doc`.
pub fn layout_signature(package: &OoxmlPackage, part: &str, doc: &XmlDocument) -> Result<String> {
    let layout_type = doc
        .root()
        .and_then(|root| doc.attribute(root, &XName::local("type")))
        .unwrap_or(CUSTOM_LAYOUT_TYPE)
        .to_string();
    let body = normalized_tree(package, part, doc, &[P::cSld()])?;
    Ok(format!("type:{}\n{}", layout_type, body))
}

fn normalized_tree(
    package: &OoxmlPackage,
    part: &str,
    doc: &XmlDocument,
    children: &[XName],
) -> Result<String> {
    let (mut normalized, root) = XmlDocument::with_root(XName::local("signature"), &[]);
    if let Some(source_root) = doc.root() {
        for name in children {
            if let Some(node) = doc.child_element(source_root, name) {
                normalized.import_subtree(doc, node, Some(root));
            }
        }
    }

    let nodes: Vec<_> = normalized.descendants(root).collect();
    for node in nodes {
        let references: Vec<(XName, String)> = normalized
            .get(node)
            .and_then(|d| d.attributes())
            .map(|attrs| {
                attrs
                    .iter()
                    .filter(|a| is_reference_attribute(&a.name) && !a.value.is_empty())
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        for (name, id) in references {
            normalized.set_attribute(node, &name, &target_identity(package, part, &id));
        }
    }

    serialize_subtree(&normalized, root)
}

/// What a relationship id stands for, independent of the id itself: the
/// type plus a fingerprint for binary targets, the type alone for XML
/// targets, the URI for external ones.
fn target_identity(package: &OoxmlPackage, part: &str, id: &str) -> String {
    let Some(rel) = package.relationship(part, id) else {
        return "missing".to_string();
    };
    if rel.is_external() {
        return format!("ext:{}", rel.target);
    }
    let is_xml = package
        .part(&rel.target)
        .map(|p| p.is_xml())
        .unwrap_or(false);
    match package.part_bytes(&rel.target) {
        Some(bytes) if !is_xml => format!("{}:{}", rel.rel_type, fingerprint(bytes)),
        _ => rel.rel_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::content_types::content_type_values as ct;
    use crate::package::PartKind;
    use crate::types::DocumentType;
    use crate::xml::parser::parse;

    const MASTER: &str = r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgPr><a:blipFill><a:blip r:embed="ID"/></a:blipFill></p:bgPr></p:bg><p:spTree/></p:cSld><p:txStyles/></p:sldMaster>"#;

    fn package_with_master(image: &[u8], filler_rels: usize) -> (OoxmlPackage, String, XmlDocument) {
        let mut pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let master = pkg.add_part(PartKind::SlideMaster, ct::SLIDE_MASTER, Vec::new());
        for _ in 0..filler_rels {
            pkg.add_external_relationship(&master, "https://example.com", rt::HYPERLINK)
                .unwrap();
        }
        let png = pkg.add_part(PartKind::Image, "image/png", image.to_vec());
        let id = pkg.add_relationship(&master, &png, rt::IMAGE).unwrap();
        let doc = parse(&MASTER.replace("ID", &id)).unwrap();
        (pkg, master, doc)
    }

    #[test]
    fn relationship_ids_do_not_affect_signature() {
        let (a_pkg, a_master, a_doc) = package_with_master(b"same", 0);
        let (b_pkg, b_master, b_doc) = package_with_master(b"same", 3);

        assert_eq!(
            master_signature(&a_pkg, &a_master, &a_doc).unwrap(),
            master_signature(&b_pkg, &b_master, &b_doc).unwrap()
        );
    }

    #[test]
    fn different_image_bytes_change_signature() {
        let (a_pkg, a_master, a_doc) = package_with_master(b"one", 0);
        let (b_pkg, b_master, b_doc) = package_with_master(b"two", 0);

        assert_ne!(
            master_signature(&a_pkg, &a_master, &a_doc).unwrap(),
            master_signature(&b_pkg, &b_master, &b_doc).unwrap()
        );
    }

    #[test]
    fn empty_action_link_is_not_a_missing_reference() {
        let pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let layout = |id: &str| {
            parse(&format!(
                r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Action Button: Home"><a:hlinkClick r:id="{}" action="ppaction://hlinkshowjump?jump=firstslide"/></p:cNvPr></p:nvSpPr></p:sp></p:spTree></p:cSld></p:sldLayout>"#,
                id
            ))
            .unwrap()
        };
        let name = "/ppt/slideLayouts/slideLayout1.xml";

        let empty = layout_signature(&pkg, name, &layout("")).unwrap();
        let dangling = layout_signature(&pkg, name, &layout("rId42")).unwrap();
        assert!(!empty.contains("missing"));
        assert!(dangling.contains("missing"));
    }

    #[test]
    fn layout_type_defaults_to_custom() {
        let pkg = OoxmlPackage::create_empty(DocumentType::PowerPoint).unwrap();
        let doc = parse(r#"<p:sldLayout xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld name="Blank"/></p:sldLayout>"#).unwrap();
        let sig = layout_signature(&pkg, "/ppt/slideLayouts/slideLayout1.xml", &doc).unwrap();
        assert!(sig.starts_with("type:cust\n"));
        assert!(sig.contains("Blank"));
    }
}
