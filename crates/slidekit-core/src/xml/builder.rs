use super::arena::XmlDocument;
use super::namespaces::{XML, XMLNS};
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use crate::error::{Result, SlidekitError};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Cursor;

pub fn serialize(doc: &XmlDocument) -> Result<String> {
    let bytes = serialize_bytes(doc)?;
    String::from_utf8(bytes).map_err(|e| SlidekitError::XmlWrite(e.to_string()))
}

/// Serialize a subtree (no XML declaration). Namespace declarations from
/// ancestors are repeated on the subtree root.
pub fn serialize_subtree(doc: &XmlDocument, node_id: indextree::NodeId) -> Result<String> {
    let mut scratch = XmlDocument::new();
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    if let Some(root) = scratch.import_subtree(doc, node_id, None) {
        write_node(&scratch, root, &mut writer, &NamespaceMap::new())?;
    }
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| SlidekitError::XmlWrite(e.to_string()))
}

pub fn serialize_bytes(doc: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(write_error)?;
    writer
        .write_event(Event::Text(BytesText::from_escaped("\r\n")))
        .map_err(write_error)?;

    if let Some(root_id) = doc.root() {
        write_node(doc, root_id, &mut writer, &NamespaceMap::new())?;
    }

    Ok(writer.into_inner().into_inner())
}

/// Namespace URI to prefix, for the current element scope.
type NamespaceMap = HashMap<String, String>;

fn write_error(e: impl std::fmt::Display) -> SlidekitError {
    SlidekitError::XmlWrite(e.to_string())
}

fn extend_namespace_map(namespace_map: &mut NamespaceMap, attributes: &[XAttribute]) {
    for attr in attributes {
        if !attr.is_namespace_declaration() {
            continue;
        }
        let prefix = if attr.name.namespace.is_none() {
            String::new()
        } else {
            attr.name.local_name.clone()
        };
        // A redeclared prefix shadows any older binding of the same prefix.
        namespace_map.retain(|_, p| *p != prefix);
        namespace_map.insert(attr.value.clone(), prefix);
    }
}

/// Resolves a prefix for `namespace`, declaring one on the element being
/// written when nothing in scope binds it.
fn resolve_prefix(
    namespace: &str,
    for_attribute: bool,
    scoped: &mut NamespaceMap,
    extra_declarations: &mut Vec<XAttribute>,
) -> String {
    if namespace == XML {
        return "xml".to_string();
    }
    if namespace == XMLNS {
        return "xmlns".to_string();
    }
    if let Some(prefix) = scoped.get(namespace) {
        // Unprefixed attributes never take the default namespace.
        if !(for_attribute && prefix.is_empty()) {
            return prefix.clone();
        }
    }

    let preferred = get_prefix(namespace);
    let mut candidate = preferred.to_string();
    let mut counter = 0;
    while scoped.values().any(|p| *p == candidate) {
        candidate = format!("{}{}", preferred, counter);
        counter += 1;
    }
    scoped.insert(namespace.to_string(), candidate.clone());
    extra_declarations.push(XAttribute::new(XName::new(XMLNS, &candidate), namespace));
    candidate
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn write_node<W: std::io::Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let Some(node_data) = doc.get(node_id) else {
        return Ok(());
    };

    match node_data {
        XmlNodeData::Element { name, attributes } => {
            write_element(doc, node_id, name, attributes, writer, namespace_map)?;
        }
        XmlNodeData::Text(text) => {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?;
        }
        XmlNodeData::CData(text) => {
            writer
                .write_event(Event::CData(BytesCData::new(text)))
                .map_err(write_error)?;
        }
        XmlNodeData::Comment(text) => {
            writer
                .write_event(Event::Comment(BytesText::new(text)))
                .map_err(write_error)?;
        }
        XmlNodeData::ProcessingInstruction { target, data } => {
            let pi_content = if data.is_empty() {
                target.clone()
            } else {
                format!("{} {}", target, data)
            };
            writer
                .write_event(Event::PI(BytesPI::new(&pi_content)))
                .map_err(write_error)?;
        }
    }

    Ok(())
}

fn write_element<W: std::io::Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    name: &XName,
    attributes: &[XAttribute],
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let mut scoped_map = namespace_map.clone();
    extend_namespace_map(&mut scoped_map, attributes);
    let mut extra_declarations = Vec::new();

    let tag_name = match &name.namespace {
        Some(ns) => {
            let prefix = resolve_prefix(ns, false, &mut scoped_map, &mut extra_declarations);
            qualified(&prefix, &name.local_name)
        }
        None => name.local_name.clone(),
    };

    let mut rendered: Vec<(String, &str)> = Vec::with_capacity(attributes.len());
    for attr in attributes {
        let attr_name = if attr.is_namespace_declaration() {
            match attr.name.namespace {
                None => "xmlns".to_string(),
                Some(_) => format!("xmlns:{}", attr.name.local_name),
            }
        } else {
            match &attr.name.namespace {
                Some(ns) => {
                    let prefix = resolve_prefix(ns, true, &mut scoped_map, &mut extra_declarations);
                    qualified(&prefix, &attr.name.local_name)
                }
                None => attr.name.local_name.clone(),
            }
        };
        rendered.push((attr_name, attr.value.as_str()));
    }

    let mut elem = BytesStart::new(tag_name.as_str());
    for (attr_name, value) in &rendered {
        elem.push_attribute((attr_name.as_str(), *value));
    }
    for decl in &extra_declarations {
        let decl_name = format!("xmlns:{}", decl.name.local_name);
        elem.push_attribute((decl_name.as_str(), decl.value.as_str()));
    }

    let children: Vec<_> = doc.children(node_id).collect();

    if children.is_empty() {
        writer.write_event(Event::Empty(elem)).map_err(write_error)?;
    } else {
        writer.write_event(Event::Start(elem)).map_err(write_error)?;

        for child_id in children {
            write_node(doc, child_id, writer, &scoped_map)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(tag_name.as_str())))
            .map_err(write_error)?;
    }

    Ok(())
}

fn get_prefix(namespace: &str) -> &'static str {
    match namespace {
        // PresentationML
        "http://schemas.openxmlformats.org/presentationml/2006/main" => "p",
        "http://schemas.microsoft.com/office/powerpoint/2010/main" => "p14",
        "http://schemas.microsoft.com/office/powerpoint/2012/main" => "p15",
        "http://schemas.microsoft.com/office/powerpoint/2018/8/main" => "p188",
        // DrawingML
        "http://schemas.openxmlformats.org/drawingml/2006/main" => "a",
        "http://schemas.microsoft.com/office/drawing/2010/main" => "a14",
        "http://schemas.openxmlformats.org/drawingml/2006/picture" => "pic",
        "http://schemas.openxmlformats.org/drawingml/2006/chart" => "c",
        "http://schemas.microsoft.com/office/drawing/2014/chartex" => "cx",
        "http://schemas.openxmlformats.org/drawingml/2006/diagram" => "dgm",
        "http://schemas.microsoft.com/office/drawing/2008/diagram" => "dsp",
        "http://schemas.microsoft.com/office/drawing/2016/SVG/main" => "asvg",
        // VML
        "urn:schemas-microsoft-com:vml" => "v",
        "urn:schemas-microsoft-com:office:office" => "o",
        // Relationships
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships" => "r",
        // Markup Compatibility
        "http://schemas.openxmlformats.org/markup-compatibility/2006" => "mc",
        // Package properties
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties" => "cp",
        "http://purl.org/dc/elements/1.1/" => "dc",
        "http://purl.org/dc/terms/" => "dcterms",
        "http://purl.org/dc/dcmitype/" => "dcmitype",
        "http://www.w3.org/2001/XMLSchema-instance" => "xsi",
        "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" => "ep",
        "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes" => "vt",
        // WordprocessingML and SpreadsheetML, for mixed content
        "http://schemas.openxmlformats.org/wordprocessingml/2006/main" => "w",
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main" => "x",
        _ => "ns",
    }
}
