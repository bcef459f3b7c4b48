use super::xname::{XAttribute, XName};

#[derive(Clone, Debug)]
pub enum XmlNodeData {
    Element {
        name: XName,
        attributes: Vec<XAttribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl XmlNodeData {
    pub fn element(name: XName) -> Self {
        Self::Element {
            name,
            attributes: Vec::new(),
        }
    }

    pub fn element_with_attrs(name: XName, attributes: Vec<XAttribute>) -> Self {
        Self::Element { name, attributes }
    }

    pub fn text(content: &str) -> Self {
        Self::Text(content.to_string())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn name(&self) -> Option<&XName> {
        match self {
            Self::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&[XAttribute]> {
        match self {
            Self::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Vec<XAttribute>> {
        match self {
            Self::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &XName) -> Option<&str> {
        self.attributes()?
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn text_content(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::CData(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_node_creation() {
        let name = XName::new("http://example.com", "test");
        let node = XmlNodeData::element(name.clone());
        assert!(node.is_element());
        assert_eq!(node.name(), Some(&name));
    }

    #[test]
    fn attribute_lookup_by_name() {
        let node = XmlNodeData::element_with_attrs(
            XName::local("sldId"),
            vec![XAttribute::new(XName::local("id"), "256")],
        );
        assert_eq!(node.attribute(&XName::local("id")), Some("256"));
        assert_eq!(node.attribute(&XName::local("missing")), None);
    }
}
