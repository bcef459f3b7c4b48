use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use indextree::{Arena, NodeId};
use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct XmlDocument {
    arena: Arena<XmlNodeData>,
    root: Option<NodeId>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Document whose root is an element carrying the given prefix
    /// declarations.
    pub fn with_root(name: XName, namespaces: &[(&str, &str)]) -> (Self, NodeId) {
        let mut doc = Self::new();
        let attrs = namespaces
            .iter()
            .map(|(prefix, uri)| namespace_declaration(prefix, uri))
            .collect();
        let root = doc.add_root(XmlNodeData::element_with_attrs(name, attrs));
        (doc, root)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlNodeData> {
        self.arena.get(id).map(|node| node.get())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut XmlNodeData> {
        self.arena.get_mut(id).map(|node| node.get_mut())
    }

    pub fn name(&self, id: NodeId) -> Option<&XName> {
        self.get(id).and_then(|d| d.name())
    }

    pub fn is_named(&self, id: NodeId, name: &XName) -> bool {
        self.name(id) == Some(name)
    }

    pub fn add_root(&mut self, data: XmlNodeData) -> NodeId {
        let id = self.arena.new_node(data);
        self.root = Some(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    /// Removes a node together with all of its descendants.
    pub fn remove(&mut self, node: NodeId) {
        node.remove_subtree(&mut self.arena);
    }

    pub fn remove_children(&mut self, node: NodeId) {
        let children: Vec<_> = self.children(node).collect();
        for child in children {
            self.remove(child);
        }
    }

    /// Stable reorder of the children of `parent` by `key`.
    pub fn sort_children_by_key<K, F>(&mut self, parent: NodeId, mut key: F)
    where
        K: Ord,
        F: FnMut(&XmlNodeData) -> K,
    {
        let ids: Vec<NodeId> = self.children(parent).collect();
        let mut keyed: Vec<(K, NodeId)> = ids
            .into_iter()
            .filter_map(|c| self.get(c).map(|d| (key(d), c)))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, child) in keyed {
            child.detach(&mut self.arena);
            parent.append(child, &mut self.arena);
        }
    }

    pub fn attribute(&self, node: NodeId, name: &XName) -> Option<&str> {
        self.get(node)?.attribute(name)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &XName, value: &str) {
        if let Some(node_data) = self.get_mut(node) {
            if let Some(attrs) = node_data.attributes_mut() {
                if let Some(attr) = attrs.iter_mut().find(|a| &a.name == name) {
                    attr.value = value.to_string();
                } else {
                    attrs.push(XAttribute::new(name.clone(), value));
                }
            }
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &XName) {
        if let Some(node_data) = self.get_mut(node) {
            if let Some(attrs) = node_data.attributes_mut() {
                attrs.retain(|a| &a.name != name);
            }
        }
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        parent.children(&self.arena)
    }

    /// Element children only.
    pub fn elements(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent)
            .filter(move |&c| self.get(c).map(|d| d.is_element()).unwrap_or(false))
    }

    /// Includes `node` itself, document order.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    pub fn descendants_named(&self, node: NodeId, name: &XName) -> Vec<NodeId> {
        self.descendants(node)
            .filter(|&n| self.is_named(n, name))
            .collect()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena)
    }

    pub fn elements_by_name<'a>(
        &'a self,
        parent: NodeId,
        name: &'a XName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent).filter(move |&child_id| {
            self.get(child_id)
                .and_then(|data| data.name())
                .map(|n| n == name)
                .unwrap_or(false)
        })
    }

    pub fn child_element(&self, parent: NodeId, name: &XName) -> Option<NodeId> {
        self.elements_by_name(parent, name).next()
    }

    /// Follows a path of child element names from `start`.
    pub fn find_path(&self, start: NodeId, path: &[XName]) -> Option<NodeId> {
        path.iter()
            .try_fold(start, |node, name| self.child_element(node, name))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|n| self.get(n).and_then(|d| d.text_content()))
            .collect()
    }

    /// Copies the subtree rooted at `source_node` of `source` under
    /// `parent` (or as the root when `parent` is `None`). Namespace
    /// declarations inherited from ancestors in `source` are re-declared on
    /// the copied element so prefixes stay resolvable.
    pub fn import_subtree(
        &mut self,
        source: &XmlDocument,
        source_node: NodeId,
        parent: Option<NodeId>,
    ) -> Option<NodeId> {
        let mut data = source.get(source_node)?.clone();
        if let Some(attrs) = data.attributes_mut() {
            let mut declared: HashSet<XName> = attrs
                .iter()
                .filter(|a| a.is_namespace_declaration())
                .map(|a| a.name.clone())
                .collect();
            for ancestor in source.ancestors(source_node).skip(1) {
                let Some(ancestor_attrs) = source.get(ancestor).and_then(|d| d.attributes()) else {
                    continue;
                };
                for attr in ancestor_attrs {
                    if attr.is_namespace_declaration() && declared.insert(attr.name.clone()) {
                        attrs.push(attr.clone());
                    }
                }
            }
        }

        let new_root = match parent {
            Some(p) => self.add_child(p, data),
            None => self.add_root(data),
        };

        let mut stack: Vec<(NodeId, NodeId)> = source
            .children(source_node)
            .map(|c| (c, new_root))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        while let Some((src, dest_parent)) = stack.pop() {
            let Some(node_data) = source.get(src) else {
                continue;
            };
            let copied = self.add_child(dest_parent, node_data.clone());
            let children: Vec<_> = source.children(src).collect();
            for child in children.into_iter().rev() {
                stack.push((child, copied));
            }
        }
        Some(new_root)
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

pub fn namespace_declaration(prefix: &str, uri: &str) -> XAttribute {
    if prefix.is_empty() {
        XAttribute::new(XName::local("xmlns"), uri)
    } else {
        XAttribute::new(XName::new(super::namespaces::XMLNS, prefix), uri)
    }
}
