use crate::xml::arena::XmlDocument;
use crate::xml::namespaces::{A, MC};
use crate::xml::node::XmlNodeData;
use indextree::NodeId;

/// Document-order walk from `node` that does not descend into nodes matching
/// `trim` (the matching node itself is skipped too).
pub fn descendants_trimmed<'a, F>(
    doc: &'a XmlDocument,
    node: NodeId,
    trim: F,
) -> impl Iterator<Item = NodeId> + 'a
where
    F: Fn(&XmlNodeData) -> bool + 'a,
{
    let mut stack = vec![node];
    std::iter::from_fn(move || {
        while let Some(current) = stack.pop() {
            let Some(data) = doc.get(current) else {
                continue;
            };
            if trim(data) {
                continue;
            }
            let children: Vec<_> = doc.children(current).collect();
            stack.extend(children.into_iter().rev());
            return Some(current);
        }
        None
    })
}

/// Text of every `a:p` under `node`, one entry per paragraph. Markup
/// compatibility fallbacks are skipped so alternate content is read once.
pub fn paragraph_texts(doc: &XmlDocument, node: NodeId) -> Vec<String> {
    let fallback = MC::Fallback();
    let paragraph = A::p();
    let run_text = A::t();

    descendants_trimmed(doc, node, move |d| d.name() == Some(&fallback))
        .filter(|&n| doc.is_named(n, &paragraph))
        .map(|p| {
            doc.descendants(p)
                .filter(|&n| doc.is_named(n, &run_text))
                .map(|t| doc.text(t))
                .collect::<String>()
        })
        .collect()
}
