//! Depth-first traversal with node paths
//!
//! Paths look like `constellation/nameEntry[0]/contributor[1]`: the index
//! counts siblings of the same kind under the same parent.

use snac_model::{DataType, GraphNode};
use std::collections::HashMap;

/// Children of `node` paired with their paths
pub(crate) fn labelled_children<'a>(
    node: &'a dyn GraphNode,
    path: &str,
) -> Vec<(&'a dyn GraphNode, String)> {
    let mut seen: HashMap<DataType, usize> = HashMap::new();
    node.children()
        .into_iter()
        .map(|child| {
            let slot = seen.entry(child.data_type()).or_insert(0);
            let child_path = format!("{path}/{}[{slot}]", child.data_type().tag());
            *slot += 1;
            (child, child_path)
        })
        .collect()
}

/// Path of the root node
pub(crate) fn root_path(root: &dyn GraphNode) -> String {
    root.data_type().tag().to_string()
}

/// Visit every node, root first, in document order
pub(crate) fn for_each_node(root: &dyn GraphNode, f: &mut dyn FnMut(&str, &dyn GraphNode)) {
    fn go(node: &dyn GraphNode, path: &str, f: &mut dyn FnMut(&str, &dyn GraphNode)) {
        f(path, node);
        for (child, child_path) in labelled_children(node, path) {
            go(child, &child_path, f);
        }
    }
    go(root, &root_path(root), f);
}
