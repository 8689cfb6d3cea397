//! Shared depth-first pre-order traversal.
//!
//! Every emitter and the validator iterate the tree through these two
//! functions so that node ordering can never diverge between artifacts.

use super::{FieldGroup, FieldNode};

/// Visit `node` and then each child in source order. The callback receives
/// the node and the stack of ancestor nodes, outermost first.
pub fn walk_node<'a>(node: &'a FieldNode, visit: &mut impl FnMut(&'a FieldNode, &[&'a FieldNode])) {
    fn inner<'a>(
        node: &'a FieldNode,
        ancestors: &mut Vec<&'a FieldNode>,
        visit: &mut impl FnMut(&'a FieldNode, &[&'a FieldNode]),
    ) {
        visit(node, ancestors);
        ancestors.push(node);
        for child in &node.children {
            inner(child, ancestors, visit);
        }
        ancestors.pop();
    }
    let mut ancestors = Vec::new();
    inner(node, &mut ancestors, visit);
}

/// Visit every node of a group in depth-first pre-order.
pub fn walk_group<'a>(
    group: &'a FieldGroup,
    visit: &mut impl FnMut(&'a FieldNode, &[&'a FieldNode]),
) {
    for field in &group.fields {
        walk_node(field, visit);
    }
}
