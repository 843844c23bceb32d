//! Parent linker
//!
//! Walks an already-built tree and assigns each node's back-reference to its
//! immediate syntactic parent, the root to itself. In-place and idempotent;
//! nodes are never copied.

use std::rc::Rc;

use super::{walk, NodeRef};

/// Links every node reachable from `root`. After linking, `root`'s parent is
/// `root` itself and every other node's parent is the node that structurally
/// contains it.
pub fn parentize(root: &NodeRef) {
    walk(root, &mut |node, parent| {
        let parent = match parent {
            Some(parent) => Rc::clone(parent),
            None => Rc::clone(node),
        };
        node.borrow_mut().set_parent(&parent);
        None
    });
}
