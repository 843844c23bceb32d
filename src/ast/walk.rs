//! Tree-walking engine
//!
//! Pre-order traversal over a node tree. The visitor receives each node
//! together with its direct parent (`None` at the walk's root) and may
//! replace the visited node by returning a substitute; traversal then
//! descends into the substitute. Both the parent linker and the conversion
//! annotation pass are built on this walk.

use std::rc::Rc;

use super::NodeRef;

/// Walks `root` pre-order. Returns the (possibly replaced) root.
pub fn walk<F>(root: &NodeRef, visit: &mut F) -> NodeRef
where
    F: FnMut(&NodeRef, Option<&NodeRef>) -> Option<NodeRef>,
{
    let current = match visit(root, None) {
        Some(replacement) => replacement,
        None => Rc::clone(root),
    };
    walk_children(&current, visit);
    current
}

fn walk_children<F>(parent: &NodeRef, visit: &mut F)
where
    F: FnMut(&NodeRef, Option<&NodeRef>) -> Option<NodeRef>,
{
    let mut index = 0;
    loop {
        // Child handles are re-read each step so a visitor that rewrites
        // sibling structure stays coherent with the traversal.
        let child = {
            let node = parent.borrow();
            match node.children().get(index) {
                Some(child) => Rc::clone(child),
                None => break,
            }
        };
        let child = match visit(&child, Some(parent)) {
            Some(replacement) => {
                parent
                    .borrow_mut()
                    .replace_child(index, Rc::clone(&replacement));
                replacement
            }
            None => child,
        };
        walk_children(&child, visit);
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{factory, LiteralValue, NodeKind};

    fn name_of(node: &NodeRef) -> Option<String> {
        match &node.borrow().kind {
            NodeKind::Identifier { name } => Some(name.clone()),
            _ => None,
        }
    }

    #[test]
    fn visits_in_preorder_with_parents() {
        let tree = factory::expression_statement(factory::binary_expression(
            crate::ast::BinaryOperator::Add,
            factory::identifier("a"),
            factory::identifier("b"),
        ));

        let mut seen = Vec::new();
        walk(&tree, &mut |node, parent| {
            let tag = match &node.borrow().kind {
                NodeKind::ExpressionStatement { .. } => "stmt",
                NodeKind::BinaryExpression { .. } => "binary",
                NodeKind::Identifier { .. } => "ident",
                _ => "other",
            };
            seen.push((tag, parent.is_some()));
            None
        });

        assert_eq!(
            seen,
            vec![
                ("stmt", false),
                ("binary", true),
                ("ident", true),
                ("ident", true)
            ]
        );
    }

    #[test]
    fn replacement_rewrites_parent_slot_and_descends() {
        let tree = factory::expression_statement(factory::identifier("old"));

        walk(&tree, &mut |node, _| {
            if name_of(node).as_deref() == Some("old") {
                Some(factory::call_expression(
                    factory::identifier("wrapped"),
                    vec![factory::literal(LiteralValue::Number(1.0))],
                ))
            } else {
                None
            }
        });

        match &tree.borrow().kind {
            NodeKind::ExpressionStatement { expression } => {
                assert!(matches!(
                    expression.borrow().kind,
                    NodeKind::CallExpression { .. }
                ));
            }
            other => panic!("expected expression statement, got {:?}", other),
        };
    }

    #[test]
    fn root_replacement_is_returned() {
        let root = factory::identifier("a");
        let replaced = walk(&root, &mut |node, parent| {
            if parent.is_none() && name_of(node).is_some() {
                Some(factory::identifier("b"))
            } else {
                None
            }
        });
        assert_eq!(name_of(&replaced).as_deref(), Some("b"));
    }
}
