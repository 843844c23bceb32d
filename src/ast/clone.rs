//! Tree cloner
//!
//! Deep copy of an arbitrary node or subtree. The parent back-reference
//! forms a cycle in the node graph, so copying is two-phase: rebuild every
//! owned field while dropping parent links, then run a single parent-linker
//! pass over the copy's root. A copy that followed parents instead would
//! never terminate.

use std::cell::RefCell;
use std::rc::Rc;

use super::{parentize, Node, NodeKind, NodeRef};

/// Produces a deep, independent copy of `node`. The result is deep-equal to
/// the source under parent-ignoring equality, every node identity is fresh,
/// and every parent link reflects the copy's own structure (self-referencing
/// at the copy's root).
pub fn clone_tree(node: &NodeRef) -> NodeRef {
    let copy = clone_detached(node);
    parentize(&copy);
    copy
}

fn clone_detached(node: &NodeRef) -> NodeRef {
    let source = node.borrow();
    let kind = match &source.kind {
        NodeKind::Program { body } => NodeKind::Program {
            body: clone_each(body),
        },
        NodeKind::ArrayExpression { elements } => NodeKind::ArrayExpression {
            elements: clone_each(elements),
        },
        NodeKind::ObjectExpression { properties } => NodeKind::ObjectExpression {
            properties: clone_each(properties),
        },
        NodeKind::CallExpression { callee, arguments } => NodeKind::CallExpression {
            callee: clone_detached(callee),
            arguments: clone_each(arguments),
        },
        NodeKind::MemberExpression {
            object,
            property,
            computed,
        } => NodeKind::MemberExpression {
            object: clone_detached(object),
            property: clone_detached(property),
            computed: *computed,
        },
        NodeKind::BinaryExpression {
            operator,
            left,
            right,
        } => NodeKind::BinaryExpression {
            operator: *operator,
            left: clone_detached(left),
            right: clone_detached(right),
        },
        NodeKind::LogicalExpression {
            operator,
            left,
            right,
        } => NodeKind::LogicalExpression {
            operator: *operator,
            left: clone_detached(left),
            right: clone_detached(right),
        },
        NodeKind::UnaryExpression { operator, argument } => NodeKind::UnaryExpression {
            operator: *operator,
            argument: clone_detached(argument),
        },
        NodeKind::UpdateExpression {
            operator,
            argument,
            prefix,
        } => NodeKind::UpdateExpression {
            operator: *operator,
            argument: clone_detached(argument),
            prefix: *prefix,
        },
        NodeKind::AssignmentExpression {
            operator,
            left,
            right,
        } => NodeKind::AssignmentExpression {
            operator: *operator,
            left: clone_detached(left),
            right: clone_detached(right),
        },
        NodeKind::Identifier { name } => NodeKind::Identifier { name: name.clone() },
        NodeKind::Literal {
            value,
            raw,
            verbatim,
        } => NodeKind::Literal {
            value: value.clone(),
            raw: raw.clone(),
            verbatim: verbatim.clone(),
        },
        NodeKind::FunctionExpression { id, params, body } => NodeKind::FunctionExpression {
            id: clone_optional(id),
            params: clone_each(params),
            body: clone_detached(body),
        },
        NodeKind::BlockStatement { body } => NodeKind::BlockStatement {
            body: clone_each(body),
        },
        NodeKind::ExpressionStatement { expression } => NodeKind::ExpressionStatement {
            expression: clone_detached(expression),
        },
        NodeKind::IfStatement {
            test,
            consequent,
            alternate,
        } => NodeKind::IfStatement {
            test: clone_detached(test),
            consequent: clone_detached(consequent),
            alternate: clone_optional(alternate),
        },
        NodeKind::WhileStatement { test, body } => NodeKind::WhileStatement {
            test: clone_detached(test),
            body: clone_detached(body),
        },
        NodeKind::SwitchStatement {
            discriminant,
            cases,
        } => NodeKind::SwitchStatement {
            discriminant: clone_detached(discriminant),
            cases: clone_each(cases),
        },
        NodeKind::SwitchCase { test, consequent } => NodeKind::SwitchCase {
            test: clone_optional(test),
            consequent: clone_each(consequent),
        },
        NodeKind::ReturnStatement { argument } => NodeKind::ReturnStatement {
            argument: clone_optional(argument),
        },
        NodeKind::BreakStatement => NodeKind::BreakStatement,
        NodeKind::ContinueStatement => NodeKind::ContinueStatement,
        NodeKind::VariableDeclaration { declarations, kind } => NodeKind::VariableDeclaration {
            declarations: clone_each(declarations),
            kind: *kind,
        },
        NodeKind::VariableDeclarator { id, init } => NodeKind::VariableDeclarator {
            id: clone_detached(id),
            init: clone_optional(init),
        },
        NodeKind::FunctionDeclaration { id, params, body } => NodeKind::FunctionDeclaration {
            id: clone_detached(id),
            params: clone_each(params),
            body: clone_detached(body),
        },
        NodeKind::MethodDefinition {
            key,
            value,
            kind,
            computed,
            is_static,
        } => NodeKind::MethodDefinition {
            key: clone_detached(key),
            value: clone_detached(value),
            kind: *kind,
            computed: *computed,
            is_static: *is_static,
        },
        NodeKind::Property {
            key,
            value,
            kind,
            computed,
        } => NodeKind::Property {
            key: clone_detached(key),
            value: clone_detached(value),
            kind: *kind,
            computed: *computed,
        },
    };

    let mut fresh = Node::new(kind);
    fresh.metadata = source.metadata;
    Rc::new(RefCell::new(fresh))
}

fn clone_each(nodes: &[NodeRef]) -> Vec<NodeRef> {
    nodes.iter().map(clone_detached).collect()
}

fn clone_optional(node: &Option<NodeRef>) -> Option<NodeRef> {
    node.as_ref().map(clone_detached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{factory, is_root, BinaryOperator, LiteralValue};

    fn sample_tree() -> NodeRef {
        factory::if_statement(
            factory::binary_expression(
                BinaryOperator::Less,
                factory::identifier("i"),
                factory::literal_with_raw(LiteralValue::Number(31.0), "0x1F"),
            ),
            factory::block_statement(vec![factory::expression_statement(
                factory::update_expression(
                    crate::ast::UpdateOperator::Increment,
                    factory::identifier("i"),
                    false,
                ),
            )]),
            None,
        )
    }

    #[test]
    fn clone_is_deep_equal_but_distinct() {
        let original = sample_tree();
        parentize(&original);
        let copy = clone_tree(&original);

        assert_eq!(*original.borrow(), *copy.borrow());
        assert!(!Rc::ptr_eq(&original, &copy));

        // No node identity is shared at any depth.
        let orig_child = &original.borrow().children()[0];
        let copy_child = &copy.borrow().children()[0];
        assert!(!Rc::ptr_eq(orig_child, copy_child));
    }

    #[test]
    fn clone_parents_are_rooted_in_the_clone() {
        let original = sample_tree();
        parentize(&original);
        let copy = clone_tree(&original);

        assert!(is_root(&copy));
        let copy_test = Rc::clone(&copy.borrow().children()[0]);
        let linked_parent = copy_test.borrow().parent().expect("clone is linked");
        assert!(Rc::ptr_eq(&linked_parent, &copy));
    }

    #[test]
    fn mutating_the_clone_leaves_the_original_untouched() {
        let original = sample_tree();
        parentize(&original);
        let copy = clone_tree(&original);

        copy.borrow_mut()
            .replace_child(0, factory::identifier("changed"));
        assert_ne!(*original.borrow(), *copy.borrow());
    }

    #[test]
    fn metadata_survives_cloning() {
        let original = sample_tree();
        original.borrow_mut().metadata.ignored_node = true;
        let copy = clone_tree(&original);
        assert!(copy.borrow().metadata.ignored_node);
    }
}
