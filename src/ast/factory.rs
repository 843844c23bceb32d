//! Canonical node factory
//!
//! One constructor per syntax-node kind. Every node leaves here fully
//! annotated: `metadata.ignored_node` is `false` and the parent link is
//! unset, so a tree assembled from factory nodes satisfies the same
//! invariants as parsed output once a linker pass has run over it.
//!
//! Constructors take only the semantically required arguments; optional
//! structural fields default (no `else` branch, declaration kind `var`,
//! non-computed access). Inputs are caller-validated: a malformed
//! combination is a contract violation, not a runtime-checked failure.

use std::cell::RefCell;
use std::rc::Rc;

use super::{
    AssignmentOperator, BinaryOperator, DeclarationKind, LiteralValue, LogicalOperator, MethodKind,
    Node, NodeKind, NodeRef, Precedence, PropertyKind, UnaryOperator, UpdateOperator, Verbatim,
};

fn make(kind: NodeKind) -> NodeRef {
    Rc::new(RefCell::new(Node::new(kind)))
}

// ============================================================================
// PROGRAM
// ============================================================================

pub fn program(body: Vec<NodeRef>) -> NodeRef {
    make(NodeKind::Program { body })
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

pub fn array_expression(elements: Vec<NodeRef>) -> NodeRef {
    make(NodeKind::ArrayExpression { elements })
}

pub fn object_expression(properties: Vec<NodeRef>) -> NodeRef {
    make(NodeKind::ObjectExpression { properties })
}

pub fn call_expression(callee: NodeRef, arguments: Vec<NodeRef>) -> NodeRef {
    make(NodeKind::CallExpression { callee, arguments })
}

/// Dot access: `object.property`.
pub fn member_expression(object: NodeRef, property: NodeRef) -> NodeRef {
    make(NodeKind::MemberExpression {
        object,
        property,
        computed: false,
    })
}

/// Bracket access: `object[property]`.
pub fn computed_member_expression(object: NodeRef, property: NodeRef) -> NodeRef {
    make(NodeKind::MemberExpression {
        object,
        property,
        computed: true,
    })
}

pub fn binary_expression(operator: BinaryOperator, left: NodeRef, right: NodeRef) -> NodeRef {
    make(NodeKind::BinaryExpression {
        operator,
        left,
        right,
    })
}

pub fn logical_expression(operator: LogicalOperator, left: NodeRef, right: NodeRef) -> NodeRef {
    make(NodeKind::LogicalExpression {
        operator,
        left,
        right,
    })
}

pub fn unary_expression(operator: UnaryOperator, argument: NodeRef) -> NodeRef {
    make(NodeKind::UnaryExpression { operator, argument })
}

pub fn update_expression(operator: UpdateOperator, argument: NodeRef, prefix: bool) -> NodeRef {
    make(NodeKind::UpdateExpression {
        operator,
        argument,
        prefix,
    })
}

pub fn assignment_expression(
    operator: AssignmentOperator,
    left: NodeRef,
    right: NodeRef,
) -> NodeRef {
    make(NodeKind::AssignmentExpression {
        operator,
        left,
        right,
    })
}

pub fn identifier(name: impl Into<String>) -> NodeRef {
    make(NodeKind::Identifier { name: name.into() })
}

/// Literal with a default raw rendering derived from the value. The verbatim
/// annotation is always attached at primary precedence, so the generator
/// reproduces this exact text rather than re-deriving it.
pub fn literal(value: LiteralValue) -> NodeRef {
    let raw = value.render();
    literal_with_raw(value, raw)
}

/// Literal with a caller-chosen raw form (e.g. `0x1F` for 31), reproduced
/// byte-for-byte by the code generator.
pub fn literal_with_raw(value: LiteralValue, raw: impl Into<String>) -> NodeRef {
    let raw = raw.into();
    make(NodeKind::Literal {
        value,
        verbatim: Some(Verbatim {
            content: raw.clone(),
            precedence: Precedence::Primary,
        }),
        raw: Some(raw),
    })
}

/// Anonymous unless `id` is supplied.
pub fn function_expression(id: Option<NodeRef>, params: Vec<NodeRef>, body: NodeRef) -> NodeRef {
    make(NodeKind::FunctionExpression { id, params, body })
}

// ============================================================================
// STATEMENTS
// ============================================================================

pub fn block_statement(body: Vec<NodeRef>) -> NodeRef {
    make(NodeKind::BlockStatement { body })
}

pub fn expression_statement(expression: NodeRef) -> NodeRef {
    make(NodeKind::ExpressionStatement { expression })
}

pub fn if_statement(test: NodeRef, consequent: NodeRef, alternate: Option<NodeRef>) -> NodeRef {
    make(NodeKind::IfStatement {
        test,
        consequent,
        alternate,
    })
}

pub fn while_statement(test: NodeRef, body: NodeRef) -> NodeRef {
    make(NodeKind::WhileStatement { test, body })
}

pub fn switch_statement(discriminant: NodeRef, cases: Vec<NodeRef>) -> NodeRef {
    make(NodeKind::SwitchStatement {
        discriminant,
        cases,
    })
}

/// Pass `test: None` for the `default:` clause.
pub fn switch_case(test: Option<NodeRef>, consequent: Vec<NodeRef>) -> NodeRef {
    make(NodeKind::SwitchCase { test, consequent })
}

pub fn return_statement(argument: Option<NodeRef>) -> NodeRef {
    make(NodeKind::ReturnStatement { argument })
}

pub fn break_statement() -> NodeRef {
    make(NodeKind::BreakStatement)
}

pub fn continue_statement() -> NodeRef {
    make(NodeKind::ContinueStatement)
}

// ============================================================================
// DECLARATIONS
// ============================================================================

/// Declaration kind defaults to `var`, the least-scoped form.
pub fn variable_declaration(declarations: Vec<NodeRef>) -> NodeRef {
    variable_declaration_of(DeclarationKind::default(), declarations)
}

pub fn variable_declaration_of(kind: DeclarationKind, declarations: Vec<NodeRef>) -> NodeRef {
    make(NodeKind::VariableDeclaration { declarations, kind })
}

pub fn variable_declarator(id: NodeRef, init: Option<NodeRef>) -> NodeRef {
    make(NodeKind::VariableDeclarator { id, init })
}

pub fn function_declaration(id: NodeRef, params: Vec<NodeRef>, body: NodeRef) -> NodeRef {
    make(NodeKind::FunctionDeclaration { id, params, body })
}

pub fn method_definition(
    key: NodeRef,
    value: NodeRef,
    kind: MethodKind,
    is_static: bool,
) -> NodeRef {
    make(NodeKind::MethodDefinition {
        key,
        value,
        kind,
        computed: false,
        is_static,
    })
}

/// Plain `key: value` property.
pub fn property(key: NodeRef, value: NodeRef) -> NodeRef {
    make(NodeKind::Property {
        key,
        value,
        kind: PropertyKind::Init,
        computed: false,
    })
}

/// Computed-key property: `[key]: value`.
pub fn computed_property(key: NodeRef, value: NodeRef) -> NodeRef {
    make(NodeKind::Property {
        key,
        value,
        kind: PropertyKind::Init,
        computed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_nodes_start_unignored_and_unparented() {
        let nodes = [
            program(vec![]),
            identifier("x"),
            literal(LiteralValue::Boolean(true)),
            break_statement(),
            return_statement(None),
            block_statement(vec![]),
        ];
        for node in &nodes {
            assert!(!node.borrow().metadata.ignored_node);
            assert!(node.borrow().parent().is_none());
        }
    }

    #[test]
    fn literal_attaches_verbatim_at_primary_precedence() {
        let lit = literal(LiteralValue::Number(31.0));
        match &lit.borrow().kind {
            NodeKind::Literal { raw, verbatim, .. } => {
                assert_eq!(raw.as_deref(), Some("31"));
                let verbatim = verbatim.as_ref().expect("factory literal has verbatim");
                assert_eq!(verbatim.content, "31");
                assert_eq!(verbatim.precedence, Precedence::Primary);
            }
            other => panic!("expected literal, got {:?}", other),
        };
    }

    #[test]
    fn literal_with_raw_keeps_caller_text() {
        let lit = literal_with_raw(LiteralValue::Number(31.0), "0x1F");
        match &lit.borrow().kind {
            NodeKind::Literal { value, verbatim, .. } => {
                assert_eq!(*value, LiteralValue::Number(31.0));
                assert_eq!(verbatim.as_ref().unwrap().content, "0x1F");
            }
            other => panic!("expected literal, got {:?}", other),
        };
    }

    #[test]
    fn variable_declaration_defaults_to_var() {
        let decl = variable_declaration(vec![variable_declarator(identifier("a"), None)]);
        match &decl.borrow().kind {
            NodeKind::VariableDeclaration { kind, .. } => {
                assert_eq!(*kind, DeclarationKind::Var)
            }
            other => panic!("expected variable declaration, got {:?}", other),
        };
    }

    #[test]
    fn member_access_defaults_to_non_computed() {
        let member = member_expression(identifier("a"), identifier("b"));
        match &member.borrow().kind {
            NodeKind::MemberExpression { computed, .. } => assert!(!computed),
            other => panic!("expected member expression, got {:?}", other),
        };
    }
}
