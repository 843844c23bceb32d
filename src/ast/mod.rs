//! Syntax-node model for the Graft toolkit
//!
//! Trees are single-owner hierarchies of [`Node`] values behind [`NodeRef`]
//! handles. Each node carries a back-reference to its syntactic parent as a
//! weak link that never participates in ownership, equality, or cloning; a
//! standalone tree's root is its own parent. Nodes come either raw from the
//! parser or fully annotated from the [`factory`] module.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub mod clone;
pub mod factory;
pub mod operators;
pub mod parent;
pub mod walk;

pub use clone::clone_tree;
pub use operators::{
    AssignmentOperator, BinaryOperator, DeclarationKind, LogicalOperator, MethodKind, PropertyKind,
    UnaryOperator, UpdateOperator,
};
pub use parent::parentize;
pub use walk::walk;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Shared handle to a syntax node. Trees are single-threaded value graphs;
/// interior mutability is what lets the parent linker and the conversion
/// pass annotate nodes in place.
pub type NodeRef = Rc<RefCell<Node>>;

/// One element of a parsed or synthesized syntax tree.
#[derive(Debug)]
pub struct Node {
    /// Discriminant plus variant-specific children.
    pub kind: NodeKind,
    /// Bookkeeping flags consumed by transformation passes.
    pub metadata: Metadata,
    /// Weak back-reference to the enclosing node. Self-referencing at a
    /// tree's root, dangling on freshly built nodes until a linker pass runs.
    parent: Weak<RefCell<Node>>,
}

/// Fixed-shape per-node bookkeeping record. The field set is closed, so this
/// is an inline struct rather than a dynamic map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Metadata {
    pub ignored_node: bool,
}

/// Forces exact-text reproduction of a literal instead of re-deriving text
/// from its semantic value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verbatim {
    pub content: String,
    pub precedence: Precedence,
}

/// Formatting priority consumed by the code generator to decide when
/// surrounding parentheses are needed. Ordered from loosest to tightest
/// binding; the derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Precedence {
    Sequence,
    Assignment,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Postfix,
    Call,
    Member,
    Primary,
}

/// Semantic value of a literal node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    RegExp { pattern: String, flags: String },
}

impl LiteralValue {
    /// Default textual rendering, used when a literal carries no raw capture.
    /// Strings quote with single quotes; numbers print in the shortest form
    /// that survives a reparse.
    pub fn render(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => render_number(*n),
            Self::String(s) => render_quoted(s),
            Self::RegExp { pattern, flags } => format!("/{}/{}", pattern, flags),
        }
    }
}

fn render_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n < 0.0 { "-Infinity".to_string() } else { "Infinity".to_string() }
    } else {
        format!("{}", n)
    }
}

fn render_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

// ============================================================================
// NODE KINDS - closed tagged union over the supported construct set
// ============================================================================

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Program {
        body: Vec<NodeRef>,
    },

    // Expressions
    ArrayExpression {
        elements: Vec<NodeRef>,
    },
    ObjectExpression {
        properties: Vec<NodeRef>,
    },
    CallExpression {
        callee: NodeRef,
        arguments: Vec<NodeRef>,
    },
    MemberExpression {
        object: NodeRef,
        property: NodeRef,
        computed: bool,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: NodeRef,
        right: NodeRef,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: NodeRef,
        right: NodeRef,
    },
    UnaryExpression {
        operator: UnaryOperator,
        argument: NodeRef,
    },
    UpdateExpression {
        operator: UpdateOperator,
        argument: NodeRef,
        prefix: bool,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        left: NodeRef,
        right: NodeRef,
    },
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
        /// Exact source capture of the literal token, when known.
        raw: Option<String>,
        /// Annotation forcing byte-for-byte reproduction by the generator.
        verbatim: Option<Verbatim>,
    },
    FunctionExpression {
        id: Option<NodeRef>,
        params: Vec<NodeRef>,
        body: NodeRef,
    },

    // Statements
    BlockStatement {
        body: Vec<NodeRef>,
    },
    ExpressionStatement {
        expression: NodeRef,
    },
    IfStatement {
        test: NodeRef,
        consequent: NodeRef,
        alternate: Option<NodeRef>,
    },
    WhileStatement {
        test: NodeRef,
        body: NodeRef,
    },
    SwitchStatement {
        discriminant: NodeRef,
        cases: Vec<NodeRef>,
    },
    /// `test: None` is the `default:` clause.
    SwitchCase {
        test: Option<NodeRef>,
        consequent: Vec<NodeRef>,
    },
    ReturnStatement {
        argument: Option<NodeRef>,
    },
    BreakStatement,
    ContinueStatement,

    // Declarations
    VariableDeclaration {
        declarations: Vec<NodeRef>,
        kind: DeclarationKind,
    },
    VariableDeclarator {
        id: NodeRef,
        init: Option<NodeRef>,
    },
    FunctionDeclaration {
        id: NodeRef,
        params: Vec<NodeRef>,
        body: NodeRef,
    },
    MethodDefinition {
        key: NodeRef,
        value: NodeRef,
        kind: MethodKind,
        computed: bool,
        is_static: bool,
    },
    Property {
        key: NodeRef,
        value: NodeRef,
        kind: PropertyKind,
        computed: bool,
    },
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Node {
    /// Builds a node with default metadata and no parent link.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            metadata: Metadata::default(),
            parent: Weak::new(),
        }
    }

    /// The syntactic parent, if a linker pass has run and the parent is
    /// still alive. A standalone tree's root returns itself.
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.upgrade()
    }

    /// Reassigns the back-reference. Only the parent linker and the
    /// conversion pass should need this.
    pub fn set_parent(&mut self, parent: &NodeRef) {
        self.parent = Rc::downgrade(parent);
    }

    /// Owned children in syntactic order. Handles are cheap clones of the
    /// owning slots; the slot count and order match [`Node::replace_child`].
    pub fn children(&self) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut push = |n: &NodeRef| out.push(Rc::clone(n));
        match &self.kind {
            NodeKind::Program { body }
            | NodeKind::BlockStatement { body }
            | NodeKind::ArrayExpression { elements: body }
            | NodeKind::ObjectExpression { properties: body }
            | NodeKind::VariableDeclaration {
                declarations: body, ..
            } => body.iter().for_each(&mut push),
            NodeKind::CallExpression { callee, arguments } => {
                push(callee);
                arguments.iter().for_each(&mut push);
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                push(object);
                push(property);
            }
            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. } => {
                push(left);
                push(right);
            }
            NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. } => push(argument),
            NodeKind::Identifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement => {}
            NodeKind::FunctionExpression { id, params, body } => {
                if let Some(id) = id {
                    push(id);
                }
                params.iter().for_each(&mut push);
                push(body);
            }
            NodeKind::ExpressionStatement { expression } => push(expression),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                push(test);
                push(consequent);
                if let Some(alt) = alternate {
                    push(alt);
                }
            }
            NodeKind::WhileStatement { test, body } => {
                push(test);
                push(body);
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                push(discriminant);
                cases.iter().for_each(&mut push);
            }
            NodeKind::SwitchCase { test, consequent } => {
                if let Some(test) = test {
                    push(test);
                }
                consequent.iter().for_each(&mut push);
            }
            NodeKind::ReturnStatement { argument } => {
                if let Some(arg) = argument {
                    push(arg);
                }
            }
            NodeKind::VariableDeclarator { id, init } => {
                push(id);
                if let Some(init) = init {
                    push(init);
                }
            }
            NodeKind::FunctionDeclaration { id, params, body } => {
                push(id);
                params.iter().for_each(&mut push);
                push(body);
            }
            NodeKind::MethodDefinition { key, value, .. }
            | NodeKind::Property { key, value, .. } => {
                push(key);
                push(value);
            }
        }
        out
    }

    /// Replaces the child at `index` (in [`Node::children`] order) with a new
    /// node. Out-of-range indices are a caller contract violation and are
    /// ignored.
    pub fn replace_child(&mut self, index: usize, replacement: NodeRef) {
        if let Some(slot) = self.child_slots_mut().into_iter().nth(index) {
            *slot = replacement;
        }
    }

    /// Mutable slots in the same order as [`Node::children`].
    fn child_slots_mut(&mut self) -> Vec<&mut NodeRef> {
        let mut out: Vec<&mut NodeRef> = Vec::new();
        match &mut self.kind {
            NodeKind::Program { body }
            | NodeKind::BlockStatement { body }
            | NodeKind::ArrayExpression { elements: body }
            | NodeKind::ObjectExpression { properties: body }
            | NodeKind::VariableDeclaration {
                declarations: body, ..
            } => out.extend(body.iter_mut()),
            NodeKind::CallExpression { callee, arguments } => {
                out.push(callee);
                out.extend(arguments.iter_mut());
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                out.push(object);
                out.push(property);
            }
            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::AssignmentExpression { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. } => out.push(argument),
            NodeKind::Identifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement => {}
            NodeKind::FunctionExpression { id, params, body } => {
                if let Some(id) = id {
                    out.push(id);
                }
                out.extend(params.iter_mut());
                out.push(body);
            }
            NodeKind::ExpressionStatement { expression } => out.push(expression),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                out.push(test);
                out.push(consequent);
                if let Some(alt) = alternate {
                    out.push(alt);
                }
            }
            NodeKind::WhileStatement { test, body } => {
                out.push(test);
                out.push(body);
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                out.push(discriminant);
                out.extend(cases.iter_mut());
            }
            NodeKind::SwitchCase { test, consequent } => {
                if let Some(test) = test {
                    out.push(test);
                }
                out.extend(consequent.iter_mut());
            }
            NodeKind::ReturnStatement { argument } => {
                if let Some(arg) = argument {
                    out.push(arg);
                }
            }
            NodeKind::VariableDeclarator { id, init } => {
                out.push(id);
                if let Some(init) = init {
                    out.push(init);
                }
            }
            NodeKind::FunctionDeclaration { id, params, body } => {
                out.push(id);
                out.extend(params.iter_mut());
                out.push(body);
            }
            NodeKind::MethodDefinition { key, value, .. }
            | NodeKind::Property { key, value, .. } => {
                out.push(key);
                out.push(value);
            }
        }
        out
    }
}

/// Structural equality: kind and metadata, recursively through children.
/// The parent back-reference is excluded by construction, so comparing two
/// linked trees never follows the cycle it creates.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.metadata == other.metadata
    }
}

/// Serialization skips the parent link for the same reason equality does.
/// There is no `Deserialize`: trees are rehydrated from source text so that
/// parent links are always rebuilt by the linker.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 2)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("metadata", &self.metadata)?;
        state.end()
    }
}

// ============================================================================
// TREE QUERIES
// ============================================================================

/// True when the node is the root of a standalone linked tree, i.e. its
/// parent link points back at itself.
pub fn is_root(node: &NodeRef) -> bool {
    node.borrow()
        .parent()
        .is_some_and(|p| Rc::ptr_eq(&p, node))
}

/// Follows nested unary-expression arguments to the first non-unary node.
/// A non-unary input is returned unchanged.
pub fn innermost_unary_argument(node: &NodeRef) -> NodeRef {
    let inner = match &node.borrow().kind {
        NodeKind::UnaryExpression { argument, .. } => Rc::clone(argument),
        _ => return Rc::clone(node),
    };
    innermost_unary_argument(&inner)
}

#[cfg(test)]
mod tests {
    use super::factory;
    use super::*;

    #[test]
    fn children_order_matches_replace_child() {
        let callee = factory::identifier("f");
        let arg = factory::literal(LiteralValue::Number(1.0));
        let call = factory::call_expression(callee, vec![arg]);

        let swapped = factory::identifier("g");
        call.borrow_mut().replace_child(0, Rc::clone(&swapped));

        let children = call.borrow().children();
        assert_eq!(children.len(), 2);
        assert!(Rc::ptr_eq(&children[0], &swapped));
    }

    #[test]
    fn equality_ignores_parent_links() {
        let a = factory::identifier("x");
        let b = factory::identifier("x");
        let holder = factory::expression_statement(Rc::clone(&a));
        parentize(&holder);

        // `a` is linked into a tree, `b` is detached; still equal.
        assert_eq!(*a.borrow(), *b.borrow());
    }

    #[test]
    fn unary_chain_unwraps_to_identifier() {
        let x = factory::identifier("x");
        let chain = factory::unary_expression(
            UnaryOperator::Not,
            factory::unary_expression(
                UnaryOperator::Not,
                factory::unary_expression(UnaryOperator::Not, Rc::clone(&x)),
            ),
        );
        let inner = innermost_unary_argument(&chain);
        assert!(Rc::ptr_eq(&inner, &x));
    }

    #[test]
    fn literal_value_default_rendering() {
        assert_eq!(LiteralValue::Number(31.0).render(), "31");
        assert_eq!(LiteralValue::Number(1.5).render(), "1.5");
        assert_eq!(LiteralValue::String("a'b".into()).render(), "'a\\'b'");
        assert_eq!(LiteralValue::Null.render(), "null");
        assert_eq!(
            LiteralValue::RegExp {
                pattern: "a+".into(),
                flags: "g".into()
            }
            .render(),
            "/a+/g"
        );
    }
}
