//! Code generator
//!
//! Turns a node (or subtree) back into source text. Statement emission uses
//! four-space block indentation; expression emission threads a minimum
//! [`Precedence`] and parenthesizes any child that binds looser than its
//! context requires. A literal carrying a verbatim annotation is emitted
//! byte-for-byte from the captured content at the annotation's precedence,
//! never re-derived from the semantic value.

use crate::ast::{NodeKind, NodeRef, Precedence};

/// Generate source text for a single node of any kind.
pub fn generate(node: &NodeRef) -> String {
    let kind_is_statement = {
        let n = node.borrow();
        matches!(
            n.kind,
            NodeKind::Program { .. }
                | NodeKind::BlockStatement { .. }
                | NodeKind::ExpressionStatement { .. }
                | NodeKind::IfStatement { .. }
                | NodeKind::WhileStatement { .. }
                | NodeKind::SwitchStatement { .. }
                | NodeKind::SwitchCase { .. }
                | NodeKind::ReturnStatement { .. }
                | NodeKind::BreakStatement
                | NodeKind::ContinueStatement
                | NodeKind::VariableDeclaration { .. }
                | NodeKind::FunctionDeclaration { .. }
                | NodeKind::MethodDefinition { .. }
                | NodeKind::VariableDeclarator { .. }
                | NodeKind::Property { .. }
        )
    };
    if kind_is_statement {
        gen_statement(node, 0)
    } else {
        gen_expression(node, Precedence::Sequence)
    }
}

fn indent_str(indent: usize) -> String {
    "    ".repeat(indent)
}

// ============================================================================
// STATEMENTS
// ============================================================================

fn gen_statement(node: &NodeRef, indent: usize) -> String {
    let pad = indent_str(indent);
    let n = node.borrow();

    match &n.kind {
        NodeKind::Program { body } => body
            .iter()
            .map(|s| gen_statement(s, indent))
            .collect::<Vec<_>>()
            .join("\n"),

        NodeKind::BlockStatement { .. } => {
            drop(n);
            format!("{}{}", pad, block_text(node, indent))
        }

        NodeKind::ExpressionStatement { expression } => {
            let text = gen_expression(expression, Precedence::Sequence);
            if starts_with_brace_or_function(expression) {
                format!("{}({});", pad, text)
            } else {
                format!("{}{};", pad, text)
            }
        }

        NodeKind::IfStatement {
            test,
            consequent,
            alternate,
        } => {
            let mut out = format!(
                "{}if ({}) {}",
                pad,
                gen_expression(test, Precedence::Sequence),
                attached_statement(consequent, indent)
            );
            if let Some(alternate) = alternate {
                out.push_str(" else ");
                out.push_str(&attached_statement(alternate, indent));
            }
            out
        }

        NodeKind::WhileStatement { test, body } => format!(
            "{}while ({}) {}",
            pad,
            gen_expression(test, Precedence::Sequence),
            attached_statement(body, indent)
        ),

        NodeKind::SwitchStatement {
            discriminant,
            cases,
        } => {
            let mut out = format!(
                "{}switch ({}) {{",
                pad,
                gen_expression(discriminant, Precedence::Sequence)
            );
            for case in cases {
                out.push('\n');
                out.push_str(&gen_statement(case, indent + 1));
            }
            out.push('\n');
            out.push_str(&pad);
            out.push('}');
            out
        }

        NodeKind::SwitchCase { test, consequent } => {
            let mut out = match test {
                Some(test) => format!(
                    "{}case {}:",
                    pad,
                    gen_expression(test, Precedence::Sequence)
                ),
                None => format!("{}default:", pad),
            };
            for stmt in consequent {
                out.push('\n');
                out.push_str(&gen_statement(stmt, indent + 1));
            }
            out
        }

        NodeKind::ReturnStatement { argument } => match argument {
            Some(argument) => format!(
                "{}return {};",
                pad,
                gen_expression(argument, Precedence::Sequence)
            ),
            None => format!("{}return;", pad),
        },

        NodeKind::BreakStatement => format!("{}break;", pad),
        NodeKind::ContinueStatement => format!("{}continue;", pad),

        NodeKind::VariableDeclaration { declarations, kind } => {
            let rendered = declarations
                .iter()
                .map(|d| gen_statement(d, 0))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}{} {};", pad, kind, rendered)
        }

        NodeKind::VariableDeclarator { id, init } => {
            let id_text = gen_expression(id, Precedence::Primary);
            match init {
                Some(init) => format!(
                    "{}{} = {}",
                    pad,
                    id_text,
                    gen_expression(init, Precedence::Assignment)
                ),
                None => format!("{}{}", pad, id_text),
            }
        }

        NodeKind::FunctionDeclaration { id, params, body } => format!(
            "{}function {}({}) {}",
            pad,
            gen_expression(id, Precedence::Primary),
            param_list(params),
            block_text(body, indent)
        ),

        NodeKind::MethodDefinition {
            key,
            value,
            kind,
            computed,
            is_static,
        } => {
            let mut out = pad;
            if *is_static {
                out.push_str("static ");
            }
            match kind {
                crate::ast::MethodKind::Get => out.push_str("get "),
                crate::ast::MethodKind::Set => out.push_str("set "),
                _ => {}
            }
            let key_text = gen_expression(key, Precedence::Sequence);
            if *computed {
                out.push_str(&format!("[{}]", key_text));
            } else {
                out.push_str(&key_text);
            }
            // The value is a function expression by contract; emit its
            // parameter list and body in method shorthand.
            match &value.borrow().kind {
                NodeKind::FunctionExpression { params, body, .. } => {
                    out.push_str(&format!("({}) {}", param_list(params), block_text(body, indent)));
                }
                _ => {
                    out.push_str(": ");
                    out.push_str(&gen_expression(value, Precedence::Assignment));
                }
            }
            out
        }

        NodeKind::Property { .. } => {
            drop(n);
            format!("{}{}", pad, property_text(node, indent))
        }

        _ => {
            drop(n);
            format!("{}{}", pad, gen_expression(node, Precedence::Sequence))
        }
    }
}

/// A statement attached after a header (`if (...)`, `while (...)`, `else`):
/// blocks open on the same line, anything else is emitted inline.
fn attached_statement(node: &NodeRef, indent: usize) -> String {
    if matches!(node.borrow().kind, NodeKind::BlockStatement { .. }) {
        block_text(node, indent)
    } else {
        // Emit at the surrounding depth, then strip the first line's pad so
        // the statement sits on the header's line.
        gen_statement(node, indent).trim_start().to_string()
    }
}

/// Brace-delimited body without the leading pad, closing brace at `indent`.
fn block_text(node: &NodeRef, indent: usize) -> String {
    let n = node.borrow();
    let body = match &n.kind {
        NodeKind::BlockStatement { body } => body,
        _ => {
            drop(n);
            return format!("{{ {} }}", gen_statement(node, 0));
        }
    };
    if body.is_empty() {
        return "{}".to_string();
    }
    let inner = body
        .iter()
        .map(|s| gen_statement(s, indent + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{{\n{}\n{}}}", inner, indent_str(indent))
}

fn param_list(params: &[NodeRef]) -> String {
    params
        .iter()
        .map(|p| gen_expression(p, Precedence::Primary))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// Renders `node` as an expression, parenthesizing when its own precedence
/// binds looser than `min`.
pub fn gen_expression(node: &NodeRef, min: Precedence) -> String {
    gen_with(node, min, false)
}

fn gen_with(node: &NodeRef, min: Precedence, strict: bool) -> String {
    let (text, prec) = render_expression(node);
    if prec < min || (strict && prec == min) {
        format!("({})", text)
    } else {
        text
    }
}

fn render_expression(node: &NodeRef) -> (String, Precedence) {
    let n = node.borrow();
    match &n.kind {
        NodeKind::Identifier { name } => (name.clone(), Precedence::Primary),

        NodeKind::Literal {
            value,
            raw,
            verbatim,
        } => match verbatim {
            // Verbatim wins over everything; the captured text is emitted at
            // the annotation's own precedence.
            Some(verbatim) => (verbatim.content.clone(), verbatim.precedence),
            None => (
                raw.clone().unwrap_or_else(|| value.render()),
                Precedence::Primary,
            ),
        },

        NodeKind::ArrayExpression { elements } => {
            let inner = elements
                .iter()
                .map(|e| gen_expression(e, Precedence::Assignment))
                .collect::<Vec<_>>()
                .join(", ");
            (format!("[{}]", inner), Precedence::Primary)
        }

        NodeKind::ObjectExpression { properties } => {
            if properties.is_empty() {
                return ("{}".to_string(), Precedence::Primary);
            }
            let inner = properties
                .iter()
                .map(|p| property_text(p, 0))
                .collect::<Vec<_>>()
                .join(", ");
            (format!("{{ {} }}", inner), Precedence::Primary)
        }

        NodeKind::CallExpression { callee, arguments } => {
            let args = arguments
                .iter()
                .map(|a| gen_expression(a, Precedence::Assignment))
                .collect::<Vec<_>>()
                .join(", ");
            (
                format!("{}({})", gen_expression(callee, Precedence::Call), args),
                Precedence::Call,
            )
        }

        NodeKind::MemberExpression {
            object,
            property,
            computed,
        } => {
            let object_text = gen_expression(object, Precedence::Call);
            let text = if *computed {
                format!(
                    "{}[{}]",
                    object_text,
                    gen_expression(property, Precedence::Sequence)
                )
            } else {
                format!(
                    "{}.{}",
                    object_text,
                    gen_expression(property, Precedence::Primary)
                )
            };
            (text, Precedence::Call)
        }

        NodeKind::BinaryExpression {
            operator,
            left,
            right,
        } => {
            let prec = operator.precedence();
            let text = format!(
                "{} {} {}",
                gen_with(left, prec, false),
                operator,
                gen_with(right, prec, true)
            );
            (text, prec)
        }

        NodeKind::LogicalExpression {
            operator,
            left,
            right,
        } => {
            let prec = operator.precedence();
            let text = format!(
                "{} {} {}",
                gen_with(left, prec, false),
                operator,
                gen_with(right, prec, true)
            );
            (text, prec)
        }

        NodeKind::UnaryExpression { operator, argument } => {
            let arg = gen_expression(argument, Precedence::Unary);
            let symbol = operator.as_str();
            let needs_space = operator.is_word()
                || symbol
                    .chars()
                    .last()
                    .is_some_and(|last| arg.starts_with(last));
            let sep = if needs_space { " " } else { "" };
            (format!("{}{}{}", symbol, sep, arg), Precedence::Unary)
        }

        NodeKind::UpdateExpression {
            operator,
            argument,
            prefix,
        } => {
            if *prefix {
                let arg = gen_expression(argument, Precedence::Unary);
                let sep = if arg.starts_with(|c| c == '+' || c == '-') {
                    " "
                } else {
                    ""
                };
                (format!("{}{}{}", operator, sep, arg), Precedence::Unary)
            } else {
                (
                    format!("{}{}", gen_expression(argument, Precedence::Postfix), operator),
                    Precedence::Postfix,
                )
            }
        }

        NodeKind::AssignmentExpression {
            operator,
            left,
            right,
        } => {
            let text = format!(
                "{} {} {}",
                gen_expression(left, Precedence::Call),
                operator,
                gen_expression(right, Precedence::Assignment)
            );
            (text, Precedence::Assignment)
        }

        NodeKind::FunctionExpression { id, params, body } => {
            let name = match id {
                Some(id) => format!(" {}", gen_expression(id, Precedence::Primary)),
                None => String::new(),
            };
            (
                format!(
                    "function{}({}) {}",
                    name,
                    param_list(params),
                    block_text(body, 0)
                ),
                Precedence::Primary,
            )
        }

        // Statement kinds reaching expression context is a caller contract
        // violation; fall back to statement emission so the defect is visible
        // in the output rather than silently dropped.
        _ => {
            drop(n);
            (gen_statement(node, 0), Precedence::Primary)
        }
    }
}

fn property_text(node: &NodeRef, indent: usize) -> String {
    let n = node.borrow();
    match &n.kind {
        NodeKind::Property {
            key,
            value,
            computed,
            ..
        } => {
            let key_text = if *computed {
                format!("[{}]", gen_expression(key, Precedence::Sequence))
            } else {
                gen_expression(key, Precedence::Primary)
            };
            format!(
                "{}: {}",
                key_text,
                gen_expression(value, Precedence::Assignment)
            )
        }
        _ => {
            drop(n);
            gen_statement(node, indent)
        }
    }
}

/// True when the expression's leftmost token would open an object literal or
/// a function keyword, which an expression statement must parenthesize to
/// survive a reparse.
fn starts_with_brace_or_function(node: &NodeRef) -> bool {
    let n = node.borrow();
    match &n.kind {
        NodeKind::ObjectExpression { .. } | NodeKind::FunctionExpression { .. } => true,
        NodeKind::CallExpression { callee, .. } => starts_with_brace_or_function(callee),
        NodeKind::MemberExpression { object, .. } => starts_with_brace_or_function(object),
        NodeKind::BinaryExpression { left, .. }
        | NodeKind::LogicalExpression { left, .. }
        | NodeKind::AssignmentExpression { left, .. } => starts_with_brace_or_function(left),
        NodeKind::UpdateExpression {
            argument,
            prefix: false,
            ..
        } => starts_with_brace_or_function(argument),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{factory, BinaryOperator, LiteralValue, LogicalOperator, UnaryOperator};

    fn num(n: f64) -> NodeRef {
        factory::literal(LiteralValue::Number(n))
    }

    #[test]
    fn binary_precedence_inserts_parentheses() {
        // (1 + 2) * 3 must keep its parentheses; 1 + 2 * 3 must not gain any.
        let grouped = factory::binary_expression(
            BinaryOperator::Multiply,
            factory::binary_expression(BinaryOperator::Add, num(1.0), num(2.0)),
            num(3.0),
        );
        assert_eq!(generate(&grouped), "(1 + 2) * 3");

        let natural = factory::binary_expression(
            BinaryOperator::Add,
            num(1.0),
            factory::binary_expression(BinaryOperator::Multiply, num(2.0), num(3.0)),
        );
        assert_eq!(generate(&natural), "1 + 2 * 3");
    }

    #[test]
    fn left_associativity_parenthesizes_right_nesting() {
        // 1 - (2 - 3) binds right and must keep parentheses.
        let tree = factory::binary_expression(
            BinaryOperator::Subtract,
            num(1.0),
            factory::binary_expression(BinaryOperator::Subtract, num(2.0), num(3.0)),
        );
        assert_eq!(generate(&tree), "1 - (2 - 3)");
    }

    #[test]
    fn verbatim_literal_wins_over_value() {
        let lit = factory::literal_with_raw(LiteralValue::Number(31.0), "0x1F");
        assert_eq!(generate(&lit), "0x1F");
    }

    #[test]
    fn nested_unary_minus_keeps_a_space() {
        let tree = factory::unary_expression(
            UnaryOperator::Minus,
            factory::unary_expression(UnaryOperator::Minus, factory::identifier("x")),
        );
        assert_eq!(generate(&tree), "- -x");
    }

    #[test]
    fn word_operators_are_spaced() {
        let tree = factory::unary_expression(UnaryOperator::Typeof, factory::identifier("x"));
        assert_eq!(generate(&tree), "typeof x");

        let rel = factory::binary_expression(
            BinaryOperator::In,
            factory::identifier("k"),
            factory::identifier("o"),
        );
        assert_eq!(generate(&rel), "k in o");
    }

    #[test]
    fn logical_mixing_respects_precedence() {
        // (a || b) && c
        let tree = factory::logical_expression(
            LogicalOperator::And,
            factory::logical_expression(
                LogicalOperator::Or,
                factory::identifier("a"),
                factory::identifier("b"),
            ),
            factory::identifier("c"),
        );
        assert_eq!(generate(&tree), "(a || b) && c");
    }

    #[test]
    fn object_expression_statement_is_parenthesized() {
        let stmt = factory::expression_statement(factory::object_expression(vec![
            factory::property(factory::identifier("a"), num(1.0)),
        ]));
        assert_eq!(generate(&stmt), "({ a: 1 });");
    }

    #[test]
    fn if_else_chains_render_inline() {
        let tree = factory::if_statement(
            factory::identifier("a"),
            factory::block_statement(vec![factory::break_statement()]),
            Some(factory::if_statement(
                factory::identifier("b"),
                factory::block_statement(vec![]),
                None,
            )),
        );
        assert_eq!(
            generate(&tree),
            "if (a) {\n    break;\n} else if (b) {}"
        );
    }

    #[test]
    fn switch_statement_layout() {
        let tree = factory::switch_statement(
            factory::identifier("x"),
            vec![
                factory::switch_case(Some(num(1.0)), vec![factory::break_statement()]),
                factory::switch_case(None, vec![]),
            ],
        );
        assert_eq!(
            generate(&tree),
            "switch (x) {\n    case 1:\n        break;\n    default:\n}"
        );
    }

    #[test]
    fn variable_declaration_with_multiple_declarators() {
        let tree = factory::variable_declaration(vec![
            factory::variable_declarator(factory::identifier("a"), Some(num(1.0))),
            factory::variable_declarator(factory::identifier("b"), None),
        ]);
        assert_eq!(generate(&tree), "var a = 1, b;");
    }

    #[test]
    fn member_and_call_chains_render_flat() {
        let tree = factory::call_expression(
            factory::member_expression(
                factory::call_expression(factory::identifier("f"), vec![]),
                factory::identifier("g"),
            ),
            vec![num(1.0)],
        );
        assert_eq!(generate(&tree), "f().g(1)");
    }
}
