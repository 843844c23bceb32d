//! Graft Parser - Clean, Minimal Implementation
//!
//! Converts source text into a raw program tree. This parser is purely
//! syntactic: parent links are unset and metadata is at its defaults, so the
//! output is not usable by transformation passes until the conversion layer
//! has linked and annotated it. Literal tokens keep their exact source text
//! in the node's `raw` field for later verbatim annotation.

use miette::SourceSpan;
use pest::error::{Error, InputLocation};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{
    factory, AssignmentOperator, BinaryOperator, DeclarationKind, LiteralValue, LogicalOperator,
    NodeKind, NodeRef, UnaryOperator, UpdateOperator,
};
use crate::errors::{ErrorKind, ErrorReporting, GraftError, ParseContext, SourceContext};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct GraftParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse source text into a raw `Program` node.
pub fn parse(source_text: &str, source_context: SourceContext) -> Result<NodeRef, GraftError> {
    let ctx = ParseContext::new(source_context);

    let mut pairs = GraftParser::parse(Rule::program, source_text)
        .map_err(|e| convert_parse_error(e, &ctx))?;

    let program = pairs
        .next()
        .ok_or_else(|| ctx.malformed_construct("program", crate::errors::unspanned()))?;

    let body = program
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| build_statement(p, &ctx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(factory::program(body))
}

// ============================================================================
// STATEMENT BUILDERS
// ============================================================================

fn build_statement(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::block_statement => {
            let body = build_statements(pair.into_inner(), ctx)?;
            Ok(factory::block_statement(body))
        }

        Rule::if_statement => {
            let mut inner = pair.into_inner();
            let test = build_expression(next_pair(&mut inner, "if condition", span, ctx)?, ctx)?;
            let consequent =
                build_statement(next_pair(&mut inner, "if branch", span, ctx)?, ctx)?;
            let alternate = inner
                .next()
                .map(|p| build_statement(p, ctx))
                .transpose()?;
            Ok(factory::if_statement(test, consequent, alternate))
        }

        Rule::while_statement => {
            let mut inner = pair.into_inner();
            let test = build_expression(next_pair(&mut inner, "loop condition", span, ctx)?, ctx)?;
            let body = build_statement(next_pair(&mut inner, "loop body", span, ctx)?, ctx)?;
            Ok(factory::while_statement(test, body))
        }

        Rule::switch_statement => {
            let mut inner = pair.into_inner();
            let discriminant =
                build_expression(next_pair(&mut inner, "switch discriminant", span, ctx)?, ctx)?;
            let cases = inner
                .map(|p| build_switch_case(p, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(factory::switch_statement(discriminant, cases))
        }

        Rule::return_statement => {
            let argument = pair
                .into_inner()
                .next()
                .map(|p| build_expression(p, ctx))
                .transpose()?;
            Ok(factory::return_statement(argument))
        }

        Rule::break_statement => Ok(factory::break_statement()),
        Rule::continue_statement => Ok(factory::continue_statement()),

        Rule::variable_declaration => {
            let mut inner = pair.into_inner();
            let kind_pair = next_pair(&mut inner, "declaration kind", span, ctx)?;
            let kind = DeclarationKind::from_symbol(kind_pair.as_str()).ok_or_else(|| {
                ctx.malformed_construct("declaration kind", get_span(&kind_pair))
            })?;
            let declarations = inner
                .map(|p| build_declarator(p, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(factory::variable_declaration_of(kind, declarations))
        }

        Rule::function_declaration => {
            let mut inner = pair.into_inner();
            let id = build_expression(next_pair(&mut inner, "function name", span, ctx)?, ctx)?;
            let (params, body) = build_function_rest(inner, span, ctx)?;
            Ok(factory::function_declaration(id, params, body))
        }

        Rule::expression_statement => {
            let mut inner = pair.into_inner();
            let expression =
                build_expression(next_pair(&mut inner, "expression", span, ctx)?, ctx)?;
            Ok(factory::expression_statement(expression))
        }

        rule => Err(ctx.malformed_construct(format!("statement rule {:?}", rule), span)),
    }
}

fn build_statements(pairs: Pairs<Rule>, ctx: &ParseContext) -> Result<Vec<NodeRef>, GraftError> {
    pairs.map(|p| build_statement(p, ctx)).collect()
}

fn build_switch_case(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let span = get_span(&pair);
    match pair.as_rule() {
        Rule::case_clause => {
            let mut inner = pair.into_inner();
            let test = build_expression(next_pair(&mut inner, "case test", span, ctx)?, ctx)?;
            let consequent = build_statements(inner, ctx)?;
            Ok(factory::switch_case(Some(test), consequent))
        }
        Rule::default_clause => {
            let consequent = build_statements(pair.into_inner(), ctx)?;
            Ok(factory::switch_case(None, consequent))
        }
        rule => Err(ctx.malformed_construct(format!("switch clause {:?}", rule), span)),
    }
}

fn build_declarator(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let id = build_expression(next_pair(&mut inner, "declarator name", span, ctx)?, ctx)?;
    let init = inner.next().map(|p| build_expression(p, ctx)).transpose()?;
    Ok(factory::variable_declarator(id, init))
}

/// Shared tail of function declarations and expressions: optional parameter
/// list, then the body block.
fn build_function_rest<'a>(
    inner: impl Iterator<Item = Pair<'a, Rule>>,
    span: SourceSpan,
    ctx: &ParseContext,
) -> Result<(Vec<NodeRef>, NodeRef), GraftError> {
    let mut params = Vec::new();
    let mut body = None;
    for pair in inner {
        match pair.as_rule() {
            Rule::parameter_list => {
                for param in pair.into_inner() {
                    params.push(build_expression(param, ctx)?);
                }
            }
            Rule::block_statement => body = Some(build_statement(pair, ctx)?),
            rule => {
                return Err(ctx.malformed_construct(format!("function part {:?}", rule), span))
            }
        }
    }
    let body = body.ok_or_else(|| ctx.malformed_construct("function body", span))?;
    Ok((params, body))
}

// ============================================================================
// EXPRESSION BUILDERS
// ============================================================================

fn build_expression(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::assignment_expression => build_assignment(pair, ctx),

        Rule::logical_or_expression
        | Rule::logical_and_expression
        | Rule::bitwise_or_expression
        | Rule::bitwise_xor_expression
        | Rule::bitwise_and_expression
        | Rule::equality_expression
        | Rule::relational_expression
        | Rule::shift_expression
        | Rule::additive_expression
        | Rule::multiplicative_expression => build_binary_chain(pair, ctx),

        Rule::prefix_unary_expression => {
            let mut inner = pair.into_inner();
            let op_pair = next_pair(&mut inner, "unary operator", span, ctx)?;
            let operator = UnaryOperator::from_symbol(op_pair.as_str())
                .ok_or_else(|| ctx.malformed_construct("unary operator", get_span(&op_pair)))?;
            let argument =
                build_expression(next_pair(&mut inner, "unary operand", span, ctx)?, ctx)?;
            Ok(factory::unary_expression(operator, argument))
        }

        Rule::prefix_update_expression => {
            let mut inner = pair.into_inner();
            let op_pair = next_pair(&mut inner, "update operator", span, ctx)?;
            let operator = UpdateOperator::from_symbol(op_pair.as_str())
                .ok_or_else(|| ctx.malformed_construct("update operator", get_span(&op_pair)))?;
            let argument =
                build_expression(next_pair(&mut inner, "update operand", span, ctx)?, ctx)?;
            Ok(factory::update_expression(operator, argument, true))
        }

        Rule::postfix_expression => build_postfix_chain(pair, ctx),

        Rule::paren_expression => {
            let mut inner = pair.into_inner();
            build_expression(next_pair(&mut inner, "parenthesized expression", span, ctx)?, ctx)
        }

        Rule::function_expression => {
            let mut inner = pair.into_inner().peekable();
            let mut id = None;
            if inner.peek().map(|p| p.as_rule()) == Some(Rule::identifier) {
                if let Some(name) = inner.next() {
                    id = Some(build_expression(name, ctx)?);
                }
            }
            let (params, body) = build_function_rest(inner, span, ctx)?;
            Ok(factory::function_expression(id, params, body))
        }

        Rule::array_literal => {
            let elements = pair
                .into_inner()
                .map(|p| build_expression(p, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(factory::array_expression(elements))
        }

        Rule::object_literal => {
            let properties = pair
                .into_inner()
                .map(|p| build_property(p, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(factory::object_expression(properties))
        }

        Rule::identifier => Ok(factory::identifier(pair.as_str())),

        Rule::number => build_number(pair, ctx),
        Rule::string => build_string(pair, ctx),

        Rule::boolean_literal => {
            let text = pair.as_str();
            let value = match text {
                "true" => true,
                "false" => false,
                _ => return Err(ctx.invalid_literal("boolean", text, span)),
            };
            Ok(factory::literal_with_raw(LiteralValue::Boolean(value), text))
        }

        Rule::null_literal => Ok(factory::literal_with_raw(
            LiteralValue::Null,
            pair.as_str(),
        )),

        rule => Err(ctx.malformed_construct(format!("expression rule {:?}", rule), span)),
    }
}

fn build_assignment(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let first = next_pair(&mut inner, "expression", span, ctx)?;
    let left_span = get_span(&first);
    let left = build_expression(first, ctx)?;

    let Some(op_pair) = inner.next() else {
        return Ok(left);
    };

    if !is_assignment_target(&left) {
        return Err(ctx.report(ErrorKind::InvalidAssignmentTarget, left_span));
    }
    let operator = AssignmentOperator::from_symbol(op_pair.as_str())
        .ok_or_else(|| ctx.malformed_construct("assignment operator", get_span(&op_pair)))?;
    let right = build_expression(next_pair(&mut inner, "assignment value", span, ctx)?, ctx)?;
    Ok(factory::assignment_expression(operator, left, right))
}

fn is_assignment_target(node: &NodeRef) -> bool {
    matches!(
        node.borrow().kind,
        NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. }
    )
}

/// Left-folds one precedence level: operand, then zero or more
/// (operator, operand) steps.
fn build_binary_chain(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let mut node = build_expression(next_pair(&mut inner, "expression", span, ctx)?, ctx)?;

    while let Some(op_pair) = inner.next() {
        let symbol = op_pair.as_str();
        let operand = next_pair(&mut inner, "binary operand", get_span(&op_pair), ctx)?;
        let right = build_expression(operand, ctx)?;
        node = if let Some(op) = LogicalOperator::from_symbol(symbol) {
            factory::logical_expression(op, node, right)
        } else if let Some(op) = BinaryOperator::from_symbol(symbol) {
            factory::binary_expression(op, node, right)
        } else {
            return Err(
                ctx.malformed_construct(format!("operator '{}'", symbol), get_span(&op_pair))
            );
        };
    }
    Ok(node)
}

/// Folds call/member/postfix-update suffixes onto a primary expression.
fn build_postfix_chain(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let mut node = build_expression(next_pair(&mut inner, "expression", span, ctx)?, ctx)?;

    for suffix in inner {
        let suffix_span = get_span(&suffix);
        node = match suffix.as_rule() {
            Rule::call_suffix => {
                let arguments = suffix
                    .into_inner()
                    .map(|p| build_expression(p, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                factory::call_expression(node, arguments)
            }
            Rule::member_dot => {
                let mut parts = suffix.into_inner();
                let property =
                    build_expression(next_pair(&mut parts, "member name", suffix_span, ctx)?, ctx)?;
                factory::member_expression(node, property)
            }
            Rule::member_index => {
                let mut parts = suffix.into_inner();
                let property =
                    build_expression(next_pair(&mut parts, "index expression", suffix_span, ctx)?, ctx)?;
                factory::computed_member_expression(node, property)
            }
            Rule::postfix_update => {
                let operator = UpdateOperator::from_symbol(suffix.as_str()).ok_or_else(|| {
                    ctx.malformed_construct("update operator", suffix_span)
                })?;
                factory::update_expression(operator, node, false)
            }
            rule => {
                return Err(
                    ctx.malformed_construct(format!("postfix rule {:?}", rule), suffix_span)
                )
            }
        };
    }
    Ok(node)
}

fn build_property(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let key_pair = next_pair(&mut inner, "property key", span, ctx)?;
    let value = build_expression(next_pair(&mut inner, "property value", span, ctx)?, ctx)?;

    match key_pair.as_rule() {
        Rule::computed_key => {
            let mut parts = key_pair.into_inner();
            let key = build_expression(next_pair(&mut parts, "computed key", span, ctx)?, ctx)?;
            Ok(factory::computed_property(key, value))
        }
        _ => {
            let key = build_expression(key_pair, ctx)?;
            Ok(factory::property(key, value))
        }
    }
}

// ============================================================================
// LITERAL BUILDERS
// ============================================================================

fn build_number(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let text = pair.as_str();
    let span = get_span(&pair);

    let value = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .map_err(|_| ctx.invalid_literal("number", text, span))?
    } else {
        text.parse::<f64>()
            .map_err(|_| ctx.invalid_literal("number", text, span))?
    };

    Ok(factory::literal_with_raw(LiteralValue::Number(value), text))
}

fn build_string(pair: Pair<Rule>, ctx: &ParseContext) -> Result<NodeRef, GraftError> {
    let text = pair.as_str();
    let span = get_span(&pair);
    if text.len() < 2 {
        return Err(ctx.invalid_literal("string", text, span));
    }
    let content = unescape_string(&text[1..text.len() - 1]);
    Ok(factory::literal_with_raw(LiteralValue::String(content), text))
}

fn unescape_string(inner: &str) -> String {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('0') => result.push('\0'),
                Some('\\') => result.push('\\'),
                Some('\'') => result.push('\''),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }
    result
}

// ============================================================================
// UTILITIES & ERROR HANDLING
// ============================================================================

fn next_pair<'a>(
    pairs: &mut Pairs<'a, Rule>,
    what: &str,
    span: SourceSpan,
    ctx: &ParseContext,
) -> Result<Pair<'a, Rule>, GraftError> {
    pairs
        .next()
        .ok_or_else(|| ctx.malformed_construct(what.to_string(), span))
}

fn get_span(pair: &Pair<Rule>) -> SourceSpan {
    let span = pair.as_span();
    SourceSpan::from(span.start()..span.end())
}

fn convert_parse_error(error: Error<Rule>, ctx: &ParseContext) -> GraftError {
    let span = match error.location {
        InputLocation::Pos(pos) => SourceSpan::from(pos..pos),
        InputLocation::Span((start, end)) => SourceSpan::from(start..end),
    };
    ctx.syntax_error(error.variant.message().to_string(), span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> NodeRef {
        parse(source, SourceContext::from_file("test.js", source)).expect("source should parse")
    }

    fn program_body(program: &NodeRef) -> Vec<NodeRef> {
        program.borrow().children()
    }

    #[test]
    fn empty_input_yields_empty_program() {
        let program = parse_ok("   \n  // just a comment\n");
        assert!(program_body(&program).is_empty());
    }

    #[test]
    fn hex_literal_keeps_raw_capture() {
        let program = parse_ok("var a = 0x1F;");
        let decl = &program_body(&program)[0];
        let declarator = &decl.borrow().children()[0];
        let init = std::rc::Rc::clone(&declarator.borrow().children()[1]);
        match &init.borrow().kind {
            NodeKind::Literal { value, raw, .. } => {
                assert_eq!(*value, LiteralValue::Number(31.0));
                assert_eq!(raw.as_deref(), Some("0x1F"));
            }
            other => panic!("expected literal, got {:?}", other),
        };
    }

    #[test]
    fn precedence_nests_multiplication_tighter() {
        let program = parse_ok("a + b * c;");
        let stmt = &program_body(&program)[0];
        let expr = std::rc::Rc::clone(&stmt.borrow().children()[0]);
        match &expr.borrow().kind {
            NodeKind::BinaryExpression {
                operator, right, ..
            } => {
                assert_eq!(*operator, BinaryOperator::Add);
                assert!(matches!(
                    right.borrow().kind,
                    NodeKind::BinaryExpression {
                        operator: BinaryOperator::Multiply,
                        ..
                    }
                ));
            }
            other => panic!("expected binary expression, got {:?}", other),
        };
    }

    #[test]
    fn unmatched_brace_is_a_syntax_error() {
        let source = "if (a) { b();";
        let result = parse(source, SourceContext::from_file("test.js", source));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    }

    #[test]
    fn literal_assignment_target_is_rejected() {
        let source = "1 = x;";
        let result = parse(source, SourceContext::from_file("test.js", source));
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidAssignmentTarget);
    }

    #[test]
    fn keywords_do_not_parse_as_identifiers() {
        let source = "var return = 1;";
        assert!(parse(source, SourceContext::from_file("test.js", source)).is_err());
    }
}
