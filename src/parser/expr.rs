use crate::{
    ast::expressions::{ArithmeticOp, Expr, ExprKind, LogicalOp, RelationalOp},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    types::parse_type,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let Some(nud) = parser.get_nud_handler(parser.current_token_kind()) else {
        return Err(parser.unexpected());
    };
    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.get_binding_power(parser.current_token_kind()) > bp {
        let kind = parser.current_token_kind();
        let Some(led) = parser.get_led_handler(kind) else {
            return Err(parser.unexpected());
        };
        left = led(parser, left, parser.get_binding_power(kind))?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();
    let span = token.span;

    let kind = match token.kind {
        TokenKind::Number if token.value.contains('.') => ExprKind::Double(
            token
                .value
                .parse()
                .map_err(|_| number_error(&token.value, span))?,
        ),
        TokenKind::Number => ExprKind::Int(
            token
                .value
                .parse()
                .map_err(|_| number_error(&token.value, span))?,
        ),
        TokenKind::Identifier => ExprKind::Identifier(token.value),
        TokenKind::String => ExprKind::String(token.value),
        TokenKind::Char => {
            let mut chars = token.value.chars();
            match (chars.next(), chars.next()) {
                (Some(value), None) => ExprKind::Char(value),
                _ => {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedTokenDetailed {
                            token: token.value,
                            message: String::from("a char literal holds exactly one character"),
                        },
                        span.start,
                    ))
                }
            }
        }
        TokenKind::True => ExprKind::Bool(true),
        TokenKind::False => ExprKind::Bool(false),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                span.start,
            ))
        }
    };

    Ok(Expr::new(kind, span))
}

fn number_error(token: &str, span: Span) -> Error {
    Error::new(
        ErrorImpl::NumberParseError {
            token: token.to_string(),
        },
        span.start,
    )
}

pub fn parse_arithmetic_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator = parser.advance();
    let op = match operator.kind {
        TokenKind::Plus => ArithmeticOp::Add,
        TokenKind::Dash => ArithmeticOp::Subtract,
        TokenKind::Star => ArithmeticOp::Multiply,
        TokenKind::Slash => ArithmeticOp::Divide,
        TokenKind::Percent => ArithmeticOp::Modulo,
        _ => ArithmeticOp::Power,
    };

    // `**` is right associative.
    let right_bp = if op == ArithmeticOp::Power {
        BindingPower::Multiplicative
    } else {
        bp
    };
    let right = parse_expr(parser, right_bp)?;
    let span = Span::new(left.span.start, right.span.end);

    Ok(Expr::new(
        ExprKind::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_relational_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator = parser.advance();
    let op = match operator.kind {
        TokenKind::Less => RelationalOp::Less,
        TokenKind::LessEquals => RelationalOp::LessEqual,
        TokenKind::Greater => RelationalOp::Greater,
        TokenKind::GreaterEquals => RelationalOp::GreaterEqual,
        TokenKind::Equals => RelationalOp::Equal,
        _ => RelationalOp::NotEqual,
    };
    let right = parse_expr(parser, bp)?;
    let span = Span::new(left.span.start, right.span.end);

    Ok(Expr::new(
        ExprKind::Relational {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_logical_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator = parser.advance();
    let op = match operator.kind {
        TokenKind::And => LogicalOp::And,
        TokenKind::Or => LogicalOp::Or,
        _ => LogicalOp::Xor,
    };
    let right = parse_expr(parser, bp)?;
    let span = Span::new(left.span.start, right.span.end);

    Ok(Expr::new(
        ExprKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator = parser.advance();
    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = Span::new(operator.span.start, operand.span.end);

    let kind = match operator.kind {
        TokenKind::Not => ExprKind::Not(Box::new(operand)),
        _ => ExprKind::Negate(Box::new(operand)),
    };
    Ok(Expr::new(kind, span))
}

/// `(expr)`, or a cast when the parenthesis holds a type: `(int) x`.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;

    if matches!(parser.current_token_kind(), TokenKind::TypeName | TokenKind::List) {
        let target = parse_type(parser, BindingPower::Default)?;
        parser.expect(TokenKind::CloseParen)?;
        let operand = parse_expr(parser, BindingPower::Unary)?;
        let span = Span::new(start, operand.span.end);
        return Ok(Expr::new(
            ExprKind::Cast {
                target,
                expr: Box::new(operand),
            },
            span,
        ));
    }

    let inner = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;
    Ok(Expr::new(ExprKind::Grouping(Box::new(inner)), parser.span_from(start)))
}

/// Comma separated expressions up to `closing`, which is consumed.
pub fn parse_arguments(parser: &mut Parser, closing: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut arguments = vec![];

    while parser.current_token_kind() != closing {
        arguments.push(parse_expr(parser, BindingPower::Default)?);
        if parser.current_token_kind() != closing {
            parser.expect(TokenKind::Comma)?;
        }
    }
    parser.expect(closing)?;

    Ok(arguments)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let ExprKind::Identifier(name) = &left.kind else {
        return Err(parser.unexpected_detailed("only named functions can be called"));
    };
    let name = name.clone();
    parser.advance();
    let arguments = parse_arguments(parser, TokenKind::CloseParen)?;

    Ok(Expr::new(
        ExprKind::Call { name, arguments },
        parser.span_from(left.span.start),
    ))
}

pub fn parse_method_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let error = parser.unexpected_detailed("expected a method name after `.`");
    let method = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
    parser.expect(TokenKind::OpenParen)?;
    let arguments = parse_arguments(parser, TokenKind::CloseParen)?;
    let span = parser.span_from(left.span.start);

    Ok(Expr::new(
        ExprKind::MethodCall {
            receiver: Box::new(left),
            method,
            arguments,
        },
        span,
    ))
}

/// `target[index]`; a second bracket becomes the column of a matrix access.
pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;
    let span = parser.span_from(left.span.start);

    let kind = match left.kind {
        ExprKind::Index {
            target,
            index: row,
            column: None,
        } => ExprKind::Index {
            target,
            index: row,
            column: Some(Box::new(index)),
        },
        ExprKind::Index { .. } => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: String::from("["),
                    message: String::from("at most two indices are allowed"),
                },
                index.span.start,
            ))
        }
        kind => ExprKind::Index {
            target: Box::new(Expr::new(kind, left.span)),
            index: Box::new(index),
            column: None,
        },
    };

    Ok(Expr::new(kind, span))
}

/// `[1, 2]` is a vector literal, `[[1, 2], [3, 4]]` a matrix literal.
pub fn parse_aggregate_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let is_matrix = parser.current_token_kind() == TokenKind::OpenBracket;
    let items = parse_arguments(parser, TokenKind::CloseBracket)?;
    let span = parser.span_from(start);

    if is_matrix {
        Ok(Expr::new(ExprKind::Matrix(items), span))
    } else {
        Ok(Expr::new(ExprKind::Vector(items), span))
    }
}

/// `new List()` or `new List<T>()`.
pub fn parse_new_list_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start;
    let error = parser.unexpected_detailed("only lists can be created with `new`");
    parser.expect_error(TokenKind::List, Some(error))?;

    let base = if parser.current_token_kind() == TokenKind::Less {
        parser.advance();
        let position = parser.get_position();
        let element = parse_type(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Greater)?;
        Some(element.as_scalar().ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownType {
                    type_: element.to_string(),
                },
                position,
            )
        })?)
    } else {
        None
    };

    parser.expect(TokenKind::OpenParen)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::new(ExprKind::NewList(base), parser.span_from(start)))
}

/// Whether an expression may appear on the left of `=`, `++` or `--`.
pub fn is_assignable_target(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Identifier(_) | ExprKind::Index { .. })
}
