use std::rc::Rc;

use crate::{
    ast::{
        expressions::{Expr, ExprKind},
        statements::{Block, Case, FnDecl, Parameter, Stmt, StmtKind},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    expr::{is_assignable_target, parse_arguments},
    parser::Parser,
    types::{parse_type, parse_value_type},
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser.get_stmt_handler(parser.current_token_kind()) {
        return handler(parser);
    }

    let stmt = parse_simple_stmt(parser)?;
    parser.expect(TokenKind::Semicolon)?;
    Ok(stmt)
}

/// Assignment, index assignment, `++`/`--` or a bare expression, without
/// the trailing semicolon. Shared with the header of `for`.
fn parse_simple_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();
    let expr = parse_expr(parser, BindingPower::Default)?;

    let kind = match parser.current_token_kind() {
        TokenKind::Assignment => {
            if !is_assignable_target(&expr) {
                return Err(parser.unexpected_detailed("left side of `=` cannot be assigned"));
            }
            parser.advance();
            let value = parse_expr(parser, BindingPower::Default)?;
            assignment(expr, value)
        }
        TokenKind::PlusPlus | TokenKind::MinusMinus => {
            if !is_assignable_target(&expr) {
                return Err(parser.unexpected_detailed("only variables and elements can be incremented"));
            }
            let increment = parser.advance().kind == TokenKind::PlusPlus;
            StmtKind::IncDec {
                target: expr,
                increment,
            }
        }
        _ => StmtKind::Expression(expr),
    };

    Ok(Stmt::new(kind, parser.span_from(start)))
}

fn assignment(target: Expr, value: Expr) -> StmtKind {
    match target.kind {
        ExprKind::Index {
            target,
            index,
            column,
        } => StmtKind::IndexAssign {
            target: *target,
            index: *index,
            column: column.map(|column| *column),
            value,
        },
        ExprKind::Identifier(name) => StmtKind::Assign { name, value },
        other => StmtKind::Expression(Expr::new(other, target.span)),
    }
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let stmt = parse_var_decl(parser)?;
    parser.expect(TokenKind::Semicolon)?;
    Ok(stmt)
}

/// `var name: type [= value]` without the trailing semicolon.
fn parse_var_decl(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::Var)?.span.start;

    let error = parser.unexpected_detailed("expected identifier during variable declaration");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let error = parser.unexpected_detailed("expected `:` and a type after the variable name");
    parser.expect_error(TokenKind::Colon, Some(error))?;
    let ty = parse_value_type(parser)?;

    let initializer = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(Stmt::new(
        StmtKind::VarDecl {
            name,
            ty,
            initializer,
        },
        parser.span_from(start),
    ))
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut body = Vec::new();
    while !matches!(parser.current_token_kind(), TokenKind::CloseCurly | TokenKind::EOF) {
        body.push(parse_stmt(parser)?);
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Block {
        body,
        span: parser.span_from(start),
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let block = parse_block(parser)?;
    let span = block.span;
    Ok(Stmt::new(StmtKind::Block(block), span))
}

fn parse_condition(parser: &mut Parser) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;
    Ok(condition)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let condition = parse_condition(parser)?;
    let then_branch = parse_block(parser)?;

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        let branch = if parser.current_token_kind() == TokenKind::If {
            parse_if_stmt(parser)?
        } else {
            parse_block_stmt(parser)?
        };
        Some(Box::new(branch))
    } else {
        None
    };

    Ok(Stmt::new(
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        },
        parser.span_from(start),
    ))
}

pub fn parse_switch_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let scrutinee = parse_condition(parser)?;
    parser.expect(TokenKind::OpenCurly)?;

    let mut cases = vec![];
    while parser.current_token_kind() == TokenKind::Case {
        let case_start = parser.advance().span.start;
        let value = parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Colon)?;
        let body = parse_case_body(parser)?;
        cases.push(Case {
            value,
            body,
            span: parser.span_from(case_start),
        });
    }

    let default = if parser.current_token_kind() == TokenKind::Default {
        parser.advance();
        parser.expect(TokenKind::Colon)?;
        Some(parse_case_body(parser)?)
    } else {
        None
    };

    let error = parser.unexpected_detailed("expected `case`, `default` or `}` in switch");
    parser.expect_error(TokenKind::CloseCurly, Some(error))?;

    Ok(Stmt::new(
        StmtKind::Switch {
            scrutinee,
            cases,
            default,
        },
        parser.span_from(start),
    ))
}

fn parse_case_body(parser: &mut Parser) -> Result<Vec<Stmt>, Error> {
    let mut body = vec![];
    while !matches!(
        parser.current_token_kind(),
        TokenKind::Case | TokenKind::Default | TokenKind::CloseCurly | TokenKind::EOF
    ) {
        body.push(parse_stmt(parser)?);
    }
    Ok(body)
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let condition = parse_condition(parser)?;
    let body = parse_block(parser)?;

    Ok(Stmt::new(StmtKind::While { condition, body }, parser.span_from(start)))
}

pub fn parse_do_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let body = parse_block(parser)?;
    parser.expect(TokenKind::While)?;
    let condition = parse_condition(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::new(StmtKind::DoWhile { body, condition }, parser.span_from(start)))
}

/// `for (init; condition; update) { }`, every header part optional.
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    parser.expect(TokenKind::OpenParen)?;

    let init = match parser.current_token_kind() {
        TokenKind::Semicolon => None,
        TokenKind::Var => Some(Box::new(parse_var_decl(parser)?)),
        _ => Some(Box::new(parse_simple_stmt(parser)?)),
    };
    parser.expect(TokenKind::Semicolon)?;

    let condition = match parser.current_token_kind() {
        TokenKind::Semicolon => None,
        _ => Some(parse_expr(parser, BindingPower::Default)?),
    };
    parser.expect(TokenKind::Semicolon)?;

    let update = match parser.current_token_kind() {
        TokenKind::CloseParen => None,
        _ => Some(Box::new(parse_simple_stmt(parser)?)),
    };
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block(parser)?;

    Ok(Stmt::new(
        StmtKind::For {
            init,
            condition,
            update,
            body,
        },
        parser.span_from(start),
    ))
}

/// `break;` and `continue;`
pub fn parse_jump_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance();
    parser.expect(TokenKind::Semicolon)?;

    let kind = match token.kind {
        TokenKind::Break => StmtKind::Break,
        _ => StmtKind::Continue,
    };
    Ok(Stmt::new(kind, parser.span_from(token.span.start)))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::new(StmtKind::Return(value), parser.span_from(start)))
}

pub fn parse_print_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let value = parse_condition(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::new(StmtKind::Print(value), parser.span_from(start)))
}

/// `start main(args);`
pub fn parse_start_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let error = parser.unexpected_detailed("expected the name of the entry function");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
    parser.expect(TokenKind::OpenParen)?;
    let arguments = parse_arguments(parser, TokenKind::CloseParen)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::new(StmtKind::Start { name, arguments }, parser.span_from(start)))
}

/// `type name(type a, type b) { body }`
pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();
    let return_type = parse_type(parser, BindingPower::Default)?;

    let error = parser.unexpected_detailed("expected a function name after the return type");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let position = parser.get_position();
        let ty = parse_value_type(parser)?;
        let error = parser.unexpected_detailed("expected a parameter name");
        let parameter = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
        parameters.push(Parameter {
            name: parameter,
            ty,
            position,
        });

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect(TokenKind::Comma)?;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block(parser)?;
    let declaration = FnDecl {
        name,
        parameters,
        return_type,
        body,
        span: parser.span_from(start),
    };

    let span = declaration.span;
    Ok(Stmt::new(StmtKind::FnDecl(Rc::new(declaration)), span))
}
