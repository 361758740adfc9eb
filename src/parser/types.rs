//! Type annotation parsing.
//!
//! Supports scalar type names, `T[]` vectors, `T[][]` matrices and
//! `List<T>`. Like expressions, types are parsed with NUD/LED handlers.

use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;
pub type TypeLEDHandler = fn(&mut Parser, Type, BindingPower) -> Result<Type, Error>;
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::TypeName, parse_symbol_type);
    parser.type_nud(TokenKind::List, parse_list_type);
    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::TypeName)?;
    Type::from_name(&token.value).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnknownType { type_: token.value },
            token.span.start,
        )
    })
}

/// `List<T>` with a scalar `T`.
pub fn parse_list_type(parser: &mut Parser) -> Result<Type, Error> {
    let start = parser.expect(TokenKind::List)?.span.start;
    parser.expect(TokenKind::Less)?;
    let element = parse_type(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Greater)?;

    element.as_scalar().map(Type::List).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnknownType {
                type_: format!("List<{}>", element),
            },
            start,
        )
    })
}

/// `T[]` turns a scalar into a vector and a vector into a matrix.
pub fn parse_array_type(parser: &mut Parser, left: Type, _bp: BindingPower) -> Result<Type, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;
    parser.expect(TokenKind::CloseBracket)?;

    match left {
        Type::Vector(base) => Ok(Type::Matrix(base)),
        other => other.as_scalar().map(Type::Vector).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownType {
                    type_: format!("{}[]", other),
                },
                start,
            )
        }),
    }
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<Type, Error> {
    let Some(nud) = parser.get_type_nud_handler(parser.current_token_kind()) else {
        return Err(parser.unexpected_detailed("expected a type"));
    };
    let mut left = nud(parser)?;

    while parser.get_type_binding_power(parser.current_token_kind()) > bp {
        let kind = parser.current_token_kind();
        let Some(led) = parser.get_type_led_handler(kind) else {
            return Err(parser.unexpected());
        };
        left = led(parser, left, parser.get_type_binding_power(kind))?;
    }

    Ok(left)
}

/// A type usable for a variable or parameter, which excludes `void`.
pub fn parse_value_type(parser: &mut Parser) -> Result<Type, Error> {
    let position = parser.get_position();
    match parse_type(parser, BindingPower::Default)? {
        Type::Void => Err(Error::new(
            ErrorImpl::UnknownType {
                type_: Type::Void.to_string(),
            },
            position,
        )),
        ty => Ok(ty),
    }
}
