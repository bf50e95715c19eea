//! Predicate grammar parser using nom
//!
//! Grammar:
//! ```text
//! expr      := and_expr ('||' and_expr)*
//! and_expr  := unary ('&&' unary)*
//! unary     := '!' unary | atom
//! atom      := 'all' | 'none' | '(' expr ')' | call | comparison
//! call      := 'rect' '(' point ',' point ')'
//!            | 'radius' '(' point ',' number ')'
//!            | 'neighbors' '(' id ')'
//!            | 'category' '(' string (',' string)* ')'
//!            | 'interval' '(' ident ',' number ',' number ')'
//!            | 'members' '(' id (',' id)* ')'
//!            | 'incident' '(' expr ')'
//! comparison:= ident op number
//! op        := '<' | '<=' | '>' | '>=' | '==' | '!='
//! id        := ident | string | integer
//! ```

use crate::ast::*;
use crate::entity::{EntityId, Point};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{map, not, peek, recognize, value},
    multi::{many0, separated_list1},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use thiserror::Error;

/// Parse errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unexpected characters at end: '{0}'")]
    Trailing(String),
}

/// Parse a predicate from a string
///
/// Empty input means no restriction.
pub fn parse_predicate(input: &str) -> Result<Predicate, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Predicate::All);
    }

    match expr(input) {
        Ok(("", result)) => Ok(result),
        Ok((remaining, _)) => Err(ParseError::Trailing(remaining.to_string())),
        Err(e) => Err(ParseError::Parse(format!("{:?}", e))),
    }
}

/// Parse whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A keyword not followed by more identifier characters
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), not(peek(satisfy(is_ident_char))))
}

fn expr(input: &str) -> IResult<&str, Predicate> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(ws(tag("||")), and_expr))(input)?;

    Ok((input, rest.into_iter().fold(first, Predicate::or)))
}

fn and_expr(input: &str) -> IResult<&str, Predicate> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(ws(tag("&&")), unary))(input)?;

    Ok((input, rest.into_iter().fold(first, Predicate::and)))
}

fn unary(input: &str) -> IResult<&str, Predicate> {
    alt((map(preceded(ws(char('!')), unary), Predicate::not), atom))(input)
}

fn atom(input: &str) -> IResult<&str, Predicate> {
    ws(alt((
        value(Predicate::All, keyword("all")),
        value(Predicate::None, keyword("none")),
        delimited(char('('), expr, char(')')),
        parse_rect,
        parse_radius,
        parse_neighbors,
        parse_category,
        parse_interval,
        parse_members,
        parse_incident,
        map(comparison, Predicate::Comparison),
    )))(input)
}

/// `name(` with optional space before the parenthesis
fn call_open<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    value((), terminated(keyword(name), ws(char('('))))
}

fn comma(input: &str) -> IResult<&str, char> {
    ws(char(','))(input)
}

fn close(input: &str) -> IResult<&str, char> {
    ws(char(')'))(input)
}

/// rect([x0, y0], [x1, y1])
fn parse_rect(input: &str) -> IResult<&str, Predicate> {
    let (input, _) = call_open("rect")(input)?;
    let (input, a) = parse_point(input)?;
    let (input, _) = comma(input)?;
    let (input, b) = parse_point(input)?;
    let (input, _) = close(input)?;

    Ok((input, Predicate::rectangle(a, b)))
}

/// radius([x, y], r)
fn parse_radius(input: &str) -> IResult<&str, Predicate> {
    let (input, _) = call_open("radius")(input)?;
    let (input, center) = parse_point(input)?;
    let (input, _) = comma(input)?;
    let (input, radius) = ws(double)(input)?;
    let (input, _) = close(input)?;

    Ok((input, Predicate::radius(center, radius)))
}

/// neighbors(id)
fn parse_neighbors(input: &str) -> IResult<&str, Predicate> {
    let (input, _) = call_open("neighbors")(input)?;
    let (input, focus) = entity_id(input)?;
    let (input, _) = close(input)?;

    Ok((input, Predicate::Neighbor { focus }))
}

/// category('a', 'b', ...)
fn parse_category(input: &str) -> IResult<&str, Predicate> {
    let (input, _) = call_open("category")(input)?;
    let (input, names) = separated_list1(comma, ws(string_literal))(input)?;
    let (input, _) = close(input)?;

    Ok((input, Predicate::category(names)))
}

/// interval(field, low, high)
fn parse_interval(input: &str) -> IResult<&str, Predicate> {
    let (input, _) = call_open("interval")(input)?;
    let (input, field) = ws(identifier)(input)?;
    let (input, _) = comma(input)?;
    let (input, low) = ws(double)(input)?;
    let (input, _) = comma(input)?;
    let (input, high) = ws(double)(input)?;
    let (input, _) = close(input)?;

    Ok((input, Predicate::interval(field, low, high)))
}

/// members(id, id, ...)
fn parse_members(input: &str) -> IResult<&str, Predicate> {
    let (input, _) = call_open("members")(input)?;
    let (input, ids) = separated_list1(comma, entity_id)(input)?;
    let (input, _) = close(input)?;

    Ok((input, Predicate::members(ids)))
}

/// incident(expr)
fn parse_incident(input: &str) -> IResult<&str, Predicate> {
    let (input, _) = call_open("incident")(input)?;
    let (input, inner) = expr(input)?;
    let (input, _) = close(input)?;

    Ok((input, Predicate::incident(inner)))
}

fn comparison(input: &str) -> IResult<&str, Comparison> {
    let (input, field) = identifier(input)?;
    let (input, op) = ws(comparison_op)(input)?;
    let (input, number) = double(input)?;
    Ok((input, Comparison::new(field, op, number)))
}

fn comparison_op(input: &str) -> IResult<&str, ComparisonOp> {
    alt((
        value(ComparisonOp::Le, tag("<=")),
        value(ComparisonOp::Ge, tag(">=")),
        value(ComparisonOp::Eq, tag("==")),
        value(ComparisonOp::Ne, tag("!=")),
        value(ComparisonOp::Lt, tag("<")),
        value(ComparisonOp::Gt, tag(">")),
    ))(input)
}

/// An entity id: bare identifier, quoted string, or integer position
fn entity_id(input: &str) -> IResult<&str, EntityId> {
    ws(alt((
        map(string_literal, EntityId::from),
        map(identifier, EntityId::from),
        map(digit1, EntityId::from),
    )))(input)
}

/// Parse an identifier (starts with letter or underscore, followed by alphanumeric or underscore)
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)
}

fn string_literal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while1(|c| c != '"'), char('"')),
        delimited(char('\''), take_while1(|c| c != '\''), char('\'')),
    ))(input)
}

/// Parse a 2D point: [x, y]
fn parse_point(input: &str) -> IResult<&str, Point> {
    let (input, _) = ws(char('['))(input)?;
    let (input, x) = double(input)?;
    let (input, _) = comma(input)?;
    let (input, y) = double(input)?;
    let (input, _) = ws(char(']'))(input)?;

    Ok((input, [x, y]))
}
