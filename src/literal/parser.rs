//! Restricted literal parser
//!
//! Accepts data literals only: numbers, quoted strings, booleans, null and
//! nested arrays/objects. Both JSON spelling and the Python-style spelling users
//! tend to type (`'single quotes'`, `True`, `None`, trailing commas) are allowed.
//! Nothing is ever evaluated.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0, one_of, satisfy},
    combinator::{all_consuming, opt, recognize, value},
    multi::{fold_many0, separated_list0},
    sequence::{delimited, pair, preceded, separated_pair, tuple},
    IResult,
};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Most arrays/objects a literal may nest; deeper input is rejected before recursing
pub const MAX_NESTING: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid literal at position {position}")]
pub struct LiteralError {
    pub position: usize,
}

/// Parse a complete literal; trailing input is an error
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    match all_consuming(ws(|i| literal(i, 0)))(input) {
        Ok((_, value)) => Ok(value),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(LiteralError {
            position: input.len() - e.input.len(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(LiteralError {
            position: input.len(),
        }),
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// `depth` counts the containers enclosing `input`
fn literal(input: &str, depth: usize) -> IResult<&str, Value> {
    alt((
        |i| object(i, depth),
        |i| array(i, depth),
        string,
        number,
        keyword,
    ))(input)
}

fn keyword(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), alt((tag("true"), tag("True")))),
        value(Value::Bool(false), alt((tag("false"), tag("False")))),
        value(Value::Null, alt((tag("null"), tag("None")))),
    ))(input)
}

fn number(input: &str) -> IResult<&str, Value> {
    let (rest, text) = recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), opt(digit1))))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;

    let text = text.trim_start_matches('+');
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(i) = text.parse::<i64>() {
            return Ok((rest, Value::from(i)));
        }
        if let Ok(u) = text.parse::<u64>() {
            return Ok((rest, Value::from(u)));
        }
    }
    match text.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Ok((rest, Value::Number(n))),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        ))),
    }
}

fn escape(input: &str) -> IResult<&str, char> {
    alt((
        value('\\', char('\\')),
        value('"', char('"')),
        value('\'', char('\'')),
        value('/', char('/')),
        value('\n', char('n')),
        value('\t', char('t')),
        value('\r', char('r')),
    ))(input)
}

fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    move |input| {
        delimited(
            char(quote),
            fold_many0(
                alt((
                    preceded(char('\\'), escape),
                    satisfy(move |c| c != quote && c != '\\'),
                )),
                String::new,
                |mut acc, c| {
                    acc.push(c);
                    acc
                },
            ),
            char(quote),
        )(input)
    }
}

fn string_text(input: &str) -> IResult<&str, String> {
    alt((quoted('"'), quoted('\'')))(input)
}

fn string(input: &str) -> IResult<&str, Value> {
    let (input, s) = string_text(input)?;
    Ok((input, Value::String(s)))
}

fn open<'a>(delimiter: char, depth: usize) -> impl FnMut(&'a str) -> IResult<&'a str, char> {
    move |input| {
        let (rest, c) = char(delimiter)(input)?;
        if depth >= MAX_NESTING {
            // Failure, not Error: alt must not backtrack into the other branches
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::TooLarge,
            )));
        }
        Ok((rest, c))
    }
}

fn array(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, _) = open('[', depth)(input)?;
    let (input, items) = separated_list0(ws(char(',')), ws(|i| literal(i, depth + 1)))(input)?;
    let (input, _) = opt(ws(char(',')))(input)?;
    let (input, _) = ws(char(']'))(input)?;
    Ok((input, Value::Array(items)))
}

fn object(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, _) = open('{', depth)(input)?;
    let (input, entries) = separated_list0(
        ws(char(',')),
        ws(separated_pair(string_text, ws(char(':')), |i| literal(i, depth + 1))),
    )(input)?;
    let (input, _) = opt(ws(char(',')))(input)?;
    let (input, _) = ws(char('}'))(input)?;

    let mut map = Map::new();
    for (key, val) in entries {
        map.insert(key, val);
    }
    Ok((input, Value::Object(map)))
}
