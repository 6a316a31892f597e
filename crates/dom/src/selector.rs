use std::{iter::Peekable, str::CharIndices, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: usize },
    #[error("expected identifier at {position}")]
    ExpectedIdentifier { position: usize },
    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
    #[error("unsupported combinator '{0}'")]
    UnsupportedCombinator(char),
}

/// A chain of compound selectors joined by descendant combinators, e.g.
/// `.brand-marq .item a.img` or `button[type="submit"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub(crate) compounds: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attributes: Vec<AttributeMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttributeMatch {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
}

type Cursor<'a> = Peekable<CharIndices<'a>>;

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut cursor = input.char_indices().peekable();
        let mut compounds = Vec::new();

        loop {
            skip_whitespace(&mut cursor);
            if cursor.peek().is_none() {
                break;
            }
            compounds.push(parse_compound(&mut cursor)?);
        }

        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { compounds })
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn skip_whitespace(cursor: &mut Cursor<'_>) {
    while cursor.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}
}

fn parse_compound(cursor: &mut Cursor<'_>) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut started = false;

    while let Some(&(position, ch)) = cursor.peek() {
        match ch {
            c if c.is_whitespace() => break,
            '>' | '+' | '~' | ',' => return Err(SelectorError::UnsupportedCombinator(ch)),
            '*' if !started => {
                cursor.next();
            }
            '#' => {
                cursor.next();
                compound.id = Some(parse_ident(cursor, position + 1)?);
            }
            '.' => {
                cursor.next();
                compound.classes.push(parse_ident(cursor, position + 1)?);
            }
            '[' => {
                cursor.next();
                compound.attributes.push(parse_attribute(cursor)?);
            }
            c if is_ident_char(c) && !started => {
                compound.tag = Some(parse_ident(cursor, position)?.to_ascii_lowercase());
            }
            _ => return Err(SelectorError::UnexpectedChar { ch, position }),
        }
        started = true;
    }

    Ok(compound)
}

fn parse_ident(cursor: &mut Cursor<'_>, position: usize) -> Result<String, SelectorError> {
    let mut ident = String::new();
    while let Some((_, ch)) = cursor.next_if(|(_, ch)| is_ident_char(*ch)) {
        ident.push(ch);
    }
    if ident.is_empty() {
        return Err(SelectorError::ExpectedIdentifier { position });
    }
    Ok(ident)
}

fn parse_attribute(cursor: &mut Cursor<'_>) -> Result<AttributeMatch, SelectorError> {
    skip_whitespace(cursor);
    let position = cursor
        .peek()
        .map(|(position, _)| *position)
        .ok_or(SelectorError::UnterminatedAttribute)?;
    let name = parse_ident(cursor, position)?.to_ascii_lowercase();
    skip_whitespace(cursor);

    let value = match cursor.next() {
        Some((_, ']')) => return Ok(AttributeMatch { name, value: None }),
        Some((_, '=')) => {
            skip_whitespace(cursor);
            parse_attribute_value(cursor)?
        }
        Some((position, ch)) => return Err(SelectorError::UnexpectedChar { ch, position }),
        None => return Err(SelectorError::UnterminatedAttribute),
    };

    skip_whitespace(cursor);
    match cursor.next() {
        Some((_, ']')) => Ok(AttributeMatch {
            name,
            value: Some(value),
        }),
        Some((position, ch)) => Err(SelectorError::UnexpectedChar { ch, position }),
        None => Err(SelectorError::UnterminatedAttribute),
    }
}

fn parse_attribute_value(cursor: &mut Cursor<'_>) -> Result<String, SelectorError> {
    match cursor.peek().copied() {
        Some((_, quote @ ('"' | '\''))) => {
            cursor.next();
            let mut value = String::new();
            loop {
                match cursor.next() {
                    Some((_, ch)) if ch == quote => return Ok(value),
                    Some((_, ch)) => value.push(ch),
                    None => return Err(SelectorError::UnterminatedAttribute),
                }
            }
        }
        Some((position, _)) => parse_ident(cursor, position),
        None => Err(SelectorError::UnterminatedAttribute),
    }
}
