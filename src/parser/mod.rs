//! PKL Parser Module
//! Parses the textual CSM projection back into description records

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::description::CollaborativeStateMachineDescription;

mod loader;

#[cfg(test)]
mod tests;

pub use loader::{load_file, loader_for_path, DescriptionLoader, JsonLoader, PklLoader};

#[derive(Parser)]
#[grammar = "parser/pkl.pest"]
pub struct PklParser;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    PestError(#[from] pest::error::Error<Rule>),
    #[error("Invalid syntax at line {line}: {message}")]
    SyntaxError { line: usize, message: String },
    #[error("Block '{key}' mixes list elements with properties")]
    MixedBlock { key: String },
    #[error("Duplicate key '{key}'")]
    DuplicateKey { key: String },
    #[error("Description does not match the schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("Cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported file extension: {0}")]
    UnsupportedFormat(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse PKL source into a collaborative state machine description.
pub fn parse_pkl(source: &str) -> ParseResult<CollaborativeStateMachineDescription> {
    let value = parse_pkl_value(source)?;
    Ok(serde_json::from_value(value)?)
}

/// Parse PKL source into a generic value tree.
///
/// A block holding only `new { ... }` elements, or nothing at all, becomes an
/// array; a block holding properties or nested objects becomes an object.
pub fn parse_pkl_value(source: &str) -> ParseResult<Value> {
    let file = next_pair(&mut PklParser::parse(Rule::file, source)?, "file")?;
    let members = file
        .into_inner()
        .filter(|pair| !matches!(pair.as_rule(), Rule::header | Rule::EOI));
    let value = block_to_value("<root>", members)?;

    match value {
        Value::Array(items) if items.is_empty() => Ok(Value::Object(Map::new())),
        Value::Array(_) => Err(ParseError::MixedBlock {
            key: "<root>".to_string(),
        }),
        object => Ok(object),
    }
}

fn block_to_value<'a>(key: &str, members: impl Iterator<Item = Pair<'a, Rule>>) -> ParseResult<Value> {
    let mut elements = Vec::new();
    let mut fields = Map::new();

    for member in members {
        match member.as_rule() {
            Rule::element => {
                let body = next_pair(&mut member.into_inner(), "element body")?;
                elements.push(block_to_value(key, body.into_inner())?);
            }
            Rule::property => {
                let mut inner = member.into_inner();
                let name = next_pair(&mut inner, "property key")?.as_str().to_string();
                let value = scalar_to_value(next_pair(&mut inner, "property value")?)?;
                insert_field(&mut fields, name, value)?;
            }
            Rule::object => {
                let mut inner = member.into_inner();
                let name = next_pair(&mut inner, "object key")?.as_str().to_string();
                let body = next_pair(&mut inner, "object body")?;
                let value = block_to_value(&name, body.into_inner())?;
                insert_field(&mut fields, name, value)?;
            }
            _ => {}
        }
    }

    match (elements.is_empty(), fields.is_empty()) {
        (false, false) => Err(ParseError::MixedBlock {
            key: key.to_string(),
        }),
        (_, true) => Ok(Value::Array(elements)),
        (true, false) => Ok(Value::Object(fields)),
    }
}

fn insert_field(fields: &mut Map<String, Value>, key: String, value: Value) -> ParseResult<()> {
    if fields.contains_key(&key) {
        return Err(ParseError::DuplicateKey { key });
    }
    fields.insert(key, value);
    Ok(())
}

fn scalar_to_value(pair: Pair<Rule>) -> ParseResult<Value> {
    match pair.as_rule() {
        Rule::boolean => Ok(Value::Bool(pair.as_str() == "true")),
        Rule::bare => Ok(Value::String(pair.as_str().to_string())),
        Rule::string => {
            let text = next_pair(&mut pair.into_inner(), "string text")?;
            Ok(Value::String(unescape(text.as_str())))
        }
        _ => Err(syntax_error(&pair, "expected a string, boolean or identifier")),
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn next_pair<'a>(pairs: &mut Pairs<'a, Rule>, what: &str) -> ParseResult<Pair<'a, Rule>> {
    pairs.next().ok_or_else(|| ParseError::SyntaxError {
        line: 0,
        message: format!("missing {what}"),
    })
}

fn syntax_error(pair: &Pair<Rule>, message: &str) -> ParseError {
    ParseError::SyntaxError {
        line: pair.line_col().0,
        message: format!("{message}, found '{}'", pair.as_str()),
    }
}
