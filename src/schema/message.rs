//! A tiny textual grammar for building a schema tree in tests and examples,
//! e.g. `message m { required int32 x; optional group a { repeated group b { required int32 c; } } }`.
//!
//! This is not a general schema IDL: callers who need converted/logical
//! types or more exotic grammar should build [`ParquetType`] values by hand.

use crate::error::{ParquetError, Result};
use crate::schema::types::{ParquetType, PhysicalType, Repetition};

struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return None;
        }
        let mut chars = self.rest.char_indices();
        let (_, first) = chars.next().unwrap();
        if first == '{' || first == '}' || first == ';' {
            let (tok, rest) = self.rest.split_at(1);
            self.rest = rest;
            return Some(tok);
        }
        let end = self
            .rest
            .find(|c: char| c.is_whitespace() || c == '{' || c == '}' || c == ';')
            .unwrap_or(self.rest.len());
        let (tok, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(tok)
    }

    fn peek(&mut self) -> Option<&'a str> {
        let save = self.rest;
        let tok = self.next();
        self.rest = save;
        tok
    }

    fn expect(&mut self, expected: &str) -> Result<()> {
        match self.next() {
            Some(tok) if tok == expected => Ok(()),
            other => Err(ParquetError::ConfigurationError(format!(
                "expected '{}', found {:?}",
                expected, other
            ))),
        }
    }
}

fn parse_repetition(tok: &str) -> Result<Repetition> {
    match tok.to_ascii_lowercase().as_str() {
        "required" => Ok(Repetition::Required),
        "optional" => Ok(Repetition::Optional),
        "repeated" => Ok(Repetition::Repeated),
        other => Err(ParquetError::ConfigurationError(format!(
            "expected a repetition (required/optional/repeated), found '{}'",
            other
        ))),
    }
}

fn parse_physical_type(tok: &str) -> Result<PhysicalType> {
    Ok(match tok.to_ascii_uppercase().as_str() {
        "BOOLEAN" => PhysicalType::Boolean,
        "INT32" => PhysicalType::Int32,
        "INT64" => PhysicalType::Int64,
        "INT96" => PhysicalType::Int96,
        "FLOAT" => PhysicalType::Float,
        "DOUBLE" => PhysicalType::Double,
        "BINARY" => PhysicalType::ByteArray,
        other => {
            return Err(ParquetError::ConfigurationError(format!(
                "unknown primitive type '{}'",
                other
            )))
        }
    })
}

fn parse_field(tokenizer: &mut Tokenizer) -> Result<ParquetType> {
    let repetition = parse_repetition(tokenizer.next().ok_or_else(|| {
        ParquetError::ConfigurationError("unexpected end of schema".to_string())
    })?)?;

    let kind = tokenizer
        .next()
        .ok_or_else(|| ParquetError::ConfigurationError("unexpected end of schema".to_string()))?;

    if kind.eq_ignore_ascii_case("group") {
        let name = tokenizer.next().ok_or_else(|| {
            ParquetError::ConfigurationError("expected group name".to_string())
        })?;
        let fields = parse_block(tokenizer)?;
        Ok(ParquetType::new_group(name.to_string(), repetition, fields))
    } else {
        let physical_type = parse_physical_type(kind)?;
        let name = tokenizer
            .next()
            .ok_or_else(|| ParquetError::ConfigurationError("expected field name".to_string()))?;
        tokenizer.expect(";")?;
        Ok(ParquetType::new_primitive(
            name.to_string(),
            repetition,
            physical_type,
        ))
    }
}

fn parse_block(tokenizer: &mut Tokenizer) -> Result<Vec<ParquetType>> {
    tokenizer.expect("{")?;
    let mut fields = vec![];
    while tokenizer.peek().map(|t| t != "}").unwrap_or(false) {
        fields.push(parse_field(tokenizer)?);
    }
    tokenizer.expect("}")?;
    Ok(fields)
}

/// Parses a `message name { ... }` declaration into a root [`ParquetType`].
pub fn parse_message(schema: &str) -> Result<ParquetType> {
    let mut tokenizer = Tokenizer::new(schema);
    let kw = tokenizer
        .next()
        .ok_or_else(|| ParquetError::ConfigurationError("empty schema".to_string()))?;
    if !kw.eq_ignore_ascii_case("message") {
        return Err(ParquetError::ConfigurationError(
            "schema must start with 'message'".to_string(),
        ));
    }
    let name = tokenizer
        .next()
        .ok_or_else(|| ParquetError::ConfigurationError("expected message name".to_string()))?;
    let fields = parse_block(&mut tokenizer)?;
    if tokenizer.next().is_some() {
        return Err(ParquetError::ConfigurationError(
            "trailing tokens after schema".to_string(),
        ));
    }
    Ok(ParquetType::new_root(name.to_string(), fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_schema() {
        let schema = parse_message("message m { required int32 x; optional binary y; }").unwrap();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.fields()[0].name(), "x");
        assert_eq!(schema.fields()[1].repetition(), Some(Repetition::Optional));
    }

    #[test]
    fn nested_schema() {
        let schema = parse_message(
            "message m { optional group a { repeated group b { required int32 c; } } }",
        )
        .unwrap();
        let a = &schema.fields()[0];
        assert_eq!(a.name(), "a");
        let b = &a.fields()[0];
        assert_eq!(b.repetition(), Some(Repetition::Repeated));
        let c = &b.fields()[0];
        assert_eq!(c.physical_type(), PhysicalType::Int32);
    }

    #[test]
    fn rejects_missing_repetition() {
        assert!(parse_message("message m { int32 x; }").is_err());
    }
}
