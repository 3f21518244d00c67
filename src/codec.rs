//! Variable-name codec: maps master variable names of the form
//! `y(a1|..|a7,b1|..|b7)` to `Arc`s. The inverse direction is `Arc`'s
//! `Display` implementation.

use crate::error::CodecError;
use crate::graph::{Arc, Node, VARIABLE_PREFIX};

const NEGATION_PREFIX: &str = "neg";
const FIELD_COUNT: usize = 7;

/// Whether `name` carries the pricing prefix at all.
pub fn is_pricing_variable(name: &str) -> bool {
    name.starts_with(VARIABLE_PREFIX)
}

/// Decodes a master variable name.
///
/// Returns `Ok(None)` for names without the `y(` prefix, which is the normal
/// case for variables that take no part in pricing. A prefixed name with a
/// broken structure is an error naming the offending variable.
pub fn parse_variable_name(name: &str) -> Result<Option<Arc>, CodecError> {
    let Some(rest) = name.strip_prefix(VARIABLE_PREFIX) else {
        return Ok(None);
    };
    let malformed = |reason: String| CodecError::Malformed { name: name.to_string(), reason };

    let body = rest
        .strip_suffix(')')
        .ok_or_else(|| malformed("missing closing ')'".into()))?;

    let mut nodes = body.split(',');
    let (source, target) = match (nodes.next(), nodes.next(), nodes.next()) {
        (Some(source), Some(target), None) => (source, target),
        _ => return Err(malformed("expected exactly two ','-separated nodes".into())),
    };

    let source = parse_node(source).map_err(malformed)?;
    let target = parse_node(target).map_err(malformed)?;
    Ok(Some(Arc::new(source, target)))
}

fn parse_node(block: &str) -> Result<Node, String> {
    let fields: Vec<&str> = block.split('|').collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!("expected {} '|'-separated fields, found {} in '{}'", FIELD_COUNT, fields.len(), block));
    }

    Ok(Node {
        career_group: parse_plain(fields[0])?,
        career: parse_plain(fields[1])?,
        rank: parse_signed(fields[2])?,
        time_slice: parse_signed(fields[3])?,
        status: parse_plain(fields[4])?,
        in_training: parse_bool(fields[5])?,
        network: parse_plain(fields[6])?,
    })
}

/// A non-negative decimal integer.
fn parse_plain(field: &str) -> Result<i32, String> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid index '{}' (expecting a natural number)", field));
    }
    field
        .parse::<i32>()
        .map_err(|e| format!("invalid index '{}': {}", field, e))
}

/// A natural number, optionally written `negX` for `-X`.
fn parse_signed(field: &str) -> Result<i32, String> {
    match field.strip_prefix(NEGATION_PREFIX) {
        Some(digits) => parse_plain(digits)
            .map(|value| -value)
            .map_err(|_| format!("invalid index '{}' (expecting a natural number or negX)", field)),
        None => parse_plain(field)
            .map_err(|_| format!("invalid index '{}' (expecting a natural number or negX)", field)),
    }
}

fn parse_bool(field: &str) -> Result<bool, String> {
    match field {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("invalid index '{}' (expecting true or false)", field)),
    }
}
