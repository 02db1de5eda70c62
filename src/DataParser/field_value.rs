//! # Type Coercion
//!
//! Turns the raw text of a field into a typed `FieldValue`. The same syntax encodes numbers,
//! lists and bare identifiers, so the decision uses the text AND the key of the field:
//!
//! | key                                  | kind        | accepted text                  |
//! |--------------------------------------|-------------|--------------------------------|
//! | `buffer`                             | SpeciesList | `['H2CO3', 'HCO3-']`, `OH-`    |
//! | `cation`, `anion`, `spectator`, `gas`| Ion         | `K+`                           |
//! | `pKa`                                | NumberList  | `[3.6, 10.32]`, `4.76`         |
//! | `Keq`, `Kh`, `pH`, `concentration`   | Number      | `1.7e-3`, `-3`                 |
//! | `electrolyte_type`                   | Name        | `carbonate`                    |
//! | fields of the mobility table         | Number      | `7.620e-8`                     |
//! | anything else                        | Text        | number, list or plain text     |
//!
//! Keys are matched case-insensitively.
use crate::DataParser::block_parser::{RawBlock, RawField};
use crate::ElectrolyteBase::ions::IonRef;
use crate::errors::TypeCoercionError;
use regex::Regex;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("number pattern is valid")
});

/// typed value of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(f64),
    ScalarList(Vec<f64>),
    StringList(Vec<String>),
    Reference(IonRef),
    String(String),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            FieldValue::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_scalar_list(&self) -> Option<&[f64]> {
        match self {
            FieldValue::ScalarList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::StringList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&IonRef> {
        match self {
            FieldValue::Reference(ion) => Some(ion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    NumberList,
    SpeciesList,
    Ion,
    Name,
    Text,
}

/// Kind a field must have, from its key.
pub fn field_kind(key: &str) -> FieldKind {
    match key.trim().to_ascii_lowercase().as_str() {
        "buffer" => FieldKind::SpeciesList,
        "cation" | "anion" | "spectator" | "gas" => FieldKind::Ion,
        "pka" => FieldKind::NumberList,
        "keq" | "kh" | "ph" | "concentration" => FieldKind::Number,
        "electrolyte_type" => FieldKind::Name,
        _ => FieldKind::Text,
    }
}

/// field with typed value
#[derive(Debug, Clone, PartialEq)]
pub struct TypedField {
    pub key: String,
    pub value: FieldValue,
    pub line: usize,
}

/// block whose fields are all typed
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBlock {
    pub name: String,
    pub line: usize,
    pub fields: Vec<TypedField>,
}

impl TypedBlock {
    /// field by key, case-insensitive
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.key.eq_ignore_ascii_case(key))
            .map(|f| &f.value)
    }
}

/// Numeric parse that only admits plain decimal and exponent notation.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if !NUMBER.is_match(text) {
        return None;
    }
    text.parse::<f64>().ok()
}

fn unquote(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.len() >= 2 {
        for q in ['\'', '"'] {
            if text.starts_with(q) && text.ends_with(q) {
                return Some(&text[1..text.len() - 1]);
            }
        }
    }
    None
}

enum Element {
    Number(f64),
    Text(String),
}

fn split_list_items(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in inner.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                ',' => items.push(std::mem::take(&mut current)),
                '\'' | '"' if current.trim().is_empty() => {
                    quote = Some(c);
                    current.push(c);
                }
                _ => current.push(c),
            },
        }
    }
    items.push(current);
    items
}

fn parse_list(raw: &str) -> Result<Vec<Element>, String> {
    let inner = &raw[1..raw.len() - 1];
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut items = split_list_items(inner);
    // a trailing comma is allowed
    if items.len() > 1 && items.last().is_some_and(|s| s.trim().is_empty()) {
        items.pop();
    }
    let mut elements = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if item.is_empty() {
            return Err("empty list element".to_string());
        }
        if let Some(text) = unquote(item) {
            elements.push(Element::Text(text.to_string()));
            continue;
        }
        if item.contains(['[', ']']) {
            return Err(format!("nested lists are not supported: {}", raw));
        }
        match parse_number(item) {
            Some(x) if x.is_finite() => elements.push(Element::Number(x)),
            Some(_) => return Err(format!("number out of range: {}", item)),
            None => elements.push(Element::Text(item.to_string())),
        }
    }
    Ok(elements)
}

fn list_value(raw: &str, kind: FieldKind) -> Result<FieldValue, String> {
    let elements = parse_list(raw)?;
    let numbers: Vec<f64> = elements
        .iter()
        .filter_map(|e| match e {
            Element::Number(x) => Some(*x),
            Element::Text(_) => None,
        })
        .collect();
    let texts: Vec<String> = elements
        .iter()
        .filter_map(|e| match e {
            Element::Text(s) => Some(s.clone()),
            Element::Number(_) => None,
        })
        .collect();
    if !numbers.is_empty() && !texts.is_empty() {
        return Err(format!("list mixes numbers and names: {}", raw));
    }
    match kind {
        FieldKind::Number => Err(format!("expected a single number, found a list: {}", raw)),
        FieldKind::Ion => Err(format!("expected a single ion name, found a list: {}", raw)),
        FieldKind::Name => Err(format!("expected a record name, found a list: {}", raw)),
        FieldKind::NumberList => {
            if texts.is_empty() {
                Ok(FieldValue::ScalarList(numbers))
            } else {
                Err(format!("expected numbers, found names: {}", raw))
            }
        }
        FieldKind::SpeciesList => {
            if numbers.is_empty() {
                Ok(FieldValue::StringList(texts))
            } else {
                Err(format!("expected species names, found numbers: {}", raw))
            }
        }
        FieldKind::Text => {
            if texts.is_empty() {
                Ok(FieldValue::ScalarList(numbers))
            } else {
                Ok(FieldValue::StringList(texts))
            }
        }
    }
}

/// Coerces the raw text of a field to the given kind.
///
/// # Returns
/// * `Ok(FieldValue)`
/// * `Err(String)` - reason why the text does not fit the kind
pub fn coerce_value(raw: &str, kind: FieldKind) -> Result<FieldValue, String> {
    let raw = raw.trim();
    if raw.starts_with('[') && raw.ends_with(']') {
        return list_value(raw, kind);
    }
    if raw.contains(['[', ']']) {
        return Err(format!("malformed list: {}", raw));
    }
    if raw.is_empty() {
        return match kind {
            FieldKind::Number | FieldKind::NumberList => Err("missing numeric value".to_string()),
            FieldKind::Ion => Err("missing ion name".to_string()),
            FieldKind::Name => Err("missing record name".to_string()),
            FieldKind::SpeciesList => Ok(FieldValue::StringList(Vec::new())),
            FieldKind::Text => Ok(FieldValue::String(String::new())),
        };
    }
    if kind == FieldKind::Name {
        return Ok(FieldValue::String(unquote(raw).unwrap_or(raw).to_string()));
    }
    if let Some(x) = parse_number(raw) {
        if !x.is_finite() {
            return Err(format!("number out of range: {}", raw));
        }
        return match kind {
            FieldKind::Number | FieldKind::Text => Ok(FieldValue::Scalar(x)),
            FieldKind::NumberList => Ok(FieldValue::ScalarList(vec![x])),
            FieldKind::SpeciesList => Err(format!("species name cannot be a number: {}", raw)),
            FieldKind::Ion | FieldKind::Name => Err(format!("ion name cannot be a number: {}", raw)),
        };
    }
    let text = unquote(raw).unwrap_or(raw);
    match kind {
        FieldKind::Number | FieldKind::NumberList => Err(format!("'{}' is not a number", raw)),
        FieldKind::SpeciesList => Ok(FieldValue::StringList(vec![text.to_string()])),
        FieldKind::Ion => {
            if text.trim().is_empty() {
                Err("missing ion name".to_string())
            } else {
                Ok(FieldValue::Reference(IonRef::parse(text)))
            }
        }
        FieldKind::Name | FieldKind::Text => Ok(FieldValue::String(text.to_string())),
    }
}

/// Coerces one raw field, attaching block, key and line to a failure.
pub fn coerce_field(
    block: &str,
    field: &RawField,
    kind: FieldKind,
) -> Result<TypedField, TypeCoercionError> {
    let value = coerce_value(&field.value, kind).map_err(|reason| TypeCoercionError {
        line: field.line,
        block: block.to_string(),
        key: field.key.clone(),
        reason,
    })?;
    Ok(TypedField {
        key: field.key.clone(),
        value,
        line: field.line,
    })
}

/// Coerces all fields of a block. In a mobility table every field is a number.
pub fn coerce_block(block: &RawBlock, mobility_table: bool) -> Result<TypedBlock, TypeCoercionError> {
    let fields = block
        .fields
        .iter()
        .map(|field| {
            let kind = if mobility_table {
                FieldKind::Number
            } else {
                field_kind(&field.key)
            };
            coerce_field(&block.name, field, kind)
        })
        .collect::<Result<Vec<TypedField>, TypeCoercionError>>()?;
    Ok(TypedBlock {
        name: block.name.clone(),
        line: block.line,
        fields,
    })
}
