//! Renders typed blocks back into the data file format.
//!
//! Headers at zero indent, fields tab-indented as `key: value`, string lists with single quotes,
//! `#` escaped as `\#`. Reading the output back gives the same typed blocks (line numbers aside).
use crate::DataParser::field_value::{FieldValue, TypedBlock};

fn escape(text: &str) -> String {
    text.replace('#', "\\#")
}

fn quote(text: &str) -> String {
    if text.contains('\'') {
        format!("\"{}\"", escape(text))
    } else {
        format!("'{}'", escape(text))
    }
}

pub fn format_number(x: f64) -> String {
    format!("{:?}", x)
}

pub fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(x) => format_number(*x),
        FieldValue::ScalarList(v) => format!(
            "[{}]",
            v.iter()
                .map(|x| format_number(*x))
                .collect::<Vec<String>>()
                .join(", ")
        ),
        FieldValue::StringList(v) => format!(
            "[{}]",
            v.iter().map(|s| quote(s)).collect::<Vec<String>>().join(", ")
        ),
        FieldValue::Reference(ion) => escape(&ion.name),
        FieldValue::String(s) => {
            // text that would read back as a number or a list keeps its quotes
            if crate::DataParser::field_value::parse_number(s).is_some() || s.starts_with('[') {
                quote(s)
            } else {
                escape(s)
            }
        }
    }
}

pub fn write_block(block: &TypedBlock) -> String {
    let mut out = format!("{}\n", escape(&block.name));
    for field in &block.fields {
        let value = format_value(&field.value);
        if value.is_empty() {
            out.push_str(&format!("\t{}\n", escape(&field.key)));
        } else {
            out.push_str(&format!("\t{}: {}\n", escape(&field.key), value));
        }
    }
    out
}

pub fn write_blocks(blocks: &[TypedBlock]) -> String {
    blocks
        .iter()
        .map(write_block)
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataParser::block_parser::parse_blocks;
    use crate::DataParser::field_value::{TypedField, coerce_block, field_kind};
    use crate::ElectrolyteBase::ions::IonRef;

    fn field(key: &str, value: FieldValue) -> TypedField {
        TypedField {
            key: key.to_string(),
            value,
            line: 0,
        }
    }

    #[test]
    fn writes_the_data_format() {
        let block = TypedBlock {
            name: "carbonate".to_string(),
            line: 0,
            fields: vec![
                field("cation", FieldValue::Reference(IonRef::parse("K+"))),
                field(
                    "buffer",
                    FieldValue::StringList(vec!["H2CO3".to_string(), "HCO3-".to_string()]),
                ),
                field("pKa", FieldValue::ScalarList(vec![3.6])),
                field("Keq", FieldValue::Scalar(1.7e-3)),
                field("note", FieldValue::String("see #4".to_string())),
            ],
        };
        let text = write_block(&block);
        assert_eq!(
            text,
            "carbonate\n\tcation: K+\n\tbuffer: ['H2CO3', 'HCO3-']\n\tpKa: [3.6]\n\tKeq: 0.0017\n\tnote: see \\#4\n"
        );
    }

    #[test]
    fn output_reads_back() {
        let text = "acetate\n\tcation: Na+\n\tbuffer: ['CH3COOH', 'CH3COO-']\n\tpKa: 4.76\n\tlabel: '12'\n\tflag\n";
        let raw = parse_blocks(text).unwrap();
        let typed = coerce_block(&raw[0], false).unwrap();
        let written = write_blocks(&[typed.clone()]);
        let again = coerce_block(&parse_blocks(&written).unwrap()[0], false).unwrap();
        assert_eq!(typed.name, again.name);
        let values: Vec<&FieldValue> = typed.fields.iter().map(|f| &f.value).collect();
        let values_again: Vec<&FieldValue> = again.fields.iter().map(|f| &f.value).collect();
        assert_eq!(values, values_again);
        assert_eq!(field_kind(&again.fields[2].key), field_kind("pKa"));
    }
}
