//! # Block Parser
//!
//! ## Aim
//! Splits the text of an electrolyte data file into an ordered sequence of named blocks.
//! Nothing is interpreted here: values stay raw text, typing is done by `field_value`.
//!
//! ## Format
//! ```text
//! # comment line
//! carbonate                      <- zero indent: block header
//!     cation: K+                 <- indented: field, ':' or '=' separates key and value
//!     pKa = [3.6, 10.32]  # note <- trailing comment
//!     flag                       <- no separator: field with an empty value
//! ```
//!
//! ## Non-Obvious Code Features
//! - a `#` inside a quoted list element is not a comment, `\#` is a literal `#`
//! - quotes are only recognised where a value or list element may start, so that an apostrophe
//!   inside plain text does not swallow the comment that follows it
//! - line numbers are 1-based and kept for every block and field, errors further up use them
use crate::errors::ParseError;

/// one `key: value` line of a block, value not yet typed
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub key: String,
    pub value: String,
    pub line: usize,
}

/// a named top-level section of the data file
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    pub name: String,
    pub line: usize,
    pub fields: Vec<RawField>,
}

impl RawBlock {
    pub fn new(name: &str, line: usize) -> Self {
        RawBlock {
            name: name.to_string(),
            line,
            fields: Vec::new(),
        }
    }
}

/// Removes the trailing comment of a line.
///
/// The first `#` that is not escaped and not inside a quoted string starts the comment.
/// `\#` is replaced by `#` in the returned text.
pub fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    // last non-whitespace character written to `out`
    let mut prev: Option<char> = None;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'#') {
            chars.next();
            out.push('#');
            prev = Some('#');
            continue;
        }
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '#' {
                    break;
                }
                if (c == '\'' || c == '"') && opens_quote(prev) {
                    quote = Some(c);
                }
            }
        }
        out.push(c);
        if !c.is_whitespace() {
            prev = Some(c);
        }
    }
    out
}

fn opens_quote(prev: Option<char>) -> bool {
    matches!(prev, None | Some('[') | Some(',') | Some(':') | Some('='))
}

/// Checks that square brackets outside quoted strings are balanced.
pub fn brackets_balanced(value: &str) -> bool {
    let mut depth: i64 = 0;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    for c in value.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                '\'' | '"' if opens_quote(prev) => quote = Some(c),
                _ => {}
            },
        }
        if !c.is_whitespace() {
            prev = Some(c);
        }
    }
    depth == 0 && quote.is_none()
}

/// Splits a field line (already without comment and indentation) into key and value.
/// The first `:` or `=` separates them; a line without separator is a key with an empty value.
fn split_field(content: &str) -> (String, String) {
    match content.find([':', '=']) {
        Some(pos) => (
            content[..pos].trim().to_string(),
            content[pos + 1..].trim().to_string(),
        ),
        None => (content.trim().to_string(), String::new()),
    }
}

/// Parses the full text of a data file into blocks, in file order.
///
/// # Arguments
/// * `text` - complete content of the data file
///
/// # Returns
/// * `Ok(Vec<RawBlock>)` - at least one block
/// * `Err(ParseError)` - empty document, a field before the first header, an empty key
///   or unbalanced brackets in a field value
pub fn parse_blocks(text: &str) -> Result<Vec<RawBlock>, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut blocks: Vec<RawBlock> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_number = i + 1;
        let content = strip_comment(line);
        if content.trim().is_empty() {
            continue;
        }
        let indented = content.starts_with([' ', '\t']);
        if !indented {
            blocks.push(RawBlock::new(content.trim(), line_number));
            continue;
        }
        let Some(block) = blocks.last_mut() else {
            return Err(ParseError::FieldBeforeBlock { line: line_number });
        };
        let (key, value) = split_field(content.trim());
        if key.is_empty() {
            return Err(ParseError::EmptyKey {
                line: line_number,
                block: block.name.clone(),
            });
        }
        if !brackets_balanced(&value) {
            return Err(ParseError::UnbalancedBrackets {
                line: line_number,
                block: block.name.clone(),
                key,
            });
        }
        block.fields.push(RawField {
            key,
            value,
            line: line_number,
        });
    }
    if blocks.is_empty() {
        return Err(ParseError::EmptyDocument);
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_after_list_keeps_the_list() {
        assert_eq!(
            strip_comment("\tpKa: [3.6, 10.32]\t# first pKa"),
            "\tpKa: [3.6, 10.32]\t"
        );
        assert_eq!(
            strip_comment("buffer: ['A#1', \"B#2\"] # tail"),
            "buffer: ['A#1', \"B#2\"] "
        );
        assert_eq!(strip_comment("note: C\\#3 # tail"), "note: C#3 ");
        assert_eq!(strip_comment("# whole line"), "");
        // apostrophe inside plain text does not hide the comment
        assert_eq!(strip_comment("note: Henry's law # tail"), "note: Henry's law ");
    }

    #[test]
    fn bracket_balance() {
        assert!(brackets_balanced("[1, 2]"));
        assert!(brackets_balanced("['[', 'b']"));
        assert!(brackets_balanced("K+"));
        assert!(!brackets_balanced("[1, 2"));
        assert!(!brackets_balanced("1, 2]"));
        assert!(!brackets_balanced("][1, 2"));
    }

    #[test]
    fn blocks_and_fields() {
        let text = "
# header comment
carbonate   # the carbonate system
\tcation: K+
\tbuffer: ['H2CO3', 'HCO3-', 'CO3--']
    Keq = 1.7e-3

carbonic acid
\tanion: CO3--
";
        let blocks = parse_blocks(text).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, "carbonate");
        assert_eq!(blocks[0].line, 3);
        assert_eq!(blocks[0].fields.len(), 3);
        assert_eq!(blocks[0].fields[0].key, "cation");
        assert_eq!(blocks[0].fields[0].value, "K+");
        assert_eq!(blocks[0].fields[1].value, "['H2CO3', 'HCO3-', 'CO3--']");
        assert_eq!(blocks[0].fields[2].key, "Keq");
        assert_eq!(blocks[0].fields[2].value, "1.7e-3");
        assert_eq!(blocks[0].fields[2].line, 6);
        assert_eq!(blocks[1].name, "carbonic acid");
        assert_eq!(
            blocks[1].fields,
            vec![RawField {
                key: "anion".to_string(),
                value: "CO3--".to_string(),
                line: 9
            }]
        );
    }

    #[test]
    fn line_without_separator_is_a_field() {
        let blocks = parse_blocks("carbonic acid\n\tCO3--\n").unwrap();
        assert_eq!(blocks[0].fields.len(), 1);
        assert_eq!(blocks[0].fields[0].key, "CO3--");
        assert_eq!(blocks[0].fields[0].value, "");
    }

    #[test]
    fn block_without_fields() {
        let blocks = parse_blocks("water\nsalt\n\tcation: Na+\n").unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].fields.is_empty());
    }

    #[test]
    fn errors() {
        assert_eq!(parse_blocks(""), Err(ParseError::EmptyDocument));
        assert_eq!(
            parse_blocks("# only\n   \n# comments\n"),
            Err(ParseError::EmptyDocument)
        );
        assert_eq!(
            parse_blocks("\n\tcation: K+\ncarbonate\n"),
            Err(ParseError::FieldBeforeBlock { line: 2 })
        );
        assert_eq!(
            parse_blocks("carbonate\n\tpKa: [3.6, 10.32\n"),
            Err(ParseError::UnbalancedBrackets {
                line: 2,
                block: "carbonate".to_string(),
                key: "pKa".to_string()
            })
        );
        assert_eq!(
            parse_blocks("carbonate\n\t: 5\n"),
            Err(ParseError::EmptyKey {
                line: 2,
                block: "carbonate".to_string()
            })
        );
    }

    #[test]
    fn sample_data_parses() {
        let blocks = parse_blocks(crate::SAMPLE_DATA).unwrap();
        assert!(blocks.iter().any(|b| b.name == "carbonate"));
        assert!(blocks.iter().any(|b| b.name == "mobilities"));
    }
}
