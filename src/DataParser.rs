/// splitting the text of a data file into named blocks of raw `key: value` fields
pub mod block_parser;
/// typing of raw field text: numbers, lists, ion references, plain strings
pub mod field_value;
/// rendering typed blocks back into the data file format
pub mod writer;
