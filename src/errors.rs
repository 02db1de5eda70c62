//! # Error types
//!
//! Structural errors (`ParseError`, `TypeCoercionError`) abort loading of the whole data file and
//! always carry the offending line. Semantic errors (`RegistryError`, `SpeciationInputError`,
//! `ConductivityError`) are scoped to a single lookup or computation and never invalidate the
//! registry they came from.
use thiserror::Error;

/// malformed structure of the data file
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Data file is empty: no blocks found")]
    EmptyDocument,
    #[error("Line {line}: indented line appears before any block header")]
    FieldBeforeBlock { line: usize },
    #[error("Line {line}: mismatched brackets in field '{key}' of block '{block}'")]
    UnbalancedBrackets {
        line: usize,
        block: String,
        key: String,
    },
    #[error("Line {line}: empty field key in block '{block}'")]
    EmptyKey { line: usize, block: String },
    #[error("Line {line}: block '{name}' is already defined at line {first_line}")]
    DuplicateBlock {
        name: String,
        line: usize,
        first_line: usize,
    },
    #[error("Line {line}: field '{key}' is defined twice in block '{block}'")]
    DuplicateField {
        line: usize,
        block: String,
        key: String,
    },
}

/// a field's text cannot be turned into the kind of value its key requires
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Line {line}: cannot read field '{key}' of block '{block}': {reason}")]
pub struct TypeCoercionError {
    pub line: usize,
    pub block: String,
    pub key: String,
    pub reason: String,
}

/// everything that can stop a data file from loading
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Coercion(#[from] TypeCoercionError),
}

impl LoadError {
    /// 1-based line of the data file the error points at
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Parse(ParseError::EmptyDocument) => None,
            LoadError::Parse(ParseError::FieldBeforeBlock { line })
            | LoadError::Parse(ParseError::UnbalancedBrackets { line, .. })
            | LoadError::Parse(ParseError::EmptyKey { line, .. })
            | LoadError::Parse(ParseError::DuplicateBlock { line, .. })
            | LoadError::Parse(ParseError::DuplicateField { line, .. }) => Some(*line),
            LoadError::Coercion(e) => Some(e.line),
        }
    }
}

/// per-lookup errors of the record registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Unknown electrolyte record: {0}")]
    UnknownRecord(String),
    #[error("Cyclic inheritance: {}", chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },
    #[error("No mobility known for ion {0}")]
    UnknownIon(String),
}

/// per-computation errors of the speciation solver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeciationInputError {
    #[error(
        "Record '{record}': {buffer} buffer species need {expected} pKa values, found {pka}"
    )]
    LengthMismatch {
        record: String,
        buffer: usize,
        pka: usize,
        expected: usize,
    },
    #[error("Record '{record}': pKa values are not in non-decreasing order: {pka:?}")]
    NonMonotonicPka { record: String, pka: Vec<f64> },
    #[error("Record '{0}' has neither buffer species nor an anion")]
    NoSpecies(String),
    #[error("pH must be a finite number, got {0}")]
    InvalidPh(f64),
    #[error("Ionic strength must be a finite non-negative number, got {0}")]
    InvalidIonicStrength(f64),
    #[error("Record '{record}' lacks gas equilibrium data: {missing}")]
    MissingGasConstants {
        record: String,
        missing: &'static str,
    },
    #[error("Partial pressure must be a finite non-negative number, got {0}")]
    InvalidPressure(f64),
}

/// errors of the conductivity aggregator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConductivityError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Speciation(#[from] SpeciationInputError),
    #[error("Total concentration must be a finite non-negative number, got {0}")]
    InvalidConcentration(f64),
}

impl ConductivityError {
    /// name of the ion without mobility, if that is what went wrong
    pub fn unknown_ion(&self) -> Option<&str> {
        match self {
            ConductivityError::Registry(RegistryError::UnknownIon(ion)) => Some(ion.as_str()),
            _ => None,
        }
    }
}
