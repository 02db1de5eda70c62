//! # Record Registry
//!
//! ## Aim
//! Holds every block of a parsed data file, resolves electrolyte records with their
//! `electrolyte_type` inheritance, and answers mobility lookups from the mobility table.
//!
//! ## Main Data Structures and Logic
//! - `Registry`: typed blocks in file order, an index by name and the mobility table.
//!   Built once by `parse`/`parse_with_settings`, never mutated afterwards, so one registry
//!   can be shared by reference between threads.
//! - resolution merges fields shallowly: the fields of the base record are defaults, every key
//!   declared by the child replaces the base value as a whole (lists are not merged).
//! - cycles in the inheritance chain are detected with the chain of visited names.
//!
//! ## Policies
//! - duplicate block names and duplicate keys inside one block: `DuplicatePolicy::Error` (default)
//!   fails the load, `DuplicatePolicy::Override` keeps the later definition.
//! - ions missing from the mobility table are not checked at load time; `mobility()` reports them
//!   when a computation asks.
use crate::DataParser::block_parser::{RawBlock, parse_blocks};
use crate::DataParser::field_value::{FieldValue, TypedBlock, TypedField, coerce_block};
use crate::DataParser::writer::write_blocks;
use crate::ElectrolyteBase::electrolyte_record::ElectrolyteRecord;
use crate::ElectrolyteBase::ions::IonRef;
use crate::errors::{LoadError, ParseError, RegistryError, TypeCoercionError};
use crate::settings::{DuplicatePolicy, EngineSettings};
use log::{debug, info, warn};
use std::collections::HashMap;

pub const INHERITANCE_KEY: &str = "electrolyte_type";

#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// all blocks in file order, the mobility table included
    blocks: Vec<TypedBlock>,
    /// electrolyte record name -> position in `blocks`
    index: HashMap<String, usize>,
    mobilities: Vec<(IonRef, f64)>,
    mobility_index: HashMap<String, usize>,
}

/// Parses a data file with default settings.
///
/// # Examples
/// ```
/// use ElyTra::ElectrolyteBase::registry::parse;
/// let text = "acetate\n\tcation: Na+\n\tbuffer: ['CH3COOH', 'CH3COO-']\n\tpKa: 4.76\n\nmobilities\n\tNa+: 5.193e-8\n";
/// let registry = parse(text).unwrap();
/// let acetate = registry.resolve("acetate").unwrap();
/// assert_eq!(acetate.pka, vec![4.76]);
/// assert_eq!(registry.mobility("Na+").unwrap(), 5.193e-8);
/// ```
pub fn parse(text: &str) -> Result<Registry, LoadError> {
    parse_with_settings(text, &EngineSettings::default())
}

/// Parses a data file; duplicate handling and mobility block names come from `settings`.
pub fn parse_with_settings(text: &str, settings: &EngineSettings) -> Result<Registry, LoadError> {
    let raw_blocks = parse_blocks(text)?;
    Registry::from_raw_blocks(&raw_blocks, settings)
}

fn coerce_without_duplicates(
    raw: &RawBlock,
    mobility_table: bool,
    policy: DuplicatePolicy,
) -> Result<TypedBlock, LoadError> {
    let typed = coerce_block(raw, mobility_table)?;
    let mut fields: Vec<TypedField> = Vec::with_capacity(typed.fields.len());
    for field in typed.fields {
        match fields
            .iter()
            .position(|f| f.key.eq_ignore_ascii_case(&field.key))
        {
            Some(pos) => match policy {
                DuplicatePolicy::Error => {
                    return Err(ParseError::DuplicateField {
                        line: field.line,
                        block: typed.name.clone(),
                        key: field.key.clone(),
                    }
                    .into());
                }
                DuplicatePolicy::Override => {
                    warn!(
                        "field '{}' of block '{}' redefined at line {}",
                        field.key, typed.name, field.line
                    );
                    fields[pos] = field;
                }
            },
            None => fields.push(field),
        }
    }
    Ok(TypedBlock {
        name: typed.name,
        line: typed.line,
        fields,
    })
}

impl Registry {
    /// Types all raw blocks and indexes them.
    ///
    /// # Returns
    /// * `Ok(Registry)`
    /// * `Err(LoadError)` - the first structural or coercion error in file order
    pub fn from_raw_blocks(
        raw_blocks: &[RawBlock],
        settings: &EngineSettings,
    ) -> Result<Self, LoadError> {
        let policy = settings.duplicate_policy;
        let mut registry = Registry::default();
        for raw in raw_blocks {
            let mobility_table = settings.is_mobility_block(&raw.name);
            let block = coerce_without_duplicates(raw, mobility_table, policy)?;
            if mobility_table {
                registry.add_mobilities(&block, policy)?;
                registry.blocks.push(block);
                continue;
            }
            match registry.index.get(&block.name) {
                Some(&pos) => match policy {
                    DuplicatePolicy::Error => {
                        return Err(ParseError::DuplicateBlock {
                            name: block.name.clone(),
                            line: block.line,
                            first_line: registry.blocks[pos].line,
                        }
                        .into());
                    }
                    DuplicatePolicy::Override => {
                        warn!(
                            "block '{}' redefined at line {}, earlier definition at line {} dropped",
                            block.name, block.line, registry.blocks[pos].line
                        );
                        registry.blocks[pos] = block;
                    }
                },
                None => {
                    registry.index.insert(block.name.clone(), registry.blocks.len());
                    registry.blocks.push(block);
                }
            }
        }
        info!(
            "registry built: {} electrolyte records, {} ion mobilities",
            registry.index.len(),
            registry.mobilities.len()
        );
        Ok(registry)
    }

    fn add_mobilities(&mut self, block: &TypedBlock, policy: DuplicatePolicy) -> Result<(), LoadError> {
        for field in &block.fields {
            let Some(mobility) = field.value.as_scalar() else {
                continue;
            };
            if mobility < 0.0 {
                return Err(TypeCoercionError {
                    line: field.line,
                    block: block.name.clone(),
                    key: field.key.clone(),
                    reason: format!("mobility must not be negative, got {}", mobility),
                }
                .into());
            }
            let ion = IonRef::parse(&field.key);
            match self.mobility_index.get(&ion.name) {
                Some(&pos) => match policy {
                    DuplicatePolicy::Error => {
                        return Err(ParseError::DuplicateField {
                            line: field.line,
                            block: block.name.clone(),
                            key: field.key.clone(),
                        }
                        .into());
                    }
                    DuplicatePolicy::Override => {
                        warn!("mobility of {} redefined at line {}", ion.name, field.line);
                        self.mobilities[pos].1 = mobility;
                    }
                },
                None => {
                    self.mobility_index
                        .insert(ion.name.clone(), self.mobilities.len());
                    self.mobilities.push((ion, mobility));
                }
            }
        }
        Ok(())
    }

    /// Resolves a record by name, merging in its `electrolyte_type` chain.
    ///
    /// # Returns
    /// * `Ok(ElectrolyteRecord)`
    /// * `Err(RegistryError::UnknownRecord)` - the record or one of its bases does not exist
    /// * `Err(RegistryError::CyclicInheritance)` - the chain comes back to a visited record
    pub fn resolve(&self, name: &str) -> Result<ElectrolyteRecord, RegistryError> {
        let name = name.trim();
        let mut chain: Vec<String> = Vec::new();
        let fields = self.merged_fields(name, &mut chain)?;
        debug!("record '{}' resolved through {:?}", name, chain);
        let record = ElectrolyteRecord::from_fields(name, &fields);
        if let Err(e) = record.check_cascade() {
            warn!("{}", e);
        }
        if !record.pka_is_ordered() {
            warn!(
                "record '{}': pKa values are not in non-decreasing order: {:?}",
                name, record.pka
            );
        }
        Ok(record)
    }

    fn merged_fields(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<Vec<TypedField>, RegistryError> {
        if chain.iter().any(|visited| visited == name) {
            chain.push(name.to_string());
            return Err(RegistryError::CyclicInheritance {
                chain: chain.clone(),
            });
        }
        let block = self
            .block(name)
            .ok_or_else(|| RegistryError::UnknownRecord(name.to_string()))?;
        chain.push(name.to_string());
        let base = match block.get(INHERITANCE_KEY) {
            Some(FieldValue::String(base)) => Some(base.trim().to_string()),
            _ => None,
        };
        let Some(base) = base else {
            return Ok(block.fields.clone());
        };
        let mut merged = self.merged_fields(&base, chain)?;
        for field in &block.fields {
            match merged
                .iter_mut()
                .find(|f| f.key.eq_ignore_ascii_case(&field.key))
            {
                Some(slot) => *slot = field.clone(),
                None => merged.push(field.clone()),
            }
        }
        Ok(merged)
    }

    /// All records that resolve, in file order. Failures are logged and skipped.
    pub fn all(&self) -> Vec<ElectrolyteRecord> {
        self.try_all()
            .into_iter()
            .filter_map(|(name, result)| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("record '{}' skipped: {}", name, e);
                    None
                }
            })
            .collect()
    }

    /// Every record name with its resolution result, in file order.
    pub fn try_all(&self) -> Vec<(String, Result<ElectrolyteRecord, RegistryError>)> {
        self.names()
            .into_iter()
            .map(|name| {
                let result = self.resolve(&name);
                (name, result)
            })
            .collect()
    }

    /// Electrolyte record names in file order (the mobility table excluded).
    pub fn names(&self) -> Vec<String> {
        let mut positions: Vec<(&String, &usize)> = self.index.iter().collect();
        positions.sort_by_key(|(_, pos)| **pos);
        positions.into_iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name.trim())
    }

    /// Typed block of an electrolyte record, without inheritance applied.
    pub fn block(&self, name: &str) -> Option<&TypedBlock> {
        self.index.get(name.trim()).map(|&pos| &self.blocks[pos])
    }

    pub fn blocks(&self) -> &[TypedBlock] {
        &self.blocks
    }

    /// Mobility of an ion in m^2/(V*s).
    pub fn mobility(&self, ion_name: &str) -> Result<f64, RegistryError> {
        let ion_name = ion_name.trim();
        self.mobility_index
            .get(ion_name)
            .map(|&pos| self.mobilities[pos].1)
            .ok_or_else(|| RegistryError::UnknownIon(ion_name.to_string()))
    }

    pub fn lookup_mobility(&self, ion_name: &str) -> Result<f64, RegistryError> {
        self.mobility(ion_name)
    }

    /// ions with mobility, in file order
    pub fn mobility_table(&self) -> &[(IonRef, f64)] {
        &self.mobilities
    }

    /// Renders the registry back into the data file format.
    pub fn to_text(&self) -> String {
        write_blocks(&self.blocks)
    }
}
