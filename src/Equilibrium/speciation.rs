//! # Speciation Solver
//!
//! ## Aim
//! Distribution of the total buffer concentration over the species of an n-protic acid-base
//! cascade at a given pH (alpha fractions).
//!
//! ## Logic
//! For species `S_0 .. S_n` (most to least protonated) and steps `pKa_1 .. pKa_n`:
//! ```text
//! log10 beta_0 = 0
//! log10 beta_i = log10 beta_(i-1) + pH - pKa_i
//! fraction_i   = beta_i / sum_j beta_j
//! ```
//! The sum is normalised in the log domain (log-sum-exp around the largest term), so pKa spans
//! like -3 .. 12.32 and pH from -5 to 20 neither overflow nor lose the dominant species.
//!
//! ## Edge cases
//! - one species and no pKa (or no buffer but an anion): that species gets fraction 1.0
//! - `len(buffer) != len(pKa) + 1`: `SpeciationInputError::LengthMismatch`
//! - decreasing pKa: `NonMonotonicPka` unless `strict_pka_order` is switched off in the settings
use crate::ElectrolyteBase::electrolyte_record::ElectrolyteRecord;
use crate::ElectrolyteBase::ions::IonRef;
use crate::errors::SpeciationInputError;
use crate::settings::EngineSettings;
use log::debug;
use prettytable::{Cell, Row, Table};
use std::f64::consts::LN_10;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesFraction {
    pub species: IonRef,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesConcentration {
    pub species: IonRef,
    /// same unit as the total concentration it was derived from
    pub concentration: f64,
}

/// equilibrium distribution of one record at one pH
#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct Speciation {
    pub record: String,
    pub pH: f64,
    pub fractions: Vec<SpeciesFraction>,
}

impl Speciation {
    pub fn fraction_of(&self, species: &str) -> Option<f64> {
        self.fractions
            .iter()
            .find(|f| f.species.name == species.trim())
            .map(|f| f.fraction)
    }

    /// species with the largest fraction
    pub fn dominant(&self) -> Option<&SpeciesFraction> {
        self.fractions
            .iter()
            .max_by(|a, b| a.fraction.total_cmp(&b.fraction))
    }

    /// sum of all fractions, 1 up to rounding
    pub fn total(&self) -> f64 {
        self.fractions.iter().map(|f| f.fraction).sum()
    }

    /// Species concentrations for a given total buffer concentration.
    pub fn concentrations(&self, total_concentration: f64) -> Vec<SpeciesConcentration> {
        self.fractions
            .iter()
            .map(|f| SpeciesConcentration {
                species: f.species.clone(),
                concentration: f.fraction * total_concentration,
            })
            .collect()
    }

    /// Mean charge per buffer unit, sum of z_i * fraction_i.
    pub fn mean_charge(&self) -> f64 {
        self.fractions
            .iter()
            .map(|f| f.species.charge as f64 * f.fraction)
            .sum()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("species"),
            Cell::new("charge"),
            Cell::new("fraction"),
        ]));
        for f in &self.fractions {
            table.add_row(Row::new(vec![
                Cell::new(&f.species.name),
                Cell::new(&f.species.charge.to_string()),
                Cell::new(&format!("{:.6e}", f.fraction)),
            ]));
        }
        table
    }

    pub fn pretty_print(&self) {
        println!("speciation of '{}' at pH {}", self.record, self.pH);
        self.to_table().printstd();
    }
}

/// log10 of the cumulative products beta_0 .. beta_n
#[allow(non_snake_case)]
pub fn log_betas(pka: &[f64], pH: f64) -> Vec<f64> {
    let mut log_beta = Vec::with_capacity(pka.len() + 1);
    let mut current = 0.0;
    log_beta.push(current);
    for pka_i in pka {
        current += pH - pka_i;
        log_beta.push(current);
    }
    log_beta
}

/// Normalised fractions from log10 betas, via log-sum-exp.
pub fn fractions_from_log_betas(log_beta: &[f64]) -> Vec<f64> {
    let max = log_beta
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let scaled: Vec<f64> = log_beta
        .iter()
        .map(|lb| ((lb - max) * LN_10).exp())
        .collect();
    let sum: f64 = scaled.iter().sum();
    scaled.into_iter().map(|s| s / sum).collect()
}

/// alpha fractions of an n-protic cascade
#[allow(non_snake_case)]
pub fn alpha_fractions(pka: &[f64], pH: f64) -> Vec<f64> {
    fractions_from_log_betas(&log_betas(pka, pH))
}

#[allow(non_snake_case)]
pub(crate) fn validate_pH(pH: f64) -> Result<(), SpeciationInputError> {
    if pH.is_finite() {
        Ok(())
    } else {
        Err(SpeciationInputError::InvalidPh(pH))
    }
}

/// Checks a record for the cascade solver and returns its species.
pub(crate) fn cascade_species(
    record: &ElectrolyteRecord,
    strict_pka_order: bool,
) -> Result<Vec<IonRef>, SpeciationInputError> {
    let species = record.species();
    if species.is_empty() && record.pka.is_empty() {
        return Err(SpeciationInputError::NoSpecies(record.name.clone()));
    }
    if record.buffer.is_empty() && !record.pka.is_empty() {
        // pKa without buffer: the anion cannot stand for a whole cascade
        return Err(SpeciationInputError::LengthMismatch {
            record: record.name.clone(),
            buffer: 0,
            pka: record.pka.len(),
            expected: record.pka.len() + 1,
        });
    }
    record.check_cascade()?;
    if strict_pka_order && !record.pka_is_ordered() {
        return Err(SpeciationInputError::NonMonotonicPka {
            record: record.name.clone(),
            pka: record.pka.clone(),
        });
    }
    Ok(species)
}

#[allow(non_snake_case)]
pub(crate) fn speciate_with_pka(
    record: &ElectrolyteRecord,
    species: Vec<IonRef>,
    pka: &[f64],
    pH: f64,
) -> Speciation {
    let fractions = if pka.is_empty() {
        // single species, no equilibrium to solve
        vec![1.0; species.len()]
    } else {
        alpha_fractions(pka, pH)
    };
    let fractions = species
        .into_iter()
        .zip(fractions)
        .map(|(species, fraction)| SpeciesFraction { species, fraction })
        .collect();
    debug!("speciation of '{}' at pH {} done", record.name, pH);
    Speciation {
        record: record.name.clone(),
        pH,
        fractions,
    }
}

/// Equilibrium fractions of the buffer species of `record` at `pH`, pKa order checked strictly.
///
/// # Arguments
/// * `record` - resolved electrolyte record
/// * `pH` - target pH
///
/// # Returns
/// * `Ok(Speciation)` - fractions in buffer order, summing to 1
/// * `Err(SpeciationInputError)` - inconsistent record or non-finite pH
///
/// # Examples
/// ```
/// use ElyTra::ElectrolyteBase::registry::parse;
/// use ElyTra::Equilibrium::speciation::speciate;
/// let registry = parse(ElyTra::SAMPLE_DATA).unwrap();
/// let carbonate = registry.resolve("carbonate").unwrap();
/// let result = speciate(&carbonate, 10.32).unwrap();
/// let hco3 = result.fraction_of("HCO3-").unwrap();
/// let co3 = result.fraction_of("CO3--").unwrap();
/// assert!((hco3 - co3).abs() < 1e-9);
/// ```
#[allow(non_snake_case)]
pub fn speciate(record: &ElectrolyteRecord, pH: f64) -> Result<Speciation, SpeciationInputError> {
    speciate_with_settings(record, pH, &EngineSettings::default())
}

/// Same as `speciate`, with the pKa order check taken from the settings.
#[allow(non_snake_case)]
pub fn speciate_with_settings(
    record: &ElectrolyteRecord,
    pH: f64,
    settings: &EngineSettings,
) -> Result<Speciation, SpeciationInputError> {
    validate_pH(pH)?;
    let species = cascade_species(record, settings.strict_pka_order)?;
    Ok(speciate_with_pka(record, species, &record.pka, pH))
}
