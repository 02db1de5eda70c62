//! # Conductivity Aggregator
//!
//! ## Aim
//! Specific conductivity of an electrolyte solution from the speciation of its buffer,
//! the counter-ion needed for electroneutrality and the limiting ionic mobilities of the registry.
//!
//! ## Logic
//! ```text
//! lambda_i = |z_i| * F * mu_i                       S*m^2/mol
//! kappa    = sum_i c_i * lambda_i                   S/m, c_i in mol/m^3
//! ```
//! Ions of the solution:
//! - charged buffer species, `c_i = fraction_i * c_total`
//! - the spectator ion at `c_total`
//! - the cation at the concentration that makes the solution neutral,
//!   `c_cat = max(0, -(sum z_i c_i + z_spec c_spec)) / z_cat`
//!
//! Neutral species carry no current and are not looked up. Every charged ion listed by the record
//! must have a mobility, even at zero concentration; a missing one is reported as
//! `RegistryError::UnknownIon`, never replaced by zero.
use crate::ElectrolyteBase::electrolyte_record::ElectrolyteRecord;
use crate::ElectrolyteBase::ions::IonRef;
use crate::ElectrolyteBase::registry::Registry;
use crate::Equilibrium::speciation::{SpeciesFraction, speciate_with_settings};
use crate::errors::{ConductivityError, RegistryError};
use crate::settings::{EngineSettings, FARADAY};
use log::{info, warn};
use prettytable::{Cell, Row, Table};

/// what one ion adds to the conductivity
#[derive(Debug, Clone, PartialEq)]
pub struct IonContribution {
    pub ion: IonRef,
    /// mol/m^3
    pub concentration: f64,
    /// m^2/(V*s)
    pub mobility: f64,
    /// S*m^2/mol
    pub molar_conductivity: f64,
    /// S/m
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConductivityReport {
    pub record: String,
    /// mol/m^3
    pub total_concentration: f64,
    pub ions: Vec<IonContribution>,
    /// S/m
    pub conductivity: f64,
    /// mol/m^3
    pub ionic_strength: f64,
}

impl ConductivityReport {
    pub fn contribution_of(&self, ion: &str) -> Option<&IonContribution> {
        self.ions.iter().find(|c| c.ion.name == ion.trim())
    }

    /// Net charge in mol/m^3, zero up to rounding unless the record has no cation to balance.
    pub fn net_charge(&self) -> f64 {
        self.ions
            .iter()
            .map(|c| c.ion.charge as f64 * c.concentration)
            .sum()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("ion"),
            Cell::new("z"),
            Cell::new("c, mol/m^3"),
            Cell::new("mu, m^2/(V*s)"),
            Cell::new("lambda, S*m^2/mol"),
            Cell::new("kappa_i, S/m"),
        ]));
        for c in &self.ions {
            table.add_row(Row::new(vec![
                Cell::new(&c.ion.name),
                Cell::new(&c.ion.charge.to_string()),
                Cell::new(&format!("{:.6e}", c.concentration)),
                Cell::new(&format!("{:.4e}", c.mobility)),
                Cell::new(&format!("{:.4e}", c.molar_conductivity)),
                Cell::new(&format!("{:.6e}", c.contribution)),
            ]));
        }
        table
    }

    pub fn pretty_print(&self) {
        println!(
            "conductivity of '{}' at {} mol/m^3: {:.6e} S/m, ionic strength {:.6e} mol/m^3",
            self.record, self.total_concentration, self.conductivity, self.ionic_strength
        );
        self.to_table().printstd();
    }
}

fn lambda(ion: &IonRef, registry: &Registry, faraday: f64) -> Result<(f64, f64), RegistryError> {
    let mobility = registry.mobility(&ion.name)?;
    Ok((mobility, ion.abs_charge() as f64 * faraday * mobility))
}

/// Molar conductivity `|z| F mu` of an ion, S*m^2/mol. Neutral species give 0 without a lookup.
pub fn molar_conductivity(ion: &IonRef, registry: &Registry) -> Result<f64, RegistryError> {
    if !ion.is_charged() {
        return Ok(0.0);
    }
    lambda(ion, registry, FARADAY).map(|(_, l)| l)
}

/// `0.5 * sum c_i z_i^2`, in the unit of the concentrations.
pub fn ionic_strength(ions: &[(IonRef, f64)]) -> f64 {
    0.5 * ions
        .iter()
        .map(|(ion, c)| (ion.charge * ion.charge) as f64 * c)
        .sum::<f64>()
}

/// Charged ions of the solution with their concentrations: buffer species, spectator,
/// then the balancing cation.
pub fn solution_ions(
    record: &ElectrolyteRecord,
    fractions: &[SpeciesFraction],
    total_concentration: f64,
) -> Vec<(IonRef, f64)> {
    let mut ions: Vec<(IonRef, f64)> = fractions
        .iter()
        .filter(|f| f.species.is_charged())
        .map(|f| (f.species.clone(), f.fraction * total_concentration))
        .collect();
    if let Some(spectator) = record.spectator.as_ref().filter(|s| s.is_charged()) {
        ions.push((spectator.clone(), total_concentration));
    }
    let charge: f64 = ions
        .iter()
        .map(|(ion, c)| ion.charge as f64 * c)
        .sum();
    match record.cation.as_ref() {
        Some(cation) if cation.charge > 0 => {
            let c_cat = (-charge).max(0.0) / cation.charge as f64;
            ions.push((cation.clone(), c_cat));
        }
        Some(cation) => warn!(
            "record '{}': cation {} carries no positive charge, it is left out",
            record.name, cation.name
        ),
        None if charge < 0.0 => warn!(
            "record '{}' has no cation, net charge {:.4e} mol/m^3 is not balanced",
            record.name, charge
        ),
        None => {}
    }
    ions
}

fn validate_concentration(total_concentration: f64) -> Result<(), ConductivityError> {
    if total_concentration.is_finite() && total_concentration >= 0.0 {
        Ok(())
    } else {
        Err(ConductivityError::InvalidConcentration(total_concentration))
    }
}

/// Per-ion breakdown of the conductivity.
///
/// # Arguments
/// * `record` - resolved record, supplies cation and spectator
/// * `fractions` - speciation of the buffer, as returned by `speciate`
/// * `total_concentration` - total buffer concentration, mol/m^3
/// * `registry` - source of the mobilities
/// * `settings` - Faraday constant
///
/// # Returns
/// * `Ok(ConductivityReport)`
/// * `Err(ConductivityError::Registry(UnknownIon))` - a charged ion has no mobility
/// * `Err(ConductivityError::InvalidConcentration)` - negative or non-finite total concentration
pub fn conductivity_report(
    record: &ElectrolyteRecord,
    fractions: &[SpeciesFraction],
    total_concentration: f64,
    registry: &Registry,
    settings: &EngineSettings,
) -> Result<ConductivityReport, ConductivityError> {
    validate_concentration(total_concentration)?;
    let ions = solution_ions(record, fractions, total_concentration);
    let mut contributions = Vec::with_capacity(ions.len());
    for (ion, concentration) in &ions {
        let (mobility, molar_conductivity) = lambda(ion, registry, settings.faraday)?;
        contributions.push(IonContribution {
            ion: ion.clone(),
            concentration: *concentration,
            mobility,
            molar_conductivity,
            contribution: concentration * molar_conductivity,
        });
    }
    let conductivity: f64 = contributions.iter().map(|c| c.contribution).sum();
    let report = ConductivityReport {
        record: record.name.clone(),
        total_concentration,
        ions: contributions,
        conductivity,
        ionic_strength: ionic_strength(&ions),
    };
    info!(
        "'{}' at {} mol/m^3: conductivity {:.6e} S/m from {} ions",
        record.name,
        total_concentration,
        report.conductivity,
        report.ions.len()
    );
    Ok(report)
}

/// Specific conductivity in S/m, Faraday constant from the settings.
pub fn conductivity_with_settings(
    record: &ElectrolyteRecord,
    fractions: &[SpeciesFraction],
    total_concentration: f64,
    registry: &Registry,
    settings: &EngineSettings,
) -> Result<f64, ConductivityError> {
    conductivity_report(record, fractions, total_concentration, registry, settings)
        .map(|report| report.conductivity)
}

/// Specific conductivity in S/m of `record` with the given buffer `fractions`
/// and total concentration in mol/m^3.
pub fn conductivity(
    record: &ElectrolyteRecord,
    fractions: &[SpeciesFraction],
    total_concentration: f64,
    registry: &Registry,
) -> Result<f64, ConductivityError> {
    conductivity_with_settings(
        record,
        fractions,
        total_concentration,
        registry,
        &EngineSettings::default(),
    )
}

/// Speciation at `pH` followed by the conductivity report.
#[allow(non_snake_case)]
pub fn solution_conductivity(
    record: &ElectrolyteRecord,
    pH: f64,
    total_concentration: f64,
    registry: &Registry,
    settings: &EngineSettings,
) -> Result<ConductivityReport, ConductivityError> {
    let speciation = speciate_with_settings(record, pH, settings)?;
    conductivity_report(
        record,
        &speciation.fractions,
        total_concentration,
        registry,
        settings,
    )
}
