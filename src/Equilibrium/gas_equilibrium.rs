//! # Gas pre-equilibrium
//!
//! Records with `gas`, `Kh` and `Keq` (the carbonate family) take a dissolved gas into account
//! before the proton cascade starts:
//! ```text
//! CO2(g)  <=> CO2(aq)        c_aq   = p / Kh
//! CO2(aq) <=> H2CO3          [S_0]  = Keq * c_aq
//! S_0 <=> S_1 + H+ ...       [S_i]  = [S_0] * beta_i
//! ```
//! The partial pressure is given in the pressure unit of `Kh`, concentrations come out in its
//! concentration unit (atm and mol/L for the bundled data).
//! This stage is separate from `speciation` and only used for records that carry the constants.
use crate::ElectrolyteBase::electrolyte_record::ElectrolyteRecord;
use crate::ElectrolyteBase::ions::IonRef;
use crate::Equilibrium::speciation::{
    Speciation, SpeciesConcentration, SpeciesFraction, cascade_species, fractions_from_log_betas,
    log_betas, validate_pH,
};
use crate::errors::SpeciationInputError;
use crate::settings::EngineSettings;
use log::info;
use std::f64::consts::LN_10;

#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct GasEquilibrium {
    pub record: String,
    pub gas: IonRef,
    pub partial_pressure: f64,
    pub pH: f64,
    /// concentration of the dissolved, unhydrated gas
    pub dissolved_gas: f64,
    /// buffer species concentrations in cascade order
    pub species: Vec<SpeciesConcentration>,
    pub total_buffer: f64,
    /// the buffer part as fractions, comparable with `speciate`
    pub speciation: Speciation,
}

impl GasEquilibrium {
    /// dissolved gas plus all buffer species
    pub fn total_dissolved(&self) -> f64 {
        self.dissolved_gas + self.total_buffer
    }
}

fn gas_of(record: &ElectrolyteRecord) -> Result<IonRef, SpeciationInputError> {
    record
        .gas
        .clone()
        .ok_or_else(|| SpeciationInputError::MissingGasConstants {
            record: record.name.clone(),
            missing: "gas",
        })
}

/// Concentration of dissolved gas at partial pressure `partial_pressure` (Henry's law with `Kh`).
pub fn dissolved_gas(
    record: &ElectrolyteRecord,
    partial_pressure: f64,
) -> Result<f64, SpeciationInputError> {
    gas_of(record)?;
    if !partial_pressure.is_finite() || partial_pressure < 0.0 {
        return Err(SpeciationInputError::InvalidPressure(partial_pressure));
    }
    match record.kh {
        Some(kh) if kh > 0.0 => Ok(partial_pressure / kh),
        Some(_) => Err(SpeciationInputError::MissingGasConstants {
            record: record.name.clone(),
            missing: "positive Kh",
        }),
        None => Err(SpeciationInputError::MissingGasConstants {
            record: record.name.clone(),
            missing: "Kh",
        }),
    }
}

/// Full chain gas -> dissolved gas -> first buffer species -> cascade at `pH`.
///
/// # Arguments
/// * `record` - record with `gas`, `Kh` and `Keq`
/// * `partial_pressure` - partial pressure of the gas, unit of `Kh`
/// * `pH` - pH of the solution
#[allow(non_snake_case)]
pub fn gas_equilibrium(
    record: &ElectrolyteRecord,
    partial_pressure: f64,
    pH: f64,
) -> Result<GasEquilibrium, SpeciationInputError> {
    gas_equilibrium_with_settings(record, partial_pressure, pH, &EngineSettings::default())
}

#[allow(non_snake_case)]
pub fn gas_equilibrium_with_settings(
    record: &ElectrolyteRecord,
    partial_pressure: f64,
    pH: f64,
    settings: &EngineSettings,
) -> Result<GasEquilibrium, SpeciationInputError> {
    validate_pH(pH)?;
    let gas = gas_of(record)?;
    let c_aq = dissolved_gas(record, partial_pressure)?;
    let keq = record
        .keq
        .ok_or_else(|| SpeciationInputError::MissingGasConstants {
            record: record.name.clone(),
            missing: "Keq",
        })?;
    let species = cascade_species(record, settings.strict_pka_order)?;
    let first = keq * c_aq;
    let log_beta = log_betas(&record.pka, pH);
    let fractions = fractions_from_log_betas(&log_beta);
    let concentrations: Vec<SpeciesConcentration> = species
        .iter()
        .zip(&log_beta)
        .map(|(species, lb)| SpeciesConcentration {
            species: species.clone(),
            concentration: first * (lb * LN_10).exp(),
        })
        .collect();
    let speciation = Speciation {
        record: record.name.clone(),
        pH,
        fractions: species
            .into_iter()
            .zip(fractions)
            .map(|(species, fraction)| SpeciesFraction { species, fraction })
            .collect(),
    };
    let total_buffer: f64 = concentrations.iter().map(|s| s.concentration).sum();
    info!(
        "'{}': {} at partial pressure {} gives {:.4e} dissolved, {:.4e} in buffer species at pH {}",
        record.name, gas.name, partial_pressure, c_aq, total_buffer, pH
    );
    Ok(GasEquilibrium {
        record: record.name.clone(),
        gas,
        partial_pressure,
        pH,
        dissolved_gas: c_aq,
        species: concentrations,
        total_buffer,
        speciation,
    })
}

/// First pKa of the cascade when the dissolved gas is counted as part of the acid,
/// `pKa_1 + log10(1 + 1/Keq)`; about 6.37 for the carbonate data.
pub fn apparent_first_pka(record: &ElectrolyteRecord) -> Option<f64> {
    let keq = record.keq.filter(|k| *k > 0.0)?;
    let pka_1 = record.pka.first()?;
    Some(pka_1 + (1.0 + 1.0 / keq).log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElectrolyteBase::registry::parse;
    use crate::SAMPLE_DATA;
    use approx::assert_relative_eq;

    fn carbonate() -> ElectrolyteRecord {
        parse(SAMPLE_DATA).unwrap().resolve("carbonate").unwrap()
    }

    #[test]
    fn henry_law_step() {
        let record = carbonate();
        assert_relative_eq!(dissolved_gas(&record, 1.0).unwrap(), 1.0 / 29.6, epsilon = 1e-12);
        assert_eq!(dissolved_gas(&record, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn chain_at_first_pka() {
        let record = carbonate();
        let eq = gas_equilibrium(&record, 1.0, 3.6).unwrap();
        assert_eq!(eq.gas, IonRef::parse("CO2"));
        let h2co3 = 1.7e-3 / 29.6;
        assert_relative_eq!(eq.species[0].concentration, h2co3, max_relative = 1e-10);
        assert_relative_eq!(eq.species[1].concentration, h2co3, max_relative = 1e-10);
        assert!(eq.species[2].concentration < 1e-6 * h2co3);
        assert_relative_eq!(
            eq.total_dissolved(),
            eq.dissolved_gas + eq.total_buffer,
            epsilon = 1e-15
        );
        assert_relative_eq!(eq.speciation.total(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            eq.speciation.fraction_of("HCO3-").unwrap(),
            eq.species[1].concentration / eq.total_buffer,
            max_relative = 1e-10
        );
    }

    #[test]
    fn zero_pressure_gives_empty_solution() {
        let eq = gas_equilibrium(&carbonate(), 0.0, 8.0).unwrap();
        assert_eq!(eq.total_dissolved(), 0.0);
        assert_relative_eq!(eq.speciation.total(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn apparent_pka_of_carbonic_acid() {
        let pka = apparent_first_pka(&carbonate()).unwrap();
        assert_relative_eq!(pka, 6.370, epsilon = 1e-3);
    }

    #[test]
    fn missing_constants_and_bad_pressure() {
        let registry = parse(SAMPLE_DATA).unwrap();
        let acetate = registry.resolve("acetate").unwrap();
        assert_eq!(
            gas_equilibrium(&acetate, 1.0, 7.0),
            Err(SpeciationInputError::MissingGasConstants {
                record: "acetate".to_string(),
                missing: "gas",
            })
        );
        assert_eq!(apparent_first_pka(&acetate), None);
        let no_kh = parse("co2\n\tgas: CO2\n\tKeq: 1.7e-3\n\tbuffer: ['H2CO3', 'HCO3-']\n\tpKa: 3.6\n")
            .unwrap()
            .resolve("co2")
            .unwrap();
        assert!(matches!(
            gas_equilibrium(&no_kh, 1.0, 7.0),
            Err(SpeciationInputError::MissingGasConstants { missing: "Kh", .. })
        ));
        assert_eq!(
            gas_equilibrium(&carbonate(), -1.0, 7.0),
            Err(SpeciationInputError::InvalidPressure(-1.0))
        );
        assert!(matches!(
            gas_equilibrium(&carbonate(), 1.0, f64::NAN),
            Err(SpeciationInputError::InvalidPh(_))
        ));
    }
}
