//! Ionic strength correction of the buffer cascade.
//!
//! Activity coefficients follow the Davies equation
//! `log10 gamma_z = -A z^2 (sqrt(I) / (1 + sqrt(I)) - 0.3 I)`, I in mol/L.
//! With pH read as proton activity, the concentration-based constant of step i
//! (S_(i-1) -> S_i + H+) is `pKa_i' = pKa_i + log10 gamma(S_i) - log10 gamma(S_(i-1))`.
use crate::ElectrolyteBase::electrolyte_record::ElectrolyteRecord;
use crate::ElectrolyteBase::ions::IonRef;
use crate::Equilibrium::speciation::{
    Speciation, cascade_species, speciate_with_pka, validate_pH,
};
use crate::errors::SpeciationInputError;
use crate::settings::EngineSettings;

#[allow(non_snake_case)]
pub fn davies_log_gamma(charge: i32, I: f64, A: f64) -> f64 {
    if charge == 0 {
        return 0.0;
    }
    let sqrt_i = I.sqrt();
    let z2 = (charge * charge) as f64;
    -A * z2 * (sqrt_i / (1.0 + sqrt_i) - 0.3 * I)
}

#[allow(non_snake_case)]
pub(crate) fn validate_ionic_strength(I: f64) -> Result<(), SpeciationInputError> {
    if I.is_finite() && I >= 0.0 {
        Ok(())
    } else {
        Err(SpeciationInputError::InvalidIonicStrength(I))
    }
}

/// pKa values of a cascade shifted to ionic strength `I` (mol/L).
#[allow(non_snake_case)]
pub fn corrected_pka(buffer: &[IonRef], pka: &[f64], I: f64, A: f64) -> Vec<f64> {
    pka.iter()
        .enumerate()
        .map(|(i, pka_i)| {
            match (buffer.get(i), buffer.get(i + 1)) {
                (Some(acid), Some(base)) => {
                    pka_i + davies_log_gamma(base.charge, I, A)
                        - davies_log_gamma(acid.charge, I, A)
                }
                _ => *pka_i,
            }
        })
        .collect()
}

/// Speciation at pH (proton activity) and ionic strength `I` in mol/L.
/// At I = 0 the result equals `speciate`.
///
/// # Returns
/// * `Ok(Speciation)`
/// * `Err(SpeciationInputError)` - inconsistent record, non-finite pH, negative or non-finite I
#[allow(non_snake_case)]
pub fn speciate_at_ionic_strength(
    record: &ElectrolyteRecord,
    pH: f64,
    I: f64,
    settings: &EngineSettings,
) -> Result<Speciation, SpeciationInputError> {
    validate_pH(pH)?;
    validate_ionic_strength(I)?;
    let species = cascade_species(record, settings.strict_pka_order)?;
    let pka = corrected_pka(&record.buffer, &record.pka, I, settings.davies_a);
    Ok(speciate_with_pka(record, species, &pka, pH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn davies_values() {
        assert_eq!(davies_log_gamma(0, 0.1, 0.509), 0.0);
        assert_eq!(davies_log_gamma(2, 0.0, 0.509), 0.0);
        // I = 0.1: sqrt = 0.316228, term = 0.240253 - 0.03 = 0.210253
        assert_relative_eq!(davies_log_gamma(1, 0.1, 0.509), -0.107019, epsilon = 1e-5);
        assert_relative_eq!(
            davies_log_gamma(-2, 0.1, 0.509),
            4.0 * davies_log_gamma(1, 0.1, 0.509),
            epsilon = 1e-12
        );
    }

    #[test]
    fn acetate_pka_drops_with_ionic_strength() {
        let buffer = vec![IonRef::parse("CH3COOH"), IonRef::parse("CH3COO-")];
        let shifted = corrected_pka(&buffer, &[4.76], 0.1, 0.509);
        assert_relative_eq!(shifted[0], 4.76 - 0.107019, epsilon = 1e-5);
        assert_eq!(corrected_pka(&buffer, &[4.76], 0.0, 0.509), vec![4.76]);
    }

    #[test]
    fn second_carbonate_step_shifts_by_three_gamma_units() {
        let buffer = vec![
            IonRef::parse("H2CO3"),
            IonRef::parse("HCO3-"),
            IonRef::parse("CO3--"),
        ];
        let shifted = corrected_pka(&buffer, &[3.6, 10.32], 0.1, 0.509);
        let g1 = davies_log_gamma(1, 0.1, 0.509);
        assert_relative_eq!(shifted[0], 3.6 + g1, epsilon = 1e-12);
        assert_relative_eq!(shifted[1], 10.32 + 4.0 * g1 - g1, epsilon = 1e-12);
    }

    #[test]
    fn invalid_ionic_strength() {
        assert!(validate_ionic_strength(-0.1).is_err());
        assert!(validate_ionic_strength(f64::NAN).is_err());
        assert!(validate_ionic_strength(0.0).is_ok());
    }
}
