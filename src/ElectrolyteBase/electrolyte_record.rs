use crate::DataParser::field_value::{FieldValue, TypedField};
use crate::ElectrolyteBase::ions::IonRef;
use crate::errors::SpeciationInputError;

/// A resolved electrolyte system: own fields merged over the fields of its base record.
///
/// `buffer` lists the species of the acid-base cascade from the most to the least protonated,
/// `pka` the dissociation steps between them, so `buffer.len() == pka.len() + 1` for a
/// consistent record. Sparse records (no buffer, no pKa) are legal.
#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct ElectrolyteRecord {
    pub name: String,
    /// direct parent given by `electrolyte_type`
    pub base: Option<String>,
    pub cation: Option<IonRef>,
    pub anion: Option<IonRef>,
    pub spectator: Option<IonRef>,
    pub buffer: Vec<IonRef>,
    pub pka: Vec<f64>,
    /// equilibrium constant of the dissolved gas hydration, e.g. [H2CO3]/[CO2(aq)]
    pub keq: Option<f64>,
    /// Henry constant, partial pressure over dissolved concentration
    pub kh: Option<f64>,
    pub gas: Option<IonRef>,
    pub pH: Option<f64>,
    /// mol/m^3
    pub concentration: Option<f64>,
    /// fields without a dedicated slot, in file order
    pub extra: Vec<(String, FieldValue)>,
}

impl ElectrolyteRecord {
    pub fn new(name: &str) -> Self {
        ElectrolyteRecord {
            name: name.to_string(),
            base: None,
            cation: None,
            anion: None,
            spectator: None,
            buffer: Vec::new(),
            pka: Vec::new(),
            keq: None,
            kh: None,
            gas: None,
            pH: None,
            concentration: None,
            extra: Vec::new(),
        }
    }

    /// Builds the record from already merged fields.
    /// A value whose variant does not fit its slot is kept in `extra`.
    pub fn from_fields(name: &str, fields: &[TypedField]) -> Self {
        let mut record = ElectrolyteRecord::new(name);
        for field in fields {
            let key = field.key.to_ascii_lowercase();
            match (key.as_str(), &field.value) {
                ("electrolyte_type", FieldValue::String(base)) => {
                    record.base = Some(base.clone())
                }
                ("cation", FieldValue::Reference(ion)) => record.cation = Some(ion.clone()),
                ("anion", FieldValue::Reference(ion)) => record.anion = Some(ion.clone()),
                ("spectator", FieldValue::Reference(ion)) => record.spectator = Some(ion.clone()),
                ("gas", FieldValue::Reference(ion)) => record.gas = Some(ion.clone()),
                ("buffer", FieldValue::StringList(species)) => {
                    record.buffer = species.iter().map(|s| IonRef::parse(s)).collect()
                }
                ("pka", FieldValue::ScalarList(pka)) => record.pka = pka.clone(),
                ("pka", FieldValue::Scalar(pka)) => record.pka = vec![*pka],
                ("keq", FieldValue::Scalar(x)) => record.keq = Some(*x),
                ("kh", FieldValue::Scalar(x)) => record.kh = Some(*x),
                ("ph", FieldValue::Scalar(x)) => record.pH = Some(*x),
                ("concentration", FieldValue::Scalar(x)) => record.concentration = Some(*x),
                _ => record.extra.push((field.key.clone(), field.value.clone())),
            }
        }
        record
    }

    /// Species taking part in speciation: the buffer cascade, or the anion alone when the
    /// record has no buffer list.
    pub fn species(&self) -> Vec<IonRef> {
        if !self.buffer.is_empty() {
            self.buffer.clone()
        } else {
            self.anion.iter().cloned().collect()
        }
    }

    /// Checks `len(buffer) == len(pKa) + 1`. A record without buffer and without pKa passes.
    pub fn check_cascade(&self) -> Result<(), SpeciationInputError> {
        if self.buffer.is_empty() && self.pka.is_empty() {
            return Ok(());
        }
        if self.buffer.len() != self.pka.len() + 1 {
            return Err(SpeciationInputError::LengthMismatch {
                record: self.name.clone(),
                buffer: self.buffer.len(),
                pka: self.pka.len(),
                expected: self.pka.len() + 1,
            });
        }
        Ok(())
    }

    pub fn pka_is_ordered(&self) -> bool {
        self.pka.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn has_gas_equilibrium(&self) -> bool {
        self.gas.is_some() && self.kh.is_some() && self.keq.is_some()
    }

    /// Field without a dedicated slot, case-insensitive.
    pub fn extra_field(&self, key: &str) -> Option<&FieldValue> {
        self.extra
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }
}
