//! Ion and species names with charge.
//!
//! The data files encode the charge of an ion in its name: a trailing run of `+` or `-`
//! characters, the run length being the magnitude (`K+` is +1, `CO3--` is -2, `H2CO3` is neutral).
//! The charge is read once, when the name is ingested, and stored next to the name.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IonRef {
    pub name: String,
    pub charge: i32,
}

impl IonRef {
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        IonRef {
            name: name.to_string(),
            charge: charge_from_name(name),
        }
    }

    pub fn is_charged(&self) -> bool {
        self.charge != 0
    }

    pub fn abs_charge(&self) -> u32 {
        self.charge.unsigned_abs()
    }
}

impl fmt::Display for IonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Charge from the trailing run of identical `+` or `-` characters.
pub fn charge_from_name(name: &str) -> i32 {
    let name = name.trim_end();
    let sign = match name.chars().last() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return 0,
    };
    let marker = if sign > 0 { '+' } else { '-' };
    let run = name.chars().rev().take_while(|c| *c == marker).count();
    sign * run as i32
}
