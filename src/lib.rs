#[allow(non_snake_case)]
pub mod DataParser;
#[allow(non_snake_case)]
pub mod ElectrolyteBase;
#[allow(non_snake_case)]
pub mod Equilibrium;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Transport;
#[allow(non_snake_case)]
pub mod Utils;
pub mod errors;
pub mod settings;

/// electrolyte systems and ion mobilities shipped with the crate
pub const SAMPLE_DATA: &str = include_str!("../data/electrolytes.txt");
