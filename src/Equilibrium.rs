/// alpha fractions of a polyprotic buffer cascade at a given pH
///
/// # Examples
/// ```
/// use ElyTra::ElectrolyteBase::registry::parse;
/// use ElyTra::Equilibrium::speciation::speciate;
/// let registry = parse(ElyTra::SAMPLE_DATA).unwrap();
/// let acetate = registry.resolve("acetate").unwrap();
/// let result = speciate(&acetate, 4.76).unwrap();
/// assert!((result.fraction_of("CH3COO-").unwrap() - 0.5).abs() < 1e-9);
/// ```
pub mod speciation;
/// Davies correction of the cascade for a given ionic strength
pub mod activity;
/// dissolved gas in front of the cascade (CO2 -> H2CO3 -> ...)
pub mod gas_equilibrium;
