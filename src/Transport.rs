/// solution conductivity from speciation, electroneutrality and ion mobilities
///
/// # Examples
/// ```
/// use ElyTra::ElectrolyteBase::registry::parse;
/// use ElyTra::Equilibrium::speciation::speciate;
/// use ElyTra::Transport::conductivity::conductivity;
/// let registry = parse(ElyTra::SAMPLE_DATA).unwrap();
/// let koh = registry.resolve("hydroxide").unwrap();
/// let speciation = speciate(&koh, 13.0).unwrap();
/// // 100 mol/m^3 = 0.1 M KOH
/// let kappa = conductivity(&koh, &speciation.fractions, 100.0, &registry).unwrap();
/// assert!((kappa - 2.7267).abs() < 1e-3);
/// ```
pub mod conductivity;
