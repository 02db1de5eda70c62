/// resolved electrolyte systems
pub mod electrolyte_record;
/// ion names and the charge encoded in them
pub mod ions;
/// registry of records and ion mobilities, with inheritance resolution
///
/// # Examples
/// ```
/// use ElyTra::ElectrolyteBase::registry::parse;
/// let registry = parse(ElyTra::SAMPLE_DATA).unwrap();
/// let standard = registry.resolve("standard").unwrap();
/// assert_eq!(standard.base, Some("carbonate".to_string()));
/// assert_eq!(standard.pka, vec![3.6, 10.32]);
/// assert_eq!(standard.pH, Some(12.0));
/// assert!(registry.mobility("Xe+").is_err());
/// ```
pub mod registry;
