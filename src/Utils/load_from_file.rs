use crate::ElectrolyteBase::registry::{Registry, parse_with_settings};
use crate::errors::LoadError;
use crate::settings::EngineSettings;
use log::{error, info};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataFileError {
    #[error("File '{0}' does not exist")]
    NotFound(String),
    #[error("Failed to read file '{file_name}': {source}")]
    Io {
        file_name: String,
        source: std::io::Error,
    },
    #[error("Failed to load data file '{file_name}': {source}")]
    Load {
        file_name: String,
        source: LoadError,
    },
}

pub struct LoadData {
    pub file_name: String,
    pub settings: EngineSettings,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData {
            file_name,
            settings: EngineSettings::default(),
        }
    }
    pub fn with_settings(file_name: String, settings: EngineSettings) -> Self {
        LoadData {
            file_name,
            settings,
        }
    }
    pub fn load_text(&self) -> Result<String, DataFileError> {
        read_data_file(&self.file_name)
    }
    pub fn load_registry(&self) -> Result<Registry, DataFileError> {
        load_registry_from_file(&self.file_name, &self.settings)
    }
}

/// Reads the whole data file as text.
pub fn read_data_file(file_name: &str) -> Result<String, DataFileError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(DataFileError::NotFound(file_name.to_string()));
    }
    fs::read_to_string(path).map_err(|source| DataFileError::Io {
        file_name: file_name.to_string(),
        source,
    })
}

/// Reads and parses a data file into a registry.
/// On failure the offending line is logged together with the error.
pub fn load_registry_from_file(
    file_name: &str,
    settings: &EngineSettings,
) -> Result<Registry, DataFileError> {
    let text = read_data_file(file_name)?;
    match parse_with_settings(&text, settings) {
        Ok(registry) => {
            info!(
                "Successfully loaded {} electrolyte records from file '{}'",
                registry.names().len(),
                file_name
            );
            Ok(registry)
        }
        Err(e) => {
            error!("Error loading data file '{}': {}", file_name, e);
            // show the problematic line
            if let Some(problem_line) = e.line().and_then(|n| text.lines().nth(n - 1)) {
                error!("Problematic line: {}", problem_line);
            }
            Err(DataFileError::Load {
                file_name: file_name.to_string(),
                source: e,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SAMPLE_DATA;
    use crate::errors::TypeCoercionError;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn load_sample_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("electrolytes.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(SAMPLE_DATA.as_bytes()).unwrap();
        let loader = LoadData::new(path.to_string_lossy().to_string());
        let registry = loader.load_registry().unwrap();
        assert!(registry.contains("carbonate"));
        assert_eq!(registry.mobility("K+").unwrap(), 7.620e-8);
        assert_eq!(loader.load_text().unwrap(), SAMPLE_DATA);
    }

    #[test]
    fn missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nothing_here.txt");
        let name = path.to_string_lossy().to_string();
        match load_registry_from_file(&name, &EngineSettings::default()) {
            Err(DataFileError::NotFound(n)) => assert_eq!(n, name),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn broken_file_reports_the_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.txt");
        fs::write(&path, "acetate\n\tcation: Na+\n\tpKa: [4.76\n").unwrap();
        let name = path.to_string_lossy().to_string();
        match load_registry_from_file(&name, &EngineSettings::default()) {
            Err(DataFileError::Load { source, .. }) => assert_eq!(source.line(), Some(3)),
            other => panic!("expected a load error, got {:?}", other),
        }
        fs::write(&path, "acetate\n\tpKa: four\n").unwrap();
        match load_registry_from_file(&name, &EngineSettings::default()) {
            Err(DataFileError::Load {
                source: LoadError::Coercion(TypeCoercionError { line, key, .. }),
                ..
            }) => {
                assert_eq!(line, 2);
                assert_eq!(key, "pKa");
            }
            other => panic!("expected a coercion error, got {:?}", other),
        }
    }

    #[test]
    fn settings_travel_with_the_loader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.txt");
        fs::write(&path, "a\n\tpKa: 1\n\na\n\tpKa: 2\n").unwrap();
        let name = path.to_string_lossy().to_string();
        assert!(LoadData::new(name.clone()).load_registry().is_err());
        let settings = EngineSettings {
            duplicate_policy: crate::settings::DuplicatePolicy::Override,
            ..EngineSettings::default()
        };
        let registry = LoadData::with_settings(name, settings).load_registry().unwrap();
        assert_eq!(registry.resolve("a").unwrap().pka, vec![2.0]);
    }
}
