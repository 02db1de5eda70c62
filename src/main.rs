use ElyTra::Equilibrium::speciation::speciate_with_settings;
use ElyTra::Examples::electrolyte_examples::electrolyte_examples;
use ElyTra::Transport::conductivity::conductivity_report;
use ElyTra::Utils::load_from_file::load_registry_from_file;
use ElyTra::Utils::logger::init_logger;
use ElyTra::settings::{DEFAULT_SETTINGS_FILE, EngineSettings};
use log::error;
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "usage: ElyTra <data file> <record> <pH> [total concentration, mol/m^3]\n       ElyTra example <number>";

#[allow(non_snake_case)]
fn run(args: &[String], settings: &EngineSettings) -> Result<(), String> {
    match args {
        [] => {
            electrolyte_examples(0);
            Ok(())
        }
        [cmd, task] if cmd == "example" => {
            let task: usize = task
                .parse()
                .map_err(|_| format!("example number expected, got '{}'", task))?;
            electrolyte_examples(task);
            Ok(())
        }
        [file, record, pH, rest @ ..] if rest.len() <= 1 => {
            let pH: f64 = pH
                .parse()
                .map_err(|_| format!("pH must be a number, got '{}'", pH))?;
            let registry = load_registry_from_file(file, settings).map_err(|e| e.to_string())?;
            let record = registry.resolve(record).map_err(|e| e.to_string())?;
            let speciation =
                speciate_with_settings(&record, pH, settings).map_err(|e| e.to_string())?;
            speciation.pretty_print();
            let concentration = match rest.first() {
                Some(c) => Some(
                    c.parse::<f64>()
                        .map_err(|_| format!("concentration must be a number, got '{}'", c))?,
                ),
                None => record.concentration,
            };
            if let Some(concentration) = concentration {
                let report = conductivity_report(
                    &record,
                    &speciation.fractions,
                    concentration,
                    &registry,
                    settings,
                )
                .map_err(|e| e.to_string())?;
                report.pretty_print();
            }
            Ok(())
        }
        _ => Err(USAGE.to_string()),
    }
}

pub fn main() -> ExitCode {
    let settings = match EngineSettings::load(Path::new(DEFAULT_SETTINGS_FILE)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}, defaults used", DEFAULT_SETTINGS_FILE, e);
            EngineSettings::default()
        }
    };
    if let Err(e) = init_logger(settings.level_filter()) {
        eprintln!("{}", e);
    }
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
