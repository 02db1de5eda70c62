use crate::ElectrolyteBase::registry::{Registry, parse};
use crate::Equilibrium::activity::speciate_at_ionic_strength;
use crate::Equilibrium::gas_equilibrium::{apparent_first_pka, gas_equilibrium};
use crate::Equilibrium::speciation::speciate;
use crate::SAMPLE_DATA;
use crate::Transport::conductivity::{conductivity_report, solution_conductivity};
use crate::errors::ConductivityError;
use crate::settings::EngineSettings;
use log::error;
use prettytable::{Cell, Row, Table};

fn sample_registry() -> Option<Registry> {
    match parse(SAMPLE_DATA) {
        Ok(registry) => Some(registry),
        Err(e) => {
            error!("bundled data does not load: {}", e);
            None
        }
    }
}

#[allow(non_snake_case)]
pub fn electrolyte_examples(task: usize) {
    let Some(registry) = sample_registry() else {
        return;
    };
    let settings = EngineSettings::default();
    match task {
        0 => {
            // every record with what it inherited
            let mut table = Table::new();
            table.add_row(Row::new(vec![
                Cell::new("record"),
                Cell::new("based on"),
                Cell::new("cation"),
                Cell::new("species"),
                Cell::new("pKa"),
            ]));
            for record in registry.all() {
                let species: Vec<String> =
                    record.species().iter().map(|s| s.name.clone()).collect();
                table.add_row(Row::new(vec![
                    Cell::new(&record.name),
                    Cell::new(record.base.as_deref().unwrap_or("-")),
                    Cell::new(&record.cation.map(|c| c.name).unwrap_or_default()),
                    Cell::new(&species.join(", ")),
                    Cell::new(&format!("{:?}", record.pka)),
                ]));
            }
            table.printstd();
            println!("{} ions in the mobility table", registry.mobility_table().len());
        }
        1 => {
            let Ok(carbonate) = registry.resolve("carbonate") else {
                return;
            };
            for pH in [2.0, 6.37, 8.3, 10.32, 12.0] {
                match speciate(&carbonate, pH) {
                    Ok(speciation) => speciation.pretty_print(),
                    Err(e) => error!("{}", e),
                }
            }
        }
        2 => {
            let Ok(carbonate) = registry.resolve("carbonate") else {
                return;
            };
            // about 400 ppm CO2 in air, atm
            let p_co2 = 4.0e-4;
            match gas_equilibrium(&carbonate, p_co2, 8.3) {
                Ok(eq) => {
                    println!(
                        "{} at {} atm: {:.4e} mol/L dissolved, {:.4e} mol/L in buffer species",
                        eq.gas, eq.partial_pressure, eq.dissolved_gas, eq.total_buffer
                    );
                    for s in &eq.species {
                        println!("  {}: {:.4e} mol/L", s.species, s.concentration);
                    }
                    eq.speciation.pretty_print();
                }
                Err(e) => error!("{}", e),
            }
            if let Some(pka) = apparent_first_pka(&carbonate) {
                println!("apparent first pKa of dissolved CO2: {:.3}", pka);
            }
        }
        3 => {
            let Ok(standard) = registry.resolve("standard") else {
                return;
            };
            let pH = standard.pH.unwrap_or(7.0);
            let concentration = standard.concentration.unwrap_or(1.0);
            match solution_conductivity(&standard, pH, concentration, &registry, &settings) {
                Ok(report) => report.pretty_print(),
                Err(e) => error!("{}", e),
            }
            let Ok(koh) = registry.resolve("hydroxide") else {
                return;
            };
            let report = speciate(&koh, 13.0).map_err(ConductivityError::from).and_then(|s| {
                conductivity_report(&koh, &s.fractions, 100.0, &registry, &settings)
            });
            match report {
                Ok(report) => report.pretty_print(),
                Err(e) => error!("{}", e),
            }
        }
        4 => {
            let Ok(acetate) = registry.resolve("acetate") else {
                return;
            };
            for I in [0.0, 0.01, 0.1, 0.5] {
                match speciate_at_ionic_strength(&acetate, 4.76, I, &settings) {
                    Ok(speciation) => {
                        println!("I = {} mol/L", I);
                        speciation.pretty_print();
                    }
                    Err(e) => error!("{}", e),
                }
            }
        }
        5 => {
            println!("{}", registry.to_text());
        }
        _ => {
            error!("no example with number {}", task);
        }
    }
}
