/// walkthroughs over the bundled electrolyte data
pub mod electrolyte_examples;
