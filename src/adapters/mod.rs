#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{Args, parse_inputs};
    use crate::balance::analyze;
    use crate::chemistry::IonTable;

    env_logger::init();

    let args = Args::parse();
    let (composition, mode, settings) = parse_inputs(&args)?;

    let out = analyze(&composition, mode, &IonTable::STANDARD, &settings);

    crate::adapters::cli::print_output(&out, &args)?;

    Ok(())
}
