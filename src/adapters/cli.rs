use clap::Parser;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};

use crate::balance::BalanceReport;
use crate::error::AppError;
use crate::models::{BalanceSettings, ChargeBalanceMode, CompositionMap};

#[derive(Parser, Debug)]
#[command(author, version, about = "Feed-water charge balance and quality indicators — optional JSON output", long_about = None)]
pub struct Args {
    #[arg(long)]
    json: bool,
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON file with composition and optional mode/settings; '-' reads from stdin"
    )]
    input: Option<String>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON object of ion key to mg/L (overrides --input)"
    )]
    composition_json: Option<String>,
    #[arg(
        long,
        value_enum,
        help = "Charge-balance correction mode (overrides the input document)"
    )]
    mode: Option<ChargeBalanceMode>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON for engine settings (overrides the input document)"
    )]
    settings_json: Option<String>,
}

type RawComposition = BTreeMap<String, Option<f64>>;

#[derive(serde::Deserialize)]
struct CmdInput {
    composition: RawComposition,
    #[serde(default)]
    mode: Option<ChargeBalanceMode>,
    #[serde(default)]
    settings: Option<BalanceSettings>,
}

fn parse_settings_json(s: &str) -> Result<BalanceSettings, AppError> {
    serde_json::from_str(s).map_err(|source| AppError::ParseSettingsJson { source })
}

fn parse_inline_composition(composition_json: &str) -> Result<CmdInput, AppError> {
    let composition: RawComposition = serde_json::from_str(composition_json)
        .map_err(|source| AppError::ParseCompositionJson { source })?;
    Ok(CmdInput {
        composition,
        mode: None,
        settings: None,
    })
}

fn parse_cmd_input_doc(doc: &str) -> Result<CmdInput, AppError> {
    serde_json::from_str(doc).map_err(|source| AppError::ParseCmdInputJson { source })
}

/// Resolve composition, mode and settings from the command line.
///
/// Flags win over the input document; absent everywhere, the mode is `off` and
/// settings are the defaults.
pub fn parse_inputs(
    args: &Args,
) -> Result<(CompositionMap, ChargeBalanceMode, BalanceSettings), AppError> {
    let doc = match (&args.composition_json, &args.input) {
        (Some(composition_json), _) => parse_inline_composition(composition_json)?,
        (None, Some(path)) if path == "-" => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .map_err(|source| AppError::ReadStdin { source })?;
            parse_cmd_input_doc(&s)?
        }
        (None, Some(path)) => {
            let s = fs::read_to_string(path).map_err(|source| AppError::ReadFile {
                path: path.clone(),
                source,
            })?;
            parse_cmd_input_doc(&s)?
        }
        (None, None) => return Err(AppError::MissingInputData),
    };

    let composition = CompositionMap::try_from(doc.composition)?;
    let mode = args.mode.or(doc.mode).unwrap_or_default();
    let settings = match &args.settings_json {
        Some(s) => parse_settings_json(s)?,
        None => doc.settings.unwrap_or_default(),
    };

    Ok((composition, mode, settings))
}

pub fn print_output(out: &BalanceReport, args: &Args) -> Result<(), AppError> {
    if args.json {
        let s = serde_json::to_string_pretty(&out)
            .map_err(|source| AppError::SerializeOutput { source })?;
        println!("{}", s);
        return Ok(());
    }

    let raw = &out.raw_metrics;
    let adj = &out.adjusted_metrics;
    let corr = &out.correction;
    println!("Mode: {:?}", corr.mode);
    println!(
        "Cations: {:.3} -> {:.3} meq/L",
        corr.raw_cation_meq, corr.adjusted_cation_meq
    );
    println!(
        "Anions: {:.3} -> {:.3} meq/L",
        corr.raw_anion_meq, corr.adjusted_anion_meq
    );
    println!(
        "Balance: {:.3} -> {:.3} meq/L ({:.2}% -> {:.2}%)",
        corr.raw_balance_meq, corr.adjusted_balance_meq, raw.balance_error_pct, adj.balance_error_pct
    );
    for (ion, delta) in &corr.applied_delta_mg_l {
        println!("  {}: {:+.3} mg/L", ion.label(), delta);
    }
    println!("TDS: {:.2} mg/L", adj.total_tds);
    println!("Hardness: {:.2} mg/L as CaCO3", adj.hardness_as_caco3);
    println!("Alkalinity: {:.2} mg/L as CaCO3", adj.alkalinity_as_caco3);
    println!("Conductivity (est.): {:.1} uS/cm", adj.estimated_conductivity);
    if let Some(note) = &corr.residual_note {
        println!("Warning: {}", note);
    }

    Ok(())
}
