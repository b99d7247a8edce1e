use log::{debug, warn};
use serde::Serialize;

use crate::chemistry::{Ion, IonGroup, IonTable, meq_to_mg_per_l, round_to, sum_meq, to_meq_per_l};
use crate::models::{BalanceSettings, ChargeBalanceMode, CompositionMap, IonDeltas};

/// Outcome of one charge-balance correction.
///
/// Sums and balances are in meq/L; a balance is cations minus anions.
/// `residual_note` is set when the adjusted balance is still outside
/// [`BalanceSettings::residual_tolerance_meq`]; it is a warning, not a failure.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CorrectionResult {
    pub mode: ChargeBalanceMode,
    pub adjusted: CompositionMap,
    pub applied_delta_mg_l: IonDeltas,
    pub raw_cation_meq: f64,
    pub adjusted_cation_meq: f64,
    pub raw_anion_meq: f64,
    pub adjusted_anion_meq: f64,
    pub raw_balance_meq: f64,
    pub adjusted_balance_meq: f64,
    pub residual_note: Option<String>,
}

impl CorrectionResult {
    pub fn has_residual(&self) -> bool {
        self.residual_note.is_some()
    }
}

/// Correct `raw` with the standard ion table and default settings.
pub fn correct_charge_balance(raw: &CompositionMap, mode: ChargeBalanceMode) -> CorrectionResult {
    correct_charge_balance_with(raw, mode, &IonTable::STANDARD, &BalanceSettings::default())
}

/// Bring cation and anion meq/L sums into agreement according to `mode`.
///
/// Works on a copy of `raw`; the caller's map is never touched. Every call
/// succeeds. When the priority list is exhausted before the imbalance falls
/// under the residual tolerance, the result carries a residual note.
pub fn correct_charge_balance_with(
    raw: &CompositionMap,
    mode: ChargeBalanceMode,
    table: &IonTable,
    settings: &BalanceSettings,
) -> CorrectionResult {
    let raw_cation_meq = sum_meq(raw, IonGroup::Cation, table);
    let raw_anion_meq = sum_meq(raw, IonGroup::Anion, table);

    let mut adjusted = raw.clone();
    let residual_note = match mode {
        ChargeBalanceMode::Off => None,
        ChargeBalanceMode::AnionsOnly | ChargeBalanceMode::CationsOnly => {
            let group = mode.adjusted_group().unwrap_or(IonGroup::Neutral);
            redistribute(&mut adjusted, group, table, settings)
        }
        ChargeBalanceMode::ScaleBoth => scale_both(&mut adjusted, table, settings),
    };

    let adjusted_cation_meq = sum_meq(&adjusted, IonGroup::Cation, table);
    let adjusted_anion_meq = sum_meq(&adjusted, IonGroup::Anion, table);

    let applied_delta_mg_l: IonDeltas = Ion::ALL
        .into_iter()
        .map(|ion| (ion, adjusted.get(ion) - raw.get(ion)))
        .filter(|(_, delta)| *delta != 0.0)
        .collect();

    CorrectionResult {
        mode,
        adjusted,
        applied_delta_mg_l,
        raw_cation_meq,
        adjusted_cation_meq,
        raw_anion_meq,
        adjusted_anion_meq,
        raw_balance_meq: raw_cation_meq - raw_anion_meq,
        adjusted_balance_meq: adjusted_cation_meq - adjusted_anion_meq,
        residual_note,
    }
}

/// meq/L that `group` has to gain for the map to be neutral.
fn required_gain(map: &CompositionMap, group: IonGroup, table: &IonTable) -> f64 {
    match group.counter() {
        Some(counter) => sum_meq(map, counter, table) - sum_meq(map, group, table),
        None => 0.0,
    }
}

/// Single-sided correction: push the imbalance into `group`, one ion at a time.
fn redistribute(
    map: &mut CompositionMap,
    group: IonGroup,
    table: &IonTable,
    settings: &BalanceSettings,
) -> Option<String> {
    let mut remaining = required_gain(map, group, table);

    for &ion in settings.priority.order_for(group) {
        if remaining.abs() <= settings.convergence_epsilon_meq {
            break;
        }
        if ion.group() != group {
            continue;
        }
        let def = table.definition(ion);
        let current = map.get(ion);
        let requested = meq_to_mg_per_l(remaining, def.molar_mass, def.valence);
        let updated = round_to((current + requested).max(0.0), settings.effective_decimals());
        map.set(ion, updated);

        // Floor and rounding may cut the request short; only count what landed.
        let applied = to_meq_per_l(map.get(ion) - current, def.molar_mass, def.valence);
        remaining -= applied;
        debug!(
            "{ion}: {current:.3} -> {:.3} mg/L ({applied:+.6} meq/L, {remaining:+.6} meq/L left)",
            map.get(ion)
        );
    }

    residual_note(remaining, &format!("{group}-only correction"), settings)
}

/// Two-sided correction: scale each group so both meet at the mean meq/L.
fn scale_both(
    map: &mut CompositionMap,
    table: &IonTable,
    settings: &BalanceSettings,
) -> Option<String> {
    let cations = sum_meq(map, IonGroup::Cation, table);
    let anions = sum_meq(map, IonGroup::Anion, table);

    if cations > 0.0 && anions > 0.0 {
        let target = (cations + anions) / 2.0;
        let cation_factor = target / cations;
        let anion_factor = target / anions;
        debug!("scaling cations by {cation_factor:.6}, anions by {anion_factor:.6}");

        for ion in Ion::ALL {
            let factor = match ion.group() {
                IonGroup::Cation => cation_factor,
                IonGroup::Anion => anion_factor,
                IonGroup::Neutral => continue,
            };
            let scaled = round_to(map.get(ion) * factor, settings.effective_decimals());
            map.set(ion, scaled);
        }

        let remaining = required_gain(map, IonGroup::Anion, table);
        return residual_note(remaining, "proportional scaling", settings);
    }

    // A zero side leaves nothing to scale against; correct the non-zero side alone.
    if cations > 0.0 {
        debug!("no anion equivalents; falling back to cation-only correction");
        redistribute(map, IonGroup::Cation, table, settings)
    } else if anions > 0.0 {
        debug!("no cation equivalents; falling back to anion-only correction");
        redistribute(map, IonGroup::Anion, table, settings)
    } else {
        None
    }
}

fn residual_note(remaining: f64, stage: &str, settings: &BalanceSettings) -> Option<String> {
    if remaining.abs() < settings.residual_tolerance_meq {
        return None;
    }
    let note = format!(
        "Residual charge imbalance of {:.4} meq/L after {stage}: adjustable ions exhausted",
        remaining.abs()
    );
    warn!("{note}");
    Some(note)
}
