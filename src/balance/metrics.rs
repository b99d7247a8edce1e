use serde::Serialize;

use crate::chemistry::{Ion, IonGroup, IonTable, meq_to_ppm_as_caco3, sum_concentration, sum_meq};
use crate::models::{BalanceSettings, CompositionMap};

/// Bulk water-quality indicators of one composition.
///
/// - `total_tds`: mg/L, cations + anions + neutrals
/// - `cation_meq_sum`, `anion_meq_sum`, `charge_balance`: meq/L, balance = cations − anions
/// - `*_as_caco3`: mg/L as CaCO3
/// - `estimated_conductivity`: µS/cm, TDS times an empirical factor; not a measurement
/// - `balance_error_pct`: |C − A| / (C + A) × 100, 0 when both sums are 0
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub total_tds: f64,
    pub cation_meq_sum: f64,
    pub anion_meq_sum: f64,
    pub charge_balance: f64,
    pub hardness_as_caco3: f64,
    pub calcium_hardness_as_caco3: f64,
    pub alkalinity_as_caco3: f64,
    pub estimated_conductivity: f64,
    pub balance_error_pct: f64,
}

pub fn derive_metrics(map: &CompositionMap) -> DerivedMetrics {
    derive_metrics_with(map, &IonTable::STANDARD, &BalanceSettings::default())
}

/// Read-only projection of `map`; safe on both raw and corrected compositions.
pub fn derive_metrics_with(
    map: &CompositionMap,
    table: &IonTable,
    settings: &BalanceSettings,
) -> DerivedMetrics {
    let total_tds = [IonGroup::Cation, IonGroup::Anion, IonGroup::Neutral]
        .into_iter()
        .map(|group| sum_concentration(map, group))
        .sum::<f64>();

    let cation_meq_sum = sum_meq(map, IonGroup::Cation, table);
    let anion_meq_sum = sum_meq(map, IonGroup::Anion, table);
    let meq = |ion: Ion| table.meq(ion, map.get(ion));

    DerivedMetrics {
        total_tds,
        cation_meq_sum,
        anion_meq_sum,
        charge_balance: cation_meq_sum - anion_meq_sum,
        hardness_as_caco3: meq_to_ppm_as_caco3(meq(Ion::Ca) + meq(Ion::Mg)),
        calcium_hardness_as_caco3: meq_to_ppm_as_caco3(meq(Ion::Ca)),
        alkalinity_as_caco3: meq_to_ppm_as_caco3(meq(Ion::Hco3) + meq(Ion::Co3)),
        estimated_conductivity: total_tds * settings.conductivity_factor,
        balance_error_pct: balance_error_pct(cation_meq_sum, anion_meq_sum),
    }
}

/// Relative ion-balance error in percent.
pub fn balance_error_pct(cation_meq: f64, anion_meq: f64) -> f64 {
    let total = cation_meq + anion_meq;
    if total > 0.0 {
        (cation_meq - anion_meq).abs() / total * 100.0
    } else {
        0.0
    }
}
