//! Outbound feed-water fragment of a simulation request.
//!
//! The simulation backend takes the ion composition together with a small
//! chemistry block of derived indicators. The indicators computed here are
//! merged into that block before the request leaves the client.

use serde::{Deserialize, Serialize};

use crate::balance::metrics::DerivedMetrics;
use crate::chemistry::{Ion, IonGroup, sum_concentration};
use crate::models::CompositionMap;

/// Smallest TDS used as a scaling base.
pub const MIN_TDS_BASE: f64 = 1e-6;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemistryPayload {
    #[serde(rename = "alkalinity_mgL_as_CaCO3")]
    pub alkalinity_mg_l_as_caco3: Option<f64>,
    #[serde(rename = "calcium_hardness_mgL_as_CaCO3")]
    pub calcium_hardness_mg_l_as_caco3: Option<f64>,
    #[serde(rename = "sulfate_mgL", skip_serializing_if = "Option::is_none")]
    pub sulfate_mg_l: Option<f64>,
    #[serde(rename = "barium_mgL", skip_serializing_if = "Option::is_none")]
    pub barium_mg_l: Option<f64>,
    #[serde(rename = "strontium_mgL", skip_serializing_if = "Option::is_none")]
    pub strontium_mg_l: Option<f64>,
    #[serde(rename = "silica_mgL_SiO2", skip_serializing_if = "Option::is_none")]
    pub silica_mg_l_sio2: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedPayload {
    #[serde(rename = "tds_mgL")]
    pub tds_mg_l: f64,
    pub ions: CompositionMap,
    pub chemistry: ChemistryPayload,
}

impl FeedPayload {
    /// Assemble the fragment from a composition and the metrics derived from it.
    ///
    /// Alkalinity and calcium hardness always come from `metrics`; scalant ions
    /// are copied only when present.
    pub fn build(composition: &CompositionMap, metrics: &DerivedMetrics) -> Self {
        let present = |ion: Ion| Some(composition.get(ion)).filter(|v| *v > 0.0);
        Self {
            tds_mg_l: metrics.total_tds,
            ions: composition.clone(),
            chemistry: ChemistryPayload {
                alkalinity_mg_l_as_caco3: Some(metrics.alkalinity_as_caco3),
                calcium_hardness_mg_l_as_caco3: Some(metrics.calcium_hardness_as_caco3),
                sulfate_mg_l: present(Ion::So4),
                barium_mg_l: present(Ion::Ba),
                strontium_mg_l: present(Ion::Sr),
                silica_mg_l_sio2: present(Ion::SiO2),
            },
        }
    }
}

/// Scale every concentration so the composition totals `new_tds_mg_l`.
///
/// Intra-composition ratios are kept. A zero base TDS is floored at
/// [`MIN_TDS_BASE`], so an empty map stays empty.
pub fn scale_to_tds(map: &CompositionMap, new_tds_mg_l: f64) -> CompositionMap {
    let base = [IonGroup::Cation, IonGroup::Anion, IonGroup::Neutral]
        .into_iter()
        .map(|group| sum_concentration(map, group))
        .sum::<f64>()
        .max(MIN_TDS_BASE);
    let factor = new_tds_mg_l / base;
    map.iter().map(|(ion, v)| (ion, v * factor)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::metrics::derive_metrics;

    #[test]
    fn payload_carries_scalants_and_indicators() {
        let map = CompositionMap::new()
            .with(Ion::Ca, 100.0)
            .with(Ion::Hco3, 200.0)
            .with(Ion::So4, 50.0);
        let metrics = derive_metrics(&map);
        let p = FeedPayload::build(&map, &metrics);
        assert_eq!(p.tds_mg_l, 350.0);
        assert_eq!(p.chemistry.sulfate_mg_l, Some(50.0));
        assert_eq!(p.chemistry.barium_mg_l, None);
        assert_eq!(
            p.chemistry.alkalinity_mg_l_as_caco3,
            Some(metrics.alkalinity_as_caco3)
        );
        assert_eq!(p.ions, map);
    }

    #[test]
    fn scale_keeps_ratios() {
        let map = CompositionMap::new().with(Ion::Na, 30.0).with(Ion::Cl, 70.0);
        let scaled = scale_to_tds(&map, 1_000.0);
        assert!((scaled.get(Ion::Na) - 300.0).abs() < 1e-9);
        assert!((scaled.get(Ion::Cl) - 700.0).abs() < 1e-9);
    }

    #[test]
    fn scale_empty_map_stays_empty() {
        assert!(scale_to_tds(&CompositionMap::new(), 500.0).is_empty());
    }
}
