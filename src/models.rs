use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chemistry::{Ion, IonGroup, finite_or_zero};
use crate::error::CompositionError;

/// Ion concentrations in mg/L over the closed [`Ion`] key set.
///
/// Absent ions read as 0. Stored values are always finite and non-negative:
/// `set` coerces NaN/infinity and negative values to 0.
///
/// Serialized as an object of storage key to mg/L. Deserialization accepts
/// `null` values (read as 0) and rejects keys outside the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Option<f64>>",
    into = "BTreeMap<Ion, f64>"
)]
pub struct CompositionMap {
    values: [f64; Ion::COUNT],
}

impl CompositionMap {
    pub fn new() -> Self {
        Self {
            values: [0.0; Ion::COUNT],
        }
    }

    pub fn get(&self, ion: Ion) -> f64 {
        self.values[ion.index()]
    }

    pub fn set(&mut self, ion: Ion, mg_l: f64) {
        self.values[ion.index()] = finite_or_zero(mg_l).max(0.0);
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, ion: Ion, mg_l: f64) -> Self {
        self.set(ion, mg_l);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ion, f64)> + '_ {
        Ion::ALL.into_iter().map(|ion| (ion, self.get(ion)))
    }

    pub fn iter_group(&self, group: IonGroup) -> impl Iterator<Item = (Ion, f64)> + '_ {
        self.iter().filter(move |(ion, _)| ion.group() == group)
    }

    /// True when every ion reads 0.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Parse a key/value document, rejecting unknown keys.
    pub fn from_keyed<'a, I>(entries: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = (&'a str, Option<f64>)>,
    {
        let mut map = CompositionMap::new();
        for (key, value) in entries {
            let ion = Ion::from_key(key).ok_or_else(|| CompositionError::UnknownKey {
                key: key.to_string(),
            })?;
            map.set(ion, value.unwrap_or(0.0));
        }
        Ok(map)
    }
}

impl Default for CompositionMap {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(Ion, f64)> for CompositionMap {
    fn from_iter<T: IntoIterator<Item = (Ion, f64)>>(iter: T) -> Self {
        let mut map = CompositionMap::new();
        for (ion, mg_l) in iter {
            map.set(ion, mg_l);
        }
        map
    }
}

impl TryFrom<BTreeMap<String, Option<f64>>> for CompositionMap {
    type Error = CompositionError;

    fn try_from(doc: BTreeMap<String, Option<f64>>) -> Result<Self, Self::Error> {
        CompositionMap::from_keyed(doc.iter().map(|(k, v)| (k.as_str(), *v)))
    }
}

impl From<CompositionMap> for BTreeMap<Ion, f64> {
    fn from(map: CompositionMap) -> Self {
        map.iter().collect()
    }
}

/// Signed mg/L change applied to each ion the corrector touched.
pub type IonDeltas = BTreeMap<Ion, f64>;

/// How the corrector restores electroneutrality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ChargeBalanceMode {
    /// Pass-through.
    #[default]
    Off,
    /// Adjust anions only, in priority order.
    AnionsOnly,
    /// Adjust cations only, in priority order.
    CationsOnly,
    /// Scale both groups proportionally to the mean of their meq sums.
    ScaleBoth,
}

impl ChargeBalanceMode {
    /// Group a single-sided mode redistributes over.
    pub fn adjusted_group(self) -> Option<IonGroup> {
        match self {
            ChargeBalanceMode::AnionsOnly => Some(IonGroup::Anion),
            ChargeBalanceMode::CationsOnly => Some(IonGroup::Cation),
            ChargeBalanceMode::Off | ChargeBalanceMode::ScaleBoth => None,
        }
    }
}

/// Visit order for single-sided correction, one list per adjusted group.
///
/// Entries whose group does not match the list are skipped by the corrector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityTable {
    pub anions: Vec<Ion>,
    pub cations: Vec<Ion>,
}

impl PriorityTable {
    pub fn order_for(&self, group: IonGroup) -> &[Ion] {
        match group {
            IonGroup::Anion => &self.anions,
            IonGroup::Cation => &self.cations,
            IonGroup::Neutral => &[],
        }
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            // Cl- first: least constrained by solubility and speciation.
            anions: vec![
                Ion::Cl,
                Ion::Hco3,
                Ion::So4,
                Ion::No3,
                Ion::Br,
                Ion::Co3,
                Ion::Po4,
                Ion::F,
            ],
            cations: vec![
                Ion::Na,
                Ion::Ca,
                Ion::Mg,
                Ion::K,
                Ion::Nh4,
                Ion::Sr,
                Ion::Ba,
                Ion::Fe,
                Ion::Mn,
                Ion::Al,
            ],
        }
    }
}

/// Tunable constants of the charge-balance engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSettings {
    /// Redistribution stops once the remaining imbalance is at or below this (meq/L).
    pub convergence_epsilon_meq: f64,
    /// A remaining imbalance at or above this is reported as a residual note (meq/L).
    pub residual_tolerance_meq: f64,
    /// Decimal places kept on every adjusted concentration.
    pub concentration_decimals: i32,
    /// Empirical µS/cm per mg/L TDS.
    pub conductivity_factor: f64,
    pub priority: PriorityTable,
}

impl BalanceSettings {
    /// Largest number of decimal places kept on adjusted concentrations.
    pub const MAX_CONCENTRATION_DECIMALS: i32 = 12;

    /// `concentration_decimals` clamped to `0..=MAX_CONCENTRATION_DECIMALS`.
    pub fn effective_decimals(&self) -> i32 {
        self.concentration_decimals
            .clamp(0, Self::MAX_CONCENTRATION_DECIMALS)
    }
}

impl Default for BalanceSettings {
    fn default() -> Self {
        Self {
            convergence_epsilon_meq: 1e-6,
            residual_tolerance_meq: 1e-3,
            concentration_decimals: 3,
            conductivity_factor: 1.7,
            priority: PriorityTable::default(),
        }
    }
}
