//! Chemistry module: ion catalog and unit conversions for feed-water composition.
//!
//! This module provides:
//! - The closed set of ions a feed-water analysis can carry ([`Ion`]), grouped into
//!   cations, anions and neutrals
//! - Molar masses (g/mol) and valences for every catalog entry ([`IonTable`])
//! - Conversions between mg/L, meq/L and mg/L as CaCO3
//! - Group folds over a [`CompositionMap`] (mass and equivalent sums)
//!
//! Units conventions:
//! - Mass concentrations are mg/L unless otherwise stated
//! - Equivalent concentrations are meq/L: mg/L ÷ molar mass × |valence|
//! - "as CaCO3" values use 50 mg CaCO3 per meq
//!
//! Design notes:
//! - The ion table is an immutable value; callers that need different molar masses
//!   build a modified copy with [`IonTable::with_definition`] and pass it in
//! - Every numeric read goes through [`finite_or_zero`]; conversions never return
//!   NaN or infinity, even for malformed definitions (zero molar mass, zero valence)
//!
//! # Examples
//! ```rust
//! use ionbalance::chemistry::{Ion, IonTable, to_meq_per_l, meq_to_ppm_as_caco3};
//!
//! let ca = IonTable::STANDARD.definition(Ion::Ca);
//! let meq = to_meq_per_l(150.0, ca.molar_mass, ca.valence);
//! assert!((meq - 7.485).abs() < 1e-3);
//! assert!((meq_to_ppm_as_caco3(meq) - 374.27).abs() < 1e-2);
//! ```
//!
//! # Panics
//! None of the functions panic.
//!
//! # Limitations
//! No activity coefficients, temperature dependence or speciation; valences are fixed.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::models::CompositionMap;

/// Atomic and compound molar masses (g/mol).
pub const MW_NA: f64 = 22.990;
pub const MW_K: f64 = 39.098;
pub const MW_CA: f64 = 40.078;
pub const MW_MG: f64 = 24.305;
pub const MW_NH4: f64 = 18.04;
pub const MW_SR: f64 = 87.62;
pub const MW_BA: f64 = 137.327;
pub const MW_FE: f64 = 55.845;
pub const MW_MN: f64 = 54.938;
pub const MW_AL: f64 = 26.982;

pub const MW_CL: f64 = 35.453;
pub const MW_SO4: f64 = 96.06;
pub const MW_HCO3: f64 = 61.017;
pub const MW_NO3: f64 = 62.005;
pub const MW_F: f64 = 18.998;
pub const MW_BR: f64 = 79.904;
pub const MW_PO4: f64 = 94.97;
pub const MW_CO3: f64 = 60.01;

pub const MW_SIO2: f64 = 60.08;
pub const MW_B: f64 = 10.811;
pub const MW_CO2: f64 = 44.01;

/// mg CaCO3 per meq (half of CaCO3's 100.09 g/mol, rounded as is customary).
pub const CACO3_MG_PER_MEQ: f64 = 50.0;

/// Ion charge group. Cations carry z > 0, anions z < 0, neutrals z = 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IonGroup {
    Cation,
    Anion,
    Neutral,
}

impl IonGroup {
    /// The group on the other side of the charge balance; neutrals have none.
    pub fn counter(self) -> Option<IonGroup> {
        match self {
            IonGroup::Cation => Some(IonGroup::Anion),
            IonGroup::Anion => Some(IonGroup::Cation),
            IonGroup::Neutral => None,
        }
    }
}

impl fmt::Display for IonGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IonGroup::Cation => "cation",
            IonGroup::Anion => "anion",
            IonGroup::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Closed key set for a feed-water composition.
///
/// The declaration order is the storage order of [`CompositionMap`] and the
/// iteration order everywhere in the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ion {
    #[serde(rename = "na_mgL")]
    Na,
    #[serde(rename = "k_mgL")]
    K,
    #[serde(rename = "ca_mgL")]
    Ca,
    #[serde(rename = "mg_mgL")]
    Mg,
    #[serde(rename = "nh4_mgL")]
    Nh4,
    #[serde(rename = "sr_mgL")]
    Sr,
    #[serde(rename = "ba_mgL")]
    Ba,
    #[serde(rename = "fe_mgL")]
    Fe,
    #[serde(rename = "mn_mgL")]
    Mn,
    #[serde(rename = "al_mgL")]
    Al,
    #[serde(rename = "cl_mgL")]
    Cl,
    #[serde(rename = "so4_mgL")]
    So4,
    #[serde(rename = "hco3_mgL")]
    Hco3,
    #[serde(rename = "no3_mgL")]
    No3,
    #[serde(rename = "f_mgL")]
    F,
    #[serde(rename = "br_mgL")]
    Br,
    #[serde(rename = "po4_mgL")]
    Po4,
    #[serde(rename = "co3_mgL")]
    Co3,
    #[serde(rename = "sio2_mgL")]
    SiO2,
    #[serde(rename = "b_mgL")]
    B,
    #[serde(rename = "co2_mgL")]
    Co2,
}

impl Ion {
    pub const COUNT: usize = 21;

    pub const ALL: [Ion; Ion::COUNT] = [
        Ion::Na,
        Ion::K,
        Ion::Ca,
        Ion::Mg,
        Ion::Nh4,
        Ion::Sr,
        Ion::Ba,
        Ion::Fe,
        Ion::Mn,
        Ion::Al,
        Ion::Cl,
        Ion::So4,
        Ion::Hco3,
        Ion::No3,
        Ion::F,
        Ion::Br,
        Ion::Po4,
        Ion::Co3,
        Ion::SiO2,
        Ion::B,
        Ion::Co2,
    ];

    /// Position of this ion in [`Ion::ALL`] and in the ion table arena.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn group(self) -> IonGroup {
        match self {
            Ion::Na
            | Ion::K
            | Ion::Ca
            | Ion::Mg
            | Ion::Nh4
            | Ion::Sr
            | Ion::Ba
            | Ion::Fe
            | Ion::Mn
            | Ion::Al => IonGroup::Cation,
            Ion::Cl
            | Ion::So4
            | Ion::Hco3
            | Ion::No3
            | Ion::F
            | Ion::Br
            | Ion::Po4
            | Ion::Co3 => IonGroup::Anion,
            Ion::SiO2 | Ion::B | Ion::Co2 => IonGroup::Neutral,
        }
    }

    /// Storage key used by composition documents (`na_mgL`, `cl_mgL`, ...).
    pub fn key(self) -> &'static str {
        IonTable::STANDARD.definition(self).key
    }

    /// Human-readable label (`Na+`, `SO4^2-`, ...).
    pub fn label(self) -> &'static str {
        IonTable::STANDARD.definition(self).label
    }

    pub fn from_key(key: &str) -> Option<Ion> {
        Ion::ALL.into_iter().find(|ion| ion.key() == key)
    }

    /// All ions of `group`, in catalog order.
    pub fn in_group(group: IonGroup) -> impl Iterator<Item = Ion> {
        Ion::ALL.into_iter().filter(move |ion| ion.group() == group)
    }
}

impl fmt::Display for Ion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity and physical constants of one catalog ion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IonDefinition {
    pub label: &'static str,
    pub key: &'static str,
    /// g/mol; expected > 0.
    pub molar_mass: f64,
    /// Signed charge number.
    pub valence: i32,
}

impl IonDefinition {
    const fn new(label: &'static str, key: &'static str, molar_mass: f64, valence: i32) -> Self {
        Self {
            label,
            key,
            molar_mass,
            valence,
        }
    }
}

/// Immutable arena of [`IonDefinition`] records indexed by [`Ion`].
#[derive(Clone, Debug, PartialEq)]
pub struct IonTable {
    definitions: [IonDefinition; Ion::COUNT],
}

impl IonTable {
    /// Built-in catalog.
    pub const STANDARD: IonTable = IonTable {
        definitions: [
            IonDefinition::new("Na+", "na_mgL", MW_NA, 1),
            IonDefinition::new("K+", "k_mgL", MW_K, 1),
            IonDefinition::new("Ca2+", "ca_mgL", MW_CA, 2),
            IonDefinition::new("Mg2+", "mg_mgL", MW_MG, 2),
            IonDefinition::new("NH4+", "nh4_mgL", MW_NH4, 1),
            IonDefinition::new("Sr2+", "sr_mgL", MW_SR, 2),
            IonDefinition::new("Ba2+", "ba_mgL", MW_BA, 2),
            IonDefinition::new("Fe2+", "fe_mgL", MW_FE, 2),
            IonDefinition::new("Mn2+", "mn_mgL", MW_MN, 2),
            IonDefinition::new("Al3+", "al_mgL", MW_AL, 3),
            IonDefinition::new("Cl-", "cl_mgL", MW_CL, -1),
            IonDefinition::new("SO4^2-", "so4_mgL", MW_SO4, -2),
            IonDefinition::new("HCO3-", "hco3_mgL", MW_HCO3, -1),
            IonDefinition::new("NO3-", "no3_mgL", MW_NO3, -1),
            IonDefinition::new("F-", "f_mgL", MW_F, -1),
            IonDefinition::new("Br-", "br_mgL", MW_BR, -1),
            IonDefinition::new("PO4^3-", "po4_mgL", MW_PO4, -3),
            IonDefinition::new("CO3^2-", "co3_mgL", MW_CO3, -2),
            IonDefinition::new("SiO2", "sio2_mgL", MW_SIO2, 0),
            IonDefinition::new("B", "b_mgL", MW_B, 0),
            IonDefinition::new("CO2", "co2_mgL", MW_CO2, 0),
        ],
    };

    pub const fn definition(&self, ion: Ion) -> &IonDefinition {
        &self.definitions[ion.index()]
    }

    /// Returns a copy of this table with `ion`'s molar mass and valence replaced.
    ///
    /// Values are taken as given; conversions against a malformed entry yield 0.
    pub fn with_definition(&self, ion: Ion, molar_mass: f64, valence: i32) -> IonTable {
        let mut table = self.clone();
        let def = &mut table.definitions[ion.index()];
        def.molar_mass = molar_mass;
        def.valence = valence;
        table
    }

    /// meq/L of `ion` at `mg_l` under this table.
    pub fn meq(&self, ion: Ion, mg_l: f64) -> f64 {
        let def = self.definition(ion);
        to_meq_per_l(mg_l, def.molar_mass, def.valence)
    }
}

impl Default for IonTable {
    fn default() -> Self {
        IonTable::STANDARD
    }
}

/// The one numeric read used across the crate: non-finite values read as 0.
#[inline]
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

fn usable_definition(molar_mass: f64, valence: i32) -> bool {
    molar_mass.is_finite() && molar_mass > 0.0 && valence != 0
}

/// Convert a mass concentration (mg/L) to an equivalent concentration (meq/L).
///
/// The sign of `mg_l` is kept, so a signed mg/L change converts to a signed meq/L change.
/// Returns 0 for a zero or non-finite molar mass, a zero valence, or a non-finite result.
pub fn to_meq_per_l(mg_l: f64, molar_mass: f64, valence: i32) -> f64 {
    if !usable_definition(molar_mass, valence) {
        return 0.0;
    }
    let z = f64::from(valence.unsigned_abs());
    finite_or_zero(finite_or_zero(mg_l) / molar_mass * z)
}

/// Inverse of [`to_meq_per_l`]: mg/L carrying `meq_l` equivalents of the ion.
pub fn meq_to_mg_per_l(meq_l: f64, molar_mass: f64, valence: i32) -> f64 {
    if !usable_definition(molar_mass, valence) {
        return 0.0;
    }
    let z = f64::from(valence.unsigned_abs());
    finite_or_zero(finite_or_zero(meq_l) / z * molar_mass)
}

pub fn meq_to_ppm_as_caco3(meq_l: f64) -> f64 {
    finite_or_zero(meq_l) * CACO3_MG_PER_MEQ
}

/// Sum of mg/L over one ion group.
pub fn sum_concentration(map: &CompositionMap, group: IonGroup) -> f64 {
    Ion::in_group(group).map(|ion| map.get(ion)).sum()
}

/// Sum of meq/L over one ion group. Neutrals always sum to 0.
pub fn sum_meq(map: &CompositionMap, group: IonGroup, table: &IonTable) -> f64 {
    Ion::in_group(group)
        .map(|ion| table.meq(ion, map.get(ion)))
        .sum()
}

/// Round a floating-point value to a specified number of decimal digits.
///
/// Non-finite inputs read as 0. When the scale `10^digits` or the scaled value
/// leaves the finite range, `x` is returned unrounded.
pub fn round_to(x: f64, digits: i32) -> f64 {
    let x = finite_or_zero(x);
    let p = 10f64.powi(digits);
    if !p.is_finite() || p == 0.0 || !(x * p).is_finite() {
        return x;
    }
    (x * p).round() / p
}
