pub mod adapters;
pub mod balance;
pub mod chemistry;
pub mod error;
pub mod feed;
pub mod models;

pub use crate::balance::corrector::{
    CorrectionResult, correct_charge_balance, correct_charge_balance_with,
};
pub use crate::balance::metrics::{DerivedMetrics, derive_metrics, derive_metrics_with};
pub use crate::balance::{BalanceReport, analyze};
pub use crate::chemistry::{Ion, IonDefinition, IonGroup, IonTable};
pub use crate::error::{AppError, CompositionError};
pub use crate::feed::{ChemistryPayload, FeedPayload, scale_to_tds};
pub use crate::models::{BalanceSettings, ChargeBalanceMode, CompositionMap, PriorityTable};
