pub mod corrector;
pub mod metrics;

use serde::Serialize;

use crate::chemistry::IonTable;
use crate::feed::FeedPayload;
use crate::models::{BalanceSettings, ChargeBalanceMode, CompositionMap};

use self::corrector::{CorrectionResult, correct_charge_balance_with};
use self::metrics::{DerivedMetrics, derive_metrics_with};

/// Before/after view of one composition for UI or API callers.
#[derive(Serialize, Debug, Clone)]
pub struct BalanceReport {
    pub raw_metrics: DerivedMetrics,
    pub correction: CorrectionResult,
    pub adjusted_metrics: DerivedMetrics,
    pub payload: FeedPayload,
}

/// Correct `raw`, derive metrics on both sides, and build the outbound payload
/// from the corrected composition.
pub fn analyze(
    raw: &CompositionMap,
    mode: ChargeBalanceMode,
    table: &IonTable,
    settings: &BalanceSettings,
) -> BalanceReport {
    let raw_metrics = derive_metrics_with(raw, table, settings);
    let correction = correct_charge_balance_with(raw, mode, table, settings);
    let adjusted_metrics = derive_metrics_with(&correction.adjusted, table, settings);
    let payload = FeedPayload::build(&correction.adjusted, &adjusted_metrics);

    BalanceReport {
        raw_metrics,
        correction,
        adjusted_metrics,
        payload,
    }
}
