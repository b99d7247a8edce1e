use ionbalance::{
    ChargeBalanceMode, CompositionMap, Ion, IonGroup, correct_charge_balance, derive_metrics,
};

const CORRECTING_MODES: [ChargeBalanceMode; 3] = [
    ChargeBalanceMode::AnionsOnly,
    ChargeBalanceMode::CationsOnly,
    ChargeBalanceMode::ScaleBoth,
];

fn samples() -> Vec<CompositionMap> {
    vec![
        // Brackish well water, cation-heavy
        CompositionMap::new()
            .with(Ion::Na, 420.0)
            .with(Ion::Ca, 150.0)
            .with(Ion::Mg, 80.0)
            .with(Ion::K, 12.0)
            .with(Ion::Cl, 520.0)
            .with(Ion::So4, 180.0)
            .with(Ion::Hco3, 350.0)
            .with(Ion::SiO2, 25.0),
        // Seawater, close to neutral
        CompositionMap::new()
            .with(Ion::Na, 10_770.0)
            .with(Ion::Mg, 1_290.0)
            .with(Ion::Ca, 412.0)
            .with(Ion::K, 399.0)
            .with(Ion::Sr, 7.9)
            .with(Ion::Cl, 19_350.0)
            .with(Ion::So4, 2_710.0)
            .with(Ion::Hco3, 142.0)
            .with(Ion::Br, 67.0)
            .with(Ion::B, 4.5),
        // Anion-heavy surface water
        CompositionMap::new()
            .with(Ion::Na, 20.0)
            .with(Ion::Ca, 30.0)
            .with(Ion::Cl, 150.0)
            .with(Ion::No3, 40.0)
            .with(Ion::Hco3, 90.0)
            .with(Ion::F, 1.2),
        // Trace metals and phosphate
        CompositionMap::new()
            .with(Ion::Na, 5.0)
            .with(Ion::Fe, 0.3)
            .with(Ion::Mn, 0.05)
            .with(Ion::Al, 0.1)
            .with(Ion::Ba, 0.02)
            .with(Ion::Po4, 2.0)
            .with(Ion::Co3, 6.0),
    ]
}

#[test]
fn every_correcting_mode_reaches_electroneutrality() {
    for (i, raw) in samples().iter().enumerate() {
        for mode in CORRECTING_MODES {
            let r = correct_charge_balance(raw, mode);
            assert!(r.residual_note.is_none(), "sample {i} {mode:?}: {:?}", r.residual_note);
            assert!(
                r.adjusted_balance_meq.abs() < 1e-3,
                "sample {i} {mode:?}: balance {}",
                r.adjusted_balance_meq
            );
        }
    }
}

#[test]
fn adjusted_concentrations_are_never_negative() {
    for raw in samples() {
        for mode in [ChargeBalanceMode::Off].into_iter().chain(CORRECTING_MODES) {
            let r = correct_charge_balance(&raw, mode);
            assert!(r.adjusted.iter().all(|(_, v)| v >= 0.0), "{mode:?}");
        }
    }
}

#[test]
fn off_mode_returns_the_input_unchanged() {
    for raw in samples() {
        let r = correct_charge_balance(&raw, ChargeBalanceMode::Off);
        assert_eq!(r.adjusted, raw);
        assert_eq!(r.raw_balance_meq, r.adjusted_balance_meq);
    }
}

#[test]
fn single_sided_correction_is_idempotent() {
    for raw in samples() {
        for mode in [ChargeBalanceMode::AnionsOnly, ChargeBalanceMode::CationsOnly] {
            let first = correct_charge_balance(&raw, mode);
            let second = correct_charge_balance(&first.adjusted, mode);
            assert!(second.adjusted_balance_meq.abs() < 1e-3);
            for (ion, v) in second.adjusted.iter() {
                let before = first.adjusted.get(ion);
                assert!((v - before).abs() <= 5e-3, "{ion}: {before} -> {v}");
            }
        }
    }
}

#[test]
fn single_sided_modes_leave_the_other_group_alone() {
    for raw in samples() {
        let r = correct_charge_balance(&raw, ChargeBalanceMode::AnionsOnly);
        for (ion, v) in raw.iter_group(IonGroup::Cation) {
            assert_eq!(r.adjusted.get(ion), v);
        }
        let r = correct_charge_balance(&raw, ChargeBalanceMode::CationsOnly);
        for (ion, v) in raw.iter_group(IonGroup::Anion) {
            assert_eq!(r.adjusted.get(ion), v);
        }
    }
}

#[test]
fn scale_both_preserves_ratios_within_each_group() {
    let samples = samples();
    let raw = &samples[0];
    let r = correct_charge_balance(raw, ChargeBalanceMode::ScaleBoth);
    for group in [IonGroup::Cation, IonGroup::Anion] {
        let present: Vec<Ion> = raw
            .iter_group(group)
            .filter(|(_, v)| *v > 0.0)
            .map(|(ion, _)| ion)
            .collect();
        for a in &present {
            for b in &present {
                let before = raw.get(*a) / raw.get(*b);
                let after = r.adjusted.get(*a) / r.adjusted.get(*b);
                assert!(
                    ((after - before) / before).abs() < 1e-4,
                    "{a}/{b}: {before} vs {after}"
                );
            }
        }
    }
    // Neutrals are not part of either group and stay put.
    assert_eq!(r.adjusted.get(Ion::SiO2), raw.get(Ion::SiO2));
}

#[test]
fn seawater_scenario_raises_chloride_only() {
    let raw = CompositionMap::new()
        .with(Ion::Na, 10_000.0)
        .with(Ion::Cl, 15_000.0);
    let r = correct_charge_balance(&raw, ChargeBalanceMode::AnionsOnly);

    assert!((r.raw_cation_meq - 434.97).abs() < 0.01);
    assert!(r.raw_anion_meq < r.raw_cation_meq);
    assert_eq!(r.adjusted.get(Ion::Na), 10_000.0);
    let cl = r.adjusted.get(Ion::Cl);
    assert!(cl > 15_400.0 && cl < 15_430.0, "Cl = {cl}");
    assert!((r.adjusted_anion_meq - r.raw_cation_meq).abs() < 1e-3);
}

#[test]
fn scale_both_without_anions_does_not_divide_by_zero() {
    let raw = CompositionMap::new()
        .with(Ion::Na, 200.0)
        .with(Ion::Mg, 40.0);
    let scaled = correct_charge_balance(&raw, ChargeBalanceMode::ScaleBoth);
    let cations_only = correct_charge_balance(&raw, ChargeBalanceMode::CationsOnly);

    assert_eq!(scaled.adjusted, cations_only.adjusted);
    assert!(scaled.adjusted.iter().all(|(_, v)| v.is_finite()));
    assert!(scaled.adjusted_balance_meq.abs() < 1e-3);
}

#[test]
fn hardness_and_alkalinity_match_hand_calculation() {
    let map = CompositionMap::new()
        .with(Ion::Ca, 150.0)
        .with(Ion::Mg, 80.0)
        .with(Ion::Hco3, 350.0);
    let m = derive_metrics(&map);

    let hardness = (150.0 / 40.078 * 2.0 + 80.0 / 24.305 * 2.0) * 50.0;
    let alkalinity = (350.0 / 61.017) * 50.0;
    assert!((m.hardness_as_caco3 - hardness).abs() < 0.005, "{}", m.hardness_as_caco3);
    assert!((m.alkalinity_as_caco3 - alkalinity).abs() < 0.005, "{}", m.alkalinity_as_caco3);
    assert!((m.total_tds - 580.0).abs() < 1e-9);
    assert!((m.estimated_conductivity - 580.0 * 1.7).abs() < 1e-9);
}

#[test]
fn metrics_on_corrected_map_show_the_balance_closed() {
    let samples = samples();
    let raw = &samples[0];
    let before = derive_metrics(raw);
    let after = derive_metrics(&correct_charge_balance(raw, ChargeBalanceMode::AnionsOnly).adjusted);
    assert!(before.balance_error_pct > 1.0);
    assert!(after.balance_error_pct < 0.01);
    assert!(after.total_tds > before.total_tds);
    assert_eq!(after.hardness_as_caco3, before.hardness_as_caco3);
}
