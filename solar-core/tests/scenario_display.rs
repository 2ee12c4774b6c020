//! End-to-end derivations over a recorded financial API response.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use solar_core::calculations::break_even::{Agreement, locate, reconcile};
use solar_core::calculations::common::cumulative_sums;
use solar_core::calculations::{Column, build, select};
use solar_core::simulator::derive_view;
use solar_core::{Scenario, ScenarioFlags, ScenarioSet, TableError};

const RESPONSE: &str = include_str!("fixtures/scenario_set.json");

fn fixture() -> ScenarioSet {
    serde_json::from_str(RESPONSE).expect("fixture should deserialize")
}

fn all_flags() -> [ScenarioFlags; 4] {
    [
        ScenarioFlags::new(false, false),
        ScenarioFlags::new(true, false),
        ScenarioFlags::new(false, true),
        ScenarioFlags::new(true, true),
    ]
}

// =============================================================================
// Break-even examples
// =============================================================================

#[test]
fn break_even_examples() {
    assert_eq!(locate(&[dec!(100), dec!(-50), dec!(30)]), Some(0));
    assert_eq!(locate(&[dec!(-100), dec!(-20), dec!(150), dec!(10)]), Some(2));
    assert_eq!(locate(&[dec!(-50), dec!(-50), dec!(-50)]), None);
}

#[test]
fn fixture_break_even_per_scenario() {
    let set = fixture();
    let expected = [
        (Scenario::Base, Some(3)),
        (Scenario::WithTaxBenefit, Some(2)),
        (Scenario::WithLeasing, None),
        (Scenario::WithLeasingAndTaxBenefit, Some(1)),
    ];

    for (scenario, year) in expected {
        let selected = select(&set, scenario.flags()).unwrap();
        assert_eq!(locate(selected.flows), year, "{scenario:?}");
    }
}

// =============================================================================
// Backend trust boundary
// =============================================================================

#[test]
fn backend_payback_agrees_with_its_flows() {
    let set = fixture();

    for flags in all_flags() {
        let view = derive_view(&set, flags).unwrap();
        assert_eq!(view.payback_check, Agreement::Match, "{:?}", view.scenario);
    }
}

#[test]
fn tampered_payback_is_detected() {
    let mut set = fixture();
    if let Some(indicators) = set.indicators_leasing_tax_benefit.as_mut() {
        indicators.payback = Some(dec!(3));
    }

    let view = derive_view(&set, ScenarioFlags::new(true, true)).unwrap();

    assert_eq!(
        view.payback_check,
        Agreement::Mismatch {
            local: Some(1),
            backend: Some(dec!(3)),
        }
    );
    // The displayed break-even still comes from the flows.
    assert_eq!(view.break_even, Some(1));
}

#[test]
fn reconcile_none_against_none() {
    assert_eq!(reconcile(&[dec!(-1)], None), Agreement::Match);
}

// =============================================================================
// Table
// =============================================================================

#[test]
fn every_scenario_table_has_one_row_per_year() {
    let set = fixture();

    for flags in all_flags() {
        let table = build(&set, flags).unwrap();
        assert_eq!(table.rows.len(), set.horizon());
        assert!(table.rows.iter().all(|r| r.cells.len() == table.columns.len()));
    }
}

#[test]
fn cumulative_equals_prefix_sum_for_every_scenario() {
    let set = fixture();

    for flags in all_flags() {
        let table = build(&set, flags).unwrap();
        let flows = set.flows(flags.scenario()).unwrap();
        assert_eq!(table.net_flows(), flows);
        assert_eq!(table.cumulative_flows(), cumulative_sums(flows));
    }
}

#[test]
fn toggling_any_flag_on_then_off_restores_the_table() {
    let set = fixture();

    for flags in all_flags() {
        let before = build(&set, flags).unwrap();
        for toggled in [
            ScenarioFlags::new(!flags.include_tax_benefit, flags.include_leasing),
            ScenarioFlags::new(flags.include_tax_benefit, !flags.include_leasing),
        ] {
            let _ = build(&set, toggled).unwrap();
            assert_eq!(build(&set, flags).unwrap(), before);
        }
    }
}

#[test]
fn leasing_with_benefits_formatted_row() {
    let table = build(&fixture(), ScenarioFlags::new(true, true)).unwrap();

    assert_eq!(table.columns.len(), 13);
    assert_eq!(table.columns[7], Column::LeasingCost);
    assert_eq!(
        table.formatted_rows()[1],
        vec![
            "1",
            "36000",
            "$ 896,4",
            "$ 7.570.000",
            "$ 18.000.000",
            "$ 1.500.000",
            "$ 2.000.000",
            "-$ 11.000.000",
            "$ 20.000.000",
            "$ 9.000.000",
            "$ 16.000.000",
            "$ 3.000.000",
            "$ 3.000.000",
        ]
    );
}

#[test]
fn truncated_flow_array_is_rejected() {
    let mut set = fixture();
    set.flows_base = Some(vec![dec!(-83000000), dec!(20000000)]);

    assert_eq!(
        build(&set, ScenarioFlags::default()),
        Err(TableError::LengthMismatch {
            scenario: Scenario::Base,
            rows: 4,
            flows: 2,
        })
    );
}

// =============================================================================
// Properties
// =============================================================================

fn flows_and_flags() -> impl Strategy<Value = (Vec<Decimal>, bool, bool)> {
    (
        prop::collection::vec(-100_000_000_i64..100_000_000_i64, 1..36)
            .prop_map(|v| v.into_iter().map(Decimal::from).collect()),
        any::<bool>(),
        any::<bool>(),
    )
}

proptest! {
    #[test]
    fn cumulative_row_is_sum_of_net_flows((flows, tax, leasing) in flows_and_flags()) {
        let mut set = fixture();
        let template = set.rows[1].clone();
        set.rows = (0..flows.len() as u32)
            .map(|year| { let mut row = template.clone(); row.year = year; row })
            .collect();
        set.flows_base = Some(flows.clone());
        set.flows_tax_benefit = Some(flows.clone());
        set.flows_leasing = Some(flows.clone());
        set.flows_leasing_tax_benefit = Some(flows.clone());

        let table = build(&set, ScenarioFlags::new(tax, leasing)).unwrap();
        let cumulative = table.cumulative_flows();

        for i in 0..flows.len() {
            let expected: Decimal = flows[..=i].iter().sum();
            prop_assert_eq!(cumulative[i], expected);
        }
    }
}
