//! Property tests for rebalancing: any sequence of edits keeps every share
//! in range and the total at 100 whenever there is something to rebalance.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::super::*;

// =============================================================================
// Generators
// =============================================================================

/// A balanced plan built from random weights, some of them zero.
fn arb_plan() -> impl Strategy<Value = Percentages> {
    proptest::collection::vec(prop_oneof![Just(0u32), 1u32..1000], Category::all().len())
        .prop_filter("at least one weight", |w| w.iter().any(|x| *x > 0))
        .prop_map(|weights| {
            let total: u32 = weights.iter().sum();
            let mut plan: Percentages = Category::all()
                .iter()
                .zip(&weights)
                .map(|(c, w)| {
                    let share = Decimal::from(*w) / Decimal::from(total) * HUNDRED;
                    (*c, round_percent(share))
                })
                .collect();
            absorb_residual(&mut plan, None);
            plan
        })
}

fn arb_category() -> impl Strategy<Value = Category> {
    (0..Category::all().len()).prop_map(|i| Category::all()[i])
}

/// Requested values with two decimals, including out-of-range ones.
fn arb_value() -> impl Strategy<Value = Decimal> {
    (-5000i64..=15000).prop_map(|v| Decimal::new(v, 2))
}

fn arb_edits() -> impl Strategy<Value = Vec<(Category, Decimal)>> {
    proptest::collection::vec((arb_category(), arb_value()), 1..20)
}

fn sum(p: &Percentages) -> Decimal {
    p.values().copied().sum()
}

fn others_sum(p: &Percentages, category: Category) -> Decimal {
    p.iter()
        .filter(|(c, _)| **c != category)
        .map(|(_, v)| *v)
        .sum()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_generated_plans_are_balanced(plan in arb_plan()) {
        prop_assert_eq!(sum(&plan), dec!(100));
        prop_assert!(validate_for_save(&plan));
    }

    #[test]
    fn prop_edit_sequences_keep_total_at_hundred(plan in arb_plan(), edits in arb_edits()) {
        let mut current = plan;
        for (category, value) in edits {
            let zero_base = others_sum(&current, category).is_zero();
            let next = set_category_percentage(&current, category, value);

            prop_assert!(next.values().all(|p| *p >= Decimal::ZERO && *p <= dec!(100)));
            prop_assert_eq!(next[&category], value.clamp(Decimal::ZERO, dec!(100)));

            // Re-entering the current value rescales nothing
            let changed = next != current;
            let others_positive = next
                .iter()
                .any(|(c, p)| *c != category && *p > Decimal::ZERO);
            if changed && zero_base {
                prop_assert!(!others_positive);
            } else if changed && others_positive {
                prop_assert!(validate_for_save(&next), "sum {} after {category} = {value}", sum(&next));
            } else if changed {
                // Everything else rounded away to zero
                prop_assert!((sum(&next) - dec!(100)).abs() < dec!(0.05));
            }
            current = next;
        }
    }

    #[test]
    fn prop_setting_current_value_is_noop(plan in arb_plan(), category in arb_category()) {
        let value = plan.get(&category).copied().unwrap_or(Decimal::ZERO);
        prop_assert_eq!(set_category_percentage(&plan, category, value), plan);
    }

    #[test]
    fn prop_values_above_hundred_take_everything(
        plan in arb_plan(),
        category in arb_category(),
        excess in 1i64..100_000,
    ) {
        let next = set_category_percentage(&plan, category, dec!(100) + Decimal::new(excess, 2));
        prop_assert_eq!(next[&category], dec!(100));
        prop_assert!(next.iter().all(|(c, p)| *c == category || p.is_zero()));
    }

    #[test]
    fn prop_negative_values_act_like_zero(
        plan in arb_plan(),
        category in arb_category(),
        below in 1i64..100_000,
    ) {
        let clamped = set_category_percentage(&plan, category, -Decimal::new(below, 2));
        let zeroed = set_category_percentage(&plan, category, Decimal::ZERO);
        prop_assert_eq!(clamped, zeroed);
    }
}
