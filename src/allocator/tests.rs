#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{AllocationPlan, Category::*};

fn sample() -> Percentages {
    [
        (Food, dec!(15)),
        (Transport, dec!(10)),
        (Entertainment, dec!(5)),
        (Bills, dec!(20)),
        (Savings, dec!(15)),
        (Shopping, dec!(8)),
        (Utilities, dec!(10)),
        (Health, dec!(5)),
        (Snacks, dec!(3)),
        (Fitness, dec!(4)),
        (Others, dec!(5)),
    ]
    .into_iter()
    .collect()
}

fn sum(p: &Percentages) -> Decimal {
    p.values().copied().sum()
}

fn within_tolerance(p: &Percentages) -> bool {
    (sum(p) - dec!(100)).abs() <= dec!(0.01)
}

// ── set_category_percentage ───────────────────────────────────

#[test]
fn test_sample_sums_to_hundred() {
    assert_eq!(sum(&sample()), dec!(100));
}

#[test]
fn test_rebalance_scales_others_proportionally() {
    let updated = set_category_percentage(&sample(), Food, dec!(30));

    assert_eq!(updated[&Food], dec!(30));
    // 5 * 70/85 = 4.1176... and 20 * 70/85 = 16.4705...
    assert_eq!(updated[&Entertainment], dec!(4.12));
    assert_eq!(updated[&Bills], dec!(16.47));
    assert_eq!(updated[&Savings], dec!(12.35));
    assert_eq!(updated[&Utilities], dec!(8.24));
    // Scaled others sum to 70.01; the -0.01 residual lands on Transport (8.24 -> 8.23)
    assert_eq!(updated[&Transport], dec!(8.23));
    assert_eq!(sum(&updated), dec!(100));
}

#[test]
fn test_sum_invariant_across_edit_sequence() {
    let edits = [
        (Food, dec!(30)),
        (Bills, dec!(10)),
        (Savings, dec!(50)),
        (Transport, dec!(0)),
        (Others, dec!(12.5)),
        (Health, dec!(33.33)),
        (Food, dec!(1)),
        (Snacks, dec!(99.99)),
        (Fitness, dec!(7)),
    ];

    let mut p = sample();
    for (category, value) in edits {
        p = set_category_percentage(&p, category, value);
        assert!(
            within_tolerance(&p),
            "sum {} out of tolerance after {category} = {value}",
            sum(&p)
        );
        assert!(p.values().all(|v| *v >= Decimal::ZERO && *v <= dec!(100)));
        assert_eq!(p[&category], value);
    }
}

#[test]
fn test_setting_current_value_is_noop() {
    let p = sample();
    let updated = set_category_percentage(&p, Bills, dec!(20));
    assert_eq!(updated, p);
}

#[test]
fn test_clamps_above_hundred() {
    let updated = set_category_percentage(&sample(), Food, dec!(150));
    assert_eq!(updated[&Food], dec!(100));
    for (c, v) in &updated {
        if *c != Food {
            assert_eq!(*v, Decimal::ZERO, "{c} should be zero");
        }
    }
    assert_eq!(sum(&updated), dec!(100));
}

#[test]
fn test_clamps_below_zero() {
    let updated = set_category_percentage(&sample(), Snacks, dec!(-20));
    assert_eq!(updated[&Snacks], Decimal::ZERO);
    assert!(within_tolerance(&updated));
}

#[test]
fn test_zero_base_leaves_total_below_hundred() {
    let mut p = AllocationPlan::empty().percentages;
    p.insert(Food, dec!(100));

    let updated = set_category_percentage(&p, Food, dec!(40));
    assert_eq!(updated[&Food], dec!(40));
    assert!(updated
        .iter()
        .filter(|(c, _)| **c != Food)
        .all(|(_, v)| v.is_zero()));
    assert_eq!(sum(&updated), dec!(40));
}

#[test]
fn test_edit_from_empty_plan() {
    let p = AllocationPlan::empty().percentages;
    let updated = set_category_percentage(&p, Savings, dec!(100));
    assert_eq!(updated[&Savings], dec!(100));
    assert_eq!(sum(&updated), dec!(100));
}

#[test]
fn test_edit_inserts_missing_category() {
    let mut p = Percentages::new();
    p.insert(Food, dec!(60));
    p.insert(Bills, dec!(40));

    let updated = set_category_percentage(&p, Others, dec!(20));
    assert_eq!(updated[&Others], dec!(20));
    assert_eq!(updated[&Food], dec!(48));
    assert_eq!(updated[&Bills], dec!(32));
}

// ── absorb_residual ───────────────────────────────────────────

#[test]
fn test_residual_skips_category_that_would_go_negative() {
    let mut p = Percentages::new();
    p.insert(Food, dec!(0.01));
    p.insert(Transport, dec!(50));
    p.insert(Bills, dec!(50.02));

    absorb_residual(&mut p, None);
    assert_eq!(p[&Food], dec!(0.01));
    assert_eq!(p[&Transport], dec!(49.97));
    assert_eq!(sum(&p), dec!(100));
}

#[test]
fn test_residual_uncorrected_without_positive_target() {
    let mut p = Percentages::new();
    p.insert(Food, dec!(99.98));
    p.insert(Transport, Decimal::ZERO);

    absorb_residual(&mut p, Some(Food));
    assert_eq!(p[&Transport], Decimal::ZERO);
    assert_eq!(sum(&p), dec!(99.98));
}

#[test]
fn test_negative_residual_spread_when_no_single_category_absorbs_it() {
    let mut p = Percentages::new();
    p.insert(Food, dec!(99.99));
    p.insert(Transport, dec!(0.01));
    p.insert(Bills, dec!(0.01));
    p.insert(Savings, dec!(0.01));

    absorb_residual(&mut p, Some(Food));
    assert_eq!(p[&Food], dec!(99.99));
    assert_eq!(p[&Transport], Decimal::ZERO);
    assert_eq!(p[&Bills], Decimal::ZERO);
    assert_eq!(p[&Savings], dec!(0.01));
    assert_eq!(sum(&p), dec!(100));
}

#[test]
fn test_round_percent_rounds_half_away_from_zero() {
    assert_eq!(round_percent(dec!(2.345)), dec!(2.35));
    assert_eq!(round_percent(dec!(2.344)), dec!(2.34));
}

// ── compute_derived_limits ────────────────────────────────────

#[test]
fn test_derived_limits() {
    let limits = compute_derived_limits(dec!(30000), &sample()).unwrap();
    let food = limits[&Food];
    assert_eq!(food.monthly, dec!(4500));
    assert_eq!(food.daily, dec!(150));
    assert_eq!(food.weekly.round_dp(2), dec!(1035.67));
}

#[test]
fn test_derived_limits_cover_every_category() {
    let limits = compute_derived_limits(dec!(1000), &Percentages::new()).unwrap();
    assert_eq!(limits.len(), Category::all().len());
    assert!(limits.values().all(|l| l.monthly.is_zero()));
}

#[test]
fn test_derived_monthly_sums_to_total() {
    let limits = compute_derived_limits(dec!(1234.56), &sample()).unwrap();
    let total: Decimal = limits.values().map(|l| l.monthly).sum();
    assert_eq!(total, dec!(1234.56));
}

#[test]
fn test_derived_limits_reject_negative_total() {
    let err = compute_derived_limits(dec!(-1), &sample()).unwrap_err();
    assert!(matches!(err, BudgetError::InvalidBudget(_)));
}

#[test]
fn test_derived_limits_reject_unrepresentable_total() {
    let split: Percentages = [(Savings, dec!(100))].into_iter().collect();
    let err = compute_derived_limits(Decimal::MAX, &split).unwrap_err();
    assert!(matches!(err, BudgetError::InvalidBudget(_)));
}

#[test]
fn test_derived_limits_for_very_large_total() {
    let total = dec!(1000000000000000000000000);
    let split: Percentages = [(Savings, dec!(100))].into_iter().collect();
    let limits = compute_derived_limits(total, &split).unwrap();
    assert_eq!(limits[&Savings].monthly, total);
}

// ── parse_total_budget ────────────────────────────────────────

#[test]
fn test_parse_total_budget() {
    assert_eq!(parse_total_budget(" 30000 ").unwrap(), dec!(30000));
    assert_eq!(parse_total_budget("0").unwrap(), Decimal::ZERO);
    assert_eq!(parse_total_budget("1500.50").unwrap(), dec!(1500.50));
}

#[test]
fn test_parse_total_budget_rejects_bad_input() {
    for input in [
        "",
        "   ",
        "abc",
        "-5",
        "12,000",
        "79228162514264337593543950335",
    ] {
        assert!(
            matches!(parse_total_budget(input), Err(BudgetError::InvalidBudget(_))),
            "{input:?} should be rejected"
        );
    }
}

// ── validate_for_save ─────────────────────────────────────────

fn pair(a: Decimal, b: Decimal) -> Percentages {
    [(Food, a), (Bills, b)].into_iter().collect()
}

#[test]
fn test_validate_for_save() {
    assert!(validate_for_save(&sample()));
    assert!(validate_for_save(&pair(dec!(50), dec!(50.00))));
    assert!(validate_for_save(&pair(dec!(49.995), dec!(50))));
    assert!(validate_for_save(&pair(dec!(49.99), dec!(50))));
    assert!(!validate_for_save(&pair(dec!(49.5), dec!(50))));
    assert!(!validate_for_save(&pair(dec!(50.5), dec!(50))));
    assert!(!validate_for_save(&pair(dec!(49.98), dec!(50))));
    assert!(!validate_for_save(&Percentages::new()));
}

#[path = "props.rs"]
mod props;
