#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::allocator::compute_derived_limits;
use crate::models::Percentages;

fn me() -> UserId {
    UserId::new("a@uni.edu").unwrap()
}

fn spend(category: Category, amount: Decimal, day: &str) -> Expense {
    Expense::new(
        "a@uni.edu".into(),
        category,
        amount,
        NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
    )
}

/// Total 1000: Food 200, Transport 100, Bills 700.
fn limits() -> BTreeMap<Category, PeriodLimits> {
    let split: Percentages = [
        (Category::Food, dec!(20)),
        (Category::Transport, dec!(10)),
        (Category::Bills, dec!(70)),
    ]
    .into_iter()
    .collect();
    compute_derived_limits(dec!(1000), &split).unwrap()
}

#[test]
fn test_advice_tiers() {
    assert_eq!(Advice::for_percent(dec!(120)), Advice::Freeze);
    assert_eq!(Advice::for_percent(dec!(100)), Advice::Reduce);
    assert_eq!(Advice::for_percent(dec!(80)), Advice::Reduce);
    assert_eq!(Advice::for_percent(dec!(75)), Advice::Monitor);
    assert_eq!(Advice::for_percent(dec!(51)), Advice::Monitor);
    assert_eq!(Advice::for_percent(dec!(50)), Advice::Safe);
    assert_eq!(Advice::for_percent(Decimal::ZERO), Advice::Safe);
    assert_eq!(format!("{}", Advice::Freeze), "Immediate spending freeze needed");
}

#[test]
fn test_summary_groups_and_sorts() {
    let expenses = vec![
        spend(Category::Food, dec!(150), "2024-05-02"),
        spend(Category::Food, dec!(100), "2024-05-20"),
        spend(Category::Transport, dec!(60), "2024-05-03"),
        spend(Category::Bills, dec!(100), "2024-05-01"),
    ];

    let summary = summarize(&expenses, &limits(), &me(), None);
    let order: Vec<Category> = summary.iter().map(|i| i.category).collect();
    assert_eq!(order, vec![Category::Food, Category::Transport, Category::Bills]);

    let food = &summary[0];
    assert_eq!(food.spent, dec!(250));
    assert_eq!(food.limit, dec!(200));
    assert_eq!(food.count, 2);
    assert_eq!(food.spent_percent, Some(dec!(125)));
    assert_eq!(food.advice, Advice::Freeze);
    assert_eq!(food.ratio(), 1.0);

    assert_eq!(summary[1].advice, Advice::Monitor);
    assert_eq!(summary[2].advice, Advice::Safe);
}

#[test]
fn test_summary_filters_month_and_user() {
    let mut other_user = spend(Category::Food, dec!(999), "2024-05-04");
    other_user.email = "b@uni.edu".into();
    let mut undated = spend(Category::Food, dec!(5), "2024-05-04");
    undated.date = None;

    let expenses = vec![
        spend(Category::Food, dec!(40), "2024-05-10"),
        spend(Category::Food, dec!(80), "2024-04-28"),
        other_user,
        undated,
    ];

    let may = summarize(&expenses, &limits(), &me(), Some("2024-05"));
    assert_eq!(may.len(), 1);
    assert_eq!(may[0].spent, dec!(40));
    assert_eq!(may[0].spent_percent, Some(dec!(20)));

    let all = summarize(&expenses, &limits(), &me(), None);
    assert_eq!(all[0].spent, dec!(125));
}

#[test]
fn test_spending_without_limit_is_over_budget() {
    let expenses = vec![
        spend(Category::Snacks, dec!(3), "2024-05-10"),
        spend(Category::Bills, dec!(700), "2024-05-10"),
    ];
    let summary = summarize(&expenses, &limits(), &me(), None);

    assert_eq!(summary[0].category, Category::Snacks);
    assert_eq!(summary[0].spent_percent, None);
    assert_eq!(summary[0].advice, Advice::Freeze);
    assert_eq!(summary[0].ratio(), 1.0);
    assert_eq!(summary[1].advice, Advice::Reduce);
}

#[test]
fn test_no_expenses_no_insights() {
    assert!(summarize(&[], &limits(), &me(), None).is_empty());
}

#[test]
fn test_huge_amounts_saturate_instead_of_overflowing() {
    let expenses = vec![
        spend(Category::Food, Decimal::MAX, "2024-03-01"),
        spend(Category::Food, Decimal::MAX, "2024-03-02"),
    ];
    let summary = summarize(&expenses, &limits(), &me(), None);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].spent, Decimal::MAX);
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[0].advice, Advice::Freeze);
    assert_eq!(summary[0].ratio(), 1.0);
}

#[test]
fn test_tiny_limit_caps_spent_percent() {
    let mut tiny = BTreeMap::new();
    tiny.insert(
        Category::Snacks,
        PeriodLimits {
            monthly: Decimal::new(1, 28),
            ..PeriodLimits::default()
        },
    );
    let expenses = vec![spend(Category::Snacks, dec!(1000000), "2024-03-01")];
    let summary = summarize(&expenses, &tiny, &me(), None);
    assert_eq!(summary[0].spent_percent, Some(Decimal::MAX));
    assert_eq!(summary[0].advice, Advice::Freeze);
}
