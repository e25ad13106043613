#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::models::Percentages;

#[test]
fn test_limits_csv() {
    let split: Percentages = [(Category::Food, dec!(15)), (Category::Bills, dec!(85))]
        .into_iter()
        .collect();
    let plan = AllocationPlan::new(dec!(30000), split);

    let mut out = Vec::new();
    let count = write_limits_csv(&mut out, &plan).unwrap();
    assert_eq!(count, Category::all().len());

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "category,percentage,monthly,weekly,daily");
    assert_eq!(lines[1], "Food,15,4500,1035.67,150");
    assert!(lines.iter().any(|l| l.starts_with("Bills,85,25500,")));
    assert_eq!(lines.len(), Category::all().len() + 1);
}

#[test]
fn test_limits_csv_rejects_negative_total() {
    let plan = AllocationPlan::new(dec!(-5), Percentages::new());
    assert!(write_limits_csv(Vec::new(), &plan).is_err());
}

#[test]
fn test_parse_month() {
    assert_eq!(parse_month("2024-03").unwrap(), "2024-03");
    assert!(parse_month("2024-13").is_err());
    assert!(parse_month("march").is_err());
}

#[test]
fn test_shellexpand_plain_path() {
    assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
    assert!(!shellexpand("~/out.csv").starts_with('~'));
}
