#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_empty() {
    assert_eq!(truncate("", 5), "");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_unicode() {
    // Japanese characters are multi-byte UTF-8
    assert_eq!(truncate("日本語テスト", 4), "日本語…");
}

#[test]
fn test_truncate_emoji() {
    assert_eq!(truncate("🎉🎊🎈🎁", 3), "🎉🎊…");
}

#[test]
fn test_truncate_one_char() {
    assert_eq!(truncate("hello", 1), "…");
}

#[test]
fn test_truncate_mixed_unicode() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

#[test]
fn test_truncate_two_chars() {
    assert_eq!(truncate("hello", 2), "h…");
}

#[test]
fn test_truncate_single_char_string() {
    assert_eq!(truncate("a", 1), "a");
    assert_eq!(truncate("a", 5), "a");
}

#[test]
fn test_truncate_max_one_with_long_string() {
    // max=1 should always produce "…" for strings longer than 1
    assert_eq!(truncate("ab", 1), "…");
    assert_eq!(truncate("abc", 1), "…");
}

// ── format_amount ──────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(dec!(1234.56)), "1,234.56");
}

#[test]
fn test_format_amount_zero() {
    assert_eq!(format_amount(dec!(0)), "0.00");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.5)), "-42.50");
}

#[test]
fn test_format_amount_millions() {
    assert_eq!(format_amount(dec!(10000000)), "10,000,000.00");
}

#[test]
fn test_format_amount_weekly_limit() {
    // 4500 / 4.345
    assert_eq!(format_amount(dec!(1035.673187571921749136939010)), "1,035.67");
}

// ── format_percent ─────────────────────────────────────────

#[test]
fn test_format_percent_whole() {
    assert_eq!(format_percent(dec!(15)), "15.00%");
}

#[test]
fn test_format_percent_rounds_half_away() {
    assert_eq!(format_percent(dec!(8.235)), "8.24%");
    assert_eq!(format_percent(dec!(0)), "0.00%");
}

// ── ratio_bar ──────────────────────────────────────────────

#[test]
fn test_ratio_bar_fill() {
    assert_eq!(ratio_bar(0.5, 4), "██░░");
    assert_eq!(ratio_bar(0.0, 3), "░░░");
}

#[test]
fn test_ratio_bar_clamps_overflow() {
    assert_eq!(ratio_bar(2.5, 4), "████");
    assert_eq!(ratio_bar(-1.0, 2), "░░");
}

// ── scrolling ──────────────────────────────────────────────

#[test]
fn test_scroll_down_moves_window() {
    let (mut index, mut scroll) = (2, 0);
    scroll_down(&mut index, &mut scroll, 11, 3);
    assert_eq!((index, scroll), (3, 1));
}

#[test]
fn test_scroll_down_stops_at_end() {
    let (mut index, mut scroll) = (10, 8);
    scroll_down(&mut index, &mut scroll, 11, 3);
    assert_eq!((index, scroll), (10, 8));
}

#[test]
fn test_scroll_up_and_bounds() {
    let (mut index, mut scroll) = (3, 3);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (2, 2));
    scroll_to_bottom(&mut index, &mut scroll, 11, 4);
    assert_eq!((index, scroll), (10, 7));
    scroll_to_top(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
}
