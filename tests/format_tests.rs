use minichart_rs::render::axes::{linear_ticks, time_ticks};
use minichart_rs::render::format::{format_money, format_price, format_time};

#[test]
fn prices_group_thousands_and_fix_decimals() {
    assert_eq!(format_price(1234567.891, 2), "1,234,567.89");
    assert_eq!(format_price(1000.0, 0), "1,000");
    assert_eq!(format_price(999.5, 1), "999.5");
    assert_eq!(format_price(0.5, 3), "0.500");
    assert_eq!(format_price(-1234.5, 1), "-1,234.5");
}

#[test]
fn times_format_as_day_month_year_clock() {
    // 2021-01-02 03:04:05 UTC
    assert_eq!(format_time(1_609_556_645_000.0), "2/1/2021 3:04:05");
    // 2021-12-31 23:59:59 UTC
    assert_eq!(format_time(1_640_995_199_000.0), "31/12/2021 23:59:59");
}

#[test]
fn money_notation_compacts_by_magnitude() {
    assert_eq!(format_money(3.14159), "3.14");
    assert_eq!(format_money(42.25), "42.3");
    assert_eq!(format_money(512.0), "512");
    assert_eq!(format_money(1234.0), "1.23k");
    assert_eq!(format_money(45_600.0), "45.6k");
    assert_eq!(format_money(123_000.0), "123k");
    assert_eq!(format_money(1_234_000.0), "1.23m");
    assert_eq!(format_money(12_340_000.0), "12.3m");
    assert_eq!(format_money(123_400_000.0), "123m");
    assert_eq!(format_money(1_234_000_000.0), "1.23b");
    assert_eq!(format_money(123_400_000_000.0), "123b");
}

#[test]
fn linear_ticks_land_on_nice_steps() {
    assert_eq!(linear_ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    assert_eq!(linear_ticks(0.0, 100.0, 10), (0..=10).map(|i| i as f64 * 10.0).collect::<Vec<_>>());
    assert!(linear_ticks(5.0, 5.0, 5).is_empty());
    assert!(linear_ticks(0.0, 1.0, 0).is_empty());
}

#[test]
fn linear_ticks_handle_descending_domains() {
    let descending = linear_ticks(100.0, 0.0, 10);
    assert_eq!(descending.first(), Some(&100.0));
    assert_eq!(descending.last(), Some(&0.0));
}

#[test]
fn time_ticks_align_to_the_interval_ladder() {
    const MINUTE: f64 = 60_000.0;

    // A 10-minute span at 10 ticks selects the 1-minute step.
    let ticks = time_ticks(0.0, 10.0 * MINUTE, 10);
    assert_eq!(ticks.len(), 11);
    assert!(ticks.iter().all(|t| t % MINUTE == 0.0));

    // Fewer requested ticks move up the ladder.
    let sparse = time_ticks(0.0, 10.0 * MINUTE, 3);
    assert!(sparse.len() <= 3);
    assert!(sparse.iter().all(|t| t % (5.0 * MINUTE) == 0.0));

    assert!(time_ticks(10.0, 10.0, 5).is_empty());
}
