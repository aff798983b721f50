use chrono::DateTime;

/// Formats a price label: fixed decimal digits plus thousands separators.
#[must_use]
pub fn format_price(value: f64, precision: u32) -> String {
    let formatted = format!("{value:.prec$}", prec = precision as usize);
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };

    let (integer_part, fraction_part) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let grouped = integer_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");

    match fraction_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Formats a unix-millisecond timestamp as `D/M/YYYY H:MM:SS` (UTC).
#[must_use]
pub fn format_time(time_ms: f64) -> String {
    DateTime::from_timestamp_millis(time_ms as i64)
        .map(|time| time.format("%-d/%-m/%Y %-H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Compact "money" notation for header indicators: `1.23k`, `45.6m`, `7b`.
///
/// Precision shrinks as magnitude grows so the label width stays stable.
#[must_use]
pub fn format_money(value: f64) -> String {
    if value >= 100_000_000_000.0 {
        return format!("{}b", (value / 1_000_000_000.0).round());
    }
    if value >= 10_000_000_000.0 {
        return format!("{}b", (value / 100_000_000.0).round() / 10.0);
    }
    if value >= 1_000_000_000.0 {
        return format!("{}b", (value / 10_000_000.0).round() / 100.0);
    }
    if value >= 100_000_000.0 {
        return format!("{}m", (value / 1_000_000.0).round());
    }
    if value >= 10_000_000.0 {
        return format!("{:.1}m", (value / 100_000.0).round() / 10.0);
    }
    if value >= 1_000_000.0 {
        return format!("{:.2}m", (value / 10_000.0).round() / 100.0);
    }
    if value >= 100_000.0 {
        return format!("{}k", (value / 1000.0).round());
    }
    if value >= 10_000.0 {
        return format!("{:.1}k", (value / 100.0).round() / 10.0);
    }
    if value >= 1000.0 {
        return format!("{:.2}k", (value / 10.0).round() / 100.0);
    }
    if value >= 100.0 {
        return format!("{}", value.round());
    }
    if value >= 10.0 {
        return format!("{:.1}", (value * 10.0).round() / 10.0);
    }
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

/// Formats a signed 24h price change percentage (`+1.23%`).
#[must_use]
pub fn format_price_change_percent(percent: f64) -> String {
    if percent > 0.0 {
        format!("+{percent}%")
    } else {
        format!("{percent}%")
    }
}
