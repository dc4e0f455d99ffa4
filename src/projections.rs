use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::models::Session;


/// Dashboard figures derived from a session set
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    pub total_profit: i64,
    /// 0.0 for an empty set
    pub avg_profit: f64,
    /// Percentage of sessions that finished ahead
    pub win_rate: f64,
    pub total_hours: f64,
    pub avg_hours: f64,
    pub hourly_rate: Option<f64>,
    /// Sessions whose duration could not be read
    pub untimed_sessions: usize,
}

/// One month of the bankroll chart
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SeriesPoint {
    pub month: String,
    pub profit: i64,
    pub cumulative: i64,
    pub sessions: usize,
}

pub fn session_profit(session: &Session) -> i64 {
    session.profit()
}

pub fn summarize(sessions: &[Session]) -> Summary {
    let count = sessions.len();
    let total_profit = sessions
        .iter()
        .map(session_profit)
        .fold(0i64, i64::saturating_add);
    let winners = sessions.iter().filter(|s| session_profit(s) > 0).count();

    let mut total_hours = 0.0;
    let mut timed = 0usize;
    let mut timed_profit = 0i64;
    for session in sessions {
        if let Some(hours) = parse_duration_hours(&session.duration) {
            total_hours += hours;
            timed += 1;
            timed_profit = timed_profit.saturating_add(session_profit(session));
        }
    }

    Summary {
        count,
        total_profit,
        avg_profit: ratio(total_profit as f64, count),
        win_rate: ratio(winners as f64 * 100.0, count),
        total_hours,
        avg_hours: ratio(total_hours, timed),
        hourly_rate: (total_hours > 0.0).then(|| timed_profit as f64 / total_hours),
        untimed_sessions: count - timed,
    }
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// Monthly profit with running total, oldest month first.
pub fn profit_series(sessions: &[Session]) -> Vec<SeriesPoint> {
    let mut months: BTreeMap<(i32, u32), (i64, usize)> = BTreeMap::new();
    for session in sessions {
        let entry = months
            .entry((session.date.year(), session.date.month()))
            .or_insert((0, 0));
        entry.0 = entry.0.saturating_add(session_profit(session));
        entry.1 += 1;
    }

    let mut cumulative = 0i64;
    months
        .into_iter()
        .map(|((year, month), (profit, count))| {
            cumulative = cumulative.saturating_add(profit);
            SeriesPoint {
                month: format!("{year:04}-{month:02}"),
                profit,
                cumulative,
                sessions: count,
            }
        })
        .collect()
}

/// Reads a free-text duration as hours.
/// Accepts `4.5`, `3:30`, and unit forms like `4h`, `270m`, `3h 30m`.
pub fn parse_duration_hours(raw: &str) -> Option<f64> {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Some((h, m)) = text.split_once(':') {
        let hours: u32 = h.trim().parse().ok()?;
        let minutes: u32 = m.trim().parse().ok()?;
        if minutes >= 60 {
            return None;
        }
        return Some(hours as f64 + minutes as f64 / 60.0);
    }

    if let Ok(hours) = text.parse::<f64>() {
        return (hours.is_finite() && hours >= 0.0).then_some(hours);
    }

    let mut chars = text.chars().filter(|c| !c.is_whitespace()).peekable();
    let mut total = 0.0;
    while chars.peek().is_some() {
        let mut number = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                chars.next();
            } else {
                break;
            }
        }
        let mut unit = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_alphabetic() {
                unit.push(c);
                chars.next();
            } else {
                break;
            }
        }

        let value: f64 = number.parse().ok()?;
        match unit.as_str() {
            "h" | "hr" | "hrs" | "hour" | "hours" => total += value,
            "m" | "min" | "mins" | "minute" | "minutes" => total += value / 60.0,
            _ => return None,
        }
    }
    Some(total)
}
