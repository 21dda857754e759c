// src/ingest/delivery.rs
//! Delivery text → `{earliest, latest}` window and shipping cost.
//!
//! Marketplace delivery strings are scraped page text, e.g.
//! `"FREE delivery Tue, Dec 10 on $35 of items shipped by Amazon Or fastest delivery Tomorrow, Dec 6"`.
//! The grammar here is deliberately small:
//!
//! 1. Candidate phrases follow a marker: `FREE delivery`, `$4.99 delivery` or
//!    `fastest delivery`. A marker phrase ends at a boundary word (`on`, `or`,
//!    `for`, ...) or at the next marker. Without any marker, or when no marker
//!    phrase holds a date, the whole string is parsed.
//! 2. `Today` / `Tomorrow` prefixes are dropped; the date token carries the date.
//!    A candidate holding only the relative word resolves against `today`.
//! 3. `Mon D` is a single day, `Mon D1 - D2` and `Mon D1 - Mon2 D2` are two days;
//!    the second day never lands before the first.
//! 4. The year is inferred from `today` (see [`infer_year`]).
//!
//! Nothing here fails: unparsable text yields `DeliveryWindow::UNKNOWN`.

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::types::{DeliveryCost, DeliveryWindow};

/// Dates further in the past than this are assumed to belong to next year.
pub const YEAR_ROLLOVER_DAYS: i64 = 31;

const MONTH: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

fn free_marker_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)free\s+(?:delivery|shipping)\b(?P<phrase>.*?)(?:\s+(?:on|or|for|if|when|with|to|fastest)\b|\s*\$|$)",
        )
        .expect("free marker regex")
    })
}

fn paid_marker_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\$\s*\d[\d,]*(?:\.\d+)?\s+(?:delivery|shipping)\b(?P<phrase>.*?)(?:\s+(?:on|or|for|if|when|with|to|fastest)\b|\s*\$|$)",
        )
        .expect("paid marker regex")
    })
}

fn fastest_marker_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)fastest\s+delivery\b(?P<phrase>.*?)(?:\s*(?:free\s+(?:delivery|shipping)|\$\s*\d[\d,]*(?:\.\d+)?\s+(?:delivery|shipping))|$)",
        )
        .expect("fastest marker regex")
    })
}

fn relative_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?P<word>today|tomorrow)\b,?\s*").expect("relative regex"))
}

fn date_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)\b(?P<m1>{month})\.?\s+(?P<d1>\d{{1,2}})\b(?:\s*[-–—]\s*(?:(?P<m2>{month})\.?\s+)?(?P<d2>\d{{1,2}})\b)?",
            month = MONTH
        );
        Regex::new(&pattern).expect("date regex")
    })
}

fn paid_cost_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\$\s*(?P<cost>\d[\d,]*(?:\.\d+)?)\s+(?:delivery|shipping)")
            .expect("paid cost regex")
    })
}

/// Month number from an English month name or abbreviation.
fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let m = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

/// Resolve a month/day against `today`: this year, unless that lands more than
/// [`YEAR_ROLLOVER_DAYS`] in the past, in which case next year.
pub fn infer_year(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(d) if d >= today - Duration::days(YEAR_ROLLOVER_DAYS) => Some(d),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

/// Second day of a range: the first on-or-after `start` with that month/day.
fn range_end(start: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    match NaiveDate::from_ymd_opt(start.year(), month, day) {
        Some(d) if d >= start => Some(d),
        _ => NaiveDate::from_ymd_opt(start.year() + 1, month, day),
    }
}

/// Candidate date phrases, in order of appearance per marker kind.
pub fn candidate_phrases(info: &str) -> Vec<String> {
    let mut out = Vec::new();
    for re in [free_marker_re(), paid_marker_re(), fastest_marker_re()] {
        for caps in re.captures_iter(info) {
            if let Some(m) = caps.name("phrase") {
                let phrase = m.as_str().trim();
                if !phrase.is_empty() {
                    out.push(phrase.to_string());
                }
            }
        }
    }
    if out.is_empty() {
        let whole = info.trim();
        if !whole.is_empty() {
            out.push(whole.to_string());
        }
    }
    out
}

/// Every calendar date one candidate phrase names.
pub fn parse_candidate(phrase: &str, today: NaiveDate) -> Vec<NaiveDate> {
    let mut relative: Option<&str> = None;
    if let Some(caps) = relative_re().captures(phrase) {
        relative = caps.name("word").map(|m| m.as_str());
    }
    let stripped = relative_re().replace_all(phrase, "");

    let mut dates = Vec::new();
    for caps in date_re().captures_iter(&stripped) {
        let m1 = caps.name("m1").and_then(|m| month_number(m.as_str()));
        let d1 = caps.name("d1").and_then(|m| m.as_str().parse::<u32>().ok());
        let (Some(m1), Some(d1)) = (m1, d1) else {
            continue;
        };
        let first = infer_year(m1, d1, today);
        if let Some(first) = first {
            dates.push(first);
        }
        if let Some(d2) = caps.name("d2").and_then(|m| m.as_str().parse::<u32>().ok()) {
            let m2 = caps
                .name("m2")
                .and_then(|m| month_number(m.as_str()))
                .unwrap_or(m1);
            let second = match first {
                Some(first) => range_end(first, m2, d2),
                None => infer_year(m2, d2, today),
            };
            if let Some(second) = second {
                dates.push(second);
            }
        }
    }

    if dates.is_empty() {
        match relative.map(|w| w.to_ascii_lowercase()).as_deref() {
            Some("today") => dates.push(today),
            Some("tomorrow") => dates.push(today + Duration::days(1)),
            _ => {}
        }
    }
    dates
}

/// Best-effort delivery window from free-form delivery text.
pub fn extract_delivery_window(info: Option<&str>, today: NaiveDate) -> DeliveryWindow {
    let Some(info) = info else {
        return DeliveryWindow::UNKNOWN;
    };
    let mut dates = candidate_phrases(info)
        .iter()
        .flat_map(|p| parse_candidate(p, today))
        .collect::<Vec<_>>();
    // Marker phrases without a date: the date may sit outside them.
    if dates.is_empty() {
        dates = parse_candidate(info, today);
    }
    let window = DeliveryWindow::spanning(dates);
    if !window.is_dated() {
        tracing::trace!(target: "ingest", info, "no delivery date recovered");
    }
    window
}

/// Shipping cost stated in delivery text.
pub fn parse_delivery_cost(info: Option<&str>) -> DeliveryCost {
    let Some(info) = info else {
        return DeliveryCost::Unknown;
    };
    let lower = info.to_ascii_lowercase();
    if lower.contains("free delivery") || lower.contains("free shipping") {
        return DeliveryCost::Free;
    }
    paid_cost_re()
        .captures(info)
        .and_then(|caps| caps.name("cost"))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .map(DeliveryCost::Paid)
        .unwrap_or(DeliveryCost::Unknown)
}
