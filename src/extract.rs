//! Field extraction heuristics for purchase evidence.
//!
//! Every extractor is an ordered table of patterns evaluated first-match-wins.
//! Pattern order encodes precedence and is load-bearing: explicit labels beat
//! bare matches, known brands beat label-based guessing, and the tables must
//! not be reordered without re-checking the fixtures in `tests/`.
//!
//! Extractors return `None` (or an empty list) on a miss and never fail.

use crate::normalize::NormalizedText;
use crate::types::PaymentMethod;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const CURRENCY_SYMBOL: &str = r"HK\$|S\$|A\$|C\$|NT\$|R\$|MX\$|\$|€|£|¥|₩|₹|₽|฿|₫";

const CURRENCY_CODE: &str = "USD|EUR|GBP|JPY|CNY|CAD|AUD|CHF|HKD|SGD|TWD|BRL|MXN|INR|KRW|RUB|THB|VND|NZD|SEK|NOK|DKK|PLN";

const AMOUNT: &str = r"[0-9][0-9,]*(?:\.[0-9]{1,2})?";

// ---------------------------------------------------------------------------
// Vendor

/// Canonical names for well-known merchants. Checked before every generic
/// pattern: explicit brand recognition is more reliable than label-based
/// guessing.
static KNOWN_VENDORS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    const BRANDS: &[(&str, &str)] = &[
        (r"uber\s+eats", "Uber Eats"),
        (r"amazon", "Amazon"),
        (r"walmart", "Walmart"),
        (r"target", "Target"),
        (r"costco", "Costco"),
        (r"best\s+buy", "Best Buy"),
        (r"home\s+depot", "Home Depot"),
        (r"lowe'?s", "Lowe's"),
        (r"starbucks", "Starbucks"),
        (r"mcdonald'?s?", "McDonald's"),
        (r"chipotle", "Chipotle"),
        (r"whole\s+foods", "Whole Foods"),
        (r"trader\s+joe'?s?", "Trader Joe's"),
        (r"safeway", "Safeway"),
        (r"kroger", "Kroger"),
        (r"walgreens", "Walgreens"),
        (r"cvs", "CVS"),
        (r"doordash", "DoorDash"),
        (r"grubhub", "Grubhub"),
        (r"instacart", "Instacart"),
        (r"uber", "Uber"),
        (r"lyft", "Lyft"),
        (r"netflix", "Netflix"),
        (r"spotify", "Spotify"),
        (r"e\s?bay", "eBay"),
        (r"etsy", "Etsy"),
        (r"ikea", "IKEA"),
    ];
    BRANDS
        .iter()
        .map(|(pattern, name)| {
            (
                Regex::new(&format!(r"(?i)\b(?:{pattern})\b")).unwrap(),
                *name,
            )
        })
        .collect()
});

/// Generic vendor patterns, line-oriented, tried in order after the known
/// brands.
static VENDOR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?im)\b(?:seller|merchant|store|shop|retailer)\s*:\s*(.+)$",
        r"(?im)\b(?:sold\s+by|shipped\s+by)\s*:?\s*(.+)$",
        r"(?im)^from:\s*(.+)$",
        r"(?im)\bthank\s+you\s+for\s+(?:your\s+)?(?:purchase|order|shopping)\s+(?:at|from|with)\s+(.+)$",
        r"(?im)\byour\s+order\s+(?:at|from|with)\s+(.+)$",
        r"(?im)\b(?:order|confirmation|receipt|invoice)\s+from\s+(.+)$",
        r"(?im)\bpurchased\s+from\s+(.+)$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static CORP_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[,\s]+(?:inc|llc|ltd|corp|co|company)\.?$").unwrap());

/// Extract the merchant name.
#[must_use]
pub fn extract_vendor(view: &NormalizedText) -> Option<String> {
    for (re, canonical) in KNOWN_VENDORS.iter() {
        if re.is_match(&view.normalized) {
            return Some((*canonical).to_string());
        }
    }

    for re in VENDOR_PATTERNS.iter() {
        if let Some(cap) = re.captures(&view.text)
            && let Some(vendor) = clean_vendor(&cap[1])
        {
            return Some(vendor);
        }
    }

    None
}

/// Trim a vendor candidate: drop a trailing `<...>` email remnant, strip
/// corporate suffixes and trailing punctuation, gate on 2-99 characters.
fn clean_vendor(raw: &str) -> Option<String> {
    let candidate = raw.split('<').next().unwrap_or(raw);
    let candidate = candidate.trim().trim_matches('"');
    let candidate = CORP_SUFFIX.replace(candidate, "");
    let candidate = candidate
        .trim()
        .trim_end_matches(['.', ',', '!', '?', ';', ':'])
        .trim_end();

    let len = candidate.chars().count();
    (2..=99).contains(&len).then(|| candidate.to_string())
}

// ---------------------------------------------------------------------------
// Date

/// Date patterns in decreasing precedence: labeled numeric, labeled textual,
/// bare ISO, bare full month, bare abbreviated month, bare numeric.
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let label = r"(?:transaction\s+date|order\s+date|date|placed\s+on|purchased|invoice\s+date)";
    let month_full = r"(?:january|february|march|april|may|june|july|august|september|october|november|december)";
    let month_abbr = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sept?|oct|nov|dec)";
    [
        format!(r"(?i)\b{label}\s*:?\s*(\d{{1,2}}[/.-]\d{{1,2}}[/.-]\d{{2,4}})"),
        format!(
            r"(?i)\b{label}\s*:?\s*({month_abbr}[a-z]*\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}})"
        ),
        r"\b(\d{4}-\d{1,2}-\d{1,2})\b".to_string(),
        format!(r"(?i)\b({month_full}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}})\b"),
        format!(r"(?i)\b({month_abbr}\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}})\b"),
        r"\b(\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4})\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

static TEXTUAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$").unwrap()
});

static NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/.-](\d{1,2})[/.-](\d{2,4})$").unwrap());

/// Extract the transaction date as ISO `YYYY-MM-DD`. The first pattern that
/// both matches and normalizes successfully wins.
#[must_use]
pub fn extract_date(view: &NormalizedText) -> Option<String> {
    for re in DATE_PATTERNS.iter() {
        for cap in re.captures_iter(&view.normalized) {
            if let Some(iso) = normalize_date(&cap[1]) {
                return Some(iso);
            }
        }
    }
    None
}

/// Normalize a recognized date string to ISO `YYYY-MM-DD`.
///
/// Built by zero-padded string concatenation, never through a timezone-bound
/// date value, so the result cannot shift by a day across timezones. Numeric
/// dates read as `M/D/Y`; two-digit years add 2000. Rejects month > 12,
/// day > 31, and years before 2000.
#[must_use]
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if let Some(cap) = ISO_DATE.captures(raw) {
        return build_iso(parse_u32(&cap[1]), parse_u32(&cap[2]), parse_u32(&cap[3]));
    }

    if let Some(cap) = TEXTUAL_DATE.captures(raw) {
        let month = month_number(&cap[1])?;
        return build_iso(parse_u32(&cap[3]), month, parse_u32(&cap[2]));
    }

    if let Some(cap) = NUMERIC_DATE.captures(raw) {
        let mut year = parse_u32(&cap[3]);
        if year < 100 {
            year += 2000;
        }
        return build_iso(year, parse_u32(&cap[1]), parse_u32(&cap[2]));
    }

    None
}

fn parse_u32(digits: &str) -> u32 {
    digits.parse().unwrap_or(0)
}

fn build_iso(year: u32, month: u32, day: u32) -> Option<String> {
    if year < 2000 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let idx = MONTHS.iter().position(|m| *m == prefix)?;
    u32::try_from(idx).ok().map(|i| i + 1)
}

// ---------------------------------------------------------------------------
// Amount and currency

static TOTAL_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    let label = "order total|grand total|total amount|total charged|amount charged|you paid\
                 |transaction total|transaction amount|total|transaction|payment|charged|amount";
    Regex::new(&format!(
        r"(?i)\b(?:{label})\b\s*:?\s*({CURRENCY_SYMBOL})?\s*({AMOUNT})\b"
    ))
    .unwrap()
});

static SYMBOL_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)({CURRENCY_SYMBOL})\s*({AMOUNT})\b")).unwrap()
});

static CODE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({CURRENCY_CODE})\s*\$?\s*({AMOUNT})\b")).unwrap()
});

static AMOUNT_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({AMOUNT})\s*({CURRENCY_CODE})\b")).unwrap()
});

static CODE_SCAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b({CURRENCY_CODE})\b")).unwrap());

/// Extract the grand total and its currency code.
///
/// Two passes: total-specific labeled amounts first, generic
/// symbol-or-code-adjacent amounts only when no labeled amount exists. Within
/// a pass the largest plausible amount wins, because subtotal, tax, and total
/// usually co-occur and the grand total is the largest in the common case.
/// An amount with no attached currency evidence falls back to the first ISO
/// code anywhere in the text, then to `USD`.
#[must_use]
pub fn extract_total(view: &NormalizedText) -> Option<(f64, String)> {
    let text = &view.normalized;

    let labeled = fold_largest(
        TOTAL_LABELED
            .captures_iter(text)
            .map(|cap| (parse_amount(&cap[2]), cap.get(1).map(|m| symbol_currency(m.as_str())))),
    );

    let best = labeled.or_else(|| {
        fold_largest(
            SYMBOL_AMOUNT
                .captures_iter(text)
                .map(|cap| (parse_amount(&cap[2]), Some(symbol_currency(&cap[1]))))
                .chain(
                    CODE_AMOUNT
                        .captures_iter(text)
                        .map(|cap| (parse_amount(&cap[2]), Some(cap[1].to_string()))),
                )
                .chain(
                    AMOUNT_CODE
                        .captures_iter(text)
                        .map(|cap| (parse_amount(&cap[1]), Some(cap[2].to_string()))),
                ),
        )
    })?;

    let (amount, currency) = best;
    let currency = currency
        .or_else(|| CODE_SCAN.find(text).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| "USD".to_string());

    Some((amount, currency))
}

/// Keep the largest plausible amount among the candidates; ties keep the
/// earliest.
fn fold_largest(
    candidates: impl Iterator<Item = (Option<f64>, Option<String>)>,
) -> Option<(f64, Option<String>)> {
    let mut best: Option<(f64, Option<String>)> = None;
    for (amount, currency) in candidates {
        let Some(amount) = amount else { continue };
        if amount <= 0.0 || amount >= 1_000_000.0 {
            continue;
        }
        if best.as_ref().is_none_or(|(b, _)| amount > *b) {
            best = Some((amount, currency));
        }
    }
    best
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

fn symbol_currency(symbol: &str) -> String {
    match symbol.to_uppercase().as_str() {
        "HK$" => "HKD",
        "S$" => "SGD",
        "A$" => "AUD",
        "C$" => "CAD",
        "NT$" => "TWD",
        "R$" => "BRL",
        "MX$" => "MXN",
        "€" => "EUR",
        "£" => "GBP",
        "¥" => "JPY",
        "₩" => "KRW",
        "₹" => "INR",
        "₽" => "RUB",
        "฿" => "THB",
        "₫" => "VND",
        _ => "USD",
    }
    .to_string()
}

// ---------------------------------------------------------------------------
// Order number

static ORDER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:order|confirmation|invoice|reference|tracking)\s*(?:number|no\.?|id)?\s*[:#]\s*([A-Za-z0-9][A-Za-z0-9-]{4,29})\b",
        r"#\s*([A-Za-z0-9][A-Za-z0-9-]{4,29})\b",
        r"(?i)\b(?:order|confirmation)\s*(?:number|no\.?)?\s+(\d{5,30})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Extract an order, confirmation, invoice, reference, or tracking number.
#[must_use]
pub fn extract_order_number(view: &NormalizedText) -> Option<String> {
    ORDER_PATTERNS
        .iter()
        .find_map(|re| re.captures(&view.normalized).map(|cap| cap[1].to_string()))
}

// ---------------------------------------------------------------------------
// Payment method

/// Ordered mapping of payment mentions to the four canonical methods.
/// Digital wallets settle through cards, so they map to credit; Venmo and
/// Zelle pull from bank accounts, so they map to debit. A bare masked card
/// number with no other context defaults to credit.
static PAYMENT_RULES: LazyLock<Vec<(Regex, PaymentMethod)>> = LazyLock::new(|| {
    [
        (r"(?i)\bdebit\s+card\b", PaymentMethod::Debit),
        (r"(?i)\bcredit\s+card\b", PaymentMethod::Credit),
        (
            r"(?i)\b(?:visa|mastercard|master\s+card|american\s+express|amex|discover)\b",
            PaymentMethod::Credit,
        ),
        (r"(?i)\bcard\s+ending\s+in\s+\d{4}", PaymentMethod::Credit),
        (
            r"(?i)\bpaid\s+(?:with|by|via|using)\s+(?:a\s+)?credit\b",
            PaymentMethod::Credit,
        ),
        (
            r"(?i)\bpaid\s+(?:with|by|via|using)\s+(?:a\s+)?debit\b",
            PaymentMethod::Debit,
        ),
        (
            r"(?i)\bpaid\s+(?:with|by|via|using)\s+cash\b|\bcash\s+payment\b|\bpaid\s+in\s+cash\b",
            PaymentMethod::Cash,
        ),
        (
            r"(?i)\bpaid\s+(?:with|by|via|using)\s+(?:a\s+)?che(?:ck|que)\b|\bche(?:ck|que)\s*(?:#|no\.?|number)\s*\d+",
            PaymentMethod::Check,
        ),
        (
            r"(?i)\b(?:apple\s+pay|google\s+pay|samsung\s+pay|paypal)\b",
            PaymentMethod::Credit,
        ),
        (r"(?i)\b(?:venmo|zelle)\b", PaymentMethod::Debit),
        (r"(?i)(?:ending\s+in|\*{3,})\s*\d{4}", PaymentMethod::Credit),
    ]
    .iter()
    .map(|(p, m)| (Regex::new(p).unwrap(), *m))
    .collect()
});

/// Extract the payment method. No match yields `None`, never a guess.
#[must_use]
pub fn extract_payment_method(view: &NormalizedText) -> Option<PaymentMethod> {
    PAYMENT_RULES
        .iter()
        .find(|(re, _)| re.is_match(&view.normalized))
        .map(|(_, method)| *method)
}

// ---------------------------------------------------------------------------
// Line items

const MAX_ITEMS: usize = 20;

/// Enough items from one pattern to skip the weaker ones.
const ITEM_PATTERN_SUFFICIENT: usize = 3;

const ITEM_STOP_WORDS: &[&str] = &[
    "subtotal",
    "total",
    "tax",
    "shipping",
    "discount",
    "free",
    "order",
    "confirmation",
    "thank",
    "you",
    "your",
    "the",
    "item",
    "items",
    "qty",
    "quantity",
    "price",
    "amount",
];

static ITEM_QTY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})\s*[xX×]\s+(.+)$").unwrap());

static ITEM_DASH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(.+?)\s*[-–]\s*[$€£]\s*({AMOUNT})$")).unwrap()
});

static ITEM_PRICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(.+?)\s+[$€£]\s*({AMOUNT})$")).unwrap()
});

static TRAILING_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\s*(?:[-–]\s*)?[$€£]\s*{AMOUNT}\s*$|\s*[-–]\s*[0-9][0-9,]*\.[0-9]{{2}}\s*$"
    ))
    .unwrap()
});

/// Extract candidate line-item names from line-oriented patterns: quantity
/// prefixes, dash-separated prices, then bare trailing prices. Deduplicated
/// case-insensitively and capped at 20; once an earlier pattern has
/// accumulated three items the weaker patterns are skipped.
#[must_use]
pub fn extract_items(view: &NormalizedText) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let patterns: [(&Regex, usize); 3] = [
        (&ITEM_QTY_LINE, 2),
        (&ITEM_DASH_LINE, 1),
        (&ITEM_PRICE_LINE, 1),
    ];

    for (re, group) in patterns {
        for line in view.text.lines() {
            let Some(cap) = re.captures(line) else {
                continue;
            };
            let name = cap.get(group).map_or("", |m| m.as_str());
            let name = if group == 2 {
                TRAILING_PRICE.replace(name, "").into_owned()
            } else {
                name.to_string()
            };
            let name = name.trim().trim_end_matches(['-', '–']).trim_end().to_string();

            if !acceptable_item(&name) {
                continue;
            }
            if seen.insert(name.to_lowercase()) {
                items.push(name);
                if items.len() == MAX_ITEMS {
                    return items;
                }
            }
        }
        if items.len() >= ITEM_PATTERN_SUFFICIENT {
            break;
        }
    }

    items
}

fn acceptable_item(name: &str) -> bool {
    let len = name.chars().count();
    if !(3..=99).contains(&len) {
        return false;
    }
    !name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| ITEM_STOP_WORDS.contains(&w.to_lowercase().as_str()))
}
