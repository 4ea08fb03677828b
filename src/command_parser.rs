//! # Command Parser Module
//!
//! This module classifies raw Thai chat commands into intents and extracts
//! typed fields (name, quantity, unit, price) using ordered regex patterns.
//!
//! ## Features
//!
//! - Explicit, ordered intent-rule table: purchase before expense before
//!   menu-cost before stock-check before help, so keyword additions cannot
//!   silently change precedence
//! - "จ่าย" is ambiguous between purchase and expense and is disambiguated
//!   by the presence of a recognized unit token after the quantity
//! - Price extraction prefers a number marked with "บาท"/"ราคา"; the
//!   last-number fallback is preserved for compatibility but lowers the
//!   parse confidence so callers can ask for confirmation
//!
//! Parsing is a pure function over the input plus the static keyword/unit
//! tables; the same text always yields the same `ParsedCommand`.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::units;

/// Command intents, in parsing priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Purchase,
    Expense,
    MenuCost,
    StockCheck,
    Help,
    Unknown,
}

/// A parsed command, created per incoming message and discarded after
/// processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub intent: Intent,
    /// Original text, preserved for generic help responses
    pub raw_text: String,
    /// Free-text name/description segment between the keyword and the first
    /// numeric token
    pub name: Option<String>,
    /// First standalone number in the text
    pub quantity: Option<f64>,
    /// Raw unit token found after the quantity, if recognized
    pub unit: Option<String>,
    /// Number marked by "บาท"/"ราคา", or the last-number fallback
    pub price: Option<f64>,
    /// Explicit category ("หมวด..."), rarely supplied
    pub category: Option<String>,
    /// False when the price came from the last-number fallback
    pub price_confident: bool,
}

impl ParsedCommand {
    fn unknown(raw_text: &str) -> Self {
        Self {
            intent: Intent::Unknown,
            raw_text: raw_text.to_string(),
            name: None,
            quantity: None,
            unit: None,
            price: None,
            category: None,
            price_confident: true,
        }
    }
}

/// A keyword within an intent rule
///
/// `strips` controls whether the keyword is a command verb removed from the
/// extracted name ("ซื้อกุ้ง" -> "กุ้ง") or part of the noun itself and kept
/// ("ค่าไฟฟ้า" stays "ค่าไฟฟ้า").
struct Keyword {
    word: &'static str,
    strips: bool,
}

struct IntentRule {
    intent: Intent,
    /// Checked in order; list longer keywords before their prefixes
    keywords: &'static [Keyword],
    /// Rule only applies when a recognized unit token follows the quantity
    needs_unit_token: bool,
}

lazy_static! {
    /// Ordered intent rules; earlier rules win
    static ref INTENT_RULES: Vec<IntentRule> = vec![
        IntentRule {
            intent: Intent::Purchase,
            keywords: &[
                Keyword { word: "ซื้อวัตถุดิบ", strips: true },
                Keyword { word: "ซื้อ", strips: true },
            ],
            needs_unit_token: false,
        },
        // จ่าย + unit token => bought something measurable
        IntentRule {
            intent: Intent::Purchase,
            keywords: &[Keyword { word: "จ่าย", strips: true }],
            needs_unit_token: true,
        },
        IntentRule {
            intent: Intent::Expense,
            keywords: &[
                Keyword { word: "บันทึกค่าใช้จ่าย", strips: true },
                Keyword { word: "จ่าย", strips: true },
                Keyword { word: "ค่า", strips: false },
            ],
            needs_unit_token: false,
        },
        IntentRule {
            intent: Intent::MenuCost,
            keywords: &[
                Keyword { word: "ต้นทุนเมนู", strips: true },
                Keyword { word: "เมนู", strips: true },
                Keyword { word: "ต้นทุน", strips: true },
                Keyword { word: "สูตร", strips: true },
                Keyword { word: "คำนวณ", strips: true },
            ],
            needs_unit_token: false,
        },
        IntentRule {
            intent: Intent::StockCheck,
            keywords: &[
                Keyword { word: "สต๊อก", strips: true },
                Keyword { word: "สต็อก", strips: true },
                Keyword { word: "คงเหลือ", strips: true },
                Keyword { word: "เหลือ", strips: true },
            ],
            needs_unit_token: false,
        },
        IntentRule {
            intent: Intent::Help,
            keywords: &[
                Keyword { word: "ช่วยเหลือ", strips: true },
                Keyword { word: "วิธีใช้", strips: true },
                Keyword { word: "help", strips: true },
            ],
            needs_unit_token: false,
        },
    ];

    static ref NUMBER_RE: Regex = Regex::new(r"\d+(?:\.\d+)?").expect("number pattern");
    static ref BAHT_RE: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:บาท|฿)").expect("baht price pattern");
    static ref RAKA_RE: Regex =
        Regex::new(r"ราคา\s*(\d+(?:\.\d+)?)").expect("raka price pattern");
    static ref CATEGORY_RE: Regex = Regex::new(r"หมวด\s*(\S+)").expect("category pattern");

    /// Unit token anchored right after the quantity, longest synonym first
    static ref UNIT_HEAD_RE: Regex = {
        let alternation = units::known_synonyms()
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"^\s*({alternation})")).expect("unit head pattern")
    };
}

/// Filler tokens dropped from the tail of an extracted name segment
const NAME_FILLERS: &[&str] = &["ราคา", "จำนวน", "เท่าไหร่", "เท่าไร", "กี่", "ไหม", "มั้ย"];

/// Stock-check arguments that mean "all ingredients"
const STOCK_ALL_WORDS: &[&str] = &["ทั้งหมด", "วันนี้", "ตอนนี้"];

/// Parser applying the ordered intent rules to raw command text
#[derive(Debug, Default)]
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse raw text into a `ParsedCommand`
    ///
    /// Empty or whitespace-only input yields `Intent::Unknown`. No side
    /// effects; parsing the same text twice yields identical output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use krua_ledger::command_parser::{CommandParser, Intent};
    ///
    /// let parser = CommandParser::new();
    /// let cmd = parser.parse("ซื้อกุ้ง 5 กิโลกรัม 500 บาท");
    /// assert_eq!(cmd.intent, Intent::Purchase);
    /// assert_eq!(cmd.name.as_deref(), Some("กุ้ง"));
    /// assert_eq!(cmd.quantity, Some(5.0));
    /// assert_eq!(cmd.price, Some(500.0));
    /// ```
    pub fn parse(&self, text: &str) -> ParsedCommand {
        let text = text.trim();
        if text.is_empty() {
            return ParsedCommand::unknown(text);
        }

        let first_number = NUMBER_RE.find(text);
        let unit_token = first_number.and_then(|m| {
            UNIT_HEAD_RE
                .captures(&text[m.end()..])
                .and_then(|c| c.get(1))
                .map(|u| u.as_str().to_string())
        });

        let Some((rule, keyword, kw_pos)) = classify(text, unit_token.is_some()) else {
            debug!("No intent rule matched: '{text}'");
            return ParsedCommand::unknown(text);
        };
        trace!(
            "Matched intent {:?} via keyword '{}' at byte {kw_pos}",
            rule.intent,
            keyword.word
        );

        let quantity = first_number.and_then(|m| m.as_str().parse::<f64>().ok());
        let (price, price_confident) = extract_price(text, first_number);
        let category = CATEGORY_RE
            .captures(text)
            .map(|c| c[1].to_string());

        let name = match rule.intent {
            Intent::Help => None,
            Intent::StockCheck => extract_stock_subject(text, keyword, kw_pos, first_number),
            _ => extract_name(text, keyword, kw_pos, first_number),
        };

        ParsedCommand {
            intent: rule.intent,
            raw_text: text.to_string(),
            name,
            quantity,
            unit: unit_token,
            price,
            category,
            price_confident,
        }
    }
}

/// Find the first rule, in priority order, with a keyword present in the text
fn classify(text: &str, has_unit_token: bool) -> Option<(&'static IntentRule, &'static Keyword, usize)> {
    for rule in INTENT_RULES.iter() {
        if rule.needs_unit_token && !has_unit_token {
            continue;
        }
        for keyword in rule.keywords {
            if let Some(pos) = text.find(keyword.word) {
                return Some((rule, keyword, pos));
            }
        }
    }
    None
}

/// Price is a number marked with "บาท"/"ราคา", else the last standalone
/// number as a low-confidence fallback
fn extract_price(text: &str, first_number: Option<regex::Match>) -> (Option<f64>, bool) {
    if let Some(caps) = BAHT_RE.captures_iter(text).last() {
        return (caps[1].parse().ok(), true);
    }
    if let Some(caps) = RAKA_RE.captures(text) {
        return (caps[1].parse().ok(), true);
    }
    // Fallback: last standalone number, unless it is the quantity itself.
    // This can mis-read a quantity as a price, so the confidence drops.
    let last = NUMBER_RE.find_iter(text).last();
    match (first_number, last) {
        (Some(first), Some(last)) if first.start() != last.start() => {
            (last.as_str().parse().ok(), false)
        }
        _ => (None, true),
    }
}

/// The name/description segment: everything between the keyword and the
/// first numeric token
fn extract_name(
    text: &str,
    keyword: &Keyword,
    kw_pos: usize,
    first_number: Option<regex::Match>,
) -> Option<String> {
    let start = if keyword.strips {
        kw_pos + keyword.word.len()
    } else {
        kw_pos
    };
    let end = first_number.map(|m| m.start()).unwrap_or(text.len());
    if start >= end {
        return None;
    }
    let segment = clean_name(&text[start..end]);
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Stock-check subjects can precede the keyword ("กุ้งเหลือเท่าไหร่")
fn extract_stock_subject(
    text: &str,
    keyword: &Keyword,
    kw_pos: usize,
    first_number: Option<regex::Match>,
) -> Option<String> {
    if let Some(after) = extract_name(text, keyword, kw_pos, first_number) {
        if !STOCK_ALL_WORDS.contains(&after.as_str()) {
            return Some(after);
        }
        return None;
    }
    let before = clean_name(&text[..kw_pos]);
    let before = before.trim_start_matches("เช็ค").trim().to_string();
    if before.is_empty() || STOCK_ALL_WORDS.contains(&before.as_str()) {
        None
    } else {
        Some(before)
    }
}

/// Trim whitespace and drop trailing filler tokens and category markers
fn clean_name(segment: &str) -> String {
    let mut name = segment.trim().to_string();
    if let Some(m) = CATEGORY_RE.find(&name) {
        name = format!("{} {}", &name[..m.start()].trim(), &name[m.end()..].trim())
            .trim()
            .to_string();
    }
    loop {
        let before = name.len();
        for filler in NAME_FILLERS {
            if let Some(stripped) = name.strip_suffix(filler) {
                name = stripped.trim().to_string();
            }
        }
        if name.len() == before {
            break;
        }
    }
    name
}
