// 审核员身份：姓名、CCAA 注册号与 IATF 卡号。
use crate::extract::address::is_cjk;
use crate::extract::locator::{contains_any, resolve_field, FieldStrategy};
use crate::sheets::Grid;
use regex::Regex;
use std::sync::OnceLock;

const AUDITOR_NAME: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["姓名", "Auditor Name"]),
    FieldStrategy::Fixed(5, 1),
];
const CCAA_NUMBER: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["审核员CCAA", "CCAA"]),
    FieldStrategy::Fixed(4, 1),
];
const CARD_LABELS: &[&str] = &["IATF Card", "IATF卡号"];
const NAME_LABELS: &[&str] = &["姓名:", "姓名：", "Name:", "Name："];
const MIN_CARD_CHARS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditorIdentity {
    pub name: String,
    pub ccaa_number: String,
    pub card_id: String,
}

impl AuditorIdentity {
    pub fn extract(database: &Grid, info: &Grid) -> Self {
        Self {
            name: normalize_auditor_name(&resolve_field(database, AUDITOR_NAME)),
            ccaa_number: normalize_ccaa(&resolve_field(database, CCAA_NUMBER)),
            card_id: find_card_id(info),
        }
    }
}

/// 优先使用英文姓名；"SURNAME Given" 形式调整为 "Given SURNAME"。
pub fn normalize_auditor_name(raw: &str) -> String {
    let mut name = raw.to_string();
    for label in NAME_LABELS {
        name = name.replace(label, "");
    }
    let name = name.trim();
    let latin: String = name.chars().filter(|ch| !is_cjk(*ch)).collect();
    let latin = latin.trim();
    if latin.is_empty() {
        return name.to_string();
    }
    let parts = latin.split_whitespace().collect::<Vec<_>>();
    if parts.len() >= 2 && is_upper_word(parts[0]) && !is_upper_word(parts[1]) {
        return format!("{} {}", parts[1], parts[0]);
    }
    latin.to_string()
}

pub fn normalize_ccaa(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    ccaa_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str().trim().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// 行优先扫描卡号标签，右侧取值去掉 "IATF" 前缀后长度不足时继续查找。
pub fn find_card_id(info: &Grid) -> String {
    for (row, col, text) in info.cells() {
        if !contains_any(text, CARD_LABELS) || col + 1 >= info.width() {
            continue;
        }
        let flattened = info.cell(row, col + 1).replace(['\n', '\r'], " ");
        let candidate = card_prefix_regex().replace(flattened.trim(), "");
        let candidate = candidate.trim();
        if candidate.chars().count() >= MIN_CARD_CHARS {
            return candidate.to_string();
        }
    }
    String::new()
}

fn is_upper_word(word: &str) -> bool {
    let mut has_cased = false;
    for ch in word.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

fn ccaa_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?is)CCAA[:：\s-]\s*(.*)").expect("invalid ccaa regex"))
}

fn card_prefix_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)^IATF[:：\s-]*").expect("invalid card prefix regex"))
}
