// 日期归一：兼容中文年月日、斜杠、点分、紧凑数字等写法，统一输出 ISO 午夜时间。
use crate::extract::locator::{resolve_field, FieldStrategy};
use crate::sheets::Grid;
use chrono::{Duration, NaiveDate, NaiveDateTime};

pub const ISO_MIDNIGHT_SUFFIX: &str = "T00:00:00.000Z";

const AUDIT_START: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["审核开始日期", "审核开始时间"]),
    FieldStrategy::Fixed(2, 1),
];
const AUDIT_END: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["审核结束日期", "审核结束时间"]),
    FieldStrategy::Fixed(3, 1),
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditDates {
    pub start: String,
    pub end: String,
    pub next_audit: String,
}

impl AuditDates {
    pub fn extract(database: &Grid, next_audit_offset_days: i64) -> Self {
        let start_raw = resolve_field(database, AUDIT_START);
        let end_raw = resolve_field(database, AUDIT_END);
        Self {
            start: format_iso(&start_raw),
            end: format_iso(&end_raw),
            next_audit: offset_iso(&end_raw, next_audit_offset_days),
        }
    }
}

/// 解析失败返回 None，不向上传播错误。
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw
        .trim()
        .replace(['年', '月'], "-")
        .replace('日', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return None;
    }
    parse_cleaned(&cleaned).or_else(|| {
        // 带有多余后缀（时间、备注）时只取第一个片段。
        cleaned
            .split_whitespace()
            .next()
            .filter(|head| *head != cleaned)
            .and_then(parse_cleaned)
    })
}

fn parse_cleaned(text: &str) -> Option<NaiveDate> {
    for format in DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Some(value.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(value) = NaiveDate::parse_from_str(text, format) {
            return Some(value);
        }
    }
    parse_compact(text)
}

fn parse_compact(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let year = text[0..4].parse::<i32>().ok()?;
    let month = text[4..6].parse::<u32>().ok()?;
    let day = text[6..8].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_iso_date(date: NaiveDate) -> String {
    format!("{}{ISO_MIDNIGHT_SUFFIX}", date.format("%Y-%m-%d"))
}

pub fn format_iso(raw: &str) -> String {
    parse_date(raw).map(format_iso_date).unwrap_or_default()
}

pub fn offset_iso(raw: &str, days: i64) -> String {
    parse_date(raw)
        .and_then(|date| date.checked_add_signed(Duration::days(days)))
        .map(format_iso_date)
        .unwrap_or_default()
}
