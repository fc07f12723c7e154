// 中英文地址拆分：从候选文本中分离中文与拉丁字母片段，再按逗号位置拆出街道/城市/省州/国家。
use regex::Regex;
use std::sync::OnceLock;

/// 地址标签，按长度降序匹配，避免 "地址" 抢先吞掉 "审核地址"。
const ADDRESS_LABELS: &[&str] = &[
    "Registered Address",
    "Company Address",
    "Audit Address",
    "Site Address",
    "审核地址",
    "注册地址",
    "组织地址",
    "公司地址",
    "现场地址",
    "Address",
    "地址",
];

const MIXED_LATIN_MIN_CHARS: usize = 10;
const MIXED_NATIVE_MIN_CHARS: usize = 5;
/// 少于该段数的英文地址视为低置信度拆分，需要人工复核。
const CONFIDENT_SEGMENT_COUNT: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatinAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub segment_count: usize,
}

impl LatinAddress {
    pub fn is_low_confidence(&self) -> bool {
        self.segment_count < CONFIDENT_SEGMENT_COUNT
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFragments {
    pub native: String,
    pub latin: String,
}

impl AddressFragments {
    /// 逐项补齐：本方缺失的片段取自 fallback。
    pub fn or_fill(self, fallback: AddressFragments) -> AddressFragments {
        AddressFragments {
            native: if self.native.is_empty() {
                fallback.native
            } else {
                self.native
            },
            latin: if self.latin.is_empty() {
                fallback.latin
            } else {
                self.latin
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.native.is_empty() && !self.latin.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSplit {
    pub native_street: String,
    pub latin: LatinAddress,
}

impl AddressSplit {
    pub fn from_fragments(fragments: AddressFragments) -> Self {
        Self {
            native_street: fragments.native,
            latin: decompose_latin_address(&fragments.latin),
        }
    }
}

pub fn split_address<S: AsRef<str>>(candidates: &[S]) -> AddressSplit {
    AddressSplit::from_fragments(select_fragments(candidates))
}

/// 清理候选、按行分类脚本，各自保留最长的中文片段与英文片段。
pub fn select_fragments<S: AsRef<str>>(candidates: &[S]) -> AddressFragments {
    let mut native = Vec::new();
    let mut latin = Vec::new();
    for candidate in candidates {
        let cleaned = strip_address_label(candidate.as_ref());
        for line in cleaned.split(['\n', '\r']) {
            let line = strip_address_label(line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            classify_line(line, &mut native, &mut latin);
        }
    }
    AddressFragments {
        native: longest(native),
        latin: longest(latin),
    }
}

fn classify_line(line: &str, native: &mut Vec<String>, latin: &mut Vec<String>) {
    let has_native = line.chars().any(is_cjk);
    let has_latin = latin_run_regex().is_match(line);
    match (has_native, has_latin) {
        (true, true) => {
            let latin_part: String = line
                .chars()
                .map(|ch| if is_cjk(ch) { ' ' } else { ch })
                .collect();
            let latin_part = tidy_fragment(&latin_part);
            if latin_part.chars().count() > MIXED_LATIN_MIN_CHARS {
                latin.push(latin_part);
            }
            let native_part: String = line
                .chars()
                .filter(|ch| !ch.is_ascii_alphabetic())
                .collect();
            let native_part = tidy_fragment(&native_part);
            if native_part.chars().count() > MIXED_NATIVE_MIN_CHARS {
                native.push(native_part);
            }
        }
        (true, false) => native.push(line.to_string()),
        (false, true) => latin.push(line.to_string()),
        (false, false) => {}
    }
}

/// 取字符数最多的片段，长度相同时保留先出现者。
fn longest(fragments: Vec<String>) -> String {
    let mut best = String::new();
    let mut best_len = 0;
    for fragment in fragments {
        let len = fragment.chars().count();
        if len > best_len {
            best_len = len;
            best = fragment;
        }
    }
    best
}

/// 英文地址倒序拆分：末段国家、倒数第二段省州、倒数第三段城市，其余为街道。
pub fn decompose_latin_address(raw: &str) -> LatinAddress {
    let raw = raw.trim();
    if raw.is_empty() {
        return LatinAddress::default();
    }
    let normalized = raw.replace('，', ",");
    let parts = normalized
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    if parts.len() < 3 {
        return LatinAddress {
            street: raw.to_string(),
            segment_count: parts.len(),
            ..LatinAddress::default()
        };
    }
    let count = parts.len();
    let city = parts[count - 3].to_string();
    let street = if count > 3 {
        parts[..count - 3].join(", ")
    } else {
        // 只有三段时没有独立街道段，沿用城市段，保证街道行不为空。
        city.clone()
    };
    LatinAddress {
        street,
        city,
        state: parts[count - 2].to_string(),
        country: parts[count - 1].to_string(),
        segment_count: count,
    }
}

pub fn strip_address_label(text: &str) -> String {
    address_label_regex().replace(text, "").to_string()
}

pub(crate) fn is_cjk(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

fn tidy_fragment(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|ch: char| ch.is_whitespace() || is_boundary_punctuation(ch))
        .to_string()
}

fn is_boundary_punctuation(ch: char) -> bool {
    matches!(
        ch,
        ',' | '，' | '.' | '。' | ';' | '；' | ':' | '：' | '-' | '—' | '、' | '/' | '|'
    )
}

fn latin_run_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[A-Za-z]{3,}").expect("invalid latin run regex"))
}

fn address_label_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        let labels = ADDRESS_LABELS
            .iter()
            .map(|label| regex::escape(label))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)^\s*(?:{labels})\s*[:：\-—]?\s*"))
            .expect("invalid address label regex")
    })
}
