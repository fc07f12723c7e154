// 现场表抽取：扩展制造现场、提供支持现场、接受支持现场三类区块共用同一套重复块逻辑。
use crate::extract::address::decompose_latin_address;
use crate::extract::table::{
    column_text, contains_upper, find_header_row, map_columns, row_has_foreign_header,
    SearchWindow,
};
use crate::sheets::Grid;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

const SITE_WINDOW: SearchWindow = SearchWindow::new(0, 150, 0, 15);

const EMS_HEADERS: &[&str] = &["扩展现场", "EXTENDED MANUFACTURING"];
const PROVIDING_HEADERS: &[&str] = &["提供支持", "远程支持", "PROVIDING SUPPORT", "REMOTE SUPPORT"];
const RECEIVING_HEADERS: &[&str] = &["接受支持", "接收支持", "RECEIVING SUPPORT"];

const NAME_MARKERS: &[&str] = &["名称", "NAME"];
const ADDRESS_MARKERS: &[&str] = &["地址", "ADDRESS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteBlock {
    pub header_keywords: &'static [&'static str],
    /// 出现即结束本区块的其他区块表头。
    pub stop_keywords: &'static [&'static str],
    pub window: SearchWindow,
}

pub const EXTENDED_MANUFACTURING_BLOCK: SiteBlock = SiteBlock {
    header_keywords: EMS_HEADERS,
    stop_keywords: &[
        "提供支持",
        "远程支持",
        "PROVIDING SUPPORT",
        "REMOTE SUPPORT",
        "接受支持",
        "接收支持",
        "RECEIVING SUPPORT",
        "顾客名称",
        "客户名称",
        "CUSTOMER NAME",
    ],
    window: SITE_WINDOW,
};

pub const PROVIDING_SUPPORT_BLOCK: SiteBlock = SiteBlock {
    header_keywords: PROVIDING_HEADERS,
    stop_keywords: &[
        "扩展现场",
        "EXTENDED MANUFACTURING",
        "接受支持",
        "接收支持",
        "RECEIVING SUPPORT",
        "顾客名称",
        "客户名称",
        "CUSTOMER NAME",
    ],
    window: SITE_WINDOW,
};

pub const RECEIVING_SUPPORT_BLOCK: SiteBlock = SiteBlock {
    header_keywords: RECEIVING_HEADERS,
    stop_keywords: &[
        "扩展现场",
        "EXTENDED MANUFACTURING",
        "提供支持",
        "远程支持",
        "PROVIDING SUPPORT",
        "REMOTE SUPPORT",
        "顾客名称",
        "客户名称",
        "CUSTOMER NAME",
    ],
    window: SITE_WINDOW,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteCategory {
    ExtendedManufacturing,
    ProvidingSupport,
    ReceivingSupport,
}

impl SiteCategory {
    pub const ALL: [SiteCategory; 3] = [
        SiteCategory::ExtendedManufacturing,
        SiteCategory::ProvidingSupport,
        SiteCategory::ReceivingSupport,
    ];

    pub fn block(self) -> &'static SiteBlock {
        match self {
            SiteCategory::ExtendedManufacturing => &EXTENDED_MANUFACTURING_BLOCK,
            SiteCategory::ProvidingSupport => &PROVIDING_SUPPORT_BLOCK,
            SiteCategory::ReceivingSupport => &RECEIVING_SUPPORT_BLOCK,
        }
    }

    pub fn list_key(self) -> &'static str {
        match self {
            SiteCategory::ExtendedManufacturing => "ExtendedManufacturingSites",
            SiteCategory::ProvidingSupport => "ProvidingSupportSites",
            SiteCategory::ReceivingSupport => "ReceivingSupportSites",
        }
    }

    pub fn flag_key(self) -> &'static str {
        match self {
            SiteCategory::ExtendedManufacturing => "HasExtendedManufacturingSites",
            SiteCategory::ProvidingSupport => "HasProvidingSupportSites",
            SiteCategory::ReceivingSupport => "HasReceivingSupportSites",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SiteCategory::ExtendedManufacturing => "extended_manufacturing",
            SiteCategory::ProvidingSupport => "providing_support",
            SiteCategory::ReceivingSupport => "receiving_support",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SiteColumn {
    NativeName,
    LatinName,
    NativeAddress,
    LatinAddress,
    PostalCode,
    Usi,
    EmployeeCount,
    Comments,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

impl SiteAddress {
    pub fn to_value(&self) -> Value {
        json!({
            "Street1": self.street,
            "City": self.city,
            "State": self.state,
            "Country": self.country,
            "PostalCode": self.postal_code,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSite {
    pub id: String,
    pub site_name: String,
    pub comments: Option<String>,
    pub usi: Option<String>,
    pub employee_count: Option<String>,
    pub native_address: SiteAddress,
    pub latin_address: SiteAddress,
}

impl ExtractedSite {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("Id".to_string(), Value::String(self.id.clone()));
        map.insert("SiteName".to_string(), Value::String(self.site_name.clone()));
        if let Some(comments) = &self.comments {
            map.insert("Comments".to_string(), Value::String(comments.clone()));
        }
        if let Some(usi) = &self.usi {
            map.insert("IATF_USI".to_string(), Value::String(usi.clone()));
        }
        if let Some(count) = &self.employee_count {
            map.insert("TotalNumberEmployees".to_string(), Value::String(count.clone()));
        }
        map.insert("AddressNative".to_string(), self.native_address.to_value());
        map.insert("Address".to_string(), self.latin_address.to_value());
        Value::Object(map)
    }
}

pub fn extract_sites(grid: &Grid, block: &SiteBlock, native_country: &str) -> Vec<ExtractedSite> {
    let window = &block.window;
    let Some(mut header_row) = find_header_row(grid, block.header_keywords, window) else {
        return Vec::new();
    };
    let mut columns = map_columns(grid, header_row, window, classify_site_column);
    if !has_key_columns(&columns) && header_row + 1 < window.rows(grid).end {
        // 关键字所在行只是区块标题时，列名在下一行。
        let next = map_columns(grid, header_row + 1, window, classify_site_column);
        if has_key_columns(&next) {
            header_row += 1;
            columns = next;
        }
    }
    if !has_key_columns(&columns) {
        debug!("现场表头缺少名称/地址列，跳过: 第 {} 行", header_row + 1);
        return Vec::new();
    }

    let mut sites = Vec::new();
    for row in (header_row + 1)..window.rows(grid).end {
        if row_has_foreign_header(grid, row, window, block.stop_keywords) {
            break;
        }
        let native_name = column_text(grid, row, &columns, SiteColumn::NativeName);
        let native_address = column_text(grid, row, &columns, SiteColumn::NativeAddress);
        if native_name.is_empty() && native_address.is_empty() {
            continue;
        }
        if is_repeated_header(native_name) {
            continue;
        }
        let latin_name = column_text(grid, row, &columns, SiteColumn::LatinName);
        let postal_code = column_text(grid, row, &columns, SiteColumn::PostalCode);
        let latin = decompose_latin_address(column_text(
            grid,
            row,
            &columns,
            SiteColumn::LatinAddress,
        ));
        sites.push(ExtractedSite {
            id: Uuid::new_v4().to_string(),
            site_name: join_names(native_name, latin_name),
            comments: optional_column(grid, row, &columns, SiteColumn::Comments),
            usi: optional_column(grid, row, &columns, SiteColumn::Usi),
            employee_count: optional_column(grid, row, &columns, SiteColumn::EmployeeCount),
            native_address: SiteAddress {
                street: native_address.to_string(),
                city: String::new(),
                state: String::new(),
                country: native_country.to_string(),
                postal_code: postal_code.to_string(),
            },
            latin_address: SiteAddress {
                street: latin.street,
                city: latin.city,
                state: latin.state,
                country: latin.country,
                postal_code: postal_code.to_string(),
            },
        });
    }
    sites
}

fn classify_site_column(text: &str) -> Option<SiteColumn> {
    let has = |markers: &[&str]| markers.iter().any(|marker| text.contains(marker));
    let latin_marked = has(&["英文", "ENGLISH"]);
    if has(&["邮编", "邮政编码", "POSTAL", "ZIP"]) {
        return Some(SiteColumn::PostalCode);
    }
    if text.contains("USI") {
        return Some(SiteColumn::Usi);
    }
    if has(&["员工", "人数", "EMPLOYEE"]) {
        return Some(SiteColumn::EmployeeCount);
    }
    if has(&["功能", "职能", "活动", "备注", "FUNCTION", "ACTIVIT", "COMMENT"]) {
        return Some(SiteColumn::Comments);
    }
    if has(ADDRESS_MARKERS) {
        return if latin_marked || !text.contains("地址") {
            Some(SiteColumn::LatinAddress)
        } else {
            Some(SiteColumn::NativeAddress)
        };
    }
    if has(NAME_MARKERS) {
        return if latin_marked || !text.contains("名称") {
            Some(SiteColumn::LatinName)
        } else {
            Some(SiteColumn::NativeName)
        };
    }
    None
}

fn has_key_columns(columns: &HashMap<SiteColumn, usize>) -> bool {
    columns.contains_key(&SiteColumn::NativeName) || columns.contains_key(&SiteColumn::NativeAddress)
}

fn is_repeated_header(native_name: &str) -> bool {
    contains_upper(native_name, NAME_MARKERS) && contains_upper(native_name, ADDRESS_MARKERS)
}

fn join_names(native: &str, latin: &str) -> String {
    if latin.is_empty() || native.contains(latin) {
        return native.to_string();
    }
    if native.is_empty() {
        return latin.to_string();
    }
    format!("{native} {latin}")
}

fn optional_column(
    grid: &Grid,
    row: usize,
    columns: &HashMap<SiteColumn, usize>,
    role: SiteColumn,
) -> Option<String> {
    let text = column_text(grid, row, columns, role);
    (!text.is_empty()).then(|| text.to_string())
}
