// 顾客与 CSR：优先读取信息表中的顾客表格，缺失时退回数据库中的单条平铺字段。
use crate::extract::dates::format_iso;
use crate::extract::locator::{resolve_field, FieldStrategy};
use crate::extract::table::{
    column_text, contains_upper, find_header_row, map_columns, row_has_foreign_header,
    SearchWindow,
};
use crate::sheets::Grid;

const CUSTOMER_HEADERS: &[&str] = &["顾客名称", "客户名称", "CUSTOMER NAME"];
const CUSTOMER_STOP_KEYWORDS: &[&str] = &[
    "扩展现场",
    "EXTENDED MANUFACTURING",
    "提供支持",
    "远程支持",
    "PROVIDING SUPPORT",
    "REMOTE SUPPORT",
    "接受支持",
    "接收支持",
    "RECEIVING SUPPORT",
];
const CUSTOMER_WINDOW: SearchWindow = SearchWindow::new(0, 150, 0, 15);

const CUSTOMER_NAME: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["顾客", "客户名称"]),
    FieldStrategy::Fixed(29, 1),
];
const SUPPLIER_CODE: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["供应商编码", "供应商代码"]),
    FieldStrategy::Fixed(30, 1),
];
const CSR_DOCUMENT_NAME: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["CSR文件名称"]),
    FieldStrategy::Fixed(31, 1),
];
const CSR_DOCUMENT_DATE: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["CSR文件日期"]),
    FieldStrategy::Fixed(32, 1),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerRecord {
    pub name: String,
    pub supplier_code: String,
    pub csr_document_name: String,
    /// 已归一为 ISO 日期；无法解析时为空。
    pub csr_document_date: String,
}

impl CustomerRecord {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.supplier_code.is_empty()
            && self.csr_document_name.is_empty()
            && self.csr_document_date.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CustomerColumn {
    Name,
    SupplierCode,
    CsrName,
    CsrDate,
}

/// 表格优先；表格为空时使用平铺字段；两者都为空时返回空列表。
pub fn resolve_customers(database: &Grid, info: &Grid) -> Vec<CustomerRecord> {
    let table = extract_customer_table(info);
    if !table.is_empty() {
        return table;
    }
    let flat = extract_flat_customer(database);
    if flat.is_empty() {
        Vec::new()
    } else {
        vec![flat]
    }
}

pub fn extract_flat_customer(database: &Grid) -> CustomerRecord {
    CustomerRecord {
        name: resolve_field(database, CUSTOMER_NAME),
        supplier_code: resolve_field(database, SUPPLIER_CODE),
        csr_document_name: resolve_field(database, CSR_DOCUMENT_NAME),
        csr_document_date: format_iso(&resolve_field(database, CSR_DOCUMENT_DATE)),
    }
}

pub fn extract_customer_table(info: &Grid) -> Vec<CustomerRecord> {
    let window = &CUSTOMER_WINDOW;
    let Some(header_row) = find_header_row(info, CUSTOMER_HEADERS, window) else {
        return Vec::new();
    };
    let columns = map_columns(info, header_row, window, classify_customer_column);
    if !columns.contains_key(&CustomerColumn::Name) {
        return Vec::new();
    }
    let mut customers = Vec::new();
    for row in (header_row + 1)..window.rows(info).end {
        if row_has_foreign_header(info, row, window, CUSTOMER_STOP_KEYWORDS) {
            break;
        }
        let name = column_text(info, row, &columns, CustomerColumn::Name);
        if name.is_empty() || contains_upper(name, CUSTOMER_HEADERS) {
            continue;
        }
        customers.push(CustomerRecord {
            name: name.to_string(),
            supplier_code: column_text(info, row, &columns, CustomerColumn::SupplierCode)
                .to_string(),
            csr_document_name: column_text(info, row, &columns, CustomerColumn::CsrName)
                .to_string(),
            csr_document_date: format_iso(column_text(
                info,
                row,
                &columns,
                CustomerColumn::CsrDate,
            )),
        });
    }
    customers
}

fn classify_customer_column(text: &str) -> Option<CustomerColumn> {
    let has = |markers: &[&str]| markers.iter().any(|marker| text.contains(marker));
    if text.contains("CSR") {
        return if has(&["日期", "DATE"]) {
            Some(CustomerColumn::CsrDate)
        } else {
            Some(CustomerColumn::CsrName)
        };
    }
    if has(&["供应商", "SUPPLIER"]) {
        return Some(CustomerColumn::SupplierCode);
    }
    if has(&["顾客", "客户", "CUSTOMER"]) {
        return Some(CustomerColumn::Name);
    }
    None
}
