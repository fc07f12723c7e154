// 组织信息：名称、代码、联系人等标量字段，以及审核地址的中英文拆分。
use crate::extract::address::{select_fragments, AddressFragments, AddressSplit};
use crate::extract::locator::{find_anchored, resolve_field, FieldStrategy};
use crate::sheets::Grid;
use tracing::debug;

const ORGANIZATION_NAME: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["组织名称"]),
    FieldStrategy::Fixed(1, 4),
];
const INDUSTRY_CODE: &[FieldStrategy] = &[FieldStrategy::Keyword(&["行业代码", "Industry Code"])];
const IATF_USI: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["IATF USI", "USI"]),
    FieldStrategy::Fixed(3, 4),
];
const TOTAL_EMPLOYEES: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["包括扩展现场在内的员工总数", "员工总数"]),
    FieldStrategy::Fixed(27, 1),
];
const CERTIFICATE_SCOPE: &[FieldStrategy] = &[FieldStrategy::Keyword(&["证书范围"])];
const REPRESENTATIVE: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["组织代表", "管理者代表", "联系人", "Representative"]),
    FieldStrategy::Fixed(15, 1),
];
const TELEPHONE: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["联系电话", "电话", "Telephone"]),
    FieldStrategy::Fixed(15, 4),
];
const EMAIL: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["电子邮箱", "邮箱", "Email", "E-mail"]),
    FieldStrategy::Fixed(16, 1),
];
const POSTAL_CODE: &[FieldStrategy] = &[
    FieldStrategy::Keyword(&["邮政编码"]),
    FieldStrategy::Fixed(10, 4),
];

const AUDIT_ADDRESS_LABELS: &[&str] = &["审核地址", "Audit Address"];
const FALLBACK_ADDRESS_CELLS: [(usize, usize); 2] = [(11, 1), (11, 4)];

/// 表格中以 "0" 占位表示未填写的邮箱。
const EMAIL_PLACEHOLDER: &str = "0";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationProfile {
    pub name: String,
    pub industry_code: String,
    pub iatf_usi: String,
    pub total_employees: String,
    pub certificate_scope: String,
    pub representative: String,
    pub telephone: String,
    pub email: String,
    pub postal_code: String,
    pub address: AddressSplit,
}

impl OrganizationProfile {
    pub fn extract(database: &Grid, info: &Grid) -> Self {
        let email = resolve_field(database, EMAIL);
        Self {
            name: resolve_field(database, ORGANIZATION_NAME),
            industry_code: resolve_field(database, INDUSTRY_CODE),
            iatf_usi: resolve_field(database, IATF_USI),
            total_employees: resolve_field(database, TOTAL_EMPLOYEES),
            certificate_scope: resolve_field(database, CERTIFICATE_SCOPE),
            representative: resolve_field(database, REPRESENTATIVE),
            telephone: resolve_field(database, TELEPHONE),
            email: if email == EMAIL_PLACEHOLDER {
                String::new()
            } else {
                email
            },
            postal_code: resolve_field(database, POSTAL_CODE),
            address: AddressSplit::from_fragments(audit_address_fragments(database, info)),
        }
    }
}

/// 信息表中的审核地址优先，缺失的中文或英文片段从数据库兜底单元格补齐。
pub fn audit_address_fragments(database: &Grid, info: &Grid) -> AddressFragments {
    let primary = select_fragments(&find_anchored(info, AUDIT_ADDRESS_LABELS));
    if primary.is_complete() {
        return primary;
    }
    let fallback_candidates = FALLBACK_ADDRESS_CELLS
        .iter()
        .map(|(row, col)| database.cell(*row, *col))
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>();
    debug!(
        native_found = !primary.native.is_empty(),
        latin_found = !primary.latin.is_empty(),
        "audit address incomplete in info sheet, using database fallback"
    );
    primary.or_fill(select_fragments(&fallback_candidates))
}
