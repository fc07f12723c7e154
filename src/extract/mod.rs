// 字段抽取：各关注点的纯函数由此汇总为一份不可变的抽取结果，交给合并阶段。
pub mod address;
pub mod auditor;
pub mod customers;
pub mod dates;
pub mod documents;
pub mod locator;
pub mod organization;
pub mod processes;
pub mod sites;
pub mod table;

use crate::sheets::SheetSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub use auditor::AuditorIdentity;
pub use customers::CustomerRecord;
pub use dates::AuditDates;
pub use organization::OrganizationProfile;
pub use processes::ProcessRecord;
pub use sites::{ExtractedSite, SiteCategory};

/// 现场表抽取模式：只决定运行哪些现场表抽取，标量字段始终抽取。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtractionMode {
    #[default]
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "ems")]
    EmsOnly,
    #[serde(rename = "supporting")]
    SupportingSitesOnly,
    #[serde(rename = "comprehensive")]
    Comprehensive,
}

impl ExtractionMode {
    pub const ALL: [ExtractionMode; 4] = [
        ExtractionMode::Standard,
        ExtractionMode::EmsOnly,
        ExtractionMode::SupportingSitesOnly,
        ExtractionMode::Comprehensive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::EmsOnly => "ems",
            Self::SupportingSitesOnly => "supporting",
            Self::Comprehensive => "comprehensive",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Standard => "标准模式：不抽取现场表",
            Self::EmsOnly => "仅抽取扩展制造现场",
            Self::SupportingSitesOnly => "仅抽取提供支持与接受支持现场",
            Self::Comprehensive => "抽取全部三类现场",
        }
    }

    pub fn runs(self, category: SiteCategory) -> bool {
        match self {
            Self::Standard => false,
            Self::EmsOnly => category == SiteCategory::ExtendedManufacturing,
            Self::SupportingSitesOnly => category != SiteCategory::ExtendedManufacturing,
            Self::Comprehensive => true,
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "" | "standard" => Ok(Self::Standard),
            "ems" | "ems_only" => Ok(Self::EmsOnly),
            "supporting" | "supporting_sites_only" | "supporting_only" => {
                Ok(Self::SupportingSitesOnly)
            }
            "comprehensive" | "all" => Ok(Self::Comprehensive),
            _ => Err(format!("unknown extraction mode: {value}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSettings {
    pub native_country: String,
    pub next_audit_offset_days: i64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            native_country: "中国".to_string(),
            next_audit_offset_days: 45,
        }
    }
}

/// 每类现场的抽取结果；None 表示当前模式未运行该类抽取。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteLists {
    pub extended_manufacturing: Option<Vec<ExtractedSite>>,
    pub providing_support: Option<Vec<ExtractedSite>>,
    pub receiving_support: Option<Vec<ExtractedSite>>,
}

impl SiteLists {
    pub fn get(&self, category: SiteCategory) -> Option<&[ExtractedSite]> {
        match category {
            SiteCategory::ExtendedManufacturing => self.extended_manufacturing.as_deref(),
            SiteCategory::ProvidingSupport => self.providing_support.as_deref(),
            SiteCategory::ReceivingSupport => self.receiving_support.as_deref(),
        }
    }

    fn slot(&mut self, category: SiteCategory) -> &mut Option<Vec<ExtractedSite>> {
        match category {
            SiteCategory::ExtendedManufacturing => &mut self.extended_manufacturing,
            SiteCategory::ProvidingSupport => &mut self.providing_support,
            SiteCategory::ReceivingSupport => &mut self.receiving_support,
        }
    }

    pub fn count(&self, category: SiteCategory) -> usize {
        self.get(category).map(<[ExtractedSite]>::len).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub auditor: AuditorIdentity,
    pub dates: AuditDates,
    pub cb_identification_no: String,
    pub organization: OrganizationProfile,
    pub customers: Vec<CustomerRecord>,
    pub sites: SiteLists,
    pub documents: Vec<String>,
    pub processes: Vec<ProcessRecord>,
}

const CB_IDENTIFICATION_NO: &[locator::FieldStrategy] = &[
    locator::FieldStrategy::Keyword(&["认证机构标识号"]),
    locator::FieldStrategy::Fixed(2, 4),
];

pub fn extract_fields(
    sheets: &SheetSet,
    mode: ExtractionMode,
    settings: &ExtractionSettings,
) -> ExtractedFields {
    let mut site_lists = SiteLists::default();
    for category in SiteCategory::ALL {
        if !mode.runs(category) {
            continue;
        }
        let extracted =
            sites::extract_sites(&sheets.info, category.block(), &settings.native_country);
        debug!(
            category = category.as_str(),
            count = extracted.len(),
            "site table extracted"
        );
        *site_lists.slot(category) = Some(extracted);
    }
    ExtractedFields {
        auditor: AuditorIdentity::extract(&sheets.database, &sheets.info),
        dates: AuditDates::extract(&sheets.database, settings.next_audit_offset_days),
        cb_identification_no: locator::resolve_field(&sheets.database, CB_IDENTIFICATION_NO),
        organization: OrganizationProfile::extract(&sheets.database, &sheets.info),
        customers: customers::resolve_customers(&sheets.database, &sheets.info),
        sites: site_lists,
        documents: documents::extract_document_names(&sheets.document_list),
        processes: processes::extract_processes(&sheets.process_list),
    }
}
