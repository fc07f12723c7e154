// 转换编排：读取工作簿 → 抽取字段 → 合并模板，逐文件独立产出结果与诊断摘要。
use crate::config::ConversionConfig;
use crate::core::error::IntakeError;
use crate::extract::{extract_fields, ExtractedFields, ExtractionMode, ExtractionSettings, SiteCategory};
use crate::merge::{merge_document, MergeSettings};
use crate::sheets::workbook::{is_supported_extension, supported_extensions};
use crate::sheets::{load_sheet_set, SheetSet};
use serde_json::{json, Map, Value};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub mode: ExtractionMode,
    pub extraction: ExtractionSettings,
    pub merge: MergeSettings,
}

impl ConvertOptions {
    /// 未显式指定模式时使用配置中的默认模式。
    pub fn from_config(config: &ConversionConfig, mode: Option<ExtractionMode>) -> Self {
        Self {
            mode: mode.unwrap_or(config.default_mode),
            extraction: ExtractionSettings {
                native_country: config.native_country.clone(),
                next_audit_offset_days: config.next_audit_offset_days,
            },
            merge: MergeSettings {
                native_country: config.native_country.clone(),
                audit_days_performed: config.audit_days_performed,
            },
        }
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::from_config(&ConversionConfig::default(), None)
    }
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: Value,
    pub summary: ConversionSummary,
}

/// 供人工核对的关键字段摘要，不作为机器接口。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub mode: ExtractionMode,
    pub auditor_name: String,
    pub audit_start: String,
    pub audit_end: String,
    pub organization_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub address_low_confidence: bool,
    pub customers: usize,
    pub processes: usize,
    pub documents: usize,
    /// 未运行的现场类别为 None。
    pub sites: Vec<(SiteCategory, Option<usize>)>,
}

impl ConversionSummary {
    pub fn from_fields(fields: &ExtractedFields, mode: ExtractionMode) -> Self {
        let latin = &fields.organization.address.latin;
        Self {
            mode,
            auditor_name: fields.auditor.name.clone(),
            audit_start: fields.dates.start.clone(),
            audit_end: fields.dates.end.clone(),
            organization_name: fields.organization.name.clone(),
            street: latin.street.clone(),
            city: latin.city.clone(),
            state: latin.state.clone(),
            country: latin.country.clone(),
            address_low_confidence: latin.is_low_confidence(),
            customers: fields.customers.len(),
            processes: fields.processes.len(),
            documents: fields.documents.len(),
            sites: SiteCategory::ALL
                .iter()
                .map(|category| (*category, fields.sites.get(*category).map(|sites| sites.len())))
                .collect(),
        }
    }

    pub fn to_value(&self) -> Value {
        let sites = self
            .sites
            .iter()
            .map(|(category, count)| (category.as_str().to_string(), json!(count)))
            .collect::<Map<String, Value>>();
        json!({
            "mode": self.mode.as_str(),
            "auditor_name": self.auditor_name,
            "audit_start": self.audit_start,
            "audit_end": self.audit_end,
            "organization_name": self.organization_name,
            "address": {
                "street": self.street,
                "city": self.city,
                "state": self.state,
                "country": self.country,
                "low_confidence": self.address_low_confidence,
            },
            "customers": self.customers,
            "processes": self.processes,
            "documents": self.documents,
            "sites": sites,
        })
    }

    pub fn render_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "模式:     {}", self.mode.as_str());
        let _ = writeln!(text, "审核员:   \"{}\"", self.auditor_name);
        let _ = writeln!(text, "审核日期: \"{}\" ~ \"{}\"", self.audit_start, self.audit_end);
        let _ = writeln!(text, "组织名称: \"{}\"", self.organization_name);
        let _ = writeln!(text, "Street1:  \"{}\"", self.street);
        let _ = writeln!(text, "City:     \"{}\"", self.city);
        let _ = writeln!(text, "State:    \"{}\"", self.state);
        let _ = writeln!(text, "Country:  \"{}\"", self.country);
        if self.address_low_confidence {
            let _ = writeln!(text, "注意: 英文地址不足 4 段，拆分结果需人工复核");
        }
        let _ = write!(
            text,
            "顾客 {} / 过程 {} / 文件 {}",
            self.customers, self.processes, self.documents
        );
        for (category, count) in &self.sites {
            match count {
                Some(count) => {
                    let _ = write!(text, " / {} {count}", category.as_str());
                }
                None => {
                    let _ = write!(text, " / {} -", category.as_str());
                }
            }
        }
        text
    }
}

pub fn convert_sheets(sheets: &SheetSet, template: &Value, options: &ConvertOptions) -> Conversion {
    let fields = extract_fields(sheets, options.mode, &options.extraction);
    let document = merge_document(template, &fields, &options.merge);
    Conversion {
        document,
        summary: ConversionSummary::from_fields(&fields, options.mode),
    }
}

pub fn convert_workbook(
    path: &Path,
    template: &Value,
    options: &ConvertOptions,
) -> Result<Conversion, IntakeError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    if !is_supported_extension(extension) {
        return Err(IntakeError::unsupported_file(format!(
            "{}: 不支持的文件类型，仅支持 {}",
            path.display(),
            supported_extensions().join(", ")
        )));
    }
    let sheets = load_sheet_set(path)?;
    Ok(convert_sheets(&sheets, template, options))
}

/// 在阻塞线程池中执行同步转换。
pub async fn convert_path(
    path: PathBuf,
    template: Arc<Value>,
    options: ConvertOptions,
) -> Result<Conversion, IntakeError> {
    tokio::task::spawn_blocking(move || convert_workbook(&path, &template, &options))
        .await
        .map_err(|err| IntakeError::workbook_unreadable(format!("转换任务异常退出: {err}")))?
}

#[derive(Debug)]
pub struct FileOutcome {
    pub name: String,
    pub result: Result<Conversion, IntakeError>,
}

impl FileOutcome {
    pub fn new(name: impl Into<String>, result: Result<Conversion, IntakeError>) -> Self {
        let name = name.into();
        match &result {
            Ok(conversion) => info!(
                "转换完成: {name}, 顾客 {}, 过程 {}",
                conversion.summary.customers, conversion.summary.processes
            ),
            Err(err) => warn!("转换失败: {name}, {err}"),
        }
        Self { name, result }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn to_value(&self) -> Value {
        match &self.result {
            Ok(conversion) => json!({
                "name": self.name,
                "ok": true,
                "document": conversion.document,
                "summary": conversion.summary.to_value(),
            }),
            Err(err) => json!({
                "name": self.name,
                "ok": false,
                "error": { "code": err.code, "message": err.message },
            }),
        }
    }
}

/// 逐个文件顺序转换，单个文件失败不影响其余文件。
pub fn convert_batch(paths: &[PathBuf], template: &Value, options: &ConvertOptions) -> Vec<FileOutcome> {
    paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            FileOutcome::new(name, convert_workbook(path, template, options))
        })
        .collect()
}

pub fn batch_payload(outcomes: &[FileOutcome]) -> Value {
    json!({
        "ok": outcomes.iter().all(FileOutcome::is_ok),
        "items": outcomes.iter().map(FileOutcome::to_value).collect::<Vec<_>>(),
    })
}
