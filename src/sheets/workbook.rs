// 工作簿读取：用 calamine 打开表格，按约定的工作表名组装成四张网格。
use crate::core::error::IntakeError;
use crate::sheets::grid::Grid;
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use std::path::Path;
use tracing::{debug, warn};

pub const DATABASE_SHEET: &str = "数据库";
pub const PROCESS_LIST_SHEET: &str = "过程清单";
pub const INFO_SHEET: &str = "信息";
/// 文件清单固定位于第 9 张工作表。
pub const DOCUMENT_LIST_SHEET_INDEX: usize = 8;

const SUPPORTED_EXTENSIONS: &[&str] = &[".ods", ".xls", ".xlsb", ".xlsm", ".xlsx"];

#[derive(Debug, Clone, Default)]
pub struct SheetSet {
    pub database: Grid,
    pub process_list: Grid,
    pub info: Grid,
    pub document_list: Grid,
}

impl SheetSet {
    /// 按定义顺序传入的工作表组装；缺失的工作表退化为空网格。
    pub fn from_sheets(sheets: Vec<(String, Grid)>) -> Self {
        let find = |name: &str| {
            sheets
                .iter()
                .find(|(sheet, _)| sheet.trim() == name)
                .map(|(_, grid)| grid.clone())
        };
        let database = find(DATABASE_SHEET)
            .or_else(|| sheets.first().map(|(_, grid)| grid.clone()))
            .unwrap_or_default();
        let document_list = sheets
            .get(DOCUMENT_LIST_SHEET_INDEX)
            .map(|(_, grid)| grid.clone())
            .unwrap_or_default();
        Self {
            database,
            process_list: find(PROCESS_LIST_SHEET).unwrap_or_default(),
            info: find(INFO_SHEET).unwrap_or_default(),
            document_list,
        }
    }
}

pub fn supported_extensions() -> Vec<String> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

pub fn is_supported_extension(extension: &str) -> bool {
    let normalized = normalize_extension(extension);
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(&normalized))
}

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{trimmed}")
    }
}

pub fn load_sheet_set(path: &Path) -> Result<SheetSet, IntakeError> {
    let mut workbook = open_workbook_auto(path).map_err(|err| {
        IntakeError::workbook_unreadable(format!("{}: {err}", path.display()))
    })?;
    let names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                let grid = range_to_grid(&range);
                debug!(
                    "工作表已读取: {name} ({}x{})",
                    grid.height(),
                    grid.width()
                );
                sheets.push((name, grid));
            }
            Err(err) => {
                // 单张工作表损坏不影响整体转换，按空表处理。
                warn!("工作表读取失败，按空表处理: {name}, {err}");
                sheets.push((name, Grid::default()));
            }
        }
    }
    Ok(SheetSet::from_sheets(sheets))
}

fn range_to_grid(range: &Range<Data>) -> Grid {
    // calamine 的区域从首个非空单元格开始，这里补回偏移，保证坐标与 A1 对齐。
    let (row_offset, col_offset) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));
    let mut rows = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset];
        cells.extend(row.iter().map(cell_to_string));
        rows.push(cells);
    }
    Grid::new(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(text) => text.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => format_float(*value),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|value| value.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string(),
    }
}

fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    value.to_string()
}
