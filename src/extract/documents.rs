// 程序文件清单：按列扫描标记单元格，收集其下方同列的文件名称。
use crate::extract::locator::contains_any;
use crate::sheets::Grid;

const DOCUMENT_MARKERS: &[&str] = &["公司内对应的程序文件", "包含名称、编号、版本"];

/// 列优先查找标记；首个产出文件名的列即为结果，标记下方的空行跳过。
pub fn extract_document_names(grid: &Grid) -> Vec<String> {
    for col in 0..grid.width() {
        let Some(marker_row) =
            (0..grid.height()).find(|row| contains_any(grid.cell(*row, col), DOCUMENT_MARKERS))
        else {
            continue;
        };
        let names = ((marker_row + 1)..grid.height())
            .map(|row| grid.cell(row, col))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        if !names.is_empty() {
            return names;
        }
    }
    Vec::new()
}
