// 重复块表格：在限定窗口内定位表头行、按表头文本映射列角色，供现场表与顾客表共用。
use crate::sheets::Grid;
use std::collections::HashMap;
use std::hash::Hash;

/// 行列搜索窗口，左闭右开；超出网格的部分自动截断。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl SearchWindow {
    pub const fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    pub fn rows(&self, grid: &Grid) -> std::ops::Range<usize> {
        self.row_start..self.row_end.min(grid.height())
    }

    pub fn cols(&self, grid: &Grid) -> std::ops::Range<usize> {
        self.col_start..self.col_end.min(grid.width())
    }
}

pub fn upper(text: &str) -> String {
    text.to_uppercase()
}

pub fn contains_upper(text: &str, keywords: &[&str]) -> bool {
    let text = upper(text);
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && text.contains(&upper(keyword)))
}

/// 窗口内该行的首个非空单元格。区块标题与表头都从这里开始，数据行的备注列不参与匹配。
fn leading_text<'a>(grid: &'a Grid, row: usize, window: &SearchWindow) -> Option<&'a str> {
    window
        .cols(grid)
        .map(|col| grid.cell(row, col))
        .find(|text| !text.is_empty())
}

fn row_leads_with(grid: &Grid, row: usize, window: &SearchWindow, keywords: &[&str]) -> bool {
    leading_text(grid, row, window).is_some_and(|text| contains_upper(text, keywords))
}

/// 首个以表头关键字开头的行。
pub fn find_header_row(grid: &Grid, keywords: &[&str], window: &SearchWindow) -> Option<usize> {
    window
        .rows(grid)
        .find(|row| row_leads_with(grid, *row, window, keywords))
}

/// 按表头文本归类列角色；同一角色以最先出现的列为准。
pub fn map_columns<R, F>(
    grid: &Grid,
    header_row: usize,
    window: &SearchWindow,
    classify: F,
) -> HashMap<R, usize>
where
    R: Copy + Eq + Hash,
    F: Fn(&str) -> Option<R>,
{
    let mut columns = HashMap::new();
    for col in window.cols(grid) {
        let text = grid.cell(header_row, col);
        if text.is_empty() {
            continue;
        }
        if let Some(role) = classify(&upper(text)) {
            columns.entry(role).or_insert(col);
        }
    }
    columns
}

pub fn column_text<'a, R>(grid: &'a Grid, row: usize, columns: &HashMap<R, usize>, role: R) -> &'a str
where
    R: Eq + Hash,
{
    columns
        .get(&role)
        .map(|col| grid.cell(row, *col))
        .unwrap_or("")
}

/// 行首单元格出现其他区块的表头关键字时，视为进入了下一个区块。
pub fn row_has_foreign_header(
    grid: &Grid,
    row: usize,
    window: &SearchWindow,
    foreign_keywords: &[&str],
) -> bool {
    row_leads_with(grid, row, window, foreign_keywords)
}
