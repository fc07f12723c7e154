// 关键字定位：在网格中按行优先查找包含关键字的标签单元格，并读取相邻的取值单元格。
use crate::sheets::Grid;

/// 单个字段的取值策略，按声明顺序尝试，首个非空结果胜出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// 标签右侧一列。
    Keyword(&'static [&'static str]),
    /// 标签右侧指定列数。
    KeywordOffset(&'static [&'static str], usize),
    /// 固定坐标兜底 (行, 列)。
    Fixed(usize, usize),
}

impl FieldStrategy {
    pub fn resolve(&self, grid: &Grid) -> String {
        match *self {
            FieldStrategy::Keyword(keywords) => find_by_keyword(grid, keywords),
            FieldStrategy::KeywordOffset(keywords, offset) => {
                find_by_keyword_at(grid, keywords, offset)
            }
            FieldStrategy::Fixed(row, col) => grid.cell(row, col).to_string(),
        }
    }
}

pub fn resolve_field(grid: &Grid, strategies: &[FieldStrategy]) -> String {
    strategies
        .iter()
        .map(|strategy| strategy.resolve(grid))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

pub fn find_by_keyword(grid: &Grid, keywords: &[&str]) -> String {
    find_by_keyword_at(grid, keywords, 1)
}

/// 行优先、子串包含、首个命中即返回；取值列越界时继续向后扫描。
pub fn find_by_keyword_at(grid: &Grid, keywords: &[&str], column_offset: usize) -> String {
    for (row, col, text) in grid.cells() {
        if !contains_any(text, keywords) {
            continue;
        }
        let Some(target) = col.checked_add(column_offset) else {
            continue;
        };
        if target < grid.width() {
            return grid.cell(row, target).to_string();
        }
    }
    String::new()
}

/// 收集每个命中单元格自身及其右侧两格、下一行两格的文本，用于取值被拆分到多个单元格的标签。
pub fn find_anchored(grid: &Grid, keywords: &[&str]) -> Vec<String> {
    let mut collected = Vec::new();
    for (row, col, text) in grid.cells() {
        if !contains_any(text, keywords) {
            continue;
        }
        collected.push(text.to_string());
        let neighbours = [(row, col + 1), (row, col + 2), (row + 1, col), (row + 1, col + 1)];
        for (r, c) in neighbours {
            if !grid.in_bounds(r, c) {
                continue;
            }
            let value = grid.cell(r, c);
            if !value.is_empty() {
                collected.push(value.to_string());
            }
        }
    }
    collected
}

pub(crate) fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && text.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_rows([
            vec!["", "", ""],
            vec!["组织名称", "深圳某某有限公司", ""],
            vec!["", "组织名称（英文）", "Shenzhen Co."],
        ])
    }

    #[test]
    fn returns_empty_when_nothing_matches() {
        assert_eq!(find_by_keyword(&sample(), &["不存在"]), "");
        assert_eq!(find_by_keyword(&Grid::default(), &["组织名称"]), "");
    }

    #[test]
    fn first_match_in_row_major_order_wins() {
        assert_eq!(find_by_keyword(&sample(), &["组织名称"]), "深圳某某有限公司");
    }

    #[test]
    fn keyword_order_does_not_override_scan_order() {
        let grid = Grid::from_rows([vec!["电话", "123"], vec!["联系电话", "456"]]);
        assert_eq!(find_by_keyword(&grid, &["联系电话", "电话"]), "123");
    }

    #[test]
    fn out_of_bounds_target_keeps_scanning() {
        let grid = Grid::from_rows([vec!["x", "y", "邮箱"], vec!["邮箱", "a@b.c", ""]]);
        assert_eq!(find_by_keyword(&grid, &["邮箱"]), "a@b.c");
    }

    #[test]
    fn match_with_empty_value_returns_empty() {
        let grid = Grid::from_rows([vec!["邮箱", ""], vec!["邮箱", "late@b.c"]]);
        assert_eq!(find_by_keyword(&grid, &["邮箱"]), "");
    }

    #[test]
    fn strategy_chain_falls_back_to_fixed_cell() {
        let grid = Grid::from_rows([vec!["", ""], vec!["", "fallback"]]);
        let chain = [FieldStrategy::Keyword(&["组织名称"]), FieldStrategy::Fixed(1, 1)];
        assert_eq!(resolve_field(&grid, &chain), "fallback");
        assert_eq!(resolve_field(&sample(), &chain), "深圳某某有限公司");
    }

    #[test]
    fn custom_offset_reads_further_right() {
        let grid = Grid::from_rows([vec!["USI", "", "1234567"]]);
        assert_eq!(find_by_keyword_at(&grid, &["USI"], 2), "1234567");
    }

    #[test]
    fn anchored_collects_neighbours_of_every_match() {
        let grid = Grid::from_rows([
            vec!["审核地址", "广东省深圳市", "Shenzhen"],
            vec!["", "Guangdong, China", ""],
            vec!["Audit Address", "", ""],
        ]);
        let found = find_anchored(&grid, &["审核地址", "Audit Address"]);
        assert_eq!(
            found,
            vec![
                "审核地址".to_string(),
                "广东省深圳市".to_string(),
                "Shenzhen".to_string(),
                "Guangdong, China".to_string(),
                "Audit Address".to_string(),
            ]
        );
    }
}
