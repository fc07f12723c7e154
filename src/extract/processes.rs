// 过程清单：首行为表头，其余每行一个受审过程，第 14 列起为条款适用标记。
use crate::sheets::Grid;
use serde_json::{json, Map, Value};
use uuid::Uuid;

const HEADER_ROW: usize = 0;
const NAME_COLUMN: usize = 0;
const REPRESENTATIVE_COLUMN: usize = 2;
const FIRST_CLAUSE_COLUMN: usize = 13;
const APPLIES_MARKERS: &[&str] = &["X", "TRUE"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub id: String,
    pub name: String,
    pub representative: String,
    /// 适用条款的表头文本，按列顺序。
    pub clauses: Vec<String>,
}

impl ProcessRecord {
    pub fn to_value(&self, auditor_id: &str) -> Value {
        let mut object = Map::new();
        object.insert("Id".to_string(), json!(self.id));
        object.insert("ProcessName".to_string(), json!(self.name));
        object.insert("RepresentativeName".to_string(), json!(self.representative));
        object.insert("ManufacturingProcess".to_string(), json!("0"));
        object.insert("OnSiteProcess".to_string(), json!("1"));
        object.insert("RemoteProcess".to_string(), json!("0"));
        object.insert(
            "AuditNotes".to_string(),
            json!([{ "Id": Uuid::new_v4().to_string(), "AuditorId": auditor_id }]),
        );
        for clause in &self.clauses {
            object.insert(clause.clone(), Value::Bool(true));
        }
        Value::Object(object)
    }
}

pub fn extract_processes(grid: &Grid) -> Vec<ProcessRecord> {
    let clause_columns = (FIRST_CLAUSE_COLUMN..grid.width())
        .filter_map(|col| {
            let header = grid.cell(HEADER_ROW, col);
            (!header.is_empty()).then(|| (col, header.to_string()))
        })
        .collect::<Vec<_>>();
    ((HEADER_ROW + 1)..grid.height())
        .filter_map(|row| {
            let name = grid.cell(row, NAME_COLUMN);
            if name.is_empty() {
                return None;
            }
            let clauses = clause_columns
                .iter()
                .filter(|(col, _)| applies(grid.cell(row, *col)))
                .map(|(_, header)| header.clone())
                .collect();
            Some(ProcessRecord {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                representative: grid.cell(row, REPRESENTATIVE_COLUMN).to_string(),
                clauses,
            })
        })
        .collect()
}

fn applies(text: &str) -> bool {
    let text = text.to_uppercase();
    APPLIES_MARKERS.iter().any(|marker| text == *marker)
}
