// JSON 路径写入：逐级确保中间节点为对象，保留兄弟键；列表支持整体替换与按位合并。
use serde_json::{Map, Value};
use tracing::warn;

/// 沿路径逐级取得（必要时创建）对象节点。
/// 路径上已有的非对象值会被替换为空对象，原值丢弃并记录告警。
pub fn ensure_object<'a>(root: &'a mut Value, path: &[&str]) -> &'a mut Map<String, Value> {
    let mut current = coerce_object(root, "<root>");
    for key in path {
        let slot = current
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = coerce_object(slot, key);
    }
    current
}

pub fn child_object<'a>(parent: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    coerce_object(slot, key)
}

fn coerce_object<'a>(slot: &'a mut Value, key: &str) -> &'a mut Map<String, Value> {
    match slot {
        Value::Object(map) => map,
        other => {
            if !other.is_null() {
                warn!("模板节点不是对象，已替换为空对象: {key} (原值类型 {})", type_name(other));
            }
            *other = Value::Object(Map::new());
            coerce_object(other, key)
        }
    }
}

/// 取得列表节点；缺失或类型不符时置为空列表。
pub fn ensure_list<'a>(parent: &'a mut Map<String, Value>, key: &str) -> &'a mut Vec<Value> {
    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    coerce_list(slot, key)
}

fn coerce_list<'a>(slot: &'a mut Value, key: &str) -> &'a mut Vec<Value> {
    match slot {
        Value::Array(items) => items,
        other => {
            if !other.is_null() {
                warn!("模板节点不是列表，已替换为空列表: {key} (原值类型 {})", type_name(other));
            }
            *other = Value::Array(Vec::new());
            coerce_list(other, key)
        }
    }
}

pub fn set_if_present(target: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        target.insert(key.to_string(), Value::String(value.to_string()));
    }
}

pub fn set_string(target: &mut Map<String, Value>, key: &str, value: &str) {
    target.insert(key.to_string(), Value::String(value.to_string()));
}

/// 第 i 条写入列表第 i 项（只覆盖给出的键），超出部分追加；模板多出的条目保持原样。
pub fn merge_positional(list: &mut Vec<Value>, entries: Vec<Map<String, Value>>) {
    for (index, entry) in entries.into_iter().enumerate() {
        match list.get_mut(index) {
            Some(Value::Object(existing)) => existing.extend(entry),
            Some(other) => {
                warn!(
                    "列表第 {index} 项不是对象，跳过按位合并 (类型 {})",
                    type_name(other)
                );
            }
            None => list.push(Value::Object(entry)),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ensure_object_keeps_siblings() {
        let mut doc = json!({ "A": { "keep": 1 }, "other": true });
        ensure_object(&mut doc, &["A", "B", "C"]).insert("x".to_string(), json!(2));
        assert_eq!(doc, json!({ "A": { "keep": 1, "B": { "C": { "x": 2 } } }, "other": true }));
    }

    #[test]
    fn non_object_nodes_are_coerced() {
        let mut doc = json!({ "A": "oops" });
        ensure_object(&mut doc, &["A"]).insert("x".to_string(), json!(1));
        assert_eq!(doc, json!({ "A": { "x": 1 } }));
    }

    #[test]
    fn non_object_root_is_coerced() {
        let mut doc = json!([1, 2]);
        ensure_object(&mut doc, &[]).insert("x".to_string(), json!(1));
        assert_eq!(doc, json!({ "x": 1 }));
    }

    #[test]
    fn ensure_list_replaces_wrong_types() {
        let mut map = Map::new();
        map.insert("items".to_string(), json!("none"));
        ensure_list(&mut map, "items").push(json!(1));
        assert_eq!(Value::Object(map), json!({ "items": [1] }));
    }

    #[test]
    fn null_and_scalar_nodes_along_a_path_are_replaced() {
        let mut doc = json!({ "A": { "B": 5, "keep": true }, "L": null });
        ensure_object(&mut doc, &["A", "B", "C"]).insert("x".to_string(), json!(1));
        let root = ensure_object(&mut doc, &[]);
        ensure_list(root, "L").push(json!("first"));
        ensure_list(root, "L").push(json!("second"));
        assert_eq!(
            doc,
            json!({ "A": { "B": { "C": { "x": 1 } }, "keep": true }, "L": ["first", "second"] })
        );
    }

    #[test]
    fn empty_values_are_not_written() {
        let mut map = Map::new();
        map.insert("Name".to_string(), json!("template"));
        set_if_present(&mut map, "Name", "");
        set_if_present(&mut map, "Code", "A1");
        assert_eq!(Value::Object(map), json!({ "Name": "template", "Code": "A1" }));
    }

    #[test]
    fn positional_merge_preserves_extra_entries() {
        let mut list = vec![
            json!({ "DocumentName": "old0", "Clause": "4.1" }),
            json!("scalar"),
            json!({ "DocumentName": "old2" }),
        ];
        let entries = ["new0", "new1", "new2", "new3"]
            .iter()
            .map(|name| {
                let mut entry = Map::new();
                entry.insert("DocumentName".to_string(), json!(name));
                entry
            })
            .collect();
        merge_positional(&mut list, entries);
        assert_eq!(
            list,
            vec![
                json!({ "DocumentName": "new0", "Clause": "4.1" }),
                json!("scalar"),
                json!({ "DocumentName": "new2" }),
                json!({ "DocumentName": "new3" }),
            ]
        );
    }
}
