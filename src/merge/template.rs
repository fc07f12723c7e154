// 模板组装：标准底座 + 用户模板，用户模板的 Stage1 节点覆盖底座。
use crate::core::error::IntakeError;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const STAGE1_KEYS: [&str; 3] = ["Stage1Activities", "Stage1Part1", "Stage1Part2"];

pub fn parse_template(bytes: &[u8], source: &str) -> Result<Value, IntakeError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| IntakeError::template_invalid(format!("{source}: {err}")))?;
    if !value.is_object() {
        return Err(IntakeError::template_invalid(format!(
            "{source}: 模板顶层必须是 JSON 对象"
        )));
    }
    Ok(value)
}

pub fn load_template_file(path: &Path) -> Result<Value, IntakeError> {
    let bytes = fs::read(path)
        .map_err(|err| IntakeError::template_missing(format!("{}: {err}", path.display())))?;
    parse_template(&bytes, &path.display().to_string())
}

/// 两者都有时以底座为准、替换 Stage1 节点；只有一份时单独使用；都没有时报错。
pub fn compose_template(base: Option<&Value>, user: Option<&Value>) -> Result<Value, IntakeError> {
    for (label, template) in [("base", base), ("user", user)] {
        if let Some(template) = template {
            if !template.is_object() {
                return Err(IntakeError::template_invalid(format!(
                    "{label} template is not a JSON object"
                )));
            }
        }
    }
    match (base, user) {
        (Some(base), Some(user)) => {
            let mut composed = base.clone();
            if let (Some(target), Some(source)) = (composed.as_object_mut(), user.as_object()) {
                for key in STAGE1_KEYS {
                    if let Some(node) = source.get(key) {
                        debug!("用户模板覆盖底座节点: {key}");
                        target.insert(key.to_string(), node.clone());
                    }
                }
            }
            Ok(composed)
        }
        (Some(only), None) | (None, Some(only)) => Ok(only.clone()),
        (None, None) => Err(IntakeError::template_missing(
            "no base template configured and no template supplied",
        )),
    }
}
