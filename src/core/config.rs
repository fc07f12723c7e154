// 配置读取：YAML 文件 + 环境变量占位符展开，文件缺失时使用默认配置。
use regex::{Captures, Regex};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

use crate::extract::ExtractionMode;

pub const DEFAULT_CONFIG_PATH: &str = "config/iatf.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_u16_from_any")]
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8010,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// 标准底座模板；为空时只使用每次上传的模板。
    #[serde(default)]
    pub base_template: Option<String>,
    #[serde(default)]
    pub default_mode: ExtractionMode,
    #[serde(default = "default_native_country")]
    pub native_country: String,
    #[serde(default = "default_next_audit_offset_days")]
    pub next_audit_offset_days: i64,
    #[serde(default = "default_audit_days_performed")]
    pub audit_days_performed: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            base_template: None,
            default_mode: ExtractionMode::default(),
            native_country: default_native_country(),
            next_audit_offset_days: default_next_audit_offset_days(),
            audit_days_performed: default_audit_days_performed(),
        }
    }
}

fn default_native_country() -> String {
    "中国".to_string()
}

fn default_next_audit_offset_days() -> i64 {
    45
}

fn default_audit_days_performed() -> f64 {
    1.5
}

fn deserialize_u16_from_any<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    struct U16Visitor;

    impl<'de> Visitor<'de> for U16Visitor {
        type Value = u16;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("u16 or numeric string")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u16::try_from(value).map_err(|_| E::custom("u16 out of range"))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u16::try_from(value).map_err(|_| E::custom("u16 out of range"))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse::<u16>()
                .map_err(|_| E::custom("invalid u16 string"))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            self.visit_str(&value)
        }
    }

    deserializer.deserialize_any(U16Visitor)
}

pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    env::var("IATF_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn load_config(explicit: Option<&Path>) -> Config {
    let path = resolve_config_path(explicit);
    let mut value = read_yaml(&path);
    expand_yaml_env(&mut value);
    if value.is_null() {
        return Config::default();
    }
    serde_yaml::from_value::<Config>(value).unwrap_or_else(|err| {
        warn!("配置解析失败，使用默认配置: {err}");
        Config::default()
    })
}

fn read_yaml(path: &Path) -> Value {
    // 配置文件允许不存在，命令行首次使用无需准备配置。
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("读取配置失败: {}, {err}", path.display());
            return Value::Null;
        }
    };
    serde_yaml::from_str(&content).unwrap_or_else(|err| {
        warn!("解析 YAML 失败: {}, {err}", path.display());
        Value::Null
    })
}

fn expand_yaml_env(value: &mut Value) {
    match value {
        Value::String(text) => {
            *text = expand_env_placeholders(text);
        }
        Value::Sequence(items) => {
            for item in items {
                expand_yaml_env(item);
            }
        }
        Value::Mapping(map) => {
            for (_, value) in map.iter_mut() {
                expand_yaml_env(value);
            }
        }
        _ => {}
    }
}

fn expand_env_placeholders(input: &str) -> String {
    expand_placeholders(input, |name| env::var(name).ok())
}

/// 展开 `${NAME}` 与 `${NAME:-默认值}`；变量为空视同未设置。不合法的写法原样保留。
fn expand_placeholders(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    placeholder_regex()
        .replace_all(input, |caps: &Captures<'_>| {
            lookup(&caps[1])
                .filter(|value| !value.is_empty())
                .or_else(|| caps.get(2).map(|default| default.as_str().to_string()))
                .unwrap_or_default()
        })
        .into_owned()
}

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("invalid placeholder regex")
    })
}
