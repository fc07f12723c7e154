// 全局应用状态：配置与预加载的标准底座模板，各请求只读共享。
use crate::config::Config;
use crate::merge::load_template_file;
use anyhow::Result;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    /// 底座模板只在启动时读取一次，转换时深拷贝使用。
    pub base_template: Option<Arc<Value>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let base_template = match config.conversion.base_template.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                let template = load_template_file(Path::new(path.trim()))?;
                info!("标准底座模板已加载: {path}");
                Some(Arc::new(template))
            }
            _ => {
                warn!("未配置标准底座模板，转换请求需自带模板");
                None
            }
        };
        Ok(Self {
            config,
            base_template,
        })
    }

    pub fn with_base_template(config: Config, base_template: Option<Value>) -> Self {
        Self {
            config,
            base_template: base_template.map(Arc::new),
        }
    }
}
