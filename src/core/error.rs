// 转换错误：只有输入级致命错误会向上抛出，字段缺失一律降级为空值。
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeError {
    pub code: &'static str,
    pub message: String,
}

impl IntakeError {
    pub fn workbook_unreadable(message: impl Into<String>) -> Self {
        Self {
            code: "WORKBOOK_UNREADABLE",
            message: message.into(),
        }
    }

    pub fn template_missing(message: impl Into<String>) -> Self {
        Self {
            code: "TEMPLATE_MISSING",
            message: message.into(),
        }
    }

    pub fn template_invalid(message: impl Into<String>) -> Self {
        Self {
            code: "TEMPLATE_INVALID",
            message: message.into(),
        }
    }

    pub fn unsupported_file(message: impl Into<String>) -> Self {
        Self {
            code: "UNSUPPORTED_FILE",
            message: message.into(),
        }
    }
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for IntakeError {}
