use clap::{Args, Parser, Subcommand, ValueEnum};
use iatf_intake::extract::ExtractionMode;
use std::path::PathBuf;

/// IATF intake converter / IATF 审核表格转换工具
///
/// Converts audit-intake workbooks into template-shaped JSON documents.
/// 将审核信息表格转换为符合模板结构的 JSON 文档。
#[derive(Debug, Parser)]
#[command(author, version, bin_name = "iatf-intake")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert workbooks to JSON / 将表格逐个转换为 JSON。
    #[command(visible_alias = "c")]
    Convert(ConvertCommand),

    /// List site extraction modes / 列出现场表抽取模式。
    Modes,
}

#[derive(Debug, Clone, Args)]
pub struct ConvertCommand {
    /// Workbook files (.xlsx/.xlsm/.xls/.xlsb/.ods) / 待转换的表格文件。
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// User template JSON; its Stage1 nodes replace the base template's / 用户模板，Stage1 节点覆盖底座。
    #[arg(long, short = 't', value_name = "JSON")]
    pub template: Option<PathBuf>,

    /// Site extraction mode (defaults to config) / 现场表抽取模式，默认取配置。
    #[arg(long, short = 'm', value_enum)]
    pub mode: Option<ModeArg>,

    /// Output directory for <stem>.json files / 输出目录。
    #[arg(long = "out-dir", short = 'o', value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Config file path (overrides IATF_CONFIG_PATH) / 配置文件路径。
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a JSON report instead of text / 以 JSON 输出转换报告。
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ModeArg {
    Standard,
    Ems,
    Supporting,
    Comprehensive,
}

impl ModeArg {
    pub fn to_mode(self) -> ExtractionMode {
        match self {
            Self::Standard => ExtractionMode::Standard,
            Self::Ems => ExtractionMode::EmsOnly,
            Self::Supporting => ExtractionMode::SupportingSitesOnly,
            Self::Comprehensive => ExtractionMode::Comprehensive,
        }
    }
}
