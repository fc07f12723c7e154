mod args;

use anyhow::{Context, Result};
use args::{Cli, Command, ConvertCommand, ModeArg};
use clap::Parser;
use iatf_intake::config::load_config;
use iatf_intake::extract::ExtractionMode;
use iatf_intake::merge::{compose_template, load_template_file};
use iatf_intake::services::{convert_batch, ConvertOptions, FileOutcome};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Convert(cmd) => handle_convert(cmd),
        Command::Modes => {
            handle_modes();
            Ok(ExitCode::SUCCESS)
        }
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_modes() {
    for mode in ExtractionMode::ALL {
        println!("{:<14} {}", mode.as_str(), mode.description());
    }
}

fn handle_convert(cmd: ConvertCommand) -> Result<ExitCode> {
    let config = load_config(cmd.config.as_deref());
    let base = config
        .conversion
        .base_template
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(|path| load_template_file(Path::new(path)))
        .transpose()?;
    let user = cmd
        .template
        .as_deref()
        .map(load_template_file)
        .transpose()?;
    let template = compose_template(base.as_ref(), user.as_ref())?;
    let options = ConvertOptions::from_config(&config.conversion, cmd.mode.map(ModeArg::to_mode));

    let out_dir = cmd.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    let outcomes = convert_batch(&cmd.files, &template, &options);
    let mut report = Vec::with_capacity(outcomes.len());
    let mut failed = 0usize;
    let mut taken = HashSet::new();
    for (path, outcome) in cmd.files.iter().zip(&outcomes) {
        let entry = match write_outcome(path, outcome, &out_dir, &mut taken) {
            Ok(entry) => entry,
            Err(err) => json!({ "name": outcome.name, "ok": false, "error": { "message": format!("{err:#}") } }),
        };
        if entry["ok"] != true {
            failed += 1;
        }
        if !cmd.json {
            print_entry(&entry);
        }
        report.push(entry);
    }

    if cmd.json {
        let payload = json!({ "ok": failed == 0, "mode": options.mode.as_str(), "items": report });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("完成: {} 成功, {failed} 失败", outcomes.len() - failed);
    }
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// 成功时写出 <stem>.json；返回不含文档正文的报告条目。
fn write_outcome(
    path: &Path,
    outcome: &FileOutcome,
    out_dir: &Path,
    taken: &mut HashSet<String>,
) -> Result<Value> {
    let conversion = match &outcome.result {
        Ok(conversion) => conversion,
        Err(err) => {
            return Ok(json!({
                "name": outcome.name,
                "ok": false,
                "error": { "code": err.code, "message": err.message },
            }))
        }
    };
    let target = out_dir.join(unique_output_name(path, taken));
    let text = serde_json::to_string_pretty(&conversion.document)?;
    fs::write(&target, text).with_context(|| format!("failed to write {}", target.display()))?;
    Ok(json!({
        "name": outcome.name,
        "ok": true,
        "output": target.display().to_string(),
        "summary": conversion.summary.to_value(),
        "summary_text": conversion.summary.render_text(),
    }))
}

fn print_entry(entry: &Value) {
    let name = entry["name"].as_str().unwrap_or("");
    if entry["ok"] == true {
        println!("[ok] {name} -> {}", entry["output"].as_str().unwrap_or(""));
        for line in entry["summary_text"].as_str().unwrap_or("").lines() {
            println!("    {line}");
        }
    } else {
        eprintln!(
            "[failed] {name}: {}",
            entry["error"]["message"].as_str().unwrap_or("")
        );
    }
}

fn output_file_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.trim().is_empty())
        .unwrap_or_else(|| "document".to_string());
    format!("{stem}.json")
}

/// 同一批次内重名的输出依次加 -2、-3 后缀，避免互相覆盖。
fn unique_output_name(path: &Path, taken: &mut HashSet<String>) -> String {
    let name = output_file_name(path);
    if taken.insert(name.clone()) {
        return name;
    }
    let stem = name.trim_end_matches(".json");
    let mut index = 2usize;
    loop {
        let candidate = format!("{stem}-{index}.json");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        index += 1;
    }
}
