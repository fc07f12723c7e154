// 转换接口：接收多文件上传，逐个落盘转换后返回每个文件的结果。
use crate::api::errors::{error_response, error_response_with_code, intake_error_response};
use crate::extract::ExtractionMode;
use crate::merge::{compose_template, parse_template};
use crate::services::{batch_payload, convert_path, ConvertOptions, FileOutcome};
use crate::state::AppState;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

const UPLOAD_DIR_NAME: &str = "iatf_uploads";

pub fn router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/iatf/convert",
            post(convert).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/iatf/modes", get(modes))
        .route("/health", get(health))
}

struct SavedUpload {
    name: String,
    path: PathBuf,
}

#[derive(Default)]
struct ConvertRequest {
    uploads: Vec<SavedUpload>,
    template: Option<Value>,
    mode: Option<ExtractionMode>,
}

async fn convert(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Value>, Response> {
    let temp_dir = create_temp_dir()
        .await
        .map_err(|err| error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    let result = async {
        let request = read_request(multipart, &temp_dir).await?;
        run_conversions(&state, request).await
    }
    .await;
    let _ = tokio::fs::remove_dir_all(&temp_dir).await;
    result.map(Json)
}

async fn read_request(mut multipart: Multipart, temp_dir: &Path) -> Result<ConvertRequest, Response> {
    let mut request = ConvertRequest::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| error_response(StatusCode::BAD_REQUEST, err.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "template" => {
                let source = field.file_name().unwrap_or("template").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| error_response(StatusCode::BAD_REQUEST, err.to_string()))?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                let template =
                    parse_template(&bytes, &source).map_err(|err| intake_error_response(&err))?;
                request.template = Some(template);
            }
            "mode" => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| error_response(StatusCode::BAD_REQUEST, err.to_string()))?;
                if text.trim().is_empty() {
                    continue;
                }
                let mode = text.parse::<ExtractionMode>().map_err(|err| {
                    error_response_with_code(StatusCode::BAD_REQUEST, Some("INVALID_MODE"), err)
                })?;
                request.mode = Some(mode);
            }
            _ if field.file_name().is_some() || field_name == "file" => {
                let index = request.uploads.len();
                let upload = save_upload(field, temp_dir, index).await?;
                request.uploads.push(upload);
            }
            _ => {
                debug!("忽略未知表单字段: {field_name}");
            }
        }
    }
    if request.uploads.is_empty() {
        return Err(error_response_with_code(
            StatusCode::BAD_REQUEST,
            Some("FILE_NOT_FOUND"),
            "未找到上传的表格文件",
        ));
    }
    Ok(request)
}

async fn run_conversions(state: &AppState, request: ConvertRequest) -> Result<Value, Response> {
    let template = compose_template(state.base_template.as_deref(), request.template.as_ref())
        .map_err(|err| intake_error_response(&err))?;
    let template = Arc::new(template);
    let options = ConvertOptions::from_config(&state.config.conversion, request.mode);
    let mut outcomes = Vec::with_capacity(request.uploads.len());
    for upload in request.uploads {
        let result = convert_path(upload.path, template.clone(), options.clone()).await;
        outcomes.push(FileOutcome::new(upload.name, result));
    }
    Ok(batch_payload(&outcomes))
}

async fn save_upload(
    mut field: Field<'_>,
    temp_dir: &Path,
    index: usize,
) -> Result<SavedUpload, Response> {
    // 只保留文件名部分，落盘名使用序号，避免同名覆盖与路径穿越。
    let name = field
        .file_name()
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("upload-{index}"));
    let extension = Path::new(&name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();
    let path = temp_dir.join(format!("{index:03}{extension}"));
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|err| error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|err| error_response(StatusCode::BAD_REQUEST, err.to_string()))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|err| error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    }
    file.flush()
        .await
        .map_err(|err| error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    Ok(SavedUpload { name, path })
}

async fn create_temp_dir() -> Result<PathBuf, std::io::Error> {
    let mut root = std::env::temp_dir();
    root.push(UPLOAD_DIR_NAME);
    root.push(Uuid::new_v4().simple().to_string());
    tokio::fs::create_dir_all(&root).await?;
    Ok(root)
}

async fn modes(State(state): State<Arc<AppState>>) -> Json<Value> {
    let modes = ExtractionMode::ALL
        .iter()
        .map(|mode| json!({ "value": mode.as_str(), "description": mode.description() }))
        .collect::<Vec<_>>();
    Json(json!({
        "default": state.config.conversion.default_mode.as_str(),
        "modes": modes,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
