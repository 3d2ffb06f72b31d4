//! Upload API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::StorageService;
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
}

/// POST /api/upload - 上传文件 (需登录)
///
/// multipart 字段：`file`。返回内容寻址的文件名与访问 URL。
pub async fn upload(
    State(state): State<ServerState>,
    _current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<UploadResponse>>> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            if filename.is_empty() {
                return Err(AppError::validation("Uploaded file has no filename"));
            }
            let data = field.bytes().await?;
            stored = Some(state.storage.store(&data, &filename)?);
        }
    }

    let filename = stored.ok_or_else(|| AppError::validation("file field is required"))?;
    let url = format!("/api/upload/{}", filename);
    Ok(ok(UploadResponse { filename, url }))
}

/// GET /api/upload/{filename} - 读取文件 (公开)
pub async fn serve(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let data = state.storage.read(&filename)?;
    let content_type = StorageService::content_type(&filename);
    Ok(([(http::header::CONTENT_TYPE, content_type)], data).into_response())
}
