use axum::{
    Json,
    extract::{Multipart, State, multipart::Field},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    AppState,
    config::UploadConfig,
    error::{AppError, Result},
    models::{ApiResponse, UploadedFile},
    utils::extractors::{AppMultipart, AppPath},
};

const MAX_NAME_LEN: usize = 255;

const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

struct PendingFile {
    original_name: String,
    extension: &'static str,
    data: Vec<u8>,
}

/// Picks the stored extension from the declared content type, falling back
/// to a guess from the client file name.
pub fn image_extension(content_type: Option<&str>, file_name: &str) -> Option<&'static str> {
    let guessed;
    let content_type = match content_type {
        Some(ct) if ct != "application/octet-stream" => ct,
        _ => {
            guessed = mime_guess::from_path(file_name).first()?.essence_str().to_string();
            guessed.as_str()
        }
    };

    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(content_type))
        .map(|(_, ext)| *ext)
}

/// Rejects names that could escape the upload directory.
pub fn validate_filename(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.len() > MAX_NAME_LEN
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");

    if invalid {
        return Err(AppError::ValidationError("Invalid file name".to_string()));
    }
    Ok(())
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid upload: {}", e.body_text())))
}

async fn read_image(field: Field<'_>, config: &UploadConfig) -> Result<PendingFile> {
    let original_name = field.file_name().unwrap_or_default().to_string();

    let extension = image_extension(field.content_type(), &original_name)
        .ok_or_else(|| AppError::ValidationError("Only image files are allowed".to_string()))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid upload: {}", e.body_text())))?;

    if data.is_empty() {
        return Err(AppError::ValidationError("Uploaded file is empty".to_string()));
    }

    if data.len() > config.max_file_size {
        return Err(AppError::ValidationError(format!(
            "File exceeds the {} byte limit",
            config.max_file_size
        )));
    }

    Ok(PendingFile {
        original_name,
        extension,
        data: data.to_vec(),
    })
}

fn stored_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

async fn store(config: &UploadConfig, filename: String, file: PendingFile) -> Result<UploadedFile> {
    tokio::fs::write(config.dir.join(&filename), &file.data).await?;

    Ok(UploadedFile {
        url: format!("{}/uploads/{}", config.public_base_url, filename),
        size: file.data.len(),
        original_name: file.original_name,
        filename,
    })
}

/// Writes every file or none of them.
async fn store_all(
    config: &UploadConfig,
    files: Vec<(String, PendingFile)>,
) -> Result<Vec<UploadedFile>> {
    let mut stored = Vec::with_capacity(files.len());

    for (filename, file) in files {
        match store(config, filename, file).await {
            Ok(saved) => stored.push(saved),
            Err(e) => {
                for saved in &stored {
                    if let Err(err) = tokio::fs::remove_file(config.dir.join(&saved.filename)).await
                    {
                        tracing::warn!("Failed to remove partial upload {}: {}", saved.filename, err);
                    }
                }
                return Err(e);
            }
        }
    }

    Ok(stored)
}

pub async fn upload_image(
    State(state): State<AppState>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<ApiResponse<UploadedFile>>> {
    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() != Some("image") {
            continue;
        }

        let file = read_image(field, &state.upload).await?;
        let stored = store(&state.upload, stored_name(file.extension), file).await?;

        return Ok(Json(ApiResponse::with_message(
            "Image uploaded successfully",
            stored,
        )));
    }

    Err(AppError::ValidationError("No file uploaded".to_string()))
}

pub async fn upload_images(
    State(state): State<AppState>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<ApiResponse<Vec<UploadedFile>>>> {
    let mut pending = Vec::new();

    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() != Some("images") {
            continue;
        }

        if pending.len() == state.upload.max_files {
            return Err(AppError::ValidationError(format!(
                "At most {} files can be uploaded at once",
                state.upload.max_files
            )));
        }

        pending.push(read_image(field, &state.upload).await?);
    }

    if pending.is_empty() {
        return Err(AppError::ValidationError("No file uploaded".to_string()));
    }

    let named = pending
        .into_iter()
        .map(|file| (stored_name(file.extension), file))
        .collect();
    let stored = store_all(&state.upload, named).await?;

    let message = format!("{} image(s) uploaded successfully", stored.len());

    Ok(Json(ApiResponse {
        success: true,
        message: Some(message),
        count: Some(stored.len()),
        data: Some(stored),
    }))
}

pub async fn get_file(
    State(state): State<AppState>,
    AppPath(filename): AppPath<String>,
) -> Result<Response> {
    validate_filename(&filename)?;

    let path = state.upload.dir.join(&filename);
    let data = tokio::fs::read(&path).await?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], data).into_response())
}

pub async fn delete_file(
    State(state): State<AppState>,
    AppPath(filename): AppPath<String>,
) -> Result<Json<ApiResponse<()>>> {
    validate_filename(&filename)?;

    tokio::fs::remove_file(state.upload.dir.join(&filename)).await?;

    tracing::info!("Deleted upload {}", filename);

    Ok(Json(ApiResponse::message("File deleted successfully")))
}
