use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::web::BytesMut;
use futures_util::TryStreamExt;

use crate::errors::AppError;
use crate::models::image::ImageUpload;
use crate::models::upload::{UploadField, UploadForm};
use crate::storage::IMAGE_EXTENSIONS;

/// Reads every `image`/`images` part into memory, validating each one.
///
/// Other fields are drained and ignored. Parts with neither a filename nor a
/// body (an untouched file input) are skipped. The returned form may hold no
/// files; see [`UploadForm::require_files`].
pub async fn read_upload_form(mut payload: Multipart, max_bytes: usize) -> Result<UploadForm, AppError> {
    let mut field_kind: Option<UploadField> = None;
    let mut files = Vec::new();
    let mut parts_seen = 0usize;

    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // An empty `FormData` is just the closing boundary.
            Err(MultipartError::Incomplete) if parts_seen == 0 => break,
            Err(err) => return Err(malformed(err)),
        };
        parts_seen += 1;

        let Some(kind) = field.name().and_then(UploadField::from_name) else {
            while field.try_next().await.map_err(malformed)?.is_some() {}
            continue;
        };
        // Any `images` part switches the whole request to the batch shape.
        if field_kind != Some(UploadField::Multiple) {
            field_kind = Some(kind);
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned)
            .unwrap_or_default();
        let content_type = field.content_type().map(|mime| mime.essence_str().to_owned());
        let bytes = read_field(&mut field, &file_name, max_bytes).await?;

        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }
        let display_name = if file_name.is_empty() {
            format!("file #{}", files.len() + 1)
        } else {
            file_name
        };

        files.push(validate_image(display_name, content_type, bytes)?);
    }

    Ok(UploadForm {
        field: field_kind.unwrap_or(UploadField::Multiple),
        files,
    })
}

async fn read_field(field: &mut Field, file_name: &str, max_bytes: usize) -> Result<BytesMut, AppError> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if buffer.len() + chunk.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "{} exceeds the {} byte limit",
                file_name, max_bytes
            )));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

fn validate_image(file_name: String, content_type: Option<String>, bytes: BytesMut) -> Result<ImageUpload, AppError> {
    let content_type = content_type
        .ok_or_else(|| AppError::BadRequest(format!("{} has no content type", file_name)))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest(format!("{} is empty", file_name)));
    }
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(format!("{} is not an image", file_name)));
    }

    let extension = infer::get(&bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.extension())
        .filter(|ext| IMAGE_EXTENSIONS.contains(ext))
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "{} must be a JPEG, PNG, GIF or WebP image",
                file_name
            ))
        })?;

    Ok(ImageUpload {
        file_name,
        content_type,
        extension: extension.to_string(),
        bytes: bytes.freeze(),
    })
}

fn malformed(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed multipart body: {}", err))
}
