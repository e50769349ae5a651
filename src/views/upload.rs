use actix_web::http::StatusCode;
use tera::{Context, Tera};

use crate::errors::AppError;
use crate::models::upload::UploadResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Success(String),
    Failure(String),
}

impl UploadStatus {
    /// Anything but a plain 200 is a failure; the text comes from the body.
    pub fn from_reply(status: StatusCode, body: &UploadResponse) -> Self {
        if status == StatusCode::OK {
            let message = body.message.as_deref().unwrap_or("Upload complete");
            return UploadStatus::Success(message.to_string());
        }

        let text = body
            .error
            .as_deref()
            .or(body.message.as_deref())
            .unwrap_or("Upload failed");
        let failed = body.failed_files();
        if failed.is_empty() {
            UploadStatus::Failure(text.to_string())
        } else {
            UploadStatus::Failure(format!("{}: {}", text, failed.join(", ")))
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        UploadStatus::Failure(err.message().to_string())
    }

    pub fn class(&self) -> &'static str {
        match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Success(_) => "success",
            UploadStatus::Failure(_) => "failure",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            UploadStatus::Idle => None,
            UploadStatus::Success(text) | UploadStatus::Failure(text) => Some(text),
        }
    }
}

pub fn render_upload(tera: &Tera, status: &UploadStatus) -> Result<String, tera::Error> {
    let mut context = Context::new();
    context.insert("status_class", status.class());
    context.insert("status_text", &status.text());
    tera.render("upload.html", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::upload::FileOutcome;
    use crate::views::templates;

    #[test]
    fn ok_reply_is_success_with_message() {
        let body = UploadResponse {
            message: Some("Files uploaded successfully".into()),
            urls: Some(vec!["/uploads/a.png".into()]),
            ..Default::default()
        };

        assert_eq!(
            UploadStatus::from_reply(StatusCode::OK, &body),
            UploadStatus::Success("Files uploaded successfully".into())
        );
    }

    #[test]
    fn partial_reply_lists_failed_files() {
        let body = UploadResponse {
            message: Some("1 of 2 files failed to upload".into()),
            urls: Some(vec!["/uploads/a.png".into()]),
            results: Some(vec![
                FileOutcome::Stored {
                    file_name: "cat.png".into(),
                    url: "/uploads/a.png".into(),
                },
                FileOutcome::Failed {
                    file_name: "dog.jpg".into(),
                    error: "storage write failed".into(),
                },
            ]),
            ..Default::default()
        };

        assert_eq!(
            UploadStatus::from_reply(StatusCode::MULTI_STATUS, &body),
            UploadStatus::Failure("1 of 2 files failed to upload: dog.jpg".into())
        );
    }

    #[test]
    fn error_reply_uses_error_text() {
        let body = UploadResponse {
            error: Some("Upload failed".into()),
            ..Default::default()
        };

        assert_eq!(
            UploadStatus::from_reply(StatusCode::INTERNAL_SERVER_ERROR, &body),
            UploadStatus::Failure("Upload failed".into())
        );
        assert_eq!(
            UploadStatus::from_error(&AppError::BadRequest("No files uploaded".into())),
            UploadStatus::Failure("No files uploaded".into())
        );
    }

    #[test]
    fn renders_status_class_and_form() {
        let tera = templates().unwrap();

        let idle = render_upload(&tera, &UploadStatus::Idle).unwrap();
        let failed = render_upload(&tera, &UploadStatus::Failure("No files uploaded".into())).unwrap();

        assert!(idle.contains(r#"class="status idle""#));
        assert!(idle.contains(r#"name="images""#));
        assert!(idle.contains(r#"enctype="multipart/form-data""#));
        assert!(failed.contains(r#"class="status failure""#));
        assert!(failed.contains("No files uploaded"));
    }
}
