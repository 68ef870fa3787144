use axum::extract::Multipart;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use std::collections::HashMap;

use crate::inpaint::InpaintRect;

use super::error::ServerError;

const FILE_FIELD: &str = "file";

/// A parsed multipart form: the uploaded image plus any text fields.
#[derive(Debug, Default)]
pub(crate) struct Upload {
    file: Option<Vec<u8>>,
    fields: HashMap<String, String>,
}

pub(crate) async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, ServerError> {
    let mut multipart = multipart
        .map_err(|rejection| ServerError::new(rejection.status(), rejection.body_text()))?;
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == FILE_FIELD {
            let bytes = field.bytes().await.map_err(multipart_error)?;
            upload.file = Some(bytes.to_vec());
        } else {
            let text = field.text().await.map_err(multipart_error)?;
            upload.fields.insert(name, text);
        }
    }
    Ok(upload)
}

fn multipart_error(err: MultipartError) -> ServerError {
    ServerError::new(
        err.status(),
        format!("invalid multipart body: {}", err.body_text()),
    )
}

impl Upload {
    pub(crate) fn take_file(&mut self) -> Result<Vec<u8>, ServerError> {
        match self.file.take() {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            Some(_) => Err(ServerError::bad_request("file is empty")),
            None => Err(ServerError::bad_request("file is required")),
        }
    }

    pub(crate) fn int_field(&self, name: &str) -> Result<i32, ServerError> {
        let raw = self
            .fields
            .get(name)
            .ok_or_else(|| ServerError::bad_request(format!("{} is required", name)))?;
        raw.trim()
            .parse::<i32>()
            .map_err(|_| ServerError::bad_request(format!("{} must be an integer", name)))
    }

    pub(crate) fn rect(&self) -> Result<InpaintRect, ServerError> {
        Ok(InpaintRect {
            x: self.int_field("x")?,
            y: self.int_field("y")?,
            width: self.int_field("w")?,
            height: self.int_field("h")?,
        })
    }
}
