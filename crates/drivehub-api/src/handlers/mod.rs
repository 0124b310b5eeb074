//! Route handlers organized by domain.

pub mod auth;
pub mod file;
pub mod folder;
pub mod health;
pub mod search;
pub mod share;
pub mod storage;
pub mod user;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;

use drivehub_core::error::AppError;
use drivehub_entity::file::File;

use crate::error::ApiResult;

/// Build a response carrying a file's bytes.
pub(crate) fn file_response(file: &File, data: Bytes, inline: bool) -> ApiResult<Response> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type.as_str())
        .header(header::CONTENT_DISPOSITION, content_disposition(&file.name, inline))
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;
    Ok(response)
}

/// `Content-Disposition` value with an ASCII fallback name and the exact
/// name in RFC 5987 encoding.
fn content_disposition(name: &str, inline: bool) -> String {
    let disposition = if inline { "inline" } else { "attachment" };
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("{disposition}; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
