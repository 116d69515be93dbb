use std::env;

use axum::extract::Multipart;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::{Bytes, BytesMut};
use log::warn;

use super::model::CreateParams;

const MB: usize = 1024 * 1024;
const FILE_FIELD: &str = "file";
const JSON_FIELD: &str = "json";

/// Limits applied to message uploads.
#[derive(Clone, Debug)]
pub struct Config {
    max_file_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size: 6 * MB,
        }
    }
}

impl Config {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn env() -> Option<Self> {
        let raw = env::var("UPLOAD_MAX_FILE_SIZE").ok()?;
        match raw.parse() {
            Ok(max_file_size) => Some(Self { max_file_size }),
            Err(e) => {
                warn!("Ignoring UPLOAD_MAX_FILE_SIZE={raw}: {e}");
                None
            }
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Request body limit: the file plus room for the json field and multipart framing.
    pub fn body_limit(&self) -> usize {
        self.max_file_size + MB
    }
}

/// Parts of a message creation form.
#[derive(Debug, Default)]
pub struct Form {
    pub file: Option<Bytes>,
    pub json: Option<String>,
}

impl Form {
    pub fn params(&self) -> super::Result<CreateParams> {
        let json = self
            .json
            .as_deref()
            .ok_or(super::Error::MissingField(JSON_FIELD))?;

        let params = serde_json::from_str(json)?;
        Ok(params)
    }
}

/// Buffers the single `file` part in memory and collects the `json` part.
pub async fn read_form(mut multipart: Multipart, config: &Config) -> super::Result<Form> {
    let mut form = Form::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();

        if name == FILE_FIELD && form.file.is_none() {
            let mut buf = BytesMut::new();
            while let Some(chunk) = field.chunk().await? {
                if buf.len() + chunk.len() > config.max_file_size {
                    return Err(super::Error::FileTooLarge(config.max_file_size));
                }
                buf.extend_from_slice(&chunk);
            }
            form.file = Some(buf.freeze());
        } else if name == JSON_FIELD && field.file_name().is_none() {
            form.json = Some(field.text().await?);
        } else if field.file_name().is_some() || name == FILE_FIELD {
            return Err(super::Error::UnexpectedField(name));
        }
    }

    Ok(form)
}

/// Encodes uploaded bytes as a data URI. The payload is always labelled JPEG.
pub fn data_uri(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
}
