use super::BlobStore;
use crate::config::Config;
use crate::error::{Result, TrackerError};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// `<upload_dir>/photos`에 UUID 파일명으로 사진을 저장한다
#[derive(Debug, Clone)]
pub struct PhotoDir {
    root: PathBuf,
    url_prefix: String,
    max_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl PhotoDir {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let defaults = Config::default();
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            max_bytes: defaults.max_photo_bytes,
            allowed_extensions: defaults.allowed_photo_extensions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.photo_dir(),
            url_prefix: config.photo_url_prefix.trim_end_matches('/').to_string(),
            max_bytes: config.max_photo_bytes,
            allowed_extensions: config.allowed_photo_extensions.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// URL에 대응하는 파일 경로. 이 저장소의 URL이 아니면 None.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(&self.url_prefix)?.strip_prefix('/')?;
        if name.is_empty() || name.contains(|c| c == '/' || c == '\\') || name.starts_with('.') {
            return None;
        }
        Some(self.root.join(name))
    }

    /// 확장자・크기・내용 확인 후 저장할 확장자(소문자)를 돌려준다
    fn check(&self, bytes: &[u8], suggested_name: &str) -> Result<String> {
        let ext = Path::new(suggested_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !self.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
            return Err(TrackerError::Photo(format!("허용되지 않은 파일 형식: {}", suggested_name)));
        }
        if bytes.len() as u64 > self.max_bytes {
            return Err(TrackerError::Photo(format!(
                "파일이 너무 큽니다: {} ({} bytes, 최대 {} bytes)",
                suggested_name,
                bytes.len(),
                self.max_bytes
            )));
        }
        match image::guess_format(bytes) {
            Ok(ImageFormat::Jpeg) | Ok(ImageFormat::Png) => Ok(ext),
            _ => Err(TrackerError::Photo(format!("이미지 파일이 아닙니다: {}", suggested_name))),
        }
    }
}

impl BlobStore for PhotoDir {
    fn accepts(&self, bytes: &[u8], suggested_name: &str) -> Result<()> {
        self.check(bytes, suggested_name).map(|_| ())
    }

    fn put(&self, bytes: &[u8], suggested_name: &str) -> Result<String> {
        let ext = self.check(bytes, suggested_name)?;
        std::fs::create_dir_all(&self.root)?;

        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        std::fs::write(self.root.join(&file_name), bytes)?;
        tracing::debug!(file = %file_name, size = bytes.len(), "사진 저장");

        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    fn delete(&self, url: &str) -> Result<()> {
        let Some(path) = self.path_for_url(url) else {
            tracing::warn!(url, "저장소 밖의 사진 URL은 삭제하지 않습니다");
            return Ok(());
        };
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
