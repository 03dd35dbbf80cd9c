use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    pub photo_url_prefix: String,
    pub max_photo_bytes: u64,
    pub allowed_photo_extensions: Vec<String>,
    pub default_actor: Option<String>,
    pub admin_emails: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("grad-tracker.db"),
            upload_dir: PathBuf::from("uploads"),
            photo_url_prefix: "/uploads/photos".into(),
            max_photo_bytes: 3 * 1024 * 1024,
            allowed_photo_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            default_actor: None,
            admin_emails: Vec::new(),
        }
    }
}

impl Config {
    /// 설정 파일을 읽고 환경 변수로 덮어쓴다
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrackerError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("grad-tracker").join("config.json"))
    }

    /// 환경 변수 우선. 조회 함수를 받아서 테스트에서 프로세스 환경을 건드리지 않는다.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(db) = non_blank("GRAD_TRACKER_DB") {
            self.database_path = PathBuf::from(db);
        }
        if let Some(dir) = non_blank("GRAD_TRACKER_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(actor) = non_blank("GRAD_TRACKER_ACTOR") {
            self.default_actor = Some(actor);
        }
        self
    }

    /// 사진 저장 폴더 (`<upload_dir>/photos`)
    pub fn photo_dir(&self) -> PathBuf {
        self.upload_dir.join("photos")
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e.eq_ignore_ascii_case(email.trim()))
    }

    pub fn set_upload_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.upload_dir = dir;
        self.save()
    }

    pub fn set_database_path(&mut self, path: PathBuf) -> Result<()> {
        self.database_path = path;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_photo_bytes, 3 * 1024 * 1024);
        assert_eq!(config.photo_dir(), PathBuf::from("uploads").join("photos"));
        assert_eq!(config.allowed_photo_extensions, vec!["jpg", "jpeg", "png"]);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GRAD_TRACKER_DB", "/tmp/grad.db"),
            ("GRAD_TRACKER_UPLOAD_DIR", "  "),
            ("GRAD_TRACKER_ACTOR", "teacher-1"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.database_path, PathBuf::from("/tmp/grad.db"));
        // 공백 값은 무시
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.default_actor.as_deref(), Some("teacher-1"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"upload_dir": "/srv/uploads"}"#).unwrap();
        assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.photo_url_prefix, "/uploads/photos");
    }

    #[test]
    fn test_is_admin() {
        let config = Config {
            admin_emails: vec!["Admin@School.kr".into()],
            ..Config::default()
        };
        assert!(config.is_admin("admin@school.kr "));
        assert!(!config.is_admin("teacher@school.kr"));
    }
}
