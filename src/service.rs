//! 졸업생 등록/수정/삭제와 사진 관리
//!
//! 모든 변경은 활동 로그를 남긴다. 로그 기록 실패는 경고만 하고 원래 작업은 성공으로 본다.

use crate::error::Result;
use crate::store::{ActivitySink, ActivityType, BlobStore, NewActivity, RecordStore};
use grad_tracker_common::{validate_input, validate_patch, Graduate, GraduateInput, GraduatePatch};

pub struct GraduateService<'a> {
    records: &'a dyn RecordStore,
    logs: &'a dyn ActivitySink,
    photos: &'a dyn BlobStore,
}

impl<'a> GraduateService<'a> {
    pub fn new(records: &'a dyn RecordStore, logs: &'a dyn ActivitySink, photos: &'a dyn BlobStore) -> Self {
        Self { records, logs, photos }
    }

    pub fn records(&self) -> &'a dyn RecordStore {
        self.records
    }

    pub fn find(&self, id: &str) -> Result<Graduate> {
        Ok(self.records.find_by_id(id)?)
    }

    pub fn create(&self, mut input: GraduateInput, actor: Option<&str>) -> Result<Graduate> {
        input.email = normalize_email(input.email);
        validate_input(&input)?;

        let saved = self.records.create(input)?;
        self.log(
            ActivityType::Register,
            actor,
            Some(&saved.id),
            format!("{} 졸업생을 등록했습니다", saved.name),
        );
        Ok(saved)
    }

    /// 패치에 있는 필드만 반영 (병합)
    pub fn update(&self, id: &str, mut patch: GraduatePatch, actor: Option<&str>) -> Result<Graduate> {
        patch.email = normalize_email(patch.email);
        validate_patch(&patch)?;

        let saved = self.records.update(id, patch)?;
        self.log(
            ActivityType::Update,
            actor,
            Some(id),
            format!("{} 졸업생 정보를 수정했습니다", saved.name),
        );
        Ok(saved)
    }

    /// 삭제 로그를 먼저 남긴 뒤 삭제한다 (삭제 후에는 로그의 graduate_id가 NULL이 된다)
    pub fn delete(&self, id: &str, actor: Option<&str>) -> Result<()> {
        let graduate = self.records.find_by_id(id)?;
        self.log(
            ActivityType::Delete,
            actor,
            Some(id),
            format!("{} 졸업생을 삭제했습니다", graduate.name),
        );

        if let Some(url) = graduate.photo_url.as_deref() {
            self.discard_photo(url);
        }
        self.records.delete(id)?;
        Ok(())
    }

    /// 이전 사진을 지우고 새 사진을 저장한다
    pub fn set_photo(&self, id: &str, bytes: &[u8], filename: &str, actor: Option<&str>) -> Result<Graduate> {
        let current = self.records.find_by_id(id)?;
        self.replace_photo(&current, bytes, filename, actor)
    }

    /// 이미 조회한 레코드에 사진을 연결한다
    pub fn replace_photo(
        &self,
        current: &Graduate,
        bytes: &[u8],
        filename: &str,
        actor: Option<&str>,
    ) -> Result<Graduate> {
        self.photos.accepts(bytes, filename)?;
        if let Some(old) = current.photo_url.as_deref() {
            self.photos.delete(old)?;
        }

        let url = match self.photos.put(bytes, filename) {
            Ok(url) => url,
            Err(e) => {
                // 이전 파일은 이미 지워졌으므로 참조도 비운다
                if current.photo_url.is_some() {
                    self.records.set_photo_url(&current.id, None)?;
                }
                return Err(e);
            }
        };

        let saved = match self.records.set_photo_url(&current.id, Some(&url)) {
            Ok(saved) => saved,
            Err(e) => {
                self.discard_photo(&url);
                return Err(e.into());
            }
        };
        self.log(
            ActivityType::Update,
            actor,
            Some(&current.id),
            format!("{} 졸업생의 사진을 업로드했습니다", saved.name),
        );
        Ok(saved)
    }

    pub fn clear_photo(&self, id: &str, actor: Option<&str>) -> Result<Graduate> {
        let current = self.records.find_by_id(id)?;
        if let Some(url) = current.photo_url.as_deref() {
            self.discard_photo(url);
        }

        let saved = self.records.set_photo_url(id, None)?;
        self.log(
            ActivityType::Update,
            actor,
            Some(id),
            format!("{} 졸업생의 사진을 삭제했습니다", saved.name),
        );
        Ok(saved)
    }

    /// 활동 로그 기록 (실패는 무시)
    pub fn log(&self, kind: ActivityType, actor: Option<&str>, graduate_id: Option<&str>, message: String) {
        let entry = NewActivity {
            kind,
            actor_id: actor.map(str::to_string),
            graduate_id: graduate_id.map(str::to_string),
            message,
        };
        if let Err(e) = self.logs.append(&entry) {
            tracing::warn!(error = %e, kind = %entry.kind, "활동 로그 기록 실패");
        }
    }

    fn discard_photo(&self, url: &str) {
        if let Err(e) = self.photos.delete(url) {
            tracing::warn!(error = %e, url, "사진 파일 삭제 실패");
        }
    }
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}
