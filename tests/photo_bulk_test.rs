//! 사진 일괄 매칭 통합 테스트

use grad_tracker::config::Config;
use grad_tracker::matcher::MatchKeyKind;
use grad_tracker::photos::{bulk_match_photos, PhotoBatchOptions, PhotoFile};
use grad_tracker::service::GraduateService;
use grad_tracker::store::{Database, PhotoDir, RecordStore};
use grad_tracker_common::{Department, Gender, GraduateInput};
use tempfile::tempdir;

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

fn input(name: &str, phone: &str, email: Option<&str>) -> GraduateInput {
    GraduateInput {
        graduation_year: 2023,
        name: name.into(),
        gender: Gender::Male,
        birth_date: "2004-03-05".into(),
        phone: phone.into(),
        address: String::new(),
        department: Department::MedicalIt,
        grade: None,
        attendance: None,
        certificates: vec![],
        email: email.map(String::from),
        employment_history: vec![],
        education_history: vec![],
        desired_field: vec![],
        current_status: vec![],
        memo: None,
    }
}

fn options(match_key: MatchKeyKind, overwrite: bool) -> PhotoBatchOptions {
    PhotoBatchOptions {
        match_key,
        overwrite,
        actor: Some("teacher-1".into()),
    }
}

/// 전화번호 파일명 매칭, 결과는 입력 순서
#[test]
fn test_match_by_phone_preserves_order() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let photos = PhotoDir::new(dir.path(), "/uploads/photos");
    let service = GraduateService::new(&db, &db, &photos);

    let hong = service.create(input("홍길동", "010-1234-5678", None), None).unwrap();

    let files = vec![
        PhotoFile::from_bytes("01099998888.jpg", JPEG_HEADER.to_vec()),
        PhotoFile::from_bytes("010-1234-5678.png", PNG_HEADER.to_vec()),
    ];
    let report = bulk_match_photos(&service, &files, &options(MatchKeyKind::Phone, true), |_| {});

    assert_eq!(report.total, 2);
    assert_eq!(report.outcomes[0].filename, "01099998888.jpg");
    assert!(!report.outcomes[0].ok);
    assert_eq!(report.outcomes[0].reason.as_deref(), Some("대상을 찾을 수 없음"));

    assert!(report.outcomes[1].ok);
    assert_eq!(report.outcomes[1].matched_id.as_deref(), Some(hong.id.as_str()));

    let stored = db.find_by_id(&hong.id).unwrap();
    let url = stored.photo_url.unwrap();
    assert!(url.starts_with("/uploads/photos/"));
    assert!(url.ends_with(".png"));
    assert!(photos.path_for_url(&url).unwrap().exists());
}

/// overwrite=false면 기존 사진을 건드리지 않는다
#[test]
fn test_existing_photo_kept_without_overwrite() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let photos = PhotoDir::new(dir.path(), "/uploads/photos");
    let service = GraduateService::new(&db, &db, &photos);

    let hong = service.create(input("홍길동", "010-1234-5678", None), None).unwrap();
    let before = service.set_photo(&hong.id, PNG_HEADER, "a.png", None).unwrap();

    let files = vec![PhotoFile::from_bytes("01012345678.jpg", JPEG_HEADER.to_vec())];
    let report = bulk_match_photos(&service, &files, &options(MatchKeyKind::Phone, false), |_| {});

    let outcome = &report.outcomes[0];
    assert!(!outcome.ok);
    assert_eq!(outcome.reason.as_deref(), Some("기존 사진 존재"));
    assert_eq!(outcome.matched_id.as_deref(), Some(hong.id.as_str()));
    assert_eq!(db.find_by_id(&hong.id).unwrap().photo_url, before.photo_url);
}

/// overwrite=true면 이전 파일을 지우고 교체
#[test]
fn test_overwrite_replaces_previous_file() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let photos = PhotoDir::new(dir.path(), "/uploads/photos");
    let service = GraduateService::new(&db, &db, &photos);

    let hong = service.create(input("홍길동", "010-1234-5678", None), None).unwrap();
    let before = service.set_photo(&hong.id, PNG_HEADER, "a.png", None).unwrap();
    let old_path = photos.path_for_url(before.photo_url.as_deref().unwrap()).unwrap();

    let files = vec![PhotoFile::from_bytes("01012345678.jpg", JPEG_HEADER.to_vec())];
    let report = bulk_match_photos(&service, &files, &options(MatchKeyKind::Phone, true), |_| {});

    assert!(report.outcomes[0].ok);
    assert!(!old_path.exists());
    let after = db.find_by_id(&hong.id).unwrap().photo_url.unwrap();
    assert!(after.ends_with(".jpg"));
}

/// 이름+생년월일 파일명
#[test]
fn test_match_by_name_birth() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let photos = PhotoDir::new(dir.path(), "/uploads/photos");
    let service = GraduateService::new(&db, &db, &photos);

    let hong = service.create(input("홍길동", "010-1234-5678", None), None).unwrap();

    let files = vec![
        PhotoFile::from_bytes("홍길동_20040305.jpg", JPEG_HEADER.to_vec()),
        PhotoFile::from_bytes("홍길동.jpg", JPEG_HEADER.to_vec()),
        PhotoFile::from_bytes("홍길동-2001-01-01.jpg", JPEG_HEADER.to_vec()),
    ];
    let report = bulk_match_photos(&service, &files, &options(MatchKeyKind::NameBirthDate, true), |_| {});

    assert!(report.outcomes[0].ok);
    assert_eq!(report.outcomes[0].matched_id.as_deref(), Some(hong.id.as_str()));
    assert_eq!(report.outcomes[1].reason.as_deref(), Some("이름+생년월일 형식이 아닙니다"));
    assert_eq!(report.outcomes[2].reason.as_deref(), Some("대상을 찾을 수 없음"));
    assert_eq!((report.succeeded, report.failed), (1, 2));
}

/// 이메일 파일명은 대소문자를 구분하지 않는다
#[test]
fn test_match_by_email_case_insensitive() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let photos = PhotoDir::new(dir.path(), "/uploads/photos");
    let service = GraduateService::new(&db, &db, &photos);

    let hong = service
        .create(input("홍길동", "010-1234-5678", Some("hong@example.com")), None)
        .unwrap();

    let files = vec![PhotoFile::from_bytes("Hong@Example.com.png", PNG_HEADER.to_vec())];
    let report = bulk_match_photos(&service, &files, &options(MatchKeyKind::Email, true), |_| {});
    assert_eq!(report.outcomes[0].matched_id.as_deref(), Some(hong.id.as_str()));
    assert!(report.outcomes[0].ok);
}

/// 허용되지 않은 확장자는 기존 사진을 지우지 않고 실패
#[test]
fn test_rejected_file_keeps_existing_photo() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let photos = PhotoDir::new(dir.path(), "/uploads/photos");
    let service = GraduateService::new(&db, &db, &photos);

    let hong = service.create(input("홍길동", "010-1234-5678", None), None).unwrap();
    let before = service.set_photo(&hong.id, PNG_HEADER, "a.png", None).unwrap();
    let old_path = photos.path_for_url(before.photo_url.as_deref().unwrap()).unwrap();

    let files = vec![PhotoFile::from_bytes("01012345678.gif", b"GIF89a".to_vec())];
    let report = bulk_match_photos(&service, &files, &options(MatchKeyKind::Phone, true), |_| {});

    let outcome = &report.outcomes[0];
    assert!(!outcome.ok);
    assert!(outcome.reason.as_deref().unwrap().contains("허용되지 않은 파일 형식"));
    assert!(old_path.exists());
    assert_eq!(db.find_by_id(&hong.id).unwrap().photo_url, before.photo_url);
}

/// 전화번호가 같은 졸업생이 둘이면 연결하지 않는다
#[test]
fn test_ambiguous_phone() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let photos = PhotoDir::new(dir.path(), "/uploads/photos");
    let service = GraduateService::new(&db, &db, &photos);

    service.create(input("홍길동", "010-1234-5678", None), None).unwrap();
    service.create(input("홍길순", "010-1234-5678", None), None).unwrap();

    let files = vec![PhotoFile::from_bytes("01012345678.jpg", JPEG_HEADER.to_vec())];
    let report = bulk_match_photos(&service, &files, &options(MatchKeyKind::Phone, true), |_| {});
    assert_eq!(report.outcomes[0].reason.as_deref(), Some("여러 건이 일치함"));
}

/// 디스크의 파일을 경로로 넘기는 경우
#[test]
fn test_files_read_from_disk() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let photos = PhotoDir::new(dir.path().join("store"), "/uploads/photos");
    let service = GraduateService::new(&db, &db, &photos);

    service.create(input("홍길동", "010-1234-5678", None), None).unwrap();

    let source = dir.path().join("in");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(source.join("010-1234-5678.jpg"), JPEG_HEADER).unwrap();

    let extensions = Config::default().allowed_photo_extensions;
    let images = grad_tracker::scanner::scan_folder(&source, false, &extensions).unwrap();
    let files: Vec<PhotoFile> = images.iter().map(|i| PhotoFile::from_path(&i.path)).collect();

    let mut seen = 0;
    let report = bulk_match_photos(&service, &files, &options(MatchKeyKind::Phone, true), |_| seen += 1);
    assert_eq!(seen, 1);
    assert_eq!(report.succeeded, 1);
}
