use crate::error::{Result, TrackerError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// 폴더의 사진 파일 목록 (파일명 순). `extensions`는 설정의 허용 확장자.
pub fn scan_folder(folder: &Path, recursive: bool, extensions: &[String]) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(TrackerError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        // 숨김 파일 제외
        if file_name.starts_with('.') {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_image_extension(&ext.to_string_lossy(), extensions) {
                images.push(ImageInfo {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

fn is_image_extension(ext: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    fn defaults() -> Vec<String> {
        Config::default().allowed_photo_extensions
    }

    #[test]
    fn test_is_image_extension() {
        let exts = defaults();
        assert!(is_image_extension("jpg", &exts));
        assert!(is_image_extension("JPG", &exts));
        assert!(is_image_extension("jpeg", &exts));
        assert!(is_image_extension("png", &exts));
        assert!(!is_image_extension("txt", &exts));
        assert!(!is_image_extension("gif", &exts));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"), false, &defaults());
        assert!(matches!(result, Err(TrackerError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_with_images() {
        let dir = tempdir().unwrap();

        File::create(dir.path().join("010-2222-3333.jpg")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("010-1111-2222.PNG")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("명단.txt")).unwrap().write_all(b"text").unwrap();
        File::create(dir.path().join(".DS_Store.png")).unwrap();

        let result = scan_folder(dir.path(), false, &defaults()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].file_name, "010-1111-2222.PNG");
        assert_eq!(result[1].file_name, "010-2222-3333.jpg");
    }

    #[test]
    fn test_recursive_scan() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("2023");
        fs::create_dir_all(&sub).unwrap();
        File::create(dir.path().join("a.jpg")).unwrap();
        File::create(sub.join("b.jpg")).unwrap();

        assert_eq!(scan_folder(dir.path(), false, &defaults()).unwrap().len(), 1);
        assert_eq!(scan_folder(dir.path(), true, &defaults()).unwrap().len(), 2);
    }

    #[test]
    fn test_scan_uses_configured_extensions() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.jpg")).unwrap();
        File::create(dir.path().join("b.png")).unwrap();

        let only_png = vec!["PNG".to_string()];
        let result = scan_folder(dir.path(), false, &only_png).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].file_name, "b.png");
    }
}
