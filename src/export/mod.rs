pub mod excel;

use std::path::{Path, PathBuf};

pub const TEMPLATE_FILE_NAME: &str = "graduates_template.xlsx";
pub const ROSTER_FILE_NAME: &str = "graduates.xlsx";

/// 출력 경로가 폴더(또는 확장자 없음)이면 기본 파일명을 붙인다
pub fn output_path(output: &Path, default_name: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(default_name)
    } else {
        output.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_output_path() {
        let dir = tempdir().unwrap();
        assert_eq!(output_path(dir.path(), TEMPLATE_FILE_NAME), dir.path().join(TEMPLATE_FILE_NAME));
        assert_eq!(output_path(Path::new("out/명단.xlsx"), ROSTER_FILE_NAME), PathBuf::from("out/명단.xlsx"));
        assert_eq!(output_path(Path::new("out"), ROSTER_FILE_NAME), PathBuf::from("out/graduates.xlsx"));
    }
}
