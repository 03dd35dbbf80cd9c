use clap::{Args, Parser, Subcommand};
use crate::importer::ImportMode;
use crate::matcher::MatchKeyKind;
use crate::store::{ActivityType, GraduateFilter};
use grad_tracker_common::{Attendance, Department, DesiredField, Gender, Status};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grad-tracker")]
#[command(about = "졸업생 이력 관리・엑셀 일괄 등록 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 상세 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 활동 로그에 남길 사용자 ID (기본: 설정의 default_actor)
    #[arg(long, global = true)]
    pub actor: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 데이터베이스와 업로드 폴더 준비
    Init,

    /// 엑셀/CSV 일괄 등록
    Import {
        /// 입력 파일 (csv, xlsx, xls, ods)
        #[arg(required = true)]
        file: PathBuf,

        /// 가져오기 방식 (insert/upsert)
        #[arg(short, long, default_value = "insert")]
        mode: ImportMode,

        /// upsert 매칭 기준 (email/phone/name-birth)
        #[arg(long = "match", default_value = "email")]
        match_key: MatchKeyKind,

        /// 행별 결과를 JSON으로 저장
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 폴더의 사진을 파일명으로 매칭해 일괄 등록
    Photos {
        /// 사진 폴더
        #[arg(required = true)]
        folder: PathBuf,

        /// 매칭 기준 (email/phone/name-birth)
        #[arg(long = "match", required = true)]
        match_key: MatchKeyKind,

        /// 기존 사진이 있으면 건너뛰기
        #[arg(long)]
        no_overwrite: bool,

        /// 하위 폴더까지 검색
        #[arg(short = 'r', long)]
        recursive: bool,

        /// 파일별 결과를 JSON으로 저장
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 졸업생 한 명의 사진 등록/삭제
    Photo {
        #[command(subcommand)]
        action: PhotoAction,
    },

    /// JSON 파일로 졸업생 등록
    Add {
        /// GraduateInput JSON (camelCase 키)
        #[arg(required = true)]
        json: PathBuf,
    },

    /// JSON 파일의 필드만 수정 (없는 키는 유지)
    Edit {
        id: String,

        /// GraduatePatch JSON
        #[arg(required = true)]
        json: PathBuf,
    },

    /// 목록 (이름/연락처/이메일 검색)
    List {
        /// 검색어
        #[arg(short, long)]
        q: Option<String>,

        #[arg(long, default_value = "1")]
        page: usize,

        /// 페이지 크기 (최대 100)
        #[arg(long, default_value = "20")]
        page_size: usize,
    },

    /// 상세 검색
    Search {
        #[command(flatten)]
        filter: SearchArgs,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 졸업생 상세
    Show { id: String },

    /// 졸업생 삭제
    Delete { id: String },

    /// 취업/진학 현황
    Stats,

    /// 활동 로그
    Logs {
        /// 유형 (register/update/employment/education/import/delete)
        #[arg(long = "type")]
        kind: Option<ActivityType>,

        /// 졸업생 ID
        #[arg(long)]
        graduate: Option<String>,

        /// 사용자 ID
        #[arg(long = "by")]
        by_actor: Option<String>,

        /// 최대 200
        #[arg(long, default_value = "50")]
        limit: usize,

        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// 일괄 등록용 엑셀 템플릿 생성
    Template {
        /// 출력 파일/폴더 (기본: ./graduates_template.xlsx)
        output: Option<PathBuf>,
    },

    /// 검색 결과를 엑셀로 저장
    Export {
        /// 출력 파일/폴더
        #[arg(required = true)]
        output: PathBuf,

        #[command(flatten)]
        filter: SearchArgs,
    },

    /// 설정 표시/편집
    Config {
        /// 설정 표시
        #[arg(long)]
        show: bool,

        /// 업로드 폴더 설정
        #[arg(long)]
        set_upload_dir: Option<PathBuf>,

        /// 데이터베이스 파일 설정
        #[arg(long)]
        set_db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PhotoAction {
    /// 사진 등록 (기존 사진은 삭제)
    Set { id: String, file: PathBuf },
    /// 사진 삭제
    Clear { id: String },
}

/// 상세 검색 조건
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// 이름 (부분 일치)
    #[arg(long)]
    pub name: Option<String>,
    /// 연락처 (부분 일치)
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// 졸업연도
    #[arg(long)]
    pub year: Option<i32>,
    /// 남/여
    #[arg(long)]
    pub gender: Option<Gender>,
    #[arg(long)]
    pub department: Option<Department>,
    /// 상/중/하
    #[arg(long)]
    pub attendance: Option<Attendance>,
    #[arg(long)]
    pub desired: Option<DesiredField>,
    /// 현재상태 포함 여부
    #[arg(long)]
    pub status: Option<Status>,
    /// 최소 성적
    #[arg(long)]
    pub min_grade: Option<f64>,
    /// 생년월일 (YYYY-MM-DD)
    #[arg(long)]
    pub birth: Option<String>,
    #[arg(long)]
    pub certificate: Option<String>,
    /// 취업처
    #[arg(long)]
    pub company: Option<String>,
    /// 진학 학교
    #[arg(long)]
    pub school: Option<String>,
}

impl From<SearchArgs> for GraduateFilter {
    fn from(args: SearchArgs) -> Self {
        GraduateFilter {
            name: args.name,
            phone: args.phone,
            email: args.email,
            address: args.address,
            graduation_year: args.year,
            gender: args.gender,
            department: args.department,
            attendance: args.attendance,
            desired_field: args.desired,
            status: args.status,
            min_grade: args.min_grade,
            birth_date: args.birth,
            certificate: args.certificate,
            company: args.company,
            school: args.school,
        }
    }
}
