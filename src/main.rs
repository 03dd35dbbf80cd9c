use anyhow::Context;
use clap::Parser;
use grad_tracker::{cli, config, export, importer, photos, scanner, service, store};
use cli::{Cli, Commands, PhotoAction};
use config::Config;
use grad_tracker_common::{Graduate, GraduateInput, GraduatePatch};
use indicatif::{ProgressBar, ProgressStyle};
use service::GraduateService;
use std::path::Path;
use store::{Database, GraduateFilter, ListQuery, LogFilter, PhotoDir};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();

    let mut config = Config::load()?;
    let actor = cli.actor.clone().or_else(|| config.default_actor.clone());
    let actor = actor.as_deref();

    if let Commands::Config { show, set_upload_dir, set_db } = &cli.command {
        if let Some(dir) = set_upload_dir {
            config.set_upload_dir(dir.clone())?;
            println!("✔ 업로드 폴더를 설정했습니다");
        }
        if let Some(db) = set_db {
            config.set_database_path(db.clone())?;
            println!("✔ 데이터베이스 파일을 설정했습니다");
        }
        if *show {
            println!("설정: {}", Config::config_path()?.display());
            println!("  데이터베이스: {}", config.database_path.display());
            println!("  업로드 폴더: {}", config.upload_dir.display());
            println!("  사진 URL: {}", config.photo_url_prefix);
            println!("  사진 최대 크기: {} bytes", config.max_photo_bytes);
            println!("  허용 확장자: {}", config.allowed_photo_extensions.join(", "));
            println!("  기본 사용자: {}", config.default_actor.as_deref().unwrap_or("미설정"));
            println!("  관리자: {}", config.admin_emails.join(", "));
        }
        return Ok(());
    }

    let db = open_database(&config)?;
    let photo_dir = PhotoDir::from_config(&config);
    let service = GraduateService::new(&db, &db, &photo_dir);

    match cli.command {
        Commands::Init => {
            std::fs::create_dir_all(photo_dir.root())?;
            println!("✔ 데이터베이스: {}", config.database_path.display());
            println!("✔ 사진 폴더: {}", photo_dir.root().display());
        }

        Commands::Import { file, mode, match_key, report } => {
            println!("📥 grad-tracker - 일괄 등록\n");

            let sheet = grad_tracker::sheet::read_file(&file)?;
            let rows = sheet.rows.iter().filter(|r| !grad_tracker::sheet::is_blank_row(r)).count();
            println!("✔ {}행을 읽었습니다 ({:?}, 기준: {})\n", rows, mode, match_key);

            let options = importer::ImportOptions {
                mode,
                match_key,
                actor: actor.map(str::to_string),
            };
            let pb = progress_bar(rows as u64)?;
            let result = importer::import_batch(&service, &sheet, &options, |_| pb.inc(1));
            pb.finish_and_clear();

            println!(
                "총 {}건 / 성공 {}건 (등록 {}, 수정 {}) / 실패 {}건",
                result.total, result.succeeded, result.created, result.updated, result.failed
            );
            for failure in result.failures() {
                println!("  ✗ {}행: {}", failure.row, failure.reason.as_deref().unwrap_or("오류"));
            }

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&path, json)?;
                println!("✔ 결과 저장: {}", path.display());
            }
            println!("\n✅ 완료");
        }

        Commands::Photos { folder, match_key, no_overwrite, recursive, report } => {
            println!("📸 grad-tracker - 사진 일괄 등록\n");

            let images = scanner::scan_folder(&folder, recursive, &config.allowed_photo_extensions)?;
            println!("✔ {}장의 사진을 찾았습니다\n", images.len());

            let files: Vec<photos::PhotoFile> = images.iter().map(|i| photos::PhotoFile::from_path(&i.path)).collect();
            let options = photos::PhotoBatchOptions {
                match_key,
                overwrite: !no_overwrite,
                actor: actor.map(str::to_string),
            };
            let pb = progress_bar(files.len() as u64)?;
            let result = photos::bulk_match_photos(&service, &files, &options, |o| {
                pb.set_message(o.filename.clone());
                pb.inc(1);
            });
            pb.finish_and_clear();

            println!("총 {}장 / 성공 {}장 / 실패 {}장", result.total, result.succeeded, result.failed);
            for failure in result.failures() {
                println!("  ✗ {}: {}", failure.filename, failure.reason.as_deref().unwrap_or("오류"));
            }

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&path, json)?;
                println!("✔ 결과 저장: {}", path.display());
            }
            println!("\n✅ 완료");
        }

        Commands::Photo { action } => match action {
            PhotoAction::Set { id, file } => {
                let bytes = std::fs::read(&file).with_context(|| format!("사진을 읽을 수 없습니다: {}", file.display()))?;
                let filename = file
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let saved = service.set_photo(&id, &bytes, &filename, actor)?;
                println!("✔ 사진 등록: {} → {}", saved.name, saved.photo_url.as_deref().unwrap_or(""));
            }
            PhotoAction::Clear { id } => {
                let saved = service.clear_photo(&id, actor)?;
                println!("✔ 사진 삭제: {}", saved.name);
            }
        },

        Commands::Add { json } => {
            let input = GraduateInput::from_json(&read_text(&json)?)?;
            let saved = service.create(input, actor)?;
            println!("✔ 등록했습니다: {} ({})", saved.name, saved.id);
        }

        Commands::Edit { id, json } => {
            let patch = GraduatePatch::from_json(&read_text(&json)?)?;
            if patch.is_empty() {
                println!("수정할 항목이 없습니다");
                return Ok(());
            }
            let saved = service.update(&id, patch, actor)?;
            println!("✔ 수정했습니다: {} ({})", saved.name, saved.id);
        }

        Commands::List { q, page, page_size } => {
            let query = ListQuery { q, page: Some(page), page_size: Some(page_size) };
            let result = db.list(&query)?;
            let pages = result.total.div_ceil(result.page_size).max(1);
            println!("총 {}명 ({}/{} 페이지)", result.total, result.page, pages);
            for g in &result.items {
                print_summary(g);
            }
        }

        Commands::Search { filter, json } => {
            let found = db.search(&GraduateFilter::from(filter))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                println!("검색 결과 {}명", found.len());
                for g in &found {
                    print_summary(g);
                }
            }
        }

        Commands::Show { id } => {
            let g = service.find(&id)?;
            println!("{}", serde_json::to_string_pretty(&g)?);
        }

        Commands::Delete { id } => {
            service.delete(&id, actor)?;
            println!("✔ 삭제했습니다: {}", id);
        }

        Commands::Stats => {
            let stats = db.stats()?;
            println!("졸업생 현황:");
            println!("  전체: {}명", stats.total);
            println!("  재직중: {}명 ({}%)", stats.employed, stats.employed_rate);
            println!("  재학중: {}명 ({}%)", stats.further_study, stats.further_study_rate);
            println!("  구직중: {}명", stats.job_seeking);
        }

        Commands::Logs { kind, graduate, by_actor, limit, offset } => {
            let filter = LogFilter {
                kind,
                graduate_id: graduate,
                actor_id: by_actor,
                limit: Some(limit),
                offset: Some(offset),
            };
            for log in db.activity_logs(&filter)? {
                let by = match log.actor_user_id.as_deref() {
                    Some(a) if config.is_admin(a) => format!("{} (관리자)", a),
                    Some(a) => a.to_string(),
                    None => "-".to_string(),
                };
                println!("{}  [{}] {}  (by {})", log.at, log.kind, log.message, by);
            }
        }

        Commands::Template { output } => {
            let output = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            let path = export::output_path(&output, export::TEMPLATE_FILE_NAME);
            println!("- 템플릿 생성 중...");
            export::excel::write_template(&path)?;
            println!("✔ 템플릿 출력: {}", path.display());
        }

        Commands::Export { output, filter } => {
            let found = db.search(&GraduateFilter::from(filter))?;
            let path = export::output_path(&output, export::ROSTER_FILE_NAME);
            println!("- 명단 생성 중... ({}명)", found.len());
            export::excel::write_roster(&found, &path)?;
            println!("✔ 명단 출력: {}", path.display());
        }

        // 데이터베이스를 열기 전에 처리됨
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Database::open(&config.database_path)
        .with_context(|| format!("데이터베이스를 열 수 없습니다: {}", config.database_path.display()))
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("파일을 읽을 수 없습니다: {}", path.display()))
}

fn progress_bar(len: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")?.progress_chars("=> "));
    Ok(pb)
}

fn print_summary(g: &Graduate) {
    let status = g
        .current_status
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "  {}  {} ({}) {} {}  {}  [{}]",
        g.id,
        g.name,
        g.graduation_year,
        g.department,
        g.phone,
        g.email.as_deref().unwrap_or("-"),
        status
    );
}
