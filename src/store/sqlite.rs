//! SQLite 저장소
//!
//! 목록형 필드(자격증, 이력, 희망분야, 현재상태)는 JSON 텍스트로 저장한다.
//! 전화번호 매칭용으로 `digits(text)` 함수를 연결마다 등록한다.

use super::{
    ActivityLog, ActivitySink, ActivityType, GraduateFilter, ListQuery, LogFilter, NewActivity, Page,
    RecordStore, Stats,
};
use crate::error::{StoreError, StoreResult};
use crate::matcher::MatchKey;
use grad_tracker_common::{digits_only, Graduate, GraduateInput, GraduatePatch, Status};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS graduates (
    id                 TEXT PRIMARY KEY,
    photo_url          TEXT,
    graduation_year    INTEGER NOT NULL,
    name               TEXT NOT NULL,
    gender             TEXT NOT NULL,
    birth_date         TEXT NOT NULL,
    phone              TEXT NOT NULL CHECK (phone NOT GLOB '*[^0-9-]*'),
    address            TEXT NOT NULL DEFAULT '',
    department         TEXT NOT NULL,
    grade              REAL CHECK (grade IS NULL OR (grade >= 0 AND grade <= 100)),
    attendance         TEXT,
    certificates       TEXT NOT NULL DEFAULT '[]',
    email              TEXT COLLATE NOCASE,
    employment_history TEXT NOT NULL DEFAULT '[]',
    education_history  TEXT NOT NULL DEFAULT '[]',
    desired_field      TEXT NOT NULL DEFAULT '[]',
    current_status     TEXT NOT NULL DEFAULT '[]',
    memo               TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS graduates_email_unique ON graduates (email);
CREATE INDEX IF NOT EXISTS graduates_name_birth ON graduates (name, birth_date);
CREATE INDEX IF NOT EXISTS graduates_updated_at ON graduates (updated_at);

CREATE TABLE IF NOT EXISTS activity_logs (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    type          TEXT NOT NULL,
    actor_user_id TEXT,
    graduate_id   TEXT REFERENCES graduates (id) ON DELETE SET NULL,
    message       TEXT NOT NULL,
    at            TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS activity_logs_at ON activity_logs (at);
"#;

const GRADUATE_COLUMNS: &str = "id, photo_url, graduation_year, name, gender, birth_date, phone, address, \
     department, grade, attendance, certificates, email, employment_history, education_history, \
     desired_field, current_status, memo, created_at, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// 파일을 열고 스키마를 준비한다. 상위 폴더는 호출 측이 만든다.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.create_scalar_function(
            "digits",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| digits_only(&t)))
            },
        )?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// 스키마 생성 (여러 번 호출해도 안전)
    pub fn init(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// 이름/연락처/이메일 부분 일치, 최근 수정 순
    pub fn list(&self, query: &ListQuery) -> StoreResult<Page<Graduate>> {
        let page = query.effective_page();
        let page_size = query.effective_page_size();

        let (where_sql, mut values) = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => (
                "WHERE name LIKE ?1 ESCAPE '\\' OR phone LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\'",
                vec![Value::Text(like_pattern(q))],
            ),
            None => ("", Vec::new()),
        };

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM graduates {}", where_sql),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let limit_idx = values.len() + 1;
        values.push(Value::Integer(page_size as i64));
        values.push(Value::Integer(((page - 1) * page_size) as i64));
        let sql = format!(
            "SELECT {} FROM graduates {} ORDER BY updated_at DESC, rowid DESC LIMIT ?{} OFFSET ?{}",
            GRADUATE_COLUMNS,
            where_sql,
            limit_idx,
            limit_idx + 1
        );
        let items = self.query_graduates(&sql, &values)?;

        Ok(Page {
            items,
            total: total as usize,
            page,
            page_size,
        })
    }

    /// 상세 검색
    pub fn search(&self, filter: &GraduateFilter) -> StoreResult<Vec<Graduate>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        let mut push = |clause: &str, value: Value| {
            values.push(value);
            clauses.push(clause.replace("?", &format!("?{}", values.len())));
        };

        let text = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(v) = text(&filter.name) {
            push("name LIKE ? ESCAPE '\\'", Value::Text(like_pattern(&v)));
        }
        if let Some(v) = text(&filter.phone) {
            push("phone LIKE ? ESCAPE '\\'", Value::Text(like_pattern(&v)));
        }
        if let Some(v) = text(&filter.email) {
            push("email LIKE ? ESCAPE '\\'", Value::Text(like_pattern(&v)));
        }
        if let Some(v) = text(&filter.address) {
            push("address LIKE ? ESCAPE '\\'", Value::Text(like_pattern(&v)));
        }
        if let Some(v) = filter.graduation_year {
            push("graduation_year = ?", Value::Integer(v as i64));
        }
        if let Some(v) = filter.gender {
            push("gender = ?", Value::Text(v.label().into()));
        }
        if let Some(v) = filter.department {
            push("department = ?", Value::Text(v.label().into()));
        }
        if let Some(v) = filter.attendance {
            push("attendance = ?", Value::Text(v.label().into()));
        }
        if let Some(v) = filter.desired_field {
            push(
                "EXISTS (SELECT 1 FROM json_each(graduates.desired_field) WHERE value = ?)",
                Value::Text(v.label().into()),
            );
        }
        if let Some(v) = filter.status {
            push(
                "EXISTS (SELECT 1 FROM json_each(graduates.current_status) WHERE value = ?)",
                Value::Text(v.label().into()),
            );
        }
        if let Some(v) = filter.min_grade {
            push("grade >= ?", Value::Real(v));
        }
        if let Some(v) = text(&filter.birth_date) {
            push("birth_date = ?", Value::Text(v));
        }
        if let Some(v) = text(&filter.certificate) {
            push(
                "EXISTS (SELECT 1 FROM json_each(graduates.certificates) WHERE value LIKE ? ESCAPE '\\')",
                Value::Text(like_pattern(&v)),
            );
        }
        if let Some(v) = text(&filter.company) {
            push(
                "EXISTS (SELECT 1 FROM json_each(graduates.employment_history) \
                 WHERE json_extract(value, '$.name') LIKE ? ESCAPE '\\')",
                Value::Text(like_pattern(&v)),
            );
        }
        if let Some(v) = text(&filter.school) {
            push(
                "EXISTS (SELECT 1 FROM json_each(graduates.education_history) \
                 WHERE json_extract(value, '$.name') LIKE ? ESCAPE '\\')",
                Value::Text(like_pattern(&v)),
            );
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM graduates {} ORDER BY updated_at DESC, rowid DESC",
            GRADUATE_COLUMNS, where_sql
        );
        self.query_graduates(&sql, &values)
    }

    pub fn stats(&self) -> StoreResult<Stats> {
        let total = self.count_where("1 = 1", None)?;
        let count_status = |status: Status| {
            self.count_where(
                "EXISTS (SELECT 1 FROM json_each(graduates.current_status) WHERE value = ?1)",
                Some(status.label()),
            )
        };
        let employed = count_status(Status::Employed)?;
        let further_study = count_status(Status::Enrolled)?;
        let job_seeking = count_status(Status::JobSeeking)?;
        Ok(Stats::from_counts(total, employed, further_study, job_seeking))
    }

    fn count_where(&self, clause: &str, param: Option<&str>) -> StoreResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM graduates WHERE {}", clause);
        let count: i64 = match param {
            Some(p) => self.conn.query_row(&sql, params![p], |row| row.get(0))?,
            None => self.conn.query_row(&sql, [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    /// 활동 로그 (최신순)
    pub fn activity_logs(&self, filter: &LogFilter) -> StoreResult<Vec<ActivityLog>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(kind) = filter.kind {
            values.push(Value::Text(kind.as_str().into()));
            clauses.push(format!("type = ?{}", values.len()));
        }
        if let Some(id) = &filter.graduate_id {
            values.push(Value::Text(id.clone()));
            clauses.push(format!("graduate_id = ?{}", values.len()));
        }
        if let Some(actor) = &filter.actor_id {
            values.push(Value::Text(actor.clone()));
            clauses.push(format!("actor_user_id = ?{}", values.len()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        values.push(Value::Integer(filter.effective_limit() as i64));
        values.push(Value::Integer(filter.offset.unwrap_or(0) as i64));
        let sql = format!(
            "SELECT id, type, actor_user_id, graduate_id, message, at FROM activity_logs {} \
             ORDER BY at DESC, id DESC LIMIT ?{} OFFSET ?{}",
            where_sql,
            values.len() - 1,
            values.len()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            let kind: String = row.get(1)?;
            Ok(ActivityLog {
                id: row.get(0)?,
                kind: ActivityType::from_str(&kind)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into()))?,
                actor_user_id: row.get(2)?,
                graduate_id: row.get(3)?,
                message: row.get(4)?,
                at: row.get(5)?,
            })
        })?;
        let logs = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }

    fn query_graduates(&self, sql: &str, values: &[Value]) -> StoreResult<Vec<Graduate>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), map_graduate)?;
        let graduates = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(graduates)
    }

    fn write_graduate(&self, g: &Graduate, insert: bool) -> StoreResult<()> {
        let sql = if insert {
            format!(
                "INSERT INTO graduates ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
                GRADUATE_COLUMNS
            )
        } else {
            "UPDATE graduates SET photo_url = ?2, graduation_year = ?3, name = ?4, gender = ?5, \
             birth_date = ?6, phone = ?7, address = ?8, department = ?9, grade = ?10, attendance = ?11, \
             certificates = ?12, email = ?13, employment_history = ?14, education_history = ?15, \
             desired_field = ?16, current_status = ?17, memo = ?18, created_at = ?19, updated_at = ?20 \
             WHERE id = ?1"
                .to_string()
        };

        self.conn
            .execute(
                &sql,
                params![
                    g.id,
                    g.photo_url,
                    g.graduation_year,
                    g.name,
                    g.gender.label(),
                    g.birth_date,
                    g.phone,
                    g.address,
                    g.department.label(),
                    g.grade,
                    g.attendance.map(|a| a.label()),
                    to_json(&g.certificates)?,
                    g.email,
                    to_json(&g.employment_history)?,
                    to_json(&g.education_history)?,
                    to_json(&g.desired_field)?,
                    to_json(&g.current_status)?,
                    g.memo,
                    g.created_at,
                    g.updated_at,
                ],
            )
            .map_err(map_write_error)?;
        Ok(())
    }
}

impl RecordStore for Database {
    fn find_candidates(&self, key: &MatchKey, limit: usize) -> StoreResult<Vec<Graduate>> {
        let limit = Value::Integer(limit as i64);
        let (clause, mut values) = match key {
            MatchKey::Email(email) => ("email = ?1 COLLATE NOCASE", vec![Value::Text(email.clone())]),
            MatchKey::PhoneDigits(d) => ("digits(phone) = ?1", vec![Value::Text(d.clone())]),
            MatchKey::NameBirthDate { name, birth_date } => (
                "name = ?1 AND birth_date = ?2",
                vec![Value::Text(name.clone()), Value::Text(birth_date.clone())],
            ),
        };
        values.push(limit);
        let sql = format!(
            "SELECT {} FROM graduates WHERE {} ORDER BY created_at, rowid LIMIT ?{}",
            GRADUATE_COLUMNS,
            clause,
            values.len()
        );
        self.query_graduates(&sql, &values)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Graduate> {
        let sql = format!("SELECT {} FROM graduates WHERE id = ?1", GRADUATE_COLUMNS);
        self.conn
            .query_row(&sql, params![id], map_graduate)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn create(&self, input: GraduateInput) -> StoreResult<Graduate> {
        let id = uuid::Uuid::new_v4().to_string();
        let graduate = Graduate::from_input(id, input, &now());
        self.write_graduate(&graduate, true)?;
        Ok(graduate)
    }

    fn update(&self, id: &str, patch: GraduatePatch) -> StoreResult<Graduate> {
        let mut graduate = self.find_by_id(id)?;
        graduate.apply(patch);
        graduate.updated_at = now();
        self.write_graduate(&graduate, false)?;
        Ok(graduate)
    }

    fn set_photo_url(&self, id: &str, url: Option<&str>) -> StoreResult<Graduate> {
        let mut graduate = self.find_by_id(id)?;
        graduate.photo_url = url.map(str::to_string);
        graduate.updated_at = now();
        self.conn.execute(
            "UPDATE graduates SET photo_url = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, graduate.photo_url, graduate.updated_at],
        )?;
        Ok(graduate)
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let affected = self.conn.execute("DELETE FROM graduates WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

impl ActivitySink for Database {
    fn append(&self, entry: &NewActivity) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO activity_logs (type, actor_user_id, graduate_id, message, at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![entry.kind.as_str(), entry.actor_id, entry.graduate_id, entry.message, now()],
        )?;
        Ok(())
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// `%`, `_`, `\` 이스케이프 후 앞뒤 와일드카드
fn like_pattern(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 2);
    escaped.push('%');
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn to_json<T: Serialize>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::Decode(e.to_string()))
}

/// 유일성 위반을 Conflict로 변환. 메시지에서 위반 컬럼을 추출한다.
fn map_write_error(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
        if failure.code == ErrorCode::ConstraintViolation {
            if let Some(msg) = message.as_deref() {
                if let Some(cols) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    let field = cols
                        .split(',')
                        .next()
                        .map(|c| c.trim().rsplit('.').next().unwrap_or(c).to_string());
                    return StoreError::Conflict { field };
                }
                if msg.contains("PRIMARY KEY") {
                    return StoreError::Conflict { field: None };
                }
            }
        }
    }
    StoreError::Database(err)
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
}

fn json_col<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(idx, e))
}

fn label_col<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e: String| conversion_error(idx, e))
}

fn opt_label_col<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| t.parse().map_err(|e: String| conversion_error(idx, e)))
        .transpose()
}

fn map_graduate(row: &Row<'_>) -> rusqlite::Result<Graduate> {
    Ok(Graduate {
        id: row.get(0)?,
        photo_url: row.get(1)?,
        graduation_year: row.get(2)?,
        name: row.get(3)?,
        gender: label_col(row, 4)?,
        birth_date: row.get(5)?,
        phone: row.get(6)?,
        address: row.get(7)?,
        department: label_col(row, 8)?,
        grade: row.get(9)?,
        attendance: opt_label_col(row, 10)?,
        certificates: json_col(row, 11)?,
        email: row.get(12)?,
        employment_history: json_col(row, 13)?,
        education_history: json_col(row, 14)?,
        desired_field: json_col(row, 15)?,
        current_status: json_col(row, 16)?,
        memo: row.get(17)?,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}
