use crate::model::{Term, TermSearchQuery, TermStats};
use hte_core::HteError;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS terms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_term TEXT NOT NULL,
    target_term TEXT NOT NULL,
    source_lang TEXT NOT NULL,
    target_lang TEXT NOT NULL,
    domain TEXT,
    confidence REAL NOT NULL DEFAULT 0.0,
    quality_score REAL NOT NULL DEFAULT 0.0,
    combined_score REAL NOT NULL DEFAULT 0.0,
    category TEXT,
    law TEXT,
    year INTEGER,
    entry_id TEXT,
    source_context TEXT,
    target_context TEXT,
    occurrence_count INTEGER NOT NULL DEFAULT 1,
    original_source_term TEXT NOT NULL,
    original_target_term TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_terms_source ON terms(source_term, source_lang);
CREATE INDEX IF NOT EXISTS idx_terms_target ON terms(target_term, target_lang);
CREATE INDEX IF NOT EXISTS idx_terms_lang_pair ON terms(source_lang, target_lang);
CREATE INDEX IF NOT EXISTS idx_terms_domain ON terms(domain);
";

/// Single-writer SQLite-backed term store (C2). Blocking `rusqlite` calls
/// are dispatched to Tokio's blocking-task pool from every public async
/// method, per the "wrap blocking DB calls on a worker thread" requirement
/// that runtime callers (the Search layer agent) depend on.
#[derive(Clone)]
pub struct Termbase {
    conn: Arc<Mutex<Connection>>,
}

impl Termbase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HteError> {
        let conn = Connection::open(path).map_err(|e| HteError::Storage(e.to_string()))?;
        conn.pragma_update(None, "journal_mode", "WAL").map_err(|e| HteError::Storage(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL").map_err(|e| HteError::Storage(e.to_string()))?;
        conn.busy_timeout(std::time::Duration::from_secs(5)).map_err(|e| HteError::Storage(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL).map_err(|e| HteError::Storage(e.to_string()))?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub async fn add_term(&self, term: Term) -> Result<i64, HteError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || insert_term(&conn, &term))
            .await
            .map_err(|e| HteError::Storage(format!("blocking task panicked: {e}")))?
    }

    pub async fn batch_add_terms(&self, terms: Vec<Term>) -> Result<usize, HteError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap();
            let tx = guard.transaction().map_err(|e| HteError::Storage(e.to_string()))?;
            let mut count = 0usize;
            for term in &terms {
                insert_term_tx(&tx, term)?;
                count += 1;
            }
            tx.commit().map_err(|e| HteError::Storage(e.to_string()))?;
            Ok(count)
        })
        .await
        .map_err(|e| HteError::Storage(format!("blocking task panicked: {e}")))?
    }

    pub async fn search_terms(&self, query: TermSearchQuery) -> Result<Vec<Term>, HteError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || search_terms_blocking(&conn, &query))
            .await
            .map_err(|e| HteError::Storage(format!("blocking task panicked: {e}")))?
    }

    pub async fn get_term_stats(&self) -> Result<TermStats, HteError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || term_stats_blocking(&conn))
            .await
            .map_err(|e| HteError::Storage(format!("blocking task panicked: {e}")))?
    }
}

fn insert_term(conn: &Mutex<Connection>, term: &Term) -> Result<i64, HteError> {
    let guard = conn.lock().unwrap();
    insert_term_tx(&guard, term)
}

fn insert_term_tx(conn: &Connection, term: &Term) -> Result<i64, HteError> {
    conn.execute(
        "INSERT INTO terms (
            source_term, target_term, source_lang, target_lang, domain,
            confidence, quality_score, combined_score, category, law, year,
            entry_id, source_context, target_context, occurrence_count,
            original_source_term, original_target_term, metadata, created_at, updated_at
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20)",
        params![
            term.source_term,
            term.target_term,
            term.source_lang,
            term.target_lang,
            term.domain,
            term.confidence,
            term.quality_score,
            term.combined_score,
            term.category,
            term.law,
            term.year,
            term.entry_id,
            term.source_context,
            term.target_context,
            term.occurrence_count,
            term.original_source_term,
            term.original_target_term,
            term.metadata.to_string(),
            term.created_at.to_rfc3339(),
            term.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| HteError::Storage(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

fn search_terms_blocking(conn: &Mutex<Connection>, query: &TermSearchQuery) -> Result<Vec<Term>, HteError> {
    let guard = conn.lock().unwrap();

    let column = if query.search_target { "target_term" } else { "source_term" };
    let predicate = if query.exact_match { format!("{column} = ?1") } else { format!("{column} LIKE ?1") };
    let term_param = if query.exact_match { query.term.clone() } else { format!("%{}%", query.term) };

    let mut sql = format!("SELECT * FROM terms WHERE {predicate}");
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(term_param)];

    if let Some(source_lang) = &query.source_lang {
        sql.push_str(&format!(" AND source_lang = ?{}", params.len() + 1));
        params.push(Box::new(source_lang.clone()));
    }
    if let Some(target_lang) = &query.target_lang {
        sql.push_str(&format!(" AND target_lang = ?{}", params.len() + 1));
        params.push(Box::new(target_lang.clone()));
    }
    if let Some(domain) = &query.domain {
        sql.push_str(&format!(" AND domain = ?{}", params.len() + 1));
        params.push(Box::new(domain.clone()));
    }
    sql.push_str(" ORDER BY confidence DESC LIMIT ?");
    let limit = if query.limit > 0 { query.limit } else { 20 };
    params.push(Box::new(limit));

    let mut stmt = guard.prepare(&sql).map_err(|e| HteError::Storage(e.to_string()))?;
    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), row_to_term)
        .map_err(|e| HteError::Storage(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| HteError::Storage(e.to_string()))?);
    }
    Ok(out)
}

fn term_stats_blocking(conn: &Mutex<Connection>) -> Result<TermStats, HteError> {
    let guard = conn.lock().unwrap();

    let total_terms: i64 = guard
        .query_row("SELECT COUNT(*) FROM terms", [], |r| r.get(0))
        .map_err(|e| HteError::Storage(e.to_string()))?;

    let avg_confidence: Option<f64> = guard
        .query_row("SELECT AVG(confidence) FROM terms", [], |r| r.get::<_, Option<f64>>(0))
        .map_err(|e| HteError::Storage(e.to_string()))?;

    let mut lang_stmt = guard
        .prepare("SELECT source_lang, target_lang, COUNT(*) FROM terms GROUP BY source_lang, target_lang")
        .map_err(|e| HteError::Storage(e.to_string()))?;
    let lang_pairs = lang_stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?, r.get::<_, i64>(2)?)))
        .map_err(|e| HteError::Storage(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| HteError::Storage(e.to_string()))?;

    let mut domain_stmt = guard
        .prepare("SELECT COALESCE(domain, ''), COUNT(*) FROM terms GROUP BY domain")
        .map_err(|e| HteError::Storage(e.to_string()))?;
    let domains = domain_stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))
        .map_err(|e| HteError::Storage(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| HteError::Storage(e.to_string()))?;

    Ok(TermStats { total_terms, lang_pairs, domains, avg_confidence: avg_confidence.unwrap_or(0.0) })
}

fn row_to_term(row: &rusqlite::Row) -> rusqlite::Result<Term> {
    let metadata_raw: String = row.get("metadata")?;
    let metadata = serde_json::from_str(&metadata_raw).unwrap_or_else(|_| serde_json::json!({}));
    let created_raw: String = row.get("created_at")?;
    let updated_raw: String = row.get("updated_at")?;

    Ok(Term {
        source_term: row.get("source_term")?,
        target_term: row.get("target_term")?,
        source_lang: row.get("source_lang")?,
        target_lang: row.get("target_lang")?,
        domain: row.get("domain")?,
        confidence: row.get("confidence")?,
        quality_score: row.get("quality_score")?,
        combined_score: row.get("combined_score")?,
        category: row.get("category")?,
        law: row.get("law")?,
        year: row.get("year")?,
        entry_id: row.get("entry_id")?,
        source_context: row.get("source_context")?,
        target_context: row.get("target_context")?,
        occurrence_count: row.get("occurrence_count")?,
        original_source_term: row.get("original_source_term")?,
        original_target_term: row.get("original_target_term")?,
        metadata,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_raw)
            .map(|d| d.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now()),
        updated_at: chrono::DateTime::parse_from_rfc3339(&updated_raw)
            .map(|d| d.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now()),
    })
}
