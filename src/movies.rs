//! Movie endpoints.
//!
//! | Route | Upstream call |
//! |---|---|
//! | `GET /movies?page=N` | `auto-complete?q=<letter N>` |
//! | `GET /movies/search?q=text` | `auto-complete?q=text` |
//! | `GET /movies/{id}` | `title/get-overview-details?tconst=id` |
//!
//! Inputs are validated before the upstream is touched. Upstream payloads
//! stay loosely typed (`serde_json::Value`); only the `d` suggestion list is
//! narrowed, and detail payloads are passed through untouched.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::request::Request;
use crate::response::Response;

pub const AUTO_COMPLETE: &str = "auto-complete";
pub const OVERVIEW_DETAILS: &str = "title/get-overview-details";

const SUCCESS: &str = "success";

/// Pages 1..=26 map onto these as search prefixes.
const LETTERS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

const MIN_QUERY_CHARS: usize = 2;

// ASCII digits only; `\d` would also admit other Unicode digits.
static IMDB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tt[0-9]{7,8}$").expect("IMDb id pattern compiles"));

#[derive(Debug, Serialize)]
pub struct PageEnvelope {
    pub status: &'static str,
    pub page: i64,
    pub query_used: String,
    pub results: usize,
    pub data: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct SearchEnvelope {
    pub status: &'static str,
    pub results: usize,
    pub data: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct DetailEnvelope {
    pub status: &'static str,
    pub data: Value,
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /movies?page=N`
pub async fn list(req: Request, state: AppState) -> Result<Response, ApiError> {
    let page = parse_page(req.query("page").as_deref());
    let letter = page_letter(page)?.to_string();

    let payload = state.upstream().call(AUTO_COMPLETE, &[("q", letter.as_str())]).await?;
    let data = suggestions(payload);

    Ok(Response::json(&PageEnvelope {
        status: SUCCESS,
        page,
        query_used: letter,
        results: data.len(),
        data,
    }))
}

/// `GET /movies/search?q=text`
pub async fn search(req: Request, state: AppState) -> Result<Response, ApiError> {
    let query = req.query("q").unwrap_or_default();
    let query = validate_query(&query)?;

    let payload = state.upstream().call(AUTO_COMPLETE, &[("q", query)]).await?;
    let data = suggestions(payload);

    Ok(Response::json(&SearchEnvelope { status: SUCCESS, results: data.len(), data }))
}

/// `GET /movies/{id}`
pub async fn detail(req: Request, state: AppState) -> Result<Response, ApiError> {
    let id = validate_movie_id(req.param("id").unwrap_or_default())?;

    let payload = state.upstream().call(OVERVIEW_DETAILS, &[("tconst", id)]).await?;
    if is_empty(&payload) {
        return Err(ApiError::not_found("Movie not found"));
    }

    Ok(Response::json(&DetailEnvelope { status: SUCCESS, data: payload }))
}

// ── Input rules ───────────────────────────────────────────────────────────────

/// Leading-integer parse: optional whitespace and sign, then digits up to the
/// first non-digit. No digits at all means page 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else { return 1 };
    let raw = raw.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = rest.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return 1;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    if negative { -magnitude } else { magnitude }
}

/// The search letter standing in for `page`.
pub fn page_letter(page: i64) -> Result<char, ApiError> {
    if page < 1 {
        return Err(ApiError::validation("Page number must be at least 1"));
    }
    usize::try_from(page - 1)
        .ok()
        .and_then(|i| LETTERS.get(i))
        .map(|&b| char::from(b))
        .ok_or_else(|| ApiError::validation("Page limit exceeded").labelled_error())
}

/// Trims `raw` and enforces a minimum length.
pub fn validate_query(raw: &str) -> Result<&str, ApiError> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(ApiError::validation("Please provide a search query"));
    }
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(ApiError::validation("Search query must be at least 2 characters long"));
    }
    Ok(query)
}

/// Trims `raw` and checks it is an IMDb title id (`tt` + 7 or 8 digits).
pub fn validate_movie_id(raw: &str) -> Result<&str, ApiError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ApiError::validation("Movie id is required"));
    }
    if !IMDB_ID.is_match(id) {
        return Err(ApiError::validation("Invalid IMDb ID format."));
    }
    Ok(id)
}

// ── Payload narrowing ─────────────────────────────────────────────────────────

/// The `d` list of an auto-complete payload; empty when missing or not a list.
fn suggestions(payload: Value) -> Vec<Value> {
    match payload {
        Value::Object(mut map) => match map.remove("d") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn is_empty(payload: &Value) -> bool {
    match payload {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
