//! Request handlers for the `/movies` routes.
//!
//! Handlers validate before taking the write lock. List/search/export and the
//! id lookup of an update only take the read lock; add/update/delete/import
//! take the write lock for the mutation itself.

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::error::{
    ApiError, MSG_BODY_NOT_OBJECT, MSG_NO_MOVIE_FOR_NAME, MSG_NO_MOVIE_FOR_YEAR,
    MSG_UPDATE_NEEDS_FIELD,
};
use super::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use super::types::{AppState, MovieChange};
use crate::error::{StoreError, UploadError};
use crate::export::{export_csv, EXPORT_CONTENT_DISPOSITION};
use crate::import::{import_csv, ImportReport};
use crate::models::{Movie, MovieFilter, MoviePatch};
use crate::upload::{check_upload, UploadedFile};
use crate::validation::{as_integer, query_payload, schemas, validate, ValidationOptions};

type TextResponse<const N: usize> = ([(HeaderName, &'static str); N], String);

/// `GET /movies/list`
pub async fn list_movies(State(state): State<AppState>) -> TextResponse<1> {
    let store = state.store.read().await;
    let body: String = store
        .list()
        .iter()
        .map(|movie| format!("{}\n", movie.list_line()))
        .collect();
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

/// `GET /movies/details/{id}`
pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    let id = parse_id(&id)?;
    let store = state.store.read().await;
    Ok(Json(store.find_by_id(id)?))
}

/// `GET /movies/search?minYear=N`
pub async fn search_by_year(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let data = validate(
        &schemas::search_by_min_year_schema(),
        &query_payload(&params),
        ValidationOptions::whitelist(),
    )?;
    let filter = int_field(&data, "minYear")
        .map(MovieFilter::by_min_year)
        .unwrap_or_default();

    let store = state.store.read().await;
    let movies = store.find_where(|m| filter.matches(m));
    if movies.is_empty() {
        return Err(ApiError::NoResults(MSG_NO_MOVIE_FOR_YEAR));
    }
    Ok(Json(movies))
}

/// `GET /movies/search/name?name=S`
pub async fn search_by_name(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let data = validate(
        &schemas::search_by_name_schema(),
        &query_payload(&params),
        ValidationOptions::whitelist(),
    )?;
    let filter = str_field(&data, "name")
        .map(MovieFilter::by_name)
        .unwrap_or_default();

    let store = state.store.read().await;
    let movies = store.find_where(|m| filter.matches(m));
    if movies.is_empty() {
        return Err(ApiError::NoResults(MSG_NO_MOVIE_FOR_NAME));
    }
    Ok(Json(movies))
}

/// `POST /movies/add`
pub async fn add_movie(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    let body = json_object(payload)?;
    let data = validate(&schemas::create_movie_schema(), &body, state.create_options)
        .map_err(|failure| {
            log_warning(format!("Film respins: {failure}"));
            failure
        })?;

    // Both fields are required by the create schema.
    let MoviePatch { title, year } = movie_patch(&data);
    let movie = state
        .store
        .write()
        .await
        .insert(title.unwrap_or_default(), year.unwrap_or_default());
    log_success(format!("Film adăugat: #{} {} ({})", movie.id, movie.title, movie.year));
    Ok((StatusCode::CREATED, Json(movie)))
}

/// `PUT /movies/{id}`
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MovieChange>, ApiError> {
    let id = parse_id(&id)?;
    let body = json_object(payload)?;

    state.store.read().await.find_by_id(id)?;

    let has_field = ["title", "year"]
        .iter()
        .any(|key| body.get(*key).is_some_and(|v| !v.is_null()));
    if !has_field {
        return Err(ApiError::BadRequest(MSG_UPDATE_NEEDS_FIELD.to_string()));
    }

    let data = validate(
        &schemas::update_movie_schema(),
        &body,
        ValidationOptions::whitelist(),
    )?;
    let patch = movie_patch(&data);
    if patch.is_empty() {
        return Err(ApiError::BadRequest(MSG_UPDATE_NEEDS_FIELD.to_string()));
    }
    let movie = state.store.write().await.update(id, patch)?;
    log_success(format!("Film actualizat: #{} {} ({})", movie.id, movie.title, movie.year));
    Ok(Json(MovieChange::updated(movie)))
}

/// `DELETE /movies/{id}`
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieChange>, ApiError> {
    let id = parse_id(&id)?;
    let movie = state.store.write().await.delete(id)?;
    log_success(format!("Film șters: #{} {}", movie.id, movie.title));
    Ok(Json(MovieChange::deleted(movie)))
}

/// `POST /movies/import` (multipart field `file`)
pub async fn import_movies(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, ApiError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Eroare multipart: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Eroare la citirea fișierului: {e}")))?
            .to_vec();
        file = Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    run_import(&state, file.as_ref()).await.map(Json)
}

/// Gatekeeper checks followed by the row-by-row import.
pub async fn run_import(
    state: &AppState,
    file: Option<&UploadedFile>,
) -> Result<ImportReport, ApiError> {
    let Some(file) = file else {
        log_warning("Import respins: fișier lipsă");
        return Err(UploadError::MissingFile.into());
    };

    log_info(format!(
        "Import: {} ({} bytes)",
        file.file_name.as_deref().unwrap_or("unknown"),
        file.size()
    ));

    if let Err(err) = check_upload(Some(file), &state.upload_limits) {
        log_warning(format!("Import respins: {err}"));
        return Err(err.into());
    }

    let report = {
        let mut store = state.store.write().await;
        import_csv(&mut store, &file.bytes)?
    };

    log_success(report.summary());
    for failed in &report.errors {
        log_info_indent(
            format!("Rândul {}: {}", failed.row, failed.errors.join("; ")),
            1,
        );
    }
    Ok(report)
}

/// `GET /movies/export?name=&minYear=`
pub async fn export_movies(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<TextResponse<2>, ApiError> {
    let payload: Map<String, Value> = query_payload(&params)
        .into_iter()
        .filter(|(_, v)| v.as_str().map_or(true, |s| !s.trim().is_empty()))
        .collect();
    let data = validate(
        &schemas::export_filter_schema(),
        &payload,
        ValidationOptions::whitelist(),
    )?;
    let filter = MovieFilter {
        name: str_field(&data, "name").filter(|name| !name.is_empty()),
        min_year: int_field(&data, "minYear"),
    };

    let csv = {
        let store = state.store.read().await;
        export_csv(store.list(), &filter).map_err(|err| {
            log_error(format!("Export eșuat: {err}"));
            err
        })?
    };
    log_info(format!("Export: {} rânduri", csv.lines().count().saturating_sub(1)));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, EXPORT_CONTENT_DISPOSITION),
        ],
        csv,
    ))
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Non-numeric ids cannot match a record.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Store(StoreError::NotFound(0)))
}

fn json_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(MSG_BODY_NOT_OBJECT.to_string())),
    }
}

fn str_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

fn int_field(data: &Map<String, Value>, key: &str) -> Option<i32> {
    data.get(key)
        .and_then(as_integer)
        .and_then(|n| i32::try_from(n).ok())
}

fn movie_patch(data: &Map<String, Value>) -> MoviePatch {
    MoviePatch {
        title: str_field(data, "title"),
        year: int_field(data, "year"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ImportError, ValidationFailure};
    use crate::store::MovieStore;
    use serde_json::json;

    fn seeded_state() -> AppState {
        AppState::new(MovieStore::seeded())
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_format() {
        let (headers, body) = list_movies(State(seeded_state())).await;
        assert_eq!(headers[0].1, "text/plain; charset=utf-8");
        assert_eq!(body.lines().count(), 10);
        assert!(body.starts_with("Film: Inception, lansat în 2010\n"));
    }

    #[tokio::test]
    async fn test_add_then_details() {
        let state = seeded_state();
        let (status, Json(created)) = add_movie(
            State(state.clone()),
            Ok(Json(json!({ "title": "  Heat ", "year": "1995" }))),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id, 11);
        assert_eq!(created.title, "Heat");

        let Json(found) = movie_details(State(state), Path(created.id.to_string()))
            .await
            .unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_add_collects_errors() {
        let err = add_movie(
            State(seeded_state()),
            Ok(Json(json!({ "title": "Se7en", "year": 3000 }))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body()["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_field_policies() {
        let body = json!({ "title": "Heat", "year": 1995, "foo": 1 });

        let strict = seeded_state().with_create_options(ValidationOptions::forbid_unknown());
        let err = add_movie(State(strict.clone()), Ok(Json(body.clone())))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationFailure::DisallowedFields { .. })
        ));
        assert_eq!(strict.store.read().await.len(), 10);

        let lenient = seeded_state();
        let (status, Json(created)) = add_movie(State(lenient), Ok(Json(body))).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.title, "Heat");
    }

    #[tokio::test]
    async fn test_add_rejects_non_object_body() {
        let err = add_movie(State(seeded_state()), Ok(Json(json!(["Heat", 1995]))))
            .await
            .unwrap_err();
        assert_eq!(err.body()["error"], MSG_BODY_NOT_OBJECT);
    }

    #[tokio::test]
    async fn test_details_not_found() {
        let state = seeded_state();
        let err = movie_details(State(state.clone()), Path("99".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = movie_details(State(state), Path("abc".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_by_year() {
        let Json(movies) = search_by_year(State(seeded_state()), query(&[("minYear", "2000")]))
            .await
            .unwrap();
        assert_eq!(
            titles(&movies),
            vec!["Inception", "Interstellar", "The Dark Knight", "Gladiator"]
        );
    }

    #[tokio::test]
    async fn test_search_by_year_errors() {
        let state = seeded_state();
        let missing = search_by_year(State(state.clone()), query(&[])).await.unwrap_err();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let invalid = search_by_year(State(state.clone()), query(&[("minYear", "abc")]))
            .await
            .unwrap_err();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let empty = search_by_year(State(state), query(&[("minYear", "2090")]))
            .await
            .unwrap_err();
        assert_eq!(empty.status(), StatusCode::NOT_FOUND);
        assert_eq!(empty.body()["error"], MSG_NO_MOVIE_FOR_YEAR);
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let state = seeded_state();
        let Json(movies) = search_by_name(State(state.clone()), query(&[("name", " the ")]))
            .await
            .unwrap();
        assert_eq!(
            titles(&movies),
            vec!["The Matrix", "The Godfather", "The Dark Knight"]
        );

        let err = search_by_name(State(state.clone()), query(&[("name", "zzz")]))
            .await
            .unwrap_err();
        assert_eq!(err.body()["error"], MSG_NO_MOVIE_FOR_NAME);

        let err = search_by_name(State(state), query(&[])).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_movie() {
        let state = seeded_state();
        let Json(change) = update_movie(
            State(state.clone()),
            Path("1".into()),
            Ok(Json(json!({ "year": "2011" }))),
        )
        .await
        .unwrap();

        assert_eq!(change.message, "Filmul a fost actualizat");
        assert_eq!(change.film.title, "Inception");
        assert_eq!(change.film.year, 2011);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let state = seeded_state();

        let err = update_movie(
            State(state.clone()),
            Path("99".into()),
            Ok(Json(json!({ "year": 2000 }))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = update_movie(State(state.clone()), Path("1".into()), Ok(Json(json!({}))))
            .await
            .unwrap_err();
        assert_eq!(err.body()["error"], MSG_UPDATE_NEEDS_FIELD);

        let err = update_movie(
            State(state.clone()),
            Path("1".into()),
            Ok(Json(json!({ "title": "Inception 2" }))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.read().await.find_by_id(1).unwrap().title, "Inception");
    }

    #[tokio::test]
    async fn test_rejected_update_never_waits_for_write_lock() {
        let state = seeded_state();
        let reader = state.store.read().await;

        let err = update_movie(
            State(state.clone()),
            Path("2".into()),
            Ok(Json(json!({ "year": 1500 }))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(reader.find_by_id(2).unwrap().year, 2014);
    }

    #[tokio::test]
    async fn test_delete_then_details() {
        let state = seeded_state();
        let Json(change) = delete_movie(State(state.clone()), Path("3".into()))
            .await
            .unwrap();
        assert_eq!(change.film.title, "The Matrix");

        let err = movie_details(State(state.clone()), Path("3".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = delete_movie(State(state), Path("3".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_import_report() {
        let state = seeded_state();
        let file = UploadedFile::new("movies.csv", "title,year\nInception,2010\nBad1,abc\n")
            .with_content_type("text/csv");

        let report = run_import(&state, Some(&file)).await.unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.successful, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.imported[0].id, 11);
        assert_eq!(state.store.read().await.len(), 11);
    }

    #[tokio::test]
    async fn test_import_gatekeeper_rejections() {
        let state = seeded_state();

        let err = run_import(&state, None).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let file = UploadedFile::new("movies.csv", "id,title\n1,Heat\n");
        let err = run_import(&state, Some(&file)).await.unwrap_err();
        assert!(matches!(err, ApiError::Upload(UploadError::HeaderMismatch { .. })));
        assert_eq!(err.body()["missing"], json!(["year"]));
        assert_eq!(state.store.read().await.len(), 10);

        let file = UploadedFile::new("movies.xlsx", "title,year\n");
        let err = run_import(&state, Some(&file)).await.unwrap_err();
        assert_eq!(err.body()["error"], "Fișierul trebuie să aibă extensia .csv");
    }

    #[tokio::test]
    async fn test_import_malformed_csv() {
        let state = seeded_state();
        let file = UploadedFile::new("movies.csv", "title,year\n\"Unclosed,2000\nHeat,1995\n");

        let err = run_import(&state, Some(&file)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body()["error"], "Eroare la parsarea fișierului CSV");
        assert!(err.body()["details"].is_string());
        assert_eq!(state.store.read().await.len(), 10);
    }

    #[tokio::test]
    async fn test_export_filtered() {
        let (headers, body) = export_movies(
            State(seeded_state()),
            query(&[("name", "the"), ("minYear", "2000")]),
        )
        .await
        .unwrap();

        assert_eq!(headers[0].1, "text/csv; charset=utf-8");
        assert!(headers[1].1.contains("movies_export.csv"));
        assert_eq!(body, "id,title,year\n7,\"The Dark Knight\",2008");
    }

    #[tokio::test]
    async fn test_export_empty_params_and_bad_year() {
        let state = seeded_state();
        let (_, body) = export_movies(State(state.clone()), query(&[("name", ""), ("minYear", "")]))
            .await
            .unwrap();
        assert_eq!(body.lines().count(), 11);

        let err = export_movies(State(state), query(&[("minYear", "soon")]))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_then_import_restores_pairs() {
        let source = seeded_state();
        let (_, csv) = export_movies(State(source.clone()), query(&[])).await.unwrap();

        let target = AppState::new(MovieStore::new());
        let file = UploadedFile::new("movies_export.csv", csv);
        let report = run_import(&target, Some(&file)).await.unwrap();
        assert_eq!(report.successful, 10);

        assert_eq!(pairs(&source).await, pairs(&target).await);
    }

    async fn pairs(state: &AppState) -> Vec<(String, i32)> {
        state
            .store
            .read()
            .await
            .list()
            .iter()
            .map(|m| (m.title.clone(), m.year))
            .collect()
    }

    #[test]
    fn test_import_error_is_bad_request() {
        let err = ApiError::from(ImportError::HeaderMismatch {
            missing: vec!["title".into()],
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
