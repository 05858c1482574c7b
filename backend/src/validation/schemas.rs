//! The movie schemas and their messages.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{FieldRule, Schema};
use crate::models::{MAX_YEAR, MIN_YEAR};

pub const TITLE_REQUIRED: &str = "Titlul este obligatoriu";
pub const TITLE_NOT_TEXT: &str = "Titlul trebuie să fie text";
pub const TITLE_LENGTH: &str = "Titlul trebuie să aibă între 2 și 100 caractere";
pub const TITLE_HAS_DIGITS: &str = "Titlul nu poate conține cifre";
pub const YEAR_REQUIRED: &str = "Anul este obligatoriu";
pub const YEAR_INVALID: &str = "Anul trebuie să fie un număr între 1888 și 2100";
pub const YEAR_NOT_INTEGER: &str = "Anul trebuie să fie un număr întreg";
pub const YEAR_OUT_OF_RANGE: &str = "Anul trebuie să fie între 1888 și 2100";
pub const NAME_REQUIRED: &str = "Parametrul name este obligatoriu";
pub const NAME_NOT_TEXT: &str = "name trebuie să fie text";
pub const NAME_TOO_SHORT: &str = "name trebuie să aibă cel puțin 1 caracter";
pub const MIN_YEAR_REQUIRED: &str = "Parametrul minYear este obligatoriu";
pub const MIN_YEAR_INVALID: &str = "minYear trebuie să fie un număr valid";

const TITLE_MIN_CHARS: usize = 2;
const TITLE_MAX_CHARS: usize = 100;

/// Bounds accepted for the `minYear` query parameter.
const SEARCH_MIN_YEAR: i64 = 1800;
const SEARCH_MAX_YEAR: i64 = 2100;

static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit pattern"));

/// True when `text` has no digit characters.
pub fn has_no_digits(text: &str) -> bool {
    !DIGIT.is_match(text)
}

fn title_rule() -> FieldRule {
    FieldRule::body()
        .string(TITLE_NOT_TEXT)
        .trim()
        .length(TITLE_MIN_CHARS, TITLE_MAX_CHARS, TITLE_LENGTH)
        .custom(has_no_digits, TITLE_HAS_DIGITS)
}

fn year_rule() -> FieldRule {
    FieldRule::body()
        .int_in(MIN_YEAR.into(), MAX_YEAR.into(), YEAR_INVALID)
        .to_int()
}

/// `POST /movies/add` body.
pub fn create_movie_schema() -> Schema {
    Schema::new()
        .field("title", title_rule().required(TITLE_REQUIRED))
        .field("year", year_rule().required(YEAR_REQUIRED))
}

/// `PUT /movies/:id` body. Every field optional.
pub fn update_movie_schema() -> Schema {
    Schema::new()
        .field("title", title_rule().optional())
        .field("year", year_rule().optional())
}

/// `GET /movies/search/name` query.
pub fn search_by_name_schema() -> Schema {
    Schema::new().field(
        "name",
        FieldRule::query()
            .required(NAME_REQUIRED)
            .string(NAME_NOT_TEXT)
            .trim()
            .min_length(1, NAME_TOO_SHORT),
    )
}

/// `GET /movies/search` query.
pub fn search_by_min_year_schema() -> Schema {
    Schema::new().field(
        "minYear",
        FieldRule::query()
            .required(MIN_YEAR_REQUIRED)
            .int_in(SEARCH_MIN_YEAR, SEARCH_MAX_YEAR, MIN_YEAR_INVALID)
            .to_int(),
    )
}

/// `GET /movies/export` query. Both filters optional.
pub fn export_filter_schema() -> Schema {
    Schema::new()
        .field("name", FieldRule::query().string(NAME_NOT_TEXT).trim())
        .field(
            "minYear",
            FieldRule::query()
                .int_in(SEARCH_MIN_YEAR, SEARCH_MAX_YEAR, MIN_YEAR_INVALID)
                .to_int(),
        )
}

/// One imported CSV row. Values are raw strings; empty cells are removed
/// before validation so they count as missing.
pub fn csv_row_schema() -> Schema {
    Schema::new()
        .field("title", title_rule().required(TITLE_REQUIRED))
        .field(
            "year",
            FieldRule::body()
                .required(YEAR_REQUIRED)
                .trim()
                .integer(YEAR_NOT_INTEGER)
                .range(MIN_YEAR.into(), MAX_YEAR.into(), YEAR_OUT_OF_RANGE)
                .to_int(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFailure;
    use crate::validation::{validate, ValidationOptions};
    use serde_json::{json, Map, Value};

    fn run(schema: Schema, payload: Value) -> Result<Map<String, Value>, ValidationFailure> {
        validate(
            &schema,
            payload.as_object().unwrap(),
            ValidationOptions::default(),
        )
    }

    #[test]
    fn test_has_no_digits() {
        assert!(has_no_digits("The Matrix"));
        assert!(!has_no_digits("Blade Runner 2049"));
    }

    #[test]
    fn test_create_accepts_valid_movie() {
        let data = run(create_movie_schema(), json!({ "title": "Heat", "year": 1995 })).unwrap();
        assert_eq!(data["title"], "Heat");
        assert_eq!(data["year"], 1995);
    }

    #[test]
    fn test_create_bounds() {
        assert!(run(create_movie_schema(), json!({ "title": "Ab", "year": 1888 })).is_ok());
        assert!(run(create_movie_schema(), json!({ "title": "A", "year": 1888 })).is_err());
        assert!(run(create_movie_schema(), json!({ "title": "Ab", "year": 1887 })).is_err());
        assert!(run(create_movie_schema(), json!({ "title": "Ab", "year": 2101 })).is_err());

        let long_title = "a".repeat(101);
        let err = run(create_movie_schema(), json!({ "title": long_title, "year": 2000 }))
            .unwrap_err();
        assert_eq!(err.messages(), vec![TITLE_LENGTH]);
    }

    #[test]
    fn test_create_reports_every_field() {
        let err = run(create_movie_schema(), json!({ "title": "Se7en", "year": "soon" }))
            .unwrap_err();
        assert_eq!(err.messages(), vec![TITLE_HAS_DIGITS, YEAR_INVALID]);

        let err = run(create_movie_schema(), json!({})).unwrap_err();
        assert_eq!(err.messages(), vec![TITLE_REQUIRED, YEAR_REQUIRED]);
    }

    #[test]
    fn test_title_checked_after_trim() {
        let err = run(create_movie_schema(), json!({ "title": "  a  ", "year": 2000 }))
            .unwrap_err();
        assert_eq!(err.messages(), vec![TITLE_LENGTH]);
    }

    #[test]
    fn test_update_fields_optional() {
        let data = run(update_movie_schema(), json!({ "year": "2001" })).unwrap();
        assert_eq!(data["year"], 2001);
        assert!(!data.contains_key("title"));

        let err = run(update_movie_schema(), json!({ "title": 42 })).unwrap_err();
        assert_eq!(err.messages(), vec![TITLE_NOT_TEXT]);
    }

    #[test]
    fn test_search_schemas() {
        let data = run(search_by_min_year_schema(), json!({ "minYear": "2000" })).unwrap();
        assert_eq!(data["minYear"], 2000);

        let err = run(search_by_min_year_schema(), json!({ "minYear": "abc" })).unwrap_err();
        assert_eq!(err.messages(), vec![MIN_YEAR_INVALID]);

        let err = run(search_by_min_year_schema(), json!({})).unwrap_err();
        assert_eq!(err.messages(), vec![MIN_YEAR_REQUIRED]);

        let err = run(search_by_name_schema(), json!({ "name": "   " })).unwrap_err();
        assert_eq!(err.messages(), vec![NAME_TOO_SHORT]);
    }

    #[test]
    fn test_csv_row_messages() {
        let err = run(csv_row_schema(), json!({ "title": "Bad1", "year": "abc" })).unwrap_err();
        assert_eq!(err.messages(), vec![TITLE_HAS_DIGITS, YEAR_NOT_INTEGER]);

        let err = run(csv_row_schema(), json!({ "title": "Metropolis", "year": "1500" }))
            .unwrap_err();
        assert_eq!(err.messages(), vec![YEAR_OUT_OF_RANGE]);
    }
}
