//! CSV export of the movie store.
//!
//! Output is a header `id,title,year` followed by one line per matching record.
//! Titles are always quoted with inner quotes doubled; id and year never are.
//! The last line carries no trailing newline.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{CsvError, CsvResult};
use crate::models::{Movie, MovieFilter};

/// Header row of every export.
pub const EXPORT_HEADER: [&str; 3] = ["id", "title", "year"];

/// `Content-Disposition` of a downloaded export.
pub const EXPORT_CONTENT_DISPOSITION: &str = "attachment; filename=\"movies_export.csv\"";

/// Serialize the movies matching `filter`, in the given order.
pub fn export_csv(movies: &[Movie], filter: &MovieFilter) -> CsvResult<String> {
    let mut lines = vec![EXPORT_HEADER.join(",")];
    for movie in movies.iter().filter(|m| filter.matches(m)) {
        lines.push(format!(
            "{},{},{}",
            movie.id,
            quote_title(&movie.title)?,
            movie.year
        ));
    }
    Ok(lines.join("\n"))
}

/// Title as a single CSV field, always quoted. (`QuoteStyle::NonNumeric` leaves
/// titles such as `NaN` or `Infinity` bare.)
fn quote_title(title: &str) -> CsvResult<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record([title])?;

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))?;
    let field = String::from_utf8(bytes).map_err(|e| CsvError::WriteError(e.to_string()))?;
    Ok(field.trim_end_matches('\n').to_string())
}
