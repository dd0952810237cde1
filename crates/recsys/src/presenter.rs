//! Result tables
//!
//! Ranked predictions are rendered for two audiences: a new user (prediction
//! only, one row per movie) and an existing user (prediction joined with the
//! user's own rating and the user's average for the movie's genre).

use crate::catalog::MovieCatalog;
use crate::error::{RecsysError, Result};
use crate::layout::{FeatureLayout, ITEM_AVERAGE_COLUMN, ITEM_ID_COLUMN, USER_ID_COLUMN};
use crate::predictor::Prediction;
use crate::types::MovieId;
use ndarray::{ArrayView1, ArrayView2};
use serde::Serialize;
use std::collections::HashSet;

pub const NEW_USER_HEADERS: [&str; 5] = ["y_p", "movie id", "rating ave", "title", "genres"];
pub const EXISTING_USER_HEADERS: [&str; 7] = [
    "y_p",
    "y",
    "user",
    "user genre ave",
    "movie rating ave",
    "title",
    "genres",
];

/// Number formatting for a float column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FloatFormat {
    /// Six significant digits, trailing zeros trimmed (printf `%g`)
    General,
    /// Fixed number of decimals (printf `%.Nf`)
    Fixed(usize),
}

impl FloatFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            FloatFormat::Fixed(decimals) => format!("{:.*}", decimals, value),
            FloatFormat::General => format_general(value),
        }
    }
}

fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let exponent = value.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= PRECISION {
        let mantissa = format!("{:.*e}", (PRECISION - 1) as usize, value);
        return match mantissa.split_once('e') {
            Some((digits, exp)) => format!("{}e{}", trim_fraction(digits), exp),
            None => mantissa,
        };
    }

    let decimals = (PRECISION - 1 - exponent).max(0) as usize;
    trim_fraction(&format!("{:.*}", decimals, value)).to_string()
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Float(f64),
    Int(i64),
    Text(String),
}

impl Cell {
    fn is_numeric(&self) -> bool {
        !matches!(self, Cell::Text(_))
    }
}

/// Header row plus data rows, with per-column float formats
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    #[serde(skip)]
    float_formats: Vec<FloatFormat>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            float_formats: Vec::new(),
        }
    }

    /// Formats for the leading float columns; later columns use `General`
    pub fn with_float_formats(mut self, formats: Vec<FloatFormat>) -> Self {
        self.float_formats = formats;
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text of a cell as it appears in the rendered table
    pub fn cell_text(&self, column: usize, cell: &Cell) -> String {
        match cell {
            Cell::Float(v) => self
                .float_formats
                .get(column)
                .copied()
                .unwrap_or(FloatFormat::General)
                .format(*v),
            Cell::Int(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Render as an HTML `<table>` with a `<thead>` header row
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>\n<thead>\n<tr>");
        for header in &self.headers {
            html.push_str(&format!("<th>{}</th>", escape_html(header)));
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");

        for row in &self.rows {
            html.push_str("<tr>");
            for (column, cell) in row.iter().enumerate() {
                let text = escape_html(&self.cell_text(column, cell));
                if cell.is_numeric() {
                    html.push_str(&format!("<td style=\"text-align: right;\">{}</td>", text));
                } else {
                    html.push_str(&format!("<td>{}</td>", text));
                }
            }
            html.push_str("</tr>\n");
        }

        html.push_str("</tbody>\n</table>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Decode an item's one-hot genre block into `(genre name, offset)`
///
/// The first set indicator wins. An item without any set indicator violates
/// the item matrix contract and yields `MissingGenre`.
pub fn get_item_genre<'a>(
    item: ArrayView1<f64>,
    layout: &'a FeatureLayout,
) -> Result<(&'a str, usize)> {
    let start = layout.item_vector_start();
    let movie_id = item[ITEM_ID_COLUMN] as MovieId;

    let offset = item
        .iter()
        .skip(start)
        .position(|v| *v == 1.0)
        .ok_or(RecsysError::MissingGenre(movie_id))?;

    let genre = layout
        .genre_name(offset)
        .ok_or(RecsysError::MissingGenre(movie_id))?;
    Ok((genre, offset))
}

/// Ranked movies for a new user, one row per distinct movie
///
/// Duplicate movie ids (the same movie paired with different user-context
/// rows) are skipped and do not count toward `max_count`.
pub fn render_new_user(
    prediction: &Prediction,
    catalog: &MovieCatalog,
    max_count: usize,
) -> Result<Table> {
    let mut table = Table::new(NEW_USER_HEADERS);
    let mut listed: HashSet<MovieId> = HashSet::new();

    for (score, item) in prediction.scores.iter().zip(prediction.items.rows()) {
        if table.len() == max_count {
            break;
        }
        let movie_id = item[ITEM_ID_COLUMN] as MovieId;
        if !listed.insert(movie_id) {
            continue;
        }
        table.push_row(vec![
            Cell::Float(*score),
            Cell::Int(movie_id),
            Cell::Float(item[ITEM_AVERAGE_COLUMN]),
            Cell::Text(catalog.title(movie_id)?.to_string()),
            Cell::Text(catalog.genres(movie_id)?.to_string()),
        ]);
    }

    Ok(table)
}

/// Ranked movies the user has already rated, joined with their own rating
///
/// `truth` must already be in ranked order (see [`Prediction::rank`]).
/// Unrated rows (`truth == 0`) are skipped.
pub fn render_existing_user(
    prediction: &Prediction,
    truth: ArrayView1<f64>,
    layout: &FeatureLayout,
    catalog: &MovieCatalog,
    max_count: usize,
) -> Result<Table> {
    if truth.len() != prediction.len() {
        return Err(RecsysError::shape(format!(
            "truth has {} entries, prediction has {}",
            truth.len(),
            prediction.len()
        )));
    }

    let mut table = Table::new(EXISTING_USER_HEADERS).with_float_formats(vec![
        FloatFormat::Fixed(1),
        FloatFormat::Fixed(1),
        FloatFormat::Fixed(0),
        FloatFormat::Fixed(2),
        FloatFormat::Fixed(2),
    ]);

    let ranked = prediction
        .scores
        .iter()
        .zip(truth.iter())
        .zip(prediction.users.rows())
        .zip(prediction.items.rows());

    for (((score, rating), user), item) in ranked {
        if *rating == 0.0 {
            continue;
        }
        if table.len() == max_count {
            break;
        }
        let movie_id = item[ITEM_ID_COLUMN] as MovieId;
        let (genre, offset) = get_item_genre(item, layout)?;
        let genre_rating = user[layout.user_genre_column(offset)];

        table.push_row(vec![
            Cell::Float(*score),
            Cell::Float(*rating),
            Cell::Int(user[USER_ID_COLUMN] as i64),
            Cell::Float(genre_rating),
            Cell::Float(item[ITEM_AVERAGE_COLUMN]),
            Cell::Text(catalog.title(movie_id)?.to_string()),
            Cell::Text(genre.to_string()),
        ]);
    }

    Ok(table)
}

/// First `max_count` rows of a training matrix under its feature headers
pub fn preview_rows(matrix: ArrayView2<f64>, features: &[String], max_count: usize) -> Result<Table> {
    if matrix.ncols() != features.len() {
        return Err(RecsysError::shape(format!(
            "matrix has {} columns, {} feature names given",
            matrix.ncols(),
            features.len()
        )));
    }

    let mut table = Table::new(features.iter().cloned());
    for row in matrix.rows().into_iter().take(max_count) {
        table.push_row(row.iter().map(|v| Cell::Float(*v)).collect());
    }
    Ok(table)
}

/// Insert a space mid-way into long single-word headers so they can wrap
pub fn split_str(features: &[String], max_len: usize) -> Vec<String> {
    features
        .iter()
        .map(|s| {
            if s.contains(' ') || s.chars().count() <= max_len {
                return s.clone();
            }
            let mid = s.chars().count() / 2;
            let head: String = s.chars().take(mid).collect();
            let tail: String = s.chars().skip(mid).collect();
            format!("{} {}", head, tail)
        })
        .collect()
}
