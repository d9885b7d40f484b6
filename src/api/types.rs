use serde::Serialize;
use serde_json::{Map, Value};

use super::pagination::PageMeta;
use super::validate::{field_string, Validated};

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterAttendance {
    pub user_id: String,
    pub email: String,
}

impl Validated for RegisterAttendance {
    const REQUIRED: &'static [&'static str] = &["user_id", "email"];

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            user_id: field_string(fields, "user_id"),
            email: field_string(fields, "email"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFavorite {
    pub user_id: String,
    pub movie_id: String,
    pub title: String,
    pub poster_url: String,
}

impl Validated for CreateFavorite {
    const REQUIRED: &'static [&'static str] = &["user_id", "movie_id", "title", "poster_url"];

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            user_id: field_string(fields, "user_id"),
            movie_id: field_string(fields, "movie_id"),
            title: field_string(fields, "title"),
            poster_url: field_string(fields, "poster_url"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// The row the store echoed back, or the payload we sent when it didn't.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InsertedRow<T> {
    Stored(Value),
    Sent(T),
}

impl<T> InsertedRow<T> {
    pub fn new(stored: Option<Value>, sent: T) -> Self {
        match stored {
            Some(row) => InsertedRow::Stored(row),
            None => InsertedRow::Sent(sent),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MoviesPage {
    pub data: Vec<Value>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::validate::parse_lenient;

    #[test]
    fn test_favorite_fields_coerced() {
        let body = parse_lenient(
            br#"{"user_id":"u1","movie_id":42,"title":"X","poster_url":"http://p"}"#,
        );
        let fav = CreateFavorite::from_fields(&body);
        assert_eq!(fav.movie_id, "42");
        assert_eq!(fav.title, "X");
    }
}
