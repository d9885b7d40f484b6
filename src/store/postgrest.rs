use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use serde_json::Value;
use tracing::debug;

use super::model::*;
use super::query::{Operation, Query};
use super::repo::Store;

/// Talks to a PostgREST endpoint, the REST layer of a hosted Supabase project.
pub struct PostgrestStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl PostgrestStore {
    pub fn new(url: &str, key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, urlencoding::encode(table))
    }

    fn request(&self, query: &Query) -> reqwest::RequestBuilder {
        let url = self.table_url(&query.table);
        let mut prefer = Vec::new();

        let mut req = match &query.operation {
            Operation::Select { columns } => {
                self.client.get(&url).query(&[("select", columns.as_str())])
            }
            Operation::Insert { row } => {
                prefer.push("return=representation");
                self.client.post(&url).json(row)
            }
        };

        let mut params: Vec<(String, String)> = query
            .filters
            .iter()
            .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
            .collect();
        if let Some(order) = &query.order {
            let dir = if order.descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if !params.is_empty() {
            req = req.query(&params);
        }

        if let Some(range) = query.range {
            req = req
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", range.start, range.end));
        }
        if query.count_exact {
            prefer.push("count=exact");
        }
        if !prefer.is_empty() {
            req = req.header("Prefer", prefer.join(","));
        }

        req.header("apikey", &self.key).bearer_auth(&self.key)
    }
}

/// Total row count from a `Content-Range` header such as `0-9/25` or `*/0`.
pub fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.split_once('/')?;
    total.trim().parse().ok()
}

fn rows_from_body(body: &[u8]) -> StoreResult<Vec<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Ok(match serde_json::from_slice(body)? {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        row => vec![row],
    })
}

#[async_trait]
impl Store for PostgrestStore {
    async fn execute(&self, query: &Query) -> StoreResult<QueryResponse> {
        debug!(table = %query.table, insert = query.is_insert(), "store request");

        let res = self.request(query).send().await?;
        let status = res.status();

        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let count = if query.count_exact {
            res.headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range)
        } else {
            None
        };

        let body = res.bytes().await?;
        let rows = rows_from_body(&body)?;

        Ok(QueryResponse { rows, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn store() -> PostgrestStore {
        PostgrestStore::new("https://abc.supabase.co/", "secret", Duration::from_secs(5)).unwrap()
    }

    fn query_map(req: &reqwest::Request) -> HashMap<String, String> {
        req.url().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-9/25"), Some(25));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_range_select_request() {
        let query = Query::table("movies").select("*").count_exact().range(10, 19);
        let req = store().request(&query).build().unwrap();

        assert_eq!(req.method(), reqwest::Method::GET);
        assert_eq!(req.url().path(), "/rest/v1/movies");
        assert_eq!(query_map(&req).get("select").map(String::as_str), Some("*"));
        assert_eq!(req.headers()["Range"], "10-19");
        assert_eq!(req.headers()["Range-Unit"], "items");
        assert_eq!(req.headers()["Prefer"], "count=exact");
        assert_eq!(req.headers()["apikey"], "secret");
        assert_eq!(req.headers()["Authorization"], "Bearer secret");
    }

    #[test]
    fn test_filtered_ordered_request() {
        let query = Query::table("favorites")
            .select("*")
            .eq("user_id", "u 1")
            .order("created_at", true);
        let req = store().request(&query).build().unwrap();

        let params = query_map(&req);
        assert_eq!(params.get("user_id").map(String::as_str), Some("eq.u 1"));
        assert_eq!(params.get("order").map(String::as_str), Some("created_at.desc"));
        assert!(req.headers().get("Range").is_none());
    }

    #[test]
    fn test_insert_request() {
        let query = Query::table("attendance").insert(json!({"user_id": "u1"}));
        let req = store().request(&query).build().unwrap();

        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.headers()["Prefer"], "return=representation");
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(sent, json!({"user_id": "u1"}));
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    fn fake_postgrest() -> axum::Router {
        use axum::http::{header, HeaderMap, StatusCode};
        use axum::routing::get;
        use axum::Json;

        axum::Router::new()
            .route(
                "/rest/v1/movies",
                get(|headers: HeaderMap| async move {
                    let range = headers
                        .get("Range")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("none")
                        .to_string();
                    (
                        StatusCode::PARTIAL_CONTENT,
                        [(header::CONTENT_RANGE, format!("{}/25", range))],
                        Json(json!([{ "id": 1 }, { "id": 2 }])),
                    )
                }),
            )
            .route(
                "/rest/v1/attendance",
                axum::routing::post(|Json(row): Json<Value>| async move {
                    (StatusCode::CREATED, Json(json!([row])))
                }),
            )
            .route(
                "/rest/v1/missing",
                get(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        r#"{"message":"relation \"public.missing\" does not exist"}"#,
                    )
                }),
            )
    }

    #[tokio::test]
    async fn test_execute_reads_rows_and_count() {
        let base = serve(fake_postgrest()).await;
        let store = PostgrestStore::new(&base, "secret", Duration::from_secs(5)).unwrap();

        let query = Query::table("movies").select("*").count_exact().range(0, 1);
        let res = store.execute(&query).await.unwrap();
        assert_eq!(res.rows.len(), 2);
        assert_eq!(res.count, Some(25));

        // without count_exact the header is ignored
        let res = store.execute(&Query::table("movies")).await.unwrap();
        assert_eq!(res.count, None);
    }

    #[tokio::test]
    async fn test_execute_insert_returns_representation() {
        let base = serve(fake_postgrest()).await;
        let store = PostgrestStore::new(&base, "secret", Duration::from_secs(5)).unwrap();

        let query = Query::table("attendance").insert(json!({ "user_id": "u1" }));
        let res = store.execute(&query).await.unwrap();
        assert_eq!(res.rows, vec![json!({ "user_id": "u1" })]);
    }

    #[tokio::test]
    async fn test_execute_maps_error_status() {
        let base = serve(fake_postgrest()).await;
        let store = PostgrestStore::new(&base, "secret", Duration::from_secs(5)).unwrap();

        match store.execute(&Query::table("missing")).await {
            Err(StoreError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_rows_from_body() {
        assert!(rows_from_body(b"").unwrap().is_empty());
        assert_eq!(rows_from_body(b"[{\"a\":1},{\"a\":2}]").unwrap().len(), 2);
        assert_eq!(rows_from_body(b"{\"a\":1}").unwrap().len(), 1);
        assert!(rows_from_body(b"not json").is_err());
    }
}
