//! A wiremock stand-in for the Firestore emulator
//!
//! Serves the two REST calls the browser makes (`runQuery` and
//! `runAggregationQuery`) for the `(default)` database of one project.
//!
//! # Example
//!
//! ```rust,no_run
//! use fire_test_helpers::emulator::{document_json, FirestoreEmulator};
//! use serde_json::json;
//!
//! # async fn example() {
//! let emulator = FirestoreEmulator::start("demo-project").await;
//! let doc = document_json("demo-project", "products", "abc123", json!({
//!     "name": {"stringValue": "Widget"}
//! }));
//! emulator.mount_documents(None, &[doc]).await;
//! emulator.mount_count(None, 1).await;
//! // FIRESTORE_EMULATOR_HOST=emulator.host()
//! # }
//! ```

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `readTime` attached to every canned response
pub const READ_TIME: &str = "2024-06-01T00:00:00.000000Z";

pub struct FirestoreEmulator {
    server: MockServer,
    project: String,
}

impl FirestoreEmulator {
    pub async fn start(project: &str) -> Self {
        Self {
            server: MockServer::start().await,
            project: project.to_string(),
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Value for `FIRESTORE_EMULATOR_HOST`
    pub fn host(&self) -> String {
        self.server.address().to_string()
    }

    /// `/v1/projects/{project}/databases/(default)/documents`
    pub fn documents_root_path(&self) -> String {
        format!("/v1/projects/{}/databases/(default)/documents", self.project)
    }

    fn parent_path(&self, parent: Option<&str>) -> String {
        match parent {
            Some(parent) => format!("{}/{}", self.documents_root_path(), parent),
            None => self.documents_root_path(),
        }
    }

    pub fn run_query_path(&self, parent: Option<&str>) -> String {
        format!("{}:runQuery", self.parent_path(parent))
    }

    pub fn aggregation_path(&self, parent: Option<&str>) -> String {
        format!("{}:runAggregationQuery", self.parent_path(parent))
    }

    /// Answer `runQuery` under `parent` with `documents`
    pub async fn mount_documents(&self, parent: Option<&str>, documents: &[Value]) {
        Mock::given(method("POST"))
            .and(path(self.run_query_path(parent)))
            .respond_with(ResponseTemplate::new(200).set_body_json(run_query_response(documents)))
            .mount(&self.server)
            .await;
    }

    /// Answer `runAggregationQuery` under `parent` with `total`
    pub async fn mount_count(&self, parent: Option<&str>, total: u64) {
        Mock::given(method("POST"))
            .and(path(self.aggregation_path(parent)))
            .respond_with(ResponseTemplate::new(200).set_body_json(count_response(total)))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Fail `runAggregationQuery` under `parent` with a Google error envelope
    pub async fn mount_count_failure(&self, parent: Option<&str>, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(self.aggregation_path(parent)))
            .respond_with(ResponseTemplate::new(status).set_body_json(error_response(
                status,
                "UNAVAILABLE",
                message,
            )))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Fail the test if `runAggregationQuery` is ever called under `parent`
    pub async fn expect_no_count(&self, parent: Option<&str>) {
        Mock::given(method("POST"))
            .and(path(self.aggregation_path(parent)))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

/// A Firestore REST document in `collection` of `project`
pub fn document_json(project: &str, collection: &str, id: &str, fields: Value) -> Value {
    json!({
        "name": format!(
            "projects/{}/databases/(default)/documents/{}/{}",
            project, collection, id
        ),
        "fields": fields,
        "createTime": "2024-01-01T00:00:00.000000Z",
        "updateTime": "2024-01-01T00:00:00.000000Z",
    })
}

/// A `runQuery` response stream; an empty slice yields the lone `readTime` entry
pub fn run_query_response(documents: &[Value]) -> Value {
    if documents.is_empty() {
        return json!([{ "readTime": READ_TIME }]);
    }
    Value::Array(
        documents
            .iter()
            .map(|doc| json!({ "document": doc, "readTime": READ_TIME }))
            .collect(),
    )
}

/// A `runAggregationQuery` response carrying `total` under the `total` alias
pub fn count_response(total: u64) -> Value {
    json!([{
        "result": {
            "aggregateFields": {
                "total": { "integerValue": total.to_string() }
            }
        },
        "readTime": READ_TIME,
    }])
}

/// Google API error envelope
pub fn error_response(status: u16, code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": status,
            "message": message,
            "status": code,
        }
    })
}
