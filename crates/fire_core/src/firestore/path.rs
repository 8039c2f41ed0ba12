//! Collection path parsing
//!
//! `products` names a root collection, `users/alice/orders` a subcollection of
//! the document `users/alice`.

use fire_common::{FireError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath {
    /// Parent document path, `None` for root collections
    parent: Option<String>,
    collection_id: String,
}

impl CollectionPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| FireError::InvalidCollectionPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("path is empty"));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        for segment in &segments {
            if segment.is_empty() {
                return Err(invalid("path contains an empty segment"));
            }
            if *segment == "." || *segment == ".." {
                return Err(invalid("'.' and '..' are not valid ids"));
            }
            if segment.len() >= 4 && segment.starts_with("__") && segment.ends_with("__") {
                return Err(invalid("ids of the form __id__ are reserved"));
            }
            if segment.contains(|c: char| c == '?' || c == '#') {
                return Err(invalid("ids cannot contain '?' or '#'"));
            }
        }

        if segments.len() % 2 == 0 {
            return Err(invalid(
                "a collection path needs an odd number of segments",
            ));
        }

        let (collection_id, parent) = match segments.split_last() {
            Some((last, rest)) => (last.to_string(), rest),
            None => return Err(invalid("path is empty")),
        };

        Ok(Self {
            parent: (!parent.is_empty()).then(|| parent.join("/")),
            collection_id,
        })
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// URL of the parent resource under `documents_root`
    pub fn parent_url(&self, documents_root: &str) -> String {
        match &self.parent {
            Some(parent) => format!("{}/{}", documents_root, parent),
            None => documents_root.to_string(),
        }
    }
}
