/// Key-construction helpers for documents in the content store.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    pub fn document(&self, collection: &str, document_id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, document_id)
    }

    /// SCAN pattern matching every document of a collection.
    pub fn collection_pattern(&self, collection: &str) -> String {
        format!("{}:{}:*", self.prefix, collection)
    }
}

/// Extract the document id from a full key (last `:`-separated segment).
pub fn document_id_from_key(key: &str) -> &str {
    key.rsplit(':').next().unwrap_or(key)
}
