//! JSON-LD graph documents

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

const CONTEXT_BASE: &str =
    "https://raw.githubusercontent.com/brain-bican/models/main/jsonld-context-autogen";

/// JSON-LD context for specimen and library generation graphs
pub const LIBRARY_GENERATION_CONTEXT: &str = "https://raw.githubusercontent.com/brain-bican/models/main/jsonld-context-autogen/library_generation.context.jsonld";

/// JSON-LD context for genome annotation graphs
pub const GENOME_ANNOTATION_CONTEXT: &str = "https://raw.githubusercontent.com/brain-bican/models/main/jsonld-context-autogen/genome_annotation.context.jsonld";

/// JSON-LD context for anatomical structure graphs
pub const ANATOMICAL_STRUCTURE_CONTEXT: &str = "https://raw.githubusercontent.com/brain-bican/models/main/jsonld-context-autogen/anatomical_structure.context.jsonld";

/// Context URL for a published BICAN model name
pub fn context_url(model: &str) -> String {
    format!("{}/{}.context.jsonld", CONTEXT_BASE, model)
}

/// A `{"@context": ..., "@graph": [...]}` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonLdDocument {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@graph")]
    pub graph: Vec<Value>,
}

impl JsonLdDocument {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            graph: Vec::new(),
        }
    }

    /// Append a serializable node to the graph
    pub fn push<T: Serialize>(&mut self, node: &T) -> Result<()> {
        self.graph.push(serde_json::to_value(node)?);
        Ok(())
    }

    pub fn extend<'a, T, I>(&mut self, nodes: I) -> Result<()>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for node in nodes {
            self.push(node)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Two-space indented JSON text
    pub fn to_pretty_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_pretty_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_layout() {
        let mut doc = JsonLdDocument::new(GENOME_ANNOTATION_CONTEXT);
        doc.push(&json!({"id": "urn:bkbit:1"})).unwrap();

        let text = doc.to_pretty_string().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["@context"], GENOME_ANNOTATION_CONTEXT);
        assert_eq!(parsed["@graph"][0]["id"], "urn:bkbit:1");
        assert!(text.contains("\n  \"@graph\""));
    }

    #[test]
    fn test_context_url() {
        assert_eq!(context_url("library_generation"), LIBRARY_GENERATION_CONTEXT);
        assert_eq!(context_url("anatomical_structure"), ANATOMICAL_STRUCTURE_CONTEXT);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.jsonld");
        let doc = JsonLdDocument::new(LIBRARY_GENERATION_CONTEXT);
        doc.write_to_file(&path).unwrap();
        let read: JsonLdDocument =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(read.is_empty());
    }
}
