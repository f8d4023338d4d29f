//! Specimen graph walk
//!
//! A walk fetches the ancestor or descendant graph of one NHash id, fetches
//! and maps every node that has not been generated yet, and finally rewrites
//! parent references from NHash ids to object ids.

use super::client::SpecimenSource;
use super::error::Result;
use super::mapping::generate_bican_object;
use crate::models::library_generation::BicanObject;
use crate::progress;
use bkbit_common::jsonld::{JsonLdDocument, LIBRARY_GENERATION_CONTEXT};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Concurrent node fetches per walk
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkDirection {
    /// From the node up to its donor
    #[default]
    Ancestors,
    /// From the node down to its library pools
    Descendants,
}

pub struct SpecimenTranslator<'a, S: SpecimenSource + ?Sized> {
    source: &'a S,
    /// Objects as mapped, with parents still given as NHash ids
    unlinked: BTreeMap<String, BicanObject>,
    generated: BTreeMap<String, BicanObject>,
    concurrency: usize,
}

impl<'a, S: SpecimenSource + ?Sized> SpecimenTranslator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            unlinked: BTreeMap::new(),
            generated: BTreeMap::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Generated objects keyed by NHash id
    pub fn generated(&self) -> &BTreeMap<String, BicanObject> {
        &self.generated
    }

    pub async fn parse_async(&mut self, nhash_id: &str, direction: WalkDirection) -> Result<()> {
        match direction {
            WalkDirection::Ancestors => self.parse_nhash_id_bottom_up(nhash_id).await,
            WalkDirection::Descendants => self.parse_nhash_id_top_down(nhash_id).await,
        }
    }

    /// Walk from `nhash_id` to the root of its provenance graph
    pub async fn parse_nhash_id_bottom_up(&mut self, nhash_id: &str) -> Result<()> {
        let ancestors = self.source.get_ancestors(nhash_id).await?;

        let pending: Vec<(String, Option<Vec<String>>)> = ancestors
            .data
            .iter()
            .filter(|(id, _)| !self.unlinked.contains_key(*id))
            .map(|(id, node)| (id.clone(), node.edges.has_parent.clone()))
            .collect();
        debug!(nhash_id, nodes = ancestors.data.len(), pending = pending.len(), "Fetched ancestor graph");

        let pb = progress::create_progress_bar(
            pending.len() as u64,
            &format!("Processing ancestors of {}", nhash_id),
        );
        let source = self.source;
        let results: Vec<(String, Result<BicanObject>)> = stream::iter(pending)
            .map(|(id, parents)| {
                let pb = pb.clone();
                async move {
                    let generated: Result<BicanObject> = async {
                        let record = source.get_data(&id).await?;
                        generate_bican_object(&record, parents.as_deref())
                    }
                    .await;
                    pb.inc(1);
                    (id, generated)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        pb.finish_and_clear();

        self.store(results);
        self.link_parents();
        Ok(())
    }

    /// Walk from `nhash_id` to the leaves of its provenance graph
    pub async fn parse_nhash_id_top_down(&mut self, nhash_id: &str) -> Result<()> {
        let descendants = self.source.get_descendants(nhash_id).await?;

        let pending: Vec<String> = descendants
            .data
            .keys()
            .filter(|id| !self.unlinked.contains_key(*id))
            .cloned()
            .collect();
        debug!(nhash_id, nodes = descendants.data.len(), pending = pending.len(), "Fetched descendant graph");

        let pb = progress::create_progress_bar(
            pending.len() as u64,
            &format!("Processing descendants of {}", nhash_id),
        );
        let source = self.source;
        let results: Vec<(String, Result<BicanObject>)> = stream::iter(pending)
            .map(|id| {
                let pb = pb.clone();
                async move {
                    let generated: Result<BicanObject> = async {
                        let record = source.get_data(&id).await?;
                        let parents = source.get_ancestors(&id).await?.parents_of(&id);
                        generate_bican_object(&record, parents.as_deref())
                    }
                    .await;
                    pb.inc(1);
                    (id, generated)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        pb.finish_and_clear();

        self.store(results);
        self.link_parents();
        Ok(())
    }

    fn store(&mut self, results: Vec<(String, Result<BicanObject>)>) {
        for (nhash_id, result) in results {
            match result {
                Ok(object) => {
                    self.unlinked.insert(nhash_id, object);
                },
                Err(e) => warn!(nhash_id = %nhash_id, error = %e, "Skipping node"),
            }
        }
    }

    /// Rebuild every generated object with parent NHash ids rewritten to object ids
    ///
    /// Parents that were not generated are dropped. Linking starts from the
    /// mapped objects each time, so a parent generated by a later walk is
    /// picked up by objects from earlier walks.
    pub fn link_parents(&mut self) {
        let object_ids: BTreeMap<&str, String> = self
            .unlinked
            .iter()
            .map(|(nhash_id, object)| (nhash_id.as_str(), object.id().to_string()))
            .collect();

        self.generated = self
            .unlinked
            .iter()
            .map(|(nhash_id, object)| {
                let mut object = object.clone();
                object.relink_parents(|parent| object_ids.get(parent).cloned());
                (nhash_id.clone(), object)
            })
            .collect();
    }

    /// Generated objects as a library generation JSON-LD document
    pub fn to_jsonld(&self) -> Result<JsonLdDocument> {
        let mut document = JsonLdDocument::new(LIBRARY_GENERATION_CONTEXT);
        for object in self.generated.values() {
            document.push(object)?;
        }
        Ok(document)
    }

    pub fn serialize_to_jsonld(&self) -> Result<String> {
        Ok(self.to_jsonld()?.to_pretty_string()?)
    }
}

/// NHash ids listed one per line; blank lines are skipped
pub fn read_nhash_ids(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Translate one NHash id into its own JSON-LD document
pub async fn translate_one<S: SpecimenSource + ?Sized>(
    source: &S,
    nhash_id: &str,
    direction: WalkDirection,
) -> Result<String> {
    let mut translator = SpecimenTranslator::new(source);
    translator.parse_async(nhash_id, direction).await?;
    translator.serialize_to_jsonld()
}

/// Translate each id independently, writing `<output_dir>/<nhash>.jsonld`
///
/// Returns the written files; ids whose walk failed are logged and skipped.
pub async fn translate_many<S: SpecimenSource + ?Sized>(
    source: &S,
    nhash_ids: &[String],
    direction: WalkDirection,
    output_dir: &Path,
    concurrency: usize,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(output_dir).await?;

    let results: Vec<(String, Result<PathBuf>)> = stream::iter(nhash_ids.iter().cloned())
        .map(|nhash_id| async move {
            let written: Result<PathBuf> = async {
                let jsonld = translate_one(source, &nhash_id, direction).await?;
                let path = output_dir.join(format!("{}.jsonld", nhash_id));
                tokio::fs::write(&path, jsonld).await?;
                Ok(path)
            }
            .await;
            (nhash_id, written)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut written = Vec::with_capacity(results.len());
    for (nhash_id, result) in results {
        match result {
            Ok(path) => {
                info!(nhash_id = %nhash_id, path = %path.display(), "Wrote JSON-LD");
                written.push(path);
            },
            Err(e) => warn!(nhash_id = %nhash_id, error = %e, "Failed to translate NHash id"),
        }
    }
    written.sort();
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::specimen::error::SpecimenError;
    use crate::specimen::types::{GraphResponse, NodeRecord};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Library aliquot <- library <- amplified cDNA, with an unknown category above
    struct FakePortal {
        info_calls: AtomicUsize,
        library_unavailable: AtomicBool,
    }

    impl FakePortal {
        fn new() -> Self {
            Self {
                info_calls: AtomicUsize::new(0),
                library_unavailable: AtomicBool::new(false),
            }
        }

        fn graph() -> Value {
            json!({
                "LA-1": {"edges": {"has_parent": ["LI-1"]}},
                "LI-1": {"edges": {"has_parent": ["AC-1"]}},
                "AC-1": {"edges": {"has_parent": ["RN-1"]}},
                "RN-1": {"edges": {"has_parent": null}}
            })
        }
    }

    #[async_trait]
    impl SpecimenSource for FakePortal {
        async fn get_data(&self, nhash_id: &str) -> Result<NodeRecord> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            if nhash_id == "LI-1" && self.library_unavailable.load(Ordering::SeqCst) {
                return Err(SpecimenError::Status {
                    nhash_id: nhash_id.to_string(),
                    status: 503,
                });
            }
            let value = match nhash_id {
                "LA-1" => json!({"id": "LA-1", "category": "Library Aliquot",
                    "record": {"library_aliquot_local_name": "NY-AT16001-9"}}),
                "LI-1" => json!({"id": "LI-1", "category": "Library",
                    "record": {"library_local_name": "L8XA", "library_avg_size_bp": 889.0}}),
                "AC-1" => json!({"id": "AC-1", "category": "Amplified cDNA",
                    "record": {"amplified_cdna_local_name": "AC"}}),
                "RN-1" => json!({"id": "RN-1", "category": "Sequencing Run", "record": {}}),
                other => {
                    return Err(SpecimenError::Status {
                        nhash_id: other.to_string(),
                        status: 404,
                    })
                },
            };
            Ok(serde_json::from_value(value).unwrap())
        }

        async fn get_ancestors(&self, nhash_id: &str) -> Result<GraphResponse> {
            if nhash_id == "BAD" {
                return Err(SpecimenError::Portal("unknown id".to_string()));
            }
            Ok(serde_json::from_value(json!({"data": Self::graph()})).unwrap())
        }

        async fn get_descendants(&self, _nhash_id: &str) -> Result<GraphResponse> {
            Ok(serde_json::from_value(json!({"data": {
                "AC-1": {"edges": {"has_child": ["LI-1"]}},
                "LI-1": {"edges": {"has_child": ["LA-1"]}},
                "LA-1": {"edges": {"has_child": null}}
            }}))
            .unwrap())
        }
    }

    #[tokio::test]
    async fn test_bottom_up_links_parents_to_object_ids() {
        let portal = FakePortal::new();
        let mut translator = SpecimenTranslator::new(&portal);
        translator.parse_nhash_id_bottom_up("LA-1").await.unwrap();

        let generated = translator.generated();
        assert_eq!(generated.len(), 3);
        assert!(!generated.contains_key("RN-1"));

        let library_id = generated["LI-1"].id().to_string();
        assert_eq!(generated["LA-1"].was_derived_from(), vec![library_id.as_str()]);
        let cdna_id = generated["AC-1"].id().to_string();
        assert_eq!(generated["LI-1"].was_derived_from(), vec![cdna_id.as_str()]);
        assert!(generated["AC-1"].was_derived_from().is_empty());
    }

    #[tokio::test]
    async fn test_top_down_reads_parents_from_ancestors() {
        let portal = FakePortal::new();
        let mut translator = SpecimenTranslator::new(&portal);
        translator.parse_nhash_id_top_down("AC-1").await.unwrap();

        let generated = translator.generated();
        assert_eq!(generated.len(), 3);
        let library_id = generated["LI-1"].id().to_string();
        assert_eq!(generated["LA-1"].was_derived_from(), vec![library_id.as_str()]);
    }

    #[tokio::test]
    async fn test_generated_nodes_are_not_fetched_again() {
        let portal = FakePortal::new();
        let mut translator = SpecimenTranslator::new(&portal);
        translator.parse_nhash_id_bottom_up("LA-1").await.unwrap();
        let calls = portal.info_calls.load(Ordering::SeqCst);
        assert_eq!(calls, 4);

        translator.parse_nhash_id_bottom_up("LA-1").await.unwrap();
        // only the unsupported node is retried
        assert_eq!(portal.info_calls.load(Ordering::SeqCst), calls + 1);

        let library_id = translator.generated()["LI-1"].id().to_string();
        assert_eq!(translator.generated()["LA-1"].was_derived_from(), vec![library_id.as_str()]);
    }

    #[tokio::test]
    async fn test_later_walk_links_parent_missing_from_earlier_walk() {
        let portal = FakePortal::new();
        portal.library_unavailable.store(true, Ordering::SeqCst);
        let mut translator = SpecimenTranslator::new(&portal);
        translator.parse_nhash_id_bottom_up("LA-1").await.unwrap();
        assert!(!translator.generated().contains_key("LI-1"));
        assert!(translator.generated()["LA-1"].was_derived_from().is_empty());

        portal.library_unavailable.store(false, Ordering::SeqCst);
        translator.parse_nhash_id_bottom_up("LI-1").await.unwrap();

        let generated = translator.generated();
        let library_id = generated["LI-1"].id().to_string();
        assert_eq!(generated["LA-1"].was_derived_from(), vec![library_id.as_str()]);
        let cdna_id = generated["AC-1"].id().to_string();
        assert_eq!(generated["LI-1"].was_derived_from(), vec![cdna_id.as_str()]);
    }

    #[tokio::test]
    async fn test_root_failure_is_error() {
        let portal = FakePortal::new();
        let mut translator = SpecimenTranslator::new(&portal);
        let err = translator.parse_nhash_id_bottom_up("BAD").await.unwrap_err();
        assert!(matches!(err, SpecimenError::Portal(_)));
    }

    #[tokio::test]
    async fn test_serialize_orders_by_nhash_id() {
        let portal = FakePortal::new();
        let mut translator = SpecimenTranslator::new(&portal);
        translator.parse_nhash_id_bottom_up("LA-1").await.unwrap();

        let output: Value = serde_json::from_str(&translator.serialize_to_jsonld().unwrap()).unwrap();
        assert_eq!(output["@context"], LIBRARY_GENERATION_CONTEXT);
        let xrefs: Vec<&str> = output["@graph"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["xref"][0].as_str().unwrap())
            .collect();
        assert_eq!(xrefs, vec!["NIMP:AC-1", "NIMP:LA-1", "NIMP:LI-1"]);
    }

    #[tokio::test]
    async fn test_translate_many_writes_one_file_per_id() {
        let portal = FakePortal::new();
        let dir = tempfile::tempdir().unwrap();
        let ids = vec!["LA-1".to_string(), "BAD".to_string()];

        let written = translate_many(&portal, &ids, WalkDirection::Ancestors, dir.path(), 2)
            .await
            .unwrap();
        assert_eq!(written, vec![dir.path().join("LA-1.jsonld")]);
        assert!(!dir.path().join("BAD.jsonld").exists());
    }

    #[test]
    fn test_read_nhash_ids_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "LA-1\n\n  LP-2  \n").unwrap();
        assert_eq!(read_nhash_ids(&path).unwrap(), vec!["LA-1", "LP-2"]);
    }
}
