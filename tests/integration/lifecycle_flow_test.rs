//! Lifecycle flow integration tests.
//!
//! Drive the lifecycle manager against a real on-disk store with mock
//! collaborators: create a tool, reload the store, and reuse the same tool
//! for a similar query.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use toolforge::services::{LifecycleConfig, LifecycleManager};
use toolforge::{QueryContext, ToolStore};
use toolforge_core::{CoreResult, GenerationRequest, SnippetSearcher, ToolCandidate};

struct ScriptGenerator {
    calls: AtomicU32,
}

impl ScriptGenerator {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl toolforge_core::CodeGenerator for ScriptGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> CoreResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("echo 72F and sunny\n".to_string())
    }

    async fn extract_install_commands(&self, _guide: &str) -> CoreResult<Vec<String>> {
        Ok(vec![])
    }
}

struct NoCandidate;

#[async_trait]
impl SnippetSearcher for NoCandidate {
    async fn find_candidate(
        &self,
        _tool_type: &str,
        _description: &str,
    ) -> CoreResult<Option<ToolCandidate>> {
        Ok(None)
    }
}

#[tokio::test]
async fn created_tool_is_reused_after_reload() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = ScriptGenerator::new();
    let description = "Fetches current weather data for any location";

    // First pass: empty store, a tool gets created and persisted.
    let created_id = {
        let mut store = ToolStore::load(tmp.path()).unwrap();
        let mut lifecycle = LifecycleManager::new(
            &mut store,
            &generator,
            Some(&NoCandidate),
            LifecycleConfig::default(),
        );
        let query = QueryContext::with_hint("get the weather in tokyo", "weather api");
        let resolved = lifecycle.resolve(&query, description).await.unwrap();
        assert!(!resolved.reused);
        resolved.record.id
    };
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    // Second pass: fresh store instance from the same directory, a similar
    // query must reuse the persisted tool without another generation.
    let mut store = ToolStore::load(tmp.path()).unwrap();
    assert_eq!(store.len(), 1);

    let mut lifecycle = LifecycleManager::new(
        &mut store,
        &generator,
        Some(&NoCandidate),
        LifecycleConfig::default(),
    );
    let query = QueryContext::with_hint("what's the weather forecast for beijing", "weather api");
    let resolved = lifecycle.resolve(&query, description).await.unwrap();

    assert!(resolved.reused);
    assert_eq!(resolved.record.id, created_id);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unrelated_query_creates_second_tool() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = ScriptGenerator::new();

    let mut store = ToolStore::load(tmp.path()).unwrap();
    {
        let mut lifecycle = LifecycleManager::new(
            &mut store,
            &generator,
            None,
            LifecycleConfig::default(),
        );
        let query = QueryContext::with_hint("get the weather in tokyo", "weather api");
        lifecycle
            .resolve(&query, "Fetches current weather data for any location")
            .await
            .unwrap();
    }

    let mut lifecycle = LifecycleManager::new(
        &mut store,
        &generator,
        None,
        LifecycleConfig::default(),
    );
    let query = QueryContext::with_hint("translate this text to french", "translation api");
    let resolved = lifecycle
        .resolve(&query, "Translates text between languages")
        .await
        .unwrap();

    assert!(!resolved.reused);
    assert_eq!(store.len(), 2);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}
