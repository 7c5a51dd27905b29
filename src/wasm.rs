//! WASM bindings: `ClusterCortex`
//!
//! Exposes result clustering, hit partitioning, query embedding and an async
//! search that delegates retrieval to a JS callback. Every binding is a thin
//! wrapper over a native method returning `Result<_, String>`, so the logic
//! stays testable off-wasm.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::cluster::cluster_results;
use crate::config::{ClusterConfig, SearchConfig};
use crate::embeddings::{EmbedConfig, EmbedModel, QueryEmbedder};
use crate::request::SearchRequest;
use crate::retrieval::{partition_hits, SearchHit};
use crate::types::{GroupedOutput, ItemType, ResultSet};
use crate::{console_error, console_log};

/// Everything `withConfig` accepts; omitted sections keep their defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CortexConfig {
    pub cluster: ClusterConfig,
    pub search: SearchConfig,
    pub embed: EmbedConfig,
}

#[wasm_bindgen]
pub struct ClusterCortex {
    model: Option<EmbedModel>,
    config: CortexConfig,
}

impl Default for ClusterCortex {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ClusterCortex {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_config(CortexConfig::default())
    }

    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_js: JsValue) -> Result<ClusterCortex, JsValue> {
        let config: CortexConfig = serde_wasm_bindgen::from_value(config_js)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        Ok(Self::from_config(config))
    }

    /// Cluster `{ query, similar_patents, similar_research }` into labeled groups
    #[wasm_bindgen(js_name = clusterResults)]
    pub fn cluster_results_js(&self, results_js: JsValue) -> Result<JsValue, JsValue> {
        let results: ResultSet = serde_wasm_bindgen::from_value(results_js)
            .map_err(|e| JsValue::from_str(&format!("Invalid result set: {}", e)))?;
        to_js(&self.cluster(results))
    }

    /// Split raw index hits into a result set
    #[wasm_bindgen(js_name = partitionHits)]
    pub fn partition_hits_js(&self, query: &str, hits_js: JsValue) -> Result<JsValue, JsValue> {
        let hits: Vec<SearchHit> = serde_wasm_bindgen::from_value(hits_js)
            .map_err(|e| JsValue::from_str(&format!("Invalid hits: {}", e)))?;
        to_js(&partition_hits(query, hits))
    }

    /// Load the query embedding model
    ///
    /// # Arguments
    /// * `model_bytes` - ONNX model file contents
    /// * `tokenizer_json` - tokenizer.json contents
    #[wasm_bindgen(js_name = loadModel)]
    pub fn load_model(&mut self, model_bytes: &[u8], tokenizer_json: &str) -> Result<(), JsValue> {
        let model = EmbedModel::from_bytes(model_bytes, tokenizer_json, self.config.embed.clone())
            .map_err(|e| {
                console_error!("[ClusterCortex] model load failed: {}", e);
                JsValue::from_str(&format!("Model load failed: {}", e))
            })?;
        console_log!("[ClusterCortex] loaded {} ({} dims)", self.config.embed.model, model.dimensions());
        self.model = Some(model);
        Ok(())
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    #[wasm_bindgen(js_name = embedQuery)]
    pub fn embed_query_js(&self, text: &str) -> Result<Vec<f32>, JsValue> {
        self.embed_query(text).map_err(|e| JsValue::from_str(&e))
    }

    /// Embed, retrieve through `search_fn(vector, limit)`, then cluster
    ///
    /// `search_fn` may return hits directly or a Promise of hits.
    #[wasm_bindgen]
    pub fn search(
        &self,
        query: &str,
        top_k: Option<u32>,
        search_fn: js_sys::Function,
    ) -> Result<js_sys::Promise, JsValue> {
        let request = SearchRequest {
            query: query.to_string(),
            top_k: top_k.map(|k| k as usize),
        }
        .validate(&self.config.search)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let vector = self.embed_query(&request.query).map_err(|e| JsValue::from_str(&e))?;
        let cluster_config = self.config.cluster.clone();

        Ok(future_to_promise(async move {
            let vector_js = js_sys::Float32Array::from(vector.as_slice());
            let returned = search_fn.call2(&JsValue::NULL, &vector_js, &JsValue::from(request.top_k as u32))?;
            let resolved = JsFuture::from(js_sys::Promise::resolve(&returned)).await?;

            let hits: Vec<SearchHit> = serde_wasm_bindgen::from_value(resolved)
                .map_err(|e| JsValue::from_str(&format!("Invalid hits: {}", e)))?;
            let results = partition_hits(request.query, hits);
            to_js(&cluster_results(&results, &cluster_config))
        }))
    }

    #[wasm_bindgen(js_name = getDimensions)]
    pub fn get_dimensions(&self) -> u32 {
        self.config.embed.dimensions() as u32
    }
}

impl ClusterCortex {
    pub fn from_config(config: CortexConfig) -> Self {
        ClusterCortex { model: None, config }
    }

    pub fn config(&self) -> &CortexConfig {
        &self.config
    }

    /// Cluster a result set; list membership decides each record's type
    pub fn cluster(&self, mut results: ResultSet) -> GroupedOutput {
        for record in results.similar_patents.iter_mut() {
            record.item_type = ItemType::Patent;
        }
        for record in results.similar_research.iter_mut() {
            record.item_type = ItemType::Research;
        }
        cluster_results(&results, &self.config.cluster)
    }

    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>, String> {
        let model = self.model.as_ref().ok_or_else(|| "Model not loaded".to_string())?;
        model.embed_query(text).map_err(|e| e.to_string())
    }
}

/// Plain JS objects rather than `Map`s, matching the JSON output contract
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialize failed: {}", e)))
}
