//! Thin ESI client.
//!
//! Covers only the public endpoints the tool consumes: universe lookups,
//! route planning, and the system-kill feed. The cache subsystem talks to
//! this module exclusively through the [`AugmentationSource`] trait so tests
//! can substitute a canned source.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::{EsiConfig, SecurityPreference};
use crate::types::{Record, RecordKind, RecordPayload, TypeDetails};

#[derive(Error, Debug)]
pub enum EsiError {
    #[error("ESI returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("ESI request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to build ESI client: {0}")]
    Client(String),
}

pub type EsiResult<T> = Result<T, EsiError>;

/// Remote source for records absent from the static index.
#[async_trait]
pub trait AugmentationSource {
    /// Fetch a single record by id. Failures propagate to the caller; the
    /// cache inserts nothing on error.
    async fn fetch_record(&self, id: u64) -> EsiResult<Record>;
}

/// Inventory type document from `universe/types/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EsiType {
    pub type_id: u64,
    pub name: String,
    #[serde(default)]
    pub group_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Solar system document from `universe/systems/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EsiSystem {
    pub system_id: u64,
    pub name: String,
    pub security_status: f64,
    #[serde(default)]
    pub constellation_id: Option<u64>,
}

/// One entry of the `universe/system_kills` feed.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemKills {
    pub system_id: u64,
    #[serde(default)]
    pub ship_kills: u32,
    #[serde(default)]
    pub pod_kills: u32,
    #[serde(default)]
    pub npc_kills: u32,
}

#[derive(Debug, Clone)]
pub struct EsiClient {
    http: reqwest::Client,
    root: String,
}

impl EsiClient {
    pub fn new(config: &EsiConfig) -> EsiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| EsiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            root: config.root.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.root)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> EsiResult<T> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(EsiError::Status {
                status: resp.status(),
                url,
            });
        }

        Ok(resp.json().await?)
    }

    pub async fn fetch_type(&self, id: u64) -> EsiResult<EsiType> {
        self.get_json(&format!("universe/types/{id}")).await
    }

    pub async fn fetch_system(&self, id: u64) -> EsiResult<EsiSystem> {
        self.get_json(&format!("universe/systems/{id}")).await
    }

    /// System ids along a route, endpoints included.
    pub async fn route(
        &self,
        from: u64,
        to: u64,
        flag: SecurityPreference,
    ) -> EsiResult<Vec<u64>> {
        self.get_json(&format!("route/{from}/{to}?flag={}", flag.as_str()))
            .await
    }

    /// Systems with kill activity in the last hour.
    pub async fn system_kills(&self) -> EsiResult<Vec<SystemKills>> {
        self.get_json("universe/system_kills").await
    }
}

impl From<EsiType> for Record {
    fn from(t: EsiType) -> Self {
        Record {
            id: t.type_id,
            name: t.name,
            kind: RecordKind::Item,
            parent_ids: Vec::new(),
            payload: Some(RecordPayload::Item(TypeDetails {
                group_id: t.group_id,
                description: t.description,
                published: t.published,
                volume: t.volume,
            })),
        }
    }
}

#[async_trait]
impl AugmentationSource for EsiClient {
    async fn fetch_record(&self, id: u64) -> EsiResult<Record> {
        Ok(self.fetch_type(id).await?.into())
    }
}
