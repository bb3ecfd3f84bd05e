//! Version-dispatching mapping client.

use crate::error::{EsConvertError, Result};
use crate::mapping::{MappingDocument, derive_mapping, effective_ignore_above};
use crate::schema::{EsMapping, MappingSource, TypeSource};
use crate::version::EsVersion;
use async_trait::async_trait;
use esconvert_log::{debug, info, warn};
use std::any::Any;
use std::fmt;

/// A client handle for one of the supported API generations.
#[derive(Clone)]
pub enum EsClient {
    /// 7.x client.
    V7(elasticsearch7::Elasticsearch),
    /// 8.x client.
    V8(elasticsearch8::Elasticsearch),
}

impl EsClient {
    /// Generation of the wrapped client.
    pub fn version(&self) -> EsVersion {
        match self {
            EsClient::V7(_) => EsVersion::V7,
            EsClient::V8(_) => EsVersion::V8,
        }
    }
}

impl From<elasticsearch7::Elasticsearch> for EsClient {
    fn from(client: elasticsearch7::Elasticsearch) -> Self {
        EsClient::V7(client)
    }
}

impl From<elasticsearch8::Elasticsearch> for EsClient {
    fn from(client: elasticsearch8::Elasticsearch) -> Self {
        EsClient::V8(client)
    }
}

/// Index and mapping operations driven by derived mappings.
///
/// Object safe, so callers can hold a `Box<dyn MappingTool>` without
/// caring which cluster generation sits behind it.
#[async_trait]
pub trait MappingTool: Send + Sync {
    /// Create `index` with the mapping derived from `record`.
    async fn create(&self, index: &str, record: &dyn MappingSource) -> Result<String>;

    /// Add the fields of `record` to the mapping of an existing `index`.
    async fn put(&self, index: &str, record: &dyn MappingSource) -> Result<String>;

    /// Raw mapping of `index` as returned by the cluster.
    async fn get_mapping(&self, index: &str) -> Result<String>;
}

/// [`MappingTool`] over a 7.x or 8.x client.
///
/// ```rust
/// use esconvert::{MappingClient, RecordSchema};
///
/// let tool = MappingClient::unbound(0);
/// assert!(tool.version().is_none());
/// assert_eq!(tool.ignore_above(), 256);
///
/// let schema = RecordSchema::new().field::<String>("mid");
/// let mapping = tool.derive(&schema).unwrap();
/// assert_eq!(mapping.get("mid").unwrap().ignore_above, Some(256));
/// ```
#[derive(Clone)]
pub struct MappingClient {
    client: Option<EsClient>,
    above: i64,
}

impl MappingClient {
    /// Facade bound to `client`.
    pub fn new(client: impl Into<EsClient>, above: i64) -> Self {
        Self {
            client: Some(client.into()),
            above,
        }
    }

    /// Facade over a type-erased client handle.
    ///
    /// Returns `None` unless the handle is a 7.x or 8.x `Elasticsearch`.
    pub fn from_handle(handle: Box<dyn Any + Send>, above: i64) -> Option<Self> {
        let handle = match handle.downcast::<elasticsearch7::Elasticsearch>() {
            Ok(client) => return Some(Self::new(*client, above)),
            Err(other) => other,
        };
        match handle.downcast::<elasticsearch8::Elasticsearch>() {
            Ok(client) => Some(Self::new(*client, above)),
            Err(_) => {
                debug!("Handle is neither a v7 nor a v8 client");
                None
            }
        }
    }

    /// Facade with no client.
    ///
    /// Derivation still works; `create` and `put` fail with
    /// [`EsConvertError::NoClient`] and `get_mapping` returns an empty body.
    pub fn unbound(above: i64) -> Self {
        Self {
            client: None,
            above,
        }
    }

    /// Generation of the bound client.
    pub fn version(&self) -> Option<EsVersion> {
        self.client.as_ref().map(EsClient::version)
    }

    /// The bound client.
    pub fn client(&self) -> Option<&EsClient> {
        self.client.as_ref()
    }

    /// Effective `ignore_above` for keyword fields.
    pub fn ignore_above(&self) -> i64 {
        effective_ignore_above(self.above)
    }

    /// Derive the mapping of `record` with this facade's threshold.
    pub fn derive(&self, record: &dyn MappingSource) -> Result<MappingDocument> {
        Ok(derive_mapping(record, self.above)?)
    }

    /// [`MappingTool::create`] for a record type.
    pub async fn create_for<T>(&self, index: &str) -> Result<String>
    where
        T: EsMapping,
    {
        MappingTool::create(self, index, &TypeSource::<T>::new()).await
    }

    /// [`MappingTool::put`] for a record type.
    pub async fn put_for<T>(&self, index: &str) -> Result<String>
    where
        T: EsMapping,
    {
        MappingTool::put(self, index, &TypeSource::<T>::new()).await
    }

    fn bound(&self) -> Result<&EsClient> {
        self.client.as_ref().ok_or(EsConvertError::NoClient)
    }
}

#[async_trait]
impl MappingTool for MappingClient {
    async fn create(&self, index: &str, record: &dyn MappingSource) -> Result<String> {
        let mapping = self.derive(record)?;
        let client = self.bound()?;
        let body = mapping.create_body()?;

        debug!(
            "Creating index {} with {} mapped fields ({})",
            index,
            mapping.len(),
            client.version()
        );

        let text = match client {
            EsClient::V7(es) => {
                use elasticsearch7::indices::IndicesCreateParts;
                es.indices()
                    .create(IndicesCreateParts::Index(index))
                    .body(body)
                    .send()
                    .await?
                    .text()
                    .await?
            }
            EsClient::V8(es) => {
                use elasticsearch8::indices::IndicesCreateParts;
                es.indices()
                    .create(IndicesCreateParts::Index(index))
                    .body(body)
                    .send()
                    .await?
                    .text()
                    .await?
            }
        };

        info!("Created index: {}", index);
        Ok(text)
    }

    async fn put(&self, index: &str, record: &dyn MappingSource) -> Result<String> {
        let mapping = self.derive(record)?;
        let client = self.bound()?;
        let body = mapping.put_body()?;

        debug!(
            "Updating mapping of {} with {} fields ({})",
            index,
            mapping.len(),
            client.version()
        );

        let text = match client {
            EsClient::V7(es) => {
                use elasticsearch7::indices::IndicesPutMappingParts;
                es.indices()
                    .put_mapping(IndicesPutMappingParts::Index(&[index]))
                    .body(body)
                    .send()
                    .await?
                    .text()
                    .await?
            }
            EsClient::V8(es) => {
                use elasticsearch8::indices::IndicesPutMappingParts;
                es.indices()
                    .put_mapping(IndicesPutMappingParts::Index(&[index]))
                    .body(body)
                    .send()
                    .await?
                    .text()
                    .await?
            }
        };

        Ok(text)
    }

    async fn get_mapping(&self, index: &str) -> Result<String> {
        let Some(client) = self.client.as_ref() else {
            warn!("get_mapping({}) on a facade with no es client", index);
            return Ok(String::new());
        };

        debug!("Getting mapping of {} ({})", index, client.version());

        let text = match client {
            EsClient::V7(es) => {
                use elasticsearch7::indices::IndicesGetMappingParts;
                es.indices()
                    .get_mapping(IndicesGetMappingParts::Index(&[index]))
                    .send()
                    .await?
                    .text()
                    .await?
            }
            EsClient::V8(es) => {
                use elasticsearch8::indices::IndicesGetMappingParts;
                es.indices()
                    .get_mapping(IndicesGetMappingParts::Index(&[index]))
                    .send()
                    .await?
                    .text()
                    .await?
            }
        };

        Ok(text)
    }
}

impl fmt::Debug for MappingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingClient")
            .field("version", &self.version())
            .field("ignore_above", &self.ignore_above())
            .finish()
    }
}
