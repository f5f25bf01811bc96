//! Static Data Client
//! Retrieves the dashboard's static JSON resources over HTTP or from a local directory.
//!
//! Every request races a cancellation token. Once the token fires, pending and
//! future requests resolve to [`FetchError::Cancelled`] and never yield data.
//! Failures are reported once; there are no retries.

use crate::config::DashboardConfig;
use crate::data::records::{
    BuyerRecord, ConsolidatedData, ProductRecord, SupplierBuyerRecord, SupplierRecord,
};
use crate::error::FetchError;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Well-known resource names.
pub mod resources {
    pub const PRODUCTS: &str = "sheet1_data.json";
    pub const SUPPLIERS: &str = "sheet2_data.json";
    pub const BUYERS: &str = "sheet3_data.json";
    pub const SUPPLIER_BUYER: &str = "sheet4_data.json";
    pub const SUPPLIER_BUYER_COMPLETE: &str = "sheet4_complete_data.json";
    pub const CONSOLIDATED: &str = "consolidated_data.json";

    pub const ALL: [&str; 6] = [
        PRODUCTS,
        SUPPLIERS,
        BUYERS,
        SUPPLIER_BUYER,
        SUPPLIER_BUYER_COMPLETE,
        CONSOLIDATED,
    ];
}

/// Where resources are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(Url),
    Directory(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` bases are URLs; anything else is a directory.
    pub fn parse(base: &str) -> Result<Self, FetchError> {
        if base.starts_with("http://") || base.starts_with("https://") {
            let with_slash = if base.ends_with('/') {
                base.to_string()
            } else {
                format!("{base}/")
            };
            let url = Url::parse(&with_slash)
                .map_err(|e| FetchError::Transport(format!("invalid base url '{base}': {e}")))?;
            Ok(DataSource::Http(url))
        } else {
            Ok(DataSource::Directory(PathBuf::from(base)))
        }
    }

    fn locate(&self, resource: &str) -> Result<String, FetchError> {
        match self {
            DataSource::Http(base) => base
                .join(resource)
                .map(|u| u.to_string())
                .map_err(|e| FetchError::Transport(format!("invalid resource '{resource}': {e}"))),
            DataSource::Directory(dir) => Ok(dir.join(resource).display().to_string()),
        }
    }
}

pub struct StaticDataClient {
    source: DataSource,
    http: reqwest::Client,
    cancel: CancellationToken,
}

impl StaticDataClient {
    pub fn new(source: DataSource, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            source,
            http,
            cancel: CancellationToken::new(),
        })
    }

    /// Client for the configured base, or the current directory when none is set.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, FetchError> {
        let base = config.data_base_url.as_deref().unwrap_or(".");
        Self::new(DataSource::parse(base)?, config.fetch_timeout())
    }

    /// Share an externally owned token, e.g. one tied to a view's lifetime.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Raw bytes of one resource.
    pub async fn fetch_bytes(&self, resource: &str) -> Result<Vec<u8>, FetchError> {
        let location = self.source.locate(resource)?;
        tracing::debug!(%location, "fetching resource");

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.load(&location) => result,
        };

        if let Err(err) = &result {
            tracing::warn!(%location, code = err.code(), error = %err, "fetch failed");
        }
        result
    }

    /// Decode one resource as JSON.
    pub async fn fetch_json<T: DeserializeOwned>(&self, resource: &str) -> Result<T, FetchError> {
        let bytes = self.fetch_bytes(resource).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn fetch_records<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, FetchError> {
        let records: Vec<T> = self.fetch_json(resource).await?;
        tracing::info!(resource, count = records.len(), "loaded records");
        Ok(records)
    }

    async fn load(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        match &self.source {
            DataSource::Http(_) => {
                let response = self.http.get(location).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: location.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
            DataSource::Directory(_) => tokio::fs::read(location)
                .await
                .map_err(|e| FetchError::Transport(format!("{location}: {e}"))),
        }
    }

    pub async fn products(&self) -> Result<Vec<ProductRecord>, FetchError> {
        self.fetch_records(resources::PRODUCTS).await
    }

    pub async fn suppliers(&self) -> Result<Vec<SupplierRecord>, FetchError> {
        self.fetch_records(resources::SUPPLIERS).await
    }

    pub async fn buyers(&self) -> Result<Vec<BuyerRecord>, FetchError> {
        self.fetch_records(resources::BUYERS).await
    }

    pub async fn supplier_buyer(&self) -> Result<Vec<SupplierBuyerRecord>, FetchError> {
        self.fetch_records(resources::SUPPLIER_BUYER).await
    }

    /// Supplier × buyer rows including the monthly columns.
    pub async fn supplier_buyer_complete(&self) -> Result<Vec<SupplierBuyerRecord>, FetchError> {
        self.fetch_records(resources::SUPPLIER_BUYER_COMPLETE).await
    }

    pub async fn consolidated(&self) -> Result<ConsolidatedData, FetchError> {
        self.fetch_json(resources::CONSOLIDATED).await
    }
}
