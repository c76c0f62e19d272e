use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{PortfolioRecord, PortfolioUpdate, StoreClient, StoreError};

/// REST client for the metadata store. Routes hang off
/// `{base}/portfolios`.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEnvelope<'a> {
    update_fields: &'a PortfolioUpdate,
}

impl RestStore {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Appends path segments to the base URL. Segment append keeps any
    /// path already on the base URL, with or without a trailing slash.
    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Api {
                status: 0,
                message: format!("store url {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }

    async fn error_from(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let message = match response.json::<ApiMessage>().await {
            Ok(body) => body.message,
            Err(_) => status.to_string(),
        };
        match status {
            StatusCode::NOT_FOUND => StoreError::NotFound,
            StatusCode::BAD_REQUEST if message.contains("already exists") => StoreError::Conflict,
            _ => StoreError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl StoreClient for RestStore {
    async fn create(&self, record: &PortfolioRecord) -> Result<PortfolioRecord, StoreError> {
        let url = self.endpoint("portfolios")?;
        debug!(portfolio_id = record.portfolio_id, "creating store record");
        let response = self.client.post(url).json(record).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn get_by_user(&self, user: Address) -> Result<Vec<PortfolioRecord>, StoreError> {
        let url = self.endpoint(&format!("portfolios/user/{user}"))?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn get_by_id(&self, portfolio_id: u64) -> Result<PortfolioRecord, StoreError> {
        let url = self.endpoint(&format!("portfolios/{portfolio_id}"))?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn update(
        &self,
        portfolio_id: u64,
        update: &PortfolioUpdate,
    ) -> Result<PortfolioRecord, StoreError> {
        let url = self.endpoint(&format!("portfolios/{portfolio_id}"))?;
        debug!(portfolio_id, "updating store record");
        let response = self
            .client
            .put(url)
            .json(&UpdateEnvelope {
                update_fields: update,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn delete(&self, portfolio_id: u64) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("portfolios/{portfolio_id}"))?;
        let response = self.client.delete(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}
