//! Region handle

use super::{clean_format, shard_text, ShardSource};
use crate::app::client::NsClient;
use crate::app::models::RegionSnapshot;
use crate::app::query::{Params, ShardQuery};
use crate::app::xml::{split_list, XmlElement};
use crate::errors::ApiResult;

/// A region, identified by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    name: String,
}

impl ShardSource for Region {
    fn key(&self) -> Params {
        Params::new().with("region", &self.name)
    }
}

impl Region {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: clean_format(name.as_ref()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request arbitrary shards and return the REGION element
    pub async fn shards(&mut self, client: &mut NsClient, query: ShardQuery) -> ApiResult<XmlElement> {
        client.request(self, query).await
    }

    /// Text of one shard
    pub async fn shard(&mut self, client: &mut NsClient, shard: &str) -> ApiResult<String> {
        let root = self.shards(client, ShardQuery::new([shard])).await?;
        shard_text(&root, shard)
    }

    /// Resident nations, in the server's order
    pub async fn nations(&mut self, client: &mut NsClient) -> ApiResult<Vec<String>> {
        let text = self.shard(client, "nations").await?;
        Ok(split_list(&text, ':'))
    }

    /// The standard public region record
    pub async fn standard(&mut self, client: &mut NsClient) -> ApiResult<RegionSnapshot> {
        let root = self.shards(client, ShardQuery::default()).await?;
        Ok(RegionSnapshot::from_xml(&root)?)
    }
}
