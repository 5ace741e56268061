//! Trading card handle

use futures::Stream;

use super::ShardSource;
use crate::app::client::NsClient;
use crate::app::models::{CardInfo, Trade};
use crate::app::pagination::{PageLayout, PaginatedFetcher};
use crate::app::query::{Params, ShardQuery};
use crate::app::xml::XmlElement;
use crate::errors::{ApiError, ApiResult};

/// Shard every card request starts with
const CARD_SHARD: &str = "card";

/// One card of one season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    id: u64,
    season: u32,
}

impl ShardSource for Card {
    fn key(&self) -> Params {
        Params::new()
            .with("cardid", self.id)
            .with("season", self.season)
    }

    fn prepare(&self, mut query: ShardQuery) -> ShardQuery {
        if query.shards.first().map(String::as_str) != Some(CARD_SHARD) {
            query.shards.insert(0, CARD_SHARD.to_string());
        }
        query
    }
}

impl Card {
    pub fn new(id: u64, season: u32) -> Self {
        Self { id, season }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn season(&self) -> u32 {
        self.season
    }

    /// Request arbitrary card shards and return the CARD element
    pub async fn shards(&mut self, client: &mut NsClient, query: ShardQuery) -> ApiResult<XmlElement> {
        client.request(self, query).await
    }

    /// Card details and market value
    pub async fn info(&mut self, client: &mut NsClient) -> ApiResult<CardInfo> {
        let root = self.shards(client, ShardQuery::new(["info"])).await?;
        Ok(CardInfo::from_xml(&root)?)
    }

    /// Nations owning a copy, one entry per copy
    pub async fn owners(&mut self, client: &mut NsClient) -> ApiResult<Vec<String>> {
        let root = self.shards(client, ShardQuery::new(["owners"])).await?;
        let owners = root.child("OWNERS").ok_or_else(|| ApiError::MalformedResponse {
            reason: "card response has no OWNERS element".to_string(),
            payload: root.to_xml(),
        })?;
        Ok(owners
            .children_named("OWNER")
            .map(|owner| owner.content().to_string())
            .collect())
    }

    /// Trade history, newest first
    ///
    /// Same paging contract as world happenings, walking back with
    /// `beforetime`; bound the walk with `sincetime` in `params`.
    pub fn trades<'a>(
        &'a mut self,
        client: &'a mut NsClient,
        params: Params,
        safe: bool,
    ) -> impl Stream<Item = ApiResult<Trade>> + 'a {
        PaginatedFetcher::new(PageLayout::trades())
            .safe(safe)
            .with_span(tracing::debug_span!(parent: client.span(), "trades", card = self.id))
            .fetch(client, self, ShardQuery::new(["trades"]).params(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_card_injects_shard_and_key() {
        let card = Card::new(926_511, 2);
        let query = card.prepare(ShardQuery::new(["info", "markets"]));
        let url = query.to_url(
            &Url::parse("https://example.com/cgi-bin/api.cgi").unwrap(),
            &card.key(),
        );
        assert_eq!(url.query(), Some("cardid=926511&season=2&q=card+info+markets"));
    }

    #[test]
    fn test_card_shard_is_not_doubled() {
        let card = Card::new(1, 1);
        let query = card.prepare(card.prepare(ShardQuery::new(["owners"])));
        assert_eq!(query.shards, vec!["card", "owners"]);
    }
}
