//! World and World Assembly handles

use futures::Stream;

use super::{shard_text, ShardSource};
use crate::app::client::NsClient;
use crate::app::models::Happening;
use crate::app::pagination::{PageLayout, PaginatedFetcher};
use crate::app::query::{Params, ShardQuery};
use crate::app::xml::{split_list, XmlElement};
use crate::errors::ApiResult;

/// The world as a whole; requests carry no entity key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct World;

impl ShardSource for World {
    fn key(&self) -> Params {
        Params::new()
    }
}

impl World {
    /// Request arbitrary world shards and return the WORLD element
    pub async fn shards(&mut self, client: &mut NsClient, query: ShardQuery) -> ApiResult<XmlElement> {
        client.request(self, query).await
    }

    /// World happenings, newest first
    ///
    /// `params` narrows the feed (`view`, `filter`, `sinceid`, `sincetime`,
    /// ...). In safe mode a single request is made and at most one page is
    /// returned; otherwise pages are walked back with `beforeid` until a short
    /// page, which without `sincetime`/`sinceid` covers the whole history.
    pub fn happenings<'a>(
        &'a mut self,
        client: &'a mut NsClient,
        params: Params,
        safe: bool,
    ) -> impl Stream<Item = ApiResult<Happening>> + 'a {
        PaginatedFetcher::new(PageLayout::happenings())
            .safe(safe)
            .with_span(tracing::debug_span!(parent: client.span(), "happenings"))
            .fetch(client, self, ShardQuery::new(["happenings"]).params(params))
    }

    /// Regions carrying all of the given tags; prefix a tag with `-` to exclude it
    pub async fn regions_by_tag<I, S>(&mut self, client: &mut NsClient, tags: I) -> ApiResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<String> = tags.into_iter().map(|t| t.as_ref().to_string()).collect();
        let query = ShardQuery::new(["regionsbytag"]).param("tags", tags.join(","));
        let root = self.shards(client, query).await?;
        Ok(split_list(&shard_text(&root, "regions")?, ','))
    }
}

/// One World Assembly council
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wa {
    council: u8,
}

impl ShardSource for Wa {
    fn key(&self) -> Params {
        Params::new().with("wa", self.council)
    }
}

impl Wa {
    /// Council 1 is the General Assembly, council 2 the Security Council
    pub fn new(council: u8) -> Self {
        Self { council }
    }

    pub fn council(&self) -> u8 {
        self.council
    }

    /// Request arbitrary council shards and return the WA element
    pub async fn shards(&mut self, client: &mut NsClient, query: ShardQuery) -> ApiResult<XmlElement> {
        client.request(self, query).await
    }

    /// All World Assembly members
    pub async fn members(&mut self, client: &mut NsClient) -> ApiResult<Vec<String>> {
        let root = self.shards(client, ShardQuery::new(["members"])).await?;
        Ok(split_list(&shard_text(&root, "members")?, ','))
    }
}

impl Default for Wa {
    fn default() -> Self {
        Self::new(1)
    }
}
