//! Cursor-driven retrieval of event and trade history
//!
//! The server caps how many items one request returns. To walk further back,
//! the fetcher takes a cursor from the oldest item of a full page and asks for
//! items before it, until a page comes back short.
//!
//! Without a lower bound in the query (e.g. `sincetime`), a non-safe fetch
//! walks the entire history, one rate-limited request per page. Bounding the
//! walk is the caller's responsibility.

use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, Span};

use crate::app::client::NsClient;
use crate::app::models::{Happening, Trade};
use crate::app::query::ShardQuery;
use crate::app::shards::ShardSource;
use crate::app::xml::XmlElement;
use crate::constants::{api, pages};
use crate::errors::{ApiError, ApiResult, DecodeResult};

/// How one paginated resource is read
pub struct PageLayout<T> {
    /// Query parameter carrying the cursor
    pub cursor_param: &'static str,
    /// Largest page the server returns
    pub page_limit: usize,
    /// Tag of one item anywhere in the response
    pub item_tag: &'static str,
    pub parse: fn(&XmlElement) -> DecodeResult<T>,
    /// Cursor value taken from the oldest item of a page
    pub cursor: fn(&T) -> String,
}

impl PageLayout<Happening> {
    /// World happenings, newest first, cursor by event id
    pub fn happenings() -> Self {
        Self {
            cursor_param: api::BEFORE_ID,
            page_limit: pages::HAPPENINGS_LIMIT,
            item_tag: "EVENT",
            parse: Happening::from_xml,
            cursor: |event| event.id.to_string(),
        }
    }
}

impl PageLayout<Trade> {
    /// Card trades, newest first, cursor by timestamp
    pub fn trades() -> Self {
        Self {
            cursor_param: api::BEFORE_TIME,
            page_limit: pages::TRADES_LIMIT,
            item_tag: "TRADE",
            parse: Trade::from_xml,
            cursor: |trade| trade.timestamp.to_string(),
        }
    }
}

/// Issues page requests until the history is exhausted
pub struct PaginatedFetcher<T> {
    layout: PageLayout<T>,
    safe: bool,
    span: Span,
}

struct PageState<'a, S: ?Sized, T> {
    client: &'a mut NsClient,
    source: &'a mut S,
    query: ShardQuery,
    layout: PageLayout<T>,
    safe: bool,
    cursor: Option<String>,
    requests: usize,
    done: bool,
    span: Span,
}

impl<T> PaginatedFetcher<T> {
    pub fn new(layout: PageLayout<T>) -> Self {
        Self {
            layout,
            safe: true,
            span: tracing::debug_span!("paginator"),
        }
    }

    /// In safe mode exactly one request is sent and its page returned as is
    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    /// Attach a span that parents this fetcher's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Lazily fetch every item, pages in request order (newest to oldest)
    ///
    /// Requests are only sent as the stream is polled. The first error ends
    /// the stream.
    pub fn fetch<'a, S>(
        self,
        client: &'a mut NsClient,
        source: &'a mut S,
        query: ShardQuery,
    ) -> impl Stream<Item = ApiResult<T>> + 'a
    where
        S: ShardSource + ?Sized,
        T: 'a,
    {
        let state = PageState {
            client,
            source,
            query,
            layout: self.layout,
            safe: self.safe,
            cursor: None,
            requests: 0,
            done: false,
            span: self.span,
        };

        stream::try_unfold(state, next_page)
            .map_ok(|page| stream::iter(page.into_iter().map(Ok::<T, ApiError>)))
            .try_flatten()
    }

    /// Fetch every item into a vector
    pub async fn fetch_all<'a, S>(
        self,
        client: &'a mut NsClient,
        source: &'a mut S,
        query: ShardQuery,
    ) -> ApiResult<Vec<T>>
    where
        S: ShardSource + ?Sized,
        T: 'a,
    {
        self.fetch(client, source, query).try_collect().await
    }
}

async fn next_page<'a, S, T>(
    mut state: PageState<'a, S, T>,
) -> ApiResult<Option<(Vec<T>, PageState<'a, S, T>)>>
where
    S: ShardSource + ?Sized,
{
    if state.done {
        return Ok(None);
    }

    let mut query = state.query.clone();
    if let Some(cursor) = &state.cursor {
        query = query.param(state.layout.cursor_param, cursor);
    }

    let root = state.client.request(&mut *state.source, query).await?;
    state.requests += 1;

    let page = root
        .descendants_named(state.layout.item_tag)
        .into_iter()
        .map(state.layout.parse)
        .collect::<DecodeResult<Vec<T>>>()?;

    debug!(
        parent: &state.span,
        "Page {} returned {} item(s)",
        state.requests,
        page.len()
    );

    if state.safe || page.len() < state.layout.page_limit {
        state.done = true;
    } else {
        // The oldest item of a full page bounds the next request
        match page.last() {
            Some(oldest) => state.cursor = Some((state.layout.cursor)(oldest)),
            None => state.done = true,
        }
    }

    Ok(Some((page, state)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_layouts() {
        let happenings = PageLayout::happenings();
        assert_eq!(happenings.page_limit, 100);
        assert_eq!(happenings.cursor_param, "beforeid");

        let event = Happening {
            id: 42,
            timestamp: Some(1),
            text: String::new(),
        };
        assert_eq!((happenings.cursor)(&event), "42");

        let trades = PageLayout::trades();
        assert_eq!(trades.page_limit, 50);
        let trade = Trade {
            buyer: "a".to_string(),
            seller: "b".to_string(),
            price: None,
            timestamp: 1_700_000_000,
        };
        assert_eq!((trades.cursor)(&trade), "1700000000");
    }
}
