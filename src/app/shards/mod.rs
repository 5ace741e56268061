//! Entity handles that build shard requests
//!
//! Each handle is a small struct implementing [`ShardSource`]: it supplies the
//! key parameters naming the entity, may adjust outgoing queries, and may
//! carry an auth session. Requests are issued through an
//! [`NsClient`](crate::app::client::NsClient) passed to every method, so one
//! client instance can serve any number of handles.

use crate::app::client::AuthSession;
use crate::app::query::{Params, ShardQuery};
use crate::app::xml::XmlElement;
use crate::errors::{ApiError, ApiResult};

pub mod card;
pub mod nation;
pub mod region;
pub mod world;

pub use card::Card;
pub use nation::Nation;
pub use region::Region;
pub use world::{Wa, World};

/// Something shard requests can be sent for
pub trait ShardSource {
    /// Parameters identifying the entity, placed first in the query
    fn key(&self) -> Params;

    /// Adjust an outgoing query before it is sent
    fn prepare(&self, query: ShardQuery) -> ShardQuery {
        query
    }

    /// Session sent with, and updated by, each request
    fn session(&mut self) -> Option<&mut AuthSession> {
        None
    }
}

/// Text of a single requested shard in a response
///
/// Shards normally come back as a child named after the shard in upper case.
/// A few are renamed by the server (`wa` answers with `UNSTATUS`), so a
/// response with exactly one child is accepted whatever its tag.
pub fn shard_text(root: &XmlElement, shard: &str) -> ApiResult<String> {
    let tag = shard.to_uppercase();
    let node = match root.child(&tag) {
        Some(node) => node,
        None if root.children.len() == 1 => &root.children[0],
        None => {
            return Err(ApiError::MalformedResponse {
                reason: format!("response has no <{tag}> shard"),
                payload: root.to_xml(),
            })
        }
    };
    Ok(node.content().to_string())
}

/// Lowercase a name and replace spaces with underscores, the API's canonical form
pub fn clean_format(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Whether two names refer to the same nation or region
pub fn same_nation(first: &str, second: &str) -> bool {
    clean_format(first) == clean_format(second)
}
