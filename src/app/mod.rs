//! Core client runtime for the NationStates API
//!
//! This module contains the rate-limited transport, entity handles, the
//! streaming XML decoder, and the dump and resource managers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nsapi::app::{ClientConfig, Nation, NsClient, World};
//! use futures::StreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = NsClient::new(ClientConfig::new("ExampleBot by Testlandia"))?;
//!
//! let mut nation = Nation::new("Testlandia");
//! let record = nation.standard(&mut client).await?;
//! println!("{} of {}", record.full_name, record.region);
//!
//! let mut world = World;
//! let happenings = world.happenings(&mut client, Default::default(), true);
//! futures::pin_mut!(happenings);
//! while let Some(event) = happenings.next().await {
//!     println!("{}", event?.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod command;
pub mod dump;
pub mod models;
pub mod pagination;
pub mod query;
pub mod resource;
pub mod shards;
pub mod xml;

// Re-export main public API
pub use client::{
    ApiResponse, AuthSession, ClientConfig, HttpHandler, NsClient, RateLimitConfig, RateLimiter,
};
pub use command::CommandExecutor;
pub use dump::{
    current_dump_day, last_dump_timestamp, DumpConfig, DumpKind, DumpManager, DumpOptions,
    DumpRecords,
};
pub use models::{
    CardIdentifier, CardInfo, CardSnapshot, DeckInfo, Dossier, Freedoms, Happening, Issue,
    NationSnapshot, RegionSnapshot, Trade,
};
pub use pagination::{PageLayout, PaginatedFetcher};
pub use query::{Params, ShardQuery};
pub use resource::{
    Clock, Downloader, FileMarkerStore, MarkerStore, MemoryMarkerStore, Resource,
    ResourceManager, StalenessPolicy, SystemClock,
};
pub use shards::{clean_format, same_nation, Card, Nation, Region, ShardSource, Wa, World};
pub use xml::{StreamingDecoder, TagFilter, XmlElement};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = ClientConfig::new("test agent");
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert_eq!(DumpConfig::default().generation_time, dump::generation_time());
    }
}
