//! Prelude module for the NationStates client
//!
//! Re-exports the items most integrations need, so a single
//! `use nsapi::prelude::*;` covers typical usage.
//!
//! # Usage
//!
//! ```rust,no_run
//! use nsapi::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = NsClient::new(ClientConfig::new("ExampleBot by Testlandia"))?;
//!     let mut region = Region::new("The Pacific");
//!     let nations = region.nations(&mut client).await?;
//!     println!("{} nations", nations.len());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{ApiError, ApiResult, AppError, Result};

// Client runtime
pub use crate::app::{AuthSession, ClientConfig, NsClient, Params, RateLimitConfig, ShardQuery};

// Entity handles and records
pub use crate::app::{
    Card, Happening, Nation, NationSnapshot, Region, RegionSnapshot, ShardSource, Trade, Wa,
    World,
};

// Dumps
pub use crate::app::{DumpConfig, DumpManager, DumpOptions};

// Common external crate re-exports for convenience
pub use futures::StreamExt;
pub use tokio;
