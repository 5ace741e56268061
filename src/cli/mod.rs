//! Command-line interface components
//!
//! This module contains CLI-specific code for the `nsapi` tool: argument
//! parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{
    AutologinArgs, Cli, Commands, DumpArgs, DumpTarget, EntityKind, GlobalArgs, ShardArgs,
};
pub use commands::{handle_autologin, handle_dump, handle_init, handle_shard};
