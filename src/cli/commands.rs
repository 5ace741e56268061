//! Command handlers for the CLI
//!
//! Each handler loads the configuration, builds one client instance and runs
//! its requests through it, so every command respects the rate limit.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::args::{AutologinArgs, DumpArgs, DumpTarget, EntityKind, GlobalArgs, ShardArgs};
use crate::app::{
    AuthSession, ClientConfig, DumpManager, DumpOptions, Nation, NsClient, Region, ShardQuery,
    ShardSource, Wa, World,
};
use crate::config::AppConfig;
use crate::constants::env;
use crate::errors::{AppError, Result};

/// Handle the shard command: print the raw response body
pub async fn handle_shard(global: &GlobalArgs, config: &AppConfig, args: ShardArgs) -> Result<()> {
    let client_config = client_config(global, config)?;
    let mut client = NsClient::new(client_config)?;

    let query = ShardQuery::new(&args.shards).params(args.params.into_iter().collect());
    let mut source = entity(args.kind, &args.name)?;
    debug!("Requesting {:?} for {:?} {}", args.shards, args.kind, args.name);

    let response = client.fetch(source.as_mut(), query).await?;
    println!("{}", response.body);
    Ok(())
}

/// Handle the dump command: print one name per record
pub async fn handle_dump(global: &GlobalArgs, config: &AppConfig, args: DumpArgs) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let client_config = client_config(global, config)?;
    let mut dump_config = config.dump_config();
    if let Some(dir) = &args.dump_dir {
        dump_config.directory = dir.clone();
    }

    let client = NsClient::new(client_config.clone())?;
    let mut dumps = DumpManager::new(client, &client_config, &dump_config)?;
    let options = DumpOptions {
        date: args.date,
        location: None,
        no_update: args.no_update,
    };

    let spinner = spinner(global.quiet, format!("Preparing {:?} dump...", args.target));
    let names: Box<dyn Iterator<Item = Result<String>>> = match args.target {
        DumpTarget::Nations => Box::new(
            dumps
                .nations(options)
                .await?
                .map(|record| Ok(record?.name)),
        ),
        DumpTarget::Regions => Box::new(
            dumps
                .regions(options)
                .await?
                .map(|record| Ok(record?.name)),
        ),
        DumpTarget::Cards => {
            let season = args
                .season
                .ok_or_else(|| AppError::generic("The card list needs --season"))?;
            Box::new(
                dumps
                    .cards(season, None)
                    .await?
                    .map(|record| Ok(record?.name)),
            )
        }
    };
    spinner.finish_and_clear();

    let mut count = 0usize;
    for name in names.take(args.limit.unwrap_or(usize::MAX)) {
        println!("{}", name?);
        count += 1;
    }
    info!("Printed {} record(s) from the {:?} dump", count, args.target);
    Ok(())
}

/// Handle the autologin command: log in with a password and print the autologin
pub async fn handle_autologin(
    global: &GlobalArgs,
    config: &AppConfig,
    args: AutologinArgs,
) -> Result<()> {
    let client_config = client_config(global, config)?;
    let mut client = NsClient::new(client_config)?;

    let password = match std::env::var(env::PASSWORD) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password(format!("Password for {}: ", args.nation))?,
    };

    let mut nation = Nation::new(&args.nation).with_session(AuthSession::with_password(password)?);
    let autologin = nation.get_autologin(&mut client).await?;
    println!("{autologin}");
    Ok(())
}

/// Handle the init command: write the default config to `--config` or the user config dir
pub async fn handle_init(global: &GlobalArgs) -> Result<()> {
    let path = match &global.config {
        Some(path) => path.clone(),
        None => AppConfig::default_config_path()?,
    };
    if AppConfig::initialize(&path).await? {
        println!("Created default configuration file: {}", path.display());
    } else {
        println!("Configuration file already exists: {}", path.display());
    }
    Ok(())
}

/// Client settings with the user agent resolved from flag, environment, then file
fn client_config(global: &GlobalArgs, config: &AppConfig) -> Result<ClientConfig> {
    let user_agent = global
        .user_agent
        .clone()
        .or_else(|| std::env::var(env::USER_AGENT).ok());
    Ok(config.client_config(user_agent)?)
}

/// Build the entity handle a shard request is sent for
fn entity(kind: EntityKind, name: &str) -> Result<Box<dyn ShardSource + Send>> {
    Ok(match kind {
        EntityKind::Nation => {
            let mut nation = Nation::new(name);
            if let Some(session) = env_session()? {
                nation.login(session);
            }
            Box::new(nation)
        }
        EntityKind::Region => Box::new(Region::new(name)),
        EntityKind::World => Box::new(World),
        EntityKind::Wa => {
            let council = name
                .parse()
                .map_err(|_| AppError::generic(format!("Invalid WA council '{name}'")))?;
            Box::new(Wa::new(council))
        }
    })
}

/// Credentials from the environment, if any are set
fn env_session() -> Result<Option<AuthSession>> {
    let password = std::env::var(env::PASSWORD).ok().filter(|v| !v.is_empty());
    let autologin = std::env::var(env::AUTOLOGIN).ok().filter(|v| !v.is_empty());
    if password.is_none() && autologin.is_none() {
        return Ok(None);
    }
    Ok(Some(AuthSession::new(password, autologin)?))
}

fn spinner(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
