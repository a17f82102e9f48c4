// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Likeledger and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Likeledger demo entrypoint.
//!
//! Runs a scripted like session against the in-process server and prints the resulting liked
//! sets as JSON. Set `RUST_LOG=likeledger=debug` to watch the toggle protocol.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use likeledger::api::MemoryLikeServer;
use likeledger::store::{FileStore, KeyValueStore, MemoryStore, WriteDurability};
use likeledger::{LikeConfig, LikeFacade, Target, TargetKind, ToggleOutcome, UserIdentity};
use tracing_subscriber::EnvFilter;

const DEFAULT_USER: &str = "demo-user";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--store <dir>] [--config <file>] [--cooldown-ms <n>] [--durable-writes] [--user <id>]\n\nWithout --store, liked ids are kept in memory only.\n--config reads a JSON LikeConfig; --cooldown-ms and --durable-writes override it.\n--user selects the identity key (default `{DEFAULT_USER}`)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    store_dir: Option<String>,
    config_path: Option<String>,
    cooldown_ms: Option<u64>,
    durable_writes: bool,
    user: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                options.store_dir = Some(args.next().ok_or(())?);
            }
            "--config" => {
                if options.config_path.is_some() {
                    return Err(());
                }
                options.config_path = Some(args.next().ok_or(())?);
            }
            "--cooldown-ms" => {
                if options.cooldown_ms.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.cooldown_ms = Some(raw.parse().map_err(|_| ())?);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--user" => {
                if options.user.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                if raw.trim().is_empty() {
                    return Err(());
                }
                options.user = Some(raw);
            }
            _ => return Err(()),
        }
    }

    if options.durable_writes && options.store_dir.is_none() {
        return Err(());
    }

    Ok(options)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(options: &CliOptions) -> Result<LikeConfig, Box<dyn Error>> {
    let mut config = match &options.config_path {
        Some(path) => LikeConfig::load(path)?,
        None => LikeConfig::default(),
    };
    if let Some(ms) = options.cooldown_ms {
        config = config.with_cooldown(Duration::from_millis(ms));
    }
    if options.durable_writes {
        config = config.with_durability(WriteDurability::Durable);
    }
    Ok(config)
}

fn liked_snapshot(facade: &LikeFacade) -> BTreeMap<TargetKind, Vec<String>> {
    TargetKind::ALL
        .into_iter()
        .map(|kind| {
            let ids = facade
                .liked_ids(kind)
                .into_iter()
                .map(|id| id.into_string())
                .collect();
            (kind, ids)
        })
        .collect()
}

async fn run_script(
    facade: &LikeFacade,
    server: &MemoryLikeServer,
    identity: UserIdentity,
    cooldown: Duration,
) -> Result<(), Box<dyn Error>> {
    let article = Target::article("art-1")?;
    let talk = Target::talk("talk-7")?;
    let reply = Target::reply("reply-3")?;
    let elsewhere = Target::article("art-2")?;

    server.sign_in(&identity);
    server.seed_base_likes(&article, 42);
    // Liked from another device; the local cache does not know.
    server.seed_like(&identity, &elsewhere);

    facade
        .initialize(
            identity.clone(),
            &[article.clone(), talk.clone(), reply.clone()],
        )
        .await;

    for target in [&article, &talk, &reply] {
        let outcome = facade.toggle(target).await?;
        println!("toggle {target}: {outcome:?}");
    }

    let busy = facade.toggle(&article).await?;
    println!("toggle {article} again: {busy:?}");

    tokio::time::sleep(cooldown).await;
    let unliked = facade.toggle(&talk).await?;
    println!("toggle {talk} after cooldown: {unliked:?}");

    let healed = facade.toggle(&elsewhere).await?;
    if let ToggleOutcome::Applied { self_healed, .. } = healed {
        println!("toggle {elsewhere}: {healed:?} (self-healed: {self_healed})");
    }

    println!("{}", serde_json::to_string_pretty(&liked_snapshot(facade))?);

    facade.reset(&identity).await;
    println!(
        "after reset: identity={:?} liked={}",
        facade.identity(),
        serde_json::to_string(&liked_snapshot(facade))?
    );
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "likeledger".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();
        let config = resolve_config(&options)?;
        let identity = UserIdentity::new(options.user.as_deref().unwrap_or(DEFAULT_USER))
            .ok_or("identity must not be blank")?;

        let store: Arc<dyn KeyValueStore> = match &options.store_dir {
            Some(dir) => Arc::new(FileStore::new(dir).with_durability(config.durability)),
            None => Arc::new(MemoryStore::new()),
        };
        let server = Arc::new(MemoryLikeServer::new());
        let facade = LikeFacade::new(server.clone(), store, &config);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(run_script(&facade, &server, identity, config.cooldown()))
    })();

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
