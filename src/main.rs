mod admin;
mod commands;
mod config;
mod error;
mod media;
mod records;
mod storage;

use chrono::Local;
use log::{error, info};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::commands::{describe_error, execute, AppCommand};
use crate::config::AppConfig;
use crate::media::LocalMediaStorage;
use crate::records::ArchiveService;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv::dotenv().is_ok();
    let config = AppConfig::from_env();

    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    std::fs::create_dir_all(&config.log_dir)?;
    let log_path = config.log_dir.join(format!("archive-{}.log", ts));
    let log_file = std::fs::File::create(&log_path)?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(log::LevelFilter::Warn)
        .filter_module("langarchive", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    if env_loaded {
        info!("loaded .env");
    }
    info!("starting with {:?}", config);

    let db = storage::establish_connection(&config.database_url)
        .await
        .map_err(|e| anyhow::anyhow!("database connection failed: {}", e))?;
    let media = LocalMediaStorage::new(config.media_root.clone(), &config.media_base_url)?;
    let svc = ArchiveService::new(Arc::new(db), Arc::new(media));

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            format!(
                "language archive ready ({}); type `help` for commands\n",
                config.database_url
            )
            .as_bytes(),
        )
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let cmd = line
            .parse::<AppCommand>()
            .unwrap_or_else(|_| AppCommand::Unknown(String::new()));
        if cmd == AppCommand::Quit {
            break;
        }

        let output = match execute(cmd, &svc, &config).await {
            Ok(out) => out,
            Err(e) => {
                error!("command {:?} failed: {:#}", line.trim(), e);
                describe_error(&e)
            }
        };
        for out in output {
            stdout.write_all(out.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
    }

    info!("shutting down");
    Ok(())
}
