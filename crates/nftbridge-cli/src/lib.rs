//! NFT bridge cli

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use nftbridge::workflow::components::{Notification, NotificationLevel, Notifier};

pub mod cli;
pub mod config;

/// Default working directory, `~/.nftbridge`
pub fn work_dir() -> Result<PathBuf> {
    let home_dir = home::home_dir().ok_or(anyhow!("Unknown home dir"))?;
    let dir = home_dir.join(".nftbridge");

    std::fs::create_dir_all(&dir)?;

    Ok(dir)
}

/// Notifier writing to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        let link = notification.link.unwrap_or_default();
        match notification.level {
            NotificationLevel::Error => tracing::error!(
                "{}: {} {}",
                notification.title,
                notification.message,
                link
            ),
            _ => tracing::info!("{}: {} {}", notification.title, notification.message, link),
        }
    }
}
