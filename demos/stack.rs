//! Example fetching a stack of files and reporting when all of them are done

use color_eyre::Result;
use stackload::{Callbacks, Download, DownloadCoordinator};
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let downloads = (1..=5)
        .map(|i| {
            let url = format!("https://httpbin.org/bytes/{}?seed={}", 1024 * i, i);
            Download::try_from(url.as_str()).map(|d| d.with_context(i))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let done = Arc::new(Notify::new());
    let notify = done.clone();
    let delegate = Callbacks::new()
        .on_finished(|download| {
            let index = download.context_as::<i32>().map_or(0, |i| *i);
            println!(
                "[{}] {} -> {:?}, {} bytes",
                index,
                download.url(),
                download.status_code(),
                download.data().len()
            );
        })
        .on_failed(|download, error| println!("{} failed: {}", download.url(), error))
        .on_stack_finished(move |_, downloads| {
            println!("\nStack complete! {} downloads.", downloads.len());
            notify.notify_one();
        })
        .build();

    DownloadCoordinator::shared()?.perform_downloads(&downloads, &delegate, "demo")?;
    done.notified().await;

    Ok(())
}
