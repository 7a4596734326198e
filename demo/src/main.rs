use anyhow::Context;
use async_trait::async_trait;
use cmdr_core::{ActionError, ActionEvent, ActionListener, ActionResult, Command, UserActionError};
use cmdr_macros::command;
use cmdr_router::{ActionRouter, Registry, RouterConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CMDR_LOG";

#[derive(Default)]
struct SaveDocument {
    saved: AtomicUsize,
}

#[command(names = ["save", "save-all"])]
#[async_trait]
impl Command for SaveDocument {
    async fn do_action(&self, event: &ActionEvent) -> ActionResult {
        let Some(path) = event.payload_ref::<PathBuf>() else {
            return Err(UserActionError::new("nothing to save: no document is open").into());
        };
        if path.extension().is_none() {
            return Err(UserActionError::with_cause(
                format!("cannot save {}", path.display()),
                std::io::Error::other("file name has no extension"),
            )
            .into());
        }
        let n = self.saved.fetch_add(1, Ordering::SeqCst) + 1;
        info!(path = %path.display(), n, "document saved");
        Ok(())
    }
}

#[derive(Default)]
struct Autosave;

#[command(names = ["save-all"])]
#[async_trait]
impl Command for Autosave {
    async fn do_action(&self, _event: &ActionEvent) -> ActionResult {
        Err(ActionError::unexpected(std::io::Error::other("autosave directory is gone")))
    }
}

#[derive(Default)]
struct Quit;

#[command(names = ["quit"])]
#[async_trait]
impl Command for Quit {
    async fn do_action(&self, event: &ActionEvent) -> ActionResult {
        info!(source = event.source().unwrap_or("unknown"), "quit requested");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RouterConfig::from_env().with_worker_name("demo-router");
    let registry = Registry::discover(&config);
    info!(
        types = registry.type_count(),
        actions = ?registry.action_names().collect::<Vec<_>>(),
        "commands discovered"
    );

    let sink = |event: &ActionEvent, command: &str, message: &str| {
        warn!(action = event.action(), command, "{message}");
    };
    let router = ActionRouter::with_sink(registry, &config, Arc::new(sink))
        .context("failed to start the action router")?;

    let audit: Arc<dyn ActionListener> = Arc::new(|event: &ActionEvent| {
        info!(action = event.action(), event_id = %event.id(), "about to save");
    });
    router.add_pre_listener::<SaveDocument>(audit.clone());

    router.dispatch(ActionEvent::new("save").with_payload(PathBuf::from("notes.md")));
    router.dispatch(ActionEvent::new("save").with_payload(PathBuf::from("README")));
    router.dispatch_action("save");
    router.dispatch(ActionEvent::new("save-all").with_payload(PathBuf::from("todo.txt")));
    router.dispatch_action("print");
    router.flush().await?;

    router.remove_pre_listener::<SaveDocument>(&audit);

    let quit = ActionEvent::builder().action("quit").source("demo").build();
    let report = router.dispatch_now(&quit).await;
    info!(invoked = ?report.invoked(), "quit dispatched");

    router.shutdown();
    Ok(())
}
