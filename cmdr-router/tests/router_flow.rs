use async_trait::async_trait;
use cmdr_core::{ActionError, ActionEvent, ActionListener, ActionResult, Command, UserActionError};
use cmdr_macros::command;
use cmdr_router::{ActionRouter, OutcomeStatus, Registry, RouterConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Journal = Arc<Mutex<Vec<String>>>;

fn record(journal: &Journal, entry: impl Into<String>) {
    journal.lock().unwrap().push(entry.into());
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

fn listener(journal: &Journal, label: &'static str) -> Arc<dyn ActionListener> {
    let journal = journal.clone();
    Arc::new(move |event: &ActionEvent| record(&journal, format!("{label}:{}", event.action())))
}

#[derive(Default)]
struct Save {
    journal: Journal,
}

#[command(names = ["save"])]
#[async_trait]
impl Command for Save {
    async fn do_action(&self, event: &ActionEvent) -> ActionResult {
        record(&self.journal, format!("Save:{}", event.action()));
        Ok(())
    }
}

#[derive(Default)]
struct SaveAs {
    journal: Journal,
}

#[command(names = ["save", "save-as"])]
#[async_trait]
impl Command for SaveAs {
    async fn do_action(&self, event: &ActionEvent) -> ActionResult {
        record(&self.journal, format!("SaveAs:{}", event.action()));
        Ok(())
    }
}

#[derive(Default)]
struct ReadOnly {
    journal: Journal,
}

#[command(names = ["x"])]
#[async_trait]
impl Command for ReadOnly {
    async fn do_action(&self, _event: &ActionEvent) -> ActionResult {
        record(&self.journal, "ReadOnly");
        Err(UserActionError::with_cause(
            "document is read-only",
            std::io::Error::other("permission denied"),
        )
        .into())
    }
}

#[derive(Default)]
struct Broken {
    journal: Journal,
}

#[command(names = ["x"])]
#[async_trait]
impl Command for Broken {
    async fn do_action(&self, _event: &ActionEvent) -> ActionResult {
        record(&self.journal, "Broken");
        Err(ActionError::unexpected(std::io::Error::other("socket closed")))
    }
}

#[derive(Default)]
struct Crashy {
    journal: Journal,
}

#[command(names = ["x"])]
#[async_trait]
impl Command for Crashy {
    async fn do_action(&self, _event: &ActionEvent) -> ActionResult {
        record(&self.journal, "Crashy");
        panic!("index out of bounds")
    }
}

#[derive(Default)]
struct Steady {
    journal: Journal,
}

#[command(names = ["x", "y"])]
#[async_trait]
impl Command for Steady {
    async fn do_action(&self, event: &ActionEvent) -> ActionResult {
        record(&self.journal, format!("Steady:{}", event.action()));
        Ok(())
    }
}

#[derive(Default)]
struct Inspect {
    seen: Journal,
}

#[command(names = ["inspect"])]
#[async_trait]
impl Command for Inspect {
    async fn do_action(&self, event: &ActionEvent) -> ActionResult {
        let path = event.payload_ref::<String>().cloned().unwrap_or_default();
        record(&self.seen, path);
        Ok(())
    }
}

fn editor_router(journal: &Journal) -> ActionRouter {
    let registry = Registry::builder()
        .register(Save {
            journal: journal.clone(),
        })
        .register(SaveAs {
            journal: journal.clone(),
        })
        .build();
    ActionRouter::new(registry).unwrap()
}

fn failing_router(journal: &Journal, messages: &Journal) -> ActionRouter {
    let registry = Registry::builder()
        .register(ReadOnly {
            journal: journal.clone(),
        })
        .register(Broken {
            journal: journal.clone(),
        })
        .register(Crashy {
            journal: journal.clone(),
        })
        .register(Steady {
            journal: journal.clone(),
        })
        .build();

    let messages = messages.clone();
    let sink = move |event: &ActionEvent, command: &str, message: &str| {
        record(&messages, format!("{}|{command}|{message}", event.action()));
    };
    ActionRouter::with_sink(registry, &RouterConfig::default(), Arc::new(sink)).unwrap()
}

#[tokio::test]
async fn save_reaches_both_commands_with_type_scoped_listeners() {
    let journal = Journal::default();
    let router = editor_router(&journal);

    router.add_pre_listener::<Save>(listener(&journal, "pre-Save"));
    router.add_post_listener::<Save>(listener(&journal, "post-Save"));
    router.add_pre_listener::<SaveAs>(listener(&journal, "pre-SaveAs"));

    router.dispatch_action("save");
    router.flush().await.unwrap();

    assert_eq!(
        entries(&journal),
        vec![
            "pre-Save:save",
            "Save:save",
            "post-Save:save",
            "pre-SaveAs:save",
            "SaveAs:save",
        ]
    );
}

#[tokio::test]
async fn save_as_only_reaches_its_declaring_type() {
    let journal = Journal::default();
    let router = editor_router(&journal);
    router.add_pre_listener::<Save>(listener(&journal, "pre-Save"));

    let report = router.dispatch_now(&ActionEvent::new("save-as")).await;

    assert_eq!(report.invoked(), vec![<SaveAs as cmdr_core::CommandType>::TYPE_NAME]);
    assert_eq!(entries(&journal), vec!["SaveAs:save-as"]);
}

#[tokio::test]
async fn unregistered_action_invokes_nothing() {
    let journal = Journal::default();
    let router = editor_router(&journal);

    router.dispatch_action("quit");
    router.flush().await.unwrap();
    let report = router.dispatch_now(&ActionEvent::new("quit")).await;

    assert!(report.is_empty());
    assert!(entries(&journal).is_empty());
    assert!(router.lookup_all("quit").is_empty());
    assert!(router.lookup_one::<Save>("quit").is_none());
}

#[tokio::test]
async fn failures_do_not_stop_sibling_commands() {
    let journal = Journal::default();
    let messages = Journal::default();
    let router = failing_router(&journal, &messages);

    let report = router.dispatch_now(&ActionEvent::new("x")).await;

    assert_eq!(report.outcomes.len(), 4);
    assert_eq!(entries(&journal), vec!["ReadOnly", "Broken", "Crashy", "Steady:x"]);

    let by_type = |suffix: &str| {
        report
            .outcomes
            .iter()
            .find(|o| o.command.ends_with(suffix))
            .map(|o| o.status.clone())
            .unwrap()
    };
    assert_eq!(
        by_type("::ReadOnly"),
        OutcomeStatus::Rejected("document is read-only\npermission denied".into())
    );
    assert!(matches!(by_type("::Broken"), OutcomeStatus::Failed(m) if m.contains("socket closed")));
    assert_eq!(by_type("::Crashy"), OutcomeStatus::Failed("index out of bounds".into()));
    assert_eq!(by_type("::Steady"), OutcomeStatus::Completed);

    assert_eq!(report.user_messages(), vec!["document is read-only\npermission denied"]);
    assert_eq!(entries(&messages).len(), 1);
    assert!(entries(&messages)[0].starts_with("x|"));
    assert!(entries(&messages)[0].ends_with("::ReadOnly|document is read-only\npermission denied"));
}

#[tokio::test]
async fn order_is_stable_across_dispatches() {
    let journal = Journal::default();
    let messages = Journal::default();
    let router = failing_router(&journal, &messages);

    let first = router.dispatch_now(&ActionEvent::new("x")).await.invoked();
    for _ in 0..5 {
        router.dispatch(ActionEvent::new("x"));
    }
    router.flush().await.unwrap();
    let last = router.dispatch_now(&ActionEvent::new("x")).await.invoked();

    assert_eq!(first, last);
    assert_eq!(entries(&journal).len(), 4 * 7);
    assert_eq!(entries(&messages).len(), 7);
}

#[tokio::test]
async fn listener_on_one_type_ignores_other_types() {
    let journal = Journal::default();
    let messages = Journal::default();
    let router = failing_router(&journal, &messages);
    let observed = Journal::default();

    router.add_pre_listener::<Steady>(listener(&observed, "pre-Steady"));
    router.add_post_listener::<Steady>(listener(&observed, "post-Steady"));
    router.add_post_listener::<ReadOnly>(listener(&observed, "post-ReadOnly"));

    router.dispatch_now(&ActionEvent::new("y")).await;
    router.dispatch_now(&ActionEvent::new("x")).await;

    assert_eq!(
        entries(&observed),
        vec!["pre-Steady:y", "post-Steady:y", "pre-Steady:x", "post-Steady:x"]
    );
}

#[tokio::test]
async fn removing_listeners() {
    let journal = Journal::default();
    let router = editor_router(&journal);
    let observed = Journal::default();
    let kept = listener(&observed, "kept");
    let never_added = listener(&observed, "never");

    assert!(!router.remove_pre_listener::<Save>(&never_added));
    assert!(!router.remove_post_listener_for("nowhere::Type", &never_added));

    router.add_pre_listener::<Save>(kept.clone());
    router.dispatch_now(&ActionEvent::new("save")).await;
    assert!(router.remove_pre_listener::<Save>(&kept));
    router.dispatch_now(&ActionEvent::new("save")).await;

    assert_eq!(entries(&observed), vec!["kept:save"]);
}

#[tokio::test]
async fn payload_is_passed_through_unchanged() {
    let seen = Journal::default();
    let registry = Registry::builder()
        .register(Inspect { seen: seen.clone() })
        .build();
    let router = ActionRouter::new(registry).unwrap();

    let pre_seen = seen.clone();
    let pre: Arc<dyn ActionListener> = Arc::new(move |event: &ActionEvent| {
        record(&pre_seen, format!("pre:{}", event.payload_ref::<String>().unwrap()));
    });
    router.add_pre_listener::<Inspect>(pre);

    router.dispatch(ActionEvent::new("inspect").with_payload("/tmp/report.txt".to_string()));
    router.flush().await.unwrap();

    assert_eq!(entries(&seen), vec!["pre:/tmp/report.txt", "/tmp/report.txt"]);
}

#[tokio::test]
async fn requests_run_in_submission_order() {
    let journal = Journal::default();
    let router = editor_router(&journal);

    router.dispatch_action("save-as");
    router.dispatch_action("save");
    router.dispatch_action("save-as");
    router.flush().await.unwrap();

    assert_eq!(
        entries(&journal),
        vec!["SaveAs:save-as", "Save:save", "SaveAs:save", "SaveAs:save-as"]
    );
}

#[test]
fn shutdown_runs_requests_already_queued() {
    let journal = Journal::default();
    let router = editor_router(&journal);

    for _ in 0..20 {
        router.dispatch_action("save");
    }
    router.shutdown();
    router.dispatch_action("save");
    router.join();

    assert!(router.is_closed());
    let journal = entries(&journal);
    assert_eq!(journal.len(), 40);
    assert_eq!(journal.iter().filter(|e| *e == "Save:save").count(), 20);
}

#[test]
fn dropping_the_router_finishes_the_backlog() {
    let journal = Journal::default();
    {
        let router = editor_router(&journal);
        for _ in 0..20 {
            router.dispatch_action("save-as");
        }
    }
    assert_eq!(entries(&journal), vec!["SaveAs:save-as"; 20]);
}

fn broken_dialog(_event: &ActionEvent, _command: &str, _message: &str) {
    panic!("dialog failed")
}

#[tokio::test]
async fn panicking_sink_keeps_the_worker_alive() {
    let journal = Journal::default();
    let registry = Registry::builder()
        .register(ReadOnly {
            journal: journal.clone(),
        })
        .register(Steady {
            journal: journal.clone(),
        })
        .build();
    let router =
        ActionRouter::with_sink(registry, &RouterConfig::default(), Arc::new(broken_dialog)).unwrap();

    router.dispatch_action("x");
    router.dispatch_action("y");
    router.flush().await.unwrap();

    assert!(!router.is_closed());
    assert_eq!(entries(&journal), vec!["ReadOnly", "Steady:x", "Steady:y"]);

    let report = router.dispatch_now(&ActionEvent::new("x")).await;
    assert_eq!(report.user_messages(), vec!["document is read-only\npermission denied"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn listeners_change_on_another_thread_while_dispatching() {
    let journal = Journal::default();
    let router = Arc::new(editor_router(&journal));
    let seen = Journal::default();
    router.add_post_listener::<Save>(listener(&seen, "kept"));

    let stop = Arc::new(AtomicBool::new(false));
    let churn = {
        let router = router.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            let mut rounds = 0usize;
            loop {
                let extra: Arc<dyn ActionListener> = Arc::new(|_: &ActionEvent| {});
                router.add_pre_listener::<Save>(extra.clone());
                router.add_post_listener::<SaveAs>(extra.clone());
                assert!(router.remove_pre_listener::<Save>(&extra));
                assert!(router.remove_post_listener::<SaveAs>(&extra));
                rounds += 1;
                if stop.load(Ordering::Relaxed) {
                    return rounds;
                }
            }
        })
    };

    for _ in 0..50 {
        router.dispatch_action("save");
    }
    router.flush().await.unwrap();
    for _ in 0..50 {
        router.dispatch_now(&ActionEvent::new("save")).await;
    }
    stop.store(true, Ordering::Relaxed);
    let rounds = churn.join().unwrap();

    assert!(rounds > 0);
    assert_eq!(entries(&seen).len(), 100);
    assert_eq!(entries(&journal).len(), 200);
    assert_eq!(router.listener_count(<Save as cmdr_core::CommandType>::TYPE_NAME), (0, 1));
    assert_eq!(router.listener_count(<SaveAs as cmdr_core::CommandType>::TYPE_NAME), (0, 0));
}
