//! 分发执行
//!
//! 对动作名下的每个命令依次执行：前置监听器 → `do_action` → 后置监听器（仅成功时）。
//! 每个命令是独立的失败域：业务错误、意外错误与 panic 都只影响该命令本身。
//!
use crate::listeners::ListenerMap;
use crate::registry::{CommandRef, Registry, panic_message};
use crate::report::{CommandOutcome, DispatchReport, OutcomeStatus, UserErrorSink};
use cmdr_core::{ActionError, ActionEvent};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, debug_span, error};

pub(crate) struct Dispatcher {
    pub(crate) registry: Arc<Registry>,
    pub(crate) pre: ListenerMap,
    pub(crate) post: ListenerMap,
    pub(crate) sink: Arc<dyn UserErrorSink>,
}

impl Dispatcher {
    pub(crate) fn new(registry: Arc<Registry>, sink: Arc<dyn UserErrorSink>) -> Self {
        Self {
            registry,
            pre: ListenerMap::default(),
            post: ListenerMap::default(),
            sink,
        }
    }

    pub(crate) async fn perform(&self, event: &ActionEvent) -> DispatchReport {
        let span = debug_span!("dispatch", action = event.action(), event_id = %event.id());
        async {
            let mut report = DispatchReport::new(event.action());
            let commands = self.registry.commands_for(event.action());
            if commands.is_empty() {
                debug!("no command registered for action");
                return report;
            }

            for command in commands {
                let status = self.execute(command, event).await;
                report.outcomes.push(CommandOutcome {
                    command: command.type_name(),
                    status,
                });
            }
            report
        }
        .instrument(span)
        .await
    }

    // 出口由宿主程序实现，它的 panic 同样不能越过分发边界
    fn present(&self, event: &ActionEvent, type_name: &str, message: &str) {
        let presented = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.sink.present(event, type_name, message)
        }));
        if let Err(panic) = presented {
            error!(
                command = type_name,
                action = event.action(),
                reason = %panic_message(panic.as_ref()),
                "user error sink panicked"
            );
        }
    }

    async fn execute(&self, command: &CommandRef, event: &ActionEvent) -> OutcomeStatus {
        let type_name = command.type_name();
        let run = async {
            self.pre.notify(type_name, event);
            let result = command.do_action(event).await;
            if result.is_ok() {
                self.post.notify(type_name, event);
            }
            result
        };

        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(())) => OutcomeStatus::Completed,
            Ok(Err(ActionError::User(err))) => {
                let message = err.user_message();
                self.present(event, type_name, &message);
                OutcomeStatus::Rejected(message)
            }
            Ok(Err(ActionError::Unexpected(err))) => {
                error!(
                    command = type_name,
                    action = event.action(),
                    error = ?err,
                    "command failed"
                );
                OutcomeStatus::Failed(format!("{err:#}"))
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(
                    command = type_name,
                    action = event.action(),
                    reason = %reason,
                    "command panicked"
                );
                OutcomeStatus::Failed(reason)
            }
        }
    }
}
