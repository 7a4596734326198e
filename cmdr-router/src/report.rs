//! 分发报告与用户错误出口
//!
//! 一次分发对动作名下的每个命令各产生一条 `CommandOutcome`，顺序与执行顺序一致。
//! 面向用户的错误交给 `UserErrorSink` 呈现；意外错误只记录日志。
//!
use cmdr_core::ActionEvent;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeStatus {
    Completed,
    /// 命令以业务错误拒绝执行，携带面向用户的消息
    Rejected(String),
    /// 意外错误或 panic
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct CommandOutcome {
    /// 命令的具体类型名
    pub command: &'static str,
    pub status: OutcomeStatus,
}

impl CommandOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == OutcomeStatus::Completed
    }
}

#[derive(Clone, Debug, Default)]
pub struct DispatchReport {
    pub action: String,
    pub outcomes: Vec<CommandOutcome>,
}

impl DispatchReport {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            outcomes: Vec::new(),
        }
    }

    /// 动作名未注册任何命令
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// 按执行顺序列出被调用的命令类型名
    pub fn invoked(&self) -> Vec<&'static str> {
        self.outcomes.iter().map(|o| o.command).collect()
    }

    pub fn user_messages(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                OutcomeStatus::Rejected(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<&CommandOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed(_)))
            .collect()
    }
}

/// 用户错误的呈现出口（对话框、状态栏、终端等由宿主程序决定）
///
/// `message` 为已格式化的用户消息：带有原因时为 `"<消息>\n<原因>"`。
pub trait UserErrorSink: Send + Sync {
    fn present(&self, event: &ActionEvent, command: &str, message: &str);
}

impl<F> UserErrorSink for F
where
    F: Fn(&ActionEvent, &str, &str) + Send + Sync,
{
    fn present(&self, event: &ActionEvent, command: &str, message: &str) {
        self(event, command, message)
    }
}

/// 默认出口：只记录调试日志
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreUserErrors;

impl UserErrorSink for IgnoreUserErrors {
    fn present(&self, event: &ActionEvent, command: &str, message: &str) {
        debug!(action = event.action(), command, message, "user action error");
    }
}
