//! 命令执行错误分类
//!
//! 分发单个命令时只区分两类失败：
//! - `User`：命令基于当前状态拒绝了请求，属于预期内、可恢复的业务错误，面向最终用户展示；
//! - `Unexpected`：其余一切失败（程序缺陷、资源故障等），由路由器记录日志。
//!
//! 两类错误都不会中断同一动作名下其他命令的执行。
//!
use std::error::Error as StdError;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// 面向用户的业务错误，可链式携带底层原因
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UserActionError {
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl UserActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// 展示给用户的文本：`<message>`，有原因时为 `<message>\n<cause message>`
    pub fn user_message(&self) -> String {
        match &self.cause {
            Some(cause) => format!("{}\n{}", self.message, cause),
            None => self.message.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    User(#[from] UserActionError),

    #[error("{0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl ActionError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User(UserActionError::new(message))
    }

    pub fn unexpected<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Unexpected(anyhow::Error::new(err))
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// 命令执行结果
pub type ActionResult = Result<(), ActionError>;
