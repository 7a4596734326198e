use bon::Builder;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 不透明负载：原样传递给前置监听器、命令与后置监听器
#[derive(Clone)]
pub struct Payload(Arc<dyn Any + Send + Sync>);

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Payload(..)")
    }
}

/// 动作事件（一次分发请求）
///
/// 由 UI 等外部事件源构造：动作名决定路由到哪些命令，
/// 其余字段在分发过程中保持不变。
///
/// ```rust
/// use cmdr_core::{ActionEvent, Payload};
///
/// let event = ActionEvent::builder()
///     .action("save")
///     .source("toolbar")
///     .payload(Payload::new(42_u32))
///     .build();
/// assert_eq!(event.action(), "save");
/// assert_eq!(event.payload_ref::<u32>(), Some(&42));
/// ```
#[derive(Builder, Clone, Debug)]
pub struct ActionEvent {
    /// 事件ID（日志关联）
    #[builder(default = Uuid::new_v4())]
    id: Uuid,
    /// 动作名
    #[builder(into)]
    action: String,
    /// 触发来源（如菜单项、快捷键）
    #[builder(into)]
    source: Option<String>,
    payload: Option<Payload>,
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
}

impl ActionEvent {
    pub fn new(action: impl Into<String>) -> Self {
        Self::builder().action(action).build()
    }

    pub fn with_payload<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.payload = Some(Payload::new(value));
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn payload_ref<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref().and_then(|p| p.downcast_ref::<T>())
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
