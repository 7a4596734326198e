//! 命令分发基础库（cmdr-core）
//!
//! 定义命令分发子系统中与运行时无关的协议与构件：
//! - 命令能力（`command`）：`Command` / `CommandType`，以及命令响应的动作名集合
//! - 类型元信息（`descriptor`）：可在链接期登记、无需实例化即可解析的 `CommandDescriptor`
//! - 动作事件（`event`）：一次分发请求携带的动作名与不透明负载
//! - 监听器（`listener`）：命令执行前后的观察者
//! - 错误分类（`error`）：面向用户的业务错误与意外错误
//!
//! 发现、注册表与路由器位于 `cmdr-router`；`#[command]` 宏位于 `cmdr-macros`。
//!
pub mod command;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod listener;

pub use command::{ActionNames, Command, CommandType};
pub use descriptor::{COMMANDS, Capability, CommandDescriptor, CommandInstance, TypeKind, instantiate};
pub use error::{ActionError, ActionResult, UserActionError};
pub use event::{ActionEvent, Payload};
pub use listener::ActionListener;

// 过程宏生成的代码通过该路径引用依赖，调用方无需直接依赖 linkme / async-trait。
#[doc(hidden)]
pub mod __private {
    pub use async_trait::async_trait;
    pub use linkme;
}

// 允许在本 crate 内部通过 ::cmdr_core 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::cmdr_core 路径。
extern crate self as cmdr_core;
