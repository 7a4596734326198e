//! 命令发现与路由（cmdr-router）
//!
//! - 插件扫描（`scanner`）：在代码搜索路径（目录与 zip 归档）中定位实现了命令能力的具体类型；
//! - 类型目录（`catalog`）：把候选类型名解析为描述符，默认来源是链接期登记表；
//! - 注册表（`registry`）：动作名 -> 命令集合，启动时一次性填充；
//! - 路由器（`router`）：串行执行上下文、按类型作用域的前置/后置监听器、逐命令的失败隔离；
//! - 配置（`config`）与错误（`error`）。
//!
//! 典型用法：
//!
//! ```no_run
//! use cmdr_router::ActionRouter;
//!
//! # async fn run() -> Result<(), cmdr_router::RouterError> {
//! let router = ActionRouter::global()?;
//! router.dispatch_action("save");
//! router.flush().await?;
//! # Ok(())
//! # }
//! ```
//!
pub mod catalog;
pub mod config;
mod dispatcher;
pub mod error;
mod listeners;
mod queue;
pub mod registry;
pub mod report;
pub mod router;
pub mod scanner;

pub use catalog::{TypeCatalog, TypeLoader};
pub use config::{DiscoverySource, RouterConfig, SEARCH_PATH_ENV};
pub use error::{DiscoveryError, PopulationError, RouterError};
pub use registry::{CommandRef, Registry, RegistryBuilder};
pub use report::{CommandOutcome, DispatchReport, IgnoreUserErrors, OutcomeStatus, UserErrorSink};
pub use router::ActionRouter;
pub use scanner::{NAMESPACE_SEPARATOR, PluginScanner, UNIT_SUFFIX};
