use crate::{error::ActionResult, event::ActionEvent};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// 命令所响应的动作名集合（区分大小写，按字典序稳定迭代）
pub type ActionNames = BTreeSet<String>;

/// 命令（Command）
///
/// 可被发现、由路由器持有的处理单元：
/// - `action_names`：命令响应的动作名，至少包含一个；
/// - `do_action`：执行入口，失败时返回 [`ActionError`](crate::error::ActionError)。
///
/// 注册表以实现类型区分命令，每个具体类型在填充时默认构造一次，
/// 并在进程生命周期内由路由器独占持有。经正常分发路径执行时，
/// 同一命令不会被并发调用。
#[async_trait]
pub trait Command: Send + Sync + 'static {
    fn action_names(&self) -> ActionNames;

    async fn do_action(&self, event: &ActionEvent) -> ActionResult;
}

/// 命令类型的静态信息
///
/// 通常由 `#[command]` 宏生成。`TYPE_NAME` 是按类型作用域注册监听器、
/// 以及按类型查找命令时使用的键。
pub trait CommandType {
    /// 完全限定类型名，如 `my_app::commands::Save`
    const TYPE_NAME: &'static str;
    /// 声明的动作名
    const ACTION_NAMES: &'static [&'static str];

    fn action_names() -> ActionNames {
        Self::ACTION_NAMES.iter().map(|s| (*s).to_string()).collect()
    }
}
