//! 命令类型元信息（CommandDescriptor）
//!
//! 发现阶段只需要“类型元信息”而不需要实例：类型名、实现的能力、
//! 是否具体类型，以及（可选的）默认构造函数。描述符可以 `const` 构造，
//! 因此既能放入链接期登记表 [`COMMANDS`]，也能由宿主程序显式列出。
//!
use crate::command::Command;
use linkme::distributed_slice;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 能力标识：描述符声明自己实现了哪些能力，发现时按能力过滤
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability(&'static str);

impl Capability {
    /// 命令能力
    pub const COMMAND: Capability = Capability("cmdr_core::Command");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    Abstract,
    Interface,
}

/// 默认构造函数
pub type Constructor = fn() -> CommandInstance;

const COMMAND_ONLY: &[Capability] = &[Capability::COMMAND];

/// 命令类型描述符
#[derive(Clone, Copy, Debug)]
pub struct CommandDescriptor {
    name: &'static str,
    capabilities: &'static [Capability],
    kind: TypeKind,
    construct: Option<Constructor>,
}

impl CommandDescriptor {
    /// 可默认构造的具体命令类型
    pub const fn command(name: &'static str, construct: Constructor) -> Self {
        Self {
            name,
            capabilities: COMMAND_ONLY,
            kind: TypeKind::Concrete,
            construct: Some(construct),
        }
    }

    /// 具体命令类型，但没有可用的默认构造函数（填充时会被跳过并记录）
    pub const fn without_constructor(name: &'static str) -> Self {
        Self {
            name,
            capabilities: COMMAND_ONLY,
            kind: TypeKind::Concrete,
            construct: None,
        }
    }

    pub const fn abstract_type(name: &'static str, capabilities: &'static [Capability]) -> Self {
        Self {
            name,
            capabilities,
            kind: TypeKind::Abstract,
            construct: None,
        }
    }

    pub const fn interface(name: &'static str, capabilities: &'static [Capability]) -> Self {
        Self {
            name,
            capabilities,
            kind: TypeKind::Interface,
            construct: None,
        }
    }

    pub const fn with_capabilities(mut self, capabilities: &'static [Capability]) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        self.capabilities
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn constructor(&self) -> Option<Constructor> {
        self.construct
    }

    pub fn is_concrete(&self) -> bool {
        self.kind == TypeKind::Concrete
    }

    /// 是否实现了 `roots` 中的任意一个能力
    pub fn implements_any(&self, roots: &[Capability]) -> bool {
        roots.iter().any(|c| self.capabilities.contains(c))
    }
}

/// 链接期命令登记表：`#[command]` 标注的类型会在此登记
#[distributed_slice]
pub static COMMANDS: [CommandDescriptor];

/// 已构造的命令实例
///
/// 同一份分配同时以 `dyn Command` 与 `dyn Any` 两种视图持有，
/// 便于注册表按具体类型匹配或向下转型。
#[derive(Clone)]
pub struct CommandInstance {
    command: Arc<dyn Command>,
    any: Arc<dyn Any + Send + Sync>,
}

impl CommandInstance {
    pub fn new<T: Command>(command: T) -> Self {
        let arc = Arc::new(command);
        Self {
            command: arc.clone(),
            any: arc,
        }
    }

    pub fn command(&self) -> &Arc<dyn Command> {
        &self.command
    }

    pub fn is<T: Any>(&self) -> bool {
        self.any.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.any.downcast_ref::<T>()
    }
}

impl fmt::Debug for CommandInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInstance").finish_non_exhaustive()
    }
}

/// 默认构造命令
pub fn instantiate<T: Command + Default>() -> CommandInstance {
    CommandInstance::new(T::default())
}
