//! 命令注册表（Registry）
//!
//! 动作名 -> 命令集合 的映射，在启动时一次性构建，之后只读：
//! - 一个动作名可以对应多个命令，一个命令也可以声明多个动作名；
//! - 集合内以实现类型去重，顺序即注册顺序（发现结果按类型名排序）；
//! - 查找未注册的动作名返回空结果，而不是错误。
//!
use crate::catalog::{TypeCatalog, TypeLoader};
use crate::config::{DiscoverySource, RouterConfig};
use crate::error::PopulationError;
use crate::scanner::PluginScanner;
use cmdr_core::{
    ActionEvent, ActionNames, ActionResult, Capability, Command, CommandDescriptor,
    CommandInstance, CommandType,
};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 已注册的命令：实例 + 其具体类型名
#[derive(Clone)]
pub struct CommandRef {
    type_name: &'static str,
    instance: CommandInstance,
}

impl CommandRef {
    pub fn new(type_name: &'static str, instance: CommandInstance) -> Self {
        Self {
            type_name,
            instance,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn command(&self) -> &Arc<dyn Command> {
        self.instance.command()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.instance.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }

    pub fn action_names(&self) -> ActionNames {
        self.command().action_names()
    }

    pub async fn do_action(&self, event: &ActionEvent) -> ActionResult {
        self.command().do_action(event).await
    }
}

impl fmt::Debug for CommandRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandRef").field(&self.type_name).finish()
    }
}

#[derive(Clone, Default)]
pub struct Registry {
    commands: BTreeMap<String, Vec<CommandRef>>,
    types: usize,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// 按配置发现并填充：链接期登记表或代码搜索路径
    pub fn discover(config: &RouterConfig) -> Self {
        let catalog = TypeCatalog::linked();
        let scanner = match &config.source {
            DiscoverySource::Linked => PluginScanner::linked(&catalog),
            DiscoverySource::SearchPath(path) => {
                info!(search_path = ?path, "scanning code search path for commands");
                PluginScanner::search_path(&catalog, path)
            }
        };
        let names = scanner.discover(&[Capability::COMMAND]);
        Self::populate(&catalog, &names)
    }

    /// 由显式清单填充
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = CommandDescriptor>,
    {
        let catalog = TypeCatalog::from_descriptors(descriptors);
        let names = PluginScanner::linked(&catalog).discover(&[Capability::COMMAND]);
        Self::populate(&catalog, &names)
    }

    /// 对每个已发现类型默认构造一次，并按其声明的动作名登记；
    /// 单个类型实例化失败只记录并跳过
    pub fn populate(loader: &dyn TypeLoader, type_names: &BTreeSet<String>) -> Self {
        if type_names.is_empty() {
            warn!("no command types discovered; the registry is empty");
            return Self::empty();
        }

        let mut builder = RegistryBuilder::default();
        for name in type_names {
            match Self::instantiate(loader, name) {
                Ok(command) => builder.insert(command),
                Err(err) => error!(command = %name, error = %err, "failed to instantiate command"),
            }
        }

        let registry = builder.build();
        debug!(
            types = registry.type_count(),
            actions = registry.len(),
            "registry populated"
        );
        registry
    }

    fn instantiate(loader: &dyn TypeLoader, name: &str) -> Result<CommandRef, PopulationError> {
        let descriptor = loader.resolve(name)?;
        if !descriptor.is_concrete() {
            return Err(PopulationError::NotConcrete {
                name: name.to_string(),
            });
        }
        let construct = descriptor
            .constructor()
            .ok_or_else(|| PopulationError::NoConstructor {
                name: name.to_string(),
            })?;
        let instance =
            std::panic::catch_unwind(construct).map_err(|panic| PopulationError::Panicked {
                name: name.to_string(),
                reason: panic_message(panic.as_ref()),
            })?;
        Ok(CommandRef::new(descriptor.name(), instance))
    }

    /// 动作名下全部命令的副本；未注册时为空
    pub fn lookup_all(&self, action: &str) -> Vec<CommandRef> {
        self.commands_for(action).to_vec()
    }

    /// 动作名下具体类型为 `T` 的命令
    pub fn lookup_one<T: Any>(&self, action: &str) -> Option<CommandRef> {
        self.commands_for(action).iter().find(|c| c.is::<T>()).cloned()
    }

    /// 动作名下类型名为 `type_name` 的命令
    pub fn lookup_by_type_name(&self, action: &str, type_name: &str) -> Option<CommandRef> {
        self.commands_for(action)
            .iter()
            .find(|c| c.type_name() == type_name)
            .cloned()
    }

    pub(crate) fn commands_for(&self, action: &str) -> &[CommandRef] {
        self.commands.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// 动作名数量
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 已登记的命令类型数量
    pub fn type_count(&self) -> usize {
        self.types
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, commands) in &self.commands {
            let types: Vec<&str> = commands.iter().map(CommandRef::type_name).collect();
            map.entry(name, &types);
        }
        map.finish()
    }
}

/// 注册表构建器：供宿主程序显式注入命令实例
#[derive(Default)]
pub struct RegistryBuilder {
    commands: BTreeMap<String, Vec<CommandRef>>,
    types: BTreeSet<&'static str>,
}

impl RegistryBuilder {
    pub fn register<T: Command + CommandType>(self, command: T) -> Self {
        self.register_as(T::TYPE_NAME, command)
    }

    /// 以给定的类型名登记命令
    ///
    /// `type_name` 是该命令的唯一身份：类型作用域监听器与 `lookup_by_type_name` 都按它匹配。
    /// 若 `T` 同时实现了 `CommandType` 而 `type_name` 与 `T::TYPE_NAME` 不同，
    /// `add_pre_listener::<T>` 一类按类型登记的监听器不会触发，只能用 `*_listener_for(type_name)`；
    /// 此时应改用 [`RegistryBuilder::register`]。
    pub fn register_as<T: Command>(mut self, type_name: &'static str, command: T) -> Self {
        self.insert(CommandRef::new(type_name, CommandInstance::new(command)));
        self
    }

    fn insert(&mut self, command: CommandRef) {
        let names = command.action_names();
        if names.is_empty() {
            warn!(command = command.type_name(), "command declares no action names; ignored");
            return;
        }

        for name in names {
            let set = self.commands.entry(name).or_default();
            if !set.iter().any(|c| c.type_name() == command.type_name()) {
                set.push(command.clone());
            }
        }
        debug!(command = command.type_name(), "command registered");
        self.types.insert(command.type_name());
    }

    pub fn build(self) -> Registry {
        Registry {
            commands: self.commands,
            types: self.types.len(),
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
