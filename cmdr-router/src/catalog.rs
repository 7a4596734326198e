//! 类型目录（TypeCatalog）
//!
//! 扮演“加载器”的角色：发现阶段把候选类型名交给 `TypeLoader` 解析成描述符，
//! 只读取元信息，不做实例化。默认目录来自链接期登记表，也可以由宿主程序显式列出。
//!
use crate::error::DiscoveryError;
use cmdr_core::{COMMANDS, CommandDescriptor};
use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;
use tracing::warn;

/// 类型加载器：按完全限定名解析类型元信息
pub trait TypeLoader: Send + Sync {
    fn resolve(&self, name: &str) -> Result<CommandDescriptor, DiscoveryError>;

    /// 加载器本身已知的全部类型名（不经搜索路径时的候选集合）
    fn candidates(&self) -> Vec<&'static str>;
}

#[derive(Clone, Debug, Default)]
pub struct TypeCatalog {
    types: BTreeMap<&'static str, CommandDescriptor>,
    hidden: BTreeSet<String>,
}

impl TypeCatalog {
    /// 由链接期登记表构建
    pub fn linked() -> Self {
        Self::from_descriptors(COMMANDS.iter().copied())
    }

    /// 由显式清单构建；重名时保留先出现的描述符
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = CommandDescriptor>,
    {
        let mut types = BTreeMap::new();
        for d in descriptors {
            match types.entry(d.name()) {
                Entry::Vacant(slot) => {
                    slot.insert(d);
                }
                Entry::Occupied(_) => {
                    warn!(type_name = d.name(), "duplicate type registration ignored");
                }
            }
        }
        Self {
            types,
            hidden: BTreeSet::new(),
        }
    }

    /// 对本加载器隐藏某个类型：解析时返回 `IllegalAccess`
    pub fn hide(mut self, name: impl Into<String>) -> Self {
        self.hidden.insert(name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeLoader for TypeCatalog {
    fn resolve(&self, name: &str) -> Result<CommandDescriptor, DiscoveryError> {
        if self.hidden.contains(name) {
            return Err(DiscoveryError::IllegalAccess {
                name: name.to_string(),
            });
        }
        self.types
            .get(name)
            .copied()
            .ok_or_else(|| DiscoveryError::Unresolved {
                name: name.to_string(),
            })
    }

    fn candidates(&self) -> Vec<&'static str> {
        self.types.keys().copied().collect()
    }
}
