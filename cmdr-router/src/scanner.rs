//! 插件扫描器（PluginScanner）
//!
//! 在没有中心清单的前提下定位实现了指定能力的全部具体类型：
//! - 按平台路径分隔符拆分代码搜索路径；
//! - 目录：递归遍历，收集非空的 `*.unit` 文件，去掉目录前缀与后缀，把路径分隔符换成 `::`；
//! - 归档（zip）：枚举条目，对 `/` 与 `\` 两种分隔符做同样的名称修正；
//! - 每个候选名交给 `TypeLoader` 解析元信息，解析失败只记录并跳过；
//! - 仅保留具体类型且实现了任一请求能力的候选，去重并按名称排序返回。
//!
//! 排序保证了注册顺序的确定性：同名动作下先注册的命令先执行。
//!
use crate::catalog::TypeLoader;
use crate::error::DiscoveryError;
use cmdr_core::Capability;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

/// 编译单元后缀
pub const UNIT_SUFFIX: &str = ".unit";

/// 命名空间分隔符
pub const NAMESPACE_SEPARATOR: &str = "::";

pub struct PluginScanner<'a> {
    loader: &'a dyn TypeLoader,
    // None 表示直接使用加载器自身的候选集合
    entries: Option<Vec<PathBuf>>,
}

impl<'a> PluginScanner<'a> {
    /// 不扫描文件系统，过滤加载器已知的全部类型
    pub fn linked(loader: &'a dyn TypeLoader) -> Self {
        Self {
            loader,
            entries: None,
        }
    }

    /// 扫描平台分隔的代码搜索路径
    pub fn search_path(loader: &'a dyn TypeLoader, path: impl AsRef<OsStr>) -> Self {
        let entries = std::env::split_paths(path.as_ref())
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        Self {
            loader,
            entries: Some(entries),
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        self.entries.as_deref().unwrap_or(&[])
    }

    /// 返回实现了 `roots` 中任一能力的具体类型名（已排序、去重）
    pub fn discover(&self, roots: &[Capability]) -> BTreeSet<String> {
        let mut found = BTreeSet::new();

        match &self.entries {
            None => {
                for name in self.loader.candidates() {
                    if self.is_child_of(roots, name) {
                        found.insert(name.to_string());
                    }
                }
            }
            Some(entries) => {
                for entry in entries {
                    self.scan_entry(entry, roots, &mut found);
                }
            }
        }

        debug!(count = found.len(), "discovery finished");
        found
    }

    fn scan_entry(&self, entry: &Path, roots: &[Capability], found: &mut BTreeSet<String>) {
        if entry.is_dir() {
            self.scan_dir(entry, roots, found);
        } else if entry.is_file() {
            self.scan_archive(entry, roots, found);
        } else {
            debug!(path = %entry.display(), "search path entry does not exist");
        }
    }

    fn scan_dir(&self, root: &Path, roots: &[Capability], found: &mut BTreeSet<String>) {
        debug!(path = %root.display(), "scanning directory");

        for item in WalkDir::new(root).follow_links(true) {
            let item = match item {
                Ok(item) => item,
                Err(source) => {
                    let path = source
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    let err = DiscoveryError::Walk { path, source };
                    warn!(error = %err, "skipping unreadable path");
                    continue;
                }
            };

            if !item.file_type().is_file() {
                continue;
            }
            let is_unit = item
                .file_name()
                .to_str()
                .is_some_and(|n| n.ends_with(UNIT_SUFFIX));
            if !is_unit {
                continue;
            }
            // 空文件不是有效的编译单元
            let len = item.metadata().map(|m| m.len()).unwrap_or(0);
            if len == 0 {
                continue;
            }

            match unit_name_from_path(root, item.path()) {
                Ok(name) => {
                    if self.is_child_of(roots, &name) {
                        found.insert(name);
                    }
                }
                Err(err) => warn!(error = %err, "skipping unit"),
            }
        }
    }

    fn scan_archive(&self, path: &Path, roots: &[Capability], found: &mut BTreeSet<String>) {
        debug!(path = %path.display(), "scanning archive");

        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) => {
                let err = DiscoveryError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                warn!(error = %err, "skipping archive");
                return;
            }
        };
        let archive = match ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(source) => {
                let err = DiscoveryError::Archive {
                    path: path.to_path_buf(),
                    source,
                };
                warn!(error = %err, "skipping archive");
                return;
            }
        };

        for entry in archive.file_names() {
            if let Some(name) = unit_name_from_entry(entry) {
                if self.is_child_of(roots, &name) {
                    found.insert(name);
                }
            }
        }
    }

    fn is_child_of(&self, roots: &[Capability], name: &str) -> bool {
        match self.loader.resolve(name) {
            Ok(d) if d.is_concrete() && d.implements_any(roots) => true,
            Ok(d) => {
                let capabilities: Vec<&str> = d.capabilities().iter().map(Capability::name).collect();
                debug!(unit = name, kind = ?d.kind(), ?capabilities, "candidate filtered out");
                false
            }
            Err(err) => {
                warn!(unit = name, error = %err, "skipping unresolvable unit");
                false
            }
        }
    }
}

/// `root/a/b/Save.unit` -> `a::b::Save`
fn unit_name_from_path(root: &Path, path: &Path) -> Result<String, DiscoveryError> {
    let invalid = || DiscoveryError::InvalidName {
        path: path.to_path_buf(),
    };

    let rel = path.strip_prefix(root).map_err(|_| invalid())?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?),
            _ => return Err(invalid()),
        }
    }

    let joined = parts.join(NAMESPACE_SEPARATOR);
    valid_type_name(joined.strip_suffix(UNIT_SUFFIX)).ok_or_else(invalid)
}

/// 归档条目可能使用任一平台的路径分隔符：`a/b\Save.unit` -> `a::b::Save`
fn unit_name_from_entry(entry: &str) -> Option<String> {
    let stem = entry.strip_suffix(UNIT_SUFFIX)?;
    let name = stem.replace(['\\', '/'], NAMESPACE_SEPARATOR);
    valid_type_name(Some(&name))
}

fn valid_type_name(name: Option<&str>) -> Option<String> {
    name.filter(|n| {
        !n.is_empty() && n.split(NAMESPACE_SEPARATOR).all(|segment| !segment.is_empty())
    })
    .map(str::to_string)
}
