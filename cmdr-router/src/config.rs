use std::ffi::OsString;

/// 代码搜索路径的环境变量
pub const SEARCH_PATH_ENV: &str = "CMDR_PATH";

/// 命令类型的发现来源
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DiscoverySource {
    /// 链接期登记表中的全部类型
    #[default]
    Linked,
    /// 扫描平台分隔的搜索路径（目录与归档文件）
    SearchPath(OsString),
}

/// 路由器配置
#[derive(Clone, Debug)]
pub struct RouterConfig {
    pub source: DiscoverySource,
    /// 串行工作线程名
    pub worker_name: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            source: DiscoverySource::Linked,
            worker_name: "cmdr-router".to_string(),
        }
    }
}

impl RouterConfig {
    /// 从进程环境读取配置：设置了 `CMDR_PATH` 则扫描该路径，否则使用链接期登记表
    pub fn from_env() -> Self {
        Self::from_search_path(std::env::var_os(SEARCH_PATH_ENV))
    }

    fn from_search_path(value: Option<OsString>) -> Self {
        let source = match value {
            Some(path) if !path.is_empty() => DiscoverySource::SearchPath(path),
            _ => DiscoverySource::Linked,
        };
        Self {
            source,
            ..Self::default()
        }
    }

    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.source = DiscoverySource::SearchPath(path.into());
        self
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }
}
