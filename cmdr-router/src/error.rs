//! 发现、填充与路由器错误
//!
//! 发现与填充阶段的错误只会被记录并跳过对应的条目，从不中断整个扫描/填充过程；
//! 命令执行失败不属于这里，见 `cmdr_core::ActionError`。
//!
use std::path::PathBuf;
use thiserror::Error;

/// 扫描期错误：不可读的归档、无法解析的类型等
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("unresolved type: {name}")]
    Unresolved { name: String },

    #[error("illegal access: type {name} is not visible to this loader")]
    IllegalAccess { name: String },

    #[error("invalid unit name: {}", path.display())]
    InvalidName { path: PathBuf },

    #[error("cannot walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot open archive {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// 填充期错误：某个已发现类型无法实例化
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PopulationError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("type is not concrete: {name}")]
    NotConcrete { name: String },

    #[error("no default constructor: {name}")]
    NoConstructor { name: String },

    #[error("constructor panicked: type={name}, reason={reason}")]
    Panicked { name: String, reason: String },
}

/// 路由器自身的错误（命令执行失败不会以 `Err` 形式返回）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("cannot start router worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("router worker is closed")]
    Closed,
}
