//! 服务器启动错误
//!
//! API 处理器统一使用 [`shared::AppError`]；这里的 [`ServerError`]
//! 只覆盖启动和运行阶段 (目录创建、端口绑定、后台任务)。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 启动路径的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
