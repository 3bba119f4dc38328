//! 工具模块 - 通用工具函数
//!
//! # 内容
//!
//! - [`logger`] - tracing 日志初始化 (终端 + 按天滚动文件)

pub mod logger;

pub use logger::{init_logger, init_logger_with_file};
