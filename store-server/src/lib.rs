//! Bloom Store Server - 花店电商后端
//!
//! # 架构概述
//!
//! 本模块是 Bloom Store 的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (用户、商品、订单)
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **下单流程** (`checkout`): 校验、库存预留、金额计算
//! - **文件存储** (`files`): 商品图片与付款凭证
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── auth/          # JWT 认证、权限
//! ├── checkout/      # 下单流程与金额计算
//! ├── files/         # 上传文件存储
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装与中间件栈
//! ├── utils/         # 工具函数
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod checkout;
pub mod core;
pub mod db;
pub mod files;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use checkout::CheckoutService;
pub use core::{Config, Server, ServerState};
pub use files::FileStore;

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:ident, $event:expr) => {
        tracing::info!(
            target: "security",
            level = stringify!($level),
            event = $event
        );
    };
    ($level:ident, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            level = stringify!($level),
            event = $event,
            $($arg)*
        );
    };
}

/// 初始化运行环境 (dotenv + 日志)
///
/// 必须在加载配置之前调用，`.env` 里的变量要先进环境。
pub fn setup_environment() -> anyhow::Result<()> {
    // Load .env if present; deployments usually set real env vars
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____  __
   / __ )/ /___  ____  ____ ___
  / __  / / __ \/ __ \/ __ `__ \
 / /_/ / / /_/ / /_/ / / / / / /
/_____/_/\____/\____/_/ /_/ /_/
   _____ __
  / ___// /_____  ________
  \__ \/ __/ __ \/ ___/ _ \
 ___/ / /_/ /_/ / /  /  __/
/____/\__/\____/_/   \___/
    "#
    );
}
