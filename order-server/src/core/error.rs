use shared::error::AppError;
use thiserror::Error;

use crate::auth::JwtError;

/// 启动与运行期错误（请求级错误走 `AppError`）
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(#[from] JwtError),

    #[error("数据库错误: {0}")]
    Database(AppError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AppError> for ServerError {
    fn from(err: AppError) -> Self {
        ServerError::Database(err)
    }
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
