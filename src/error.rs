/// 错误类型定义

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("读写文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("指纹数据格式无效: {0}")]
    InvalidFeed(String),
    #[error("WiFi 扫描失败: {0}")]
    ScanFailed(String),
    #[error("指纹库锁已被污染")]
    StoreLock,
}
