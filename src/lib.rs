//! 无障碍室内导航核心
//!
//! - `algorithms`：WiFi 指纹库构建与定位
//! - `matching`：语音/文本目的地匹配与地点目录
//! - `positioning`：定位服务、指纹库更新与周期定位
//! - `storage` / `feed`：指纹库持久化与历史扫描来源

pub mod algorithms;
pub mod config;
pub mod error;
pub mod feed;
pub mod matching;
pub mod positioning;
pub mod storage;

pub use error::NavError;
