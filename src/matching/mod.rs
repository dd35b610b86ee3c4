/// 目的地匹配模块
///
/// 把含噪声的语音识别文本或键入文本解析为目录中的唯一地点：
/// - 编辑距离
/// - 复合名称登记表（可注入）
/// - 逐词打分与置信度阈值
/// - 输入联想过滤

pub mod directory;
pub mod distance;
pub mod matcher;
pub mod scorer;

pub use directory::*;
pub use distance::*;
pub use matcher::*;
pub use scorer::*;
