/// 定位算法模块
///
/// 该模块提供基于 WiFi 指纹的室内定位，支持：
/// - 多次扫描聚合为指纹库
/// - 按信号强度指数加权的相似度计算
/// - 覆盖率惩罚和置信度阈值
/// - 可配置的模型参数

pub mod fingerprint;
pub mod location_algorithms;
pub mod observation;
pub mod results;
pub mod similarity;

pub use fingerprint::*;
pub use location_algorithms::*;
pub use observation::*;
pub use results::*;
pub use similarity::*;
