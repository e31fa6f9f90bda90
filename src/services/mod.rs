// 服务层模块
//
// 目录结构：
// - filter: live/database 对象转换与模型迁移
// - encryption: 整对象加解密
// - translate: 静态翻译查找
// - action: 网格元素动作（语音触发）

pub mod action;
pub mod encryption;
pub mod filter;
pub mod translate;

// 重新导出服务
pub use action::{ActionService, ElementSource, SpeechSynthesizer};
pub use encryption::{CryptoContext, EncryptionError, KdfParams};
pub use filter::{create_filter_service, FilterError, FilterOptions, FilterService, ModelUpgrade};
pub use translate::TranslateService;
