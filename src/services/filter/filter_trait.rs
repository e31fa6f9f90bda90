// 模型升级接口
//
// 基于 major 版本号驱动的对象结构升级系统

use crate::models::record::Record;
use crate::services::encryption::CryptoContext;
use anyhow::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

/// 单个版本边界的结构升级步骤
///
/// 每个实现覆盖一个边界 N -> N+1：`from_major()` 为 N，
/// `apply` 把 N 版对象转换为 N+1 版对象。管线按边界递增顺序
/// 依次应用 [对象版本, 最新版本) 区间内的所有步骤。
pub trait ModelUpgrade: Send + Sync {
    /// 步骤唯一标识（用于日志）
    fn id(&self) -> &str;

    /// 该步骤升级的起始 major 版本（目标为 from_major() + 1）
    fn from_major(&self) -> u64;

    /// 对单个对象应用结构升级
    ///
    /// 失败时错误原样向上传播，管线不补充上下文、不重试。
    fn apply(&self, object: Record, options: &FilterOptions) -> Result<Record>;
}

/// 转换选项，原样透传给链中的每个过滤步骤
///
/// 管线自身无状态，加解密所需的密钥上下文随调用传入。
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// 加密上下文；to_database / 非遗留对象的 from_database 必需
    pub crypto: Option<Arc<CryptoContext>>,
    /// 各过滤步骤自定义设置
    pub extras: Map<String, Value>,
}

impl FilterOptions {
    /// 携带加密上下文的转换选项
    pub fn with_crypto(context: CryptoContext) -> Self {
        Self {
            crypto: Some(Arc::new(context)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_have_no_crypto() {
        let options = FilterOptions::default();
        assert!(options.crypto.is_none());
        assert!(options.extras.is_empty());
    }

    #[test]
    fn test_with_crypto() {
        let options = FilterOptions::with_crypto(CryptoContext::from_key([1u8; 32]));
        assert!(options.crypto.is_some());
    }
}
