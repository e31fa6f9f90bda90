// 转换过滤模块
//
// live 对象与数据库对象之间的统一转换系统

mod filter_trait;
mod service;


pub use filter_trait::{FilterOptions, ModelUpgrade};
pub use service::{FilterError, FilterService};

/// 创建并初始化转换过滤服务
///
/// 模型版本变更记录：
/// - V0 -> V1：引入加密与所有数据模型上的 modelVersion 字段
///   （由管线的版本标记与加解密步骤完成，无需结构升级）
///
/// 新增破坏性版本 N+1 时，只需在此注册边界 N -> N+1 的升级步骤；
/// 更旧的对象会按边界递增顺序依次通过所有中间步骤。
pub fn create_filter_service() -> FilterService {
    let service = FilterService::new();

    tracing::debug!(
        "转换过滤服务初始化完成，已注册 {} 个升级步骤",
        service.upgrade_count()
    );

    service
}
