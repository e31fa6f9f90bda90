// 转换过滤服务核心
//
// live 对象与数据库对象之间的双向转换管线：
// - live -> database：结构升级 -> 版本标记 -> 加密
// - database -> live：解密（遗留对象跳过）-> 结构升级 -> 版本标记

use super::filter_trait::{FilterOptions, ModelUpgrade};
use crate::models::record::{Record, MODEL_VERSION_FIELD};
use crate::models::version::{latest_model_version, model_version_string, ModelVersion};
use crate::models::Objects;
use crate::services::encryption;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// 转换过滤服务错误类型
#[derive(Error, Debug)]
pub enum FilterError {
    /// 对象由更新版本的程序写入，当前代码无法理解其结构
    #[error("对象模型版本 {found} 高于当前支持的 {latest}，拒绝转换")]
    FutureModelVersion {
        found: ModelVersion,
        latest: ModelVersion,
    },
}

/// 转换过滤服务
///
/// 自身无状态：每次调用只操作传入对象与只读的升级步骤表，
/// 可从多个调用方并发使用。
pub struct FilterService {
    upgrades: Vec<Arc<dyn ModelUpgrade>>,
}

impl FilterService {
    pub fn new() -> Self {
        Self {
            upgrades: Vec::new(),
        }
    }

    /// 注册一个版本边界的升级步骤
    pub fn register(&mut self, upgrade: Arc<dyn ModelUpgrade>) {
        tracing::debug!(
            "注册模型升级步骤: {} ({} → {})",
            upgrade.id(),
            upgrade.from_major(),
            upgrade.from_major() + 1
        );
        self.upgrades.push(upgrade);
    }

    /// 已注册的升级步骤数量
    pub fn upgrade_count(&self) -> usize {
        self.upgrades.len()
    }

    /// 把内存中的 live 对象转换为可写入数据库的对象（加密）
    ///
    /// 对每个对象独立处理：按其 modelVersion 计算升级链，
    /// 标记为当前版本后加密。已是最新版本的对象升级链为空，
    /// 版本标记与加密仍然执行。
    pub fn to_database(
        &self,
        objects: impl Into<Objects>,
        options: &FilterOptions,
    ) -> Result<Objects> {
        let objects = objects.into();
        tracing::debug!(count = objects.len(), before = ?objects, "转换为数据库对象 - 过滤前");
        let filtered = objects.try_map(|record| self.convert_to_database(record, options))?;
        tracing::debug!(after = ?filtered, "转换为数据库对象 - 过滤后");
        Ok(filtered)
    }

    /// 把数据库对象转换为应用使用的 live 对象（解密）
    ///
    /// 携带 major 版本号的对象先解密；版本化之前写入的遗留对象
    /// 没有加密，跳过解密步骤。随后按相同规则计算升级链并标记版本。
    pub fn from_database(
        &self,
        objects: impl Into<Objects>,
        options: &FilterOptions,
    ) -> Result<Objects> {
        let objects = objects.into();
        tracing::debug!(count = objects.len(), before = ?objects, "转换为应用对象 - 过滤前");
        let filtered = objects.try_map(|record| self.convert_from_database(record, options))?;
        tracing::debug!(after = ?filtered, "转换为应用对象 - 过滤后");
        Ok(filtered)
    }

    fn convert_to_database(&self, record: Record, options: &FilterOptions) -> Result<Record> {
        let version = ModelVersion::resolve(record.get(MODEL_VERSION_FIELD));
        self.ensure_not_future(&version)?;

        let upgraded = self.apply_upgrades(record, &version, options)?;
        let stamped = stamp_model_version(upgraded);
        // 加密是写入数据库前的最后一步
        let encrypted = encryption::encrypt_object(stamped, options)?;
        Ok(encrypted)
    }

    fn convert_from_database(&self, record: Record, options: &FilterOptions) -> Result<Record> {
        let version = ModelVersion::resolve(record.get(MODEL_VERSION_FIELD));
        self.ensure_not_future(&version)?;

        // 引入 modelVersion 之前写入的对象没有加密，无需解密
        let decrypted = if version.is_legacy() {
            record
        } else {
            encryption::decrypt_objects(record, options)?
        };

        let upgraded = self.apply_upgrades(decrypted, &version, options)?;
        Ok(stamp_model_version(upgraded))
    }

    /// 按版本边界递增顺序应用 [from.major, latest.major) 区间内的升级步骤
    ///
    /// 区间为空（对象已是最新版本）时原样返回。
    fn apply_upgrades(
        &self,
        record: Record,
        from: &ModelVersion,
        options: &FilterOptions,
    ) -> Result<Record> {
        let latest = latest_model_version();
        if from.major >= latest.major {
            return Ok(record);
        }

        let mut pending: Vec<_> = self
            .upgrades
            .iter()
            .filter(|upgrade| {
                upgrade.from_major() >= from.major && upgrade.from_major() < latest.major
            })
            .collect();
        pending.sort_by_key(|upgrade| upgrade.from_major());

        let mut record = record;
        for upgrade in pending {
            tracing::debug!(
                "应用模型升级步骤: {} ({} → {})",
                upgrade.id(),
                upgrade.from_major(),
                upgrade.from_major() + 1
            );
            record = upgrade.apply(record, options)?;
        }
        Ok(record)
    }

    fn ensure_not_future(&self, version: &ModelVersion) -> Result<()> {
        let latest = latest_model_version();
        if version.major > latest.major {
            return Err(FilterError::FutureModelVersion {
                found: *version,
                latest: *latest,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for FilterService {
    fn default() -> Self {
        Self::new()
    }
}

/// 把对象的 modelVersion 写为当前版本的规范字符串
///
/// 在所有结构升级之后执行；对已是当前版本的对象幂等。
fn stamp_model_version(mut record: Record) -> Record {
    record.insert(
        MODEL_VERSION_FIELD.to_string(),
        Value::String(model_version_string().to_string()),
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_stamp_writes_canonical_string() {
        let stamped = stamp_model_version(record(json!({"label": "Hi"})));
        assert_eq!(
            stamped[MODEL_VERSION_FIELD],
            Value::String(model_version_string().to_string())
        );

        // 幂等：再次标记不改变内容
        let again = stamp_model_version(stamped.clone());
        assert_eq!(again, stamped);
    }

    #[test]
    fn test_future_version_rejected() {
        let service = FilterService::new();
        let future = ModelVersion::new(latest_model_version().major + 1, 0, 0);
        let err = service.ensure_not_future(&future).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FilterError>(),
            Some(FilterError::FutureModelVersion { .. })
        ));
    }

    #[test]
    fn test_current_version_accepted() {
        let service = FilterService::new();
        assert!(service.ensure_not_future(latest_model_version()).is_ok());
        assert!(service.ensure_not_future(&ModelVersion::legacy()).is_ok());
    }
}
