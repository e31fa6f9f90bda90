// 数据模型版本注册表
//
// 提供进程级的最新模型版本常量，以及对象上 modelVersion 字段的宽松解析。
// major 版本号驱动迁移，minor/patch 仅作信息用途。

use crate::utils::constants::MODEL_VERSION;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 数据模型版本
///
/// 迁移只比较 `major`；缺失字段反序列化为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelVersion {
    #[serde(default)]
    pub major: u64,
    #[serde(default)]
    pub minor: u64,
    #[serde(default)]
    pub patch: u64,
}

/// 最新模型版本（从规范常量解析一次）
static LATEST_MODEL_VERSION: Lazy<ModelVersion> = Lazy::new(|| {
    serde_json::from_str(MODEL_VERSION).expect("invalid MODEL_VERSION constant")
});

/// 获取最新模型版本
pub fn latest_model_version() -> &'static ModelVersion {
    &LATEST_MODEL_VERSION
}

/// 获取最新模型版本的规范序列化形式
///
/// 保证 `ModelVersion::resolve` 解析该字符串后与 `latest_model_version()` 相等。
pub fn model_version_string() -> &'static str {
    MODEL_VERSION
}

impl ModelVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// 版本化之前的遗留数据版本
    pub const fn legacy() -> Self {
        Self::new(0, 0, 0)
    }

    /// 是否为遗留数据（引入 modelVersion 与加密之前写入）
    ///
    /// `modelVersion` 缺失、无 major 字段或无法解析时都会解析为 major 0。
    pub fn is_legacy(&self) -> bool {
        self.major == 0
    }

    /// 解析对象上的 modelVersion 字段值
    ///
    /// 支持三种形式：
    /// - 对象形式 `{"major": 1, "minor": 0, "patch": 0}`（内存中的 live 对象）
    /// - 序列化字符串形式（数据库对象，规范形式见 `MODEL_VERSION`）
    /// - 裸版本字符串（如 "1.0.0"，极早期记录）
    ///
    /// 其余情况视为遗留数据，返回 0.0.0。
    pub fn resolve(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::legacy(),
            Some(object @ Value::Object(_)) => match serde_json::from_value(object.clone()) {
                Ok(version) => version,
                Err(_) => Self::legacy(),
            },
            Some(Value::String(raw)) => {
                if let Ok(version) = serde_json::from_str::<ModelVersion>(raw) {
                    return version;
                }
                match Self::parse_loose(raw) {
                    Some(version) => version,
                    None => {
                        tracing::warn!(raw = %raw, "无法解析 modelVersion，按遗留数据处理");
                        Self::legacy()
                    }
                }
            }
            Some(other) => {
                tracing::warn!(value = ?other, "modelVersion 类型异常，按遗留数据处理");
                Self::legacy()
            }
        }
    }

    /// 宽松解析裸版本字符串（允许 "v1.0.0" 等前后缀）
    fn parse_loose(version: &str) -> Option<Self> {
        static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(\d+\.\d+\.\d+(?:-[0-9A-Za-z\.-]+)?)").expect("invalid version regex")
        });

        let trimmed = version.trim();
        let captures = VERSION_REGEX.captures(trimmed)?;
        let matched = captures.get(1)?.as_str();

        let parsed = semver::Version::parse(matched).ok()?;
        Some(Self::new(parsed.major, parsed.minor, parsed.patch))
    }
}

impl std::fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_latest_version_roundtrip() {
        // 规范字符串解析结果必须与最新版本一致
        let resolved = ModelVersion::resolve(Some(&Value::String(
            model_version_string().to_string(),
        )));
        assert_eq!(&resolved, latest_model_version());
        assert_eq!(latest_model_version().major, 1);
    }

    #[test]
    fn test_resolve_object_form() {
        let value = json!({"major": 1, "minor": 2, "patch": 3});
        assert_eq!(
            ModelVersion::resolve(Some(&value)),
            ModelVersion::new(1, 2, 3)
        );
    }

    #[test]
    fn test_resolve_partial_object_defaults_to_zero() {
        let value = json!({"minor": 5});
        let version = ModelVersion::resolve(Some(&value));
        assert!(version.is_legacy());
        assert_eq!(version.minor, 5);
    }

    #[test]
    fn test_resolve_missing_is_legacy() {
        assert!(ModelVersion::resolve(None).is_legacy());
        assert!(ModelVersion::resolve(Some(&Value::Null)).is_legacy());
    }

    #[test]
    fn test_resolve_loose_strings() {
        assert_eq!(
            ModelVersion::resolve(Some(&json!("1.0.0"))),
            ModelVersion::new(1, 0, 0)
        );
        assert_eq!(
            ModelVersion::resolve(Some(&json!("v2.3.4"))),
            ModelVersion::new(2, 3, 4)
        );
    }

    #[test]
    fn test_resolve_garbage_is_legacy() {
        assert!(ModelVersion::resolve(Some(&json!("not a version"))).is_legacy());
        assert!(ModelVersion::resolve(Some(&json!(42))).is_legacy());
    }

    #[test]
    fn test_ordering_by_major_first() {
        assert!(ModelVersion::new(2, 0, 0) > ModelVersion::new(1, 9, 9));
        assert!(ModelVersion::new(1, 1, 0) > ModelVersion::new(1, 0, 9));
    }
}
