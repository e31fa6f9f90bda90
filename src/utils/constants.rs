// 应用级共享常量
//
// 进程启动后只读，任何模块不得在运行期修改这些值

/// 当前数据模型版本的规范序列化形式
///
/// 所有写入数据库的对象在 `modelVersion` 字段中携带该字符串。
/// 解析结果必须与 `models::version::latest_model_version()` 一致。
pub const MODEL_VERSION: &str = r#"{"major": 1, "minor": 0, "patch": 0}"#;

/// 网格元素事件标识
pub const ELEMENT_EVENT_ID: &str = "ELEMENT_EVENT_ID";

/// 未登录场景下使用的本地默认用户名
pub const LOCAL_NOLOGIN_USERNAME: &str = "local-default-user";

// 数据库事件标识
pub const EVENT_DB_CONNECTION_LOST: &str = "EVENT_DB_CONNECTION_LOST";
pub const EVENT_DB_PULL_UPDATED: &str = "EVENT_DB_PULL_UPDATED";
pub const EVENT_DB_SYNC_STATE_CHANGE: &str = "EVENT_DB_SYNC_STATE_CHANGE";

// 同步状态标识
pub const DB_SYNC_STATE_SYNCINC: &str = "DB_SYNC_STATE_SYNCINC";
pub const DB_SYNC_STATE_SYNCED: &str = "DB_SYNC_STATE_SYNCED";
pub const DB_SYNC_STATE_STOPPED: &str = "DB_SYNC_STATE_STOPPED";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_version_constant_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(MODEL_VERSION).unwrap();
        assert_eq!(value["major"], 1);
        assert_eq!(value["minor"], 0);
        assert_eq!(value["patch"], 0);
    }
}
