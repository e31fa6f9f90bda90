// 数据对象模型
//
// 对象统一表示为不透明的 JSON 字段映射，转换管线不关心业务字段。

use serde_json::{Map, Value};

/// 一条持久化实体（如网格元素）的字段映射
pub type Record = Map<String, Value>;

/// 对象主键字段名
pub const ID_FIELD: &str = "id";

/// 对象模型版本字段名
pub const MODEL_VERSION_FIELD: &str = "modelVersion";

/// 加密载荷字段名（数据库对象）
pub const ENCRYPTED_DATA_FIELD: &str = "encryptedDataBase64";

/// 转换入参/出参：单个对象或有序对象列表
///
/// 单个入则单个出，列表入则等长同序列表出。
#[derive(Debug, Clone, PartialEq)]
pub enum Objects {
    Single(Record),
    Batch(Vec<Record>),
}

impl Objects {
    /// 对每个对象独立应用 `f`，保持 Single/Batch 形态与列表顺序
    ///
    /// 任一对象失败则整体返回该错误，已完成的前缀不对外暴露。
    pub fn try_map<E>(
        self,
        mut f: impl FnMut(Record) -> Result<Record, E>,
    ) -> Result<Self, E> {
        match self {
            Objects::Single(record) => Ok(Objects::Single(f(record)?)),
            Objects::Batch(records) => {
                let mut converted = Vec::with_capacity(records.len());
                for record in records {
                    converted.push(f(record)?);
                }
                Ok(Objects::Batch(converted))
            }
        }
    }

    /// 对象数量
    pub fn len(&self) -> usize {
        match self {
            Objects::Single(_) => 1,
            Objects::Batch(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取出单个对象（Batch 形态返回 None）
    pub fn into_single(self) -> Option<Record> {
        match self {
            Objects::Single(record) => Some(record),
            Objects::Batch(_) => None,
        }
    }

    /// 取出对象列表（Single 形态包装为单元素列表）
    pub fn into_vec(self) -> Vec<Record> {
        match self {
            Objects::Single(record) => vec![record],
            Objects::Batch(records) => records,
        }
    }
}

impl From<Record> for Objects {
    fn from(record: Record) -> Self {
        Objects::Single(record)
    }
}

impl From<Vec<Record>> for Objects {
    fn from(records: Vec<Record>) -> Self {
        Objects::Batch(records)
    }
}
