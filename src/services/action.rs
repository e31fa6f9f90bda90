// 网格元素动作服务
//
// 解析网格元素并朗读其标签。元素读取与语音合成都是外部协作方，
// 通过窄接口注入，本服务只做编排。

use crate::models::record::Record;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// 网格元素来源（由持久层实现）
#[async_trait]
pub trait ElementSource: Send + Sync {
    /// 按网格 id 与元素 id 读取单个元素
    async fn get_grid_element(&self, grid_id: &str, element_id: &str) -> Result<Record>;
}

/// 语音合成器（由平台层实现）
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// 朗读一段文本
    async fn speak(&self, text: &str) -> Result<()>;
}

/// 动作服务
pub struct ActionService {
    source: Arc<dyn ElementSource>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl ActionService {
    pub fn new(source: Arc<dyn ElementSource>, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            source,
            synthesizer,
        }
    }

    /// 执行网格元素动作：读取元素并朗读其 label 字段
    ///
    /// 元素没有标签时跳过朗读；来源与合成器的错误原样向上传播。
    pub async fn do_action(&self, grid_id: &str, element_id: &str) -> Result<()> {
        let element = self.source.get_grid_element(grid_id, element_id).await?;
        tracing::debug!(grid_id, element_id, element = ?element, "执行网格元素动作");

        match element.get("label").and_then(Value::as_str) {
            Some(label) if !label.is_empty() => self.synthesizer.speak(label).await,
            _ => {
                tracing::warn!(grid_id, element_id, "网格元素没有可朗读的标签，跳过");
                Ok(())
            }
        }
    }
}
