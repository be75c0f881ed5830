//! 消息处理器（MessageHandler / EventListener）
//!
//! - `MessageHandler`：面向原始消息的处理器，管道直接调用；
//! - `EventListener`：面向已解码、已校验领域事件的业务处理器；
//! - `DecodingHandler`：把 `EventListener` 适配为 `MessageHandler`，
//!   依次执行“解码 → 校验 → 业务处理”。解码与校验失败均为不可重试错误。
//!
use crate::failure::ProcessingError;
use crate::record::ConsumerRecord;
use async_trait::async_trait;
use senik_domain::{SenikEvent, codec};

/// 原始消息处理器
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// 处理器名称（用于日志）
    fn handler_name(&self) -> &str;

    /// 处理消息；`attempt` 为本次尝试序号（从 1 开始）
    async fn handle(&self, record: &ConsumerRecord, attempt: u32) -> Result<(), ProcessingError>;
}

/// 领域事件处理器
#[async_trait]
pub trait EventListener: Send + Sync {
    fn listener_name(&self) -> &str;

    async fn on_event(
        &self,
        event: &SenikEvent,
        record: &ConsumerRecord,
    ) -> Result<(), ProcessingError>;
}

/// 解码并校验后交给 `EventListener`
pub struct DecodingHandler<L> {
    listener: L,
}

impl<L> DecodingHandler<L>
where
    L: EventListener,
{
    pub fn new(listener: L) -> Self {
        Self { listener }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }
}

#[async_trait]
impl<L> MessageHandler for DecodingHandler<L>
where
    L: EventListener,
{
    fn handler_name(&self) -> &str {
        self.listener.listener_name()
    }

    async fn handle(&self, record: &ConsumerRecord, _attempt: u32) -> Result<(), ProcessingError> {
        let event = codec::decode_validated(record.value())?;
        self.listener.on_event(&event, record).await
    }
}
