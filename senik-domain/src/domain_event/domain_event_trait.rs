use super::Metadata;
use crate::error::DomainResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use uuid::Uuid;

/// 领域事件载荷需要满足的通用能力边界
pub trait DomainEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync
{
    /// 事件唯一标识
    fn event_id(&self) -> Uuid;

    /// 事件类型（如 `IncomeCalculated`）
    fn event_type(&self) -> &'static str;

    /// 事件所属聚合的标识
    fn aggregate_id(&self) -> String;

    /// 事件所属聚合的类型（如 `income`）
    fn aggregate_type(&self) -> &'static str;

    /// 事件发生时间
    fn occurred_at(&self) -> DateTime<Utc>;

    /// 载荷校验；解码后、交给业务处理前调用
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }

    fn metadata(&self) -> Metadata {
        Metadata::builder()
            .event_id(self.event_id())
            .event_type(self.event_type())
            .aggregate_id(self.aggregate_id())
            .aggregate_type(self.aggregate_type())
            .occurred_at(self.occurred_at())
            .build()
    }
}
