//! 收入计算（income）领域模型
//!
//! `IncomeCalculated`：某个法律实体（个人）的收入计算完成后发布的事件。
//!
use crate::domain_event::DomainEvent;
use crate::error::{DomainError, DomainResult};
use crate::value_object::{Money, ValueObject};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

entity_id! {
    /// 收入记录标识（聚合 ID）
    pub struct IncomeId;
}

entity_id! {
    /// 法律实体（个人/公司）标识
    pub struct LegalEntityId;
}

/// 收入已计算事件
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeCalculated {
    #[builder(default = Uuid::new_v4())]
    event_id: Uuid,
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
    income_id: IncomeId,
    individual_id: LegalEntityId,
    income: Money,
}

impl IncomeCalculated {
    pub const EVENT_TYPE: &'static str = "IncomeCalculated";
    /// 上游生产者以完整类名作为判别值
    pub const QUALIFIED_TYPE: &'static str = "gr.senik.admin.domain.model.IncomeCalculated";
    pub const AGGREGATE_TYPE: &'static str = "income";

    pub fn income_id(&self) -> IncomeId {
        self.income_id
    }

    pub fn individual_id(&self) -> LegalEntityId {
        self.individual_id
    }

    pub fn income(&self) -> &Money {
        &self.income
    }
}

impl DomainEvent for IncomeCalculated {
    fn event_id(&self) -> Uuid {
        self.event_id
    }

    fn event_type(&self) -> &'static str {
        Self::EVENT_TYPE
    }

    fn aggregate_id(&self) -> String {
        self.income_id.to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        Self::AGGREGATE_TYPE
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn validate(&self) -> DomainResult<()> {
        if self.income_id.is_nil() {
            return Err(DomainError::validation("incomeId", "must not be nil"));
        }
        if self.individual_id.is_nil() {
            return Err(DomainError::validation("individualId", "must not be nil"));
        }
        self.income.validate()?;
        if self.income.is_negative() {
            return Err(DomainError::validation(
                "income",
                format!("must not be negative, got {}", self.income),
            ));
        }
        Ok(())
    }
}
