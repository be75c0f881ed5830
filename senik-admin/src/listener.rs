//! 收入计算事件监听器
//!
//! 事件到达这里时已通过解码与校验，业务上只记录一次日志。
//!
use async_trait::async_trait;
use senik_domain::SenikEvent;
use senik_domain::domain_event::DomainEvent;
use senik_messaging::{ConsumerRecord, EventListener, ProcessingError};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct IncomeCalculationListener {
    processed: AtomicU64,
}

impl IncomeCalculationListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已处理的事件数
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventListener for IncomeCalculationListener {
    fn listener_name(&self) -> &str {
        "income-calculation-listener"
    }

    async fn on_event(
        &self,
        event: &SenikEvent,
        record: &ConsumerRecord,
    ) -> Result<(), ProcessingError> {
        match event {
            SenikEvent::IncomeCalculated(income) => {
                info!(
                    position = %record.position(),
                    event_id = %event.event_id(),
                    income_id = %income.income_id(),
                    individual_id = %income.individual_id(),
                    income = %income.income(),
                    "income calculated"
                );
            }
        }
        self.processed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
