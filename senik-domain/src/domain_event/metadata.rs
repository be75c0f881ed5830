use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 元数据
#[derive(Builder, Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    event_id: Uuid,
    event_type: &'static str,
    aggregate_id: String,
    aggregate_type: &'static str,
    occurred_at: DateTime<Utc>,
}

impl Metadata {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &'static str {
        self.aggregate_type
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }
}
