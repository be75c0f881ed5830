//! 事件编解码（codec）
//!
//! 所有对外发布/消费的事件以带显式判别字段（`className`）的联合类型
//! `SenikEvent` 表示；判别值在编译期枚举，解码时先校验判别值再反序列化载荷。
//!
//! 通用序列化与消息反序列化共用同一条解码路径（`decode` / `decode_validated`），
//! 不在不同入口重复配置类型映射。
//!
use crate::domain_event::DomainEvent;
use crate::error::{DomainError, DomainResult};
use crate::income::IncomeCalculated;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 判别字段名
pub const TYPE_PROPERTY: &str = "className";

/// 事件联合类型：新增事件时在此登记一个变体并补充 `KNOWN_TYPES`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "className")]
pub enum SenikEvent {
    // 别名须与 IncomeCalculated::QUALIFIED_TYPE 一致
    #[serde(alias = "gr.senik.admin.domain.model.IncomeCalculated")]
    IncomeCalculated(IncomeCalculated),
}

impl SenikEvent {
    /// 可识别的全部判别值（短名与完整类名），编码时使用短名
    pub const KNOWN_TYPES: &'static [&'static str] =
        &[IncomeCalculated::EVENT_TYPE, IncomeCalculated::QUALIFIED_TYPE];

    /// 当前变体的判别值
    pub fn class_name(&self) -> &'static str {
        match self {
            SenikEvent::IncomeCalculated(_) => IncomeCalculated::EVENT_TYPE,
        }
    }

    pub fn is_known_type(class_name: &str) -> bool {
        Self::KNOWN_TYPES.contains(&class_name)
    }
}

impl From<IncomeCalculated> for SenikEvent {
    fn from(event: IncomeCalculated) -> Self {
        SenikEvent::IncomeCalculated(event)
    }
}

impl DomainEvent for SenikEvent {
    fn event_id(&self) -> Uuid {
        match self {
            SenikEvent::IncomeCalculated(e) => e.event_id(),
        }
    }

    fn event_type(&self) -> &'static str {
        self.class_name()
    }

    fn aggregate_id(&self) -> String {
        match self {
            SenikEvent::IncomeCalculated(e) => e.aggregate_id(),
        }
    }

    fn aggregate_type(&self) -> &'static str {
        match self {
            SenikEvent::IncomeCalculated(e) => e.aggregate_type(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SenikEvent::IncomeCalculated(e) => e.occurred_at(),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        match self {
            SenikEvent::IncomeCalculated(e) => e.validate(),
        }
    }
}

/// 编码为 JSON 字节
pub fn encode(event: &SenikEvent) -> DomainResult<Vec<u8>> {
    Ok(serde_json::to_vec(event)?)
}

/// 解码 JSON 字节
///
/// # Errors
///
/// 输入不是 JSON 对象、缺少判别字段、判别值未登记或载荷结构不符时，
/// 返回 [`DomainError::Deserialization`]。
pub fn decode(bytes: &[u8]) -> DomainResult<SenikEvent> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| DomainError::deserialization(format!("malformed json: {e}")))?;

    let class_name = value
        .get(TYPE_PROPERTY)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            DomainError::deserialization(format!("missing `{TYPE_PROPERTY}` discriminant"))
        })?;

    if !SenikEvent::is_known_type(class_name) {
        return Err(DomainError::deserialization(format!(
            "unknown event type `{class_name}`, expected one of {:?}",
            SenikEvent::KNOWN_TYPES
        )));
    }

    let class_name = class_name.to_string();
    serde_json::from_value(value).map_err(|e| {
        DomainError::deserialization(format!("invalid `{class_name}` payload: {e}"))
    })
}

/// 解码并校验
///
/// # Errors
///
/// 解码错误同 [`decode`]；载荷校验失败返回 [`DomainError::Validation`]。
pub fn decode_validated(bytes: &[u8]) -> DomainResult<SenikEvent> {
    let event = decode(bytes)?;
    event.validate()?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::income::{IncomeId, LegalEntityId};
    use crate::value_object::Money;

    fn income_event() -> SenikEvent {
        IncomeCalculated::builder()
            .income_id(IncomeId::generate())
            .individual_id(LegalEntityId::generate())
            .income(Money::new(250_000, "EUR").unwrap())
            .build()
            .into()
    }

    #[test]
    fn test_encode_carries_discriminant() {
        let bytes = encode(&income_event()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[TYPE_PROPERTY], "IncomeCalculated");
        assert!(value.get("incomeId").is_some());
    }

    #[test]
    fn test_decode_encoded_event() {
        let ev = income_event();
        let decoded = decode(&encode(&ev).unwrap()).unwrap();
        assert_eq!(decoded, ev);
    }

    #[test]
    fn test_every_variant_is_registered() {
        assert!(SenikEvent::is_known_type(income_event().class_name()));
    }

    #[test]
    fn test_every_known_type_decodes() {
        let mut value = serde_json::to_value(income_event()).unwrap();
        for class_name in SenikEvent::KNOWN_TYPES {
            value[TYPE_PROPERTY] = Value::from(*class_name);
            let decoded = decode(&serde_json::to_vec(&value).unwrap()).unwrap();
            assert_eq!(decoded.class_name(), IncomeCalculated::EVENT_TYPE);
        }
    }

    #[test]
    fn test_decode_unknown_tag() {
        let err = decode(br#"{"className": "IncomeDeleted"}"#).unwrap_err();
        match err {
            DomainError::Deserialization { reason } => assert!(reason.contains("IncomeDeleted")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_missing_tag() {
        let err = decode(br#"{"incomeId": "x"}"#).unwrap_err();
        assert!(matches!(err, DomainError::Deserialization { .. }));
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = decode(b"{not json").unwrap_err();
        assert!(matches!(err, DomainError::Deserialization { .. }));
    }

    #[test]
    fn test_decode_known_tag_bad_payload() {
        let err = decode(br#"{"className": "IncomeCalculated", "incomeId": 7}"#).unwrap_err();
        assert!(matches!(err, DomainError::Deserialization { .. }));
    }

    #[test]
    fn test_decode_validated_rejects_invalid_payload() {
        let mut value = serde_json::to_value(income_event()).unwrap();
        value["income"]["currency"] = Value::from("euro");
        let bytes = serde_json::to_vec(&value).unwrap();

        assert!(decode(&bytes).is_ok());
        assert!(matches!(
            decode_validated(&bytes).unwrap_err(),
            DomainError::Validation { field: "currency", .. }
        ));
    }
}
