use anyhow::Result as AnyResult;
use senik_domain::codec::{self, TYPE_PROPERTY};
use senik_domain::domain_event::DomainEvent;
use senik_domain::error::DomainError;
use senik_domain::income::{IncomeCalculated, IncomeId, LegalEntityId};
use senik_domain::value_object::Money;
use senik_domain::SenikEvent;

const INCOME_ID: &str = "5b0e0a4c-2f3e-4f5c-9d0a-1c2b3d4e5f60";
const INDIVIDUAL_ID: &str = "0f1e2d3c-4b5a-4968-8776-655443322110";

fn fixture(currency: &str, amount_minor: i64) -> String {
    fixture_with_class("IncomeCalculated", currency, amount_minor)
}

fn fixture_with_class(class_name: &str, currency: &str, amount_minor: i64) -> String {
    format!(
        r#"{{
            "{TYPE_PROPERTY}": "{class_name}",
            "eventId": "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d",
            "occurredAt": "2024-03-01T10:15:30Z",
            "incomeId": "{INCOME_ID}",
            "individualId": "{INDIVIDUAL_ID}",
            "income": {{ "amountMinor": {amount_minor}, "currency": "{currency}" }}
        }}"#
    )
}

#[test]
fn decodes_producer_payload() -> AnyResult<()> {
    let event = codec::decode_validated(fixture("EUR", 123_456).as_bytes())?;

    let SenikEvent::IncomeCalculated(income) = &event;
    assert_eq!(income.income_id(), INCOME_ID.parse::<IncomeId>()?);
    assert_eq!(income.individual_id(), INDIVIDUAL_ID.parse::<LegalEntityId>()?);
    assert_eq!(income.income(), &Money::new(123_456, "EUR")?);
    assert_eq!(event.aggregate_type(), "income");
    assert_eq!(event.event_type(), "IncomeCalculated");
    Ok(())
}

#[test]
fn decodes_fully_qualified_class_name() -> AnyResult<()> {
    let payload = fixture_with_class("gr.senik.admin.domain.model.IncomeCalculated", "EUR", 500);
    let event = codec::decode_validated(payload.as_bytes())?;

    let SenikEvent::IncomeCalculated(income) = &event;
    assert_eq!(income.income_id(), INCOME_ID.parse::<IncomeId>()?);
    assert_eq!(event.event_type(), IncomeCalculated::EVENT_TYPE);

    // 重新编码时使用短名
    let reencoded: serde_json::Value = serde_json::from_slice(&codec::encode(&event)?)?;
    assert_eq!(reencoded[TYPE_PROPERTY], "IncomeCalculated");
    Ok(())
}

#[test]
fn validation_failure_is_distinct_from_decode_failure() {
    let invalid = fixture("eur", 100);
    assert!(codec::decode(invalid.as_bytes()).is_ok());
    let err = codec::decode_validated(invalid.as_bytes()).unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(err.is_permanent());

    let negative = fixture("EUR", -5);
    let err = codec::decode_validated(negative.as_bytes()).unwrap_err();
    assert!(matches!(err, DomainError::Validation { field: "income", .. }));
}

#[test]
fn unknown_discriminant_is_a_deserialization_error() {
    let payload = fixture("EUR", 100).replace("\"IncomeCalculated\"", "\"SalaryPaid\"");
    let err = codec::decode(payload.as_bytes()).unwrap_err();
    assert!(matches!(err, DomainError::Deserialization { .. }));
    assert_eq!(err.kind(), "deserialization");
}

#[test]
fn encode_then_decode_preserves_event() -> AnyResult<()> {
    let event: SenikEvent = IncomeCalculated::builder()
        .income_id(IncomeId::generate())
        .individual_id(LegalEntityId::generate())
        .income(Money::new(99, "USD")?)
        .build()
        .into();

    let decoded = codec::decode_validated(&codec::encode(&event)?)?;
    assert_eq!(decoded, event);
    assert_eq!(decoded.metadata(), event.metadata());
    Ok(())
}
