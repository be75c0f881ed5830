//! 演示数据：向内存代理写入一组样例消息
//!
//! 覆盖正常、校验失败（币种小写、金额为负）与无法解码（非 JSON、未知类型）几种情况，
//! 便于本地观察重试、死信与日志的表现。
//!
use senik_domain::codec;
use senik_domain::income::{IncomeCalculated, IncomeId, LegalEntityId};
use senik_domain::value_object::Money;
use senik_messaging::{InMemoryBroker, MessageProducer, ProducerRecord};
use serde_json::Value;
use tracing::info;

fn income_event(amount_minor: i64) -> anyhow::Result<Value> {
    let event = IncomeCalculated::builder()
        .income_id(IncomeId::generate())
        .individual_id(LegalEntityId::generate())
        .income(Money::new(amount_minor, "EUR")?)
        .build();
    Ok(serde_json::from_slice(&codec::encode(&event.into())?)?)
}

/// 样例消息：(key, value)
pub fn samples() -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let valid = income_event(4_200_000)?;

    let mut lowercase_currency = income_event(150_000)?;
    lowercase_currency["income"]["currency"] = Value::from("eur");

    let mut negative = income_event(0)?;
    negative["income"]["amountMinor"] = Value::from(-1_000);

    let mut unknown_type = income_event(10_000)?;
    unknown_type[codec::TYPE_PROPERTY] = Value::from("SalaryPaid");

    Ok(vec![
        ("valid".to_string(), serde_json::to_vec(&valid)?),
        ("lowercase-currency".to_string(), serde_json::to_vec(&lowercase_currency)?),
        ("negative-income".to_string(), serde_json::to_vec(&negative)?),
        ("unknown-type".to_string(), serde_json::to_vec(&unknown_type)?),
        ("malformed".to_string(), b"{\"className\":".to_vec()),
    ])
}

pub async fn publish_samples(broker: &InMemoryBroker, topic: &str) -> anyhow::Result<()> {
    let samples = samples()?;
    let count = samples.len();
    for (key, value) in samples {
        broker
            .send(
                ProducerRecord::builder()
                    .topic(topic)
                    .key(key)
                    .value(value)
                    .build(),
            )
            .await?;
    }
    info!(topic, count, "published demo records");
    Ok(())
}
