//! senik-admin：收入计算事件的消费端
//!
//! 组合根：读取配置 → 初始化日志 → 组装“解码校验 → 重试退避 → 死信”管道 → 启动监听容器。
//! 传输使用内存代理；`--demo` 会写入一组样例消息。
//!
mod config;
mod demo;
mod listener;
mod telemetry;

use clap::Parser;
use config::AdminConfig;
use listener::IncomeCalculationListener;
use senik_messaging::{
    DeadLetterPublisher, DecodingHandler, InMemoryBroker, ListenerContainer, RetryingPipeline,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "senik-admin", version, about)]
struct Args {
    /// TOML 配置文件路径，缺省时使用内置默认值
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 启动后写入样例消息
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AdminConfig::load(args.config.as_deref())?;
    telemetry::init(&config.logging.filter)?;

    let broker = InMemoryBroker::new();
    let dead_letter = DeadLetterPublisher::new(Arc::new(broker.clone()));

    let pipeline = RetryingPipeline::builder()
        .policy(config.retry_policy()?)
        .dead_letter_sink(Arc::new(dead_letter))
        .dead_letter_topic(config.dead_letter_topic())
        .build();

    let container = Arc::new(
        ListenerContainer::builder()
            .source(Arc::new(broker.clone()))
            .pipeline(Arc::new(pipeline))
            .handler(Arc::new(DecodingHandler::new(IncomeCalculationListener::new())))
            .config(config.container_config())
            .build(),
    );

    let handle = container.start().await?;

    if args.demo {
        for topic in &config.consumer.topics {
            demo::publish_samples(&broker, topic).await?;
        }
    }

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown requested");
            handle.shutdown();
        }
        _ = handle.stopped() => {
            warn!("listener container stopped on its own");
        }
    }

    handle.join().await?;
    info!("senik-admin stopped");
    Ok(())
}
