//! 监听容器（ListenerContainer）
//!
//! 统一编排“订阅 → 按分区分发 → worker 执行管道 → 提交位点”的长驻任务：
//! - 分发任务从 `MessageSource` 读取消息，按分区路由到固定 worker，保证分区内有序；
//! - 每个 worker 一次只处理一条消息，退避等待期间不处理其他消息；
//! - 消息到达终态后提交位点；
//! - 死信投递失败或读取消息失败时不提交位点，停止容器并通过 `ContainerHandle::join`
//!   返回错误，交由进程监管（重启、告警）处理；
//! - 关闭时不打断正在进行的重试。
//!
use crate::error::{MessagingError, MessagingResult};
use crate::handler::MessageHandler;
use crate::pipeline::RetryingPipeline;
use crate::record::ConsumerRecord;
use crate::transport::MessageSource;
use bon::Builder;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 容器配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerConfig {
    /// 订阅的主题
    pub topics: Vec<String>,
    /// 消费组（用于日志与位点归属）
    pub group_id: String,
    /// 并发 worker 数
    pub concurrency: usize,
    /// 每个 worker 的待处理队列长度
    pub worker_queue: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            topics: vec!["senik.events".to_string()],
            group_id: "senik-admin-income-calculated-consumer-group".to_string(),
            concurrency: 1,
            worker_queue: 16,
        }
    }
}

#[derive(Builder)]
pub struct ListenerContainer {
    source: Arc<dyn MessageSource>,
    pipeline: Arc<RetryingPipeline>,
    handler: Arc<dyn MessageHandler>,
    #[builder(default)]
    config: ContainerConfig,
}

impl ListenerContainer {
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 订阅并启动容器，返回可用于关闭/等待的句柄
    pub async fn start(self: Arc<Self>) -> MessagingResult<ContainerHandle> {
        let stream = self.source.subscribe(&self.config.topics).await?;
        let token = CancellationToken::new();
        let concurrency = self.config.concurrency.max(1);

        let mut senders = Vec::with_capacity(concurrency);
        let mut tasks: Vec<JoinHandle<MessagingResult<()>>> = Vec::with_capacity(concurrency + 1);

        for worker_id in 0..concurrency {
            let (tx, rx) = mpsc::channel(self.config.worker_queue.max(1));
            senders.push(tx);
            tasks.push(tokio::spawn(Self::worker_loop(
                self.clone(),
                worker_id,
                rx,
                token.clone(),
            )));
        }

        tasks.push(tokio::spawn(Self::dispatch_loop(
            stream,
            senders,
            token.clone(),
        )));

        info!(
            group_id = %self.config.group_id,
            topics = ?self.config.topics,
            concurrency,
            handler = self.handler.handler_name(),
            "listener container started"
        );

        Ok(ContainerHandle { token, tasks })
    }

    async fn dispatch_loop(
        mut stream: BoxStream<'static, MessagingResult<ConsumerRecord>>,
        senders: Vec<mpsc::Sender<ConsumerRecord>>,
        token: CancellationToken,
    ) -> MessagingResult<()> {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                maybe_record = stream.next() => {
                    match maybe_record {
                        Some(Ok(record)) => {
                            let slot = record.partition().unsigned_abs() as usize % senders.len();
                            let Some(tx) = senders.get(slot) else { break };
                            tokio::select! {
                                _ = token.cancelled() => break,
                                sent = tx.send(record) => {
                                    if sent.is_err() {
                                        // worker 已退出（通常是容器正在停止）
                                        break;
                                    }
                                }
                            }
                        }
                        Some(Err(err)) => {
                            // 跳过会让后续提交越过未处理的消息，只能停止
                            error!(
                                error = %err,
                                "failed to receive record, stopping listener container"
                            );
                            token.cancel();
                            return Err(err);
                        }
                        None => {
                            debug!("message source stream ended");
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn worker_loop(
        self: Arc<Self>,
        worker_id: usize,
        mut rx: mpsc::Receiver<ConsumerRecord>,
        token: CancellationToken,
    ) -> MessagingResult<()> {
        loop {
            let record = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                maybe_record = rx.recv() => match maybe_record {
                    Some(record) => record,
                    None => break,
                },
            };

            // 管道运行期间不响应取消：进行中的重试总会走到终态
            match self.pipeline.process(&record, self.handler.as_ref()).await {
                Ok(outcome) => {
                    debug!(
                        worker_id,
                        position = %record.position(),
                        ?outcome,
                        "record reached terminal state"
                    );
                    if let Err(err) = self.source.commit(&record).await {
                        warn!(
                            worker_id,
                            position = %record.position(),
                            error = %err,
                            "failed to commit offset"
                        );
                    }
                }
                Err(err) => {
                    error!(
                        worker_id,
                        position = %record.position(),
                        error = %err,
                        "dead-letter recovery failed, stopping listener container"
                    );
                    token.cancel();
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

/// 容器运行句柄：用于优雅关闭与等待任务结束
pub struct ContainerHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<MessagingResult<()>>>,
}

impl ContainerHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 等待容器停止（主动关闭或 worker 出错）
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }

    /// 等待所有任务结束，返回第一个 worker 错误
    pub async fn join(mut self) -> MessagingResult<()> {
        let tasks = std::mem::take(&mut self.tasks);
        let mut first_error = None;

        for task in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(MessagingError::Worker {
                    reason: join_err.to_string(),
                }),
            };
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for ContainerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
