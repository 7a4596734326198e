//! 串行执行上下文
//!
//! 一个专用 OS 线程运行单线程 tokio 运行时，按入队顺序逐个处理分发请求；
//! 调用方只负责投递，不会被命令逻辑阻塞。
//!
//! 关闭只停止接收新请求：关闭前已入队的请求全部执行完后工作线程才退出。
//!
use crate::dispatcher::Dispatcher;
use crate::error::RouterError;
use cmdr_core::ActionEvent;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

enum Job {
    Dispatch(ActionEvent),
    Flush(oneshot::Sender<()>),
    Stop,
}

pub(crate) struct SerialQueue {
    tx: mpsc::UnboundedSender<Job>,
    token: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SerialQueue {
    pub(crate) fn start(name: &str, dispatcher: Arc<Dispatcher>) -> Result<Self, RouterError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RouterError::WorkerSpawn)?;

        let worker_token = token.clone();
        let worker = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || runtime.block_on(Self::run(dispatcher, rx, worker_token)))
            .map_err(RouterError::WorkerSpawn)?;

        Ok(Self {
            tx,
            token,
            worker: Mutex::new(Some(worker)),
        })
    }

    async fn run(
        dispatcher: Arc<Dispatcher>,
        mut rx: mpsc::UnboundedReceiver<Job>,
        token: CancellationToken,
    ) {
        // 无论正常退出还是异常展开，退出时都标记为已关闭
        let _closed = token.drop_guard();
        debug!("router worker started");

        while let Some(job) = rx.recv().await {
            match job {
                Job::Dispatch(event) => {
                    dispatcher.perform(&event).await;
                }
                Job::Flush(done) => {
                    let _ = done.send(());
                }
                // 拒绝新的投递，继续处理缓冲区中剩余的请求
                Job::Stop => rx.close(),
            }
        }
        debug!("router worker stopped");
    }

    pub(crate) fn submit(&self, event: ActionEvent) {
        if self.token.is_cancelled() || self.tx.send(Job::Dispatch(event)).is_err() {
            warn!("router worker is closed; dispatch request dropped");
        }
    }

    /// 等待此前投递的请求全部处理完毕
    pub(crate) async fn flush(&self) -> Result<(), RouterError> {
        let (done, wait) = oneshot::channel();
        if self.token.is_cancelled() || self.tx.send(Job::Flush(done)).is_err() {
            return Err(RouterError::Closed);
        }
        wait.await.map_err(|_| RouterError::Closed)
    }

    /// 停止接收新请求；已入队的请求仍会执行完
    pub(crate) fn shutdown(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        let _ = self.tx.send(Job::Stop);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 关闭并等待工作线程处理完积压的请求后退出
    pub(crate) fn join(&self) {
        self.shutdown();
        let worker = match self.worker.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(worker) = worker {
            if worker.thread().id() == std::thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                error!("router worker panicked");
            }
        }
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.join();
    }
}
