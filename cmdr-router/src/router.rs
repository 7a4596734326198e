//! 动作路由器（ActionRouter）
//!
//! 持有注册表与前置/后置监听器表，把分发请求交给串行工作线程执行：
//! - `dispatch`：投递到工作线程，按投递顺序处理，调用方不等待；
//! - `dispatch_now`：在调用方自己的任务中立即执行，并返回分发报告；
//! - 监听器按命令的具体类型名登记，任何线程都可以随时增删。
//!
//! 进程级共享实例见 [`ActionRouter::global`]，也可以显式构造后注入。
//!
use crate::config::RouterConfig;
use crate::dispatcher::Dispatcher;
use crate::error::RouterError;
use crate::queue::SerialQueue;
use crate::registry::{CommandRef, Registry};
use crate::report::{DispatchReport, IgnoreUserErrors, UserErrorSink};
use cmdr_core::{ActionEvent, ActionListener, CommandType};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::Arc;
use tracing::info;

static GLOBAL: OnceCell<ActionRouter> = OnceCell::new();

pub struct ActionRouter {
    dispatcher: Arc<Dispatcher>,
    queue: SerialQueue,
}

impl ActionRouter {
    pub fn new(registry: Registry) -> Result<Self, RouterError> {
        Self::with_config(registry, &RouterConfig::default())
    }

    pub fn with_config(registry: Registry, config: &RouterConfig) -> Result<Self, RouterError> {
        Self::with_sink(registry, config, Arc::new(IgnoreUserErrors))
    }

    /// 指定用户错误的呈现出口
    pub fn with_sink(
        registry: Registry,
        config: &RouterConfig,
        sink: Arc<dyn UserErrorSink>,
    ) -> Result<Self, RouterError> {
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), sink));
        let queue = SerialQueue::start(&config.worker_name, dispatcher.clone())?;
        Ok(Self { dispatcher, queue })
    }

    /// 按配置发现命令并构造路由器
    pub fn from_config(config: &RouterConfig) -> Result<Self, RouterError> {
        let registry = Registry::discover(config);
        info!(
            types = registry.type_count(),
            actions = registry.len(),
            "command registry ready"
        );
        Self::with_config(registry, config)
    }

    /// 进程级共享实例：首次访问时按 `RouterConfig::from_env()` 发现并填充，
    /// 并发的首次访问只会触发一次填充
    pub fn global() -> Result<&'static ActionRouter, RouterError> {
        GLOBAL.get_or_try_init(|| Self::from_config(&RouterConfig::from_env()))
    }

    pub fn registry(&self) -> &Registry {
        &self.dispatcher.registry
    }

    /// 投递到串行工作线程
    pub fn dispatch(&self, event: ActionEvent) {
        self.queue.submit(event);
    }

    pub fn dispatch_action(&self, action: impl Into<String>) {
        self.dispatch(ActionEvent::new(action));
    }

    /// 在当前任务中立即执行
    pub async fn dispatch_now(&self, event: &ActionEvent) -> DispatchReport {
        self.dispatcher.perform(event).await
    }

    /// 等待此前投递的请求全部处理完毕
    pub async fn flush(&self) -> Result<(), RouterError> {
        self.queue.flush().await
    }

    /// 停止接收新请求；已投递的请求仍会在工作线程上执行完
    pub fn shutdown(&self) {
        self.queue.shutdown();
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// 关闭并阻塞等待工作线程处理完积压的请求后退出；析构时同样如此
    pub fn join(&self) {
        self.queue.join();
    }

    pub fn lookup_all(&self, action: &str) -> Vec<CommandRef> {
        self.registry().lookup_all(action)
    }

    pub fn lookup_one<T: Any>(&self, action: &str) -> Option<CommandRef> {
        self.registry().lookup_one::<T>(action)
    }

    pub fn lookup_by_type_name(&self, action: &str, type_name: &str) -> Option<CommandRef> {
        self.registry().lookup_by_type_name(action, type_name)
    }

    pub fn add_pre_listener<T: CommandType>(&self, listener: Arc<dyn ActionListener>) {
        self.add_pre_listener_for(T::TYPE_NAME, listener);
    }

    pub fn remove_pre_listener<T: CommandType>(&self, listener: &Arc<dyn ActionListener>) -> bool {
        self.remove_pre_listener_for(T::TYPE_NAME, listener)
    }

    pub fn add_post_listener<T: CommandType>(&self, listener: Arc<dyn ActionListener>) {
        self.add_post_listener_for(T::TYPE_NAME, listener);
    }

    pub fn remove_post_listener<T: CommandType>(&self, listener: &Arc<dyn ActionListener>) -> bool {
        self.remove_post_listener_for(T::TYPE_NAME, listener)
    }

    pub fn add_pre_listener_for(&self, type_name: &str, listener: Arc<dyn ActionListener>) {
        self.dispatcher.pre.add(type_name, listener);
    }

    pub fn remove_pre_listener_for(&self, type_name: &str, listener: &Arc<dyn ActionListener>) -> bool {
        self.dispatcher.pre.remove(type_name, listener)
    }

    pub fn add_post_listener_for(&self, type_name: &str, listener: Arc<dyn ActionListener>) {
        self.dispatcher.post.add(type_name, listener);
    }

    pub fn remove_post_listener_for(&self, type_name: &str, listener: &Arc<dyn ActionListener>) -> bool {
        self.dispatcher.post.remove(type_name, listener)
    }

    /// 某类型当前登记的（前置, 后置）监听器数量
    pub fn listener_count(&self, type_name: &str) -> (usize, usize) {
        (
            self.dispatcher.pre.len(type_name),
            self.dispatcher.post.len(type_name),
        )
    }
}
