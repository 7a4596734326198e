//! 按命令类型名索引的监听器表
//!
use cmdr_core::{ActionEvent, ActionListener};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct ListenerMap {
    by_type: DashMap<String, Vec<Arc<dyn ActionListener>>>,
}

impl ListenerMap {
    /// 同一监听器（按指针判等）对同一类型只登记一次
    pub(crate) fn add(&self, type_name: &str, listener: Arc<dyn ActionListener>) {
        let mut list = self.by_type.entry(type_name.to_string()).or_default();
        if !list.iter().any(|l| same_listener(l, &listener)) {
            list.push(listener);
        }
    }

    /// 移除监听器；从未登记过时什么也不做
    pub(crate) fn remove(&self, type_name: &str, listener: &Arc<dyn ActionListener>) -> bool {
        let Some(mut list) = self.by_type.get_mut(type_name) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| !same_listener(l, listener));
        before != list.len()
    }

    // 先复制再通知：通知期间不持有分片锁，监听器内可以增删监听器
    pub(crate) fn snapshot(&self, type_name: &str) -> Vec<Arc<dyn ActionListener>> {
        self.by_type
            .get(type_name)
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    pub(crate) fn notify(&self, type_name: &str, event: &ActionEvent) {
        for listener in self.snapshot(type_name) {
            listener.notify(event);
        }
    }

    pub(crate) fn len(&self, type_name: &str) -> usize {
        self.by_type.get(type_name).map(|list| list.len()).unwrap_or(0)
    }
}

fn same_listener(a: &Arc<dyn ActionListener>, b: &Arc<dyn ActionListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
