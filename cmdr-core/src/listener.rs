use crate::event::ActionEvent;

/// 动作监听器：在某一命令类型执行前/后收到通知
///
/// 监听器按命令的具体类型注册，而不是按动作名；同一类型的所有命令共享同一组监听器。
pub trait ActionListener: Send + Sync {
    fn notify(&self, event: &ActionEvent);
}

impl<F> ActionListener for F
where
    F: Fn(&ActionEvent) + Send + Sync,
{
    fn notify(&self, event: &ActionEvent) {
        self(event)
    }
}
