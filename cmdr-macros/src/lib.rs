use proc_macro::TokenStream;

mod command;

/// 命令宏：标注在 `impl Command for X` 块上
/// - 注入 `fn action_names(&self)`，返回声明的动作名
/// - 为 `X` 实现 `::cmdr_core::CommandType`（`TYPE_NAME` 为 `module_path!()::X`）
/// - 在链接期登记表 `::cmdr_core::COMMANDS` 中登记 `X` 的描述符
///
/// 支持参数：
/// - `names = ["save", "save-as"]`：必填，至少一个、不可重复
/// - `manual`：类型不提供 `Default`，登记为“无默认构造”的具体类型
///
/// ```ignore
/// #[command(names = ["save"])]
/// #[async_trait]
/// impl Command for Save {
///     async fn do_action(&self, event: &ActionEvent) -> ActionResult { Ok(()) }
/// }
/// ```
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::expand(attr, item)
}
