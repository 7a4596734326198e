use async_trait::async_trait;
use cmdr_core::{ActionEvent, ActionResult, Command, CommandType};
use cmdr_macros::command;

// 没有 Default：只能以 `manual` 登记
struct Export {
    format: &'static str,
}

#[command(names = ["export"], manual)]
#[async_trait]
impl Command for Export {
    async fn do_action(&self, _event: &ActionEvent) -> ActionResult {
        let _ = self.format;
        Ok(())
    }
}

fn main() {
    assert_eq!(Export::ACTION_NAMES, &["export"]);
    let export = Export { format: "pdf" };
    assert!(export.action_names().contains("export"));
}
