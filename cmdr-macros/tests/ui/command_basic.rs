use async_trait::async_trait;
use cmdr_core::{ActionEvent, ActionResult, Command, CommandType};
use cmdr_macros::command;

#[derive(Default)]
struct Save;

#[command(names = ["save", "save-as"])]
#[async_trait]
impl Command for Save {
    async fn do_action(&self, _event: &ActionEvent) -> ActionResult {
        Ok(())
    }
}

fn main() {
    assert!(Save::TYPE_NAME.ends_with("::Save"));
    assert_eq!(Save::ACTION_NAMES, &["save", "save-as"]);
    assert_eq!(Save.action_names().len(), 2);
}
