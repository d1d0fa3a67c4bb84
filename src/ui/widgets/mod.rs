//! TUI widgets.

mod action_bar;
mod card_stack;
mod category_picker;
mod help;
mod notifications;
mod status_bar;
mod tab_bar;

pub use action_bar::ActionBar;
pub use card_stack::CardStack;
pub use category_picker::CategoryPickerView;
pub use help::HelpPanel;
pub use notifications::{render_error, render_notification};
pub use status_bar::StatusBar;
pub use tab_bar::TabBar;
