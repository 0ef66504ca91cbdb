pub mod action;
pub mod command;
pub mod context;
pub mod module;
pub mod view;

pub use action::{Action, NotifyLevel};
pub use command::{parse_command, Command};
pub use context::Context;
pub use module::Module;
pub use view::{View, ViewController, ViewState};
