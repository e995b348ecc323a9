//! Administrator notification fanout.

mod fanout;

pub use fanout::{AdminFanout, NotificationSource, spawn_admin_fanout};
