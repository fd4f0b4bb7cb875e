pub mod check;
pub mod outline_command;
pub mod outline_ops;
pub mod task_ops;
