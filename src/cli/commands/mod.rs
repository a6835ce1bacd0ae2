mod command_result;
pub mod extract;
pub mod graph;
pub mod helper;
pub mod init;
pub mod wrap;

pub use command_result::*;
