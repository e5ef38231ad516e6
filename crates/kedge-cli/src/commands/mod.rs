mod init;

pub use init::{InitArgs, init};
