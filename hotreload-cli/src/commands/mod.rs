pub mod helper;
pub mod install;
pub mod reload;
pub mod status;
pub mod vaults;
pub mod watch;
