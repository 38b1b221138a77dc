mod config;
mod install;
mod show;
mod sync;

pub use config::Config;
pub use install::{install, install_with};
pub use show::show_active_config;
pub use sync::{sync, watch};
