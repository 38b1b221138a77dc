pub mod archive;
pub mod commands;
pub mod http;
pub mod installer;
pub mod model;
pub mod notify;
pub mod platform;
pub mod projector;
pub mod properties;
pub mod release;
pub mod runtime;
pub mod settings;
