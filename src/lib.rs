use lazy_static::lazy_static;

use crate::config::Config;

pub mod categorizer;
pub mod client;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod provider;
pub mod selector;
pub mod service;
pub mod similarity;
pub mod sql_server;
pub mod structs;
pub mod templates;
pub mod utils;
pub mod webserver;

lazy_static! {
    // 全局配置，启动时从配置文件读取
    pub static ref CONFIG: Config = Config::from_env().unwrap_or_else(|e| {
        log::error!("{e}，使用默认配置");
        Config::default()
    });
}
