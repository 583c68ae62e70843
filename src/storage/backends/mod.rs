// 子模块
mod settings;
mod user;
