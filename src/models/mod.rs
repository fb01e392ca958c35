//! 数据模型模块
//! 用户、新闻与认证相关的请求/响应模型

pub mod auth;
pub mod news;
pub mod user;

pub use user::Role;
