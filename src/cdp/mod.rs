//! # Chrome DevTools Protocol (CDP) 层
//!
//! 浏览器协议访问层。传输本身（WebSocket 连接、消息封帧）由外部协作者提供，
//! 本层只定义类型化的命令与事件表面。
//!
//! ## 主要功能
//! - **传输接口**: [`CdpTransport`] trait，发送命令并订阅事件流
//! - **类型化命令**: [`CdpSession`] 按协议域封装引擎用到的每个命令
//! - **类型化事件**: [`PageEvent`] 解析导航、附加/分离、对话框、下载等事件
//! - **Mock 实现**: [`MockTransport`] 用于测试，可按方法注入应答与事件
//!
//! ## 模块结构
//! - `traits`: 传输 trait 定义
//! - `types`: CDP 协议相关的数据类型
//! - `events`: 事件解析
//! - `session`: 类型化命令封装
//! - `mock`: 用于测试的 Mock 实现

pub mod traits;
pub mod types;
pub mod events;
pub mod session;
pub mod mock;

#[cfg(test)]
pub mod tests;

pub use traits::{CdpTransport, CdpEvent};
pub use events::{DownloadState, PageEvent};
pub use session::CdpSession;

// Re-export mock for development/testing
pub use mock::MockTransport;
