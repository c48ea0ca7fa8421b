//! # 查询与等待引擎
//!
//! 选择器解析与轮询等待。一个选择器（CSS/XPath/JS 路径）解析为零个或多个节点，
//! 可配合谓词按固定间隔轮询，直到满足条件或到达截止时间。
//!
//! ## 主要功能
//! - **选择器**: [`Selector`] / [`QueryMode`]，`//` 前缀即 XPath
//! - **解析**: [`resolve`] 一次解析出节点快照
//! - **等待**: [`wait_for`] 按谓词 [`Predicate`] 轮询，软错误重试、硬错误立即中止

pub mod selector;
pub mod scripts;
pub mod resolve;
pub mod wait;

#[cfg(test)]
pub mod tests;

pub use resolve::resolve;
pub use selector::{QueryMode, Selector};
pub use wait::{wait_for, Predicate};

use std::time::Duration;

/// Fixed poll interval between wait iterations
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
