//! # DOM 节点模型
//!
//! 查询解析出的节点快照。节点在每次解析时新建，不跨调用缓存；
//! 属性列表由页面事件任务并发刷新，使用读写锁保护。

pub mod node;

pub use node::{ClientRect, Node, Quad};
