//! # 会话生命周期层
//!
//! Client / Page / Element 三级结构：Client 拥有有序的 Page 列表和
//! 附加子会话计数，Page 绑定一个浏览上下文并在后台消费事件流，
//! Element 是 (节点, 页面, 序号) 的便捷句柄。
//!
//! ## 主要功能
//! - **注册表**: [`ClientRegistry`] 按 (domain, task) 管理 Client，显式销毁
//! - **Client**: 页面列表、Cookie 读写、附加会话计数与一次性关闭回调
//! - **Page**: 导航、查询等待、动作、下载等待、新页面绑定
//! - **Element**: 以节点为作用域的同族操作

pub mod registry;
pub mod client;
pub mod page;
pub mod element;


pub use client::{Client, ClientOptions, CookieRecord};
pub use element::Element;
pub use page::{Page, PageState};
pub use registry::ClientRegistry;
