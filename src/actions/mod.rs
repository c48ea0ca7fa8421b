//! # 动作执行层
//!
//! 作用在已解析节点上的基础操作：点击、输入、拖拽、截图、读取。
//! 动作只执行一次协议效果，失败立即返回，不做内部重试。
//!
//! ## 模块结构
//! - `tracks`: 拖拽轨迹规划（减速曲线，纯函数）
//! - `input`: 鼠标/键盘/属性写入
//! - `read`: HTML/文本/样式/截图读取

pub mod tracks;
pub mod input;
pub mod read;

pub use tracks::build_tracks;
