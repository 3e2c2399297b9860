//! # Infrastructure Common
//!
//! 依赖注入核心的公共类型。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] - 依赖注入错误分类
//! - [`ArgumentError`] - 构造参数访问错误
//! - [`TypeInfo`] - 运行时类型信息
//! - [`Scope`] / [`ContainerPhase`] - 服务作用域与容器阶段

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
