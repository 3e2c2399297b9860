//! 构造函数抽象接口
//!
//! 类型注册表把定义中的 `type_ref` 映射到构造函数

use crate::instance::{Arguments, Instance};
use infrastructure_common::BoxError;
use std::marker::PhantomData;

/// 构造函数 trait
///
/// 用已解析的参数创建服务实例，失败时返回原始错误，由解析器包装
pub trait Constructor: Send + Sync {
    /// 创建服务实例
    fn construct(&self, arguments: &Arguments) -> Result<Instance, BoxError>;
}

/// 闭包构造函数包装器
pub struct FnConstructor<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
{
    construct_fn: F,
    produces: PhantomData<fn() -> T>,
}

impl<T, F> FnConstructor<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
{
    pub fn new(construct_fn: F) -> Self {
        Self {
            construct_fn,
            produces: PhantomData,
        }
    }
}

impl<T, F> Constructor for FnConstructor<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
{
    fn construct(&self, arguments: &Arguments) -> Result<Instance, BoxError> {
        (self.construct_fn)(arguments).map(Instance::new)
    }
}
