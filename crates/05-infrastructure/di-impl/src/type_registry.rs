//! 类型注册表
//!
//! 把定义中的 `type_ref` 映射到构造函数

use di_abstractions::{Arguments, Constructor, FnConstructor};
use infrastructure_common::{BoxError, DependencyError, DependencyResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 类型注册表
#[derive(Clone, Default)]
pub struct TypeRegistry {
    constructors: HashMap<String, Arc<dyn Constructor>>,
    frozen: bool,
}

impl TypeRegistry {
    /// 创建空的类型注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册构造函数
    pub fn register<C>(&mut self, type_ref: impl Into<String>, constructor: C) -> DependencyResult<()>
    where
        C: Constructor + 'static,
    {
        let type_ref = type_ref.into();
        if self.frozen {
            return Err(DependencyError::frozen("注册类型", type_ref));
        }
        debug!("注册类型: {}", type_ref);
        self.constructors.insert(type_ref, Arc::new(constructor));
        Ok(())
    }

    /// 用闭包注册构造函数
    pub fn register_fn<T, F>(&mut self, type_ref: impl Into<String>, construct: F) -> DependencyResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.register(type_ref, FnConstructor::new(construct))
    }

    pub fn get(&self, type_ref: &str) -> Option<&Arc<dyn Constructor>> {
        self.constructors.get(type_ref)
    }

    pub fn contains(&self, type_ref: &str) -> bool {
        self.constructors.contains_key(type_ref)
    }

    /// 冻结注册表，可重复调用
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.constructors.keys().collect();
        types.sort();
        f.debug_struct("TypeRegistry")
            .field("types", &types)
            .field("frozen", &self.frozen)
            .finish()
    }
}
