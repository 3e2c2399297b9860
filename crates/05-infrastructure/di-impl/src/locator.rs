//! 服务定位器
//!
//! 只持有一个显式初始化的容器，初始化后只读。优先传递显式的定位器实例，
//! 进程级实例通过 [`global_locator`] 获取。

use crate::container::Container;
use crate::injector::PropertyInjector;
use di_abstractions::{InjectionTarget, Instance};
use infrastructure_common::{DependencyError, DependencyResult};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// 进程级服务定位器
static GLOBAL_LOCATOR: ServiceLocator = ServiceLocator::new();

/// 获取进程级服务定位器
pub fn global_locator() -> &'static ServiceLocator {
    &GLOBAL_LOCATOR
}

/// 服务定位器
#[derive(Debug, Default)]
pub struct ServiceLocator {
    container: OnceCell<Arc<Container>>,
}

impl ServiceLocator {
    pub const fn new() -> Self {
        Self {
            container: OnceCell::new(),
        }
    }

    /// 设置容器，只能调用一次
    pub fn initialize(&self, container: Arc<Container>) -> DependencyResult<()> {
        let id = container.id();
        self.container
            .set(container)
            .map_err(|_| DependencyError::LocatorAlreadyInitialized)?;
        info!("服务定位器已初始化，容器: {}", id);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.container.get().is_some()
    }

    /// 已初始化的容器
    pub fn container(&self) -> DependencyResult<&Arc<Container>> {
        self.container.get().ok_or(DependencyError::LocatorNotInitialized)
    }

    pub fn get(&self, id: &str) -> DependencyResult<Instance> {
        self.container()?.get(id)
    }

    /// 获取服务并转换为具体类型
    pub fn get_typed<T: Send + Sync + 'static>(&self, id: &str) -> DependencyResult<Arc<T>> {
        self.container()?.get_typed(id)
    }

    /// 未初始化时返回 false
    pub fn has(&self, id: &str) -> bool {
        self.container.get().is_some_and(|container| container.has(id))
    }

    pub fn parameter(&self, name: &str) -> DependencyResult<Value> {
        self.container()?.parameter(name)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.container
            .get()
            .is_some_and(|container| container.has_parameter(name))
    }

    /// 为目标对象执行属性注入
    pub fn inject<T: InjectionTarget>(&self, target: &mut T) -> DependencyResult<usize> {
        let container: &Container = self.container()?;
        PropertyInjector::new().inject_target(target, container)
    }
}
