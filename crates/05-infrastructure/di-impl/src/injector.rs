//! 属性注入器
//!
//! 按请求顺序为已有对象的字段赋值。注入不是事务性的：中途失败时，
//! 之前已经赋值的字段保持不变。

use di_abstractions::{InjectionRequest, InjectionTarget, ServiceProvider};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use tracing::debug;

/// 属性注入器
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyInjector;

impl PropertyInjector {
    pub fn new() -> Self {
        Self
    }

    /// 按顺序执行注入请求，返回赋值的字段数量
    pub fn inject<T, P>(&self, target: &mut T, requests: &[InjectionRequest<T>], provider: &P) -> DependencyResult<usize>
    where
        T: 'static,
        P: ServiceProvider + ?Sized,
    {
        let target_info = TypeInfo::of::<T>();
        let target_type = target_info.short_name();
        for request in requests {
            if !provider.has(&request.service_id) {
                return Err(DependencyError::ServiceNotFound {
                    id: request.service_id.clone(),
                    requested_by: Some(target_type.to_string()),
                });
            }

            let instance = provider.get(&request.service_id)?;
            if let Some(declared) = request.field.declared_type() {
                if !request.field.accepts(&instance) {
                    return Err(DependencyError::TypeMismatch {
                        field: request.field.name().to_string(),
                        expected: declared.short_name().to_string(),
                        actual: instance.type_info().short_name().to_string(),
                    });
                }
            }

            debug!("注入字段: {}.{} <- {}", target_type, request.field.name(), request.service_id);
            request.field.assign(target, instance)?;
        }
        Ok(requests.len())
    }

    /// 使用目标类型自身声明的注入请求
    pub fn inject_target<T, P>(&self, target: &mut T, provider: &P) -> DependencyResult<usize>
    where
        T: InjectionTarget,
        P: ServiceProvider + ?Sized,
    {
        self.inject(target, &T::injection_requests(), provider)
    }
}
