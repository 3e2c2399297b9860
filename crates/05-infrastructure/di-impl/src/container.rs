//! 依赖注入容器
//!
//! 生命周期: Building → `compile()` → Compiled；预热编译失败时进入 Failed，不存在回退。
//! 编译持有写锁完成冻结，解析只在编译后图的 `Arc` 快照上进行，不持有容器锁。

use crate::checks::default_checks;
use crate::graph::{CompiledGraph, Registry};
use di_abstractions::{
    Arguments, CompileMode, Constructor, ContainerOptions, ContainerStats, Definition, DefinitionCheck,
    DefinitionGraph, Instance, ServiceProvider, ValidationMode, ValidationReport, Verdict,
};
use infrastructure_common::{BoxError, ContainerPhase, DependencyError, DependencyResult, TypeInfo};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

enum ContainerState {
    Building(Box<Registry>),
    Compiled(Arc<CompiledGraph>),
    Failed(DependencyError),
}

impl ContainerState {
    fn phase(&self) -> ContainerPhase {
        match self {
            Self::Building(_) => ContainerPhase::Building,
            Self::Compiled(_) => ContainerPhase::Compiled,
            Self::Failed(_) => ContainerPhase::Failed,
        }
    }
}

/// 依赖注入容器
pub struct Container {
    id: Uuid,
    options: ContainerOptions,
    state: RwLock<ContainerState>,
}

impl Container {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// 使用指定配置创建容器
    pub fn with_options(options: ContainerOptions) -> Self {
        let id = Uuid::new_v4();
        debug!("创建容器: {} ({:?})", id, options.compile_mode);
        Self {
            id,
            options,
            state: RwLock::new(ContainerState::Building(Box::default())),
        }
    }

    /// 容器实例 ID，用于日志关联
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// 当前生命周期阶段
    pub fn phase(&self) -> ContainerPhase {
        self.state.read().phase()
    }

    fn with_registry<R>(
        &self,
        operation: &'static str,
        key: &str,
        mutate: impl FnOnce(&mut Registry) -> DependencyResult<R>,
    ) -> DependencyResult<R> {
        let mut state = self.state.write();
        match &mut *state {
            ContainerState::Building(registry) => mutate(&mut **registry),
            ContainerState::Compiled(_) => Err(DependencyError::frozen(operation, key)),
            ContainerState::Failed(cause) => Err(DependencyError::compile_failed(cause)),
        }
    }

    /// 注册服务定义
    pub fn define(&self, definition: Definition) -> DependencyResult<()> {
        let id = definition.id.clone();
        self.with_registry("定义服务", &id, |registry| registry.definitions.define(definition))
    }

    /// 设置参数
    pub fn set_parameter(&self, name: impl Into<String>, value: impl Into<Value>) -> DependencyResult<()> {
        let name = name.into();
        let value = value.into();
        let key = name.clone();
        self.with_registry("设置参数", &key, |registry| registry.parameters.set(name, value))
    }

    /// 注册类型构造函数
    pub fn register_type<C>(&self, type_ref: impl Into<String>, constructor: C) -> DependencyResult<()>
    where
        C: Constructor + 'static,
    {
        let type_ref = type_ref.into();
        let key = type_ref.clone();
        self.with_registry("注册类型", &key, |registry| registry.types.register(type_ref, constructor))
    }

    /// 用闭包注册类型构造函数
    pub fn register_fn<T, F>(&self, type_ref: impl Into<String>, construct: F) -> DependencyResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let type_ref = type_ref.into();
        let key = type_ref.clone();
        self.with_registry("注册类型", &key, |registry| registry.types.register_fn(type_ref, construct))
    }

    /// 编译容器
    ///
    /// 已编译时直接返回成功。预热模式下任一公开单例创建失败，返回原始错误，
    /// 容器进入 Failed 状态并丢弃所有定义、参数和实例。
    pub fn compile(&self) -> DependencyResult<()> {
        let mut state = self.state.write();
        let registry = match &mut *state {
            ContainerState::Building(registry) => std::mem::take(registry),
            ContainerState::Compiled(_) => return Ok(()),
            ContainerState::Failed(cause) => return Err(DependencyError::compile_failed(cause)),
        };

        info!(
            "开始编译容器 {}: {} 个服务定义，{} 个参数，{} 个类型",
            self.id,
            registry.definitions.len(),
            registry.parameters.len(),
            registry.types.len()
        );
        let graph = Arc::new(CompiledGraph::freeze(*registry, &self.options));

        if self.options.compile_mode == CompileMode::Eager {
            if let Err(error) = graph.warm_up() {
                *state = ContainerState::Failed(error.clone());
                return Err(error);
            }
        }

        *state = ContainerState::Compiled(graph);
        info!("容器编译完成: {}", self.id);
        Ok(())
    }

    /// 编译失败的原因
    pub fn compile_error(&self) -> Option<DependencyError> {
        match &*self.state.read() {
            ContainerState::Failed(cause) => Some(cause.clone()),
            _ => None,
        }
    }

    fn snapshot(&self, id: &str) -> DependencyResult<Arc<CompiledGraph>> {
        match &*self.state.read() {
            ContainerState::Compiled(graph) => Ok(Arc::clone(graph)),
            ContainerState::Building(_) => Err(DependencyError::NotCompiled { id: id.to_string() }),
            ContainerState::Failed(cause) => Err(DependencyError::compile_failed(cause)),
        }
    }

    /// 获取公开服务
    ///
    /// 单例返回缓存实例，原型每次创建新实例
    pub fn get(&self, id: &str) -> DependencyResult<Instance> {
        let graph = self.snapshot(id)?;
        match graph.definitions().get(id) {
            Some(definition) if definition.public => graph.resolve(id),
            _ => Err(DependencyError::service_not_found(id)),
        }
    }

    /// 获取公开服务并转换为具体类型
    pub fn get_typed<T: Send + Sync + 'static>(&self, id: &str) -> DependencyResult<Arc<T>> {
        let instance = self.get(id)?;
        instance.downcast::<T>().ok_or_else(|| DependencyError::TypeMismatch {
            field: id.to_string(),
            expected: TypeInfo::of::<T>().short_name().to_string(),
            actual: instance.type_info().short_name().to_string(),
        })
    }

    /// 获取公开服务，服务不存在时返回 `None`
    pub fn get_optional(&self, id: &str) -> DependencyResult<Option<Instance>> {
        match self.get(id) {
            Ok(instance) => Ok(Some(instance)),
            Err(DependencyError::ServiceNotFound { id: missing, .. }) if missing == id => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// 服务是否已定义且公开
    pub fn has(&self, id: &str) -> bool {
        self.read_definition(id, |definition| definition.public)
            .unwrap_or(false)
    }

    /// 获取服务定义副本（包含私有定义）
    pub fn definition(&self, id: &str) -> Option<Definition> {
        self.read_definition(id, Definition::clone)
    }

    fn read_definition<R>(&self, id: &str, read: impl FnOnce(&Definition) -> R) -> Option<R> {
        match &*self.state.read() {
            ContainerState::Building(registry) => registry.definitions.get(id).map(read),
            ContainerState::Compiled(graph) => graph.definitions().get(id).map(read),
            ContainerState::Failed(_) => None,
        }
    }

    /// 参数是否存在
    pub fn has_parameter(&self, name: &str) -> bool {
        match &*self.state.read() {
            ContainerState::Building(registry) => registry.parameters.has(name),
            ContainerState::Compiled(graph) => graph.parameters().has(name),
            ContainerState::Failed(_) => false,
        }
    }

    /// 获取参数值
    pub fn parameter(&self, name: &str) -> DependencyResult<Value> {
        match &*self.state.read() {
            ContainerState::Building(registry) => registry.parameters.get(name).cloned(),
            ContainerState::Compiled(graph) => graph.parameters().get(name).cloned(),
            ContainerState::Failed(cause) => Err(DependencyError::compile_failed(cause)),
        }
    }

    /// 按注册顺序列出带有指定标签的服务 ID
    pub fn tagged(&self, tag: &str) -> Vec<String> {
        match &*self.state.read() {
            ContainerState::Building(registry) => registry.definitions.tagged(tag),
            ContainerState::Compiled(graph) => graph.definitions().tagged(tag),
            ContainerState::Failed(_) => Vec::new(),
        }
    }

    /// 使用默认检查链验证所有定义，不创建任何实例
    pub fn validate(&self, mode: ValidationMode) -> DependencyResult<ValidationReport> {
        self.validate_with(mode, &default_checks())
    }

    /// 使用指定检查链验证所有定义
    pub fn validate_with(
        &self,
        mode: ValidationMode,
        checks: &[Box<dyn DefinitionCheck>],
    ) -> DependencyResult<ValidationReport> {
        match &*self.state.read() {
            ContainerState::Building(registry) => Ok(run_checks(&**registry, mode, checks)),
            ContainerState::Compiled(graph) => Ok(run_checks(&**graph, mode, checks)),
            ContainerState::Failed(cause) => Err(DependencyError::compile_failed(cause)),
        }
    }

    /// 统计信息
    pub fn stats(&self) -> ContainerStats {
        match &*self.state.read() {
            ContainerState::Building(registry) => ContainerStats {
                definitions: registry.definitions.len(),
                parameters: registry.parameters.len(),
                types: registry.types.len(),
                ..ContainerStats::default()
            },
            ContainerState::Compiled(graph) => ContainerStats {
                definitions: graph.definitions().len(),
                parameters: graph.parameters().len(),
                types: graph.types().len(),
                singletons_created: graph.singletons_created(),
                compiled_at: Some(graph.compiled_at()),
            },
            ContainerState::Failed(_) => ContainerStats::default(),
        }
    }
}

fn run_checks(
    graph: &dyn DefinitionGraph,
    mode: ValidationMode,
    checks: &[Box<dyn DefinitionCheck>],
) -> ValidationReport {
    let started = Instant::now();
    let mut report = ValidationReport::new(mode);
    'definitions: for definition in graph.ordered_definitions() {
        for check in checks {
            let result = check.check(definition, graph);
            if !report.record(Verdict::from_result(check.name(), definition.id.clone(), result)) {
                break 'definitions;
            }
        }
    }
    report.duration = started.elapsed();
    debug!(
        "定义验证完成: {} 项通过，共 {} 项",
        report.passed_count(),
        report.verdicts.len()
    );
    report
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .field("options", &self.options)
            .finish()
    }
}

impl ServiceProvider for Container {
    fn has(&self, id: &str) -> bool {
        Container::has(self, id)
    }

    fn get(&self, id: &str) -> DependencyResult<Instance> {
        Container::get(self, id)
    }

    fn has_parameter(&self, name: &str) -> bool {
        Container::has_parameter(self, name)
    }

    fn parameter(&self, name: &str) -> DependencyResult<Value> {
        Container::parameter(self, name)
    }
}
