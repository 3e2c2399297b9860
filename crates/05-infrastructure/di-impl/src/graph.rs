//! 定义图
//!
//! 构建阶段使用可变的 [`Registry`]，编译后冻结为只读的 [`CompiledGraph`]，
//! 解析过程只在编译后的图上进行

use crate::definition_store::DefinitionStore;
use crate::parameter_store::ParameterStore;
use crate::resolver::{PlanWalker, Resolver};
use crate::type_registry::TypeRegistry;
use dashmap::DashMap;
use di_abstractions::{ContainerOptions, Definition, DefinitionGraph, Instance};
use infrastructure_common::DependencyResult;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use tracing::info;

/// 构建阶段的注册信息
#[derive(Debug, Default)]
pub(crate) struct Registry {
    pub(crate) definitions: DefinitionStore,
    pub(crate) parameters: ParameterStore,
    pub(crate) types: TypeRegistry,
}

impl DefinitionGraph for Registry {
    fn definition(&self, id: &str) -> Option<&Definition> {
        self.definitions.get(id)
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters.has(name)
    }

    fn has_type(&self, type_ref: &str) -> bool {
        self.types.contains(type_ref)
    }

    fn ordered_definitions(&self) -> Vec<&Definition> {
        self.definitions.iter().collect()
    }
}

/// 编译后的只读定义图
///
/// 每个单例 ID 在编译时分配一个 `OnceCell`，并发首次获取时只有一个线程执行构造
pub(crate) struct CompiledGraph {
    registry: Registry,
    singletons: HashMap<String, OnceCell<Instance>>,
    plans: DashMap<String, DependencyResult<()>>,
    max_depth: usize,
    compiled_at: chrono::DateTime<chrono::Utc>,
}

impl CompiledGraph {
    /// 冻结注册信息
    pub(crate) fn freeze(mut registry: Registry, options: &ContainerOptions) -> Self {
        registry.definitions.freeze();
        registry.parameters.freeze();
        registry.types.freeze();

        let singletons = registry
            .definitions
            .iter()
            .filter(|definition| definition.is_singleton())
            .map(|definition| (definition.id.clone(), OnceCell::new()))
            .collect();

        Self {
            registry,
            singletons,
            plans: DashMap::new(),
            max_depth: options.max_resolution_depth,
            compiled_at: chrono::Utc::now(),
        }
    }

    pub(crate) fn definitions(&self) -> &DefinitionStore {
        &self.registry.definitions
    }

    pub(crate) fn parameters(&self) -> &ParameterStore {
        &self.registry.parameters
    }

    pub(crate) fn types(&self) -> &TypeRegistry {
        &self.registry.types
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn compiled_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.compiled_at
    }

    pub(crate) fn singleton_cell(&self, id: &str) -> Option<&OnceCell<Instance>> {
        self.singletons.get(id)
    }

    /// 已创建的单例数量
    pub(crate) fn singletons_created(&self) -> usize {
        self.singletons.values().filter(|cell| cell.get().is_some()).count()
    }

    /// 检查从 `id` 出发的解析计划，结果按 ID 缓存
    ///
    /// 在任何构造函数运行之前发现循环依赖和深度超限，循环依赖因此不会进入单例的初始化锁
    pub(crate) fn check_plan(&self, id: &str) -> DependencyResult<()> {
        if let Some(cached) = self.plans.get(id) {
            return cached.value().clone();
        }
        let result = PlanWalker::new(self).walk(id);
        self.plans.insert(id.to_string(), result.clone());
        result
    }

    /// 解析服务（包含私有服务）
    pub(crate) fn resolve(&self, id: &str) -> DependencyResult<Instance> {
        self.check_plan(id)?;
        Resolver::new(self).resolve(id)
    }

    /// 按注册顺序创建所有公开单例，遇到第一个错误即返回
    pub(crate) fn warm_up(&self) -> DependencyResult<usize> {
        let mut created = 0;
        for definition in self.definitions().iter() {
            if definition.public && definition.is_singleton() {
                self.resolve(&definition.id)?;
                created += 1;
            }
        }
        info!("预热完成，创建了 {} 个公开单例", created);
        Ok(created)
    }
}

impl DefinitionGraph for CompiledGraph {
    fn definition(&self, id: &str) -> Option<&Definition> {
        self.registry.definition(id)
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.registry.has_parameter(name)
    }

    fn has_type(&self, type_ref: &str) -> bool {
        self.registry.has_type(type_ref)
    }

    fn ordered_definitions(&self) -> Vec<&Definition> {
        self.registry.ordered_definitions()
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("definitions", &self.registry.definitions.len())
            .field("singletons_created", &self.singletons_created())
            .field("compiled_at", &self.compiled_at)
            .finish_non_exhaustive()
    }
}
