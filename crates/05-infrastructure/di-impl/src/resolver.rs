//! 依赖解析器
//!
//! 深度优先、按参数声明顺序（从左到右）解析依赖。访问栈只属于一次解析调用，
//! 不会在并发解析之间共享。

use crate::graph::CompiledGraph;
use di_abstractions::{ArgumentValue, Arguments, Definition, Instance, Reference};
use infrastructure_common::{DependencyError, DependencyResult, Scope};
use std::collections::HashMap;
use tracing::{debug, trace};

fn missing_reference(id: &str, referenced_by: Option<&str>) -> DependencyError {
    match referenced_by {
        Some(parent) => DependencyError::UndefinedReference {
            id: id.to_string(),
            referenced_by: parent.to_string(),
        },
        None => DependencyError::service_not_found(id),
    }
}

fn cycle_path<S: AsRef<str>>(stack: &[S], repeated: &str) -> Vec<String> {
    stack
        .iter()
        .map(|id| id.as_ref().to_string())
        .chain(std::iter::once(repeated.to_string()))
        .collect()
}

/// 解析计划检查器
///
/// 不运行构造函数，按解析顺序遍历定义图，只报告循环依赖和深度超限。
/// 未定义引用、未知参数、未注册类型会让解析在该处停止，遍历也随之停止，
/// 这些错误由 [`Resolver`] 按参数顺序报告。
pub(crate) struct PlanWalker<'g> {
    graph: &'g CompiledGraph,
    stack: Vec<&'g str>,
    /// 已验证的节点及其验证时所处深度
    verified: HashMap<&'g str, usize>,
}

impl<'g> PlanWalker<'g> {
    pub(crate) fn new(graph: &'g CompiledGraph) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            verified: HashMap::new(),
        }
    }

    /// 从根服务开始检查
    pub(crate) fn walk(mut self, id: &str) -> DependencyResult<()> {
        self.visit(id).map(|_| ())
    }

    /// 返回解析能否越过该节点继续进行
    fn visit(&mut self, id: &str) -> DependencyResult<bool> {
        if self.stack.iter().any(|visiting| *visiting == id) {
            return Err(DependencyError::CircularDependency {
                path: cycle_path(&self.stack, id),
            });
        }
        let depth = self.stack.len();
        if self.verified.get(id).is_some_and(|verified_at| depth <= *verified_at) {
            return Ok(true);
        }
        if depth >= self.graph.max_depth() {
            return Err(DependencyError::ResolutionDepthExceeded {
                max_depth: self.graph.max_depth(),
                path: cycle_path(&self.stack, id),
            });
        }

        let graph = self.graph;
        let Some(definition) = graph.definitions().get(id) else {
            return Ok(false);
        };

        self.stack.push(&definition.id);
        let result = self.visit_arguments(definition);
        self.stack.pop();

        let passable = result?;
        if passable {
            self.verified.insert(&definition.id, depth);
        }
        Ok(passable)
    }

    fn visit_arguments(&mut self, definition: &'g Definition) -> DependencyResult<bool> {
        let parameters = self.graph.parameters();
        for argument in &definition.arguments {
            let passable = match argument {
                Reference::Literal(_) => true,
                Reference::Parameter(name) => parameters.has(name),
                Reference::Interpolated(template) => parameters.interpolate(template).is_ok(),
                Reference::Service(dependency) => self.visit(dependency)?,
            };
            if !passable {
                return Ok(false);
            }
        }
        Ok(self.graph.types().contains(&definition.type_ref))
    }
}

/// 依赖解析器
pub(crate) struct Resolver<'g> {
    graph: &'g CompiledGraph,
    visiting: Vec<String>,
}

impl<'g> Resolver<'g> {
    pub(crate) fn new(graph: &'g CompiledGraph) -> Self {
        Self {
            graph,
            visiting: Vec::new(),
        }
    }

    /// 解析服务，单例优先使用缓存
    pub(crate) fn resolve(&mut self, id: &str) -> DependencyResult<Instance> {
        self.resolve_reference(id, None)
    }

    fn resolve_reference(&mut self, id: &str, referenced_by: Option<&str>) -> DependencyResult<Instance> {
        if self.visiting.iter().any(|visiting| visiting == id) {
            return Err(DependencyError::CircularDependency {
                path: cycle_path(&self.visiting, id),
            });
        }

        let graph = self.graph;
        let definition = graph
            .definitions()
            .get(id)
            .ok_or_else(|| missing_reference(id, referenced_by))?;

        match (definition.scope, graph.singleton_cell(id)) {
            (Scope::Singleton, Some(cell)) => {
                if let Some(instance) = cell.get() {
                    return Ok(instance.clone());
                }
                cell.get_or_try_init(|| self.enter(definition)).cloned()
            }
            _ => self.enter(definition),
        }
    }

    fn enter(&mut self, definition: &'g Definition) -> DependencyResult<Instance> {
        self.visiting.push(definition.id.clone());
        let result = self.build(definition);
        self.visiting.pop();
        result
    }

    fn build(&mut self, definition: &'g Definition) -> DependencyResult<Instance> {
        let graph = self.graph;
        let mut values = Vec::with_capacity(definition.arguments.len());
        for argument in &definition.arguments {
            let value = match argument {
                Reference::Literal(value) => ArgumentValue::Value(value.clone()),
                Reference::Parameter(name) => ArgumentValue::Value(graph.parameters().get(name)?.clone()),
                Reference::Interpolated(template) => {
                    ArgumentValue::Value(graph.parameters().interpolate(template)?)
                }
                Reference::Service(dependency) => {
                    ArgumentValue::Service(self.resolve_reference(dependency, Some(definition.id.as_str()))?)
                }
            };
            values.push(value);
        }

        let constructor = graph
            .types()
            .get(&definition.type_ref)
            .ok_or_else(|| DependencyError::UnknownType {
                id: definition.id.clone(),
                type_ref: definition.type_ref.clone(),
            })?;
        let instance = constructor
            .construct(&Arguments::new(definition.id.clone(), values))
            .map_err(|source| DependencyError::instantiation(&definition.id, &definition.type_ref, source))?;

        if definition.is_singleton() {
            debug!("创建单例: {} ({})", definition.id, instance.type_name());
        } else {
            trace!("创建原型实例: {} ({})", definition.id, instance.type_name());
        }
        Ok(instance)
    }
}
