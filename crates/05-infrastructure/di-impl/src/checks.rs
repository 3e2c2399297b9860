//! 定义检查
//!
//! 只检查定义图，不运行任何构造函数

use crate::template;
use di_abstractions::{Definition, DefinitionCheck, DefinitionGraph, Reference};
use infrastructure_common::{DependencyError, DependencyResult};
use std::collections::HashSet;

/// 默认检查链，按执行顺序排列
pub fn default_checks() -> Vec<Box<dyn DefinitionCheck>> {
    vec![
        Box::new(ReferencesDefined),
        Box::new(ParametersDefined),
        Box::new(TypeRegistered),
        Box::new(Acyclic),
    ]
}

/// 所有服务引用都已定义
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferencesDefined;

impl DefinitionCheck for ReferencesDefined {
    fn name(&self) -> &'static str {
        "references_defined"
    }

    fn check(&self, definition: &Definition, graph: &dyn DefinitionGraph) -> DependencyResult<()> {
        match definition
            .service_references()
            .find(|dependency| graph.definition(dependency).is_none())
        {
            Some(missing) => Err(DependencyError::UndefinedReference {
                id: missing.to_string(),
                referenced_by: definition.id.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// 参数引用和模板占位符都已设置
#[derive(Debug, Default, Clone, Copy)]
pub struct ParametersDefined;

impl DefinitionCheck for ParametersDefined {
    fn name(&self) -> &'static str {
        "parameters_defined"
    }

    fn check(&self, definition: &Definition, graph: &dyn DefinitionGraph) -> DependencyResult<()> {
        for argument in &definition.arguments {
            let names = match argument {
                Reference::Parameter(name) => vec![name.as_str()],
                Reference::Interpolated(template) => template::placeholder_names(template),
                Reference::Literal(_) | Reference::Service(_) => continue,
            };
            if let Some(missing) = names.into_iter().find(|name| !graph.has_parameter(name)) {
                return Err(DependencyError::UnknownParameter {
                    name: missing.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// 类型已注册构造函数
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeRegistered;

impl DefinitionCheck for TypeRegistered {
    fn name(&self) -> &'static str {
        "type_registered"
    }

    fn check(&self, definition: &Definition, graph: &dyn DefinitionGraph) -> DependencyResult<()> {
        if graph.has_type(&definition.type_ref) {
            Ok(())
        } else {
            Err(DependencyError::UnknownType {
                id: definition.id.clone(),
                type_ref: definition.type_ref.clone(),
            })
        }
    }
}

/// 从该定义出发不存在循环依赖
///
/// 未定义的引用留给 [`ReferencesDefined`] 报告
#[derive(Debug, Default, Clone, Copy)]
pub struct Acyclic;

impl DefinitionCheck for Acyclic {
    fn name(&self) -> &'static str {
        "acyclic"
    }

    fn check(&self, definition: &Definition, graph: &dyn DefinitionGraph) -> DependencyResult<()> {
        let mut visiting = vec![definition.id.as_str()];
        let mut visited = HashSet::new();
        for dependency in definition.service_references() {
            dfs_check(dependency, graph, &mut visiting, &mut visited)?;
        }
        Ok(())
    }
}

fn dfs_check<'a>(
    current: &'a str,
    graph: &'a dyn DefinitionGraph,
    visiting: &mut Vec<&'a str>,
    visited: &mut HashSet<&'a str>,
) -> DependencyResult<()> {
    if visiting.contains(&current) {
        let path = visiting
            .iter()
            .chain(std::iter::once(&current))
            .map(|id| id.to_string())
            .collect();
        return Err(DependencyError::CircularDependency { path });
    }
    if visited.contains(current) {
        return Ok(());
    }

    if let Some(node) = graph.definition(current) {
        visiting.push(current);
        for dependency in node.service_references() {
            dfs_check(dependency, graph, visiting, visited)?;
        }
        visiting.pop();
    }
    visited.insert(current);
    Ok(())
}
