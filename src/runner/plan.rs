// Execution planning
//
// Steps form a DAG through their dependency tags: a step depends on every
// registered step carrying one of its dependency tags. Plans are computed
// with Kahn's algorithm; among ready steps the earliest registered goes first.

use std::collections::{BTreeSet, HashMap};

use crate::error::{DeployError, Result};

/// Tag view of a registered step
pub(crate) struct StepNode<'a> {
    pub id: &'a str,
    pub tags: &'a [&'a str],
    pub dependencies: &'a [&'a str],
}

/// Order the nodes, restricted to `filter` tags and their transitive
/// dependencies when the filter is non-empty. Returns node indices.
pub(crate) fn topological_order(nodes: &[StepNode<'_>], filter: &[String]) -> Result<Vec<usize>> {
    let mut providers: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        for tag in node.tags {
            providers.entry(*tag).or_default().push(index);
        }
    }

    let mut predecessors: Vec<BTreeSet<usize>> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let mut preds = BTreeSet::new();
        for tag in node.dependencies {
            let found = providers.get(tag).ok_or_else(|| DeployError::UnknownDependency {
                step: node.id.to_string(),
                tag: tag.to_string(),
            })?;
            preds.extend(found.iter().copied());
        }
        predecessors.push(preds);
    }

    let selected = select(nodes.len(), &providers, &predecessors, filter)?;

    let mut in_degree: HashMap<usize, usize> = selected
        .iter()
        .map(|&index| (index, predecessors[index].len()))
        .collect();
    let mut successors: HashMap<usize, Vec<usize>> = HashMap::new();
    for &index in &selected {
        for &pred in &predecessors[index] {
            successors.entry(pred).or_default().push(index);
        }
    }

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(&index, _)| index)
        .collect();
    let mut order = Vec::with_capacity(selected.len());
    while let Some(index) = ready.pop_first() {
        order.push(index);
        for next in successors.get(&index).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*next);
                }
            }
        }
    }

    if order.len() < selected.len() {
        let placed: BTreeSet<usize> = order.iter().copied().collect();
        let steps = selected
            .iter()
            .filter(|index| !placed.contains(index))
            .map(|&index| nodes[index].id.to_string())
            .collect();
        return Err(DeployError::DependencyCycle { steps });
    }
    Ok(order)
}

fn select(
    count: usize,
    providers: &HashMap<&str, Vec<usize>>,
    predecessors: &[BTreeSet<usize>],
    filter: &[String],
) -> Result<BTreeSet<usize>> {
    if filter.is_empty() {
        return Ok((0..count).collect());
    }

    let mut selected = BTreeSet::new();
    let mut pending = Vec::new();
    for tag in filter {
        let found = providers
            .get(tag.as_str())
            .ok_or_else(|| DeployError::UnknownTag(tag.clone()))?;
        pending.extend(found.iter().copied());
    }
    while let Some(index) = pending.pop() {
        if selected.insert(index) {
            pending.extend(predecessors[index].iter().copied());
        }
    }
    Ok(selected)
}
