//! Category hierarchy: tree assembly and ancestry walks over a flat set.
//!
//! Every function takes the full category list as loaded from the store.
//! None of them recurse, so depth is bounded only by the input size, and
//! all of them terminate on corrupted data that contains parent cycles.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Category;

/// A category with its nested children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    /// The category itself.
    #[serde(flatten)]
    pub category: Category,
    /// Direct children, in input order.
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Number of categories in this subtree, including the node.
    pub fn size(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children.iter());
        }
        total
    }
}

/// Assemble a forest from a flat category list.
///
/// Roots are categories without a parent or whose parent is not in the
/// input. Categories caught in a parent cycle are attached under the first
/// cycle member (in input order), which is promoted to a root. Each
/// category appears exactly once; duplicate ids keep the first occurrence.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let mut seen = HashSet::new();
    let unique: Vec<&Category> = categories.iter().filter(|c| seen.insert(c.id)).collect();

    let index: HashMap<Uuid, usize> = unique.iter().enumerate().map(|(i, c)| (c.id, i)).collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); unique.len()];
    let mut roots = Vec::new();
    for (i, category) in unique.iter().enumerate() {
        match category.parent_id.and_then(|p| index.get(&p)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    // Depth-first walk from every root, then from anything left unvisited
    // (cycle members). Records the tree edges actually taken and a
    // post-order so nodes can be assembled bottom-up.
    let mut visited = vec![false; unique.len()];
    let mut tree_children: Vec<Vec<usize>> = vec![Vec::new(); unique.len()];
    let mut post_order = Vec::with_capacity(unique.len());
    let mut top = Vec::new();

    for start in roots.iter().copied().chain(0..unique.len()) {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        top.push(start);

        let mut stack = vec![(start, 0usize)];
        while let Some((node, next)) = stack.pop() {
            match children[node].get(next) {
                Some(&child) => {
                    stack.push((node, next + 1));
                    if !visited[child] {
                        visited[child] = true;
                        tree_children[node].push(child);
                        stack.push((child, 0));
                    }
                }
                None => post_order.push(node),
            }
        }
    }

    let mut built: Vec<Option<CategoryNode>> = (0..unique.len()).map(|_| None).collect();
    for node in post_order {
        let kids = tree_children[node]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[node] = Some(CategoryNode {
            category: unique[node].clone(),
            children: kids,
        });
    }

    top.into_iter().filter_map(|r| built[r].take()).collect()
}

/// Direct children of `id`.
pub fn subcategories(categories: &[Category], id: Uuid) -> Vec<Category> {
    categories
        .iter()
        .filter(|c| c.parent_id == Some(id))
        .cloned()
        .collect()
}

/// The chain of parents above `id`, root first. Excludes `id` itself.
pub fn ancestors(categories: &[Category], id: Uuid) -> Vec<Category> {
    let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    let mut chain = Vec::new();
    let mut visited = HashSet::from([id]);

    let mut current = by_id.get(&id).and_then(|c| c.parent_id);
    while let Some(parent_id) = current {
        if !visited.insert(parent_id) {
            break;
        }
        let Some(parent) = by_id.get(&parent_id) else {
            break;
        };
        chain.push((*parent).clone());
        current = parent.parent_id;
    }

    chain.reverse();
    chain
}

/// Every category below `id`, breadth-first. Excludes `id` itself.
pub fn descendants(categories: &[Category], id: Uuid) -> Vec<Category> {
    let mut by_parent: HashMap<Uuid, Vec<&Category>> = HashMap::new();
    for category in categories {
        if let Some(parent) = category.parent_id {
            by_parent.entry(parent).or_default().push(category);
        }
    }

    let mut result = Vec::new();
    let mut visited = HashSet::from([id]);
    let mut queue = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        for child in by_parent.get(&current).into_iter().flatten() {
            if visited.insert(child.id) {
                result.push((*child).clone());
                queue.push_back(child.id);
            }
        }
    }
    result
}

/// Whether re-parenting `id` under `proposed_parent` would close a loop.
pub fn would_create_cycle(categories: &[Category], id: Uuid, proposed_parent: Uuid) -> bool {
    if proposed_parent == id {
        return true;
    }
    let parent_of: HashMap<Uuid, Option<Uuid>> =
        categories.iter().map(|c| (c.id, c.parent_id)).collect();

    let mut visited = HashSet::new();
    let mut current = Some(proposed_parent);
    while let Some(node) = current {
        if node == id {
            return true;
        }
        if !visited.insert(node) {
            return false;
        }
        current = parent_of.get(&node).copied().flatten();
    }
    false
}
