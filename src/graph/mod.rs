//! Graph algorithms over lazily discovered nodes.
//!
//! The target graph is never materialised up front: asking a target for its
//! edges may parse its sources and surface names nobody has seen before. Both
//! algorithms here therefore take a caller-supplied `edges` function and grow
//! the node set as they go.
//!
//! - [`deps_cover`] - everything reachable from a set of roots
//! - [`topological_sort`] - dependencies-first order plus every cycle found
//!
//! Both are deterministic: the same roots and the same `edges` output order
//! always produce the same result.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::hash::Hash;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Result of [`topological_sort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoSort<N> {
    /// Every reachable node, dependencies before dependents.
    pub order: Vec<N>,
    /// Each cycle starts and ends with the same node.
    pub cycles: Vec<Vec<N>>,
}

impl<N> TopoSort<N> {
    /// Returns `true` if any cycle was found; `order` is unreliable then.
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// The first cycle found, if any.
    pub fn first_cycle(&self) -> Option<&[N]> {
        self.cycles.first().map(Vec::as_slice)
    }
}

/// Render a cycle as `a -> b -> a`.
pub fn render_cycle<N: Display>(cycle: &[N]) -> String {
    cycle.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
}

/// All nodes reachable from `roots`, roots included, in discovery order.
///
/// Breadth-first over a growing frontier; `edges` is called exactly once per
/// reachable node and cycles are harmless.
pub fn deps_cover<N, E, F>(roots: &[N], mut edges: F) -> Result<Vec<N>, E>
where
    N: Clone + Eq + Hash,
    F: FnMut(&N) -> Result<Vec<N>, E>,
{
    let mut visited: HashSet<N> = HashSet::new();
    let mut discovered = Vec::new();
    let mut frontier = VecDeque::new();

    for root in roots {
        if visited.insert(root.clone()) {
            discovered.push(root.clone());
            frontier.push_back(root.clone());
        }
    }

    while let Some(node) = frontier.pop_front() {
        for next in edges(&node)? {
            if visited.insert(next.clone()) {
                discovered.push(next.clone());
                frontier.push_back(next);
            }
        }
    }

    Ok(discovered)
}

/// Depth-first topological sort that records cycles instead of failing.
///
/// Nodes are emitted in finish order, so every node appears after the nodes it
/// depends on. Reaching a node that is still on the DFS stack records the
/// stack slice from that node back to itself; traversal then carries on so
/// that all cycles surface, not just the first.
pub fn topological_sort<N, E, F>(roots: &[N], mut edges: F) -> Result<TopoSort<N>, E>
where
    N: Clone + Eq + Hash,
    F: FnMut(&N) -> Result<Vec<N>, E>,
{
    let mut dfs = Dfs {
        edges: &mut edges,
        colors: HashMap::new(),
        stack: Vec::new(),
        order: Vec::new(),
        cycles: Vec::new(),
    };

    for root in roots {
        if dfs.color(root) == Color::White {
            dfs.visit(root)?;
        }
    }

    Ok(TopoSort {
        order: dfs.order,
        cycles: dfs.cycles,
    })
}

struct Dfs<'a, N, F> {
    edges: &'a mut F,
    colors: HashMap<N, Color>,
    stack: Vec<N>,
    order: Vec<N>,
    cycles: Vec<Vec<N>>,
}

impl<N, F> Dfs<'_, N, F>
where
    N: Clone + Eq + Hash,
{
    fn color(&self, node: &N) -> Color {
        self.colors.get(node).copied().unwrap_or(Color::White)
    }

    fn visit<E>(&mut self, node: &N) -> Result<(), E>
    where
        F: FnMut(&N) -> Result<Vec<N>, E>,
    {
        self.colors.insert(node.clone(), Color::Gray);
        self.stack.push(node.clone());

        for next in (*self.edges)(node)? {
            match self.color(&next) {
                Color::Gray => {
                    if let Some(start) = self.stack.iter().rposition(|n| *n == next) {
                        let mut cycle = self.stack[start..].to_vec();
                        cycle.push(next);
                        self.cycles.push(cycle);
                    }
                }
                Color::White => self.visit(&next)?,
                Color::Black => {}
            }
        }

        self.stack.pop();
        self.colors.insert(node.clone(), Color::Black);
        self.order.push(node.clone());
        Ok(())
    }
}
