//! Layout engine - deterministic left-to-right layered layout
//!
//! A Sugiyama-style pipeline:
//!   1. Cycle breaking (DFS in id order, back edges reversed)
//!   2. Rank assignment (longest path from sources)
//!   3. Ordering within ranks (barycenter sweeps, fewest crossings kept)
//!   4. Coordinate assignment (ranks left to right, nodes top-aligned)
//!   5. Grid snapping
//!
//! Every step breaks ties by node id, so the same element set always yields
//! the same coordinates no matter how the response was ordered.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::LayoutConfig;
use crate::graph::ElementSet;

/// A point in layout space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`
    pub fn lerp(self, to: Position, t: f64) -> Position {
        let t = t.clamp(0.0, 1.0);
        Position {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// Node positions keyed by node id, in id order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct Layout {
    pub positions: IndexMap<String, Position>,
    pub rank_count: usize,
}

impl Layout {
    pub fn position(&self, node_id: &str) -> Option<Position> {
        self.positions.get(node_id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

struct LayoutGraph<'a> {
    ids: Vec<&'a str>,
    widths: Vec<f64>,
    /// successors after cycle breaking
    adj: Vec<Vec<usize>>,
    /// predecessors after cycle breaking
    rev: Vec<Vec<usize>>,
}

impl<'a> LayoutGraph<'a> {
    fn build(elements: &'a ElementSet, config: &LayoutConfig) -> Self {
        let mut nodes: Vec<(&str, &str)> = elements
            .nodes
            .iter()
            .map(|n| (n.data.id.as_str(), n.data.label.as_str()))
            .collect();
        nodes.sort_by(|a, b| a.0.cmp(b.0));
        nodes.dedup_by(|a, b| a.0 == b.0);

        let ids: Vec<&str> = nodes.iter().map(|(id, _)| *id).collect();
        let widths = nodes.iter().map(|(_, label)| config.node_width(label)).collect();
        let index = |id: &str| ids.binary_search(&id).ok();

        let mut raw: Vec<(usize, usize)> = elements
            .edges
            .iter()
            .filter_map(|e| {
                let source = index(e.data.source.as_str())?;
                let target = index(e.data.target.as_str())?;
                Some((source, target))
            })
            .filter(|(s, t)| s != t)
            .collect();
        raw.sort_unstable();
        raw.dedup();

        let n = ids.len();
        let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(s, t) in &raw {
            out[s].push(t);
        }

        let reversed = find_back_edges(&out);
        let mut adj = vec![Vec::new(); n];
        let mut rev = vec![Vec::new(); n];
        for &(s, t) in &raw {
            let (s, t) = if reversed.contains(&(s, t)) { (t, s) } else { (s, t) };
            if !adj[s].contains(&t) {
                adj[s].push(t);
                rev[t].push(s);
            }
        }

        Self {
            ids,
            widths,
            adj,
            rev,
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Back edges of a DFS that visits roots and successors in index order
fn find_back_edges(out: &[Vec<usize>]) -> Vec<(usize, usize)> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        OnStack,
        Done,
    }

    let n = out.len();
    let mut marks = vec![Mark::New; n];
    let mut back = Vec::new();

    for root in 0..n {
        if marks[root] != Mark::New {
            continue;
        }
        // explicit stack of (node, next successor slot)
        let mut stack = vec![(root, 0usize)];
        marks[root] = Mark::OnStack;

        while let Some(top) = stack.last_mut() {
            let (node, slot) = *top;
            if slot < out[node].len() {
                top.1 += 1;
                let next = out[node][slot];
                match marks[next] {
                    Mark::New => {
                        marks[next] = Mark::OnStack;
                        stack.push((next, 0));
                    }
                    Mark::OnStack => back.push((node, next)),
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                stack.pop();
            }
        }
    }
    back
}

/// Longest-path ranks over the acyclic graph
fn assign_ranks(graph: &LayoutGraph) -> Vec<usize> {
    let n = graph.len();
    let mut in_degree: Vec<usize> = graph.rev.iter().map(Vec::len).collect();
    let mut queue: Vec<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();
    let mut ranks = vec![0usize; n];

    let mut head = 0;
    while head < queue.len() {
        let u = queue[head];
        head += 1;

        let mut successors = graph.adj[u].clone();
        successors.sort_unstable();
        for v in successors {
            ranks[v] = ranks[v].max(ranks[u] + 1);
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                queue.push(v);
            }
        }
    }
    ranks
}

fn positions_of(order: &[usize], n: usize) -> Vec<Option<usize>> {
    let mut positions = vec![None; n];
    for (pos, &node) in order.iter().enumerate() {
        positions[node] = Some(pos);
    }
    positions
}

fn barycenter(positions: &[Option<usize>], neighbors: &[usize]) -> Option<f64> {
    let placed: Vec<usize> = neighbors.iter().filter_map(|&nb| positions[nb]).collect();
    if placed.is_empty() {
        None
    } else {
        Some(placed.iter().sum::<usize>() as f64 / placed.len() as f64)
    }
}

/// Reorder `rank` by the barycenter of its neighbours in the fixed rank.
/// Nodes without placed neighbours keep their current slot.
fn reorder(rank: &mut Vec<usize>, fixed: &[usize], neighbors: &[Vec<usize>], n: usize) {
    let fixed_pos = positions_of(fixed, n);
    let mut scored: Vec<(usize, f64)> = rank
        .iter()
        .enumerate()
        .map(|(slot, &v)| {
            let score = barycenter(&fixed_pos, &neighbors[v]).unwrap_or(slot as f64);
            (v, score)
        })
        .collect();

    scored.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    *rank = scored.into_iter().map(|(v, _)| v).collect();
}

fn count_crossings(order: &[Vec<usize>], graph: &LayoutGraph) -> usize {
    let n = graph.len();
    let mut total = 0;
    for pair in order.windows(2) {
        let upper = positions_of(&pair[0], n);
        let lower = positions_of(&pair[1], n);

        let mut segments: Vec<(usize, usize)> = Vec::new();
        for &u in &pair[0] {
            for &v in &graph.adj[u] {
                if let (Some(a), Some(b)) = (upper[u], lower[v]) {
                    segments.push((a, b));
                }
            }
        }

        for (i, &(a1, b1)) in segments.iter().enumerate() {
            for &(a2, b2) in &segments[i + 1..] {
                if (a1 < a2 && b1 > b2) || (a1 > a2 && b1 < b2) {
                    total += 1;
                }
            }
        }
    }
    total
}

fn order_ranks(graph: &LayoutGraph, ranks: &[usize], sweeps: usize) -> Vec<Vec<usize>> {
    let rank_count = ranks.iter().copied().max().map_or(0, |m| m + 1);
    let mut order: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    // ids are sorted, so index order is id order
    for (v, &r) in ranks.iter().enumerate() {
        order[r].push(v);
    }

    let n = graph.len();
    let mut best = order.clone();
    let mut best_crossings = count_crossings(&order, graph);

    for _ in 0..sweeps {
        if best_crossings == 0 {
            break;
        }
        for r in 1..rank_count {
            let (fixed, rest) = order.split_at_mut(r);
            reorder(&mut rest[0], &fixed[r - 1], &graph.rev, n);
        }
        for r in (0..rank_count.saturating_sub(1)).rev() {
            let (head, tail) = order.split_at_mut(r + 1);
            reorder(&mut head[r], &tail[0], &graph.adj, n);
        }

        let crossings = count_crossings(&order, graph);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = order.clone();
        }
    }
    best
}

fn snap(value: f64, grid: f64) -> f64 {
    (value / grid).round() * grid
}

/// Engine for hierarchical layout of a normalized element set
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute node positions. Dangling edges and self-loops do not
    /// influence placement.
    pub fn layout(&self, elements: &ElementSet) -> Layout {
        let graph = LayoutGraph::build(elements, &self.config);
        if graph.len() == 0 {
            return Layout::default();
        }

        let ranks = assign_ranks(&graph);
        let order = order_ranks(&graph, &ranks, self.config.ordering_sweeps);

        // rows are a whole number of grid buckets apart so snapping never
        // merges two nodes
        let grid = self.config.vertical_grid;
        let pitch = ((self.config.node_height + self.config.node_sep) / grid).ceil() * grid;

        let mut placed: Vec<(usize, Position)> = Vec::with_capacity(graph.len());
        let mut rank_left = 0.0;
        for rank in &order {
            let rank_width = rank
                .iter()
                .map(|&v| graph.widths[v])
                .fold(0.0_f64, f64::max);
            let x = snap(rank_left + rank_width / 2.0, self.config.horizontal_grid);

            for (slot, &v) in rank.iter().enumerate() {
                let y = snap(slot as f64 * pitch + self.config.node_height / 2.0, grid);
                placed.push((v, Position::new(x, y)));
            }
            rank_left += rank_width + self.config.rank_sep;
        }

        placed.sort_by_key(|(v, _)| *v);
        let positions = placed
            .into_iter()
            .map(|(v, pos)| (graph.ids[v].to_string(), pos))
            .collect();

        tracing::debug!(
            "[LAYOUT] Placed {} nodes on {} ranks",
            graph.len(),
            order.len()
        );

        Layout {
            positions,
            rank_count: order.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphNormalizer;
    use kontrol_client::{ClusterTopology, Edge, Node, NodeVersion};

    fn shop() -> ClusterTopology {
        let v = |f: &str| NodeVersion::new(f, Some("img"), f == "prod");
        ClusterTopology {
            nodes: vec![
                Node::new("ingress").with_versions(vec![v("prod")]),
                Node::new("frontend").with_versions(vec![v("prod"), v("dev")]),
                Node::new("cartservice").with_versions(vec![v("prod"), v("dev")]),
                Node::new("checkoutservice").with_versions(vec![v("prod")]),
                Node::new("postgres").with_versions(vec![v("prod")]),
            ],
            edges: vec![
                Edge::new("ingress", "frontend"),
                Edge::new("frontend", "cartservice"),
                Edge::new("frontend", "checkoutservice"),
                Edge::new("checkoutservice", "cartservice"),
                Edge::new("cartservice", "postgres"),
            ],
        }
    }

    fn layout_of(topology: &ClusterTopology) -> Layout {
        LayoutEngine::default().layout(&GraphNormalizer::normalize(topology))
    }

    #[test]
    fn test_empty_layout() {
        assert!(LayoutEngine::default().layout(&ElementSet::default()).is_empty());
    }

    #[test]
    fn test_edges_point_left_to_right() {
        let topology = shop();
        let layout = layout_of(&topology);

        assert_eq!(layout.len(), 5);
        for edge in &topology.edges {
            let s = layout.position(&edge.source).unwrap();
            let t = layout.position(&edge.target).unwrap();
            assert!(s.x < t.x, "{} should be left of {}", edge.source, edge.target);
        }
    }

    #[test]
    fn test_longest_path_ranks() {
        let layout = layout_of(&shop());
        // ingress -> frontend -> checkoutservice -> cartservice -> postgres
        assert_eq!(layout.rank_count, 5);
    }

    #[test]
    fn test_positions_are_on_grid() {
        let layout = layout_of(&shop());
        for pos in layout.positions.values() {
            assert_eq!(pos.y % 100.0, 0.0);
            assert_eq!(pos.x % 10.0, 0.0);
        }
    }

    #[test]
    fn test_reordered_input_yields_identical_layout() {
        let forward = shop();
        let mut backward = shop();
        backward.nodes.reverse();
        backward.edges.reverse();

        assert_eq!(layout_of(&forward), layout_of(&backward));
    }

    #[test]
    fn test_nodes_in_one_rank_do_not_collide() {
        let topology = ClusterTopology {
            nodes: vec![Node::new("gw"), Node::new("a"), Node::new("b"), Node::new("c")],
            edges: vec![Edge::new("gw", "a"), Edge::new("gw", "b"), Edge::new("gw", "c")],
        };
        let layout = layout_of(&topology);
        let mut ys: Vec<i64> = ["a", "b", "c"]
            .iter()
            .map(|id| layout.position(id).unwrap().y as i64)
            .collect();
        ys.dedup();
        assert_eq!(ys.len(), 3);
    }

    #[test]
    fn test_cycles_and_dangling_edges_are_tolerated() {
        let topology = ClusterTopology {
            nodes: vec![Node::new("a"), Node::new("b"), Node::new("c")],
            edges: vec![
                Edge::new("a", "b"),
                Edge::new("b", "c"),
                Edge::new("c", "a"),
                Edge::new("c", "nowhere"),
                Edge::new("a", "a"),
            ],
        };
        let layout = layout_of(&topology);
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.rank_count, 3);
    }

    #[test]
    fn test_barycenter_untangles_crossing() {
        // a1 -> b2 and a2 -> b1 cross in id order; one sweep fixes it
        let topology = ClusterTopology {
            nodes: vec![Node::new("a1"), Node::new("a2"), Node::new("b1"), Node::new("b2")],
            edges: vec![Edge::new("a1", "b2"), Edge::new("a2", "b1")],
        };
        let elements = GraphNormalizer::normalize(&topology);
        let layout = LayoutEngine::default().layout(&elements);

        let a1 = layout.position("a1").unwrap();
        let b2 = layout.position("b2").unwrap();
        assert_eq!(a1.y, b2.y);
    }

    #[test]
    fn test_lerp() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(100.0, 200.0);
        assert_eq!(a.lerp(b, 0.5), Position::new(50.0, 100.0));
        assert_eq!(a.lerp(b, 2.0), b);
    }
}
