//! Arc-wrapped immutable module graph
//!
//! A `GraphSnapshot` is taken once per deployment pass so that resolution
//! never observes a graph that changes underneath it. Cloning only bumps a
//! reference counter.

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::sync::Arc;
use wabscope_api::{ModuleId, ModuleInfo, WiringEdge, WiringGraph};

/// Anything able to hand out a consistent snapshot of the module graph.
pub trait SnapshotProvider: Send + Sync {
    fn snapshot(&self) -> GraphSnapshot;
}

/// Edge weight of the snapshot topology.
///
/// `seq` preserves the runtime's enumeration order; petgraph walks adjacency
/// lists newest-first.
#[derive(Debug, Clone)]
pub enum ModuleLink {
    /// fragment -> host
    Attachment { seq: usize },
    /// consumer -> provider
    Wiring { seq: usize, edge: WiringEdge },
}

impl ModuleLink {
    fn seq(&self) -> usize {
        match self {
            ModuleLink::Attachment { seq } | ModuleLink::Wiring { seq, .. } => *seq,
        }
    }
}

#[derive(Clone)]
pub struct GraphSnapshot {
    inner: Arc<SnapshotInner>,
}

struct SnapshotInner {
    topology: StableDiGraph<ModuleInfo, ModuleLink>,
    index: HashMap<ModuleId, NodeIndex>,
}

impl GraphSnapshot {
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    /// Build a snapshot from module records, `(host, fragment)` attachments
    /// and wiring edges, each in runtime enumeration order.
    ///
    /// Attachments and edges naming unknown modules are dropped.
    pub fn new(
        modules: impl IntoIterator<Item = ModuleInfo>,
        attachments: impl IntoIterator<Item = (ModuleId, ModuleId)>,
        edges: impl IntoIterator<Item = WiringEdge>,
    ) -> Self {
        let mut topology = StableDiGraph::new();
        let mut index = HashMap::new();

        for module in modules {
            let id = module.id;
            let idx = topology.add_node(module);
            index.insert(id, idx);
        }

        let mut seq = 0;
        for (host, fragment) in attachments {
            let (Some(&h), Some(&f)) = (index.get(&host), index.get(&fragment)) else {
                continue;
            };
            if let Some(info) = topology.node_weight_mut(f) {
                info.host = Some(host);
            }
            topology.add_edge(f, h, ModuleLink::Attachment { seq });
            seq += 1;
        }

        for edge in edges {
            let (Some(&c), Some(&p)) = (index.get(&edge.consumer), index.get(&edge.provider))
            else {
                continue;
            };
            topology.add_edge(c, p, ModuleLink::Wiring { seq, edge });
            seq += 1;
        }

        Self {
            inner: Arc::new(SnapshotInner { topology, index }),
        }
    }

    pub fn module_count(&self) -> usize {
        self.inner.topology.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.topology.edge_count()
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.inner.index.contains_key(&id)
    }

    fn sorted_links(&self, id: ModuleId, direction: Direction) -> Vec<(NodeIndex, &ModuleLink)> {
        let Some(&idx) = self.inner.index.get(&id) else {
            return Vec::new();
        };
        let mut links: Vec<_> = self
            .inner
            .topology
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (other, e.weight())
            })
            .collect();
        links.sort_by_key(|(_, link)| link.seq());
        links
    }
}

impl WiringGraph for GraphSnapshot {
    fn module_by_id(&self, id: ModuleId) -> Option<ModuleInfo> {
        let idx = self.inner.index.get(&id)?;
        self.inner.topology.node_weight(*idx).cloned()
    }

    fn fragments_of(&self, host: ModuleId) -> Vec<ModuleInfo> {
        self.sorted_links(host, Direction::Incoming)
            .into_iter()
            .filter(|(_, link)| matches!(link, ModuleLink::Attachment { .. }))
            .filter_map(|(idx, _)| self.inner.topology.node_weight(idx).cloned())
            .collect()
    }

    fn wired_modules_of(&self, module: ModuleId) -> Vec<(ModuleInfo, WiringEdge)> {
        self.sorted_links(module, Direction::Outgoing)
            .into_iter()
            .filter_map(|(idx, link)| match link {
                ModuleLink::Wiring { edge, .. } => self
                    .inner
                    .topology
                    .node_weight(idx)
                    .map(|info| (info.clone(), edge.clone())),
                ModuleLink::Attachment { .. } => None,
            })
            .collect()
    }
}
