//! The behaviour tree edited through the history.

pub mod commands;

use std::{collections::BTreeMap, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Sequence,
    Selector,
    Parallel,
    Inverter,
    Repeater,
    Action(String),
    Condition(String),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("Root"),
            Self::Sequence => f.write_str("Sequence"),
            Self::Selector => f.write_str("Selector"),
            Self::Parallel => f.write_str("Parallel"),
            Self::Inverter => f.write_str("Inverter"),
            Self::Repeater => f.write_str("Repeater"),
            Self::Action(name) => write!(f, "Action '{name}'"),
            Self::Condition(name) => write!(f, "Condition '{name}'"),
        }
    }
}

/// Canvas position of a node, in editor units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    #[must_use]
    pub fn new(id: NodeId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// A detached subtree, root first, plus the slot the root held under its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedSubtree {
    pub nodes: Vec<Node>,
    pub slot: Option<usize>,
}

impl RemovedSubtree {
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BehaviourTree {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
}

impl BehaviourTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out an id no node in this tree uses, `None` once the id space
    /// above the highest inserted id is used up.
    pub fn allocate_id(&mut self) -> Option<NodeId> {
        let id = u32::try_from(self.next_id).ok()?;
        self.next_id += 1;
        Some(NodeId(id))
    }

    fn reserve(&mut self, id: NodeId) {
        self.next_id = self.next_id.max(u64::from(id.0) + 1);
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[][..], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Inserts `node` and links it under its parent at `slot` (clamped), or
    /// last when `slot` is `None`. A parent that is not in the tree is dropped.
    pub fn insert_node(&mut self, mut node: Node, slot: Option<usize>) {
        if let Some(parent_id) = node.parent {
            match self.nodes.get_mut(&parent_id) {
                Some(parent) => {
                    let slot = slot.unwrap_or(parent.children.len()).min(parent.children.len());
                    parent.children.insert(slot, node.id);
                }
                None => node.parent = None,
            }
        }

        self.reserve(node.id);
        self.nodes.insert(node.id, node);
    }

    /// Removes `id` and all of its descendants.
    pub fn remove_subtree(&mut self, id: NodeId) -> Option<RemovedSubtree> {
        let root = self.nodes.remove(&id)?;

        let slot = root.parent.and_then(|parent_id| {
            let parent = self.nodes.get_mut(&parent_id)?;
            let slot = parent.children.iter().position(|c| *c == id)?;
            parent.children.remove(slot);
            Some(slot)
        });

        let mut nodes = vec![root];
        let mut cursor = 0;
        while cursor < nodes.len() {
            let children = nodes[cursor].children.clone();
            nodes.extend(children.into_iter().filter_map(|c| self.nodes.remove(&c)));
            cursor += 1;
        }

        Some(RemovedSubtree { nodes, slot })
    }

    /// Puts back a subtree returned by [`remove_subtree`](Self::remove_subtree).
    pub fn restore_subtree(&mut self, removed: RemovedSubtree) {
        let mut nodes = removed.nodes.into_iter();
        let Some(root) = nodes.next() else {
            return;
        };

        self.insert_node(root, removed.slot);
        for node in nodes {
            self.reserve(node.id);
            self.nodes.insert(node.id, node);
        }
    }

    /// Moves a node, returning its previous position.
    pub fn set_position(&mut self, id: NodeId, position: Position) -> Option<Position> {
        let node = self.nodes.get_mut(&id)?;
        Some(std::mem::replace(&mut node.position, position))
    }
}
