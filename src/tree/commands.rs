use std::borrow::Cow;

use crate::{shared_context::SharedContext, traits::command::Command};

use super::{BehaviourTree, Node, NodeId, NodeKind, Position, RemovedSubtree};

/// Adds a new node, optionally under `parent` at `slot`.
#[derive(Debug, Clone)]
pub struct CreateNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    pub parent: Option<NodeId>,
    pub slot: Option<usize>,
}

/// Removes a node together with its descendants.
#[derive(Debug, Clone)]
pub struct DeleteNode {
    pub id: NodeId,
    removed: Option<RemovedSubtree>,
}

impl DeleteNode {
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self { id, removed: None }
    }
}

/// Drags a node from one canvas position to another.
///
/// `from` is a hint until the first execute, which replaces it with the
/// position the node actually had.
#[derive(Debug, Clone)]
pub struct MoveNode {
    pub id: NodeId,
    pub from: Position,
    pub to: Position,
    captured: bool,
}

impl MoveNode {
    #[must_use]
    pub fn new(id: NodeId, from: Position, to: Position) -> Self {
        Self {
            id,
            from,
            to,
            captured: false,
        }
    }

    fn apply(&mut self, tree: &mut BehaviourTree) {
        match tree.set_position(self.id, self.to) {
            Some(previous) if !self.captured => {
                self.from = previous;
                self.captured = true;
            }
            Some(_) => {}
            None => tracing::warn!(id = %self.id, "move targets a node that is not in the tree"),
        }
    }

    fn revert(&self, tree: &mut BehaviourTree) {
        if tree.set_position(self.id, self.from).is_none() {
            tracing::warn!(id = %self.id, "move targets a node that is not in the tree");
        }
    }
}

/// Every edit the tree editor records.
#[derive(Debug, Clone)]
pub enum TreeCommand {
    Create(CreateNode),
    Delete(DeleteNode),
    Move(MoveNode),
}

impl TreeCommand {
    /// Creates a node with a fresh id taken from `tree`. `None` when the tree
    /// has no id left to hand out.
    pub fn create(
        tree: &mut BehaviourTree,
        kind: NodeKind,
        position: Position,
        parent: Option<NodeId>,
    ) -> Option<Self> {
        Some(Self::Create(CreateNode {
            id: tree.allocate_id()?,
            kind,
            position,
            parent,
            slot: None,
        }))
    }

    #[must_use]
    pub fn delete(id: NodeId) -> Self {
        Self::Delete(DeleteNode::new(id))
    }

    #[must_use]
    pub fn move_node(id: NodeId, from: Position, to: Position) -> Self {
        Self::Move(MoveNode::new(id, from, to))
    }

    /// The node this command acts on.
    #[must_use]
    pub fn target(&self) -> NodeId {
        match self {
            Self::Create(c) => c.id,
            Self::Delete(d) => d.id,
            Self::Move(m) => m.id,
        }
    }
}

impl Command for TreeCommand {
    type Context = SharedContext<BehaviourTree>;

    fn execute(&mut self, ctx: &Self::Context) {
        let mut tree = ctx.lock();
        match self {
            Self::Create(create) => {
                let mut node = Node::new(create.id, create.kind.clone(), create.position);
                node.parent = create.parent;
                tree.insert_node(node, create.slot);
            }
            Self::Delete(delete) => {
                delete.removed = tree.remove_subtree(delete.id);
                if delete.removed.is_none() {
                    tracing::warn!(id = %delete.id, "delete targets a node that is not in the tree");
                }
            }
            Self::Move(movement) => movement.apply(&mut tree),
        }
    }

    fn undo(&mut self, ctx: &Self::Context) {
        let mut tree = ctx.lock();
        match self {
            Self::Create(create) => {
                if let Some(removed) = tree.remove_subtree(create.id) {
                    create.slot = removed.slot;
                }
            }
            Self::Delete(delete) => {
                if let Some(removed) = delete.removed.take() {
                    tree.restore_subtree(removed);
                }
            }
            Self::Move(movement) => movement.revert(&mut tree),
        }
    }

    fn combine_with(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::Move(current), Self::Move(next)) if current.id == next.id => {
                current.to = next.to;
                true
            }
            _ => false,
        }
    }

    fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Create(create) => Cow::Owned(format!("Create {}", create.kind)),
            Self::Delete(_) => Cow::Borrowed("Delete Node"),
            Self::Move(_) => Cow::Borrowed("Move Node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{command_history::CommandHistory, host::memory::MemoryUndoHost};

    fn create(
        ctx: &SharedContext<BehaviourTree>,
        kind: NodeKind,
        position: Position,
        parent: Option<NodeId>,
    ) -> TreeCommand {
        ctx.modify(|tree| TreeCommand::create(tree, kind, position, parent))
            .expect("tree has ids left")
    }

    fn editor() -> (Arc<CommandHistory<TreeCommand>>, SharedContext<BehaviourTree>, NodeId) {
        let ctx = SharedContext::new(BehaviourTree::new());
        let history = CommandHistory::new();

        let create_root = create(&ctx, NodeKind::Root, Position::default(), None);
        let root = create_root.target();
        history.execute(create_root, &ctx, false).unwrap();

        (history, ctx, root)
    }

    #[test]
    fn test_create_round_trip() {
        let (history, ctx, root) = editor();
        let command = create(&ctx, NodeKind::Sequence, Position::new(0.0, 80.0), Some(root));
        let sequence = command.target();

        history.execute(command, &ctx, false).unwrap();
        assert_eq!(ctx.read(|t| t.children(root).to_vec()), vec![sequence]);

        history.undo(&ctx);
        assert!(!ctx.read(|t| t.contains(sequence)));
        assert!(ctx.read(|t| t.children(root).is_empty()));

        history.redo(&ctx);
        assert_eq!(ctx.read(|t| t.children(root).to_vec()), vec![sequence]);
        assert_eq!(history.undo_commands(), vec!["Create Sequence", "Create Root"]);
    }

    #[test]
    fn test_delete_restores_subtree_in_place() {
        let (history, ctx, root) = editor();
        let mut ids = Vec::new();
        for kind in [
            NodeKind::Condition("Alert".into()),
            NodeKind::Selector,
            NodeKind::Action("Idle".into()),
        ] {
            let command = create(&ctx, kind, Position::default(), Some(root));
            ids.push(command.target());
            history.execute(command, &ctx, false).unwrap();
        }
        let selector = ids[1];
        let leaf = create(&ctx, NodeKind::Action("Flee".into()), Position::default(), Some(selector));
        let flee = leaf.target();
        history.execute(leaf, &ctx, false).unwrap();
        let before = ctx.read(Clone::clone);

        history.execute(TreeCommand::delete(selector), &ctx, false).unwrap();
        assert!(!ctx.read(|t| t.contains(flee)));
        assert_eq!(ctx.read(|t| t.children(root).to_vec()), vec![ids[0], ids[2]]);

        history.undo(&ctx);
        assert_eq!(ctx.read(Clone::clone), before);

        history.redo(&ctx);
        assert!(!ctx.read(|t| t.contains(selector)));
        assert_eq!(ctx.read(BehaviourTree::len), 3);
    }

    #[test]
    fn test_drag_combines_into_one_step() {
        let (history, ctx, root) = editor();
        let start = Position::default();
        let mut previous = start;

        for step in 1..=5 {
            let next = Position::new(step as f32 * 10.0, 0.0);
            history
                .execute(TreeCommand::move_node(root, previous, next), &ctx, true)
                .unwrap();
            previous = next;
        }

        assert_eq!(history.undo_commands(), vec!["Move Node", "Create Root"]);
        assert_eq!(
            ctx.read(|t| t.node(root).map(|n| n.position)),
            Some(Position::new(50.0, 0.0))
        );

        history.undo(&ctx);
        assert_eq!(ctx.read(|t| t.node(root).map(|n| n.position)), Some(start));
    }

    #[test]
    fn test_move_undo_uses_actual_start_position() {
        let (history, ctx, root) = editor();
        let start = Position::new(1.0, 1.0);
        ctx.modify(|t| t.set_position(root, start));

        let stale = Position::new(9.0, 9.0);
        history
            .execute(TreeCommand::move_node(root, stale, Position::new(5.0, 5.0)), &ctx, false)
            .unwrap();
        history
            .execute(TreeCommand::move_node(root, stale, Position::new(6.0, 6.0)), &ctx, true)
            .unwrap();
        assert_eq!(history.undo_len(), 2);

        history.undo(&ctx);
        assert_eq!(ctx.read(|t| t.node(root).map(|n| n.position)), Some(start));

        history.redo(&ctx);
        assert_eq!(
            ctx.read(|t| t.node(root).map(|n| n.position)),
            Some(Position::new(6.0, 6.0))
        );

        history.undo(&ctx);
        assert_eq!(ctx.read(|t| t.node(root).map(|n| n.position)), Some(start));
    }

    #[test]
    fn test_create_without_ids_left() {
        let mut tree = BehaviourTree::new();
        tree.insert_node(
            Node::new(NodeId::new(u32::MAX), NodeKind::Root, Position::default()),
            None,
        );

        assert!(TreeCommand::create(&mut tree, NodeKind::Sequence, Position::default(), None).is_none());
    }

    #[test]
    fn test_moves_of_different_nodes_do_not_combine() {
        let (history, ctx, root) = editor();
        let command = create(&ctx, NodeKind::Inverter, Position::default(), Some(root));
        let inverter = command.target();
        history.execute(command, &ctx, false).unwrap();

        let origin = Position::default();
        history
            .execute(TreeCommand::move_node(root, origin, Position::new(1.0, 1.0)), &ctx, true)
            .unwrap();
        history
            .execute(TreeCommand::move_node(inverter, origin, Position::new(2.0, 2.0)), &ctx, true)
            .unwrap();

        assert_eq!(history.undo_len(), 4);
    }

    #[test]
    fn test_delete_missing_node_is_harmless() {
        let (history, ctx, _) = editor();
        let before = ctx.read(Clone::clone);

        history
            .execute(TreeCommand::delete(NodeId::new(42)), &ctx, false)
            .unwrap();
        history.undo(&ctx);

        assert_eq!(ctx.read(Clone::clone), before);
    }

    #[test]
    fn test_host_undo_reverts_tree_edit() {
        let (history, ctx, root) = editor();
        let host = Arc::new(MemoryUndoHost::new());
        history.hook(host.clone(), ctx.clone()).unwrap();

        history
            .execute(
                TreeCommand::move_node(root, Position::default(), Position::new(3.0, 4.0)),
                &ctx,
                false,
            )
            .unwrap();
        assert_eq!(host.undo_labels(), vec!["Move Node"]);

        host.perform_undo();
        assert_eq!(
            ctx.read(|t| t.node(root).map(|n| n.position)),
            Some(Position::default())
        );
        assert_eq!(history.redo_commands(), vec!["Move Node"]);
    }
}
