use crate::state::Position;

/// Index of a [`SearchNode`] inside its [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Candidate position reached during one search call.
///
/// Equality compares coordinates only: two nodes for the same cell reached
/// along different paths are the same open/closed-set member.
#[derive(Clone, Copy, Debug)]
pub struct SearchNode {
    position: Position,
    local_risk: f32,
    accumulated_cost: f32,
    parent: Option<NodeId>,
}

impl SearchNode {
    pub fn position(&self) -> Position {
        self.position
    }

    /// Risk of standing on this cell for one tick.
    pub fn local_risk(&self) -> f32 {
        self.local_risk
    }

    /// Sum of local risk from the origin through this node, both inclusive.
    pub fn accumulated_cost(&self) -> f32 {
        self.accumulated_cost
    }

    /// Predecessor on the path; used only for reconstruction.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for SearchNode {}

/// Owns every node created by one search; dropped when the search returns.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds the search origin; its accumulated cost is its own risk.
    pub fn push_origin(&mut self, position: Position, local_risk: f32) -> NodeId {
        self.push(SearchNode {
            position,
            local_risk,
            accumulated_cost: local_risk,
            parent: None,
        })
    }

    /// Adds a successor of `parent`.
    pub fn push_child(&mut self, parent: NodeId, position: Position, local_risk: f32) -> NodeId {
        let accumulated_cost = self[parent].accumulated_cost + local_risk;
        self.push(SearchNode {
            position,
            local_risk,
            accumulated_cost,
            parent: Some(parent),
        })
    }

    fn push(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Positions from the step after the origin up to and including `terminal`.
    pub fn path_to(&self, terminal: NodeId) -> Vec<Position> {
        let mut steps = Vec::new();
        let mut cursor = Some(terminal);
        while let Some(id) = cursor {
            let node = &self[id];
            if node.parent.is_none() {
                break;
            }
            steps.push(node.position);
            cursor = node.parent;
        }
        steps.reverse();
        steps
    }
}

impl std::ops::Index<NodeId> for NodeArena {
    type Output = SearchNode;

    fn index(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }
}
