use super::{Event, State, TransitionTable, ALL_EVENTS, ALL_STATES};

/// Arbiter transition graph derived from a transition table.
///
/// Self-loops are omitted; every pair not listed leaves the state unchanged.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionGraph {
    pub states: Vec<State>,
    pub transitions: Vec<TransitionEdge>,
}

/// Directed transition edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransitionEdge {
    pub start: State,
    pub event: Event,
    pub goal: State,
}

impl TransitionGraph {
    /// Edges leaving `state`.
    pub fn edges_from(&self, state: State) -> impl Iterator<Item = &TransitionEdge> {
        self.transitions.iter().filter(move |edge| edge.start == state)
    }
}

/// Build the transition graph for `table`.
pub fn transition_graph(table: &TransitionTable) -> TransitionGraph {
    let mut transitions = Vec::new();

    for state in ALL_STATES {
        for event in ALL_EVENTS {
            let goal = table.next(state, event);
            if goal != state {
                transitions.push(TransitionEdge {
                    start: state,
                    event,
                    goal,
                });
            }
        }
    }

    TransitionGraph {
        states: ALL_STATES.to_vec(),
        transitions,
    }
}
