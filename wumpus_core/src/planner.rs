use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::{Action, Orientation, Position, map::Dimensions};

/// A search node: where the agent stands and which way it faces.
type State = (Position, Orientation);

/// Breadth-first search over `(position, orientation)` states.
///
/// Turning and stepping forward each cost one action, so the returned sequence
/// is the shortest in action count with turning overhead priced in. Forward
/// moves are only allowed into cells in `safe`. Successors are expanded in the
/// fixed order left, right, forward and the first discovery of a state wins,
/// which makes ties between equally short routes deterministic.
///
/// Returns `None` when `start` already is `goal` or no route exists through
/// `safe` cells.
///
/// # Panics
///
/// Panics if `goal` is outside `dimensions`.
pub fn plan_route(
    dimensions: &Dimensions,
    safe: &BTreeSet<Position>,
    start: Position,
    facing: Orientation,
    goal: Position,
) -> Option<Vec<Action>> {
    assert!(
        dimensions.contains(goal),
        "route goal {goal:?} is outside the {}x{} world",
        dimensions.width,
        dimensions.height
    );

    if start == goal {
        return None;
    }

    let initial: State = (start, facing);
    let mut frontier = VecDeque::from([initial]);
    let mut came_from: HashMap<State, (State, Action)> = HashMap::new();
    // The start maps to itself so it is never rediscovered.
    came_from.insert(initial, (initial, Action::Forward));

    while let Some(current) = frontier.pop_front() {
        let (position, orientation) = current;
        if position == goal {
            let path = reconstruct_path(&came_from, initial, current);
            tracing::trace!(?start, ?goal, steps = path.len(), "Route planned");
            return Some(path);
        }

        let mut successors = vec![
            ((position, orientation.turn_left()), Action::TurnLeft),
            ((position, orientation.turn_right()), Action::TurnRight),
        ];
        if let Some(next) = dimensions.forward(position, orientation) {
            if safe.contains(&next) {
                successors.push(((next, orientation), Action::Forward));
            }
        }

        for (state, action) in successors {
            if !came_from.contains_key(&state) {
                came_from.insert(state, (current, action));
                frontier.push_back(state);
            }
        }
    }

    tracing::trace!(?start, ?goal, "No safe route");
    None
}

fn reconstruct_path(
    came_from: &HashMap<State, (State, Action)>,
    initial: State,
    goal: State,
) -> Vec<Action> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != initial {
        let (previous, action) = came_from[&current];
        path.push(action);
        current = previous;
    }
    path.reverse();
    path
}
