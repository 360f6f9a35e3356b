use std::collections::VecDeque;

use crate::{
    Action, Orientation, Percepts, Position, knowledge::KnowledgeBase, map::Dimensions,
    planner::plan_route,
};

/// Trait defining the behavior of an agent.
/// Agents decide which action to take from one step's percepts.
pub trait Agent {
    /// Forgets everything from the previous episode. Must be called before the
    /// first decision of every episode.
    fn reset(&mut self);

    /// Determines the next action from the percepts of the current cell.
    /// `reward` is the environment's reward for the previous action.
    fn decide(&mut self, percepts: &Percepts, reward: i32) -> Action;
}

/// What the agent believes about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeState {
    pub position: Position,
    pub orientation: Orientation,
    pub has_gold: bool,
    pub has_arrow: bool,
    pub wumpus_alive: bool,
}

impl Default for EpisodeState {
    fn default() -> Self {
        Self {
            position: Position::HOME,
            orientation: Orientation::East,
            has_gold: false,
            has_arrow: true,
            wumpus_alive: true,
        }
    }
}

impl EpisodeState {
    /// The state the environment should be in after `action`, assuming it succeeds.
    ///
    /// Mirrors the environment's own transition: a forward move off the grid
    /// leaves the position unchanged.
    pub fn predict(self, action: Action, dimensions: &Dimensions) -> Self {
        match action {
            Action::Forward => Self {
                position: dimensions
                    .forward(self.position, self.orientation)
                    .unwrap_or(self.position),
                ..self
            },
            Action::TurnLeft => Self {
                orientation: self.orientation.turn_left(),
                ..self
            },
            Action::TurnRight => Self {
                orientation: self.orientation.turn_right(),
                ..self
            },
            Action::Grab => Self {
                has_gold: true,
                ..self
            },
            Action::Shoot => Self {
                has_arrow: false,
                ..self
            },
            Action::Climb => self,
        }
    }
}

/// A knowledge-based agent: walks only through cells it has proven safe,
/// picks up the gold, and climbs out.
#[derive(Debug, Clone)]
pub struct LogicalAgent {
    dimensions: Dimensions,
    state: EpisodeState,
    knowledge: KnowledgeBase,
    current_plan: VecDeque<Action>, // Remaining actions of the active route
    moved_last_step: bool,
}

impl LogicalAgent {
    /// Creates an agent for a `width` x `height` world. The environment must use
    /// the same dimensions.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "world must be non-empty");
        Self {
            dimensions: Dimensions::new(width, height),
            state: EpisodeState::default(),
            knowledge: KnowledgeBase::new(),
            current_plan: VecDeque::new(),
            moved_last_step: false,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    pub fn orientation(&self) -> Orientation {
        self.state.orientation
    }

    pub fn has_gold(&self) -> bool {
        self.state.has_gold
    }

    pub fn has_arrow(&self) -> bool {
        self.state.has_arrow
    }

    pub fn wumpus_alive(&self) -> bool {
        self.state.wumpus_alive
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn pending_plan(&self) -> &VecDeque<Action> {
        &self.current_plan
    }

    /// Applies the predicted effect of `action` to the believed state and returns it.
    fn execute(&mut self, action: Action) -> Action {
        let next = self.state.predict(action, &self.dimensions);
        self.moved_last_step = action == Action::Forward && next.position != self.state.position;
        self.state = next;
        action
    }

    /// The environment refused the last forward move; step back to where we were.
    fn undo_forward(&mut self) {
        if !self.moved_last_step {
            return;
        }
        if let Some(previous) = self
            .dimensions
            .backward(self.state.position, self.state.orientation)
        {
            self.state.position = previous;
        }
        self.moved_last_step = false;
    }

    /// Plans a route to `goal`. On success the tail of the route becomes the
    /// standing plan and the first action is returned; on failure the standing
    /// plan is left alone.
    fn plan_route_to(&mut self, goal: Position) -> Option<Action> {
        let route = plan_route(
            &self.dimensions,
            self.knowledge.safe(),
            self.state.position,
            self.state.orientation,
            goal,
        )?;
        let mut route = VecDeque::from(route);
        let first = route.pop_front()?;
        self.current_plan = route;
        Some(first)
    }

    /// Nearest safe unvisited cell by manhattan distance. Ties go to the
    /// smallest `(x, y)`.
    fn nearest_frontier_cell(&self) -> Option<Position> {
        let here = self.state.position;
        self.knowledge
            .safe_unvisited()
            .min_by_key(|cell| cell.manhattan_distance(&here))
    }

    /// Turn to face `target` (an orthogonal neighbour), or shoot if already facing it.
    fn shoot_at(&mut self, target: Position) -> Action {
        let here = self.state.position;
        let needed = Orientation::ALL
            .into_iter()
            .find(|orientation| self.dimensions.forward(here, *orientation) == Some(target))
            .unwrap_or(self.state.orientation);

        if self.state.orientation == needed {
            tracing::debug!(?target, "Shooting");
            return self.execute(Action::Shoot);
        }
        let turn = if self.state.orientation.turn_right() == needed {
            Action::TurnRight
        } else {
            Action::TurnLeft
        };
        self.execute(turn)
    }
}

impl Agent for LogicalAgent {
    fn reset(&mut self) {
        self.state = EpisodeState::default();
        self.knowledge = KnowledgeBase::new();
        self.current_plan.clear();
        self.moved_last_step = false;
    }

    #[tracing::instrument(level = "trace", skip(self))]
    fn decide(&mut self, percepts: &Percepts, _reward: i32) -> Action {
        // 1. Bump: the last forward move did not happen
        if percepts.bump {
            self.undo_forward();
        }

        // 2. Scream: the wumpus is gone everywhere
        if percepts.scream {
            self.state.wumpus_alive = false;
            self.knowledge.confirm_wumpus_dead();
        }

        let here = self.state.position;
        self.knowledge.record_visit(here);
        if percepts.stench {
            self.knowledge.record_stench(here);
        }

        // 3. Grab gold immediately
        if percepts.glitter {
            tracing::debug!(position = ?here, "Gold found");
            return self.execute(Action::Grab);
        }

        self.knowledge
            .infer(&self.dimensions, here, percepts.breeze, percepts.stench);

        // 4. Carry the gold home
        if self.state.has_gold {
            if here == Position::HOME {
                tracing::debug!("Climbing out with the gold");
                return self.execute(Action::Climb);
            }
            if let Some(action) = self.plan_route_to(Position::HOME) {
                return self.execute(action);
            }
        }

        // 5. Follow existing plan if available
        if let Some(action) = self.current_plan.pop_front() {
            return self.execute(action);
        }

        // 6. Explore the nearest safe cell we have not stood on
        if let Some(target) = self.nearest_frontier_cell() {
            tracing::debug!(?target, "Exploring");
            if let Some(action) = self.plan_route_to(target) {
                return self.execute(action);
            }
        }

        // 7. Stuck next to the wumpus: shoot into the first unvisited neighbour
        if self.state.wumpus_alive
            && self.state.has_arrow
            && self.knowledge.smelled_stench_at(here)
        {
            let target = self
                .dimensions
                .neighbors(here)
                .find(|cell| !self.knowledge.is_visited(*cell));
            if let Some(target) = target {
                return self.shoot_at(target);
            }
        }

        // 8. Nothing left to do safely, head home
        if here != Position::HOME {
            tracing::debug!("Retreating home");
            if let Some(action) = self.plan_route_to(Position::HOME) {
                return self.execute(action);
            }
        }

        // 9. At home with nothing else to try
        tracing::debug!("Climbing out");
        self.execute(Action::Climb)
    }
}
