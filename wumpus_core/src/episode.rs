use serde::{Deserialize, Serialize};

use crate::{
    Action,
    agent::Agent,
    environment::{EpisodeEnd, WumpusWorld},
};

/// Summary of a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub score: i32,
    pub steps: usize,
    pub alive: bool,
    pub has_gold: bool,
    pub exited: bool,
    pub won: bool,
    /// `None` when the step budget ran out first.
    pub end: Option<EpisodeEnd>,
}

/// Aggregated statistics over many episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentStats {
    pub episodes: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub deaths: usize,
    pub death_rate: f64,
    pub escapes: usize,
    pub timeouts: usize,
    pub average_score: f64,
    pub average_steps: f64,
}

impl ExperimentStats {
    pub fn from_results(results: &[EpisodeResult]) -> Self {
        let episodes = results.len();
        let count = |predicate: fn(&EpisodeResult) -> bool| {
            results.iter().filter(|result| predicate(result)).count()
        };
        let ratio = |value: f64| {
            if episodes == 0 {
                0.0
            } else {
                value / episodes as f64
            }
        };

        let wins = count(|r| r.won);
        let deaths = count(|r| !r.alive);
        let escapes = count(|r| r.exited && !r.has_gold);
        let timeouts = count(|r| r.end.is_none());
        let total_score: i64 = results.iter().map(|r| i64::from(r.score)).sum();
        let total_steps: usize = results.iter().map(|r| r.steps).sum();

        Self {
            episodes,
            wins,
            win_rate: ratio(wins as f64),
            deaths,
            death_rate: ratio(deaths as f64),
            escapes,
            timeouts,
            average_score: ratio(total_score as f64),
            average_steps: ratio(total_steps as f64),
        }
    }
}

/// Plays one episode: resets both sides, then alternates percept and action
/// until the episode ends or `max_steps` actions have been taken.
pub fn run_episode<A: Agent + ?Sized>(
    agent: &mut A,
    world: &mut WumpusWorld,
    max_steps: usize,
) -> EpisodeResult {
    run_episode_with(agent, world, max_steps, |_, _| {})
}

/// Like [`run_episode`], calling `on_step` with each action and the world it produced.
pub fn run_episode_with<A, F>(
    agent: &mut A,
    world: &mut WumpusWorld,
    max_steps: usize,
    mut on_step: F,
) -> EpisodeResult
where
    A: Agent + ?Sized,
    F: FnMut(Action, &WumpusWorld),
{
    agent.reset();
    let mut percepts = world.reset();
    let mut reward = 0;
    let mut end = None;

    for step in 0..max_steps {
        let action = agent.decide(&percepts, reward);
        let outcome = world.step(action);
        tracing::debug!(step, ?action, reward = outcome.reward, "Step");
        on_step(action, world);
        percepts = outcome.percepts;
        reward = outcome.reward;
        if outcome.done {
            end = outcome.end;
            break;
        }
    }

    let explorer = world.explorer();
    let result = EpisodeResult {
        score: world.score(),
        steps: world.steps(),
        alive: explorer.alive,
        has_gold: explorer.has_gold,
        exited: explorer.exited,
        won: explorer.exited && explorer.has_gold,
        end,
    };
    tracing::info!(
        score = result.score,
        steps = result.steps,
        end = ?result.end,
        "Episode complete"
    );
    result
}

/// Plays `episodes` episodes with the same agent and world, resetting both
/// before each one.
pub fn run_experiments<A: Agent + ?Sized>(
    agent: &mut A,
    world: &mut WumpusWorld,
    episodes: usize,
    max_steps: usize,
) -> ExperimentStats {
    let mut results = Vec::with_capacity(episodes);
    for i in 0..episodes {
        results.push(run_episode(agent, world, max_steps));
        if (i + 1) % 10 == 0 {
            tracing::info!("Completed {}/{} episodes", i + 1, episodes);
        }
    }
    ExperimentStats::from_results(&results)
}
