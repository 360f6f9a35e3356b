use wumpus_core::{
    Action, Position,
    agent::{Agent, LogicalAgent},
    environment::{EpisodeEnd, load_world_from_string},
    episode::run_episode,
};

/// Drives `agent` through `map` by hand, returning every action taken.
fn play(map: &str, max_steps: usize) -> (LogicalAgent, Vec<Action>, Option<EpisodeEnd>) {
    let mut world = load_world_from_string(map).expect("valid map");
    let dims = world.dimensions();
    let mut agent = LogicalAgent::new(dims.width, dims.height);
    agent.reset();
    let mut percepts = world.reset();
    let mut reward = 0;
    let mut actions = Vec::new();
    for _ in 0..max_steps {
        let action = agent.decide(&percepts, reward);
        actions.push(action);
        let outcome = world.step(action);
        percepts = outcome.percepts;
        reward = outcome.reward;
        if outcome.done {
            return (agent, actions, outcome.end);
        }
    }
    (agent, actions, None)
}

#[test]
fn boxed_in_agent_climbs_out_empty_handed() {
    // Both cells next to home are safe, but each of them is next to a pit.
    let map = "
        ST BL PT BL
        BL PT BL BL
        PT BL BL GO
        BL BL BL WU
    ";
    let (agent, actions, end) = play(map, 100);
    assert_eq!(end, Some(EpisodeEnd::EscapedWithoutGold));
    assert_eq!(actions.last(), Some(&Action::Climb));
    assert_eq!(agent.position(), Position::HOME);
    assert!(agent.knowledge().is_visited(Position::new(1, 0)));
    assert!(agent.knowledge().is_visited(Position::new(0, 1)));
    assert!(!agent.knowledge().is_safe(Position::new(2, 0)));
    assert!(!agent.knowledge().is_safe(Position::new(1, 1)));
    assert!(!actions.contains(&Action::Shoot));
}

#[test]
fn warning_at_home_means_immediate_climb() {
    let map = "
        ST PT
        BL BL
    ";
    let (_, actions, end) = play(map, 10);
    assert_eq!(actions, vec![Action::Climb]);
    assert_eq!(end, Some(EpisodeEnd::EscapedWithoutGold));
}

#[test]
fn shoots_the_wumpus_blocking_home_then_wins() {
    let map = "
        ST WU GO BL
        BL BL BL BL
        BL BL BL BL
        BL BL BL BL
    ";
    let (agent, actions, end) = play(map, 200);
    assert_eq!(actions[0], Action::Shoot);
    assert!(!agent.wumpus_alive());
    assert_eq!(end, Some(EpisodeEnd::EscapedWithGold));
    assert_eq!(actions.iter().filter(|a| **a == Action::Grab).count(), 1);
    assert_eq!(actions.last(), Some(&Action::Climb));
}

#[test]
fn collects_reachable_gold() {
    let map = "
        ST BL BL BL
        BL BL BL BL
        BL BL BL GO
        PT BL BL BL
    ";
    let (agent, _, end) = play(map, 200);
    assert_eq!(end, Some(EpisodeEnd::EscapedWithGold));
    assert!(agent.has_gold());
    assert!(agent.knowledge().is_consistent());
}

#[test]
fn gold_behind_a_pit_is_left_behind() {
    let map = "
        ST BL PT GO
        BL BL BL PT
        BL BL BL BL
        BL BL BL BL
    ";
    let (_, _, end) = play(map, 300);
    assert_eq!(end, Some(EpisodeEnd::EscapedWithoutGold));
}

#[test]
fn run_episode_reports_the_win() {
    let mut world = load_world_from_string("ST GO").unwrap();
    let mut agent = LogicalAgent::new(2, 1);
    let result = run_episode(&mut agent, &mut world, 50);
    assert!(result.won);
    assert!(result.alive);
    assert_eq!(result.end, Some(EpisodeEnd::EscapedWithGold));
    // Forward, grab, two turns, forward, climb.
    assert_eq!(result.steps, 6);
    assert_eq!(result.score, 1000 - 6);
}

#[test]
fn agent_can_be_reused_across_episodes() {
    let mut world = load_world_from_string("ST GO").unwrap();
    let mut agent = LogicalAgent::new(2, 1);
    let first = run_episode(&mut agent, &mut world, 50);
    let second = run_episode(&mut agent, &mut world, 50);
    assert_eq!(first, second);
}
