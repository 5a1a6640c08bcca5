use approx::assert_abs_diff_eq;

use gridvalue::action::Action;
use gridvalue::agent::{Agent, Move};
use gridvalue::config::SimulationConfig;
use gridvalue::grid::{GridWorld, Position};
use gridvalue::movement::{MovementModel, Slip};
use gridvalue::policy::Policy;
use gridvalue::simulation::Simulation;
use gridvalue::solver;
use gridvalue::transition::expected_utility;
use gridvalue::utility::UtilityTable;


fn classic() -> (GridWorld, MovementModel) {
    (GridWorld::classic(-0.04).unwrap(), MovementModel::new(0.8, 0.1, 0.1, 0.0).unwrap())
}

#[test]
fn goal_neighbour_gains_value_first() {
    // Arrange
    let (grid, m) = classic();
    let table = UtilityTable::new(&grid);
    // Assert: nothing learned before the first sweep
    for cell in grid.cells().filter(|c| !c.is_terminal()) {
        assert_eq!(table.value_at(cell.position), 0.0);
    }
    // Act
    let one = solver::step(&table, &grid, &m, 1.0);
    // Assert
    assert!(one.value_at(Position::new(3, 3)) > one.value_at(Position::new(1, 1)));
}

#[test]
fn converged_policy_avoids_pit() {
    // Arrange
    let (grid, m) = classic();
    // Act
    let table = solver::run_to_convergence(&UtilityTable::new(&grid), &grid, &m, 1.0, 1000);
    let policy = Policy::extract(&table, &grid, &m, 1.0);
    // Assert
    assert!(table.has_converged());
    assert_ne!(policy.action_at(Position::new(2, 3)), Some(Action::Right));
}

#[test]
fn sample_selects_intended_or_right_turn() {
    // Arrange: 0.85 lies in [intended + left_turn, 1) for this model
    let (grid, _) = classic();
    let m = MovementModel::new(0.7, 0.1, 0.2, 0.0).unwrap();
    let mut policy = Policy::new(&grid);
    policy.actions[[1, 0]] = Some(Action::Up);
    let agent = Agent::new(Position::new(2, 1), m);
    // Act
    let (up, up_move) = agent.step_with_sample(&policy, &grid, 0.05);
    let (right, right_move) = agent.step_with_sample(&policy, &grid, 0.85);
    // Assert
    assert!(matches!(up_move, Move::Moved { slip: Slip::Intended, .. }));
    assert_eq!(up.position, Position::new(3, 1));
    // Right of (2,1) is the wall, so the right turn stays put.
    assert!(matches!(right_move, Move::Moved { slip: Slip::RightTurn, .. }));
    assert_eq!(right.position, Position::new(2, 1));
}

#[test]
fn reset_after_steps() {
    let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
    for r in [0.1, 0.95, 0.5, 0.3, 0.85, 0.2] {
        sim.step_with_sample(r);
    }
    assert!(sim.snapshot().iteration_count() > 0);

    let snap = sim.reset().unwrap();
    assert_eq!(snap.iteration_count(), 0);
    assert!(snap.policy.is_empty());
    assert_eq!(snap.agent.position, Position::new(1, 1));
    assert!(!snap.agent.at_terminal);
    assert_eq!(snap.agent.step_count, 0);
    for cell in sim.grid().cells().filter(|c| !c.is_terminal()) {
        assert_eq!(snap.utilities.value_at(cell.position), 0.0);
    }
}

#[test]
fn convergence_within_bound() {
    let (grid, m) = classic();
    let mut table = UtilityTable::new(&grid);
    while !table.has_converged() {
        table = solver::step(&table, &grid, &m, 1.0);
        assert!(table.iteration_count() <= 1000);
    }
}

#[test]
fn invariants_hold_every_step() {
    let (grid, m) = classic();
    let mut table = UtilityTable::new(&grid);
    for _ in 0..100 {
        table = solver::step(&table, &grid, &m, 1.0);
        for cell in grid.cells() {
            let u = table.value_at(cell.position);
            if cell.is_wall() {
                assert_eq!(u, 0.0);
            } else if cell.is_terminal() {
                assert_eq!(u, cell.reward);
            } else {
                assert!(u.is_finite());
            }
        }
    }
}

#[test]
fn chosen_action_dominates() {
    let (grid, m) = classic();
    let table = solver::run_to_convergence(&UtilityTable::new(&grid), &grid, &m, 0.9, 1000);
    let policy = Policy::extract(&table, &grid, &m, 0.9);
    for p in grid.positions() {
        let Some(chosen) = policy.action_at(p) else { continue };
        let best = expected_utility(&grid, &m, &table, p, chosen);
        for a in Action::ALL {
            assert!(best + 1e-12 >= expected_utility(&grid, &m, &table, p, a));
        }
    }
}

#[test]
fn positive_step_reward_diverges_without_discount() {
    // With a positive living reward and no discount there is no fixed
    // point: the agent prefers never to finish.
    let grid = GridWorld::classic(0.1).unwrap();
    let m = MovementModel::default();
    let table = solver::run_to_convergence(&UtilityTable::new(&grid), &grid, &m, 1.0, 50);
    assert!(!table.has_converged());
    assert_abs_diff_eq!(table.delta_max(), 0.1, epsilon = 0.01);
}
