//! Tests for Fighter: construction, input edges, gating, stagger, locomotion.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bevy::prelude::*;

    use crate::actions::tackle::STATE_DASH_KNOCKBACK;
    use crate::actions::{ActionContext, ActionKind, FighterAction};
    use crate::config::FighterConfig;
    use crate::error::CombatError;
    use crate::fighter::{Fighter, FighterId, StaggerLevel};
    use crate::projectile::Projectiles;
    use crate::simulation::{CombatEvent, SimContext, SimTimers};
    use crate::state::{
        InterruptionSource, MovementAllowance, State, PRIORITY_ACTION, STATE_IDLE, STATE_STAGGER,
    };

    /// Session services without a Simulation around them
    #[derive(Default)]
    struct Session {
        timers: SimTimers,
        projectiles: Projectiles,
        events: Vec<CombatEvent>,
    }

    impl Session {
        fn ctx(&mut self) -> SimContext<'_> {
            SimContext::new(&mut self.timers, &mut self.projectiles, &mut self.events)
        }
    }

    /// Records lifecycle calls; its state forbids other actions.
    #[derive(Debug)]
    struct Probe {
        name: &'static str,
        states: Vec<State>,
        calls: Arc<Mutex<Vec<&'static str>>>,
        working: bool,
    }

    impl Probe {
        fn boxed(name: &'static str, calls: &Arc<Mutex<Vec<&'static str>>>) -> Box<dyn FighterAction> {
            Box::new(Self {
                name,
                states: Vec::new(),
                calls: Arc::clone(calls),
                working: false,
            })
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl FighterAction for Probe {
        fn kind(&self) -> ActionKind {
            ActionKind::Tackle
        }

        fn is_working(&self) -> bool {
            self.working
        }

        fn states(&mut self) -> &[State] {
            if self.states.is_empty() {
                self.states = vec![State::new(
                    self.name,
                    MovementAllowance::new(true, false, true, false),
                    PRIORITY_ACTION,
                    false,
                )];
            }
            &self.states
        }

        fn start(&mut self, ctx: &mut ActionContext<'_>) {
            self.record("start");
            self.working = ctx.request_state(self.name);
        }

        fn continue_action(&mut self, _ctx: &mut ActionContext<'_>) {
            self.record("continue");
        }

        fn end(&mut self, ctx: &mut ActionContext<'_>) {
            self.record("end");
            if self.working {
                ctx.end_state(self.name);
                self.working = false;
            }
        }
    }

    fn calls() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn bare_config() -> FighterConfig {
        FighterConfig::named("probe").with_actions(Vec::new())
    }

    #[test]
    fn test_construction_registers_action_states() {
        let fighter = Fighter::new(FighterId(0), &FighterConfig::default()).unwrap();
        let states = fighter.states();

        for name in ["Dashing", "DashKnockback", "IronTail", "Thunderbolt"] {
            assert!(states.contains(name), "missing {}", name);
        }
        let iron_tail = states.catalog().iter().find(|s| s.name == "IronTail").unwrap();
        assert_eq!(iron_tail.action_number, Some(1));
        assert_eq!(fighter.slot_of(ActionKind::Thunderbolt), Some(2));
        assert_eq!(fighter.state_name(), STATE_IDLE);
    }

    #[test]
    fn test_duplicate_state_across_actions_rejected() {
        let log = calls();
        let result = Fighter::with_actions(
            FighterId(0),
            &bare_config(),
            vec![Probe::boxed("probe", &log), Probe::boxed("probe", &log)],
        );
        assert!(matches!(result, Err(CombatError::DuplicateState(name)) if name == "probe"));
    }

    #[test]
    fn test_action_state_clashing_with_builtin_rejected() {
        let log = calls();
        let result = Fighter::with_actions(FighterId(0), &bare_config(), vec![Probe::boxed(STATE_STAGGER, &log)]);
        assert!(matches!(result, Err(CombatError::DuplicateState(_))));
    }

    #[test]
    fn test_too_many_actions_rejected() {
        let log = calls();
        let actions = ["a", "b", "c", "d"]
            .into_iter()
            .map(|name| Probe::boxed(name, &log))
            .collect();
        let result = Fighter::with_actions(FighterId(0), &bare_config(), actions);
        assert!(matches!(result, Err(CombatError::TooManyActions { max: 3, got: 4 })));
    }

    #[test]
    fn test_input_edges_start_continue_end() {
        let log = calls();
        let mut session = Session::default();
        let mut fighter =
            Fighter::with_actions(FighterId(0), &bare_config(), vec![Probe::boxed("probe", &log)]).unwrap();

        // Rising edge
        assert!(fighter.invoke_action(0));
        fighter.tick(&mut session.ctx(), 0.1);
        assert_eq!(fighter.state_name(), "probe");

        // Held
        assert!(fighter.invoke_action(0));
        fighter.tick(&mut session.ctx(), 0.1);

        // Released
        fighter.tick(&mut session.ctx(), 0.1);
        assert_eq!(fighter.state_name(), STATE_IDLE);

        // Nothing
        fighter.tick(&mut session.ctx(), 0.1);

        assert_eq!(*log.lock().unwrap(), vec!["start", "continue", "end"]);
    }

    #[test]
    fn test_invoke_gated_by_current_state() {
        let log = calls();
        let mut session = Session::default();
        let mut fighter = Fighter::with_actions(
            FighterId(0),
            &bare_config(),
            vec![Probe::boxed("first", &log), Probe::boxed("second", &log)],
        )
        .unwrap();

        assert!(fighter.invoke_action(0));
        fighter.tick(&mut session.ctx(), 0.1);
        assert_eq!(fighter.state_name(), "first");

        // Current state forbids actions, but belongs to slot 0
        assert!(fighter.invoke_action(0));
        assert!(!fighter.invoke_action(1));
        // Empty and out-of-range slots
        assert!(!fighter.invoke_action(2));
        assert!(!fighter.invoke_action(7));
    }

    #[test]
    fn test_start_action_refuses_current_slot() {
        let log = calls();
        let mut session = Session::default();
        let mut fighter =
            Fighter::with_actions(FighterId(0), &bare_config(), vec![Probe::boxed("probe", &log)]).unwrap();

        assert!(fighter.start_action(0, &mut session.ctx()));
        assert_eq!(fighter.state_name(), "probe");
        assert!(!fighter.start_action(0, &mut session.ctx()));
        assert_eq!(*log.lock().unwrap(), vec!["start"]);
    }

    #[test]
    fn test_state_changes_are_reported() {
        let log = calls();
        let mut session = Session::default();
        let mut fighter =
            Fighter::with_actions(FighterId(3), &bare_config(), vec![Probe::boxed("probe", &log)]).unwrap();

        fighter.start_action(0, &mut session.ctx());
        assert!(session.events.contains(&CombatEvent::StateChanged {
            fighter: FighterId(3),
            from: STATE_IDLE.to_string(),
            to: "probe".to_string(),
        }));
    }

    #[test]
    fn test_blown_stagger_arms_timer_and_knocks_back() {
        let mut session = Session::default();
        let mut fighter = Fighter::new(FighterId(0), &bare_config()).unwrap();

        assert!(fighter.stagger(StaggerLevel::Blown, false, Some(Vec3::new(-1.0, 0.0, 0.0)), &mut session.ctx()));
        assert_eq!(fighter.state_name(), STATE_STAGGER);

        let timer = fighter.core().stagger_timer().unwrap();
        assert_eq!(session.timers.remaining(timer), Some(2.7));

        let impulse = fighter.take_impulse();
        assert!((impulse - Vec3::new(5.0, 5.0, 0.0)).length() < 1e-5);
        assert_eq!(fighter.take_impulse(), Vec3::ZERO);
    }

    #[test]
    fn test_repeated_stagger_rearms_timer() {
        let mut session = Session::default();
        let mut fighter = Fighter::new(FighterId(0), &bare_config()).unwrap();

        fighter.stagger(StaggerLevel::Light, false, None, &mut session.ctx());
        let first = fighter.core().stagger_timer().unwrap();
        session.timers.advance(0.5);

        fighter.stagger(StaggerLevel::Heavy, false, None, &mut session.ctx());
        assert_eq!(fighter.core().stagger_timer(), Some(first));
        assert_eq!(session.timers.len(), 1);
        assert_eq!(session.timers.remaining(first), Some(1.7));
        // Стек не растёт на повторном оглушении
        assert_eq!(fighter.states().preempted_depth(), 1);
    }

    #[test]
    fn test_stacked_stagger_merged_into_new_one() {
        let mut session = Session::default();
        let mut fighter = Fighter::new(FighterId(0), &FighterConfig::default()).unwrap();

        // Light stagger (0.7s) ends up under a priority-70 state
        fighter.stagger(StaggerLevel::Light, false, None, &mut session.ctx());
        let first = fighter.core().stagger_timer().unwrap();
        assert!(fighter.request_state(STATE_DASH_KNOCKBACK, InterruptionSource::External, &mut session.ctx()));
        assert_eq!(fighter.states().preempted_depth(), 2);

        // New heavy stagger: same timer, no second stagger entry
        assert!(fighter.stagger(StaggerLevel::Heavy, false, None, &mut session.ctx()));
        assert_eq!(fighter.core().stagger_timer(), Some(first));
        assert_eq!(session.timers.len(), 1);
        assert_eq!(session.timers.remaining(first), Some(1.7));
        assert_eq!(fighter.states().preempted_depth(), 2);

        // Old 0.7s countdown is gone: nothing fires early
        assert!(session.timers.advance(1.0).is_empty());
        assert_eq!(fighter.state_name(), STATE_STAGGER);

        let fired = session.timers.advance(0.8);
        assert_eq!(fired.len(), 1);
        for (id, callback) in fired {
            fighter.on_timer(id, callback, &mut session.ctx());
        }
        assert_eq!(fighter.state_name(), STATE_DASH_KNOCKBACK);
        assert_eq!(fighter.states().preempted_depth(), 1);
        assert!(fighter.core().stagger_timer().is_none());
        assert!(session.timers.is_empty());
    }

    #[test]
    fn test_action_states_registered_once() {
        let fighter = Fighter::new(FighterId(0), &FighterConfig::default()).unwrap();
        let states = fighter.states();

        // idle + stagger + Dashing, DashKnockback, IronTail, Thunderbolt
        assert_eq!(states.catalog().len(), 6);
        assert!(states.ensure_registered(STATE_DASH_KNOCKBACK).is_ok());
        assert!(matches!(
            states.ensure_registered("Surf"),
            Err(CombatError::UnknownState(name)) if name == "Surf"
        ));
    }

    #[test]
    fn test_light_stagger_has_no_knockback() {
        let mut session = Session::default();
        let mut fighter = Fighter::new(FighterId(0), &bare_config()).unwrap();

        fighter.stagger(StaggerLevel::Light, false, Some(Vec3::X), &mut session.ctx());
        assert_eq!(fighter.take_impulse(), Vec3::ZERO);
    }

    #[test]
    fn test_run_gated_by_state() {
        let mut session = Session::default();
        let mut fighter = Fighter::new(FighterId(0), &bare_config()).unwrap();

        assert!(fighter.run(1.0, 0.1));
        assert!((fighter.position().x - 0.5).abs() < 1e-5);

        fighter.stagger(StaggerLevel::Light, false, None, &mut session.ctx());
        assert!(!fighter.run(1.0, 0.1));
        assert!((fighter.position().x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_ran_flag_cleared_at_end_of_tick() {
        let mut fighter = Fighter::new(FighterId(0), &bare_config()).unwrap();
        fighter.run(1.0, 0.1);
        assert!(fighter.body().ran_this_tick);
        fighter.end_tick();
        assert!(!fighter.body().ran_this_tick);
    }

    #[test]
    fn test_turn_limited_by_turning_speed() {
        let mut fighter = Fighter::new(FighterId(0), &bare_config()).unwrap();

        // 360°/s × 0.1s = 36°
        let turned = fighter.turn(90.0, 0.1);
        assert!((turned - 36.0).abs() < 1e-3);
        assert!((fighter.heading() - 36.0).abs() < 1e-3);

        // Shortest way round: 36° → -170° is +154°
        let turned = fighter.turn(-170.0, 1.0);
        assert!((turned - 154.0).abs() < 1e-3);
        assert!((fighter.heading() - (-170.0)).abs() < 1e-3);

        assert_eq!(fighter.turn(-170.0, 1.0), 0.0);
    }

    #[test]
    fn test_turn_and_run_does_not_run_backwards() {
        let mut fighter = Fighter::new(FighterId(0), &bare_config()).unwrap();

        fighter.turn_and_run(1.0, 180.0, 0.1);
        assert!((fighter.heading() - 36.0).abs() < 1e-3);
        assert!(fighter.position().length() < 1e-5);

        // Already facing: full speed
        let mut fighter = Fighter::new(FighterId(1), &bare_config()).unwrap();
        fighter.turn_and_run(1.0, 0.0, 0.1);
        assert!((fighter.position().x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_damage_saturates() {
        let mut session = Session::default();
        let mut fighter = Fighter::new(FighterId(0), &bare_config()).unwrap();

        fighter.take_damage(40, &mut session.ctx());
        assert_eq!(fighter.hp_ratio(), 0.6);
        fighter.take_damage(500, &mut session.ctx());
        assert_eq!(fighter.health().current, 0);
        assert!(!fighter.is_alive());
    }
}
