//! Tests for StateController.

#[cfg(test)]
mod tests {
    use crate::state::*;

    fn action_state(name: &str) -> State {
        State::new(name, MovementAllowance::STOP, PRIORITY_ACTION, false)
    }

    fn controller_with(states: &[State]) -> StateController {
        let mut controller = StateController::default();
        for state in states {
            assert!(controller.register_state(state.clone()));
        }
        controller
    }

    #[test]
    fn test_starts_idle_with_empty_stack() {
        let controller = StateController::default();
        assert_eq!(controller.current_name(), STATE_IDLE);
        assert_eq!(controller.preempted_depth(), 0);
        assert!(controller.contains(STATE_IDLE));
        assert!(controller.contains(STATE_STAGGER));
    }

    #[test]
    fn test_request_succeeds_iff_priority_not_lower() {
        let low = State::new("low", MovementAllowance::FREE, 10, false);
        let high = State::new("high", MovementAllowance::FREE, 50, false);
        let mut controller = controller_with(&[low, high]);

        assert!(controller.request_state("high"));
        // 50 > 10 → denied, nothing changes
        assert!(!controller.request_state("low"));
        assert_eq!(controller.current_name(), "high");
        assert_eq!(controller.preempted_depth(), 1);
    }

    #[test]
    fn test_equal_priority_last_request_wins() {
        let mut controller = controller_with(&[action_state("a"), action_state("b")]);

        assert!(controller.request_state("a"));
        assert!(controller.request_state("b"));
        assert_eq!(controller.current_name(), "b");
        assert_eq!(controller.preempted_depth(), 2);
    }

    #[test]
    fn test_unknown_state_request_fails() {
        let mut controller = StateController::default();
        assert!(!controller.request_state("nope"));
        assert_eq!(controller.current_name(), STATE_IDLE);
        assert!(controller.ensure_registered("nope").is_err());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut controller = controller_with(&[action_state("a")]);
        let before = controller.catalog().to_vec();

        let mut imposter = action_state("a");
        imposter.priority = PRIORITY_MAX;
        assert!(!controller.register_state(imposter));
        assert_eq!(controller.catalog(), before.as_slice());
    }

    #[test]
    fn test_end_with_continuity_pops_most_recent() {
        let mut controller = controller_with(&[action_state("a"), action_state("b")]);
        controller.request_state("a");
        controller.request_state("b");
        controller.request_state(STATE_STAGGER);
        assert_eq!(controller.preempted_depth(), 3);

        assert!(controller.end_state(STATE_STAGGER));
        assert_eq!(controller.current_name(), "b");
        assert_eq!(controller.preempted_depth(), 2);
    }

    #[test]
    fn test_end_without_continuity_clears_stack() {
        let mut controller = controller_with(&[action_state("a"), action_state("b")]);
        controller.request_state("a");
        controller.request_state("b");
        assert_eq!(controller.preempted_depth(), 2);

        assert!(controller.end_state("b"));
        assert_eq!(controller.current_name(), STATE_IDLE);
        assert_eq!(controller.preempted_depth(), 0);
    }

    #[test]
    fn test_end_continuity_with_empty_stack_goes_idle() {
        let mut controller = StateController::default();
        let resumable = State::new("resumable", MovementAllowance::FREE, PRIORITY_MAX, true);
        controller.register_state(resumable);
        controller.request_state("resumable");
        // idle был запушен: убираем его вручную
        assert!(controller.end_state(STATE_IDLE));
        assert_eq!(controller.preempted_depth(), 0);

        assert!(controller.end_state("resumable"));
        assert_eq!(controller.current_name(), STATE_IDLE);
    }

    #[test]
    fn test_end_of_stacked_state_removes_latest_entry() {
        let mut controller = controller_with(&[action_state("a"), action_state("b")]);
        controller.request_state("a");
        controller.request_state("b");
        controller.request_state("a");
        controller.request_state(STATE_STAGGER);
        // stack: idle, a, b, a
        assert!(controller.end_state("a"));
        assert_eq!(controller.current_name(), STATE_STAGGER);

        let names: Vec<&str> = controller
            .preempted()
            .iter()
            .map(|state| state.name.as_str())
            .collect();
        assert_eq!(names, vec![STATE_IDLE, "a", "b"]);

        assert!(!controller.end_state("missing"));
    }

    #[test]
    fn test_self_request_is_noop() {
        let mut controller = controller_with(&[action_state("a").notifying_interruption()]);
        controller.request_state("a");
        assert_eq!(controller.preempted_depth(), 1);

        assert!(controller.request_state("a"));
        assert_eq!(controller.preempted_depth(), 1);
        assert!(controller.drain_interruptions().is_empty());
    }

    #[test]
    fn test_interruption_recorded_for_notifying_states() {
        let mut dash = action_state("dash").notifying_interruption();
        dash.action_number = Some(1);
        let mut controller = controller_with(&[dash]);

        controller.request_state("dash");
        controller.request_state_with(STATE_STAGGER, InterruptionSource::System);

        let interruptions = controller.drain_interruptions();
        assert_eq!(interruptions.len(), 1);
        assert_eq!(interruptions[0].state, "dash");
        assert_eq!(interruptions[0].action_number, Some(1));
        assert!(interruptions[0].source.is_system());
        assert!(controller.drain_interruptions().is_empty());
    }

    #[test]
    fn test_remove_state() {
        let mut controller = controller_with(&[action_state("a"), action_state("b")]);
        controller.request_state("a");
        controller.request_state("b");

        assert!(!controller.remove_state(STATE_IDLE));
        assert!(!controller.remove_state("b")); // current
        assert!(controller.remove_state("a"));
        assert!(!controller.contains("a"));
        assert!(controller.preempted().iter().all(|state| state.name != "a"));
        assert!(!controller.remove_state("a"));
    }

    #[test]
    fn test_motion_parameters_follow_current_state() {
        let fast = MotionParameters::new(20.0, 45.0);
        let dash = action_state("dash").with_motion_parameters(fast);
        let mut controller = controller_with(&[dash]);

        assert_eq!(controller.motion_parameters_current(), MotionParameters::default());
        controller.request_state("dash");
        assert_eq!(controller.motion_parameters_current(), fast);
        controller.end_state("dash");
        assert_eq!(controller.motion_parameters_current(), MotionParameters::default());
    }

    #[test]
    fn test_dash_stagger_scenario_stack_depths() {
        let mut controller = controller_with(&[
            State::new("Dashing", MovementAllowance::new(true, false, false, false), PRIORITY_ACTION, false)
                .notifying_interruption(),
        ]);

        assert!(controller.request_state("Dashing"));
        assert_eq!(controller.preempted_depth(), 1);

        assert!(controller.request_state(STATE_STAGGER));
        assert_eq!(controller.preempted_depth(), 2);
        let interruptions = controller.drain_interruptions();
        assert_eq!(interruptions.len(), 1);
        assert_eq!(interruptions[0].source, InterruptionSource::External);

        assert!(controller.end_state(STATE_STAGGER));
        assert_eq!(controller.current_name(), "Dashing");
        assert_eq!(controller.preempted_depth(), 1);

        assert!(controller.end_state("Dashing"));
        assert_eq!(controller.current_name(), STATE_IDLE);
        assert_eq!(controller.preempted_depth(), 0);
    }
}
