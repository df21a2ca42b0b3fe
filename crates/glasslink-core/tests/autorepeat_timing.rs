//! Autorepeat schedule tests against the virtual clock.
//!
//! The chain under test: first fire after `first_delay`, then `first_count`
//! fires at `first_rate`, then `second_rate` until release or move-off.

use std::time::Duration;

use glasslink_core::{DisplaySession, PointerInput, SessionAction, SessionConfig, TimerId};
use glasslink_harness::{wire, FixedClock, RecordingRenderer, SimTimers};
use glasslink_proto::{
    opcode::button,
    Decoder, HostEvent, PumpStatus,
};

struct Fixture {
    session: DisplaySession,
    gfx: RecordingRenderer,
    timers: SimTimers,
    clock: FixedClock,
}

impl Fixture {
    /// Session with one drawn autorepeat button covering (0,0)-(100,50),
    /// timed 500/100 x3 then 50.
    fn new() -> Self {
        let mut fixture = Fixture {
            session: DisplaySession::new(SessionConfig::default()),
            gfx: RecordingRenderer::new(),
            timers: SimTimers::new(),
            clock: FixedClock::new(),
        };
        fixture.feed(&wire::set_flags_and_size(0, 320, 240));

        let flags = 0x04; // autorepeat
        let bytes = wire::button_init(0, 0, 0, 100, 50, 0xF800, 8, flags, 0, 0xAB, "hold");
        fixture.feed(&bytes);
        fixture.feed(&wire::button_settings(0, button::set::AUTOREPEAT_TIMING, &[500, 100, 3, 50]));
        fixture.feed(&wire::command(button::DRAW, &[0]));
        fixture
    }

    fn feed(&mut self, bytes: &[u8]) {
        let mut decoder = Decoder::new();
        decoder.extend(bytes);
        loop {
            let (status, _) =
                self.session.pump(&mut decoder, &mut self.gfx, &mut self.timers, &self.clock);
            if status != PumpStatus::MoreReady {
                break;
            }
        }
    }

    fn pointer(&mut self, input: PointerInput) -> Vec<SessionAction> {
        self.session.handle_pointer(&input, &mut self.gfx, &mut self.timers)
    }

    /// Run timer fires up to `until`, returning (virtual millis, callbacks)
    /// per fire.
    fn run_until(&mut self, until: Duration) -> Vec<(u64, usize)> {
        let mut fires = Vec::new();
        while let Some(id) = self.timers.pop_due(until) {
            let actions = self.session.handle_timer(id, &mut self.timers);
            fires.push((self.timers.now().as_millis() as u64, callbacks(&actions)));
        }
        fires
    }
}

fn callbacks(actions: &[SessionAction]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, SessionAction::Emit(HostEvent::ButtonCallback { .. })))
        .count()
}

#[test]
fn hold_produces_the_documented_fire_schedule() {
    let mut fixture = Fixture::new();

    let down = fixture.pointer(PointerInput::Down { index: 0, x: 50.0, y: 25.0 });
    // one immediate callback at touch down
    assert_eq!(callbacks(&down), 1);

    let fires = fixture.run_until(Duration::from_millis(1000));
    let times: Vec<u64> = fires.iter().map(|(at, _)| *at).collect();
    // 500ms delay, three 100ms fires, then 50ms period
    assert_eq!(times, vec![500, 600, 700, 800, 850, 900, 950, 1000]);
    assert!(fires.iter().all(|(_, count)| *count == 1));
}

#[test]
fn release_cancels_the_chain() {
    let mut fixture = Fixture::new();

    fixture.pointer(PointerInput::Down { index: 0, x: 50.0, y: 25.0 });
    let fires = fixture.run_until(Duration::from_millis(600));
    assert_eq!(fires.len(), 2);

    fixture.pointer(PointerInput::Up { index: 0, x: 50.0, y: 25.0 });
    assert!(!fixture.timers.is_pending(TimerId::Autorepeat));
    assert!(fixture.run_until(Duration::from_millis(5000)).is_empty());
}

#[test]
fn moving_off_the_button_stops_the_chain() {
    let mut fixture = Fixture::new();

    fixture.pointer(PointerInput::Down { index: 0, x: 50.0, y: 25.0 });
    // drag well off the button; the down-triggered press suppresses event
    // routing but the position is still tracked
    fixture.pointer(PointerInput::Move { positions: vec![(50.0, 200.0)] });

    let fires = fixture.run_until(Duration::from_millis(2000));
    // the 500ms fire sees the pointer off the button and ends the chain
    assert_eq!(fires, vec![(500, 0)]);
    assert!(!fixture.timers.is_pending(TimerId::Autorepeat));
}

#[test]
fn timing_update_mid_chain_applies_from_the_next_fire() {
    let mut fixture = Fixture::new();

    fixture.pointer(PointerInput::Down { index: 0, x: 50.0, y: 25.0 });
    let fires = fixture.run_until(Duration::from_millis(500));
    assert_eq!(fires.len(), 1);

    // slow the first-phase rate; the already scheduled 600ms fire stays,
    // later fires use the new rate
    fixture.feed(&wire::button_settings(0, button::set::AUTOREPEAT_TIMING, &[500, 200, 3, 50]));
    let fires = fixture.run_until(Duration::from_millis(1000));
    let times: Vec<u64> = fires.iter().map(|(at, _)| *at).collect();
    assert_eq!(times, vec![600, 800, 1000]);
}
