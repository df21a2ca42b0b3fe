//! End-to-end command tests: wire bytes through the production decoder
//! into the session, assertions against the recording renderer and the
//! returned actions.

use glasslink_core::{
    DisplaySession, PointerInput, SessionAction, SessionConfig,
};
use glasslink_harness::{wire, DrawOp, FixedClock, RecordingRenderer, SimTimers};
use glasslink_proto::{
    color,
    opcode::{button, cmd, global, slider},
    Decoder, HostEvent, PumpStatus,
};

fn feed(
    session: &mut DisplaySession,
    gfx: &mut RecordingRenderer,
    timers: &mut SimTimers,
    clock: &FixedClock,
    bytes: &[u8],
) -> Vec<SessionAction> {
    let mut decoder = Decoder::new();
    decoder.extend(bytes);
    let mut actions = Vec::new();
    loop {
        let (status, mut pass) = session.pump(&mut decoder, gfx, timers, clock);
        actions.append(&mut pass);
        if status != PumpStatus::MoreReady {
            break;
        }
    }
    actions
}

fn new_session() -> (DisplaySession, RecordingRenderer, SimTimers, FixedClock) {
    let mut session = DisplaySession::new(SessionConfig::default());
    let mut gfx = RecordingRenderer::new();
    let mut timers = SimTimers::new();
    let clock = FixedClock::new();
    // scale 1, canvas 320x240
    feed(&mut session, &mut gfx, &mut timers, &clock, &wire::set_flags_and_size(0, 320, 240));
    gfx.clear_log();
    (session, gfx, timers, clock)
}

fn emitted(actions: &[SessionAction]) -> Vec<&HostEvent> {
    actions
        .iter()
        .filter_map(|action| match action {
            SessionAction::Emit(event) => Some(event),
            _ => None,
        })
        .collect()
}

#[test]
fn legacy_and_current_init_shapes_create_the_same_button() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let legacy = wire::button_init_legacy(0, 10, 20, 100, 40, 0xF800, 16, 0, 7, 0x2222, "Old");
    let current = wire::button_init(1, 10, 20, 100, 40, 0xF800, 16, 0, 7, 0x2222, "Old");
    feed(&mut session, &mut gfx, &mut timers, &clock, &legacy);
    feed(&mut session, &mut gfx, &mut timers, &clock, &current);

    let old = session.button(0).expect("legacy button");
    let new = session.button(1).expect("current button");
    assert_eq!(old.position(), new.position());
    assert_eq!(old.size(), new.size());
    assert_eq!(old.value(), new.value());
    assert_eq!(old.callback(), new.callback());
    assert_eq!(old.caption_lines(), new.caption_lines());
}

#[test]
fn init_with_32_bit_callback_keeps_the_high_half() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let bytes = wire::button_init(0, 0, 0, 50, 20, 0xF800, 8, 0, 0, 0xDEAD_BEEF, "cb");
    feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
    assert_eq!(session.button(0).expect("button").callback(), 0xDEAD_BEEF);
}

#[test]
fn multiline_caption_splits_and_centers() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    // fill slots 0..=4 so the target lands at its requested index
    for i in 0..5u16 {
        let bytes = wire::button_init(i, 0, 0, 30, 20, 0xF800, 8, 0, 0, 1, "x");
        feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
    }
    let bytes = wire::button_init(5, 20, 40, 100, 60, 0xF800, 16, 0, 0, 1, "Hi\nThere");
    feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);

    let target = session.button(5).expect("button 5");
    assert_eq!(target.caption_lines(), &["Hi".to_string(), "There".to_string()]);
    // two 16px lines in a 60px box: y = 40 + (60 - 32)/2 + ascend(16)
    let (x, y) = target.caption_position();
    assert_eq!(x, None);
    assert_eq!(y, 40 + 14 + glasslink_core::text::ascend(16));
}

#[test]
fn red_green_button_follows_set_value() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let flags = 0x02; // red/green toggle
    let bytes = wire::button_init(0, 0, 0, 60, 30, 0xF800, 8, flags, 0, 1, "T");
    feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
    assert_eq!(session.button(0).expect("button").color(), color::RED);
    assert_eq!(session.button(0).expect("button").value(), 0);

    feed(
        &mut session,
        &mut gfx,
        &mut timers,
        &clock,
        &wire::button_settings(0, button::set::VALUE_AND_DRAW, &[5]),
    );
    assert_eq!(session.button(0).expect("button").value(), 1); // normalized
    assert_eq!(session.button(0).expect("button").color(), color::GREEN);

    feed(
        &mut session,
        &mut gfx,
        &mut timers,
        &clock,
        &wire::button_settings(0, button::set::VALUE_AND_DRAW, &[0]),
    );
    assert_eq!(session.button(0).expect("button").value(), 0);
    assert_eq!(session.button(0).expect("button").color(), color::RED);
}

#[test]
fn deactivate_all_suppresses_hit_testing() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    for i in 0..3u16 {
        let bytes =
            wire::button_init(i, i * 100, 0, 90, 50, 0xF800, 8, 0, 0, 0x100 + u32::from(i), "b");
        feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
        feed(&mut session, &mut gfx, &mut timers, &clock, &wire::command(button::DRAW, &[i]));
    }

    let press = |session: &mut DisplaySession,
                 gfx: &mut RecordingRenderer,
                 timers: &mut SimTimers| {
        let down =
            session.handle_pointer(&PointerInput::Down { index: 0, x: 150.0, y: 25.0 }, gfx, timers);
        let up =
            session.handle_pointer(&PointerInput::Up { index: 0, x: 150.0, y: 25.0 }, gfx, timers);
        let mut all = down;
        all.extend(up);
        all
    };

    let actions = press(&mut session, &mut gfx, &mut timers);
    assert!(emitted(&actions)
        .iter()
        .any(|e| matches!(e, HostEvent::ButtonCallback { index: 1, callback: 0x101, .. })));

    feed(&mut session, &mut gfx, &mut timers, &clock, &wire::command(button::DEACTIVATE_ALL, &[]));
    let actions = press(&mut session, &mut gfx, &mut timers);
    assert!(!emitted(&actions).iter().any(|e| matches!(e, HostEvent::ButtonCallback { .. })));

    feed(&mut session, &mut gfx, &mut timers, &clock, &wire::command(button::ACTIVATE_ALL, &[]));
    let actions = press(&mut session, &mut gfx, &mut timers);
    assert!(emitted(&actions)
        .iter()
        .any(|e| matches!(e, HostEvent::ButtonCallback { index: 1, .. })));
}

#[test]
fn autorepeat_timing_on_plain_button_is_refused_but_harmless() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let bytes = wire::button_init(0, 0, 0, 100, 50, 0xF800, 8, 0, 0, 0x42, "b");
    feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
    feed(&mut session, &mut gfx, &mut timers, &clock, &wire::command(button::DRAW, &[0]));

    // refused with a warning; the stream and the button keep working
    feed(
        &mut session,
        &mut gfx,
        &mut timers,
        &clock,
        &wire::button_settings(0, button::set::AUTOREPEAT_TIMING, &[500, 100, 3, 50]),
    );

    let actions =
        session.handle_pointer(&PointerInput::Down { index: 0, x: 50.0, y: 25.0 }, &mut gfx, &mut timers);
    assert!(emitted(&actions)
        .iter()
        .any(|e| matches!(e, HostEvent::ButtonCallback { callback: 0x42, .. })));
}

#[test]
fn bad_widget_index_does_not_halt_the_interpreter() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let mut bytes = wire::command(button::DRAW, &[7]); // nothing created yet
    bytes.extend(wire::command(cmd::CLEAR_DISPLAY, &[0xFFFF]));
    feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);

    assert!(gfx.ops.iter().any(|op| matches!(op, DrawOp::Clear { color: color::WHITE })));
}

#[test]
fn unknown_opcodes_are_ignored() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let mut bytes = wire::command(0x3E, &[1, 2, 3]); // unassigned display slot
    bytes.extend(wire::command(0x9A, &[])); // outside every range
    bytes.extend(wire::command(cmd::CLEAR_DISPLAY, &[0x0000]));
    feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);

    assert!(gfx.ops.iter().any(|op| matches!(op, DrawOp::Clear { color: color::BLACK })));
}

#[test]
fn reset_all_destroys_the_store() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    for i in 0..4u16 {
        let bytes = wire::button_init(i, 0, 0, 30, 20, 0xF800, 8, 0, 0, 1, "x");
        feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
    }
    assert_eq!(session.button_count(), 4);

    let actions = feed(
        &mut session,
        &mut gfx,
        &mut timers,
        &clock,
        &wire::set_flags_and_size(global::flags::RESET_ALL, 320, 240),
    );
    assert_eq!(session.button_count(), 0);
    assert!(actions.iter().any(|a| matches!(a, SessionAction::DisableSensors)));
}

#[test]
fn oversize_geometry_is_clamped_not_rejected() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let bytes = wire::button_init(0, 300, 200, 100, 100, 0xF800, 8, 0, 0, 1, "c");
    feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
    assert_eq!(session.button(0).expect("button").size(), (20, 40));
}

#[test]
fn get_info_answers_local_time_with_offset() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let actions =
        feed(&mut session, &mut gfx, &mut timers, &clock, &wire::command(cmd::GET_INFO, &[0, 0x1234]));
    let events = emitted(&actions);
    assert_eq!(events.len(), 1);
    match events[0] {
        HostEvent::InfoResult { subfunction, callback, timestamp, utc_offset_millis, .. } => {
            assert_eq!(*subfunction, 0);
            assert_eq!(*callback, 0x1234);
            assert_eq!(*utc_offset_millis, 3_600_000);
            assert_eq!(*timestamp, 1_700_000_000 + 3_600);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn request_max_canvas_size_reports_the_view() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let actions = feed(
        &mut session,
        &mut gfx,
        &mut timers,
        &clock,
        &wire::command(cmd::REQUEST_MAX_CANVAS_SIZE, &[]),
    );
    assert!(emitted(&actions)
        .iter()
        .any(|e| matches!(e, HostEvent::CanvasSize { width: 640, height: 480, .. })));
}

#[test]
fn slider_value_settings_clamp_to_the_bar() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let bytes = wire::slider_init(0, 100, 50, 16, 120, 60, 30, 0x0000, 0x07E0, 0x01, 0x900);
    feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
    assert_eq!(session.slider(0).expect("slider").value(), 30);

    feed(
        &mut session,
        &mut gfx,
        &mut timers,
        &clock,
        &wire::command(slider::SETTINGS, &[0, slider::set::VALUE_AND_DRAW, 500]),
    );
    assert_eq!(session.slider(0).expect("slider").value(), 120);
    assert!(gfx.ops.iter().any(|op| matches!(op, DrawOp::FillRect { .. })));
}

#[test]
fn get_number_with_prompt_requests_input() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let bytes = wire::command_with_text(cmd::GET_NUMBER_WITH_SHORT_PROMPT, &[0x4242], "Voltage");
    let actions = feed(&mut session, &mut gfx, &mut timers, &clock, &bytes);
    assert!(actions.iter().any(|a| matches!(
        a,
        SessionAction::RequestInput { callback: 0x4242, prompt, .. } if prompt == "Voltage"
    )));
}

#[test]
fn draw_string_reuses_the_previous_style_at_short_arity() {
    let (mut session, mut gfx, mut timers, clock) = new_session();

    let full = wire::command_with_text(cmd::DRAW_STRING, &[10, 30, 16, 0x0000, 0xFFFF], "first");
    feed(&mut session, &mut gfx, &mut timers, &clock, &full);
    let short = wire::command_with_text(cmd::DRAW_STRING, &[10, 60], "second");
    feed(&mut session, &mut gfx, &mut timers, &clock, &short);

    let texts: Vec<_> = gfx
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, size, background, .. } => Some((text.as_str(), *size, *background)),
            _ => None,
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            ("first", 16, Some(color::WHITE)),
            ("second", 16, Some(color::WHITE)),
        ]
    );
}
