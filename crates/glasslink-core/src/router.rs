//! Touch and gesture routing.
//!
//! Raw pointer input arrives in physical view coordinates and leaves as
//! widget callbacks, swipes, long-touch fires or basic touch events in
//! logical coordinates. Per event the router walks a fixed order: pointer
//! resolution, pinch pre-processing, coordinate scaling, long-touch
//! cancellation, out-of-canvas handling, swipe detection, slider capture,
//! button hit-testing, long-touch arming, basic-touch emission, cleanup.
//!
//! Widget hits, swipes and long-touch all claim a gesture exclusively; the
//! per-pointer latches (`suppress_until_up`, `swipe_consumed`) make those
//! claims explicit instead of overloading widget indices.

use glasslink_proto::{HostEvent, TouchAction};
use tracing::info;

use crate::{
    session::{AutorepeatPhase, DisplaySession, MAX_POINTERS},
    timer::{Timer, TimerId},
    Renderer, SessionAction,
};

/// One raw pointer input in physical view coordinates.
///
/// Secondary-pointer downs and ups must be delivered as plain `Down`/`Up`
/// with their slot index; `Move` carries the current position of every
/// active pointer in slot order, because the platform reports movement per
/// gesture, not per pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// A pointer touched down.
    Down {
        /// Pointer slot
        index: usize,
        /// Physical x
        x: f32,
        /// Physical y
        y: f32,
    },
    /// Some pointer moved; positions of all active pointers.
    Move {
        /// Position per active pointer slot
        positions: Vec<(f32, f32)>,
    },
    /// A pointer lifted.
    Up {
        /// Pointer slot
        index: usize,
        /// Physical x
        x: f32,
        /// Physical y
        y: f32,
    },
    /// The platform cancelled the gesture.
    Cancel {
        /// Pointer slot
        index: usize,
        /// Physical x
        x: f32,
        /// Physical y
        y: f32,
    },
}

impl DisplaySession {
    /// Route one raw pointer event.
    pub fn handle_pointer(
        &mut self,
        input: &PointerInput,
        gfx: &mut dyn Renderer,
        timers: &mut dyn Timer,
    ) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        // 1. pointer resolution: find the slot this event is about
        let (action, index, x, y) = match input {
            PointerInput::Down { index, x, y } => (TouchAction::Down, *index, *x, *y),
            PointerInput::Up { index, x, y } => (TouchAction::Up, *index, *x, *y),
            PointerInput::Cancel { index, x, y } => (TouchAction::Cancel, *index, *x, *y),
            PointerInput::Move { positions } => {
                let mut moved = 0;
                for (i, &(px, py)) in positions.iter().take(MAX_POINTERS).enumerate() {
                    let pointer = &self.pointers[i];
                    if (pointer.last_x - px).abs() > f32::EPSILON
                        || (pointer.last_y - py).abs() > f32::EPSILON
                    {
                        moved = i;
                        break;
                    }
                }
                let Some(&(px, py)) = positions.get(moved) else {
                    return actions;
                };
                (TouchAction::Move, moved, px, py)
            }
        };
        if index >= MAX_POINTERS {
            return actions;
        }

        let mut micro_move = false;
        match action {
            TouchAction::Down => {
                let pointer = &mut self.pointers[index];
                pointer.active = true;
                pointer.down_x = x;
                pointer.down_y = y;
                pointer.last_x = x;
                pointer.last_y = y;
            }
            TouchAction::Move => {
                let micro_threshold = self.micro_move_threshold();
                let pointer = &mut self.pointers[index];
                pointer.last_x = x;
                pointer.last_y = y;
                let distance = (pointer.down_x - x).abs().max((pointer.down_y - y).abs());
                // pseudo moves of a resting finger must not cancel
                // long-touch recognition
                if distance < micro_threshold {
                    micro_move = true;
                }
                if pointer.suppress_until_up {
                    return actions;
                }
            }
            TouchAction::Up | TouchAction::Cancel => {
                let pointer = &mut self.pointers[index];
                pointer.last_x = x;
                pointer.last_y = y;
                if pointer.suppress_until_up {
                    self.reset_pointer(index, timers);
                    return actions;
                }
            }
        }

        // 2. pinch pre-processing, only for gestures on empty canvas
        if let PointerInput::Move { positions } = input {
            if positions.len() >= 2 && self.gesture_on_empty_canvas(index) {
                self.process_pinch(positions[0], positions[1], &mut actions);
            }
        }

        // 3. physical to logical coordinates
        let xs = self.to_logical(x);
        let ys = self.to_logical(y);

        // 4. a real move on the armed pointer cancels long-touch
        if self.long_touch_pending && !micro_move && self.long_touch_pointer == index {
            timers.cancel(TimerId::LongTouch);
            self.long_touch_pending = false;
        }

        // 5. outside the canvas only the menu gesture is meaningful
        let (canvas_width, canvas_height) = self.current_canvas_size();
        if x > f32::from(canvas_width) || y > f32::from(canvas_height) {
            if action == TouchAction::Up {
                actions.push(SessionAction::OpenMenu);
            }
            if matches!(action, TouchAction::Up | TouchAction::Cancel) {
                self.reset_pointer(index, timers);
            }
            return actions;
        }

        // 6. swipe detection on up, unless the gesture belongs to a slider
        if action == TouchAction::Up
            && self.pointers[index].on_slider.is_none()
            && !self.pointers[index].swipe_consumed
        {
            self.detect_swipe(index, x, y, &mut actions);
        }

        // 7. sliders capture their gesture on down
        if action == TouchAction::Down {
            if let Some(slider_index) = self.slider_at(xs, ys) {
                self.pointers[index].on_slider = Some(slider_index);
                self.slider_touch(slider_index, xs, ys, gfx, &mut actions);
            }
        } else if action == TouchAction::Move {
            if let Some(slider_index) = self.pointers[index].on_slider {
                self.slider_touch(slider_index, xs, ys, gfx, &mut actions);
            }
        }

        // 8. button hit-testing per trigger mode
        if self.pointers[index].on_slider.is_none() && !self.pointers[index].swipe_consumed {
            let fire_now = (action == TouchAction::Down && !self.use_up_events_for_buttons)
                || (action == TouchAction::Up
                    && self.use_up_events_for_buttons
                    && !self.disable_button_up_once);
            if fire_now {
                let hit = self.press_button_at(xs, ys, false, gfx, timers, &mut actions);
                self.pointers[index].on_button = hit;
                if hit.is_some() && action == TouchAction::Down {
                    // the down already fired; everything until up belongs to
                    // the button
                    self.pointers[index].suppress_until_up = true;
                }
            } else if action == TouchAction::Down {
                // up-triggered mode: record the hit, fire only autorepeat
                let hit = self.press_button_at(xs, ys, true, gfx, timers, &mut actions);
                self.pointers[index].on_button = hit;
            }
        }

        // 9. long-touch arming on empty canvas
        if action == TouchAction::Down
            && self.long_touch_enabled
            && self.pointers[index].on_button.is_none()
            && self.pointers[index].on_slider.is_none()
            && !self.long_touch_pending
            && !self.long_touch_fired
        {
            timers.schedule_once(TimerId::LongTouch, self.long_touch_timeout);
            self.long_touch_pending = true;
            self.long_touch_pointer = index;
        }

        // 10. basic touch events for whatever no widget claimed
        if self.pointers[index].on_button.is_none()
            && self.pointers[index].on_slider.is_none()
            && !self.pointers[index].swipe_consumed
            && self.touch_basic_enable
            && (self.touch_move_enable || action != TouchAction::Move)
        {
            if action == TouchAction::Move {
                // zero moves in logical coordinates are noise at low baud
                if self.pointers[index].last_sent_move != Some((xs, ys)) {
                    self.pointers[index].last_sent_move = Some((xs, ys));
                    actions.push(SessionAction::Emit(HostEvent::Touch {
                        action,
                        x: xs.max(0) as u16,
                        y: ys.max(0) as u16,
                        pointer: index as u8,
                    }));
                }
            } else {
                actions.push(SessionAction::Emit(HostEvent::Touch {
                    action,
                    x: xs.max(0) as u16,
                    y: ys.max(0) as u16,
                    pointer: index as u8,
                }));
            }
        }

        // 11. cleanup
        if matches!(action, TouchAction::Up | TouchAction::Cancel) {
            self.reset_pointer(index, timers);
        }
        actions
    }

    /// Threshold below which a move is treated as sensor noise.
    fn micro_move_threshold(&self) -> f32 {
        f32::from(self.view_width / 100)
    }

    /// Whether the gesture is free for pinch processing (neither the
    /// primary pointer nor the event's pointer started on a widget).
    fn gesture_on_empty_canvas(&self, index: usize) -> bool {
        let primary = &self.pointers[0];
        let own = &self.pointers[index];
        primary.on_button.is_none()
            && primary.on_slider.is_none()
            && own.on_button.is_none()
            && own.on_slider.is_none()
    }

    /// Swipe classification on touch up.
    ///
    /// The displacement threshold is a hundredth of the view width, raised
    /// to a twenty-fifth when the gesture started on a button (so sloppy
    /// taps do not read as swipes). A swipe out of the thin left edge strip
    /// opens the host menu instead of reaching the client.
    fn detect_swipe(&mut self, index: usize, x: f32, y: f32, actions: &mut Vec<SessionAction>) {
        let pointer = self.pointers[index];
        let delta_x = x - pointer.down_x;
        let delta_y = y - pointer.down_y;
        let distance = delta_x.abs().max(delta_y.abs());

        let threshold = if pointer.on_button.is_none() {
            f32::from(self.view_width / 100)
        } else {
            f32::from(self.view_width / 25)
        };
        if distance <= threshold {
            return;
        }

        let scaled_dx = (delta_x / self.scale) as i32;
        let scaled_dy = (delta_y / self.scale) as i32;
        let horizontal = scaled_dx.abs() >= scaled_dy.abs();

        let edge_strip = f32::from(self.view_width / 100);
        let menu_threshold = f32::from(self.view_width / 50);
        if pointer.down_x < edge_strip
            && delta_x > menu_threshold
            && scaled_dx > 5 * scaled_dy.abs()
        {
            info!("swipe from left border, opening menu");
            actions.push(SessionAction::OpenMenu);
        } else {
            actions.push(SessionAction::Emit(HostEvent::Swipe {
                horizontal,
                start_x: self.to_logical(pointer.down_x).max(0) as u16,
                start_y: self.to_logical(pointer.down_y).max(0) as u16,
                delta_x: scaled_dx as i16,
                delta_y: scaled_dy as i16,
            }));
        }
        // the swipe claims the rest of this gesture
        self.pointers[index].swipe_consumed = true;
    }

    /// Two-finger pinch: scale the canvas, damped and snapped to 5% steps.
    fn process_pinch(
        &mut self,
        first: (f32, f32),
        second: (f32, f32),
        actions: &mut Vec<SessionAction>,
    ) {
        let span = (first.0 - second.0).abs().max((first.1 - second.1).abs());
        if let Some(last_span) = self.pinch_distance {
            if last_span > 1.0 && self.touch_scale >= 1.0 {
                // reduce sensitivity, then snap to 5%
                let damped = (span / last_span - 1.0) / 3.0 + 1.0;
                self.touch_scale = (self.touch_scale * damped).clamp(1.0, self.max_scale);
                let snapped = (self.touch_scale * 20.0).round() / 20.0;

                let preserved = self.touch_scale;
                self.set_scale_factor(snapped, true, actions);
                self.touch_scale = preserved;
            }
        }
        self.pinch_distance = Some(span);
    }

    /// Release one pointer's gesture state; releasing the primary pointer
    /// defensively resets every slot and the gesture-global latches.
    pub(crate) fn reset_pointer(&mut self, index: usize, timers: &mut dyn Timer) {
        {
            let pointer = &mut self.pointers[index];
            pointer.active = false;
            pointer.on_button = None;
            pointer.on_slider = None;
            pointer.suppress_until_up = false;
            pointer.swipe_consumed = false;
            pointer.last_sent_move = None;
        }

        if index == 0 {
            for pointer in &mut self.pointers {
                pointer.active = false;
                pointer.on_button = None;
                pointer.on_slider = None;
                pointer.suppress_until_up = false;
                pointer.swipe_consumed = false;
                pointer.last_sent_move = None;
            }
            self.long_touch_fired = false;
            self.disable_button_up_once = false;
            self.pinch_distance = None;
            if self.autorepeat.phase != AutorepeatPhase::Idle {
                self.autorepeat.phase = AutorepeatPhase::Idle;
                timers.cancel(TimerId::Autorepeat);
            }
        }

        if self.long_touch_pending && (self.long_touch_pointer == index || index == 0) {
            timers.cancel(TimerId::LongTouch);
            self.long_touch_pending = false;
        }
    }
}
