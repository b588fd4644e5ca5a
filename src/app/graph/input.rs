use eframe::egui::{Key, Pos2, Rect, Response, Ui, Vec2};

use super::interaction::InputEvent;

/// Raw egui input for one frame, in screen coordinates.
#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct FrameInput {
    pub(in crate::app) rect: Rect,
    pub(in crate::app) pointer: Option<Pos2>,
    pub(in crate::app) hovered: bool,
    pub(in crate::app) primary_pressed: bool,
    pub(in crate::app) primary_released: bool,
    pub(in crate::app) scroll: f32,
    pub(in crate::app) pin_key: bool,
    pub(in crate::app) text_focus: bool,
}

impl FrameInput {
    pub(in crate::app) fn capture(ui: &Ui, rect: Rect, response: &Response) -> Self {
        let text_focus = ui.ctx().wants_keyboard_input();
        ui.input(|input| Self {
            rect,
            pointer: input.pointer.latest_pos(),
            hovered: response.hovered(),
            primary_pressed: input.pointer.primary_pressed(),
            primary_released: input.pointer.primary_released(),
            scroll: input.raw_scroll_delta.y,
            pin_key: input.key_pressed(Key::P),
            text_focus,
        })
    }
}

/// Turns per-frame egui state into canvas-local [`InputEvent`]s.
#[derive(Debug, Default)]
pub(in crate::app) struct InputBridge {
    size: Option<Vec2>,
    pointer: Option<Pos2>,
    primary_held: bool,
}

impl InputBridge {
    pub(in crate::app) fn reset(&mut self) {
        self.pointer = None;
        self.primary_held = false;
    }

    pub(in crate::app) fn translate(&mut self, frame: &FrameInput) -> Vec<InputEvent> {
        let mut events = Vec::new();

        let size = frame.rect.size();
        if self.size != Some(size) {
            self.size = Some(size);
            events.push(InputEvent::Resized(size));
        }

        let inside = frame
            .pointer
            .is_some_and(|position| frame.rect.contains(position));
        let local = frame
            .pointer
            .map(|position| (position - frame.rect.min).to_pos2());

        match local {
            Some(position) if inside || self.primary_held => {
                if self.pointer != Some(position) {
                    events.push(InputEvent::PointerMoved(position));
                }
                self.pointer = Some(position);

                if frame.primary_pressed && frame.hovered && !self.primary_held {
                    self.primary_held = true;
                    events.push(InputEvent::PointerPressed(position));
                }
            }
            _ => {
                if self.pointer.take().is_some() && !self.primary_held {
                    events.push(InputEvent::PointerLeft);
                }
            }
        }

        if frame.primary_released && self.primary_held {
            self.primary_held = false;
            match local.or(self.pointer) {
                Some(position) => events.push(InputEvent::PointerReleased(position)),
                None => events.push(InputEvent::PointerLeft),
            }
        }

        if frame.hovered
            && frame.scroll != 0.0
            && let Some(position) = local
        {
            events.push(InputEvent::Wheel {
                position,
                zoom_in: frame.scroll > 0.0,
            });
        }

        if frame.pin_key && !frame.text_focus {
            events.push(InputEvent::TogglePin);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Rect, pos2, vec2};

    use super::super::interaction::InputEvent;
    use super::{FrameInput, InputBridge};

    fn frame() -> FrameInput {
        FrameInput {
            rect: Rect::from_min_size(pos2(100.0, 50.0), vec2(400.0, 300.0)),
            pointer: None,
            hovered: false,
            primary_pressed: false,
            primary_released: false,
            scroll: 0.0,
            pin_key: false,
            text_focus: false,
        }
    }

    fn settled_bridge() -> InputBridge {
        let mut bridge = InputBridge::default();
        bridge.translate(&frame());
        bridge
    }

    #[test]
    fn first_frame_reports_size_once() {
        let mut bridge = InputBridge::default();
        assert_eq!(
            bridge.translate(&frame()),
            vec![InputEvent::Resized(vec2(400.0, 300.0))]
        );
        assert!(bridge.translate(&frame()).is_empty());

        let mut wider = frame();
        wider.rect = Rect::from_min_size(pos2(100.0, 50.0), vec2(500.0, 300.0));
        assert_eq!(
            bridge.translate(&wider),
            vec![InputEvent::Resized(vec2(500.0, 300.0))]
        );
    }

    #[test]
    fn pointer_is_canvas_local() {
        let mut bridge = settled_bridge();
        let mut input = frame();
        input.pointer = Some(pos2(130.0, 90.0));
        input.hovered = true;

        assert_eq!(
            bridge.translate(&input),
            vec![InputEvent::PointerMoved(pos2(30.0, 40.0))]
        );
        assert!(bridge.translate(&input).is_empty());
    }

    #[test]
    fn press_and_release_follow_the_pointer_outside() {
        let mut bridge = settled_bridge();
        let mut press = frame();
        press.pointer = Some(pos2(110.0, 60.0));
        press.hovered = true;
        press.primary_pressed = true;
        assert_eq!(
            bridge.translate(&press),
            vec![
                InputEvent::PointerMoved(pos2(10.0, 10.0)),
                InputEvent::PointerPressed(pos2(10.0, 10.0)),
            ]
        );

        let mut outside = frame();
        outside.pointer = Some(pos2(20.0, 20.0));
        assert_eq!(
            bridge.translate(&outside),
            vec![InputEvent::PointerMoved(pos2(-80.0, -30.0))]
        );

        outside.primary_released = true;
        assert_eq!(
            bridge.translate(&outside),
            vec![InputEvent::PointerReleased(pos2(-80.0, -30.0))]
        );
    }

    #[test]
    fn leaving_the_canvas_is_reported() {
        let mut bridge = settled_bridge();
        let mut inside = frame();
        inside.pointer = Some(pos2(200.0, 200.0));
        bridge.translate(&inside);

        assert_eq!(bridge.translate(&frame()), vec![InputEvent::PointerLeft]);
        assert!(bridge.translate(&frame()).is_empty());
    }

    #[test]
    fn wheel_needs_hover() {
        let mut bridge = settled_bridge();
        let mut input = frame();
        input.pointer = Some(pos2(200.0, 200.0));
        input.scroll = -3.0;
        bridge.translate(&input);
        assert!(bridge.translate(&input).is_empty());

        input.hovered = true;
        assert_eq!(
            bridge.translate(&input),
            vec![InputEvent::Wheel {
                position: pos2(100.0, 150.0),
                zoom_in: false,
            }]
        );
    }

    #[test]
    fn pin_key_is_ignored_while_typing() {
        let mut bridge = settled_bridge();
        let mut input = frame();
        input.pin_key = true;
        input.text_focus = true;
        assert!(bridge.translate(&input).is_empty());

        input.text_focus = false;
        assert_eq!(bridge.translate(&input), vec![InputEvent::TogglePin]);
    }
}
