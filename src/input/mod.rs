use egui::{Context, Key, Modifiers, PointerButton, Pos2};

mod router;
pub use router::{FrameQueue, Shortcut, route_event, shortcut_for};

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// The position in screen coordinates
    pub position: Pos2,
}

impl From<Pos2> for InputLocation {
    fn from(position: Pos2) -> Self {
        Self { position }
    }
}

/// Represents different types of input events the canvas reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown {
        location: InputLocation,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// Mouse moved (with or without buttons pressed)
    PointerMove { location: InputLocation },
    /// Mouse button was released
    PointerUp {
        location: InputLocation,
        button: PointerButton,
    },
    /// Mouse left the canvas
    PointerLeave { last_known_location: InputLocation },
    DoubleClick { location: InputLocation },
    KeyDown { key: Key, modifiers: Modifiers },
}

/// Handles converting raw egui input into canvas InputEvents
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let modifiers = input.modifiers;

            if let Some(pos) = input.pointer.hover_pos() {
                if Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove { location: pos.into() });
                }
                self.last_pointer_pos = Some(pos);
            } else if let Some(last) = self.last_pointer_pos.take() {
                events.push(InputEvent::PointerLeave {
                    last_known_location: last.into(),
                });
            }

            if let Some(pos) = input.pointer.interact_pos() {
                let button = PointerButton::Primary;
                if input.pointer.button_pressed(button) {
                    events.push(InputEvent::PointerDown {
                        location: pos.into(),
                        button,
                        modifiers,
                    });
                }
                if input.pointer.button_released(button) {
                    events.push(InputEvent::PointerUp {
                        location: pos.into(),
                        button,
                    });
                }
                if input.pointer.button_double_clicked(button) {
                    events.push(InputEvent::DoubleClick { location: pos.into() });
                }
            }

            for event in &input.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } = event
                {
                    events.push(InputEvent::KeyDown {
                        key: *key,
                        modifiers: *modifiers,
                    });
                }
            }
        });

        events
    }
}
