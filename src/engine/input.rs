use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Scancode;
use sdl2::EventPump;
use std::collections::HashSet;

/// Keyboard and mouse state gathered from one poll of the SDL event queue.
#[derive(Default)]
pub struct InputState {
    held: HashSet<Scancode>,
    pressed: HashSet<Scancode>,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    pub resized: bool,
    pub quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains pending events. Per-frame fields (mouse deltas, presses,
    /// resize) start from zero each call; held keys persist.
    pub fn update(&mut self, event_pump: &mut EventPump) {
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        self.pressed.clear();
        self.resized = false;

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => self.quit = true,
                Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => self.quit = true,
                Event::KeyDown {
                    scancode: Some(sc),
                    repeat,
                    ..
                } => {
                    if !repeat {
                        self.pressed.insert(sc);
                    }
                    self.held.insert(sc);
                }
                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    self.held.remove(&sc);
                }
                Event::MouseMotion { xrel, yrel, .. } => {
                    self.mouse_dx += xrel as f32;
                    self.mouse_dy += yrel as f32;
                }
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => self.resized = true,
                _ => {}
            }
        }
    }

    pub fn is_key_held(&self, sc: Scancode) -> bool {
        self.held.contains(&sc)
    }

    /// True only on the frame the key went down.
    pub fn was_key_pressed(&self, sc: Scancode) -> bool {
        self.pressed.contains(&sc)
    }
}
