use std::time::{Duration, Instant};

/// Frame delta plus a once-per-interval frame rate sample.
pub struct FrameTimer {
    last: Instant,
    pub dt: f32,
    window_start: Instant,
    window_frames: u32,
}

impl FrameTimer {
    const FPS_WINDOW: Duration = Duration::from_secs(2);

    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last: now,
            dt: 0.0,
            window_start: now,
            window_frames: 0,
        }
    }

    /// Advances to the next frame. Returns the average frame rate whenever
    /// a full sampling window has elapsed.
    pub fn tick(&mut self) -> Option<f32> {
        let now = Instant::now();
        self.dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;

        self.window_frames += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed < Self::FPS_WINDOW {
            return None;
        }
        let fps = self.window_frames as f32 / elapsed.as_secs_f32();
        self.window_start = now;
        self.window_frames = 0;
        Some(fps)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
