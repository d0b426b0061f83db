//! Frame timing for the hosts.
//!
//! [`Time`] is the source of the `now_ms` handed to every tick, plus delta
//! and FPS for the viewer's title bar. Pausing freezes elapsed time, so the
//! packet and drift animations resume where they stopped.
//!
//! ```ignore
//! let mut time = Time::new();
//!
//! // once per frame
//! let now_ms = time.update();
//! scheduler.fire(now_ms);
//! window.set_title(&format!("backdrop - {:.0} fps", time.fps()));
//! ```

use std::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    /// Milliseconds since start, minus paused spans.
    elapsed_ms: f64,
    delta_ms: f64,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    pause_elapsed: Duration,
    /// Fixed step in milliseconds for deterministic runs.
    fixed_delta_ms: Option<f64>,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_ms: 0.0,
            delta_ms: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
            fixed_delta_ms: None,
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns elapsed milliseconds.
    pub fn update(&mut self) -> f64 {
        let now = Instant::now();

        if self.paused {
            self.delta_ms = 0.0;
            return self.elapsed_ms;
        }

        let raw_delta = now.duration_since(self.last_frame).as_secs_f64() * 1000.0;
        self.last_frame = now;

        match self.fixed_delta_ms {
            Some(step) => {
                self.delta_ms = step;
                self.elapsed_ms += step;
            }
            None => {
                self.delta_ms = raw_delta;
                let raw_elapsed = now.duration_since(self.start).saturating_sub(self.pause_elapsed);
                self.elapsed_ms = raw_elapsed.as_secs_f64() * 1000.0;
            }
        }

        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed_ms
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    #[inline]
    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, `delta_ms()` is 0 and `elapsed_ms()` stops increasing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Advance by a fixed step per update instead of wall time.
    pub fn set_fixed_delta(&mut self, delta_ms: Option<f64>) {
        self.fixed_delta_ms = delta_ms.filter(|d| d.is_finite() && *d >= 0.0);
    }

    /// Reset the timer to its initial state.
    pub fn reset(&mut self) {
        let fixed = self.fixed_delta_ms;
        *self = Self::new();
        self.fixed_delta_ms = fixed;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert!(!time.is_paused());
        assert_eq!(time.elapsed_ms(), 0.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let elapsed = time.update();

        assert!(elapsed >= 10.0);
        assert!(time.delta_ms() > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_time_pause() {
        let mut time = Time::new();
        time.update();

        time.pause();
        let before = time.elapsed_ms();
        thread::sleep(Duration::from_millis(10));
        time.update();

        assert_eq!(time.elapsed_ms(), before);
        assert_eq!(time.delta_ms(), 0.0);
    }

    #[test]
    fn test_resume_excludes_paused_span() {
        let mut time = Time::new();
        time.pause();
        thread::sleep(Duration::from_millis(30));
        time.resume();
        let elapsed = time.update();
        assert!(elapsed < 30.0, "elapsed {}", elapsed);
    }

    #[test]
    fn test_fixed_delta() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(16.0));
        thread::sleep(Duration::from_millis(50));
        time.update();
        time.update();
        assert_eq!(time.delta_ms(), 16.0);
        assert_eq!(time.elapsed_ms(), 32.0);

        time.reset();
        assert_eq!(time.update(), 16.0);
    }
}
