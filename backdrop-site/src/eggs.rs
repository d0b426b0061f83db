//! Hidden achievements: key sequences, typed words, repeated clicks and a
//! corner dwell that opens the debug panel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Egg {
    #[serde(rename = "konami")]
    Konami,
    #[serde(rename = "name-click")]
    Persistence,
    #[serde(rename = "quantum")]
    Quantum,
}

impl Egg {
    pub const ALL: [Egg; 3] = [Egg::Konami, Egg::Persistence, Egg::Quantum];

    pub fn name(self) -> &'static str {
        match self {
            Egg::Konami => "Konami Code",
            Egg::Persistence => "Persistence",
            Egg::Quantum => "Quantum",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Egg::Konami => "↑↑↓↓←→←→BA",
            Egg::Persistence => "Click logo 5 times",
            Egg::Quantum => "Type QUANTUM",
        }
    }
}

/// `KeyboardEvent.code` values of the Konami code.
pub const KONAMI: [&str; 10] = [
    "ArrowUp", "ArrowUp", "ArrowDown", "ArrowDown", "ArrowLeft", "ArrowRight", "ArrowLeft",
    "ArrowRight", "KeyB", "KeyA",
];

/// Matches an exact sequence of key codes. Any wrong key starts over.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    sequence: Vec<String>,
    progress: usize,
}

impl SequenceMatcher {
    pub fn new<S: AsRef<str>>(sequence: &[S]) -> Self {
        Self {
            sequence: sequence.iter().map(|s| s.as_ref().to_string()).collect(),
            progress: 0,
        }
    }

    pub fn konami() -> Self {
        Self::new(&KONAMI)
    }

    /// Feed one key code. Returns `true` when the sequence completes.
    pub fn push(&mut self, code: &str) -> bool {
        if self.sequence.get(self.progress).is_some_and(|k| k == code) {
            self.progress += 1;
            if self.progress == self.sequence.len() {
                self.progress = 0;
                return true;
            }
        } else {
            self.progress = 0;
        }
        false
    }

    pub fn progress(&self) -> usize {
        self.progress
    }
}

/// Matches a word typed anywhere on the page, case-insensitively.
#[derive(Debug, Clone)]
pub struct TypedMatcher {
    target: String,
    typed: String,
}

impl TypedMatcher {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_uppercase(),
            typed: String::new(),
        }
    }

    pub fn quantum() -> Self {
        Self::new("QUANTUM")
    }

    /// Feed one `KeyboardEvent.key`. Returns `true` when the word completes.
    pub fn push(&mut self, key: &str) -> bool {
        let next = format!("{}{}", self.typed, key.to_uppercase());
        if !self.target.starts_with(&next) {
            self.typed.clear();
            return false;
        }
        if next == self.target {
            self.typed.clear();
            return true;
        }
        self.typed = next;
        false
    }
}

/// Counts clicks that arrive within `window_ms` of each other.
#[derive(Debug, Clone)]
pub struct ClickCounter {
    needed: u32,
    window_ms: f64,
    count: u32,
    last_ms: Option<f64>,
}

impl ClickCounter {
    pub fn new(needed: u32, window_ms: f64) -> Self {
        Self {
            needed: needed.max(1),
            window_ms,
            count: 0,
            last_ms: None,
        }
    }

    /// Five clicks with at most two seconds between them.
    pub fn logo() -> Self {
        Self::new(5, 2000.0)
    }

    /// Register a click at `now_ms`. Returns `true` on the `needed`-th click.
    pub fn click(&mut self, now_ms: f64) -> bool {
        if self.last_ms.is_some_and(|last| now_ms - last > self.window_ms) {
            self.count = 0;
        }
        self.last_ms = Some(now_ms);
        self.count += 1;
        if self.count >= self.needed {
            self.count = 0;
            return true;
        }
        false
    }
}

/// Opens the debug panel after the pointer rests in the bottom-right corner.
#[derive(Debug, Clone)]
pub struct CornerDwell {
    margin: f32,
    dwell_ms: f64,
    entered_ms: Option<f64>,
    open: bool,
}

impl Default for CornerDwell {
    fn default() -> Self {
        Self {
            margin: 50.0,
            dwell_ms: 3000.0,
            entered_ms: None,
            open: false,
        }
    }
}

impl CornerDwell {
    /// Pointer at `(x, y)` in a `width × height` window. Returns `true` once,
    /// when the panel opens.
    pub fn pointer_at(&mut self, x: f32, y: f32, width: f32, height: f32, now_ms: f64) -> bool {
        let in_corner = x > width - self.margin && y > height - self.margin;
        if !in_corner {
            self.entered_ms = None;
            return false;
        }
        let entered = *self.entered_ms.get_or_insert(now_ms);
        if !self.open && now_ms - entered >= self.dwell_ms {
            self.open = true;
            return true;
        }
        false
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
        self.entered_ms = None;
    }
}

/// Eggs found so far, persisted as a JSON array of ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EggTracker {
    found: Vec<Egg>,
}

impl EggTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from storage. Invalid data starts fresh; unknown ids are dropped.
    pub fn from_json(json: &str) -> Self {
        let ids: Vec<serde_json::Value> = serde_json::from_str(json).unwrap_or_default();
        let mut tracker = Self::new();
        for id in ids {
            if let Ok(egg) = serde_json::from_value::<Egg>(id) {
                tracker.unlock(egg);
            }
        }
        tracker
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.found)
    }

    /// Mark `egg` found. Returns `true` only the first time, when the
    /// notification should show.
    pub fn unlock(&mut self, egg: Egg) -> bool {
        if self.found.contains(&egg) {
            return false;
        }
        self.found.push(egg);
        true
    }

    pub fn is_found(&self, egg: Egg) -> bool {
        self.found.contains(&egg)
    }

    pub fn found(&self) -> &[Egg] {
        &self.found
    }
}
