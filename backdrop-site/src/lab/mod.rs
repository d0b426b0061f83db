//! Logic behind the interactive lab demos.

pub mod chatbot;
pub mod dataviz;
pub mod habitability;
pub mod password;
pub mod quantum;

/// A lab demo card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Demo {
    pub id: &'static str,
    pub title: &'static str,
    pub tech: &'static [&'static str],
}

/// Demos in page order.
pub const DEMOS: [Demo; 5] = [
    Demo {
        id: "chatbot",
        title: "AI Chatbot Assistant",
        tech: &["NLP", "Rust"],
    },
    Demo {
        id: "password",
        title: "Password Strength Checker",
        tech: &["Cybersecurity", "Client-side"],
    },
    Demo {
        id: "dataviz",
        title: "Data Visualization",
        tech: &["CSV", "JSON", "Analytics"],
    },
    Demo {
        id: "quantum",
        title: "Quantum Circuit Visualizer",
        tech: &["Quantum", "Education"],
    },
    Demo {
        id: "astro",
        title: "Exoplanet Habitability Calculator",
        tech: &["Astrophysics", "Physics"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_ids_unique() {
        let mut ids: Vec<_> = DEMOS.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DEMOS.len());
    }
}
