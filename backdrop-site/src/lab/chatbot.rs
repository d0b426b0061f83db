//! Keyword-matching portfolio bot.

/// What a question is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Skills,
    Projects,
    Bio,
    Contact,
    Certifications,
    Fallback,
}

const RULES: [(Topic, &[&str]); 5] = [
    (Topic::Skills, &["skill", "tech", "know"]),
    (Topic::Projects, &["project", "built", "build"]),
    (Topic::Bio, &["yourself", "about you", "who are you"]),
    (Topic::Contact, &["contact", "email", "reach"]),
    (Topic::Certifications, &["cert", "course", "learn"]),
];

pub const GREETING: &str =
    "Hi! I'm the portfolio bot. Ask about skills, projects or background, or try a quick question below.";

pub const EXAMPLE_QUESTIONS: [&str; 3] = [
    "What are your skills?",
    "Tell me about yourself",
    "What projects have you built?",
];

impl Topic {
    pub fn reply(self) -> &'static str {
        match self {
            Topic::Skills => {
                "I work with Rust, TypeScript, Python, SQL and cloud infrastructure, and I'm into security, ML and quantum computing. The Skills section has the full list."
            }
            Topic::Projects => {
                "This portfolio is one of them, and more are in the pipeline. The Work section has what has shipped so far."
            }
            Topic::Bio => {
                "Quantum, space, code and photography. Scroll around to see certifications, projects and what I'm learning."
            }
            Topic::Contact => "Use the Let's Talk button or the contact links up top. Happy to chat!",
            Topic::Certifications => {
                "Certifications from Oracle, Kaggle, Forage and more. The Certifications section links to the verifiable credentials."
            }
            Topic::Fallback => {
                "Good question! For skills, projects or background, try the suggestions above, or just scroll around the site."
            }
        }
    }
}

/// First topic with a keyword contained in the lowercased question.
pub fn classify(input: &str) -> Topic {
    let q = input.trim().to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| q.contains(k)))
        .map_or(Topic::Fallback, |(topic, _)| *topic)
}

pub fn respond(input: &str) -> &'static str {
    classify(input).reply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_questions_are_understood() {
        assert_eq!(classify(EXAMPLE_QUESTIONS[0]), Topic::Skills);
        assert_eq!(classify(EXAMPLE_QUESTIONS[1]), Topic::Bio);
        assert_eq!(classify(EXAMPLE_QUESTIONS[2]), Topic::Projects);
    }

    #[test]
    fn test_rule_order_wins() {
        // "know" is a skills keyword, checked before "learn"
        assert_eq!(classify("I want to KNOW what you learn"), Topic::Skills);
        assert_eq!(classify("how do I reach you by email"), Topic::Contact);
        assert_eq!(classify("any certificates?"), Topic::Certifications);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(classify("hello"), Topic::Fallback);
        assert_eq!(respond(""), Topic::Fallback.reply());
    }
}
