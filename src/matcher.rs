//! Trigger classification for incoming log lines.
//!
//! Pure and stateless per line: a line either produces a [`TriggerEvent`] or
//! nothing, with no state carried between lines. Two conditions must both
//! hold for a confirmed trigger: the optional speaker filter (the line is
//! attributable to a configured bot nick) and a mode pattern that names the
//! configured user nick as the addressed party.

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::config::Mode;

/// One trigger phrase in a mode's table, plus the notification metadata it
/// carries. `{nick}` in the template is replaced with the user's nick,
/// regex-escaped, at matcher construction.
#[derive(Debug)]
pub struct TriggerPattern {
    /// Stable identifier, also the dedup fingerprint component.
    pub id: &'static str,
    template: &'static str,
    /// Notification title.
    pub title: &'static str,
    /// ntfy priority, 1 (min) to 5 (max).
    pub priority: u8,
    /// ntfy tags (comma-separated emoji shortcodes).
    pub tags: &'static str,
}

// Pattern order is priority order: when several patterns match one line, the
// first listed wins.
const RED_PATTERNS: &[TriggerPattern] = &[
    TriggerPattern {
        id: "currently-interviewing",
        template: "Currently interviewing: {nick}",
        title: "Your interview is happening!",
        priority: 5,
        tags: "rotating_light",
    },
    TriggerPattern {
        id: "your-turn",
        template: "{nick}: you're up",
        title: "Your turn to interview",
        priority: 4,
        tags: "warning",
    },
];

const ORP_PATTERNS: &[TriggerPattern] = &[
    TriggerPattern {
        id: "your-turn",
        template: "{nick}: you're up",
        title: "Your turn to interview",
        priority: 5,
        tags: "rotating_light",
    },
    TriggerPattern {
        id: "turn-announcement",
        template: "{nick}, it's your turn",
        title: "Your turn to interview",
        priority: 4,
        tags: "warning",
    },
];

/// The fixed trigger phrase table for a mode, in priority order.
pub fn patterns_for(mode: Mode) -> &'static [TriggerPattern] {
    match mode {
        Mode::Red => RED_PATTERNS,
        Mode::Orp => ORP_PATTERNS,
    }
}

/// A confirmed trigger: the user's turn has arrived.
#[derive(Debug)]
pub struct TriggerEvent {
    /// Mode that produced the match.
    pub mode: Mode,
    /// The pattern that matched (first in priority order).
    pub pattern: &'static TriggerPattern,
    /// Speaker parsed from the `<nick> message` prefix, if present.
    pub speaker: Option<String>,
    /// When the line was classified.
    pub timestamp: DateTime<Utc>,
    /// The raw log line.
    pub line: String,
}

struct CompiledPattern {
    spec: &'static TriggerPattern,
    regex: Regex,
}

/// Classifies log lines against a mode's trigger table.
pub struct TriggerMatcher {
    mode: Mode,
    check_bot_nicks: bool,
    bot_nicks: Vec<String>,
    patterns: Vec<CompiledPattern>,
}

impl TriggerMatcher {
    /// Build a matcher for the given mode and nick.
    ///
    /// # Errors
    ///
    /// Returns `regex::Error` if a compiled pattern is invalid. The
    /// templates are fixed, so this only fires on a pathological nick.
    pub fn new(
        mode: Mode,
        nick: &str,
        check_bot_nicks: bool,
        bot_nicks: &[String],
    ) -> Result<Self, regex::Error> {
        let patterns = patterns_for(mode)
            .iter()
            .map(|spec| {
                let phrase = spec.template.replace("{nick}", nick);
                let regex = Regex::new(&format!("(?i){}", regex::escape(&phrase)))?;
                Ok(CompiledPattern { spec, regex })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            mode,
            check_bot_nicks,
            bot_nicks: bot_nicks.to_vec(),
            patterns,
        })
    }

    /// Classify a single line, returning a [`TriggerEvent`] on a confirmed
    /// trigger and `None` otherwise. No side effects on `None`.
    pub fn classify(&self, line: &str) -> Option<TriggerEvent> {
        let (speaker, body) = match split_speaker(line) {
            Some((speaker, body)) => (Some(speaker), body),
            None => (None, line),
        };

        if self.check_bot_nicks {
            let speaker = speaker?;
            let known = self
                .bot_nicks
                .iter()
                .any(|nick| nick.eq_ignore_ascii_case(speaker));
            if !known {
                return None;
            }
        }

        let pattern = self
            .patterns
            .iter()
            .find(|p| p.regex.is_match(body))?
            .spec;

        Some(TriggerEvent {
            mode: self.mode,
            pattern,
            speaker: speaker.map(str::to_owned),
            timestamp: Utc::now(),
            line: line.to_owned(),
        })
    }
}

/// Parse a `<nick> rest-of-line` speaker prefix.
fn split_speaker(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('<')?;
    let (speaker, body) = rest.split_once("> ")?;
    if speaker.is_empty() || speaker.contains(' ') {
        return None;
    }
    Some((speaker, body))
}
