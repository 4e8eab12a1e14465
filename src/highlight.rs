//! Transient paragraph highlight.
//!
//! Each flash schedules its own fade for the paragraph captured at that
//! moment. Fades are never cancelled: when two flashes overlap, the first
//! fade clears the paragraph and the second one finds nothing left to clear.

use std::collections::HashSet;
use std::time::{Duration, Instant};

pub const DEFAULT_HIGHLIGHT: Duration = Duration::from_millis(2000);
pub const MAX_HIGHLIGHT: Duration = Duration::from_secs(60);

struct Fade {
    paragraph_id: String,
    due: Instant,
}

pub struct Highlighter {
    lit: HashSet<String>,
    fades: Vec<Fade>,
    duration: Duration,
}

impl Highlighter {
    pub fn new(duration: Duration) -> Self {
        Highlighter { lit: HashSet::new(), fades: Vec::new(), duration: duration.min(MAX_HIGHLIGHT) }
    }

    pub fn flash(&mut self, paragraph_id: &str, now: Instant) {
        self.lit.insert(paragraph_id.to_string());
        let due = now.checked_add(self.duration).unwrap_or(now);
        self.fades.push(Fade { paragraph_id: paragraph_id.to_string(), due });
    }

    pub fn is_lit(&self, paragraph_id: &str) -> bool {
        self.lit.contains(paragraph_id)
    }

    /// Run every fade that is due. Returns true if anything went dark.
    pub fn expire(&mut self, now: Instant) -> bool {
        let mut changed = false;
        let lit = &mut self.lit;
        self.fades.retain(|fade| {
            if fade.due > now {
                return true;
            }
            changed |= lit.remove(&fade.paragraph_id);
            false
        });
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_after_duration() {
        let start = Instant::now();
        let mut h = Highlighter::new(DEFAULT_HIGHLIGHT);
        h.flash("ch-2-p-1", start);

        assert!(h.is_lit("ch-2-p-1"));
        assert!(!h.expire(start + Duration::from_millis(1999)));
        assert!(h.is_lit("ch-2-p-1"));
        assert!(h.expire(start + Duration::from_millis(2000)));
        assert!(!h.is_lit("ch-2-p-1"));
    }

    #[test]
    fn each_fade_clears_its_own_paragraph() {
        let start = Instant::now();
        let mut h = Highlighter::new(DEFAULT_HIGHLIGHT);
        h.flash("ch-0-p-0", start);
        h.flash("ch-0-p-1", start + Duration::from_millis(500));

        h.expire(start + Duration::from_millis(2100));
        assert!(!h.is_lit("ch-0-p-0"));
        assert!(h.is_lit("ch-0-p-1"));

        h.expire(start + Duration::from_millis(2600));
        assert!(!h.is_lit("ch-0-p-1"));
    }

    #[test]
    fn oversized_duration_is_capped() {
        let start = Instant::now();
        let mut h = Highlighter::new(Duration::MAX);
        h.flash("ch-0-p-0", start);

        assert!(h.is_lit("ch-0-p-0"));
        assert!(!h.expire(start + Duration::from_secs(59)));
        assert!(h.expire(start + MAX_HIGHLIGHT));
    }

    #[test]
    fn overlapping_flashes_are_not_cancelled() {
        let start = Instant::now();
        let mut h = Highlighter::new(DEFAULT_HIGHLIGHT);
        h.flash("ch-1-p-0", start);
        h.flash("ch-1-p-0", start + Duration::from_millis(1000));

        // The first fade still fires on schedule
        assert!(h.expire(start + Duration::from_millis(2000)));
        assert!(!h.is_lit("ch-1-p-0"));
        // The second finds it already dark
        assert!(!h.expire(start + Duration::from_millis(3000)));
    }
}
