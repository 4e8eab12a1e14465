//! Chapter navigation state and its mirror in the location fragment.
//!
//! The fragment is "#chapter-{index}". User-initiated switches write it;
//! fragment changes coming from outside (back/forward, go-to prompt) are
//! applied without writing it again, so state and fragment cannot ping-pong.

const FRAGMENT_PREFIX: &str = "chapter-";

pub fn chapter_fragment(index: usize) -> String {
    format!("#{}{}", FRAGMENT_PREFIX, index)
}

// "#chapter-3" or "chapter-3" -> 3
pub fn parse_fragment(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let body = raw.strip_prefix('#').unwrap_or(raw);
    let digits = body.strip_prefix(FRAGMENT_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Browser-style session history of location fragments.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl SessionHistory {
    pub fn new(initial: Option<&str>) -> Self {
        let mut history = SessionHistory::default();
        if let Some(fragment) = initial {
            history.push(fragment);
        }
        history
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // Same-fragment writes do not create an entry; forward entries are dropped
    pub fn push(&mut self, fragment: &str) {
        let fragment = normalize(fragment);
        if self.current() == Some(fragment.as_str()) {
            return;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(fragment);
        self.cursor = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<&str> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    pub fn forward(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }
}

fn normalize(fragment: &str) -> String {
    let fragment = fragment.trim();
    if fragment.starts_with('#') {
        fragment.to_string()
    } else {
        format!("#{}", fragment)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Switched { from: usize, to: usize },
}

#[derive(Debug)]
pub struct Navigator {
    current: usize,
    chapter_count: usize,
}

impl Navigator {
    // Startup: a valid fragment wins, anything else starts at chapter 0
    pub fn new(chapter_count: usize, startup_fragment: Option<&str>) -> Self {
        let current = startup_fragment
            .and_then(parse_fragment)
            .filter(|&i| i < chapter_count)
            .unwrap_or(0);
        Navigator { current, chapter_count }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn chapter_count(&self) -> usize {
        self.chapter_count
    }

    /// User picked a chapter: switch and record it in the fragment.
    pub fn select_chapter(&mut self, index: usize, history: &mut SessionHistory) -> Transition {
        let transition = self.switch_to(index);
        if let Transition::Switched { to, .. } = transition {
            history.push(&chapter_fragment(to));
        }
        transition
    }

    /// The fragment changed underneath us: follow it, never write it.
    pub fn fragment_changed(&mut self, raw: &str) -> Transition {
        match parse_fragment(raw) {
            Some(index) => self.switch_to(index),
            None => {
                tracing::debug!("ignoring fragment {:?}", raw);
                Transition::Unchanged
            }
        }
    }

    pub fn next(&mut self, history: &mut SessionHistory) -> Transition {
        self.select_chapter(self.current + 1, history)
    }

    pub fn previous(&mut self, history: &mut SessionHistory) -> Transition {
        match self.current.checked_sub(1) {
            Some(index) => self.select_chapter(index, history),
            None => Transition::Unchanged,
        }
    }

    fn switch_to(&mut self, index: usize) -> Transition {
        if index == self.current {
            return Transition::Unchanged;
        }
        if index >= self.chapter_count {
            tracing::debug!("chapter {} out of range (have {})", index, self.chapter_count);
            return Transition::Unchanged;
        }
        let from = self.current;
        self.current = index;
        Transition::Switched { from, to: index }
    }
}
