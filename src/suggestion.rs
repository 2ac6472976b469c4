//! Prefix completion over command names with cyclable candidates.

/// Candidates for the current input and the cursor into them.
#[derive(Debug, Clone, Default)]
pub struct Suggestions {
    input: String,
    candidates: Vec<String>,
    index: usize,
}

impl Suggestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute candidates for `input` from `names` (catalog order). The
    /// cursor resets when the input changes.
    pub fn update<'a, I>(&mut self, input: &str, names: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let prefix = input.trim_start().to_lowercase();
        let candidates: Vec<String> = if prefix.is_empty() || prefix.contains(' ') {
            Vec::new()
        } else {
            let mut out: Vec<String> = Vec::new();
            for name in names {
                if name.to_lowercase().starts_with(&prefix)
                    && !out.iter().any(|n| n.eq_ignore_ascii_case(name))
                {
                    out.push(name.to_string());
                }
            }
            out
        };
        if input != self.input || candidates != self.candidates {
            self.index = 0;
        }
        self.input = input.to_string();
        self.candidates = candidates;
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The full name of the current candidate.
    pub fn completion(&self) -> Option<&str> {
        self.candidates.get(self.index).map(String::as_str)
    }

    /// What the current candidate adds after the typed prefix.
    pub fn ghost_suffix(&self) -> Option<&str> {
        let typed = self.input.trim_start().len();
        self.completion().and_then(|c| c.get(typed..))
    }

    pub fn next(&mut self) -> Option<&str> {
        if self.candidates.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.candidates.len();
        self.completion()
    }

    pub fn previous(&mut self) -> Option<&str> {
        if self.candidates.is_empty() {
            return None;
        }
        self.index = self
            .index
            .checked_sub(1)
            .unwrap_or(self.candidates.len() - 1);
        self.completion()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const NAMES: [&str; 5] = ["SetSpeed", "SetHealth", "Spawn", "setspeed", "Help"];

    #[test]
    fn prefix_matches_ignore_case_and_dedupe() {
        let mut s = Suggestions::new();
        s.update("set", NAMES);
        assert_eq!(s.candidates(), ["SetSpeed", "SetHealth"]);
        assert_eq!(s.completion(), Some("SetSpeed"));
        assert_eq!(s.ghost_suffix(), Some("Speed"));
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let mut s = Suggestions::new();
        s.update("s", NAMES);
        assert_eq!(s.candidates().len(), 3);
        assert_eq!(s.previous(), Some("Spawn"));
        assert_eq!(s.next(), Some("SetSpeed"));
        assert_eq!(s.next(), Some("SetHealth"));
        assert_eq!(s.next(), Some("Spawn"));
        assert_eq!(s.next(), Some("SetSpeed"));
    }

    #[test]
    fn changing_input_resets_cursor() {
        let mut s = Suggestions::new();
        s.update("se", NAMES);
        s.next();
        assert_eq!(s.completion(), Some("SetHealth"));
        s.update("set", NAMES);
        assert_eq!(s.completion(), Some("SetSpeed"));
    }

    #[test]
    fn same_input_keeps_cursor() {
        let mut s = Suggestions::new();
        s.update("set", NAMES);
        s.next();
        s.update("set", NAMES);
        assert_eq!(s.completion(), Some("SetHealth"));
    }

    #[test]
    fn no_candidates_is_none() {
        let mut s = Suggestions::new();
        s.update("zz", NAMES);
        assert!(s.is_empty());
        assert_eq!(s.completion(), None);
        assert_eq!(s.next(), None);
        assert_eq!(s.previous(), None);

        s.update("", NAMES);
        assert!(s.is_empty());
        s.update("SetSpeed 4", NAMES);
        assert!(s.is_empty());
    }
}
