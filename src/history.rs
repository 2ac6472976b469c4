use std::collections::VecDeque;

/// Submitted lines, oldest first, with a browse cursor.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<String>,
    /// `None` is the fresh position past the newest entry.
    cursor: Option<usize>,
    /// 0 keeps everything.
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            limit,
        }
    }

    /// Blank lines are not recorded. Adding resets the cursor.
    pub fn add(&mut self, line: &str) {
        self.cursor = None;
        if line.trim().is_empty() {
            return;
        }
        self.entries.push_back(line.to_string());
        if self.limit > 0 {
            while self.entries.len() > self.limit {
                self.entries.pop_front();
            }
        }
    }

    /// Step toward older entries. From the fresh position this is the newest;
    /// past the oldest it wraps to the newest.
    pub fn previous(&mut self) -> Option<&str> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let index = match self.cursor {
            None | Some(0) => len - 1,
            Some(i) => i - 1,
        };
        self.cursor = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// Step toward newer entries, wrapping from the newest to the oldest.
    pub fn next(&mut self) -> Option<&str> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let index = match self.cursor {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.cursor = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        if limit > 0 {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
        self.cursor = None;
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}
