use std::collections::BTreeSet;

/// Hands out unique names, suffixing repeats with `_2`, `_3`, ...
#[derive(Debug, Clone, Default)]
pub struct UniqueNames {
    taken: BTreeSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the name to use and whether `base` was already taken.
    pub fn claim(&mut self, base: &str) -> (String, bool) {
        if self.taken.insert(base.to_string()) {
            return (base.to_string(), false);
        }
        let mut counter = 2usize;
        loop {
            let candidate = format!("{base}_{counter}");
            if self.taken.insert(candidate.clone()) {
                return (candidate, true);
            }
            counter += 1;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}
