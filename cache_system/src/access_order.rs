use std::collections::VecDeque;

/// Keys ordered by last access, oldest first.
///
/// The head is the eviction candidate. Every touch moves a key to the tail.
#[derive(Debug, Clone, Default)]
pub struct AccessOrder {
    keys: VecDeque<String>,
}

impl AccessOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `key` to the tail, inserting it if absent
    pub fn touch(&mut self, key: &str) {
        if let Some(pos) = self.position(key) {
            if pos + 1 == self.keys.len() {
                return;
            }
            if let Some(existing) = self.keys.remove(pos) {
                self.keys.push_back(existing);
            }
        } else {
            self.keys.push_back(key.to_string());
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(pos) => self.keys.remove(pos).is_some(),
            None => false,
        }
    }

    /// Least recently accessed key
    pub fn head(&self) -> Option<&str> {
        self.keys.front().map(String::as_str)
    }

    pub fn pop_head(&mut self) -> Option<String> {
        self.keys.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.keys.retain(|k| keep(k));
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        // Tail first: the most recently touched keys are the likeliest to be touched again
        self.keys.iter().rposition(|k| k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_of(order: &AccessOrder) -> Vec<&str> {
        order.iter().collect()
    }

    #[test]
    fn test_touch_moves_to_tail() {
        let mut order = AccessOrder::new();
        order.touch("a");
        order.touch("b");
        order.touch("c");
        order.touch("a");

        assert_eq!(order_of(&order), vec!["b", "c", "a"]);
        assert_eq!(order.head(), Some("b"));
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_remove_and_pop() {
        let mut order = AccessOrder::new();
        order.touch("a");
        order.touch("b");

        assert!(order.remove("a"));
        assert!(!order.remove("a"));
        assert_eq!(order.pop_head().as_deref(), Some("b"));
        assert!(order.is_empty());
    }
}
