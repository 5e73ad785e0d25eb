use std::cell::Cell;
use std::rc::Rc;

// Shared flag checked by scheduled callbacks before they touch animator state
#[derive(Clone, Debug)]
pub struct CancellationToken {
    pub id: String,
    is_cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new(id: String) -> Self {
        Self {
            id,
            is_cancelled: Rc::new(Cell::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.is_cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled.get()
    }

    pub fn throw_if_cancelled(&self) -> Result<(), String> {
        if self.is_cancelled() {
            Err(format!("Operation {} was cancelled", self.id))
        } else {
            Ok(())
        }
    }
}

/// Hands out one live token at a time; issuing a new one cancels the previous.
#[derive(Debug)]
pub struct CancellationManager {
    prefix: String,
    issued: u64,
    current: Option<CancellationToken>,
}

impl CancellationManager {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            issued: 0,
            current: None,
        }
    }

    pub fn create_token(&mut self) -> CancellationToken {
        self.cancel_current();
        self.issued += 1;
        let token = CancellationToken::new(format!("{}-{}", self.prefix, self.issued));
        self.current = Some(token.clone());
        token
    }

    pub fn cancel_current(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_cancels_previous() {
        let mut manager = CancellationManager::new("run");
        let first = manager.create_token();
        assert!(!first.is_cancelled());

        let second = manager.create_token();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(second.id, "run-2");
        assert_eq!(
            first.throw_if_cancelled(),
            Err("Operation run-1 was cancelled".to_string())
        );

        manager.cancel_current();
        assert!(second.is_cancelled());
        // Safe with nothing outstanding
        manager.cancel_current();
    }
}
