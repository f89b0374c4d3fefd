//! Exclusivity token for the control interface.
//!
//! # State Transitions
//! ```text
//! FREE --try_acquire--> HELD --guard dropped--> FREE
//! HELD --try_acquire--> (rejected, stays HELD)
//! ```
//!
//! # Design Decisions
//! - Acquisition never waits: it succeeds or fails on one compare-exchange
//! - Release happens in `Drop`, so every exit path gives the token back

use std::sync::atomic::{AtomicU8, Ordering};

/// Token state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Free = 0,
    Held = 1,
}

impl From<u8> for TokenState {
    fn from(val: u8) -> Self {
        match val {
            0 => TokenState::Free,
            _ => TokenState::Held,
        }
    }
}

/// Binary lock limiting the control interface to one command at a time.
#[derive(Debug)]
pub struct ExclusivityToken {
    state: AtomicU8,
}

impl ExclusivityToken {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(TokenState::Free as u8),
        }
    }

    /// Take the token if it is free. Returns `None` immediately if held.
    pub fn try_acquire(&self) -> Option<CommandGuard<'_>> {
        self.state
            .compare_exchange(
                TokenState::Free as u8,
                TokenState::Held as u8,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .ok()
            .map(|_| CommandGuard { token: self })
    }

    pub fn state(&self) -> TokenState {
        TokenState::from(self.state.load(Ordering::Acquire))
    }
}

impl Default for ExclusivityToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that the token is held. Releases it when dropped.
#[derive(Debug)]
#[must_use = "the token is released as soon as the guard is dropped"]
pub struct CommandGuard<'a> {
    token: &'a ExclusivityToken,
}

impl Drop for CommandGuard<'_> {
    fn drop(&mut self) {
        self.token
            .state
            .store(TokenState::Free as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected() {
        let token = ExclusivityToken::new();
        let guard = token.try_acquire();
        assert!(guard.is_some());
        assert_eq!(token.state(), TokenState::Held);
        assert!(token.try_acquire().is_none());

        drop(guard);
        assert_eq!(token.state(), TokenState::Free);
        assert!(token.try_acquire().is_some());
    }

    #[test]
    fn released_on_early_return() {
        fn failing(token: &ExclusivityToken) -> Result<(), &'static str> {
            let _guard = token.try_acquire().ok_or("busy")?;
            Err("command failed")
        }

        let token = ExclusivityToken::new();
        assert_eq!(failing(&token), Err("command failed"));
        assert_eq!(token.state(), TokenState::Free);
    }

    #[test]
    fn exactly_one_winner_under_contention() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::{Arc, Barrier};

        let token = Arc::new(ExclusivityToken::new());
        let winners = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));
        let done = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (token, winners, barrier, done) =
                    (token.clone(), winners.clone(), barrier.clone(), done.clone());
                std::thread::spawn(move || {
                    barrier.wait();
                    let guard = token.try_acquire();
                    if guard.is_some() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                    // Hold until everyone has tried.
                    done.wait();
                    drop(guard);
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(token.state(), TokenState::Free);
    }
}
