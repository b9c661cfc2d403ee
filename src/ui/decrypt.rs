//! "Decrypting" reveal effect for the dashboard hero title.

use futures::Stream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

pub const GLYPHS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?/~`";

/// One more character is revealed every this many ticks.
pub const TICKS_PER_CHAR: usize = 3;

pub const INITIAL_DELAY_MS: u64 = 300;
pub const REPLAY_DELAY_MS: u64 = 100;

#[derive(Debug, Clone)]
pub struct DecryptText {
    target: Vec<char>,
    tick: usize,
    finished: bool,
}

impl DecryptText {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.chars().collect(),
            tick: 0,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Produces the next frame, or `None` once the full text has been shown.
    pub fn next_frame<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.finished {
            return None;
        }

        let frame = self
            .target
            .iter()
            .enumerate()
            .map(|(index, &c)| {
                if c == ' ' {
                    ' '
                } else if index * TICKS_PER_CHAR < self.tick {
                    c
                } else {
                    GLYPHS[rng.gen_range(0..GLYPHS.len())] as char
                }
            })
            .collect();

        if self.tick >= self.target.len() * TICKS_PER_CHAR {
            self.finished = true;
        }
        self.tick += 1;

        Some(frame)
    }
}

/// Frames of the animation paced by `tick`, starting after `delay`.
pub fn frames(target: &str, delay: Duration, tick: Duration) -> impl Stream<Item = String> + Send {
    let state = (DecryptText::new(target), StdRng::from_entropy(), Some(delay));

    futures::stream::unfold(state, move |(mut text, mut rng, pending_delay)| async move {
        let wait = pending_delay.unwrap_or(tick);
        tokio::time::sleep(wait).await;
        let frame = text.next_frame(&mut rng)?;
        Some((frame, (text, rng, None)))
    })
}
