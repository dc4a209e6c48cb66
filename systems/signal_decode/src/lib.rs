#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timing-windowed signal decoder for the Beam Maze engine.
//!
//! The decoder turns the raw sensor-mat feed into unambiguous commands.
//! Mats 1–8 form the coordinate track: two activations within the window
//! select a grid cell (earlier press picks the row, later press the
//! column). Mat 9 forms the command track: a lone press fires the beam, a
//! paired press within the window resets player obstacles.
//!
//! The command-track timer is modeled as a stored deadline polled through
//! [`SignalDecoder::handle_tick`] rather than a deferred callback. Whichever
//! of "second press arrives" or "tick reaches the deadline" runs first takes
//! the pending slot, so exactly one command is emitted per press and the
//! cancel-and-check is atomic by construction.

use std::time::Duration;

use beam_maze_core::{CellCoord, Command, GridDimension, MatNumber, RawSignal, Timestamp};

mod buffer;

use buffer::SignalBuffer;

/// Disambiguation window applied by callers that do not override it.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(3_000);

/// Configuration parameters required to construct the decoder.
#[derive(Clone, Copy, Debug)]
pub struct DecoderConfig {
    window: Duration,
    dimension: GridDimension,
    session_start: Timestamp,
}

impl DecoderConfig {
    /// Creates a new configuration from the window, grid dimension and the
    /// session start instant on the feed clock.
    #[must_use]
    pub const fn new(window: Duration, dimension: GridDimension, session_start: Timestamp) -> Self {
        Self {
            window,
            dimension,
            session_start,
        }
    }
}

/// Command-track press awaiting disambiguation.
#[derive(Clone, Copy, Debug)]
struct PendingFire {
    received: Timestamp,
    deadline: Timestamp,
}

impl PendingFire {
    fn armed(received: Timestamp, window: Duration) -> Self {
        Self {
            received,
            deadline: received.saturating_add(window),
        }
    }
}

/// State machine that decodes the raw signal stream into commands.
#[derive(Debug)]
pub struct SignalDecoder {
    window: Duration,
    dimension: GridDimension,
    session_start: Timestamp,
    coordinates: SignalBuffer,
    pending_fire: Option<PendingFire>,
}

impl SignalDecoder {
    /// Creates a new decoder using the supplied configuration.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            window: config.window,
            dimension: config.dimension,
            session_start: config.session_start,
            coordinates: SignalBuffer::new(config.window),
            pending_fire: None,
        }
    }

    /// Consumes one raw feed record, emitting any command it completes.
    ///
    /// Records with a mat outside 1..=9 or a timestamp before the session
    /// start are discarded; backlog replays from at-least-once feeds must
    /// not produce commands.
    pub fn handle_signal(&mut self, mat: u8, timestamp: Timestamp, out: &mut Vec<Command>) {
        let Some(mat) = MatNumber::new(mat) else {
            return;
        };
        if timestamp < self.session_start {
            return;
        }

        if mat.is_command() {
            self.handle_command_signal(timestamp, out);
        } else {
            self.handle_coordinate_signal(mat, timestamp, out);
        }
    }

    /// Polls the command-track deadline against the provided clock reading.
    ///
    /// A pending press whose window elapsed without a second press resolves
    /// to a single fire command.
    pub fn handle_tick(&mut self, now: Timestamp, out: &mut Vec<Command>) {
        if let Some(pending) = self.pending_fire {
            if now >= pending.deadline {
                self.pending_fire = None;
                out.push(Command::FireRay);
            }
        }
    }

    /// Deadline of the outstanding command-track press, if any.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Timestamp> {
        self.pending_fire.map(|pending| pending.deadline)
    }

    fn handle_command_signal(&mut self, timestamp: Timestamp, out: &mut Vec<Command>) {
        match self.pending_fire.take() {
            Some(pending) => {
                // Windowed by timestamp value; a jittered second press that
                // sorts before the first still counts as a pair.
                let within = timestamp
                    .checked_since(pending.received)
                    .map_or(true, |gap| gap <= self.window);
                if within {
                    out.push(Command::ResetPlayerObstacles);
                } else {
                    // The earlier press's window elapsed before any tick ran;
                    // it still owes its fire before the new press is armed.
                    out.push(Command::FireRay);
                    self.pending_fire = Some(PendingFire::armed(timestamp, self.window));
                }
            }
            None => {
                self.pending_fire = Some(PendingFire::armed(timestamp, self.window));
            }
        }
    }

    fn handle_coordinate_signal(&mut self, mat: MatNumber, timestamp: Timestamp, out: &mut Vec<Command>) {
        self.coordinates.prune_stale(timestamp);
        self.coordinates.push(RawSignal { mat, timestamp });

        let Some((first, second)) = self.coordinates.recent_pair() else {
            return;
        };

        let pairable = second
            .timestamp
            .checked_since(first.timestamp)
            .is_some_and(|gap| gap <= self.window);
        if !pairable {
            // Stale or out-of-order pairing; the newest arrival seeds the
            // next attempt.
            self.coordinates.retain_latest();
            return;
        }

        let (Some(row), Some(column)) = (first.mat.coordinate_index(), second.mat.coordinate_index())
        else {
            return;
        };

        let cell = CellCoord::new(column, row);
        if self.dimension.contains(cell) {
            out.push(Command::ToggleCell { cell });
        }
        self.coordinates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder(window_millis: u64, dimension: u32) -> SignalDecoder {
        SignalDecoder::new(DecoderConfig::new(
            Duration::from_millis(window_millis),
            GridDimension::new(dimension),
            Timestamp::from_millis(0),
        ))
    }

    #[test]
    fn lone_command_press_arms_a_deadline() {
        let mut decoder = decoder(3_000, 8);
        let mut out = Vec::new();

        decoder.handle_signal(9, Timestamp::from_millis(1_000), &mut out);

        assert!(out.is_empty());
        assert_eq!(
            decoder.pending_deadline(),
            Some(Timestamp::from_millis(4_000))
        );
    }

    #[test]
    fn tick_before_the_deadline_emits_nothing() {
        let mut decoder = decoder(3_000, 8);
        let mut out = Vec::new();

        decoder.handle_signal(9, Timestamp::from_millis(1_000), &mut out);
        decoder.handle_tick(Timestamp::from_millis(3_999), &mut out);

        assert!(out.is_empty());
        assert!(decoder.pending_deadline().is_some());
    }

    #[test]
    fn invalid_mats_are_discarded() {
        let mut decoder = decoder(3_000, 8);
        let mut out = Vec::new();

        decoder.handle_signal(0, Timestamp::from_millis(100), &mut out);
        decoder.handle_signal(12, Timestamp::from_millis(200), &mut out);

        assert!(out.is_empty());
        assert!(decoder.pending_deadline().is_none());
    }

    #[test]
    fn backlog_records_before_the_session_start_are_discarded() {
        let mut decoder = SignalDecoder::new(DecoderConfig::new(
            Duration::from_millis(3_000),
            GridDimension::new(8),
            Timestamp::from_millis(10_000),
        ));
        let mut out = Vec::new();

        decoder.handle_signal(9, Timestamp::from_millis(9_999), &mut out);
        decoder.handle_signal(3, Timestamp::from_millis(5_000), &mut out);
        decoder.handle_signal(5, Timestamp::from_millis(5_100), &mut out);

        assert!(out.is_empty());
        assert!(decoder.pending_deadline().is_none());
    }
}
