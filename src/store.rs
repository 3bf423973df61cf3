//! Latest-value cache for decoded measurements
//!
//! One [`ChannelSlot`] per measurement kind. A new value always replaces the
//! old one (no queueing) and marks the slot fresh; a consuming read hands the
//! value out once and clears the flag. [`MeasurementStore::snapshot`] looks
//! without touching freshness.
//!
//! The store is not synchronized. Share a sensor across threads only behind
//! your own lock.

use crate::protocol::decoder::{DebugText, Distance, Measurement, Phases};

/// Independent measurement channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    HeartRate,
    BreathRate,
    Distance,
    Phases,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::HeartRate,
        Channel::BreathRate,
        Channel::Distance,
        Channel::Phases,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::HeartRate => "heart_rate",
            Channel::BreathRate => "breath_rate",
            Channel::Distance => "distance",
            Channel::Phases => "phases",
        }
    }
}

/// Latest value of one channel plus its freshness flag
#[derive(Debug, Clone)]
pub struct ChannelSlot<T> {
    value: Option<T>,
    fresh: bool,
}

impl<T: Clone> ChannelSlot<T> {
    pub const fn new() -> Self {
        Self {
            value: None,
            fresh: false,
        }
    }

    /// Store a new value, superseding any unconsumed one
    #[inline]
    pub fn update(&mut self, value: T) {
        self.value = Some(value);
        self.fresh = true;
    }

    /// Return the value if it arrived since the last take, clearing freshness
    #[inline]
    pub fn take(&mut self) -> Option<T> {
        if !self.fresh {
            return None;
        }
        self.fresh = false;
        self.value.clone()
    }

    /// Last value received, fresh or not
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[inline]
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Non-consuming copy of value and freshness
    #[inline]
    pub fn reading(&self) -> Reading<T> {
        Reading {
            value: self.value.clone(),
            fresh: self.fresh,
        }
    }
}

impl<T: Clone> Default for ChannelSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A channel's value and whether it is still unconsumed
#[derive(Debug, Clone, PartialEq)]
pub struct Reading<T> {
    pub value: Option<T>,
    pub fresh: bool,
}

/// Non-consuming view of every channel
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub heart_rate: Reading<f32>,
    pub breath_rate: Reading<f32>,
    pub distance: Reading<Distance>,
    pub phases: Reading<Phases>,
    pub debug_text: Reading<DebugText>,
    /// Frames decoded as `Unknown` so far
    pub unknown_frames: u64,
}

/// Owner of all channel slots
#[derive(Debug, Clone, Default)]
pub struct MeasurementStore {
    heart_rate: ChannelSlot<f32>,
    breath_rate: ChannelSlot<f32>,
    distance: ChannelSlot<Distance>,
    phases: ChannelSlot<Phases>,
    debug_text: ChannelSlot<DebugText>,
    unknown_frames: u64,
    last_unknown: Option<(u16, Vec<u8>)>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a decoded measurement to its slot
    ///
    /// Returns the channel that was updated, if any.
    pub fn apply(&mut self, measurement: Measurement) -> Option<Channel> {
        match measurement {
            Measurement::HeartRate { bpm } => {
                self.heart_rate.update(bpm);
                Some(Channel::HeartRate)
            }
            Measurement::BreathRate { bpm } => {
                self.breath_rate.update(bpm);
                Some(Channel::BreathRate)
            }
            Measurement::Distance(distance) => {
                self.distance.update(distance);
                Some(Channel::Distance)
            }
            Measurement::Phases(phases) => {
                self.phases.update(phases);
                Some(Channel::Phases)
            }
            Measurement::DebugText(text) => {
                self.debug_text.update(text);
                None
            }
            Measurement::Unknown { type_code, payload } => {
                self.unknown_frames += 1;
                self.last_unknown = Some((type_code, payload));
                None
            }
        }
    }

    /// Whether `channel` holds an unconsumed value
    pub fn is_fresh(&self, channel: Channel) -> bool {
        match channel {
            Channel::HeartRate => self.heart_rate.is_fresh(),
            Channel::BreathRate => self.breath_rate.is_fresh(),
            Channel::Distance => self.distance.is_fresh(),
            Channel::Phases => self.phases.is_fresh(),
        }
    }

    // ========================================================================
    // Consuming reads
    // ========================================================================

    pub fn take_heart_rate(&mut self) -> Option<f32> {
        self.heart_rate.take()
    }

    pub fn take_breath_rate(&mut self) -> Option<f32> {
        self.breath_rate.take()
    }

    pub fn take_distance(&mut self) -> Option<Distance> {
        self.distance.take()
    }

    pub fn take_phases(&mut self) -> Option<Phases> {
        self.phases.take()
    }

    pub fn take_debug_text(&mut self) -> Option<DebugText> {
        self.debug_text.take()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            heart_rate: self.heart_rate.reading(),
            breath_rate: self.breath_rate.reading(),
            distance: self.distance.reading(),
            phases: self.phases.reading(),
            debug_text: self.debug_text.reading(),
            unknown_frames: self.unknown_frames,
        }
    }

    #[inline]
    pub fn unknown_frames(&self) -> u64 {
        self.unknown_frames
    }

    /// Type code and payload of the most recent `Unknown` frame
    pub fn last_unknown(&self) -> Option<(u16, &[u8])> {
        self.last_unknown
            .as_ref()
            .map(|(code, payload)| (*code, payload.as_slice()))
    }
}
