use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::animation::ease::Easing;
use crate::foundation::core::{ChannelKey, DescriptorId, GroupId, Priority, round_time};
use crate::foundation::error::{SyncError, SyncResult};
use crate::value::ValueKind;

/// Visibility of a descriptor's values outside its active interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FillMode(u8);

impl FillMode {
    /// No fill: the channel reverts once the descriptor ends.
    pub const NONE: Self = Self(0);
    /// First value visible before `delay`.
    pub const BACKWARDS: Self = Self(1);
    /// Last value visible after the end until a higher-priority descriptor becomes active.
    pub const FORWARDS: Self = Self(1 << 1);
    /// Last value visible after the end, unconditionally.
    pub const FREEZE: Self = Self(1 << 2);

    /// Whether every flag of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the final value outlives the active interval.
    pub fn persists(self) -> bool {
        self.contains(Self::FORWARDS) || self.contains(Self::FREEZE)
    }

    /// Whether the fill is FREEZE.
    pub fn is_freeze(self) -> bool {
        self.contains(Self::FREEZE)
    }

    /// Whether the first value shows before the start.
    pub fn is_backwards(self) -> bool {
        self.contains(Self::BACKWARDS)
    }

    fn flag_names(self) -> Vec<&'static str> {
        [
            (Self::BACKWARDS, "backwards"),
            (Self::FORWARDS, "forwards"),
            (Self::FREEZE, "freeze"),
        ]
        .into_iter()
        .filter(|(f, _)| self.contains(*f))
        .map(|(_, name)| name)
        .collect()
    }
}

impl BitOr for FillMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Serialize for FillMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.flag_names().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FillMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Many(Vec<String>),
        }

        fn flag(name: &str) -> Result<FillMode, String> {
            match name.trim().to_ascii_lowercase().as_str() {
                "none" | "remove" => Ok(FillMode::NONE),
                "backwards" => Ok(FillMode::BACKWARDS),
                "forwards" => Ok(FillMode::FORWARDS),
                "freeze" => Ok(FillMode::FREEZE),
                "both" => Ok(FillMode::BACKWARDS | FillMode::FORWARDS),
                other => Err(format!("unknown fill mode \"{other}\"")),
            }
        }

        let names = match Repr::deserialize(deserializer)? {
            Repr::One(s) => vec![s],
            Repr::Many(v) => v,
        };
        names
            .iter()
            .try_fold(FillMode::NONE, |acc, n| flag(n).map(|f| acc | f))
            .map_err(serde::de::Error::custom)
    }
}

/// Length of one iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActiveDuration {
    /// Zero-length value assignment.
    Instant,
    /// Span in time units.
    Finite(f64),
}

impl Serialize for ActiveDuration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Instant => serializer.serialize_str("instant"),
            Self::Finite(d) => serializer.serialize_f64(*d),
        }
    }
}

impl<'de> Deserialize<'de> for ActiveDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Word(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(d) => Ok(Self::Finite(d)),
            Repr::Word(w) if w.eq_ignore_ascii_case("instant") => Ok(Self::Instant),
            Repr::Word(w) => Err(serde::de::Error::custom(format!(
                "duration must be a number or \"instant\", got \"{w}\""
            ))),
        }
    }
}

/// How many times the keyframes play.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IterationCount {
    /// Positive, possibly fractional count.
    Finite(f64),
    /// Repeats forever.
    Infinite,
}

impl Default for IterationCount {
    fn default() -> Self {
        Self::Finite(1.0)
    }
}

impl Serialize for IterationCount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Infinite => serializer.serialize_str("infinite"),
            Self::Finite(c) => serializer.serialize_f64(*c),
        }
    }
}

impl<'de> Deserialize<'de> for IterationCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Word(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(c) => Ok(Self::Finite(c)),
            Repr::Word(w)
                if w.eq_ignore_ascii_case("infinite") || w.eq_ignore_ascii_case("indefinite") =>
            {
                Ok(Self::Infinite)
            }
            Repr::Word(w) => Err(serde::de::Error::custom(format!(
                "iterations must be a number or \"infinite\", got \"{w}\""
            ))),
        }
    }
}

/// Caller-facing description of one animation, as produced by a descriptor source.
///
/// Nothing is checked at this boundary; [`Descriptor::from_def`] validates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DescriptorDef<T> {
    /// Target channel.
    pub channel: ChannelKey,
    /// Start offset; negative means already mid-flight at zero.
    #[serde(default)]
    pub delay: f64,
    /// Iteration length.
    pub duration: ActiveDuration,
    /// Iteration count.
    #[serde(default)]
    pub iterations: IterationCount,
    /// Key positions in `[0, 1]`. Empty means evenly spaced.
    #[serde(default)]
    pub key_times: Vec<f64>,
    /// Key values; only the first may be omitted.
    pub values: Vec<Option<T>>,
    /// One easing per segment. Empty means linear everywhere.
    #[serde(default)]
    pub easings: Vec<String>,
    /// Fill flags.
    #[serde(default)]
    pub fill: FillMode,
    /// Play every iteration backwards.
    #[serde(default)]
    pub reverse: bool,
    /// Flip direction on odd iterations.
    #[serde(default)]
    pub alternate: bool,
    /// Add values onto the underlying value.
    #[serde(default)]
    pub additive: bool,
    /// Carry the final value forward across iterations.
    #[serde(default)]
    pub accumulate: bool,
    /// Logical origin shared with sibling descriptors.
    #[serde(default)]
    pub group: Option<GroupId>,
    /// Channel rest value as seen by this descriptor.
    pub base: Option<T>,
    /// Instantaneous value assignment.
    #[serde(default)]
    pub setter: bool,
    /// Evaluate-only variant: `keyTimes` need not start at 0.
    #[serde(default)]
    pub partial: bool,
}

impl<T> DescriptorDef<T> {
    /// Plain linear animation over `values`, played once with no fill.
    pub fn new(channel: ChannelKey, duration: f64, values: impl IntoIterator<Item = T>) -> Self {
        Self {
            channel,
            delay: 0.0,
            duration: ActiveDuration::Finite(duration),
            iterations: IterationCount::default(),
            key_times: Vec::new(),
            values: values.into_iter().map(Some).collect(),
            easings: Vec::new(),
            fill: FillMode::NONE,
            reverse: false,
            alternate: false,
            additive: false,
            accumulate: false,
            group: None,
            base: None,
            setter: false,
            partial: false,
        }
    }

    /// Instantaneous assignment of `value` at `at`.
    pub fn set(channel: ChannelKey, at: f64, value: T) -> Self {
        Self {
            delay: at,
            duration: ActiveDuration::Instant,
            setter: true,
            ..Self::new(channel, 0.0, [value])
        }
    }

    /// Set the start offset.
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Set the iteration count.
    pub fn iterations(mut self, iterations: IterationCount) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set explicit key times.
    pub fn key_times(mut self, key_times: impl IntoIterator<Item = f64>) -> Self {
        self.key_times = key_times.into_iter().collect();
        self
    }

    /// Set per-segment easings.
    pub fn easings<S: Into<String>>(mut self, easings: impl IntoIterator<Item = S>) -> Self {
        self.easings = easings.into_iter().map(Into::into).collect();
        self
    }

    /// Set fill flags.
    pub fn fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    /// Omit the first value ("from" resolved from the channel).
    pub fn from_omitted(mut self) -> Self {
        if let Some(first) = self.values.first_mut() {
            *first = None;
        }
        self
    }

    /// Set playback direction flags.
    pub fn direction(mut self, reverse: bool, alternate: bool) -> Self {
        self.reverse = reverse;
        self.alternate = alternate;
        self
    }

    /// Set composition flags.
    pub fn composite(mut self, additive: bool, accumulate: bool) -> Self {
        self.additive = additive;
        self.accumulate = accumulate;
        self
    }

    /// Join a group.
    pub fn group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    /// Set the rest value hint.
    pub fn base(mut self, base: T) -> Self {
        self.base = Some(base);
        self
    }
}

/// Validated, normalized animation descriptor. Immutable once built.
#[derive(Clone, Debug)]
pub struct Descriptor<T> {
    id: DescriptorId,
    channel: ChannelKey,
    delay: f64,
    duration: ActiveDuration,
    iterations: IterationCount,
    key_times: Vec<f64>,
    values: Vec<Option<T>>,
    easings: Vec<Easing>,
    fill: FillMode,
    reverse: bool,
    alternate: bool,
    additive: bool,
    accumulate: bool,
    group: Option<GroupId>,
    base: Option<T>,
    setter: bool,
}

impl<T: ValueKind> Descriptor<T> {
    /// Validate `def` and normalize it.
    ///
    /// Normalization: empty `keyTimes` become evenly spaced (a lone value on an
    /// interpolating descriptor becomes a "to" animation from the underlying value),
    /// `keyTimes` are padded with holds to cover `[0, 1]`, empty easings become linear,
    /// and instantaneous descriptors become setters that persist (FORWARDS when no
    /// persisting fill was given).
    pub fn from_def(id: DescriptorId, def: DescriptorDef<T>) -> SyncResult<Self> {
        let DescriptorDef {
            channel,
            delay,
            mut duration,
            mut iterations,
            mut key_times,
            mut values,
            easings,
            mut fill,
            reverse,
            alternate,
            additive,
            accumulate,
            group,
            base,
            mut setter,
            partial,
        } = def;

        if !delay.is_finite() {
            return Err(SyncError::validation("delay must be finite"));
        }
        if let ActiveDuration::Finite(d) = duration {
            if !d.is_finite() || d < 0.0 {
                return Err(SyncError::validation(format!(
                    "duration must be finite and >= 0, got {d}"
                )));
            }
            if d == 0.0 {
                duration = ActiveDuration::Instant;
            }
        }
        if let IterationCount::Finite(c) = iterations
            && (!c.is_finite() || c <= 0.0)
        {
            return Err(SyncError::validation(format!(
                "iteration count must be positive, got {c}"
            )));
        }
        if values.is_empty() {
            return Err(SyncError::validation("values must be non-empty"));
        }
        if values.iter().skip(1).any(Option::is_none) {
            return Err(SyncError::validation(
                "only the first value may be omitted",
            ));
        }
        if values.iter().all(Option::is_none) {
            return Err(SyncError::validation("no concrete value supplied"));
        }
        if duration == ActiveDuration::Instant && iterations == IterationCount::Infinite {
            return Err(SyncError::validation(
                "an instantaneous descriptor cannot repeat indefinitely",
            ));
        }

        if setter || duration == ActiveDuration::Instant {
            setter = true;
            duration = ActiveDuration::Instant;
            iterations = IterationCount::Finite(1.0);
            if !fill.persists() {
                fill = fill | FillMode::FORWARDS;
            }
        }

        if key_times.is_empty() {
            if values.len() == 1 && !setter {
                values.insert(0, None);
            }
            let n = values.len();
            key_times = if n == 1 {
                vec![0.0]
            } else {
                (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
            };
        }

        if key_times.len() != values.len() {
            return Err(SyncError::validation(format!(
                "keyTimes has {} entries but values has {}",
                key_times.len(),
                values.len()
            )));
        }
        if key_times
            .iter()
            .any(|k| !k.is_finite() || !(0.0..=1.0).contains(k))
        {
            return Err(SyncError::validation("keyTimes must lie in [0, 1]"));
        }
        if key_times.windows(2).any(|w| w[1] < w[0]) {
            return Err(SyncError::validation("keyTimes must be ascending"));
        }
        if !partial && !setter && key_times[0] != 0.0 {
            return Err(SyncError::validation(format!(
                "keyTimes must start at 0, got {}",
                key_times[0]
            )));
        }

        let segments = values.len() - 1;
        let mut parsed = if easings.is_empty() {
            vec![Easing::Linear; segments]
        } else {
            if easings.len() != segments {
                return Err(SyncError::validation(format!(
                    "expected {segments} easings, got {}",
                    easings.len()
                )));
            }
            easings
                .iter()
                .map(|e| Easing::parse(e))
                .collect::<SyncResult<Vec<_>>>()?
        };

        if !setter {
            if key_times[0] > 0.0 {
                key_times.insert(0, 0.0);
                values.insert(0, values[0].clone());
                parsed.insert(0, Easing::Linear);
            }
            if let Some(&last) = key_times.last()
                && last < 1.0
            {
                key_times.push(1.0);
                values.push(values[values.len() - 1].clone());
                parsed.push(Easing::Linear);
            }
        }

        Ok(Self {
            id,
            channel,
            delay,
            duration,
            iterations,
            key_times,
            values,
            easings: parsed,
            fill,
            reverse,
            alternate,
            additive,
            accumulate,
            group,
            base,
            setter,
        })
    }

    /// Value of key `index` during iteration `iteration`, composed over `underlying`.
    ///
    /// An omitted value resolves to `underlying` itself. Otherwise `accumulate` adds the
    /// final key value once per completed iteration and `additive` adds the result onto
    /// `underlying`. `None` when the adapter cannot add the operands.
    pub fn value_at(&self, iteration: u64, index: usize, underlying: &T) -> Option<T> {
        self.compose(iteration, index, underlying, self.additive)
    }

    pub(crate) fn compose(
        &self,
        iteration: u64,
        index: usize,
        underlying: &T,
        additive: bool,
    ) -> Option<T> {
        let Some(raw) = self.values.get(index)?.as_ref() else {
            return Some(underlying.clone());
        };
        let mut v = raw.clone();
        if self.accumulate && iteration > 0 {
            let last = self.values.last()?.as_ref()?;
            v = multiply(last, iteration)?.add(&v)?;
        }
        if additive {
            v = underlying.add(&v)?;
        }
        Some(v)
    }
}

impl<T> Descriptor<T> {
    /// Declaration order.
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    /// Target channel.
    pub fn channel(&self) -> &ChannelKey {
        &self.channel
    }

    /// Start offset.
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Iteration length.
    pub fn duration(&self) -> ActiveDuration {
        self.duration
    }

    /// Iteration count.
    pub fn iterations(&self) -> IterationCount {
        self.iterations
    }

    /// Normalized key times, covering `[0, 1]`.
    pub fn key_times(&self) -> &[f64] {
        &self.key_times
    }

    /// Normalized key values.
    pub fn values(&self) -> &[Option<T>] {
        &self.values
    }

    /// Per-segment easings.
    pub fn easings(&self) -> &[Easing] {
        &self.easings
    }

    /// Fill flags.
    pub fn fill(&self) -> FillMode {
        self.fill
    }

    /// Reverse flag.
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Alternate flag.
    pub fn alternate(&self) -> bool {
        self.alternate
    }

    /// Additive flag.
    pub fn additive(&self) -> bool {
        self.additive
    }

    /// Accumulate flag.
    pub fn accumulate(&self) -> bool {
        self.accumulate
    }

    /// Group membership.
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Rest value hint.
    pub fn base(&self) -> Option<&T> {
        self.base.as_ref()
    }

    /// Whether this is an instantaneous assignment.
    pub fn is_setter(&self) -> bool {
        self.setter
    }

    /// Whether the first value was omitted.
    pub fn start_omitted(&self) -> bool {
        self.values.first().is_some_and(Option::is_none)
    }

    /// Whether the descriptor repeats forever.
    pub fn is_infinite(&self) -> bool {
        self.iterations == IterationCount::Infinite
    }

    /// Iteration length in time units (0 for setters).
    pub fn span(&self) -> f64 {
        match self.duration {
            ActiveDuration::Instant => 0.0,
            ActiveDuration::Finite(d) => d,
        }
    }

    /// `delay + duration × iterations`, `None` when unbounded.
    pub fn total_duration(&self) -> Option<f64> {
        match self.iterations {
            IterationCount::Infinite => None,
            IterationCount::Finite(c) => Some(self.delay + self.span() * c),
        }
    }

    /// Merge precedence.
    pub fn priority(&self) -> Priority {
        Priority {
            start: round_time(self.delay),
            declared: self.id,
        }
    }
}

/// `v` added to itself `k` times, by doubling.
fn multiply<T: ValueKind>(v: &T, mut k: u64) -> Option<T> {
    let mut acc: Option<T> = None;
    let mut pow = v.clone();
    while k > 0 {
        if k & 1 == 1 {
            acc = Some(match acc {
                Some(a) => a.add(&pow)?,
                None => pow.clone(),
            });
        }
        k >>= 1;
        if k > 0 {
            pow = pow.add(&pow)?;
        }
    }
    acc
}

#[cfg(test)]
#[path = "../../tests/unit/animation/descriptor.rs"]
mod tests;
