use crate::wire::WireStruct;

/// Seconds since the Unix epoch plus nanosecond precision. Invariant:
/// `nanos` is always in `[0, 1_000_000_000)`; comparisons are lexicographic
/// over `(seconds, nanos)`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, WireStruct)]
pub struct Timestamp {
    #[wire(tag = 1)]
    pub seconds: i64,
    #[wire(tag = 2)]
    pub nanos: i32,
}

impl Timestamp {
    pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

    pub fn new(seconds: i64, nanos: i32) -> Self {
        debug_assert!((0..Self::NANOS_PER_SECOND as i32).contains(&nanos));
        Self { seconds, nanos }
    }

    /// Subtracts a small jitter, used when minting a transaction id's
    /// valid-start so that minor clock skew with the receiving node does
    /// not push the timestamp into the future.
    pub fn minus_nanos(&self, nanos: u32) -> Timestamp {
        let total = self.seconds * Self::NANOS_PER_SECOND + self.nanos as i64 - nanos as i64;
        let seconds = total.div_euclid(Self::NANOS_PER_SECOND);
        let nanos = total.rem_euclid(Self::NANOS_PER_SECOND) as i32;
        Timestamp { seconds, nanos }
    }

    pub fn plus_duration(&self, duration: Duration) -> Timestamp {
        Timestamp {
            seconds: self.seconds + duration.seconds,
            nanos: self.nanos,
        }
    }
}

/// A duration expressed in whole seconds; sub-second precision is not
/// transported on the wire.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, WireStruct)]
pub struct Duration {
    #[wire(tag = 1)]
    pub seconds: i64,
}

impl Duration {
    pub fn from_secs(seconds: i64) -> Self {
        Self { seconds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireCodec;

    #[test]
    fn timestamp_orders_lexicographically() {
        let a = Timestamp::new(100, 5);
        let b = Timestamp::new(100, 6);
        let c = Timestamp::new(101, 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn timestamp_wire_round_trip() {
        let ts = Timestamp::new(1_700_000_000, 42);
        let bytes = ts.encode_to_vec();
        assert_eq!(Timestamp::decode_from_slice(&bytes).unwrap(), ts);
    }

    #[test]
    fn minus_nanos_borrows_from_seconds() {
        let ts = Timestamp::new(100, 5);
        let shifted = ts.minus_nanos(10);
        assert_eq!(shifted.seconds, 99);
        assert_eq!(shifted.nanos, 999_999_995);
    }
}
