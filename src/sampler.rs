// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[cfg(feature = "sample-rate")]
pub(crate) use rng::Sampler;

#[cfg(not(feature = "sample-rate"))]
pub(crate) use noop::Sampler;

pub(crate) trait Sampling {
    fn new_with_rate(rate: f64) -> Self;

    /// Decide whether a single metric should be sent.
    fn should_emit(&self) -> bool;
}

#[cfg(not(feature = "sample-rate"))]
mod noop {
    use super::Sampling;

    pub struct Sampler;

    impl Sampling for Sampler {
        fn new_with_rate(_rate: f64) -> Self {
            Self
        }

        fn should_emit(&self) -> bool {
            true
        }
    }
}

#[cfg(feature = "sample-rate")]
mod rng {
    use super::Sampling;
    use rand::Rng;

    pub struct Sampler(f64);

    impl Sampling for Sampler {
        fn new_with_rate(rate: f64) -> Self {
            Self(rate)
        }

        fn should_emit(&self) -> bool {
            if self.0 >= 1.0 {
                return true;
            }

            // gen_bool panics outside of [0, 1], NaN included
            if self.0.is_nan() || self.0 <= 0.0 {
                return false;
            }

            rand::thread_rng().gen_bool(self.0)
        }
    }

}
