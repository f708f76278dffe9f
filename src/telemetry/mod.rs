pub(crate) mod oltp;

pub use oltp::init_meter;

use opentelemetry::{global, metrics::Meter};

pub fn get_meter() -> Meter {
    global::meter("lodestone")
}
