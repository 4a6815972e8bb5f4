//! The concrete message dictionaries this crate ships: one
//! [`crate::dispatch::VersionDictionary`] per recognized `BeginString`
//!, assembled into a
//! [`crate::dispatch::Registry`] by [`registry`].
//!
//! Each version module (`fix42`, `fix43`, `fix44`, `fix50sp2`) declares
//! its message shapes with [`crate::message_shape!`]; `header` declares
//! the standard header shared by all four. A caller who only needs one
//! version can skip [`registry`] and build a narrower
//! [`crate::dispatch::Registry`] directly from the modules below.

pub mod fix42;
pub mod fix43;
pub mod fix44;
pub mod fix50sp2;
pub mod header;

use crate::dispatch::{Registry, VersionDictionary};
use crate::schema::Shape;
use fixcore_dictionary::Version;

/// Builds the [`Registry`] this crate ships out of the box: all four
/// recognized versions, each with its standard header and default
/// message shapes registered.
pub fn registry() -> Registry {
    let mut reg = Registry::new();

    reg.register(VersionDictionary::new(
        Version::Fix42,
        header::HeaderV42::info(),
        [fix42::Logon::info(), fix42::Heartbeat::info()],
    ));

    reg.register(VersionDictionary::new(
        Version::Fix43,
        header::HeaderV43::info(),
        [fix43::Logon::info(), fix43::Heartbeat::info()],
    ));

    reg.register(VersionDictionary::new(
        Version::Fix44,
        header::HeaderV44::info(),
        [
            fix44::Logon::info(),
            fix44::Heartbeat::info(),
            fix44::TestRequest::info(),
            fix44::NewOrderSingle::info(),
            fix44::MarketDataRequest::info(),
            fix44::MarketDataSnapshotFullRefresh::info(),
        ],
    ));

    reg.register(VersionDictionary::new(
        Version::Fixt11,
        header::HeaderFixt11::info(),
        [
            fix50sp2::Logon::info(),
            fix50sp2::Heartbeat::info(),
            fix50sp2::TestRequest::info(),
            fix50sp2::NewOrderSingle::info(),
            fix50sp2::MarketDataSnapshotFullRefresh::info(),
        ],
    ));

    reg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_recognized_versions() {
        let reg = registry();
        assert!(reg.get(Version::Fix42).is_some());
        assert!(reg.get(Version::Fix43).is_some());
        assert!(reg.get(Version::Fix44).is_some());
        assert!(reg.get(Version::Fixt11).is_some());
    }

    #[test]
    fn fix44_dictionary_resolves_logon_and_snapshot() {
        let reg = registry();
        let dict = reg.get(Version::Fix44).unwrap();
        assert!(dict.default_shape("A").is_some());
        assert!(dict.default_shape("W").is_some());
        assert!(dict.default_shape("Z").is_none());
    }
}
