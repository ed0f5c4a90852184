//! Maps a domain id to its binding tables.

use dukbind_domains::DomainId;

use crate::table::BindingUnit;
use crate::{domain_dbus, domain_posix, domain_tui};

pub fn unit_for_domain(domain: DomainId) -> BindingUnit {
    match domain {
        DomainId::Posix => domain_posix::unit(),
        DomainId::Dbus => domain_dbus::unit(),
        DomainId::Tui => domain_tui::unit(),
    }
}
