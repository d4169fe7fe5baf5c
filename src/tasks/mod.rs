pub mod control;
pub mod serial;
pub mod uplink;
