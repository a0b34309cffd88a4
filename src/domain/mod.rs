//! Domain types and the ports the application layer talks to.

pub mod account;
pub mod customer;
pub mod mandate;
pub mod ports;
