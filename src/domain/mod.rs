// Domain layer: lead records, search criteria, catalogs and the ports the core talks through.

pub mod catalog;
pub mod model;
pub mod ports;
