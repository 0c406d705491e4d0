//! Mention pipeline: scan -> resolve -> load -> aggregate

pub mod aggregate;
pub mod load;
pub mod resolve;
pub mod scan;

pub use aggregate::aggregate;
pub use load::load;
pub use resolve::{resolve, Resolver};
pub use scan::scan;
