#[macro_use]
mod log;

pub mod filters;
#[cfg(feature = "rp2040")]
pub mod system_info;
