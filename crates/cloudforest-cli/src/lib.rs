pub mod forest;
pub mod util;
