pub mod csv;
pub mod date_stamp;
pub mod units;
