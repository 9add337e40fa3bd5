pub mod heart;
pub mod review;
