pub mod member;
pub mod musical;
pub mod review;
pub mod review_file;
pub mod review_heart;
pub mod review_tag;
pub mod tag;
pub mod theater;
pub mod theater_seat;
