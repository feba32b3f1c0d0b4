pub mod codec;
pub mod dispatch;
pub mod review;
pub mod shared;
pub mod show;
pub mod updates;
