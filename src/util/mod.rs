pub mod smallcharset;
pub mod str;
