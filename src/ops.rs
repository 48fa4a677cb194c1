pub mod debounce;
pub mod delay;
pub mod distinct_until_changed;
pub mod filter;
pub mod last;
pub mod map;
pub mod merge;
pub mod merge_all;
pub mod take;
pub mod tap;
pub mod zip;
