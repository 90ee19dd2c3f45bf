pub mod error;
pub mod method;
pub mod shared;
pub mod type_state;
pub mod value;
