pub mod constraints;
pub mod dedup;
pub mod engine;
pub mod errors;
pub mod merger;
pub mod pipeline;
pub mod profiles;
pub mod reference;
pub mod struct_helper;
pub mod tools;
pub mod worker;
