pub mod fold_profiles;
pub mod get_args;
