pub mod signs;

pub use signs::{degree_in_sign, sign_index, sign_of, SignPlacement, ZodiacSign};
