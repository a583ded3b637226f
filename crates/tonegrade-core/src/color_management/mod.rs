//! Color management — sRGB transfer, Oklab conversion, and white-balance gains.

pub mod oklab;
pub mod transfer;
pub mod white_balance;
