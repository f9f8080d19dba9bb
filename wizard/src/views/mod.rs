//! The three wizard stages. Each view owns its form state and reports what the
//! application should do next through an `Action`.

pub mod preview;
pub mod requirements;
pub mod upload;
