mod checker;
mod killer;

#[rustfmt::skip]
pub use self::{
    checker::UnixProcessChecker,
    killer::UnixProcessKiller,
};
