//! Document processors built on top of the translation façade

pub mod object;
