pub mod label_use_case;
pub mod ports;
pub mod top_use_case;
